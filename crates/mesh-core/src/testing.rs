//! In-memory fakes shared by the unit tests.
use std::{
    collections::{BTreeSet, HashMap, HashSet, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use mesh_model::{
    Application, ApplicationStatus, Dependency, Label, LabelFilter, Operation, Page, Runtime,
    SCENARIOS_KEY, StatusCondition,
};

use crate::{
    error::CoreError,
    handler::{LabelHandler, NotificationHandler},
    listener::{ListenerConnector, ListenerError, Notification, NotificationListener},
    script::{ScriptError, ScriptRunner},
    store::{
        ApplicationLister, LabelGetter, Queries, RequestScope, RuntimeGetter, RuntimeLister,
        StoreError, Transaction, Transactioner,
    },
};

pub const TENANT: &str = "tenant-1";
pub const RT_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
pub const TARGET_APP_ID: &str = "0b7f4c8e-1d2a-4c3b-9e5f-6a7b8c9d0e1f";
pub const APP1_ID: &str = "9c1e2d3f-4a5b-4c6d-8e7f-0a1b2c3d4e5f";
pub const APP_B_ID: &str = "5d6e7f80-91a2-4b3c-8d4e-5f6a7b8c9d0e";

pub fn runtime(id: &str, name: &str) -> Runtime {
    Runtime {
        id: id.to_string(),
        tenant_id: TENANT.to_string(),
        name: name.to_string(),
        description: None,
        status_condition: StatusCondition::Connected,
    }
}

pub fn app(id: &str, name: &str, condition: StatusCondition) -> Application {
    Application {
        id: id.to_string(),
        tenant_id: TENANT.to_string(),
        name: name.to_string(),
        provider_name: None,
        description: None,
        status: ApplicationStatus { condition },
        healthcheck_url: None,
        integration_system_id: None,
    }
}

pub fn app_label(app_id: &str, scenarios: &[&str]) -> Label {
    Label {
        id: format!("label-{app_id}"),
        tenant_id: TENANT.to_string(),
        key: SCENARIOS_KEY.to_string(),
        app_id: Some(app_id.to_string()),
        runtime_id: None,
        value: json!(scenarios),
    }
}

pub fn runtime_label(runtime_id: &str, scenarios: &[&str]) -> Label {
    Label {
        id: format!("label-{runtime_id}"),
        tenant_id: TENANT.to_string(),
        key: SCENARIOS_KEY.to_string(),
        app_id: None,
        runtime_id: Some(runtime_id.to_string()),
        value: json!(scenarios),
    }
}

/// Poll `cond` every few milliseconds, panicking after five seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    let res = tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(res.is_ok(), "condition not reached in time");
}

// ---- transactions ----

#[derive(Debug, Default)]
pub struct TxLog {
    begun: AtomicUsize,
    committed: AtomicUsize,
    rolled_back: AtomicUsize,
}

impl TxLog {
    pub fn open(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
            - self.committed.load(Ordering::SeqCst)
            - self.rolled_back.load(Ordering::SeqCst)
    }

    /// No transaction is left open and the counts match.
    pub fn assert_clean(&self, begun: usize, committed: usize) {
        assert_eq!(self.open(), 0, "transaction left open");
        assert_eq!(self.begun.load(Ordering::SeqCst), begun, "begun");
        assert_eq!(self.committed.load(Ordering::SeqCst), committed, "committed");
        assert_eq!(
            self.rolled_back.load(Ordering::SeqCst),
            begun - committed,
            "rolled back"
        );
    }
}

pub struct FakeTx {
    log: Arc<TxLog>,
    done: bool,
}

#[async_trait]
impl Transaction for FakeTx {
    async fn commit(mut self) -> Result<(), StoreError> {
        self.done = true;
        self.log.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for FakeTx {
    fn drop(&mut self) {
        if !self.done {
            self.log.rolled_back.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ---- store ----

#[derive(Default)]
pub struct FakeStore {
    runtimes: Vec<Runtime>,
    runtime_labels: HashMap<String, Label>,
    apps: HashMap<String, Vec<Application>>,
    app_labels: HashMap<String, Label>,
    missing_app_lists: HashSet<String>,
    fail_app_labels: bool,
    filters: Mutex<Vec<LabelFilter>>,
    tx: Arc<TxLog>,
}

impl FakeStore {
    pub fn with_runtime(mut self, rt: Runtime, label: Option<Label>) -> Self {
        if let Some(label) = label {
            self.runtime_labels.insert(rt.id.clone(), label);
        }
        self.runtimes.push(rt);
        self
    }

    pub fn with_app(mut self, runtime_id: &str, app: Application, label: Option<Label>) -> Self {
        if let Some(label) = label {
            self.app_labels.insert(app.id.clone(), label);
        }
        self.apps.entry(runtime_id.to_string()).or_default().push(app);
        self
    }

    /// Listing the runtime's applications fails with NotFound.
    pub fn without_app_list(mut self, runtime_id: &str) -> Self {
        self.missing_app_lists.insert(runtime_id.to_string());
        self
    }

    /// Application label reads fail with a database error.
    pub fn failing_app_labels(mut self) -> Self {
        self.fail_app_labels = true;
        self
    }

    pub fn queries(self: &Arc<Self>) -> Queries<FakeTx> {
        Queries {
            runtimes: self.clone(),
            runtime_getter: self.clone(),
            applications: self.clone(),
            app_labels: Arc::new(AppLabels(self.clone())),
            runtime_labels: Arc::new(RuntimeLabels(self.clone())),
        }
    }

    pub fn tx_log(&self) -> Arc<TxLog> {
        self.tx.clone()
    }

    pub fn runtime_filters(&self) -> Vec<LabelFilter> {
        self.filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transactioner for FakeStore {
    type Tx = FakeTx;

    async fn begin(&self) -> Result<FakeTx, StoreError> {
        self.tx.begun.fetch_add(1, Ordering::SeqCst);
        Ok(FakeTx {
            log: self.tx.clone(),
            done: false,
        })
    }
}

#[async_trait]
impl RuntimeLister<FakeTx> for FakeStore {
    async fn list(
        &self,
        _scope: &mut RequestScope<FakeTx>,
        filters: &[LabelFilter],
        _page_size: u32,
        _cursor: Option<&str>,
    ) -> Result<Page<Runtime>, StoreError> {
        self.filters.lock().unwrap().extend_from_slice(filters);
        Ok(Page::single(self.runtimes.clone()))
    }
}

#[async_trait]
impl RuntimeGetter<FakeTx> for FakeStore {
    async fn get(&self, _scope: &mut RequestScope<FakeTx>, id: &str) -> Result<Runtime, StoreError> {
        self.runtimes
            .iter()
            .find(|rt| rt.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("runtime", id))
    }
}

#[async_trait]
impl ApplicationLister<FakeTx> for FakeStore {
    async fn list_by_runtime_id(
        &self,
        _scope: &mut RequestScope<FakeTx>,
        runtime_id: Uuid,
        _page_size: u32,
        _cursor: Option<&str>,
    ) -> Result<Page<Application>, StoreError> {
        let id = runtime_id.to_string();
        if self.missing_app_lists.contains(&id) {
            return Err(StoreError::not_found("runtime", id));
        }
        Ok(Page::single(self.apps.get(&id).cloned().unwrap_or_default()))
    }
}

pub struct AppLabels(Arc<FakeStore>);

#[async_trait]
impl LabelGetter<FakeTx> for AppLabels {
    async fn get_label(
        &self,
        _scope: &mut RequestScope<FakeTx>,
        object_id: &str,
        key: &str,
    ) -> Result<Label, StoreError> {
        if self.0.fail_app_labels {
            return Err(StoreError::Database("connection reset".into()));
        }
        self.0
            .app_labels
            .get(object_id)
            .filter(|l| l.key == key)
            .cloned()
            .ok_or_else(|| StoreError::not_found("label", object_id))
    }
}

pub struct RuntimeLabels(Arc<FakeStore>);

#[async_trait]
impl LabelGetter<FakeTx> for RuntimeLabels {
    async fn get_label(
        &self,
        _scope: &mut RequestScope<FakeTx>,
        object_id: &str,
        key: &str,
    ) -> Result<Label, StoreError> {
        self.0
            .runtime_labels
            .get(object_id)
            .filter(|l| l.key == key)
            .cloned()
            .ok_or_else(|| StoreError::not_found("label", object_id))
    }
}

// ---- scripts ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCall {
    Run(String),
    ApplyDependency(String),
    DeleteDependency(String),
    DependencyExists(String),
    ListServices,
    ApplyResource(String),
    DeleteResource(String),
    RegisterRuntime,
    RegisterApplication,
    DeleteRuntime,
    DeleteApplication,
}

/// Script runner keeping mesh state in memory.
#[derive(Default)]
pub struct RecordingScripts {
    calls: Mutex<Vec<ScriptCall>>,
    applied: Mutex<Vec<Dependency>>,
    dependencies: Mutex<BTreeSet<String>>,
    services: Mutex<BTreeSet<String>>,
    fail_on: Option<&'static str>,
    observer: Option<Arc<TxLog>>,
    open_at_call: Mutex<Vec<usize>>,
}

impl RecordingScripts {
    pub fn with_services<const N: usize>(self, names: [&str; N]) -> Self {
        self.services
            .lock()
            .unwrap()
            .extend(names.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_dependency(self, name: &str) -> Self {
        self.dependencies.lock().unwrap().insert(name.to_string());
        self
    }

    /// Operation `op` fails with a non-zero exit.
    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Remember how many transactions were open at every call.
    pub fn observing(mut self, log: Arc<TxLog>) -> Self {
        self.observer = Some(log);
        self
    }

    pub fn calls(&self) -> Vec<ScriptCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change mesh state.
    pub fn mutations(&self) -> Vec<ScriptCall> {
        self.calls()
            .into_iter()
            .filter(|c| {
                !matches!(
                    c,
                    ScriptCall::Run(_) | ScriptCall::DependencyExists(_) | ScriptCall::ListServices
                )
            })
            .collect()
    }

    pub fn applied_dependencies(&self) -> Vec<Dependency> {
        self.applied.lock().unwrap().clone()
    }

    pub fn all_calls_after_commit(&self) -> bool {
        self.open_at_call.lock().unwrap().iter().all(|open| *open == 0)
    }

    fn record(&self, op: &'static str, call: ScriptCall) -> Result<(), ScriptError> {
        self.calls.lock().unwrap().push(call);
        if let Some(log) = &self.observer {
            self.open_at_call.lock().unwrap().push(log.open());
        }
        if self.fail_on == Some(op) {
            return Err(ScriptError::Failed {
                script: op.to_string(),
                code: Some(1),
                output: "boom".into(),
            });
        }
        Ok(())
    }
}

fn service_name(path: &str) -> String {
    path.trim_start_matches("service-entries/")
        .trim_end_matches(".yaml")
        .to_string()
}

#[async_trait]
impl ScriptRunner for RecordingScripts {
    async fn run(&self, script: &str, _args: &[String]) -> Result<String, ScriptError> {
        self.record("run", ScriptCall::Run(script.to_string()))?;
        Ok(String::new())
    }

    async fn apply_dependency(&self, dependency: &Dependency) -> Result<(), ScriptError> {
        self.record(
            "apply_dependency",
            ScriptCall::ApplyDependency(dependency.name().to_string()),
        )?;
        self.applied.lock().unwrap().push(dependency.clone());
        self.dependencies
            .lock()
            .unwrap()
            .insert(dependency.name().to_string());
        Ok(())
    }

    async fn delete_dependency(&self, name: &str) -> Result<(), ScriptError> {
        self.record("delete_dependency", ScriptCall::DeleteDependency(name.to_string()))?;
        self.dependencies.lock().unwrap().remove(name);
        Ok(())
    }

    async fn dependency_exists(&self, name: &str) -> Result<bool, ScriptError> {
        self.record("dependency_exists", ScriptCall::DependencyExists(name.to_string()))?;
        Ok(self.dependencies.lock().unwrap().contains(name))
    }

    async fn list_services(&self) -> Result<Vec<String>, ScriptError> {
        self.record("list_services", ScriptCall::ListServices)?;
        Ok(self.services.lock().unwrap().iter().cloned().collect())
    }

    async fn apply_resource(&self, path: &str) -> Result<(), ScriptError> {
        self.record("apply_resource", ScriptCall::ApplyResource(path.to_string()))?;
        self.services.lock().unwrap().insert(service_name(path));
        Ok(())
    }

    async fn delete_resource(&self, path: &str) -> Result<(), ScriptError> {
        self.record("delete_resource", ScriptCall::DeleteResource(path.to_string()))?;
        self.services.lock().unwrap().remove(&service_name(path));
        Ok(())
    }

    async fn register_runtime(&self) -> Result<(), ScriptError> {
        self.record("register_runtime", ScriptCall::RegisterRuntime)
    }

    async fn register_application(&self) -> Result<(), ScriptError> {
        self.record("register_application", ScriptCall::RegisterApplication)
    }

    async fn delete_runtime(&self) -> Result<(), ScriptError> {
        self.record("delete_runtime", ScriptCall::DeleteRuntime)
    }

    async fn delete_application(&self) -> Result<(), ScriptError> {
        self.record("delete_application", ScriptCall::DeleteApplication)
    }
}

// ---- handlers ----

#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<(Operation, Vec<u8>)>>,
    fail: bool,
}

impl RecordingHandler {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(Operation, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: Operation, payload: &[u8]) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push((op, payload.to_vec()));
        if self.fail {
            return Err(CoreError::Store(StoreError::Database("boom".into())));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationHandler for RecordingHandler {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn handle_create(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.record(Operation::Create, payload)
    }

    async fn handle_update(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.record(Operation::Update, payload)
    }

    async fn handle_delete(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.record(Operation::Delete, payload)
    }
}

#[derive(Default)]
pub struct RecordingLabelHandler {
    calls: Mutex<Vec<(Operation, String)>>,
    fail: bool,
}

impl RecordingLabelHandler {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(Operation, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: Operation, label: &Label) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push((op, label.key.clone()));
        if self.fail {
            return Err(CoreError::Script(ScriptError::Failed {
                script: "dependency_applier.sh".into(),
                code: Some(2),
                output: "boom".into(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl LabelHandler for RecordingLabelHandler {
    fn name(&self) -> &'static str {
        "recording-label"
    }

    async fn handle_create(&self, label: &Label) -> Result<(), CoreError> {
        self.record(Operation::Create, label)
    }

    async fn handle_update(&self, label: &Label) -> Result<(), CoreError> {
        self.record(Operation::Update, label)
    }

    async fn handle_delete(&self, label: &Label) -> Result<(), CoreError> {
        self.record(Operation::Delete, label)
    }
}

// ---- transport ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Connect,
    Listen(String),
    Ping,
    Close,
}

#[derive(Debug, Default)]
pub struct ListenerLog(Mutex<Vec<ListenerEvent>>);

impl ListenerLog {
    fn push(&self, e: ListenerEvent) {
        self.0.lock().unwrap().push(e);
    }

    pub fn events(&self) -> Vec<ListenerEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, e: &ListenerEvent) -> usize {
        self.0.lock().unwrap().iter().filter(|x| *x == e).count()
    }
}

pub enum Step {
    Deliver(Notification),
    Fail,
}

/// Listener replaying a fixed script, then waiting forever.
#[derive(Default)]
pub struct ScriptedListener {
    steps: VecDeque<Step>,
    fail_ping: bool,
    log: Arc<ListenerLog>,
}

impl ScriptedListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(mut self, channel: &str, payload: impl Into<String>) -> Self {
        self.steps.push_back(Step::Deliver(Notification {
            channel: channel.to_string(),
            payload: payload.into(),
        }));
        self
    }

    pub fn then_fail(mut self) -> Self {
        self.steps.push_back(Step::Fail);
        self
    }

    pub fn failing_ping(mut self) -> Self {
        self.fail_ping = true;
        self
    }
}

#[async_trait]
impl NotificationListener for ScriptedListener {
    async fn listen(&mut self, channel: &str) -> Result<(), ListenerError> {
        self.log.push(ListenerEvent::Listen(channel.to_string()));
        Ok(())
    }

    async fn ping(&mut self) -> Result<(), ListenerError> {
        self.log.push(ListenerEvent::Ping);
        if self.fail_ping {
            return Err(ListenerError::Transport("ping failed".into()));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ListenerError> {
        self.log.push(ListenerEvent::Close);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Notification, ListenerError> {
        match self.steps.pop_front() {
            Some(Step::Deliver(n)) => Ok(n),
            Some(Step::Fail) => Err(ListenerError::Transport("connection reset".into())),
            None => std::future::pending().await,
        }
    }
}

/// Hands out the queued listeners in order, then idle ones.
#[derive(Default)]
pub struct ScriptedConnector {
    listeners: Mutex<VecDeque<ScriptedListener>>,
    connect_failures: AtomicUsize,
    log: Arc<ListenerLog>,
}

impl ScriptedConnector {
    pub fn new<I>(listeners: I) -> Self
    where
        I: IntoIterator<Item = ScriptedListener>,
    {
        Self {
            listeners: Mutex::new(listeners.into_iter().collect()),
            ..Default::default()
        }
    }

    /// The first `n` connects fail.
    pub fn failing_connects(self, n: usize) -> Self {
        self.connect_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn log(&self) -> Arc<ListenerLog> {
        self.log.clone()
    }
}

#[async_trait]
impl ListenerConnector for ScriptedConnector {
    async fn connect(&self) -> Result<Box<dyn NotificationListener>, ListenerError> {
        self.log.push(ListenerEvent::Connect);
        let failing = self
            .connect_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ListenerError::Transport("connection refused".into()));
        }

        let mut listener = self
            .listeners
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        listener.log = self.log.clone();
        Ok(Box::new(listener))
    }
}
