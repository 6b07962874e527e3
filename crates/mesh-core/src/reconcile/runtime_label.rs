use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use mesh_model::{Dependency, Label, Runtime, parse_object_id};

use crate::{
    config::ReconcileConfig,
    error::CoreError,
    handler::LabelHandler,
    reconcile::{in_non_default_scenario, list_all_applications},
    script::ScriptRunner,
    store::{Queries, RequestScope, Transactioner},
};

/// Result of looking up the runtime a label belongs to.
enum Lookup {
    Target(Runtime),
    /// Some other runtime; the transaction is rolled back.
    Other,
    /// The runtime is gone; the transaction is committed.
    Missing,
}

/// Reconciles the target runtime's dependency after its own scenario label changed.
///
/// Create and update replace the dependency destinations wholesale whenever the
/// desired set is non-empty, without asking the mesh first. Delete removes the
/// dependency.
pub struct RuntimeLabelHandler<T: Transactioner> {
    transact: Arc<T>,
    queries: Queries<T::Tx>,
    scripts: Arc<dyn ScriptRunner>,
    cfg: ReconcileConfig,
}

impl<T: Transactioner> RuntimeLabelHandler<T> {
    pub fn new(
        transact: Arc<T>,
        queries: Queries<T::Tx>,
        scripts: Arc<dyn ScriptRunner>,
        cfg: ReconcileConfig,
    ) -> Self {
        Self {
            transact,
            queries,
            scripts,
            cfg,
        }
    }

    /// The runtime id of a scenarios label owned by a runtime, `None` for any other label.
    fn runtime_id<'a>(&self, label: &'a Label) -> Option<&'a str> {
        if !label.is_scenarios() {
            debug!(key = %label.key, "label is not the scenarios label");
            return None;
        }
        let id = label.runtime_id();
        if id.is_none() {
            debug!("label does not belong to a runtime");
        }
        id
    }

    async fn lookup(
        &self,
        scope: &mut RequestScope<T::Tx>,
        runtime_id: &str,
    ) -> Result<Lookup, CoreError> {
        match self.queries.runtime_getter.get(scope, runtime_id).await {
            Ok(rt) if self.cfg.targets.is_target_runtime(&rt.name) => Ok(Lookup::Target(rt)),
            Ok(rt) => {
                debug!(runtime = %rt.name, target = %self.cfg.targets.runtime_name, "event is not for the target runtime, skipping");
                Ok(Lookup::Other)
            }
            Err(e) if e.is_not_found() => {
                info!(runtime_id, "runtime not found, skipping label event");
                Ok(Lookup::Missing)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(level = "info", skip_all, fields(label_id = %label.id, runtime_id = ?label.runtime_id()))]
    async fn replace(&self, label: &Label) -> Result<(), CoreError> {
        let Some(runtime_id) = self.runtime_id(label) else {
            return Ok(());
        };

        let mut scope = RequestScope::new(self.transact.begin().await?, label.tenant_id.clone());
        let runtime = match self.lookup(&mut scope, runtime_id).await? {
            Lookup::Target(rt) => rt,
            Lookup::Missing => return Ok(scope.commit().await?),
            Lookup::Other => return Ok(()),
        };

        let apps = list_all_applications(
            self.queries.applications.as_ref(),
            &mut scope,
            parse_object_id(&runtime.id)?,
            self.cfg.page_size,
        )
        .await?;

        let mut desired = BTreeSet::new();
        for app in apps {
            if in_non_default_scenario(self.queries.app_labels.as_ref(), &mut scope, &app.id).await? {
                desired.insert(app.name);
            }
        }
        scope.commit().await?;

        if desired.is_empty() {
            info!("no applications in scenario with the runtime, nothing to apply");
            return Ok(());
        }

        let dependency = Dependency::for_runtime(runtime_id, &self.cfg.dependency, desired);
        info!(dependency = %dependency.name(), destinations = dependency.spec.destinations.len(), "replacing dependency destinations");
        self.scripts.apply_dependency(&dependency).await?;
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(label_id = %label.id, runtime_id = ?label.runtime_id()))]
    async fn remove(&self, label: &Label) -> Result<(), CoreError> {
        let Some(runtime_id) = self.runtime_id(label) else {
            return Ok(());
        };

        let mut scope = RequestScope::new(self.transact.begin().await?, label.tenant_id.clone());
        match self.lookup(&mut scope, runtime_id).await? {
            Lookup::Target(_) => scope.commit().await?,
            Lookup::Missing => return Ok(scope.commit().await?),
            Lookup::Other => return Ok(()),
        }

        let name = Dependency::dependency_name(runtime_id);
        info!(dependency = %name, "deleting dependency");
        self.scripts.delete_dependency(&name).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: Transactioner> LabelHandler for RuntimeLabelHandler<T> {
    fn name(&self) -> &'static str {
        "runtime-label"
    }

    async fn handle_create(&self, label: &Label) -> Result<(), CoreError> {
        self.replace(label).await
    }

    async fn handle_update(&self, label: &Label) -> Result<(), CoreError> {
        self.replace(label).await
    }

    async fn handle_delete(&self, label: &Label) -> Result<(), CoreError> {
        self.remove(label).await
    }
}
