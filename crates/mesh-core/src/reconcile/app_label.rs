use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use mesh_model::{Dependency, Label, LabelFilter, parse_object_id};

use crate::{
    config::ReconcileConfig,
    error::CoreError,
    handler::LabelHandler,
    reconcile::{
        in_non_default_scenario, list_all_applications, list_all_runtimes,
        service_entries::sync_service_entries,
    },
    script::ScriptRunner,
    store::{Queries, RequestScope, Transactioner},
};

/// Desired destinations of one target runtime, computed inside the transaction.
#[derive(Debug)]
struct RuntimePlan {
    runtime_id: String,
    desired: BTreeSet<String>,
}

/// Reconciles the target runtime's dependency after an application scenario label changed.
///
/// Create, update and delete run the same reconciliation. The dependency exists
/// iff the target application is among the runtime's desired destinations; the
/// service entries always mirror the desired set.
pub struct AppLabelHandler<T: Transactioner> {
    transact: Arc<T>,
    queries: Queries<T::Tx>,
    scripts: Arc<dyn ScriptRunner>,
    cfg: ReconcileConfig,
}

impl<T: Transactioner> AppLabelHandler<T> {
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

    #[instrument(level = "info", skip_all, fields(label_id = %label.id, app_id = ?label.app_id()))]
    async fn reconcile(&self, label: &Label) -> Result<(), CoreError> {
        if !label.is_scenarios() {
            debug!(key = %label.key, "label is not the scenarios label");
            return Ok(());
        }
        if label.app_id().is_none() {
            debug!("label does not belong to an application");
            return Ok(());
        }

        let scenarios = label.scenarios()?;
        if scenarios.is_empty() {
            debug!("label holds no scenarios, no runtime can match");
            return Ok(());
        }

        let mut scope = RequestScope::new(self.transact.begin().await?, label.tenant_id.clone());
        let filter = LabelFilter::scenarios_any_of(scenarios.iter());

        let Some(plans) = self.plan(&mut scope, filter).await? else {
            scope.commit().await?;
            return Ok(());
        };
        scope.commit().await?;

        for plan in &plans {
            self.apply(plan).await?;
        }
        Ok(())
    }

    /// Read everything the reconciliation needs.
    ///
    /// `None` means the target runtime vanished while reading; the event is done.
    async fn plan(
        &self,
        scope: &mut RequestScope<T::Tx>,
        filter: LabelFilter,
    ) -> Result<Option<Vec<RuntimePlan>>, CoreError> {
        let targets = &self.cfg.targets;
        let runtimes = list_all_runtimes(
            self.queries.runtimes.as_ref(),
            scope,
            &[filter],
            self.cfg.page_size,
        )
        .await?;

        let mut plans = Vec::new();
        for runtime in runtimes {
            if !targets.is_target_runtime(&runtime.name) {
                debug!(runtime = %runtime.name, target = %targets.runtime_name, "event is not for the target runtime, skipping");
                continue;
            }

            if !in_non_default_scenario(self.queries.runtime_labels.as_ref(), scope, &runtime.id)
                .await?
            {
                continue;
            }

            let runtime_uuid = parse_object_id(&runtime.id)?;
            let apps = match list_all_applications(
                self.queries.applications.as_ref(),
                scope,
                runtime_uuid,
                self.cfg.page_size,
            )
            .await
            {
                Ok(apps) => apps,
                Err(e) if e.is_not_found() => {
                    warn!(runtime_id = %runtime.id, "runtime not found while listing its applications");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            let mut desired = BTreeSet::new();
            for app in apps {
                if !app.status.condition.is_connected() {
                    debug!(app = %app.name, condition = %app.status.condition, "application is not connected");
                    continue;
                }
                if in_non_default_scenario(self.queries.app_labels.as_ref(), scope, &app.id).await? {
                    desired.insert(app.name);
                }
            }

            info!(runtime_id = %runtime.id, count = desired.len(), "applications in scenario with the target runtime");
            plans.push(RuntimePlan {
                runtime_id: runtime.id,
                desired,
            });
        }
        Ok(Some(plans))
    }

    async fn apply(&self, plan: &RuntimePlan) -> Result<(), CoreError> {
        let target_app = &self.cfg.targets.application_name;
        let name = Dependency::dependency_name(&plan.runtime_id);

        if plan.desired.is_empty() {
            info!(dependency = %name, "no applications left in scenario, deleting dependency");
            self.scripts.delete_dependency(&name).await?;
        } else {
            let exists = self.scripts.dependency_exists(&name).await?;
            let should_exist = plan.desired.contains(target_app);

            match (should_exist, exists) {
                (true, false) => {
                    info!(dependency = %name, "creating dependency");
                    let dependency = Dependency::for_runtime(
                        &plan.runtime_id,
                        &self.cfg.dependency,
                        plan.desired.iter().cloned(),
                    );
                    self.scripts.apply_dependency(&dependency).await?;
                }
                (false, true) => {
                    info!(dependency = %name, "target application left the scenario, deleting dependency");
                    self.scripts.delete_dependency(&name).await?;
                }
                _ => debug!(dependency = %name, exists, "dependency already in desired state"),
            }
        }

        sync_service_entries(self.scripts.as_ref(), &plan.desired, target_app).await
    }
}

#[async_trait]
impl<T: Transactioner> LabelHandler for AppLabelHandler<T> {
    fn name(&self) -> &'static str {
        "application-label"
    }

    async fn handle_create(&self, label: &Label) -> Result<(), CoreError> {
        self.reconcile(label).await
    }

    async fn handle_update(&self, label: &Label) -> Result<(), CoreError> {
        self.reconcile(label).await
    }

    async fn handle_delete(&self, label: &Label) -> Result<(), CoreError> {
        self.reconcile(label).await
    }
}
