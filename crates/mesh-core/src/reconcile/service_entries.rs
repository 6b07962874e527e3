use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::{
    error::CoreError,
    script::{ScriptRunner, service_entry_path},
};

/// Make the set of applied service entries equal to `desired`.
///
/// Entries in the mesh but not desired are deleted first, then the missing ones
/// are applied. The `reserved` application is never touched.
pub(super) async fn sync_service_entries(
    scripts: &dyn ScriptRunner,
    desired: &BTreeSet<String>,
    reserved: &str,
) -> Result<(), CoreError> {
    let existing: BTreeSet<String> = scripts.list_services().await?.into_iter().collect();

    for app in existing.difference(desired) {
        if app == reserved {
            debug!(app = %app, "service resources of the reserved application are left untouched");
            continue;
        }
        info!(app = %app, "deleting service entry");
        scripts.delete_resource(&service_entry_path(app)).await?;
    }

    for app in desired.difference(&existing) {
        if app == reserved {
            debug!(app = %app, "service resources of the reserved application are left untouched");
            continue;
        }
        info!(app = %app, "applying service entry");
        scripts.apply_resource(&service_entry_path(app)).await?;
    }

    Ok(())
}
