pub const DEPENDENCY_APPLIER: &str = "dependency_applier.sh";
pub const DEPENDENCY_CLEANER: &str = "dependency_cleaner.sh";
/// Prints the dependency if it exists, nothing otherwise.
pub const DEPENDENCY_GETTER: &str = "dependency_getter.sh";
/// Prints one application name per line.
pub const LIST_SERVICES: &str = "list_services.sh";
pub const RESOURCE_APPLIER: &str = "resource_applier.sh";
pub const RESOURCE_CLEANER: &str = "resource_cleaner.sh";
pub const REGISTER_CONSUMER_CLUSTER: &str = "register_consumer_cluster.sh";
pub const REGISTER_PROVIDER_CLUSTER: &str = "register_provider_cluster.sh";
pub const CLEANUP_REMOTE_CLUSTER: &str = "cleanup_remote_cluster.sh";
