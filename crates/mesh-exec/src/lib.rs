mod error;
pub use error::ExecError;

mod config;
pub use config::ScriptConfig;

mod resolver;
pub use resolver::DependencyResolver;

pub mod subprocess;
pub use subprocess::SubprocessScriptRunner;
