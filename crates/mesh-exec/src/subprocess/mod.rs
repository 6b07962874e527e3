//! [`ScriptRunner`](mesh_core::ScriptRunner) executing shell scripts via `tokio::process::Command`.
mod names;
pub use names::*;

mod runner;
pub use runner::SubprocessScriptRunner;
