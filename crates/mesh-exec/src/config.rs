use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ExecError;

/// Where the mesh scripts live and how they are invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Directory holding the scripts; also the working directory of every run.
    pub location: PathBuf,
    /// Interpreter the script path is handed to.
    pub shell: PathBuf,
    /// Hard limit of a single script run; the child is killed on expiry.
    pub timeout_ms: u64,
    /// Remote context of the mesh control plane.
    pub admiral_remote: String,
    /// Remote context of the consumer runtime cluster.
    pub runtime_remote: String,
    /// Remote context of the provider application cluster.
    pub application_remote: String,
    /// Max characters of script output written to the log.
    pub log_output_limit: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            location: PathBuf::from("."),
            shell: PathBuf::from("/bin/sh"),
            timeout_ms: 120_000,
            admiral_remote: "admiral".to_string(),
            runtime_remote: "runtime".to_string(),
            application_remote: "commerce".to_string(),
            log_output_limit: 4096,
        }
    }
}

impl ScriptConfig {
    /// Validate the configuration before building a runner.
    ///
    /// Rules:
    /// - `location` and `shell` are not empty;
    /// - `timeout_ms` is positive;
    /// - every remote is named.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.location.as_os_str().is_empty() {
            return Err(ExecError::InvalidConfig("scripts location is empty".into()));
        }
        if self.shell.as_os_str().is_empty() {
            return Err(ExecError::InvalidConfig("shell is empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(ExecError::InvalidConfig(
                "script timeout must be positive".into(),
            ));
        }
        for (what, remote) in [
            ("admiral", &self.admiral_remote),
            ("runtime", &self.runtime_remote),
            ("application", &self.application_remote),
        ] {
            if remote.trim().is_empty() {
                return Err(ExecError::InvalidConfig(format!("{what} remote is empty")));
            }
        }
        Ok(())
    }

    pub fn script_path(&self, script: &str) -> PathBuf {
        self.location.join(script)
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}
