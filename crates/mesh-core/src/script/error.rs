use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to spawn script {script}: {reason}")]
    Spawn { script: String, reason: String },

    #[error("failed executing script {script} (exit code {code:?}): {output}")]
    Failed {
        script: String,
        code: Option<i32>,
        output: String,
    },

    #[error("script {script} timed out after {timeout_ms}ms")]
    Timeout { script: String, timeout_ms: u64 },

    /// The object could not be rendered into the text the script consumes.
    #[error("failed to resolve {what}: {reason}")]
    Resolve { what: String, reason: String },
}
