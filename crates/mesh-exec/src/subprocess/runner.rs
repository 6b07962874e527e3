use std::{
    process::Stdio,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::{io::AsyncReadExt, net::unix::pipe, process::Command};
use tracing::{debug, info, instrument, warn};

use mesh_core::{MetricsHandle, ScriptError, ScriptOutcome, ScriptRunner, noop_metrics};
use mesh_model::Dependency;

use super::names::*;
use crate::{DependencyResolver, ExecError, ScriptConfig};

/// Runs every mesh operation as `<shell> <location>/<script> args...`.
///
/// Stdout and stderr share one pipe and are captured interleaved; a non-zero exit turns into
/// [`ScriptError::Failed`] carrying that output. A run exceeding the configured
/// timeout is killed.
pub struct SubprocessScriptRunner {
    cfg: ScriptConfig,
    resolver: DependencyResolver,
    metrics: MetricsHandle,
}

impl SubprocessScriptRunner {
    pub fn new(cfg: ScriptConfig) -> Result<Self, ExecError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            resolver: DependencyResolver,
            metrics: noop_metrics(),
        })
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.cfg
    }

    async fn run_with(&self, script: &str, args: &[&str]) -> Result<String, ScriptError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.run(script, &args).await
    }

    fn finish(&self, script: &str, outcome: ScriptOutcome, started: Instant) {
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.metrics.record_script(script, outcome, elapsed);
    }

    fn spawn_failed(&self, script: &str, started: Instant, e: std::io::Error) -> ScriptError {
        self.finish(script, ScriptOutcome::Failure, started);
        ScriptError::Spawn {
            script: script.to_string(),
            reason: e.to_string(),
        }
    }

    fn truncated<'a>(&self, output: &'a str) -> &'a str {
        let limit = self.cfg.log_output_limit;
        match output.char_indices().nth(limit) {
            Some((idx, _)) => &output[..idx],
            None => output,
        }
    }
}

/// Write ends of the pipe shared by the child's stdout and stderr.
struct OutputWriters {
    stdout: Stdio,
    stderr: Stdio,
}

/// One pipe for both streams, so the output keeps the order it was written in.
fn output_pipe() -> std::io::Result<(pipe::Receiver, OutputWriters)> {
    let (tx, rx) = pipe::pipe()?;
    let stdout = tx.into_blocking_fd()?;
    let stderr = stdout.try_clone()?;
    Ok((
        rx,
        OutputWriters {
            stdout: Stdio::from(stdout),
            stderr: Stdio::from(stderr),
        },
    ))
}

#[async_trait]
impl ScriptRunner for SubprocessScriptRunner {
    #[instrument(level = "debug", skip(self, args), fields(script = %script))]
    async fn run(&self, script: &str, args: &[String]) -> Result<String, ScriptError> {
        info!(args = %args.join(" "), "executing script");

        let started = Instant::now();
        let (mut output_rx, output_tx) = match output_pipe() {
            Ok(pipe) => pipe,
            Err(e) => return Err(self.spawn_failed(script, started, e)),
        };

        let mut cmd = Command::new(&self.cfg.shell);
        cmd.arg(self.cfg.script_path(script))
            .args(args)
            .current_dir(self.cfg.location())
            .stdin(Stdio::null())
            .stdout(output_tx.stdout)
            .stderr(output_tx.stderr)
            .kill_on_drop(true);

        let spawned = cmd.spawn();
        // The command keeps the parent's copies of the write ends; EOF needs them closed.
        drop(cmd);
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => return Err(self.spawn_failed(script, started, e)),
        };

        let collect = async {
            let mut raw = Vec::new();
            output_rx.read_to_end(&mut raw).await?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, raw))
        };

        // Dropping the child on timeout kills it.
        let timeout = Duration::from_millis(self.cfg.timeout_ms);
        let (status, raw) = match tokio::time::timeout(timeout, collect).await {
            Ok(Ok(done)) => done,
            Ok(Err(e)) => {
                self.finish(script, ScriptOutcome::Failure, started);
                return Err(ScriptError::Spawn {
                    script: script.to_string(),
                    reason: format!("wait failed: {e}"),
                });
            }
            Err(_) => {
                warn!(timeout_ms = self.cfg.timeout_ms, "script timed out, killed");
                self.finish(script, ScriptOutcome::Timeout, started);
                return Err(ScriptError::Timeout {
                    script: script.to_string(),
                    timeout_ms: self.cfg.timeout_ms,
                });
            }
        };

        let combined = String::from_utf8_lossy(&raw).into_owned();

        if !status.success() {
            self.finish(script, ScriptOutcome::Failure, started);
            return Err(ScriptError::Failed {
                script: script.to_string(),
                code: status.code(),
                output: combined,
            });
        }

        self.finish(script, ScriptOutcome::Success, started);
        debug!(output = %self.truncated(&combined), "script finished");
        Ok(combined)
    }

    async fn apply_dependency(&self, dependency: &Dependency) -> Result<(), ScriptError> {
        let doc = self.resolver.resolve(dependency)?;
        self.run_with(DEPENDENCY_APPLIER, &[doc.as_str(), self.cfg.admiral_remote.as_str()])
            .await
            .map(drop)
    }

    async fn delete_dependency(&self, name: &str) -> Result<(), ScriptError> {
        self.run_with(
            DEPENDENCY_CLEANER,
            &[name, self.cfg.admiral_remote.as_str(), self.cfg.runtime_remote.as_str()],
        )
        .await
        .map(drop)
    }

    async fn dependency_exists(&self, name: &str) -> Result<bool, ScriptError> {
        let out = self
            .run_with(DEPENDENCY_GETTER, &[name, self.cfg.admiral_remote.as_str()])
            .await?;
        Ok(!out.trim().is_empty())
    }

    async fn list_services(&self) -> Result<Vec<String>, ScriptError> {
        let out = self
            .run_with(LIST_SERVICES, &[self.cfg.runtime_remote.as_str()])
            .await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }

    async fn apply_resource(&self, path: &str) -> Result<(), ScriptError> {
        self.run_with(RESOURCE_APPLIER, &[path, self.cfg.runtime_remote.as_str()])
            .await
            .map(drop)
    }

    async fn delete_resource(&self, path: &str) -> Result<(), ScriptError> {
        self.run_with(RESOURCE_CLEANER, &[path, self.cfg.runtime_remote.as_str()])
            .await
            .map(drop)
    }

    async fn register_runtime(&self) -> Result<(), ScriptError> {
        self.run_with(REGISTER_CONSUMER_CLUSTER, &[self.cfg.runtime_remote.as_str()])
            .await
            .map(drop)
    }

    async fn register_application(&self) -> Result<(), ScriptError> {
        self.run_with(REGISTER_PROVIDER_CLUSTER, &[self.cfg.application_remote.as_str()])
            .await
            .map(drop)
    }

    async fn delete_runtime(&self) -> Result<(), ScriptError> {
        self.run_with(CLEANUP_REMOTE_CLUSTER, &[self.cfg.runtime_remote.as_str()])
            .await
            .map(drop)
    }

    async fn delete_application(&self) -> Result<(), ScriptError> {
        self.run_with(CLEANUP_REMOTE_CLUSTER, &[self.cfg.application_remote.as_str()])
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Mutex};

    use mesh_core::{MetricsBackend, NotificationOutcome};
    use mesh_model::DependencyTemplate;

    use super::*;

    /// Fresh directory holding the given scripts, removed on drop.
    fn scripts_dir(scripts: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("create scripts dir");
        for (name, body) in scripts {
            std::fs::write(dir.path().join(name), body).expect("write script");
        }
        dir
    }

    fn runner(dir: &tempfile::TempDir) -> SubprocessScriptRunner {
        SubprocessScriptRunner::new(ScriptConfig {
            location: dir.path().to_path_buf(),
            timeout_ms: 5_000,
            ..Default::default()
        })
        .unwrap()
    }

    #[derive(Default)]
    struct Recorded(Mutex<Vec<(String, ScriptOutcome)>>);

    impl MetricsBackend for Recorded {
        fn record_notification(&self, _: &str, _: &str, _: NotificationOutcome) {}

        fn record_script(&self, script: &str, outcome: ScriptOutcome, _: u64) {
            self.0.lock().unwrap().push((script.to_string(), outcome));
        }

        fn record_reconnect(&self) {}
    }

    #[tokio::test]
    async fn passes_arguments_in_order() {
        let dir = scripts_dir(&[("echo.sh", "echo \"out $1 $2\"\n")]);
        let out = runner(&dir)
            .run("echo.sh", &["a".into(), "b".into()])
            .await
            .unwrap();

        assert_eq!(out, "out a b\n");
    }

    #[tokio::test]
    async fn output_keeps_stream_interleaving() {
        let dir = scripts_dir(&[("mixed.sh", "echo one\necho two 1>&2\necho three\n")]);
        let out = runner(&dir).run("mixed.sh", &[]).await.unwrap();

        assert_eq!(out, "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_output() {
        let dir = scripts_dir(&[("fail.sh", "echo broken\nexit 3\n")]);
        let err = runner(&dir).run("fail.sh", &[]).await.unwrap_err();

        match err {
            ScriptError::Failed {
                script,
                code,
                output,
            } => {
                assert_eq!(script, "fail.sh");
                assert_eq!(code, Some(3));
                assert_eq!(output, "broken\n");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_script_is_killed() {
        let dir = scripts_dir(&[("slow.sh", "sleep 10\n")]);
        let metrics = std::sync::Arc::new(Recorded::default());
        let runner = SubprocessScriptRunner::new(ScriptConfig {
            location: dir.path().to_path_buf(),
            timeout_ms: 100,
            ..Default::default()
        })
        .unwrap()
        .with_metrics(metrics.clone());

        let started = Instant::now();
        let err = runner.run("slow.sh", &[]).await.unwrap_err();

        assert!(matches!(err, ScriptError::Timeout { timeout_ms: 100, .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(
            metrics.0.lock().unwrap().as_slice(),
            &[("slow.sh".to_string(), ScriptOutcome::Timeout)]
        );
    }

    #[tokio::test]
    async fn missing_shell_is_spawn_failure() {
        let runner = SubprocessScriptRunner::new(ScriptConfig {
            shell: PathBuf::from("/nonexistent/shell"),
            ..Default::default()
        })
        .unwrap();

        let err = runner.run("any.sh", &[]).await.unwrap_err();
        assert!(matches!(err, ScriptError::Spawn { .. }));
    }

    #[tokio::test]
    async fn existence_follows_getter_output() {
        let dir = scripts_dir(&[(
            DEPENDENCY_GETTER,
            "if [ \"$1\" = dep-rt-1 ] && [ \"$2\" = admiral ]; then echo found; fi\n",
        )]);
        let runner = runner(&dir);

        assert!(runner.dependency_exists("dep-rt-1").await.unwrap());
        assert!(!runner.dependency_exists("dep-rt-2").await.unwrap());
    }

    #[tokio::test]
    async fn lists_services_one_per_line() {
        let dir = scripts_dir(&[(LIST_SERVICES, "printf 'app1\\n\\n  app2 \\n'\n")]);
        let services = runner(&dir).list_services().await.unwrap();

        assert_eq!(services, vec!["app1", "app2"]);
    }

    #[tokio::test]
    async fn applier_receives_document_and_remote() {
        let dir = scripts_dir(&[(DEPENDENCY_APPLIER, "printf '%s' \"$1\" > applied.json\necho \"$2\" > remote.txt\n")]);
        let runner = runner(&dir);
        let dep = Dependency::for_runtime("rt1", &DependencyTemplate::default(), ["app1"]);

        runner.apply_dependency(&dep).await.unwrap();

        let applied = std::fs::read_to_string(dir.path().join("applied.json")).unwrap();
        let decoded: Dependency = serde_json::from_str(&applied).unwrap();
        assert_eq!(decoded, dep);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("remote.txt")).unwrap(),
            "admiral\n"
        );
    }

    #[test]
    fn log_output_is_truncated_on_char_boundary() {
        let runner = SubprocessScriptRunner::new(ScriptConfig {
            log_output_limit: 3,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(runner.truncated("äöüß"), "äöü");
        assert_eq!(runner.truncated("ab"), "ab");
    }
}
