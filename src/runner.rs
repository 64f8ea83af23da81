//! Process runner - executes untrusted solution sources
//!
//! Materializes a solution as a uniquely named source file, runs it in a
//! fresh interpreter process with piped stdio and a wall-clock timeout, and
//! reports the raw outcome. The runner does NOT:
//! - Compare outputs or determine verdicts
//! - Know about tasks, tests or teams
//!
//! Isolation here is a temp file and a killed process, nothing more. A
//! stronger sandbox can replace `InterpreterRunner` behind the
//! `SolutionRunner` trait without touching the contract.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Raw outcome of one solution execution (no verdict interpretation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Process exited with status zero
    Completed { stdout: String },
    /// Wall-clock timeout hit; the process was killed
    TimedOut,
    /// Process exited with a nonzero status, carrying its diagnostics
    Failed { stderr: String },
}

/// Infrastructure failure while trying to run a solution. Distinct from the
/// verdict taxonomy: these propagate to the caller instead of being recorded
/// as a judgement.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to materialize solution source: {0}")]
    Materialize(#[source] std::io::Error),
    #[error("failed to spawn interpreter process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to collect interpreter output: {0}")]
    Collect(#[source] std::io::Error),
}

/// Runner trait for executing a solution against one stdin payload
#[async_trait]
pub trait SolutionRunner: Send + Sync {
    async fn run(&self, program: &str, stdin_payload: &str) -> Result<RunOutcome, RunnerError>;
}

/// Runner that hands the solution source to an external interpreter
pub struct InterpreterRunner {
    /// Interpreter executable (e.g. "python3")
    program: String,
    /// Extra arguments placed before the source path
    args: Vec<String>,
    /// Suffix for the materialized source file (e.g. ".py")
    source_suffix: String,
    /// Wall-clock limit per execution
    time_limit: Duration,
}

impl InterpreterRunner {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        source_suffix: impl Into<String>,
        time_limit: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            source_suffix: source_suffix.into(),
            time_limit,
        }
    }
}

#[async_trait]
impl SolutionRunner for InterpreterRunner {
    async fn run(&self, program: &str, stdin_payload: &str) -> Result<RunOutcome, RunnerError> {
        // Random filename per invocation; concurrent judging must never
        // share a source file. Removal on drop covers every exit path.
        let source = tempfile::Builder::new()
            .prefix("solution-")
            .suffix(&self.source_suffix)
            .tempfile()
            .map_err(RunnerError::Materialize)?;
        std::fs::write(source.path(), program).map_err(RunnerError::Materialize)?;

        debug!(
            "Running solution: {} {:?} {:?}",
            self.program,
            self.args,
            source.path()
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(source.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(RunnerError::Spawn)?;

        // Feeding stdin counts against the limit too: a solution that never
        // drains its pipe would otherwise block the write past any timeout.
        let run = async {
            if let Some(mut stdin) = child.stdin.take() {
                // A solution may exit before draining stdin; the broken pipe
                // is part of its outcome, not an infrastructure failure.
                let _ = stdin.write_all(stdin_payload.as_bytes()).await;
            }
            child.wait_with_output().await
        };

        let output = match timeout(self.time_limit, run).await {
            Ok(result) => result.map_err(RunnerError::Collect)?,
            Err(_) => {
                // The run future owns the child; dropping it here triggers
                // kill_on_drop, so the process does not outlive the verdict.
                return Ok(RunOutcome::TimedOut);
            }
        };

        if output.status.success() {
            Ok(RunOutcome::Completed {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            })
        } else {
            Ok(RunOutcome::Failed {
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh_runner(time_limit: Duration) -> InterpreterRunner {
        InterpreterRunner::new("sh", vec![], ".sh", time_limit)
    }

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let runner = sh_runner(Duration::from_secs(5));
        let outcome = runner.run("echo hello", "").await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Completed {
                stdout: "hello\n".into()
            }
        );
    }

    #[tokio::test]
    async fn test_run_feeds_stdin() {
        let runner = sh_runner(Duration::from_secs(5));
        let outcome = runner.run("cat", "4\n3\n5\n").await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Completed {
                stdout: "4\n3\n5\n".into()
            }
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_stderr() {
        let runner = sh_runner(Duration::from_secs(5));
        let outcome = runner.run("echo boom >&2; exit 3", "").await.unwrap();
        match outcome {
            RunOutcome::Failed { stderr } => assert!(stderr.contains("boom")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let runner = sh_runner(Duration::from_millis(300));
        let outcome = runner.run("sleep 30", "").await.unwrap();
        assert_eq!(outcome, RunOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_timeout_bounds_stdin_feeding() {
        let runner = sh_runner(Duration::from_millis(300));
        // A solution that neither reads stdin nor exits, with a payload
        // larger than an OS pipe buffer: the write alone would block until
        // the child dies if it did not count against the limit
        let payload = "x".repeat(1 << 20);
        let started = std::time::Instant::now();
        let outcome = runner.run("sleep 30", &payload).await.unwrap();
        assert_eq!(outcome, RunOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    fn leftover_sources(suffix: &str) -> usize {
        std::fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(suffix))
            .count()
    }

    #[tokio::test]
    async fn test_source_file_removed_on_every_path() {
        // Distinct suffix so the scan only sees files from this test
        let suffix = ".arbiter-cleanup-sh";
        let runner = InterpreterRunner::new("sh", vec![], suffix, Duration::from_millis(300));

        let outcome = runner.run("echo done", "").await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Completed {
                stdout: "done\n".into()
            }
        );
        assert_eq!(leftover_sources(suffix), 0);

        let outcome = runner.run("sleep 30", "").await.unwrap();
        assert_eq!(outcome, RunOutcome::TimedOut);
        assert_eq!(leftover_sources(suffix), 0);
    }

    #[tokio::test]
    async fn test_concurrent_runs_do_not_interfere() {
        let runner = sh_runner(Duration::from_secs(5));
        let (a, b) = tokio::join!(runner.run("echo first", ""), runner.run("echo second", ""));
        assert_eq!(
            a.unwrap(),
            RunOutcome::Completed {
                stdout: "first\n".into()
            }
        );
        assert_eq!(
            b.unwrap(),
            RunOutcome::Completed {
                stdout: "second\n".into()
            }
        );
    }
}
