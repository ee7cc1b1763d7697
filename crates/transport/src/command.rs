//! Bounded subprocess execution.
//!
//! `ssh`, `scp` and `sshpass` are driven as external programs. The
//! [`CommandRunner`] trait is the seam that lets callers substitute a
//! recorder in tests.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::TransportError;

/// A program invocation with its environment and time bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables. Values may be secret and are never logged.
    pub env: Vec<(String, String)>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs.
pub trait CommandRunner: Send + Sync {
    /// Runs `spec` to completion. Exceeding `spec.timeout` is a
    /// `Timeout` error; failing to start is a `Connect` error.
    fn run(
        &self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, TransportError>> + Send + '_>>;

    /// Whether `program` can be found on `PATH`.
    fn has_program(&self, program: &str) -> bool;
}

/// Runs programs with `tokio::process`, killing them on timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(
        &self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, TransportError>> + Send + '_>> {
        Box::pin(async move {
            debug!(program = %spec.program, args = ?spec.args, "running command");
            let child = Command::new(&spec.program)
                .args(&spec.args)
                .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| {
                    TransportError::Connect(format!("failed to start {}: {e}", spec.program))
                })?;

            // Dropping the future on timeout kills the child.
            match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
                Ok(Ok(output)) => Ok(CommandOutput {
                    success: output.status.success(),
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }),
                Ok(Err(e)) => Err(TransportError::Connect(format!(
                    "failed to wait for {}: {e}",
                    spec.program
                ))),
                Err(_) => {
                    warn!(program = %spec.program, timeout = ?spec.timeout, "command timed out");
                    Err(TransportError::timed_out(&spec.program, spec.timeout))
                }
            }
        })
    }

    fn has_program(&self, program: &str) -> bool {
        find_in_path(program)
    }
}

fn find_in_path(program: &str) -> bool {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(program).is_file();
    }
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
}
