//! SSH/SCP access through the system `ssh` and `scp` binaries.
//!
//! Two authentication modes are tried in order:
//!
//! 1. **Password** via `sshpass -e`, when `sshpass` is installed and a
//!    password was given. The password travels in `SSHPASS`, never argv.
//! 2. **Key** with `BatchMode=yes`, so a missing key fails instead of
//!    prompting.
//!
//! Host key checking is disabled; routers are commonly re-flashed and
//! reached by bare IP.

use std::path::Path;
use std::time::Duration;

use mikroclaw_protocol::Credentials;
use mikroclaw_protocol::constants::{SCP_CONNECT_TIMEOUT_SECS, SSH_CONNECT_TIMEOUT_SECS};
use tracing::debug;

use crate::command::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::TransportError;

/// Credential helper program.
pub const SSHPASS: &str = "sshpass";

/// Environment variable read by `sshpass -e`.
pub const SSHPASS_ENV: &str = "SSHPASS";

/// Remote command whose output proves a working shell.
const PROBE_COMMAND: &str = r#":put "OK""#;

/// Host, port and login for one SSH endpoint.
#[derive(Debug, Clone, Copy)]
pub struct SshTarget<'a> {
    pub host: &'a str,
    pub port: u16,
    pub credentials: &'a Credentials,
}

impl SshTarget<'_> {
    fn destination(&self) -> String {
        format!("{}@{}", self.credentials.user, self.host)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Password,
    Key,
}

fn base_options(connect_timeout_secs: u64, mode: AuthMode) -> Vec<String> {
    let mut opts = vec![
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        "-o".to_string(),
        "LogLevel=ERROR".to_string(),
        "-o".to_string(),
        format!("ConnectTimeout={connect_timeout_secs}"),
    ];
    if mode == AuthMode::Key {
        opts.push("-o".to_string());
        opts.push("BatchMode=yes".to_string());
    }
    opts
}

/// Wraps an `ssh`/`scp` argv for the given mode.
fn wrap(
    mode: AuthMode,
    program: &str,
    args: Vec<String>,
    target: &SshTarget<'_>,
    timeout: Duration,
) -> CommandSpec {
    match mode {
        AuthMode::Password => CommandSpec::new(SSHPASS, timeout)
            .arg("-e")
            .arg(program)
            .args(args)
            .env(SSHPASS_ENV, target.credentials.password.clone()),
        AuthMode::Key => CommandSpec::new(program, timeout).args(args),
    }
}

fn probe_command(target: &SshTarget<'_>, mode: AuthMode, timeout: Duration) -> CommandSpec {
    let mut args = base_options(SSH_CONNECT_TIMEOUT_SECS, mode);
    args.push("-p".to_string());
    args.push(target.port.to_string());
    args.push(target.destination());
    args.push(PROBE_COMMAND.to_string());
    wrap(mode, "ssh", args, target, timeout)
}

fn scp_command(
    target: &SshTarget<'_>,
    mode: AuthMode,
    local: &Path,
    remote: &str,
    timeout: Duration,
) -> CommandSpec {
    let mut args = base_options(SCP_CONNECT_TIMEOUT_SECS, mode);
    args.push("-P".to_string());
    args.push(target.port.to_string());
    args.push(local.display().to_string());
    args.push(format!("{}:{remote}", target.destination()));
    wrap(mode, "scp", args, target, timeout)
}

/// SSH/SCP client over a [`CommandRunner`].
pub struct SshClient<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> SshClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn modes(&self, credentials: &Credentials) -> Vec<AuthMode> {
        if !credentials.password.is_empty() && self.runner.has_program(SSHPASS) {
            vec![AuthMode::Password, AuthMode::Key]
        } else {
            vec![AuthMode::Key]
        }
    }

    /// Runs `:put "OK"` on the router.
    ///
    /// Succeeds when any mode exits 0 with `OK` on stdout. Otherwise the
    /// error from the last attempt is returned.
    pub async fn check_auth(
        &self,
        target: &SshTarget<'_>,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let mut last = TransportError::Auth("SSH authentication failed".into());
        for mode in self.modes(target.credentials) {
            debug!(host = target.host, port = target.port, ?mode, "ssh auth check");
            match self.runner.run(probe_command(target, mode, timeout)).await {
                Ok(out) if out.success && out.stdout.contains("OK") => return Ok(()),
                Ok(out) => last = failure_from_output(&out),
                Err(e) => last = e,
            }
        }
        Err(last)
    }

    /// Copies `local` to `remote` on the router.
    ///
    /// Uses the preferred mode only; a failed upload is not retried with
    /// another mode.
    pub async fn upload(
        &self,
        target: &SshTarget<'_>,
        local: &Path,
        remote: &str,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let mode = self
            .modes(target.credentials)
            .first()
            .copied()
            .unwrap_or(AuthMode::Key);
        debug!(host = target.host, port = target.port, remote, ?mode, "scp upload");
        let out = self
            .runner
            .run(scp_command(target, mode, local, remote, timeout))
            .await?;
        if out.success {
            Ok(())
        } else {
            Err(failure_from_output(&out))
        }
    }
}

fn failure_from_output(out: &CommandOutput) -> TransportError {
    if out.stderr.trim().is_empty() {
        let code = out.code.map_or_else(|| "signal".to_string(), |c| c.to_string());
        TransportError::Connect(format!("ssh exited with status {code}"))
    } else {
        TransportError::from_message(&out.stderr)
    }
}
