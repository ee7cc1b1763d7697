//! MikroClaw installer.
//!
//! Deploys the MikroClaw agent binary and its JSON config to a MikroTik
//! router (over SSH/SCP, the REST API or the binary API) or installs the
//! binary on the local Linux machine.
//!
//! # Usage
//!
//! ```bash
//! # Interactive menus
//! mikroclaw-install
//!
//! # Auto-detect the best method
//! mikroclaw-install --target routeros --ip 192.168.88.1 --pass secret \
//!     --bot-token 123:abc --api-key sk-...
//!
//! # Force a method and port
//! mikroclaw-install --target routeros --ip 192.168.88.1 --method ssh --ssh-port 2222
//! ```

mod cli;
mod interactive;
mod linux;
mod progress;
mod routeros;
mod session;
mod terminal;
#[cfg(test)]
mod testing;

use anyhow::anyhow;
use clap::Parser;
use mikroclaw_agent_config::{VALID_PROVIDERS, check_provider, check_user};
use mikroclaw_deploy::DeployError;
use mikroclaw_protocol::FailureCategory;
use mikroclaw_transport::SystemCommandRunner;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use cli::{Cli, InstallTarget};
use session::{Session, live_clients};
use terminal::Terminal;

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_FAILURE } else { EXIT_OK };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .with_timer(ChronoLocal::new("%H:%M:%S".into()))
        .init();

    let code = tokio::select! {
        result = run(cli) => match result {
            Ok(()) => EXIT_OK,
            Err(e) if is_interrupt(&e) => {
                eprintln!("Interrupted");
                EXIT_INTERRUPTED
            }
            Err(e) => {
                eprintln!("{}", error_line(&e));
                EXIT_FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted");
            EXIT_INTERRUPTED
        }
    };
    // The stdin reader thread may still be parked in a read.
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(target) = cli.target else {
        let (router_http, downloads) = live_clients()?;
        let session = Session::new(
            &router_http,
            &downloads,
            &SystemCommandRunner,
            cli.retry_policy(),
        );
        let mut term = Terminal::stdio();
        return interactive::run(&mut term, &session, &cli.binary_url()).await;
    };

    check_provider(&cli.provider)
        .map_err(|e| anyhow!("{e}\nValid providers: {}", VALID_PROVIDERS.join(", ")))?;
    check_user(&cli.user)?;

    match target {
        InstallTarget::Routeros => routeros::install(&cli).await,
        InstallTarget::Linux => linux::install(&cli.binary_url()).await,
        InstallTarget::Docker => Err(DeployError::failed(
            FailureCategory::Connect,
            "docker target is not yet implemented in CLI mode",
        )
        .into()),
    }
}

/// Log filter used when `RUST_LOG` is unset.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info,mikroclaw=debug",
        _ => "debug,mikroclaw=trace",
    }
}

/// Ctrl-C typed at the password prompt, where raw mode swallows SIGINT.
fn is_interrupt(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::Interrupted)
}

/// `Error [category]: detail` for deploy failures, `Error: message` otherwise.
fn error_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<DeployError>().and_then(DeployError::category) {
        Some(category) => format!("Error [{category}]: {err}"),
        None => format!("Error: {err:#}"),
    }
}
