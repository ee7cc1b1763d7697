//! Command-line arguments.

use clap::{Parser, ValueEnum};
use mikroclaw_deploy::RetryPolicy;
use mikroclaw_protocol::TransportKind;
use mikroclaw_protocol::constants::{DEFAULT_PLATFORM, INSTALLER_VERSION, binary_url_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InstallTarget {
    /// MikroTik router
    Routeros,
    /// Standalone binary on this machine
    Linux,
    /// Container image
    Docker,
}

/// MikroClaw installer.
///
/// Without `--target` the installer runs interactively.
#[derive(Parser, Debug)]
#[command(name = "mikroclaw-install", version = INSTALLER_VERSION)]
pub struct Cli {
    /// Install target.
    #[arg(long, value_enum)]
    pub target: Option<InstallTarget>,

    /// Router IPv4 address (routeros target).
    #[arg(long, value_name = "IP")]
    pub ip: Option<String>,

    /// Router username.
    #[arg(long, default_value = "admin")]
    pub user: String,

    /// Router password.
    #[arg(
        long = "pass",
        env = "MIKROCLAW_ROUTER_PASS",
        default_value = "",
        hide_env_values = true
    )]
    pub password: String,

    /// Deployment method: ssh, rest or api (auto-detect if not given).
    #[arg(long)]
    pub method: Option<String>,

    /// SSH port when `--method ssh` is given.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub ssh_port: Option<u16>,

    /// REST port when `--method rest` is given.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub rest_port: Option<u16>,

    /// Binary API port when `--method api` is given.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub api_port: Option<u16>,

    /// LLM provider.
    #[arg(long, default_value = "openrouter")]
    pub provider: String,

    /// Telegram bot token.
    #[arg(long, default_value = "")]
    pub bot_token: String,

    /// LLM API key.
    #[arg(long, default_value = "")]
    pub api_key: String,

    /// Override the provider's base URL.
    #[arg(long, default_value = "")]
    pub base_url: String,

    /// Override the provider's default model.
    #[arg(long, default_value = "")]
    pub model: String,

    /// Release asset platform suffix.
    #[arg(long, default_value = DEFAULT_PLATFORM)]
    pub platform: String,

    /// Download the agent from this URL instead of the release asset.
    #[arg(long, value_name = "URL")]
    pub binary_url: Option<String>,

    /// Detection passes while no method is found.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub detect_passes: u32,

    /// Deploy attempts for the selected method.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub deploy_attempts: u32,

    /// More log output (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn binary_url(&self) -> String {
        self.binary_url
            .clone()
            .unwrap_or_else(|| binary_url_for(&self.platform))
    }

    /// Port override for a forced method. `None` for unknown names.
    pub fn port_for(&self, method: &str) -> Option<u16> {
        match method.parse::<TransportKind>().ok()? {
            TransportKind::Ssh => self.ssh_port,
            TransportKind::Rest => self.rest_port,
            TransportKind::Api => self.api_port,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            detect_passes: self.detect_passes,
            deploy_attempts: self.deploy_attempts,
            ..RetryPolicy::default()
        }
    }
}
