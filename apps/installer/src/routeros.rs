//! Unattended RouterOS install from command-line flags.

use anyhow::Context;
use mikroclaw_agent_config::{AgentConfig, check_ipv4};
use mikroclaw_deploy::Target;
use mikroclaw_protocol::{Credentials, DeploymentArtifact, Endpoint};
use mikroclaw_transport::SystemCommandRunner;
use tracing::info;

use crate::cli::Cli;
use crate::session::{Session, live_clients};

pub async fn install(cli: &Cli) -> anyhow::Result<()> {
    let (router_http, downloads) = live_clients()?;
    let session = Session::new(
        &router_http,
        &downloads,
        &SystemCommandRunner,
        cli.retry_policy(),
    );
    let endpoint = install_with(cli, &session).await?;
    println!("✅ Installation Complete! ({})", endpoint.label());
    Ok(())
}

pub async fn install_with(cli: &Cli, session: &Session<'_>) -> anyhow::Result<Endpoint> {
    let ip = cli
        .ip
        .as_deref()
        .context("--ip required for routeros target")?;
    check_ipv4(ip)?;

    let config = AgentConfig::new(
        &cli.bot_token,
        &cli.api_key,
        &cli.provider,
        &cli.base_url,
        &cli.model,
    );
    let artifact = DeploymentArtifact::new(cli.binary_url(), config.to_json_pretty()?);
    let target = Target::new(ip, Credentials::new(&cli.user, &cli.password));
    info!(host = ip, user = %cli.user, provider = %cli.provider, "installing to router");

    let forced = cli.method.as_deref().map(|m| (m, cli.port_for(m)));
    Ok(session.install(&target, forced, &artifact).await?)
}
