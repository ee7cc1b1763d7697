//! Menu-driven install when no `--target` is given.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, bail};
use mikroclaw_agent_config::{
    AgentConfig, Allowlists, VALID_PROVIDERS, is_valid_ipv4, is_valid_user,
};
use mikroclaw_deploy::{DeployError, Target, choose};
use mikroclaw_protocol::{Credentials, DeploymentArtifact, Endpoint};

use crate::linux::{INSTALL_DIR, LinuxInstall, install_into};
use crate::session::Session;
use crate::terminal::{MenuChoice, Terminal};

/// Menu labels, in `VALID_PROVIDERS` order.
const PROVIDER_LABELS: [&str; 17] = [
    "OpenRouter (recommended)",
    "OpenAI",
    "Anthropic",
    "Ollama/LocalAI",
    "Groq",
    "Mistral",
    "XAI (Grok)",
    "DeepSeek",
    "Together",
    "Fireworks",
    "Perplexity",
    "Cohere",
    "Bedrock (AWS)",
    "Kimi (Moonshot)",
    "MiniMax",
    "Z.AI",
    "Synthetic.New",
];

pub async fn run<W: Write>(
    term: &mut Terminal<W>,
    session: &Session<'_>,
    binary_url: &str,
) -> anyhow::Result<()> {
    term.banner()?;
    let choice = term
        .menu(
            "Select Install Target",
            &[
                "RouterOS (MikroTik router)",
                "Linux (standalone binary)",
                "Docker (container)",
                "Exit",
            ],
        )
        .await?;
    match choice {
        1 => routeros(term, session, binary_url).await,
        2 => linux(term, session, binary_url).await,
        3 => {
            term.msg("Docker Installation")?;
            bail!("Docker support coming soon")
        }
        4 => Ok(()),
        _ => bail!("invalid selection"),
    }
}

async fn routeros<W: Write>(
    term: &mut Terminal<W>,
    session: &Session<'_>,
    binary_url: &str,
) -> anyhow::Result<()> {
    term.msg("RouterOS Installation")?;
    term.msg("")?;
    let mut target = ask_target(term, None).await?;

    let mut methods = loop {
        let found = session.detect(&target).await;
        if !found.is_empty() {
            break found;
        }
        term.error(&format!("No connection methods detected on {}", target.host))?;
        let choice = term
            .menu(
                "Connection Failed",
                &[
                    "Retry detection",
                    "Re-enter router credentials",
                    "Cancel installation",
                ],
            )
            .await?;
        match choice {
            1 => {}
            2 => target = ask_target(term, Some(&target)).await?,
            _ => bail!("installation cancelled"),
        }
    };
    let mut endpoint = pick_method(term, &methods).await?;

    term.msg("")?;
    let config = ask_agent_config(term).await?;
    let artifact = DeploymentArtifact::new(binary_url, config.to_json_pretty()?);

    loop {
        match session.deploy(&target, endpoint, &artifact).await {
            Ok(_) => {
                term.msg("")?;
                term.msg("✅ Installation Complete!")?;
                return Ok(());
            }
            Err(e) => term.error(&format!("Installation failed: {}", describe_failure(&e)))?,
        }
        let choice = term
            .menu(
                "Installation Failed",
                &[
                    "Retry install",
                    "Re-enter router credentials",
                    "Select different method",
                    "Cancel installation",
                ],
            )
            .await?;
        match choice {
            1 => {}
            2 => {
                target = ask_target(term, Some(&target)).await?;
                let found = session.detect(&target).await;
                if !found.is_empty() {
                    methods = found;
                    endpoint = pick_method(term, &methods).await?;
                }
            }
            3 => endpoint = pick_method(term, &methods).await?,
            _ => bail!("installation cancelled"),
        }
    }
}

async fn linux<W: Write>(
    term: &mut Terminal<W>,
    session: &Session<'_>,
    binary_url: &str,
) -> anyhow::Result<()> {
    term.msg("Linux Installation")?;
    term.msg("")?;
    match install_into(session.downloads(), binary_url, Path::new(INSTALL_DIR)).await? {
        LinuxInstall::Installed(path) => {
            term.msg(&format!("✓ Installed to {}", path.display()))?;
            term.msg("")?;
            term.msg("✅ Installation Complete!")?;
            term.msg("Run: mikroclaw --help")?;
        }
        LinuxInstall::NotWritable(dir) => {
            term.msg(&format!("⚠ Cannot write to {}", dir.display()))?;
            term.msg(&format!("  Re-run with sudo to install into {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Router address and credentials, re-asked until they are well formed.
/// `previous` supplies the defaults when re-entering.
async fn ask_target<W: Write>(
    term: &mut Terminal<W>,
    previous: Option<&Target>,
) -> anyhow::Result<Target> {
    let ip = loop {
        let ip = term
            .input("Router IP address", previous.map(|t| t.host.as_str()))
            .await?;
        if is_valid_ipv4(&ip) {
            break ip;
        }
        term.error(&format!("'{ip}' is not an IPv4 address"))?;
    };
    let default_user = previous.map_or("admin", |t| t.credentials.user.as_str());
    let user = loop {
        let user = term.input("Router username", Some(default_user)).await?;
        if is_valid_user(&user) {
            break user;
        }
        term.error("Invalid router username")?;
    };
    let password = term.secret("Router password").await?;
    Ok(Target::new(ip, Credentials::new(user, password)))
}

async fn pick_method<W: Write>(
    term: &mut Terminal<W>,
    methods: &[Endpoint],
) -> anyhow::Result<Endpoint> {
    let choice = if methods.len() > 1 {
        let labels: Vec<String> = methods.iter().map(Endpoint::label).collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        term.menu("Select Connection Method", &labels).await?
    } else {
        1
    };
    let endpoint = choose(&MenuChoice(choice), methods).context("no connection methods")?;
    term.msg(&format!("Using {}", endpoint.label()))?;
    Ok(endpoint)
}

async fn ask_agent_config<W: Write>(term: &mut Terminal<W>) -> anyhow::Result<AgentConfig> {
    let bot_token = term.input("Telegram Bot Token", None).await?;
    let choice = term.menu("Select LLM Provider", &PROVIDER_LABELS).await?;
    let provider = choice
        .checked_sub(1)
        .and_then(|i| VALID_PROVIDERS.get(i))
        .copied()
        .unwrap_or("openrouter");
    let api_key = term.input("LLM API Key", None).await?;
    let allowlists = Allowlists {
        telegram: ask_allowlist(term, "Telegram").await?,
        discord: ask_allowlist(term, "Discord").await?,
        slack: ask_allowlist(term, "Slack").await?,
    };
    Ok(AgentConfig::new(bot_token, api_key, provider, "", "").with_allowlists(allowlists))
}

async fn ask_allowlist<W: Write>(term: &mut Terminal<W>, channel: &str) -> anyhow::Result<String> {
    let prompt = format!("{channel} allowlist (comma-separated, * for all, empty deny-all)");
    Ok(term.input(&prompt, None).await?)
}

fn describe_failure(err: &DeployError) -> String {
    match err.category() {
        Some(category) => format!("[{category}] {err}"),
        None => err.to_string(),
    }
}
