//! Standalone install on the local Linux machine.

use std::path::{Path, PathBuf};

use anyhow::Context;
use mikroclaw_protocol::constants::{LOCAL_BINARY_NAME, TRANSFER_TIMEOUT};
use mikroclaw_transport::{HttpTransport, ReqwestTransport, download_to_file};
use tracing::{debug, info};

pub const INSTALL_DIR: &str = "/usr/local/bin";

#[derive(Debug, PartialEq, Eq)]
pub enum LinuxInstall {
    Installed(PathBuf),
    /// Downloaded fine, but the install directory is not writable.
    NotWritable(PathBuf),
}

pub async fn install(binary_url: &str) -> anyhow::Result<()> {
    let http = ReqwestTransport::verified()?;
    eprintln!("  Installing MikroClaw to Linux");
    eprintln!("⏳ Downloading {binary_url}");
    match install_into(&http, binary_url, Path::new(INSTALL_DIR)).await? {
        LinuxInstall::Installed(path) => {
            eprintln!("  ✓ Installed to {}", path.display());
            println!("✅ Installation Complete! Run: mikroclaw --help");
        }
        LinuxInstall::NotWritable(dir) => {
            eprintln!("  ⚠ Cannot write to {}", dir.display());
            eprintln!(
                "  Install manually: curl -fL -o {LOCAL_BINARY_NAME} {binary_url} \
                 && sudo install -m 755 {LOCAL_BINARY_NAME} {}/",
                dir.display()
            );
        }
    }
    Ok(())
}

/// Downloads the agent into a scratch directory over `http`, which must
/// verify certificates, then copies it into `dir` when that is writable.
/// The scratch directory is always removed.
pub async fn install_into(
    http: &dyn HttpTransport,
    binary_url: &str,
    dir: &Path,
) -> anyhow::Result<LinuxInstall> {
    let scratch = tempfile::Builder::new()
        .prefix("mikroclaw-")
        .tempdir()
        .context("failed to create scratch directory")?;
    let binary = scratch.path().join(LOCAL_BINARY_NAME);
    download_to_file(http, binary_url, &binary, TRANSFER_TIMEOUT).await?;

    if !is_writable(dir) {
        debug!(dir = %dir.display(), "install directory not writable");
        return Ok(LinuxInstall::NotWritable(dir.to_path_buf()));
    }
    let dest = dir.join(LOCAL_BINARY_NAME);
    tokio::fs::copy(&binary, &dest)
        .await
        .with_context(|| format!("failed to copy agent to {}", dest.display()))?;
    info!(path = %dest.display(), "agent installed");
    Ok(LinuxInstall::Installed(dest))
}

fn is_writable(dir: &Path) -> bool {
    tempfile::tempfile_in(dir).is_ok()
}
