//! SSH/SCP deployer.
//!
//! The binary is downloaded locally, then both files are copied with
//! `scp`. Everything local lives in a scratch directory that is removed
//! when the attempt ends, whatever the outcome.

use std::path::Path;

use mikroclaw_protocol::DeploymentArtifact;
use mikroclaw_protocol::constants::{
    LOCAL_BINARY_NAME, LOCAL_CONFIG_NAME, SCP_BINARY_PATH, SCP_CONFIG_PATH,
};
use mikroclaw_transport::{
    CommandRunner, HttpTransport, SshClient, SshTarget, TransportError, download_to_file,
};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::types::{Target, Timeouts};

pub struct SshDeployer<'a> {
    runner: &'a dyn CommandRunner,
    downloads: &'a dyn HttpTransport,
    timeouts: Timeouts,
    scratch_root: Option<&'a Path>,
}

impl<'a> SshDeployer<'a> {
    /// `downloads` fetches the agent binary and should verify certificates.
    pub fn new(
        runner: &'a dyn CommandRunner,
        downloads: &'a dyn HttpTransport,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            runner,
            downloads,
            timeouts,
            scratch_root: None,
        }
    }

    /// Creates scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: &'a Path) -> Self {
        self.scratch_root = Some(root);
        self
    }

    pub async fn deploy(
        &self,
        target: &Target,
        port: u16,
        artifact: &DeploymentArtifact,
    ) -> bool {
        match self.try_deploy(target, port, artifact).await {
            Ok(()) => {
                info!(host = %target.host, port, "ssh deploy complete");
                true
            }
            Err(e) => {
                warn!(
                    host = %target.host,
                    port,
                    category = %e.category(),
                    error = %e,
                    "ssh deploy failed"
                );
                false
            }
        }
    }

    async fn try_deploy(
        &self,
        target: &Target,
        port: u16,
        artifact: &DeploymentArtifact,
    ) -> Result<(), TransportError> {
        let ssh = SshClient::new(self.runner);
        let ssh_target = SshTarget {
            host: &target.host,
            port,
            credentials: &target.credentials,
        };
        ssh.check_auth(&ssh_target, self.timeouts.ssh_probe).await?;

        let scratch = self.scratch_dir()?;
        debug!(dir = %scratch.path().display(), "scratch directory");

        let binary = scratch.path().join(LOCAL_BINARY_NAME);
        download_to_file(
            self.downloads,
            &artifact.binary_url,
            &binary,
            self.timeouts.transfer,
        )
        .await?;

        let config = scratch.path().join(LOCAL_CONFIG_NAME);
        tokio::fs::write(&config, artifact.config_json.as_bytes())
            .await
            .map_err(|e| TransportError::Connect(format!("failed to write config: {e}")))?;

        ssh.upload(&ssh_target, &binary, SCP_BINARY_PATH, self.timeouts.transfer)
            .await?;
        ssh.upload(&ssh_target, &config, SCP_CONFIG_PATH, self.timeouts.transfer)
            .await?;
        Ok(())
    }

    fn scratch_dir(&self) -> Result<TempDir, TransportError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("mikroclaw-");
        let dir = match self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| {
            TransportError::Connect(format!("failed to create scratch directory: {e}"))
        })
    }
}
