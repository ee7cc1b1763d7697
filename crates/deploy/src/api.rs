//! Binary API deployer.
//!
//! Sends three sentences (login, fetch, config write) and closes the
//! connection. Replies are not read.

use mikroclaw_api_wire::Sentence;
use mikroclaw_protocol::constants::REMOTE_CONFIG_PATH;
use mikroclaw_protocol::{Credentials, DeploymentArtifact, Endpoint, TransportKind};
use mikroclaw_transport::{ApiSession, TransportError};
use tracing::{info, warn};

use crate::script::{fetch_command, file_write_script};
use crate::types::{Target, Timeouts};

/// The sentences that install `artifact`, in send order.
pub fn deploy_sentences(
    credentials: &Credentials,
    artifact: &DeploymentArtifact,
) -> Vec<Sentence> {
    vec![
        Sentence::new("!login")
            .attribute("name", &credentials.user)
            .attribute("password", &credentials.password),
        Sentence::new("!exec").attribute("command", &fetch_command(artifact)),
        Sentence::new("!exec").attribute(
            "command",
            &file_write_script(REMOTE_CONFIG_PATH, &artifact.config_json),
        ),
    ]
}

pub struct ApiDeployer {
    timeouts: Timeouts,
}

impl ApiDeployer {
    pub fn new(timeouts: Timeouts) -> Self {
        Self { timeouts }
    }

    pub async fn deploy(
        &self,
        target: &Target,
        port: u16,
        artifact: &DeploymentArtifact,
    ) -> bool {
        let tls = Endpoint::new(TransportKind::Api, port).is_secure();
        let mut session =
            match ApiSession::connect(&target.host, port, tls, self.timeouts.http).await {
                Ok(session) => session,
                Err(e) => {
                    warn!(
                        host = %target.host,
                        port,
                        category = %e.category(),
                        error = %e,
                        "api connect failed"
                    );
                    return false;
                }
            };

        let sentences = deploy_sentences(&target.credentials, artifact);
        let result = send_all(&mut session, &sentences).await;
        session.close().await;

        match result {
            Ok(()) => {
                info!(host = %target.host, port, tls, "api deploy complete");
                true
            }
            Err(e) => {
                warn!(
                    host = %target.host,
                    port,
                    category = %e.category(),
                    error = %e,
                    "api deploy failed"
                );
                false
            }
        }
    }
}

async fn send_all(
    session: &mut ApiSession,
    sentences: &[Sentence],
) -> Result<(), TransportError> {
    for sentence in sentences {
        session.send(sentence).await?;
    }
    Ok(())
}
