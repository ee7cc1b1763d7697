//! REST deployer.
//!
//! The router downloads the binary itself through `/tool/fetch`. The config
//! is written with `PUT /rest/file`, falling back to a script when the
//! router rejects the PUT. The file listing is the final word on success.

use mikroclaw_protocol::DeploymentArtifact;
use mikroclaw_protocol::constants::{REMOTE_BINARY_PATH, REMOTE_CONFIG_PATH};
use mikroclaw_transport::{HttpTransport, RestClient, TransportError};
use tracing::{debug, info, warn};

use crate::script::file_write_script;
use crate::types::{Target, Timeouts};

pub struct RestDeployer<'a> {
    http: &'a dyn HttpTransport,
    timeouts: Timeouts,
}

impl<'a> RestDeployer<'a> {
    pub fn new(http: &'a dyn HttpTransport, timeouts: Timeouts) -> Self {
        Self { http, timeouts }
    }

    pub async fn deploy(
        &self,
        target: &Target,
        port: u16,
        artifact: &DeploymentArtifact,
    ) -> bool {
        match self.try_deploy(target, port, artifact).await {
            Ok(()) => {
                info!(host = %target.host, port, "rest deploy complete");
                true
            }
            Err(e) => {
                warn!(
                    host = %target.host,
                    port,
                    category = %e.category(),
                    error = %e,
                    "rest deploy failed"
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
        let client = RestClient::new(self.http, &target.host, port, &target.credentials)
            .with_timeout(self.timeouts.http);
        client.check_auth().await?;

        // The router holds the request open until its own download finishes.
        let fetcher = RestClient::new(self.http, &target.host, port, &target.credentials)
            .with_timeout(self.timeouts.transfer);
        let fetch = fetcher
            .tool_fetch(&artifact.binary_url, REMOTE_BINARY_PATH, artifact.fetch_mode())
            .await?;
        if !fetch.is_ok() {
            return Err(TransportError::Connect(format!(
                "router fetch returned status {}",
                fetch.status
            )));
        }

        let put = client
            .put_file(REMOTE_CONFIG_PATH, &artifact.config_json)
            .await?;
        if !put.is_ok() {
            debug!(status = put.status, "file PUT rejected, using script fallback");
            let script = file_write_script(REMOTE_CONFIG_PATH, &artifact.config_json);
            let run = client.run_script(&script).await?;
            if !run.is_ok() {
                return Err(TransportError::Connect(format!(
                    "config script returned status {}",
                    run.status
                )));
            }
        }

        let files = client.list_files().await?;
        if files.iter().any(|f| f.name == REMOTE_CONFIG_PATH) {
            Ok(())
        } else {
            Err(TransportError::Connect(format!(
                "{REMOTE_CONFIG_PATH} not present after upload"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockHttp, http};
    use mikroclaw_protocol::Credentials;
    use serde_json::json;

    const LISTING_WITH_CONFIG: &str =
        r#"[{"name":"disk1","type":"disk"},{"name":"disk1/mikroclaw.env.json","type":".json file"}]"#;

    fn target() -> Target {
        Target::new("192.168.88.1", Credentials::new("admin", "pw"))
    }

    fn artifact() -> DeploymentArtifact {
        DeploymentArtifact::new("https://example.com/mikroclaw-linux-x64", "{\"MODEL\": \"m\"}")
    }

    fn calls(paths: &[(&str, &str)]) -> Vec<(String, String)> {
        paths
            .iter()
            .map(|(m, p)| (m.to_string(), p.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn happy_path() {
        let mock = MockHttp::new(vec![
            http(200, "{}"),
            http(200, "[]"),
            http(200, "[]"),
            http(200, LISTING_WITH_CONFIG),
        ]);
        let deployer = RestDeployer::new(&mock, Timeouts::default());
        assert!(deployer.deploy(&target(), 443, &artifact()).await);

        assert_eq!(
            mock.calls(),
            calls(&[
                ("GET", "/rest/system/resource"),
                ("POST", "/rest/tool/fetch"),
                ("PUT", "/rest/file"),
                ("GET", "/rest/file"),
            ])
        );
        let reqs = mock.requests.lock().unwrap();
        assert!(reqs[0].url.starts_with("https://192.168.88.1:443"));
        assert_eq!(
            reqs[1].json.as_ref().unwrap(),
            &json!({
                "url": "https://example.com/mikroclaw-linux-x64",
                "dst-path": "disk1/mikroclaw",
                "mode": "https",
            })
        );
        assert_eq!(reqs[1].timeout, Timeouts::default().transfer);
        assert_eq!(
            reqs[2].json.as_ref().unwrap(),
            &json!({"name": "disk1/mikroclaw.env.json", "content": "{\"MODEL\": \"m\"}"})
        );
    }

    #[tokio::test]
    async fn fetch_failure_stops_early() {
        let mock = MockHttp::new(vec![http(200, "{}"), http(500, "")]);
        let deployer = RestDeployer::new(&mock, Timeouts::default());
        assert!(!deployer.deploy(&target(), 443, &artifact()).await);
        assert_eq!(
            mock.calls(),
            calls(&[("GET", "/rest/system/resource"), ("POST", "/rest/tool/fetch")])
        );
    }

    #[tokio::test]
    async fn put_rejected_falls_back_to_script() {
        let mock = MockHttp::new(vec![
            http(200, "{}"),
            http(200, "[]"),
            http(400, "{\"error\":400}"),
            http(200, "[]"),
            http(200, LISTING_WITH_CONFIG),
        ]);
        let deployer = RestDeployer::new(&mock, Timeouts::default());
        assert!(deployer.deploy(&target(), 80, &artifact()).await);

        assert_eq!(
            mock.calls(),
            calls(&[
                ("GET", "/rest/system/resource"),
                ("POST", "/rest/tool/fetch"),
                ("PUT", "/rest/file"),
                ("POST", "/rest/system/script/run"),
                ("GET", "/rest/file"),
            ])
        );
        let reqs = mock.requests.lock().unwrap();
        assert!(reqs[0].url.starts_with("http://192.168.88.1:80"));
        let script = reqs[3].json.as_ref().unwrap()["script"].as_str().unwrap().to_string();
        assert!(script.starts_with("/file remove [find name=\"disk1/mikroclaw.env.json\"]"));
        assert!(script.ends_with(r#"contents="{\"MODEL\": \"m\"}""#));
    }

    #[tokio::test]
    async fn script_failure_is_failure() {
        let mock = MockHttp::new(vec![
            http(200, "{}"),
            http(200, "[]"),
            http(400, ""),
            http(500, ""),
        ]);
        let deployer = RestDeployer::new(&mock, Timeouts::default());
        assert!(!deployer.deploy(&target(), 443, &artifact()).await);
        assert_eq!(mock.calls().len(), 4);
    }

    #[tokio::test]
    async fn missing_file_in_listing_is_failure() {
        let mock = MockHttp::new(vec![
            http(200, "{}"),
            http(200, "[]"),
            http(200, "[]"),
            http(200, r#"[{"name":"disk1","type":"disk"}]"#),
        ]);
        let deployer = RestDeployer::new(&mock, Timeouts::default());
        assert!(!deployer.deploy(&target(), 443, &artifact()).await);
    }

    #[tokio::test]
    async fn auth_rejection_is_failure() {
        let mock = MockHttp::new(vec![Err(TransportError::http_auth())]);
        let deployer = RestDeployer::new(&mock, Timeouts::default());
        assert!(!deployer.deploy(&target(), 443, &artifact()).await);
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn plain_http_binary_url_uses_http_fetch_mode() {
        let mock = MockHttp::new(vec![http(200, "{}"), http(500, "")]);
        let deployer = RestDeployer::new(&mock, Timeouts::default());
        let artifact = DeploymentArtifact::new("http://10.0.0.5/mikroclaw", "{}");
        deployer.deploy(&target(), 443, &artifact).await;
        let reqs = mock.requests.lock().unwrap();
        assert_eq!(reqs[1].json.as_ref().unwrap()["mode"], "http");
    }
}
