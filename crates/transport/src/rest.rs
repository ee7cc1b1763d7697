//! RouterOS REST API client.

use std::time::Duration;

use mikroclaw_protocol::Credentials;
use mikroclaw_protocol::constants::{
    CONNECT_TIMEOUT, REST_FETCH_PATH, REST_FILE_PATH, REST_HTTP_PORT, REST_RESOURCE_PATH,
    REST_SCRIPT_RUN_PATH,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

/// Base URL for the REST service on `port`: plain HTTP on 80, HTTPS otherwise.
pub fn rest_base_url(host: &str, port: u16) -> String {
    let scheme = if port == REST_HTTP_PORT { "http" } else { "https" };
    format!("{scheme}://{host}:{port}")
}

/// One entry of `GET /rest/file`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

/// Authenticated client for one router's REST service.
pub struct RestClient<'a> {
    http: &'a dyn HttpTransport,
    base_url: String,
    credentials: &'a Credentials,
    timeout: Duration,
}

impl<'a> RestClient<'a> {
    pub fn new(
        http: &'a dyn HttpTransport,
        host: &str,
        port: u16,
        credentials: &'a Credentials,
    ) -> Self {
        Self {
            http,
            base_url: rest_base_url(host, port),
            credentials,
            timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{path}", self.base_url))
            .with_auth(self.credentials)
            .with_timeout(self.timeout)
    }

    /// `GET /rest/system/resource`; only 200 counts as success.
    pub async fn check_auth(&self) -> Result<(), TransportError> {
        let resp = self
            .http
            .send(self.request(HttpMethod::Get, REST_RESOURCE_PATH))
            .await?;
        if resp.is_ok() {
            Ok(())
        } else {
            Err(TransportError::Connect(format!(
                "unexpected status {} from {}",
                resp.status, self.base_url
            )))
        }
    }

    /// Asks the router to download `url` into `dst_path`.
    pub async fn tool_fetch(
        &self,
        url: &str,
        dst_path: &str,
        mode: &str,
    ) -> Result<HttpResponse, TransportError> {
        debug!(base = %self.base_url, url, dst_path, mode, "rest tool fetch");
        let body = json!({ "url": url, "dst-path": dst_path, "mode": mode });
        self.http
            .send(self.request(HttpMethod::Post, REST_FETCH_PATH).with_json(body))
            .await
    }

    /// Creates or replaces a file with `content`.
    pub async fn put_file(&self, name: &str, content: &str) -> Result<HttpResponse, TransportError> {
        debug!(base = %self.base_url, name, "rest put file");
        let body = json!({ "name": name, "content": content });
        self.http
            .send(self.request(HttpMethod::Put, REST_FILE_PATH).with_json(body))
            .await
    }

    /// Runs a RouterOS script.
    pub async fn run_script(&self, script: &str) -> Result<HttpResponse, TransportError> {
        debug!(base = %self.base_url, "rest run script");
        let body = json!({ "script": script });
        self.http
            .send(self.request(HttpMethod::Post, REST_SCRIPT_RUN_PATH).with_json(body))
            .await
    }

    /// Lists files on the router.
    pub async fn list_files(&self) -> Result<Vec<RemoteFile>, TransportError> {
        let resp = self
            .http
            .send(self.request(HttpMethod::Get, REST_FILE_PATH))
            .await?;
        if !resp.is_ok() {
            return Err(TransportError::Connect(format!(
                "file listing returned status {}",
                resp.status
            )));
        }
        resp.json()
            .map_err(|e| TransportError::Connect(format!("invalid file listing: {e}")))
    }
}
