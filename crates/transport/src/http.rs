//! HTTP(S) transport.
//!
//! Router certificates are self-signed, so TLS verification is disabled.
//! 401 and 403 are surfaced as `Auth` errors; every other status is
//! returned to the caller.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use mikroclaw_protocol::Credentials;
use mikroclaw_protocol::constants::CONNECT_TIMEOUT;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// One HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub basic_auth: Option<Credentials>,
    pub json: Option<serde_json::Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            basic_auth: None,
            json: None,
            timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn with_auth(mut self, credentials: &Credentials) -> Self {
        self.basic_auth = Some(credentials.clone());
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Sends HTTP requests.
pub trait HttpTransport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>>;
}

/// [`HttpTransport`] backed by `reqwest`.
///
/// Two flavours exist: [`router`](Self::router) talks to RouterOS REST
/// endpoints, which carry self-signed certificates, and skips certificate
/// checks; [`verified`](Self::verified) validates against the bundled web
/// PKI roots and is the only one used to fetch agent binaries.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    verifies_certs: bool,
}

impl ReqwestTransport {
    /// Client for router REST calls. Accepts any server certificate.
    pub fn router() -> Result<Self, TransportError> {
        Self::build(false)
    }

    /// Client for downloads from the public internet.
    pub fn verified() -> Result<Self, TransportError> {
        Self::build(true)
    }

    fn build(verify: bool) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Connect(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            verifies_certs: verify,
        })
    }

    pub fn verifies_certs(&self) -> bool {
        self.verifies_certs
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>> {
        Box::pin(async move {
            debug!(method = request.method.as_str(), url = %request.url, "http request");
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
                HttpMethod::Put => self.client.put(&request.url),
            }
            .timeout(request.timeout);
            if let Some(creds) = &request.basic_auth {
                builder = builder.basic_auth(&creds.user, Some(&creds.password));
            }
            if let Some(body) = &request.json {
                builder = builder.json(body);
            }

            let resp = builder
                .send()
                .await
                .map_err(|e| classify_reqwest(&e, request.timeout))?;
            let status = resp.status().as_u16();
            debug!(status, url = %request.url, "http response");
            if status == 401 || status == 403 {
                return Err(TransportError::http_auth());
            }
            let body = resp
                .bytes()
                .await
                .map_err(|e| classify_reqwest(&e, request.timeout))?;
            Ok(HttpResponse::new(status, body.to_vec()))
        })
    }
}

/// Maps a `reqwest` failure onto the transport taxonomy.
pub(crate) fn classify_reqwest(err: &reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        return TransportError::timed_out("request", timeout);
    }
    if let Some(status) = err.status() {
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return TransportError::http_auth();
        }
    }
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            return TransportError::from_io(io);
        }
        source = inner.source();
    }
    TransportError::Connect(format!("request failed: {err}"))
}
