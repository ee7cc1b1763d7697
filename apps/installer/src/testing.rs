//! Test doubles for the installer flows.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use mikroclaw_deploy::Timeouts;
use mikroclaw_transport::{
    CommandOutput, CommandRunner, CommandSpec, HttpRequest, HttpResponse, HttpTransport,
    TcpConnector, TransportError,
};

pub(crate) const LISTING_WITH_CONFIG: &str =
    r#"[{"name":"disk1/mikroclaw","type":"file"},{"name":"disk1/mikroclaw.env.json","type":".json file"}]"#;

/// Replays queued responses and records request URLs.
pub(crate) struct MockHttp {
    responses: Mutex<Vec<Result<HttpResponse, TransportError>>>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttp {
    pub fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    /// Request paths with scheme and authority stripped.
    pub fn paths(&self) -> Vec<String> {
        self.urls()
            .iter()
            .map(|u| format!("/{}", u.splitn(4, '/').nth(3).unwrap_or("")))
            .collect()
    }
}

impl HttpTransport for MockHttp {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>> {
        self.requests.lock().unwrap().push(request);
        let mut queue = self.responses.lock().unwrap();
        let next = if queue.is_empty() {
            Err(TransportError::Connect("no response queued".into()))
        } else {
            queue.remove(0)
        };
        Box::pin(async move { next })
    }
}

/// Runner with no programs; every run fails to start.
pub(crate) struct NoCommands;

impl CommandRunner for NoCommands {
    fn run(
        &self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, TransportError>> + Send + '_>> {
        let err = TransportError::Connect(format!("failed to start {}", spec.program));
        Box::pin(async move { Err(err) })
    }

    fn has_program(&self, _program: &str) -> bool {
        false
    }
}

/// Refuses every TCP connection and records the ports tried.
#[derive(Default)]
pub(crate) struct ClosedPorts {
    pub attempts: Mutex<Vec<u16>>,
}

impl TcpConnector for ClosedPorts {
    fn reach<'a>(
        &'a self,
        host: &'a str,
        port: u16,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        self.attempts.lock().unwrap().push(port);
        let err = TransportError::Connect(format!("connection to {host}:{port} refused"));
        Box::pin(async move { Err(err) })
    }
}

pub(crate) fn http(status: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(status, body.as_bytes().to_vec()))
}

pub(crate) fn fast_timeouts() -> Timeouts {
    Timeouts {
        tcp_probe: Duration::from_millis(200),
        ssh_probe: Duration::from_millis(200),
        http: Duration::from_millis(200),
        transfer: Duration::from_millis(200),
    }
}
