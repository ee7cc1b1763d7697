//! Recording mocks shared by the deploy tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use mikroclaw_protocol::{DeploymentArtifact, Endpoint};
use mikroclaw_transport::{
    CommandOutput, CommandRunner, CommandSpec, HttpRequest, HttpResponse, HttpTransport,
    TcpConnector, TransportError,
};

use crate::driver::MethodDriver;

/// Driver with a fixed set of responsive endpoints.
pub(crate) struct MockDriver {
    available: Vec<Endpoint>,
    /// Probes that report "unavailable" before `available` takes effect.
    blind_probes: usize,
    check_error: Option<TransportError>,
    deploy_results: Mutex<Vec<bool>>,
    pub probes: Mutex<Vec<Endpoint>>,
    pub checks: Mutex<Vec<Endpoint>>,
    pub deploys: Mutex<Vec<Endpoint>>,
}

impl MockDriver {
    pub fn new(available: Vec<Endpoint>) -> Self {
        Self {
            available,
            blind_probes: 0,
            check_error: None,
            deploy_results: Mutex::new(Vec::new()),
            probes: Mutex::new(Vec::new()),
            checks: Mutex::new(Vec::new()),
            deploys: Mutex::new(Vec::new()),
        }
    }

    pub fn blind_for(mut self, probes: usize) -> Self {
        self.blind_probes = probes;
        self
    }

    pub fn failing_check(mut self, err: TransportError) -> Self {
        self.check_error = Some(err);
        self
    }

    /// Results for successive deploy calls; `false` once exhausted.
    pub fn deploy_results(self, results: Vec<bool>) -> Self {
        *self.deploy_results.lock().unwrap() = results;
        self
    }
}

impl MethodDriver for MockDriver {
    fn probe(&self, endpoint: Endpoint) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let mut probes = self.probes.lock().unwrap();
        probes.push(endpoint);
        let ok = probes.len() > self.blind_probes && self.available.contains(&endpoint);
        Box::pin(async move { ok })
    }

    fn check(
        &self,
        endpoint: Endpoint,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>> {
        self.checks.lock().unwrap().push(endpoint);
        let result = match &self.check_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        };
        Box::pin(async move { result })
    }

    fn deploy<'a>(
        &'a self,
        endpoint: Endpoint,
        _artifact: &'a DeploymentArtifact,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        self.deploys.lock().unwrap().push(endpoint);
        let mut results = self.deploy_results.lock().unwrap();
        let ok = if results.is_empty() {
            false
        } else {
            results.remove(0)
        };
        Box::pin(async move { ok })
    }
}

/// Replays queued responses and records every request.
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

    /// `(method, path)` of each request, with the base URL stripped.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| {
                let path = r.url.splitn(4, '/').nth(3).unwrap_or("");
                (r.method.as_str().to_string(), format!("/{path}"))
            })
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

/// Replays queued command results. For `scp` runs it snapshots the local
/// file so tests can check what would have been uploaded.
pub(crate) struct MockRunner {
    pub sshpass: bool,
    responses: Mutex<Vec<Result<CommandOutput, TransportError>>>,
    pub calls: Mutex<Vec<CommandSpec>>,
    pub uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockRunner {
    pub fn new(responses: Vec<Result<CommandOutput, TransportError>>) -> Self {
        Self {
            sshpass: false,
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.program.clone())
            .collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(
        &self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, TransportError>> + Send + '_>> {
        if spec.program == "scp" || spec.args.iter().any(|a| a == "scp") {
            let n = spec.args.len();
            let local = &spec.args[n - 2];
            let remote = spec.args[n - 1]
                .split_once(':')
                .map(|(_, r)| r.to_string())
                .unwrap_or_default();
            let content = std::fs::read(local).unwrap_or_default();
            self.uploads.lock().unwrap().push((remote, content));
        }
        self.calls.lock().unwrap().push(spec);
        let mut queue = self.responses.lock().unwrap();
        let next = if queue.is_empty() {
            Err(TransportError::Connect("no command result queued".into()))
        } else {
            queue.remove(0)
        };
        Box::pin(async move { next })
    }

    fn has_program(&self, program: &str) -> bool {
        program == "sshpass" && self.sshpass
    }
}

/// Refuses every connection and records the ports asked for.
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

pub(crate) fn cmd_ok(stdout: &str) -> Result<CommandOutput, TransportError> {
    Ok(CommandOutput {
        success: true,
        code: Some(0),
        stdout: stdout.into(),
        stderr: String::new(),
    })
}

pub(crate) fn cmd_failed(stderr: &str) -> Result<CommandOutput, TransportError> {
    Ok(CommandOutput {
        success: false,
        code: Some(1),
        stdout: String::new(),
        stderr: stderr.into(),
    })
}

pub(crate) fn http(status: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(status, body.as_bytes().to_vec()))
}
