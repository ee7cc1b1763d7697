use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{API_PORTS, API_TLS_PORT, REST_HTTP_PORT, REST_PORTS, SSH_PORTS};

/// Management surface used to reach the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    #[serde(rename = "ssh")]
    Ssh,
    #[serde(rename = "rest")]
    Rest,
    #[serde(rename = "api")]
    Api,
}

impl TransportKind {
    /// All kinds in detection (and auto-selection) priority order.
    pub const ALL: [TransportKind; 3] = [TransportKind::Ssh, TransportKind::Rest, TransportKind::Api];

    /// Returns the lowercase method name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Ssh => "ssh",
            TransportKind::Rest => "rest",
            TransportKind::Api => "api",
        }
    }

    /// Ports probed for this kind, in order.
    pub fn candidate_ports(self) -> &'static [u16] {
        match self {
            TransportKind::Ssh => &SSH_PORTS,
            TransportKind::Rest => &REST_PORTS,
            TransportKind::Api => &API_PORTS,
        }
    }

    /// Port used when a method is forced without an explicit port.
    pub fn default_port(self) -> u16 {
        match self {
            TransportKind::Ssh => 22,
            TransportKind::Rest => 443,
            TransportKind::Api => 8728,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method name that is not one of `ssh`, `rest`, `api`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown deployment method '{0}' (expected ssh, rest or api)")]
pub struct UnknownTransport(pub String);

impl FromStr for TransportKind {
    type Err = UnknownTransport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssh" => Ok(TransportKind::Ssh),
            "rest" => Ok(TransportKind::Rest),
            "api" => Ok(TransportKind::Api),
            _ => Err(UnknownTransport(s.to_string())),
        }
    }
}

/// A transport kind bound to the port it answered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub kind: TransportKind,
    pub port: u16,
}

impl Endpoint {
    pub fn new(kind: TransportKind, port: u16) -> Self {
        Self { kind, port }
    }

    /// Whether the transport on this port is wrapped in TLS.
    ///
    /// SSH is always encrypted; REST is HTTPS on every port except 80;
    /// the binary API is TLS only on 8729.
    pub fn is_secure(&self) -> bool {
        match self.kind {
            TransportKind::Ssh => true,
            TransportKind::Rest => self.port != REST_HTTP_PORT,
            TransportKind::Api => self.port == API_TLS_PORT,
        }
    }

    /// Human-readable label for method menus.
    pub fn label(&self) -> String {
        match self.kind {
            TransportKind::Ssh => format!("SSH/SCP (ssh:{})", self.port),
            TransportKind::Rest if self.is_secure() => {
                format!("REST API + HTTPS fetch (https:{}) [recommended]", self.port)
            }
            TransportKind::Rest => format!("REST API + HTTP fetch (http:{})", self.port),
            TransportKind::Api if self.is_secure() => {
                format!("MikroTik Binary API SSL (api-ssl:{})", self.port)
            }
            TransportKind::Api => format!("MikroTik Binary API (api:{})", self.port),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.port)
    }
}

/// Router login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What gets installed: the agent binary (fetched from a URL) and its
/// already-rendered JSON config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentArtifact {
    pub binary_url: String,
    pub config_json: String,
}

impl DeploymentArtifact {
    pub fn new(binary_url: impl Into<String>, config_json: impl Into<String>) -> Self {
        Self {
            binary_url: binary_url.into(),
            config_json: config_json.into(),
        }
    }

    /// RouterOS `/tool fetch` mode matching the binary URL's scheme.
    pub fn fetch_mode(&self) -> &'static str {
        if self.binary_url.starts_with("http://") {
            "http"
        } else {
            "https"
        }
    }
}

/// User-facing failure bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureCategory {
    Connect,
    Auth,
    Timeout,
}

impl FailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureCategory::Connect => "connect",
            FailureCategory::Auth => "auth",
            FailureCategory::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
