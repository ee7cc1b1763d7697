//! Transport probes and clients for RouterOS management interfaces.
//!
//! Every call here is bounded by an explicit timeout and reports failures
//! as a [`TransportError`], which carries exactly one
//! [`FailureCategory`](mikroclaw_protocol::FailureCategory).
//!
//! Subprocesses (`ssh`, `scp`, `sshpass`) and HTTP go through the
//! [`CommandRunner`] and [`HttpTransport`] traits so higher layers can be
//! tested without a router.

pub mod api;
pub mod command;
pub mod download;
pub mod error;
pub mod http;
pub mod rest;
pub mod ssh;
pub mod tcp;
mod tls;

// Re-export primary types for convenience.
pub use api::ApiSession;
pub use command::{CommandOutput, CommandRunner, CommandSpec, SystemCommandRunner};
pub use download::download_to_file;
pub use error::TransportError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use rest::{RemoteFile, RestClient, rest_base_url};
pub use ssh::{SshClient, SshTarget};
pub use tcp::{SystemTcp, TcpConnector, tcp_connect, tcp_probe};
