//! RouterOS binary API session (`api` on 8728, `api-ssl` on 8729).

use std::time::Duration;

use mikroclaw_api_wire::{Sentence, WireError, write_sentence};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::TransportError;
use crate::tcp::tcp_connect;
use crate::tls::connect_insecure;

trait ApiStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> ApiStream for T {}

/// An open connection to the binary API.
pub struct ApiSession {
    stream: Box<dyn ApiStream>,
    peer: String,
}

impl ApiSession {
    /// Connects to `host:port`, wrapping the socket in TLS when `tls` is set.
    ///
    /// `timeout` bounds the TCP connect and the TLS handshake separately.
    pub async fn connect(
        host: &str,
        port: u16,
        tls: bool,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let tcp = tcp_connect(host, port, timeout).await?;
        let stream: Box<dyn ApiStream> = if tls {
            Box::new(connect_insecure(host, tcp, timeout).await?)
        } else {
            Box::new(tcp)
        };
        debug!(host, port, tls, "api session open");
        Ok(Self {
            stream,
            peer: format!("{host}:{port}"),
        })
    }

    /// Writes one sentence.
    pub async fn send(&mut self, sentence: &Sentence) -> Result<(), TransportError> {
        debug!(peer = %self.peer, command = ?sentence.command(), "api send");
        write_sentence(&mut self.stream, sentence.words())
            .await
            .map_err(wire_error)
    }

    /// Shuts the connection down. Errors are ignored.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!(peer = %self.peer, error = %e, "api shutdown failed");
        }
    }
}

fn wire_error(err: WireError) -> TransportError {
    match err {
        WireError::Io(e) => TransportError::from(e),
        other => TransportError::Connect(format!("API framing error: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mikroclaw_api_wire::read_sentence;
    use mikroclaw_protocol::FailureCategory;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn sends_sentences_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let first = read_sentence(&mut sock).await.unwrap();
            let second = read_sentence(&mut sock).await.unwrap();
            (first, second)
        });

        let mut session = ApiSession::connect("127.0.0.1", port, false, Duration::from_secs(2))
            .await
            .unwrap();
        session
            .send(&Sentence::new("!login").attribute("name", "admin"))
            .await
            .unwrap();
        session
            .send(&Sentence::new("!exec").attribute("command", "/system/identity/print"))
            .await
            .unwrap();
        session.close().await;

        let (first, second) = server.await.unwrap();
        assert_eq!(first, vec!["!login", "=name=admin"]);
        assert_eq!(second, vec!["!exec", "=command=/system/identity/print"]);
    }

    #[tokio::test]
    async fn empty_word_is_framing_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let _ = listener.accept().await;
        });
        let mut session = ApiSession::connect("127.0.0.1", port, false, Duration::from_secs(2))
            .await
            .unwrap();
        let err = session
            .send(&Sentence::from_words(vec!["!login".into(), String::new()]))
            .await
            .unwrap_err();
        assert_eq!(err.category(), FailureCategory::Connect);
        assert!(err.detail().contains("framing"));
    }

    #[tokio::test]
    async fn refused_connect_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let err = ApiSession::connect("127.0.0.1", port, false, Duration::from_secs(2))
            .await
            .err()
            .unwrap();
        assert_eq!(err.category(), FailureCategory::Connect);
    }
}
