//! Method detection.
//!
//! Each kind probes its candidate ports in order and stops at the first
//! that answers. Kinds are tried SSH, REST, then binary API; the result
//! keeps that order, which is also the auto-selection priority.

use mikroclaw_protocol::{Endpoint, TransportKind};
use tracing::info;

use crate::driver::MethodDriver;

/// First responsive port for `kind`.
pub async fn detect_kind(driver: &dyn MethodDriver, kind: TransportKind) -> Option<Endpoint> {
    for &port in kind.candidate_ports() {
        let endpoint = Endpoint::new(kind, port);
        if driver.probe(endpoint).await {
            return Some(endpoint);
        }
    }
    None
}

/// Every available method, in priority order.
pub async fn detect_all(driver: &dyn MethodDriver) -> Vec<Endpoint> {
    let mut found = Vec::new();
    for kind in TransportKind::ALL {
        if let Some(endpoint) = detect_kind(driver, kind).await {
            info!(%endpoint, "method available");
            found.push(endpoint);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDriver;

    #[tokio::test]
    async fn only_rest_on_80() {
        let driver = MockDriver::new(vec![Endpoint::new(TransportKind::Rest, 80)]);
        assert_eq!(
            detect_all(&driver).await,
            vec![Endpoint::new(TransportKind::Rest, 80)]
        );
        assert!(driver.deploys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn priority_order_is_ssh_rest_api() {
        let driver = MockDriver::new(vec![
            Endpoint::new(TransportKind::Api, 8728),
            Endpoint::new(TransportKind::Rest, 443),
            Endpoint::new(TransportKind::Ssh, 2222),
        ]);
        assert_eq!(
            detect_all(&driver).await,
            vec![
                Endpoint::new(TransportKind::Ssh, 2222),
                Endpoint::new(TransportKind::Rest, 443),
                Endpoint::new(TransportKind::Api, 8728),
            ]
        );
    }

    #[tokio::test]
    async fn probes_candidate_ports_in_order_and_stops_at_first_hit() {
        let driver = MockDriver::new(vec![
            Endpoint::new(TransportKind::Ssh, 8022),
            Endpoint::new(TransportKind::Api, 8729),
            Endpoint::new(TransportKind::Api, 8728),
        ]);
        detect_all(&driver).await;
        let probed: Vec<String> = driver
            .probes
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            probed,
            ["ssh:22", "ssh:2222", "ssh:8022", "rest:443", "rest:80", "api:8729"]
        );
    }

    #[tokio::test]
    async fn nothing_available() {
        let driver = MockDriver::new(vec![]);
        assert!(detect_all(&driver).await.is_empty());
        assert!(detect_kind(&driver, TransportKind::Rest).await.is_none());
    }
}
