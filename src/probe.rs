//! TCP reachability probing for monitored endpoints.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;

/// Reachability check for one host/port pair.
///
/// Total by contract: every failure path (refused, timed out, unresolvable)
/// reports unreachable instead of surfacing an error, so callers can treat
/// the result as a plain health observation.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> bool;
}

/// Probe that attempts a real TCP connection with a bounded timeout.
pub struct TcpHealthProbe;

#[async_trait]
impl HealthProbe for TcpHealthProbe {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> bool {
        let addr = format!("{host}:{port}");

        match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(_)) => {
                tracing::debug!("Successfully connected to {}", addr);
                true
            }
            Ok(Err(e)) => {
                tracing::debug!("Connection failed to {}: {}", addr, e);
                false
            }
            Err(_) => {
                tracing::debug!("Connection timeout to {}", addr);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn probe_reports_listening_socket_as_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let up = TcpHealthProbe.probe("127.0.0.1", port, Duration::from_secs(1)).await;
        assert!(up);
    }

    #[tokio::test]
    async fn probe_reports_closed_port_as_unreachable() {
        // Bind then drop to get a port that is very likely closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let up = TcpHealthProbe.probe("127.0.0.1", port, Duration::from_secs(1)).await;
        assert!(!up);
    }

    #[tokio::test]
    async fn probe_reports_unresolvable_host_as_unreachable() {
        let up = TcpHealthProbe
            .probe("host.invalid", 80, Duration::from_millis(500))
            .await;
        assert!(!up);
    }
}
