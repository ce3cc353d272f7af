//! Packet-loss estimation against a quality-server directory

use crate::error::{AppError, Result};
use crate::models::ServerInfo;
use crate::probe::run_probes;
use crate::selector::{SelectedServer, ServerSelector};
use std::future::Future;
use std::time::Duration;

/// Concurrent loss probes are capped low so the measurement does not
/// congest the path it is measuring.
const PACKET_LOSS_CONCURRENCY: usize = 2;

/// Selects a quality host and measures the loss ratio against it
#[derive(Debug, Clone)]
pub struct PacketLossEstimator {
    selector: ServerSelector,
    probe_timeout: Duration,
}

impl PacketLossEstimator {
    pub fn new(selector: ServerSelector) -> Self {
        Self {
            selector,
            probe_timeout: crate::defaults::DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Pick the best reachable host from the packet-loss directory; same
    /// distance/latency selection as the speed-test directory.
    pub async fn best_quality_server<F, Fut, O>(
        &self,
        candidates: &[ServerInfo],
        top_n: usize,
        attempt: F,
        on_each: O,
    ) -> Result<SelectedServer>
    where
        F: Fn(ServerInfo) -> Fut,
        Fut: Future<Output = Result<Duration>>,
        O: Fn(bool),
    {
        self.selector
            .best_server(candidates, top_n, attempt, on_each)
            .await
    }

    /// Loss percentage over `probe_count` independent probes, rounded to
    /// the nearest integer. Zero probes means the feature is unavailable,
    /// never a fabricated 0%.
    pub async fn packet_loss<F, Fut>(
        &self,
        server: &ServerInfo,
        probe_count: usize,
        attempt: F,
    ) -> Result<u32>
    where
        F: Fn(ServerInfo) -> Fut,
        Fut: Future<Output = Result<Duration>>,
    {
        if probe_count == 0 {
            return Err(AppError::config(
                "packet loss requires at least one probe",
            ));
        }

        let outcomes = run_probes(
            vec![server.clone(); probe_count],
            PACKET_LOSS_CONCURRENCY,
            self.probe_timeout,
            attempt,
            |_| {},
        )
        .await;

        let failed = outcomes.iter().filter(|(_, o)| !o.is_success()).count();
        Ok(loss_percent(failed, probe_count))
    }
}

/// round(100 × failed / total)
fn loss_percent(failed: usize, total: usize) -> u32 {
    ((failed as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::assert_ok;

    fn server() -> ServerInfo {
        ServerInfo::new(
            "Oslo",
            "Sponsor",
            "oslo.example.net:8080",
            "http://oslo.example.net/speedtest/upload.php",
            Coordinate::new(59.9, 10.7),
        )
    }

    fn estimator() -> PacketLossEstimator {
        PacketLossEstimator::new(ServerSelector::new(Coordinate::new(0.0, 0.0)))
            .with_probe_timeout(Duration::from_millis(500))
    }

    #[test]
    fn test_loss_percent_rounding() {
        assert_eq!(loss_percent(2, 5), 40);
        assert_eq!(loss_percent(0, 5), 0);
        assert_eq!(loss_percent(5, 5), 100);
        assert_eq!(loss_percent(1, 3), 33);
        assert_eq!(loss_percent(2, 3), 67);
    }

    #[tokio::test]
    async fn test_two_of_five_failures_is_forty_percent() {
        let counter = AtomicUsize::new(0);
        let loss = estimator()
            .packet_loss(&server(), 5, |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(AppError::timeout("lost"))
                    } else {
                        Ok(Duration::from_millis(8))
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(loss, 40);
    }

    #[tokio::test]
    async fn test_no_loss() {
        let result = estimator()
            .packet_loss(&server(), 10, |_| async { Ok(Duration::from_millis(5)) })
            .await;
        let loss = tokio_test::assert_ok!(result);
        assert_eq!(loss, 0);
    }

    #[tokio::test]
    async fn test_zero_probes_is_unavailable_not_zero_loss() {
        let err = estimator()
            .packet_loss(&server(), 0, |_| async { Ok(Duration::ZERO) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_probe_concurrency_stays_small() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        estimator()
            .packet_loss(&server(), 12, |_| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(Duration::from_millis(1))
                }
            })
            .await
            .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= PACKET_LOSS_CONCURRENCY);
    }
}
