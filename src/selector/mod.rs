//! Distance-ranked server selection
//!
//! Ranks directory candidates by great-circle distance from the client,
//! probes the nearest few concurrently and picks the one with the lowest
//! measured round trip. Used for both the speed-test directory and the
//! packet-loss host directory.

use crate::error::{AppError, Result};
use crate::geo;
use crate::models::ServerInfo;
use crate::probe::{run_probes, ProbeOutcome};
use crate::types::Coordinate;
use std::future::Future;
use std::time::Duration;

/// The selection winner together with its measured latency.
///
/// The latency travels with the result rather than living in hidden
/// selector state, so one selector can serve repeated or parallel
/// selection rounds.
#[derive(Debug, Clone)]
pub struct SelectedServer {
    pub server: ServerInfo,
    pub latency: Duration,
}

impl SelectedServer {
    /// Measured latency in fractional milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

/// Picks the best reachable server out of a candidate directory
#[derive(Debug, Clone)]
pub struct ServerSelector {
    client_location: Coordinate,
    probe_concurrency: usize,
    probe_timeout: Duration,
}

impl ServerSelector {
    pub fn new(client_location: Coordinate) -> Self {
        Self {
            client_location,
            probe_concurrency: crate::defaults::DEFAULT_PROBE_CONCURRENCY,
            probe_timeout: crate::defaults::DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_concurrency(mut self, concurrency: usize) -> Self {
        self.probe_concurrency = concurrency.max(1);
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Candidates annotated with distance, nearest first. Stable: equal
    /// distances keep their directory order.
    pub fn rank_by_distance(&self, candidates: &[ServerInfo]) -> Vec<ServerInfo> {
        let mut ranked: Vec<ServerInfo> = candidates
            .iter()
            .map(|candidate| {
                let mut server = candidate.clone();
                server.distance_km = geo::distance(self.client_location, server.location);
                server
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Probe the `top_n` nearest candidates concurrently and return the
    /// one with the lowest measured round trip; its latency field is
    /// populated with the winning probe's value.
    ///
    /// Ties go to the smaller distance, then to directory order. Fails
    /// with `NoServerReachable` when every probe fails.
    pub async fn best_server<F, Fut, O>(
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
        if candidates.is_empty() {
            return Err(AppError::directory_unavailable(
                "candidate directory is empty",
            ));
        }

        let mut nearest = self.rank_by_distance(candidates);
        nearest.truncate(top_n.max(1));

        // Carry the rank so ties can fall back to directory order
        let indexed: Vec<(usize, ServerInfo)> = nearest.into_iter().enumerate().collect();
        let outcomes = run_probes(
            indexed,
            self.probe_concurrency,
            self.probe_timeout,
            |(_, server)| attempt(server),
            on_each,
        )
        .await;

        let winner = outcomes
            .into_iter()
            .filter_map(|((rank, server), outcome)| match outcome {
                ProbeOutcome::Success { elapsed } => Some((rank, server, elapsed)),
                _ => None,
            })
            .min_by(|(rank_a, server_a, lat_a), (rank_b, server_b, lat_b)| {
                lat_a
                    .cmp(lat_b)
                    .then_with(|| {
                        server_a
                            .distance_km
                            .partial_cmp(&server_b.distance_km)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .then_with(|| rank_a.cmp(rank_b))
            });

        match winner {
            Some((_, mut server, latency)) => {
                server.latency = Some(latency);
                Ok(SelectedServer { server, latency })
            }
            None => Err(AppError::no_server_reachable(
                "all probed servers failed to respond",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn server(name: &str, lat: f64, lon: f64) -> ServerInfo {
        ServerInfo::new(
            name.to_string(),
            "Sponsor".to_string(),
            format!("{}.example.net:8080", name),
            format!("http://{}.example.net/speedtest/upload.php", name),
            Coordinate::new(lat, lon),
        )
    }

    fn selector() -> ServerSelector {
        ServerSelector::new(Coordinate::new(0.0, 0.0))
    }

    #[test]
    fn test_rank_by_distance_is_ascending_and_stable() {
        let candidates = vec![
            server("far", 40.0, 40.0),
            server("near-a", 1.0, 1.0),
            server("near-b", 1.0, 1.0), // same spot; must stay after near-a
            server("mid", 10.0, 10.0),
        ];

        let ranked = selector().rank_by_distance(&candidates);
        let names: Vec<&str> = ranked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["near-a", "near-b", "mid", "far"]);
        assert!(ranked.iter().all(|s| s.distance_km >= 0.0));
        assert!(ranked[0].distance_km <= ranked[3].distance_km);
    }

    #[tokio::test]
    async fn test_probes_only_the_nearest_top_n() {
        let candidates = vec![
            server("a", 1.0, 1.0),
            server("b", 2.0, 2.0),
            server("c", 3.0, 3.0),
            server("d", 50.0, 50.0),
        ];

        let probed = Mutex::new(Vec::new());
        let result = selector()
            .best_server(
                &candidates,
                2,
                |s| {
                    probed.lock().unwrap().push(s.name.clone());
                    async { Ok(Duration::from_millis(10)) }
                },
                |_| {},
            )
            .await
            .unwrap();

        let mut probed = probed.into_inner().unwrap();
        probed.sort();
        assert_eq!(probed, vec!["a", "b"]);
        assert!(result.server.name == "a" || result.server.name == "b");
    }

    #[tokio::test]
    async fn test_lowest_latency_wins() {
        let candidates = vec![
            server("a", 1.0, 1.0),
            server("b", 2.0, 2.0),
            server("c", 3.0, 3.0),
        ];
        let latencies: HashMap<&str, Option<u64>> =
            [("a", None), ("b", Some(40)), ("c", Some(25))].into();

        let result = selector()
            .best_server(
                &candidates,
                3,
                |s| {
                    let outcome = latencies[s.name.as_str()];
                    async move {
                        match outcome {
                            Some(ms) => Ok(Duration::from_millis(ms)),
                            None => Err(AppError::network("probe failed")),
                        }
                    }
                },
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(result.server.name, "c");
        assert_eq!(result.latency, Duration::from_millis(25));
        // The winner keeps its measured latency for later reuse
        assert_eq!(result.server.latency, Some(Duration::from_millis(25)));
    }

    #[tokio::test]
    async fn test_latency_tie_broken_by_distance() {
        let candidates = vec![server("far", 5.0, 5.0), server("near", 1.0, 1.0)];

        let result = selector()
            .best_server(
                &candidates,
                2,
                |_| async { Ok(Duration::from_millis(30)) },
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(result.server.name, "near");
    }

    #[tokio::test]
    async fn test_all_failures_is_no_server_reachable() {
        let candidates = vec![server("a", 1.0, 1.0), server("b", 2.0, 2.0)];

        let err = selector()
            .best_server(
                &candidates,
                2,
                |_| async { Err(AppError::network("down")) },
                |_| {},
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoServerReachable(_)));
    }

    #[tokio::test]
    async fn test_empty_directory_is_unavailable() {
        let err = selector()
            .best_server(&[], 10, |_| async { Ok(Duration::ZERO) }, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DirectoryUnavailable(_)));
    }

    #[tokio::test]
    async fn test_top_n_larger_than_directory_uses_all() {
        let candidates = vec![server("a", 1.0, 1.0), server("b", 2.0, 2.0)];
        let probed = Mutex::new(0usize);

        selector()
            .best_server(
                &candidates,
                10,
                |_| {
                    *probed.lock().unwrap() += 1;
                    async { Ok(Duration::from_millis(1)) }
                },
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(probed.into_inner().unwrap(), 2);
    }
}
