//! Adaptive, concurrency-controlled throughput measurement
//!
//! A measurement runs in two stages: a small fixed preflight transfer
//! detects the line type, which selects the full-scale test profile for
//! the real measurement. The real measurement fans out
//! `config.concurrency` transfer workers against one server for a
//! bounded window and reduces their byte totals into a single Mbit/s
//! figure. Workers fail independently; the phase fails only when every
//! worker does.

use crate::error::{AppError, Result};
use crate::models::{ServerInfo, TestConfig};
use crate::transport::Transport;
use crate::types::{Direction, LineType};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Throughput in Mbit/s from a byte total and the measurement window.
///
/// The window covers the measurement stage only; preflight and setup are
/// not part of it.
pub fn mbits(total_bytes: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds == 0.0 {
        return 0.0;
    }
    (total_bytes as f64 * 8.0) / 1_000_000.0 / seconds
}

/// Runs preflight and full-scale throughput measurements
pub struct ThroughputEngine {
    transport: Arc<dyn Transport>,
}

impl ThroughputEngine {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Detect the line type with one small download measurement. A
    /// preflight failure fails the whole throughput feature; no
    /// full-scale measurement is attempted on top of it.
    pub async fn preflight<O>(&self, server: &ServerInfo, on_each: O) -> Result<f64>
    where
        O: Fn(bool),
    {
        self.measure(Direction::Download, server, &TestConfig::preflight(), on_each)
            .await
    }

    /// Preflight plus classification
    pub async fn detect_line_type<O>(&self, server: &ServerInfo, on_each: O) -> Result<(f64, LineType)>
    where
        O: Fn(bool),
    {
        let pre_speed = self.preflight(server, on_each).await?;
        Ok((pre_speed, LineType::from_preflight(pre_speed)))
    }

    /// One complete measurement phase in the given direction.
    ///
    /// Spawns `config.concurrency` workers that move bytes until the
    /// window elapses, sharing one atomic byte accumulator. `on_each`
    /// fires once per finished worker. Every call is independent; there
    /// is no cross-call state.
    pub async fn measure<O>(
        &self,
        direction: Direction,
        server: &ServerInfo,
        config: &TestConfig,
        on_each: O,
    ) -> Result<f64>
    where
        O: Fn(bool),
    {
        config.validate()?;

        let total_bytes = Arc::new(AtomicU64::new(0));
        let started = Instant::now();
        let deadline = started + config.min_test_duration;

        let mut workers = FuturesUnordered::new();
        for _ in 0..config.concurrency {
            let transport = self.transport.clone();
            let server = server.clone();
            let config = *config;
            let total_bytes = total_bytes.clone();
            workers.push(tokio::spawn(async move {
                transfer_worker(direction, &server, &config, transport, &total_bytes, deadline)
                    .await
            }));
        }

        let mut successes = 0usize;
        while let Some(joined) = workers.next().await {
            let worker_ok = matches!(joined, Ok(true));
            if worker_ok {
                successes += 1;
            }
            on_each(worker_ok);
        }
        let elapsed = started.elapsed();

        if successes == 0 {
            return Err(AppError::transfer_failed(format!(
                "all {} {} workers failed",
                config.concurrency,
                direction.as_str()
            )));
        }

        Ok(mbits(total_bytes.load(Ordering::Relaxed), elapsed))
    }
}

/// One transfer worker: repeats deadline-bounded requests with growing
/// payload sizes, adding every byte moved to the shared accumulator.
/// Returns whether the worker moved any bytes at all.
async fn transfer_worker(
    direction: Direction,
    server: &ServerInfo,
    config: &TestConfig,
    transport: Arc<dyn Transport>,
    total_bytes: &AtomicU64,
    deadline: Instant,
) -> bool {
    let mut size = config.start_size;
    let mut moved: u64 = 0;

    while Instant::now() < deadline {
        let result = match direction {
            Direction::Download => {
                transport
                    .stream_download(&server.download_url(size), deadline)
                    .await
            }
            Direction::Upload => {
                transport
                    .stream_upload(&server.upload_url(), size, config.chunk_size, deadline)
                    .await
            }
        };

        match result {
            Ok(transferred) => {
                moved += transferred;
                total_bytes.fetch_add(transferred, Ordering::Relaxed);
            }
            // A worker that cannot keep its connection stops; bytes it
            // already contributed stay counted.
            Err(_) => break,
        }
        size = config.next_size(size);
    }

    moved > 0
}
