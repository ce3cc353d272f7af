//! Latency and jitter estimation over repeated round trips

use crate::error::{AppError, Result};
use crate::models::{MeasurementSample, ServerInfo};
use std::future::Future;
use std::time::Duration;

/// Latency/jitter figures derived from one sampling round
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyReport {
    /// Arithmetic mean of the successful round trips, in milliseconds
    pub latency_ms: f64,
    /// Mean absolute difference between consecutive successful samples
    pub jitter_ms: f64,
    /// How many of the attempted samples succeeded
    pub successful_samples: usize,
}

/// Takes sequential latency samples against one server.
///
/// Samples run strictly one after another; overlapping them would bias
/// the timing.
#[derive(Debug, Clone)]
pub struct LatencyJitterEstimator {
    sample_count: usize,
}

impl Default for LatencyJitterEstimator {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_LATENCY_SAMPLES)
    }
}

impl LatencyJitterEstimator {
    pub fn new(sample_count: usize) -> Self {
        Self {
            sample_count: sample_count.max(1),
        }
    }

    /// Measure latency and jitter with `sample_count` sequential round
    /// trips. Individual samples may fail; figures derive only from the
    /// successful ones. Fewer than two successes cannot produce a jitter
    /// value and yield `InsufficientSamples`; callers must treat jitter
    /// as absent, not zero.
    pub async fn measure<F, Fut>(&self, server: &ServerInfo, attempt: F) -> Result<LatencyReport>
    where
        F: Fn(ServerInfo) -> Fut,
        Fut: Future<Output = Result<Duration>>,
    {
        let mut samples = Vec::with_capacity(self.sample_count);
        for _ in 0..self.sample_count {
            match attempt(server.clone()).await {
                Ok(elapsed) => samples.push(MeasurementSample::latency(elapsed)),
                Err(_) => samples.push(MeasurementSample::failed()),
            }
        }
        Self::reduce(&samples)
    }

    /// Derive the report from an ordered sample sequence. Failed samples
    /// are skipped; jitter compares temporally consecutive successes.
    pub fn reduce(samples: &[MeasurementSample]) -> Result<LatencyReport> {
        let successful: Vec<f64> = samples
            .iter()
            .filter(|s| s.is_success())
            .map(|s| s.elapsed_ms())
            .collect();

        if successful.len() < 2 {
            return Err(AppError::insufficient_samples(format!(
                "need at least 2 successful samples for jitter, got {}",
                successful.len()
            )));
        }

        let latency_ms = successful.iter().sum::<f64>() / successful.len() as f64;
        let jitter_ms = successful
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .sum::<f64>()
            / (successful.len() - 1) as f64;

        Ok(LatencyReport {
            latency_ms,
            jitter_ms,
            successful_samples: successful.len(),
        })
    }
}
