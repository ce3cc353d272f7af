//! Measurement samples and run result data models

use crate::types::TestStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single timed observation: one latency round trip or the byte total
/// of one transfer worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSample {
    /// Wall-clock time the observation covered
    pub elapsed: Duration,
    /// Bytes moved during the observation (zero for latency samples)
    pub bytes: u64,
    /// Outcome of the attempt
    pub status: TestStatus,
    /// When the sample was taken
    pub timestamp: DateTime<Utc>,
}

impl MeasurementSample {
    /// A successful latency round trip
    pub fn latency(elapsed: Duration) -> Self {
        Self {
            elapsed,
            bytes: 0,
            status: TestStatus::Success,
            timestamp: Utc::now(),
        }
    }

    /// A completed transfer worker's byte total
    pub fn transfer(bytes: u64, elapsed: Duration) -> Self {
        Self {
            elapsed,
            bytes,
            status: TestStatus::Success,
            timestamp: Utc::now(),
        }
    }

    /// A failed attempt; contributes nothing to derived figures
    pub fn failed() -> Self {
        Self {
            elapsed: Duration::ZERO,
            bytes: 0,
            status: TestStatus::Failed,
            timestamp: Utc::now(),
        }
    }

    /// A timed-out attempt
    pub fn timeout() -> Self {
        Self {
            elapsed: Duration::ZERO,
            bytes: 0,
            status: TestStatus::Timeout,
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TestStatus::Success
    }

    /// Elapsed time in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Aggregated results of one complete run, consumed by output and by the
/// share-image provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestResults {
    pub server_name: String,
    pub sponsor: String,
    pub server_distance_km: f64,
    pub server_latency_ms: f64,
    pub jitter_ms: Option<f64>,
    pub packet_loss_percent: Option<u32>,
    pub detected_line_type: Option<String>,
    pub download_mbits: Option<f64>,
    pub upload_mbits: Option<f64>,
}
