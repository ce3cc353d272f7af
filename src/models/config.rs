//! Throughput test profiles and validation

use crate::error::{AppError, Result};
use crate::types::{Direction, LineType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters of one throughput measurement phase.
///
/// Immutable value type; named presets exist for the preflight check and
/// for each detected line type, per transfer direction. Higher tiers use
/// more workers and larger payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    /// Number of parallel transfer workers
    pub concurrency: usize,
    /// First requested payload size in bytes
    pub start_size: u64,
    /// Payload size ceiling in bytes
    pub max_size: u64,
    /// Payload growth per completed request
    pub incr_size: u64,
    /// Read/write chunk size in bytes
    pub chunk_size: u64,
    /// Measurement window; workers are stopped once it elapses
    pub min_test_duration: Duration,
}

impl TestConfig {
    /// Reject configs that cannot drive a measurement before any worker
    /// is launched.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(AppError::config("Test concurrency must be greater than 0"));
        }
        if self.min_test_duration.is_zero() {
            return Err(AppError::config("Test duration must be greater than 0"));
        }
        if self.start_size == 0 || self.chunk_size == 0 {
            return Err(AppError::config("Payload sizes must be greater than 0"));
        }
        if self.max_size < self.start_size {
            return Err(AppError::config(
                "Maximum payload size must not be below the starting size",
            ));
        }
        Ok(())
    }

    /// Fixed small profile used to detect the line type
    pub fn preflight() -> Self {
        Self {
            concurrency: 2,
            start_size: 600_000,
            max_size: 2_000_000,
            incr_size: 125_000,
            chunk_size: 65_536,
            min_test_duration: Duration::from_secs(5),
        }
    }

    /// Full-scale profile for a detected line type and direction
    pub fn preset(line_type: LineType, direction: Direction) -> Self {
        match (line_type, direction) {
            (LineType::Slowband, Direction::Download) => Self {
                concurrency: 2,
                start_size: 100_000,
                max_size: 500_000,
                incr_size: 10_000,
                chunk_size: 1_024,
                min_test_duration: Duration::from_secs(20),
            },
            (LineType::Slowband, Direction::Upload) => Self {
                concurrency: 2,
                start_size: 50_000,
                max_size: 80_000,
                incr_size: 1_000,
                chunk_size: 1_024,
                min_test_duration: Duration::from_secs(20),
            },
            (LineType::Narrowband, Direction::Download) => Self {
                concurrency: 6,
                start_size: 1_000_000,
                max_size: 100_000_000,
                incr_size: 550_000,
                chunk_size: 8_192,
                min_test_duration: Duration::from_secs(10),
            },
            (LineType::Narrowband, Direction::Upload) => Self {
                concurrency: 3,
                start_size: 1_000_000,
                max_size: 70_000_000,
                incr_size: 250_000,
                chunk_size: 4_096,
                min_test_duration: Duration::from_secs(10),
            },
            (LineType::Broadband, Direction::Download) => Self {
                concurrency: 16,
                start_size: 1_000_000,
                max_size: 100_000_000,
                incr_size: 750_000,
                chunk_size: 65_536,
                min_test_duration: Duration::from_secs(10),
            },
            (LineType::Broadband, Direction::Upload) => Self {
                concurrency: 8,
                start_size: 1_000_000,
                max_size: 70_000_000,
                incr_size: 250_000,
                chunk_size: 65_536,
                min_test_duration: Duration::from_secs(10),
            },
            (LineType::Fiber, Direction::Download) => Self {
                concurrency: 32,
                start_size: 5_000_000,
                max_size: 120_000_000,
                incr_size: 950_000,
                chunk_size: 65_536,
                min_test_duration: Duration::from_secs(10),
            },
            (LineType::Fiber, Direction::Upload) => Self {
                concurrency: 16,
                start_size: 1_000_000,
                max_size: 70_000_000,
                incr_size: 250_000,
                chunk_size: 65_536,
                min_test_duration: Duration::from_secs(10),
            },
        }
    }

    /// Next payload size after a completed request, clamped to the ceiling
    pub fn next_size(&self, current: u64) -> u64 {
        current.saturating_add(self.incr_size).min(self.max_size)
    }
}
