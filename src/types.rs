//! Type definitions and aliases

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Transfer direction for a throughput measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    /// Metric name prefix used in output lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Download => "download",
            Direction::Upload => "upload",
        }
    }
}

/// Line classification derived from the preflight measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineType {
    /// At most 4 Mbit/s
    Slowband,
    /// More than 4 and at most 30 Mbit/s
    Narrowband,
    /// More than 30 and less than 150 Mbit/s
    Broadband,
    /// 150 Mbit/s and above
    Fiber,
}

/// Ordered classification table: (upper bound in Mbit/s, bound inclusive).
/// Anything above the last row is fiber. 30 is an inclusive upper bound
/// while 150 belongs to fiber; the asymmetry is intentional.
const LINE_TYPE_BOUNDS: [(f64, bool, LineType); 3] = [
    (4.0, true, LineType::Slowband),
    (30.0, true, LineType::Narrowband),
    (150.0, false, LineType::Broadband),
];

impl LineType {
    /// Classify a preflight speed (Mbit/s) into a line type
    pub fn from_preflight(mbits: f64) -> Self {
        for (bound, inclusive, line_type) in LINE_TYPE_BOUNDS {
            if mbits < bound || (inclusive && mbits == bound) {
                return line_type;
            }
        }
        LineType::Fiber
    }

    /// Name used for the `detected_line_type` output line
    pub fn as_str(&self) -> &'static str {
        match self {
            LineType::Slowband => "slowband",
            LineType::Narrowband => "narrowband",
            LineType::Broadband => "broadband",
            LineType::Fiber => "fiber",
        }
    }
}

/// Outcome status of a single measurement attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TestStatus {
    /// Attempt completed successfully
    Success,
    /// Attempt failed due to a network error
    Failed,
    /// Attempt timed out
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_type_boundaries() {
        assert_eq!(LineType::from_preflight(4.0), LineType::Slowband);
        assert_eq!(LineType::from_preflight(4.0001), LineType::Narrowband);
        assert_eq!(LineType::from_preflight(30.0), LineType::Narrowband);
        assert_eq!(LineType::from_preflight(30.0001), LineType::Broadband);
        assert_eq!(LineType::from_preflight(149.9999), LineType::Broadband);
        assert_eq!(LineType::from_preflight(150.0), LineType::Fiber);
    }

    #[test]
    fn test_line_type_extremes() {
        assert_eq!(LineType::from_preflight(0.0), LineType::Slowband);
        assert_eq!(LineType::from_preflight(0.1), LineType::Slowband);
        assert_eq!(LineType::from_preflight(10_000.0), LineType::Fiber);
    }

    #[test]
    fn test_line_type_names() {
        assert_eq!(LineType::Slowband.as_str(), "slowband");
        assert_eq!(LineType::Narrowband.as_str(), "narrowband");
        assert_eq!(LineType::Broadband.as_str(), "broadband");
        assert_eq!(LineType::Fiber.as_str(), "fiber");
    }

    #[test]
    fn test_direction_names() {
        assert_eq!(Direction::Download.as_str(), "download");
        assert_eq!(Direction::Upload.as_str(), "upload");
    }
}
