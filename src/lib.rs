//! Network Speed Tester
//!
//! A command line network speed tester that discovers the best reachable
//! test server, measures latency, jitter and packet loss, and runs an
//! adaptive, concurrency-controlled download/upload throughput test that
//! tunes its profile to the detected line speed.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod latency;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod providers;
pub mod quality;
pub mod selector;
pub mod throughput;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{IPInfo, ServerInfo, TestConfig, TestResults};
pub use probe::{run_probes, ProbeOutcome};
pub use selector::{SelectedServer, ServerSelector};
pub use throughput::ThroughputEngine;
pub use transport::{HttpTransport, Transport};
pub use types::{Coordinate, Direction, LineType};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// How many of the nearest speed-test servers to probe.
    pub const DEFAULT_SERVER_TOP_N: usize = 10;
    /// How many of the nearest packet-loss hosts to probe.
    pub const DEFAULT_QUALITY_TOP_N: usize = 5;
    /// Sequential round trips for the jitter estimate.
    pub const DEFAULT_LATENCY_SAMPLES: usize = 3;
    /// Probes sent for the packet-loss ratio.
    pub const DEFAULT_LOSS_PROBES: usize = 20;
    /// Concurrent selection probes.
    pub const DEFAULT_PROBE_CONCURRENCY: usize = 5;
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const SERVER_LIST_URL: &str = "http://www.speedtest.net/speedtest-servers.php";
    pub const QUALITY_LIST_URL: &str = "http://www.pingtest.net/pingtest-config.php";
    pub const IP_INFO_URL: &str = "http://speedtest.ookla.com/api/ipaddress.php";
    pub const SHARE_API_URL: &str = "http://www.speedtest.net/api/api.php";
    pub const SHARE_API_REFERER: &str = "http://c.speedtest.net/flash/speedtest.swf";
}
