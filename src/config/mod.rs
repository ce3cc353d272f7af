//! Runtime configuration: CLI flags merged with environment overrides

use crate::cli::Cli;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resolved configuration of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Stop after latency, jitter and packet loss
    pub latency_only: bool,
    /// Skip the upload phase
    pub download_only: bool,
    /// Skip the download phase
    pub upload_only: bool,
    /// Publish the result image and print its URL
    pub share: bool,
    pub verbose: bool,
    pub debug: bool,
    pub enable_color: bool,

    /// Nearest speed-test servers to probe during selection
    pub server_top_n: usize,
    /// Nearest packet-loss hosts to probe during selection
    pub quality_top_n: usize,
    /// Sequential samples for the jitter estimate
    pub latency_samples: usize,
    /// Probes for the packet-loss ratio
    pub loss_probes: usize,
    /// Concurrent selection probes
    pub probe_concurrency: usize,
    /// Individual probe timeout in seconds
    pub probe_timeout_seconds: u64,
    /// General HTTP request timeout in seconds
    pub http_timeout_seconds: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            latency_only: false,
            download_only: false,
            upload_only: false,
            share: false,
            verbose: false,
            debug: false,
            enable_color: crate::defaults::DEFAULT_ENABLE_COLOR,
            server_top_n: crate::defaults::DEFAULT_SERVER_TOP_N,
            quality_top_n: crate::defaults::DEFAULT_QUALITY_TOP_N,
            latency_samples: crate::defaults::DEFAULT_LATENCY_SAMPLES,
            loss_probes: crate::defaults::DEFAULT_LOSS_PROBES,
            probe_concurrency: crate::defaults::DEFAULT_PROBE_CONCURRENCY,
            probe_timeout_seconds: crate::defaults::DEFAULT_PROBE_TIMEOUT.as_secs(),
            http_timeout_seconds: crate::defaults::DEFAULT_HTTP_TIMEOUT.as_secs(),
        }
    }
}

impl RunConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.server_top_n == 0 || self.quality_top_n == 0 {
            return Err(AppError::config("Selection top-N must be greater than 0"));
        }
        if self.latency_samples == 0 {
            return Err(AppError::config("Latency sample count must be greater than 0"));
        }
        if self.loss_probes == 0 {
            return Err(AppError::config("Packet-loss probe count must be greater than 0"));
        }
        if self.probe_concurrency == 0 {
            return Err(AppError::config("Probe concurrency must be greater than 0"));
        }
        if self.probe_timeout_seconds == 0 || self.http_timeout_seconds == 0 {
            return Err(AppError::config("Timeouts must be greater than 0"));
        }
        if self.probe_timeout_seconds > 300 || self.http_timeout_seconds > 300 {
            return Err(AppError::config("Timeouts cannot exceed 300 seconds"));
        }
        Ok(())
    }

    /// Merge `SPEEDTEST_*` environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("SPEEDTEST_SERVER_TOP_N") {
            self.server_top_n = value.parse().map_err(|e| {
                AppError::config(format!("Invalid SPEEDTEST_SERVER_TOP_N '{}': {}", value, e))
            })?;
        }
        if let Ok(value) = std::env::var("SPEEDTEST_QUALITY_TOP_N") {
            self.quality_top_n = value.parse().map_err(|e| {
                AppError::config(format!("Invalid SPEEDTEST_QUALITY_TOP_N '{}': {}", value, e))
            })?;
        }
        if let Ok(value) = std::env::var("SPEEDTEST_LATENCY_SAMPLES") {
            self.latency_samples = value.parse().map_err(|e| {
                AppError::config(format!("Invalid SPEEDTEST_LATENCY_SAMPLES '{}': {}", value, e))
            })?;
        }
        if let Ok(value) = std::env::var("SPEEDTEST_LOSS_PROBES") {
            self.loss_probes = value.parse().map_err(|e| {
                AppError::config(format!("Invalid SPEEDTEST_LOSS_PROBES '{}': {}", value, e))
            })?;
        }
        if let Ok(value) = std::env::var("SPEEDTEST_PROBE_TIMEOUT") {
            self.probe_timeout_seconds = value.parse().map_err(|e| {
                AppError::config(format!("Invalid SPEEDTEST_PROBE_TIMEOUT '{}': {}", value, e))
            })?;
        }
        if let Ok(value) = std::env::var("SPEEDTEST_HTTP_TIMEOUT") {
            self.http_timeout_seconds = value.parse().map_err(|e| {
                AppError::config(format!("Invalid SPEEDTEST_HTTP_TIMEOUT '{}': {}", value, e))
            })?;
        }
        Ok(())
    }
}

/// Build the run configuration from parsed CLI flags, honoring a local
/// `.env` file and environment overrides.
pub fn load_config(cli: &Cli) -> Result<RunConfig> {
    // A missing .env file is not an error
    let _ = dotenv::dotenv();

    let mut config = RunConfig {
        latency_only: cli.latency,
        download_only: cli.download,
        upload_only: cli.upload,
        share: cli.share,
        verbose: cli.verbose,
        debug: cli.debug,
        enable_color: cli.use_colors(),
        ..Default::default()
    };

    if let Some(top_n) = cli.top_n {
        config.server_top_n = top_n;
    }
    if let Some(loss_probes) = cli.loss_probes {
        config.loss_probes = loss_probes;
    }
    if let Some(timeout) = cli.timeout {
        config.http_timeout_seconds = timeout;
    }

    config.merge_from_env()?;
    config.validate()?;
    Ok(config)
}
