//! Server directory and client IP data models

use crate::types::Coordinate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single entry of the speed-test or packet-loss server directory.
///
/// Identity fields come from the parsed directory and never change;
/// `distance_km` and `latency` are filled in during selection. Selection
/// hands out owned copies, never references into a shared directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server display name (usually the city)
    pub name: String,
    /// Operator of the server
    pub sponsor: String,
    /// Host endpoint, `host:port`
    pub host: String,
    /// Upload endpoint URL; other endpoints are derived from its base
    pub url: String,
    /// Geographic location of the server
    pub location: Coordinate,
    /// Great-circle distance from the client, computed before probing
    #[serde(default)]
    pub distance_km: f64,
    /// Last measured round-trip latency, populated by selection
    #[serde(default)]
    pub latency: Option<Duration>,
}

impl ServerInfo {
    pub fn new<S: Into<String>>(name: S, sponsor: S, host: S, url: S, location: Coordinate) -> Self {
        Self {
            name: name.into(),
            sponsor: sponsor.into(),
            host: host.into(),
            url: url.into(),
            location,
            distance_km: 0.0,
            latency: None,
        }
    }

    /// URL base: the upload endpoint minus its last path segment
    fn base_url(&self) -> &str {
        self.url
            .rsplit_once('/')
            .map(|(base, _)| base)
            .unwrap_or(&self.url)
    }

    /// Endpoint for lightweight latency probes
    pub fn latency_url(&self) -> String {
        format!("{}/latency.txt", self.base_url())
    }

    /// Endpoint serving `size` bytes of payload
    pub fn download_url(&self, size: u64) -> String {
        format!("{}/download?size={}", self.base_url(), size)
    }

    /// Endpoint accepting uploaded payload
    pub fn upload_url(&self) -> String {
        self.url.clone()
    }

    /// Last measured latency in whole milliseconds, if any
    pub fn latency_ms(&self) -> Option<u128> {
        self.latency.map(|l| l.as_millis())
    }
}

/// Client IP record, fetched once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IPInfo {
    pub ip_address: String,
    pub isp: String,
    pub location: Coordinate,
}
