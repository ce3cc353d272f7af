//! Directory, IP and share-result providers
//!
//! The engine consumes these through traits; the HTTP implementations
//! fetch the public speed-test and packet-loss directories, the client
//! IP record and the share-result API. Directory bodies are attribute
//! XML; the fields are pulled out with targeted regexes rather than a
//! full XML parser.

use crate::error::{AppError, Result};
use crate::models::{IPInfo, ServerInfo, TestResults};
use crate::transport::Transport;
use crate::types::Coordinate;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Speed-test server directory
#[async_trait]
pub trait ServerDirectoryProvider: Send + Sync {
    /// The parsed directory; may be empty
    async fn server_list(&self) -> Result<Vec<ServerInfo>>;
}

/// Packet-loss host directory
#[async_trait]
pub trait QualityDirectoryProvider: Send + Sync {
    /// The parsed directory; may be empty
    async fn quality_server_list(&self) -> Result<Vec<ServerInfo>>;
}

/// Client IP record lookup
#[async_trait]
pub trait IPInfoProvider: Send + Sync {
    async fn ip_info(&self) -> Result<IPInfo>;
}

/// Optional share-result image generation
#[async_trait]
pub trait ShareImageProvider: Send + Sync {
    /// Returns the URL of the generated result image
    async fn share(&self, results: &TestResults) -> Result<String>;
}

/// Pull `attr="value"` pairs out of one XML tag body
fn parse_attributes(tag_body: &str) -> HashMap<String, String> {
    // Compiled per call; directory parsing happens once per run
    let attribute = Regex::new(r#"([a-zA-Z_]+)="([^"]*)""#).unwrap();
    attribute
        .captures_iter(tag_body)
        .map(|capture| (capture[1].to_string(), capture[2].to_string()))
        .collect()
}

/// Parse a `<server .../>` directory body into server records. Entries
/// missing coordinates or an endpoint are skipped, not errors.
fn parse_server_directory(body: &str) -> Vec<ServerInfo> {
    let server_tag = Regex::new(r"<server\s+([^>]*?)/?>").unwrap();
    server_tag
        .captures_iter(body)
        .filter_map(|capture| {
            let attributes = parse_attributes(&capture[1]);
            let url = attributes.get("url")?.clone();
            let lat: f64 = attributes.get("lat")?.parse().ok()?;
            let lon: f64 = attributes.get("lon")?.parse().ok()?;
            let name = attributes.get("name").cloned().unwrap_or_default();
            let sponsor = attributes.get("sponsor").cloned().unwrap_or_default();
            let host = attributes
                .get("host")
                .cloned()
                .or_else(|| url::Url::parse(&url).ok()?.host_str().map(String::from))?;
            Some(ServerInfo::new(
                name,
                sponsor,
                host,
                url,
                Coordinate::new(lat, lon),
            ))
        })
        .collect()
}

/// Parse a `key=value&key=value` body into the client IP record
fn parse_ip_info(body: &str) -> Result<IPInfo> {
    let fields: HashMap<&str, &str> = body
        .trim()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();

    let ip_address = fields
        .get("ip_address")
        .ok_or_else(|| AppError::parse("IP record is missing ip_address"))?;
    let lat: f64 = fields
        .get("lat")
        .ok_or_else(|| AppError::parse("IP record is missing lat"))?
        .parse()?;
    let lon: f64 = fields
        .get("lon")
        .ok_or_else(|| AppError::parse("IP record is missing lon"))?
        .parse()?;
    let isp = fields.get("isp").copied().unwrap_or_default();

    Ok(IPInfo {
        ip_address: ip_address.to_string(),
        isp: isp.to_string(),
        location: Coordinate::new(lat, lon),
    })
}

/// HTTP directory provider over the shared transport
pub struct HttpDirectoryProvider {
    transport: Arc<dyn Transport>,
    server_list_url: String,
    quality_list_url: String,
}

impl HttpDirectoryProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            server_list_url: crate::defaults::SERVER_LIST_URL.to_string(),
            quality_list_url: crate::defaults::QUALITY_LIST_URL.to_string(),
        }
    }

    pub fn with_urls<S: Into<String>>(mut self, server_list_url: S, quality_list_url: S) -> Self {
        self.server_list_url = server_list_url.into();
        self.quality_list_url = quality_list_url.into();
        self
    }
}

#[async_trait]
impl ServerDirectoryProvider for HttpDirectoryProvider {
    async fn server_list(&self) -> Result<Vec<ServerInfo>> {
        let body = self
            .transport
            .fetch(&self.server_list_url)
            .await
            .map_err(|e| {
                AppError::directory_unavailable(format!("server directory fetch failed: {}", e))
            })?;
        Ok(parse_server_directory(&body))
    }
}

#[async_trait]
impl QualityDirectoryProvider for HttpDirectoryProvider {
    async fn quality_server_list(&self) -> Result<Vec<ServerInfo>> {
        let body = self
            .transport
            .fetch(&self.quality_list_url)
            .await
            .map_err(|e| {
                AppError::directory_unavailable(format!("quality directory fetch failed: {}", e))
            })?;
        Ok(parse_server_directory(&body))
    }
}

/// HTTP client IP lookup over the shared transport
pub struct HttpIPInfoProvider {
    transport: Arc<dyn Transport>,
    url: String,
}

impl HttpIPInfoProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            url: crate::defaults::IP_INFO_URL.to_string(),
        }
    }

    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl IPInfoProvider for HttpIPInfoProvider {
    async fn ip_info(&self) -> Result<IPInfo> {
        let body = self.transport.fetch(&self.url).await?;
        parse_ip_info(&body)
    }
}

/// Share-result provider posting completed figures to the result API.
///
/// Owns its own client: the request is a one-shot form POST outside the
/// measurement path.
pub struct HttpShareProvider {
    client: reqwest::Client,
    api_url: String,
}

impl HttpShareProvider {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: crate::defaults::SHARE_API_URL.to_string(),
        })
    }

    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.api_url = url.into();
        self
    }
}

#[async_trait]
impl ShareImageProvider for HttpShareProvider {
    async fn share(&self, results: &TestResults) -> Result<String> {
        let form = [
            ("startmode", "pingselect".to_string()),
            ("promo", String::new()),
            ("accuracy", "1".to_string()),
            (
                "ping",
                format!("{}", results.server_latency_ms.round() as i64),
            ),
            (
                "download",
                format!(
                    "{}",
                    (results.download_mbits.unwrap_or(0.0) * 1000.0).round() as i64
                ),
            ),
            (
                "upload",
                format!(
                    "{}",
                    (results.upload_mbits.unwrap_or(0.0) * 1000.0).round() as i64
                ),
            ),
        ];

        let response = self
            .client
            .post(&self.api_url)
            .header("referer", crate::defaults::SHARE_API_REFERER)
            .form(&form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::http_request(format!(
                "share API returned {}",
                response.status()
            )));
        }
        let body = response.text().await?;

        let result_id = Regex::new(r"resultid=(\d+)")
            .unwrap()
            .captures(&body)
            .and_then(|capture| capture.get(1))
            .ok_or_else(|| AppError::parse("share API response carried no result id"))?;

        Ok(format!(
            "http://www.speedtest.net/result/{}.png",
            result_id.as_str()
        ))
    }
}
