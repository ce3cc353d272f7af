//! Application orchestration
//!
//! [`SpeedTest`] wires the transport, providers and engine components
//! together and drives one complete run: IP lookup, server selection,
//! latency/jitter, packet loss, preflight, then the requested throughput
//! phases. Per-phase failure policy follows one rule: feature-local
//! problems degrade that feature, whole-run problems propagate.

use crate::config::RunConfig;
use crate::error::{AppError, Result};
use crate::latency::LatencyJitterEstimator;
use crate::logging::Logger;
use crate::models::{ServerInfo, TestConfig, TestResults};
use crate::output::{banner, MetricWriter, ProgressReporter};
use crate::providers::{
    HttpDirectoryProvider, HttpIPInfoProvider, HttpShareProvider, IPInfoProvider,
    QualityDirectoryProvider, ServerDirectoryProvider, ShareImageProvider,
};
use crate::quality::PacketLossEstimator;
use crate::selector::{SelectedServer, ServerSelector};
use crate::throughput::ThroughputEngine;
use crate::transport::{HttpTransport, Transport};
use crate::types::Direction;
use std::sync::Arc;

/// One fully wired speed test run
pub struct SpeedTest {
    config: RunConfig,
    transport: Arc<dyn Transport>,
    server_directory: Arc<dyn ServerDirectoryProvider>,
    quality_directory: Arc<dyn QualityDirectoryProvider>,
    ip_provider: Arc<dyn IPInfoProvider>,
    share_provider: Option<Arc<dyn ShareImageProvider>>,
    metrics: MetricWriter,
    progress: ProgressReporter,
    logger: Logger,
}

impl SpeedTest {
    /// Wire the production HTTP components
    pub fn new(config: RunConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.http_timeout())?);
        let directory = Arc::new(HttpDirectoryProvider::new(transport.clone()));
        let ip_provider = Arc::new(HttpIPInfoProvider::new(transport.clone()));
        let share_provider: Option<Arc<dyn ShareImageProvider>> = if config.share {
            Some(Arc::new(HttpShareProvider::new()?))
        } else {
            None
        };

        Ok(Self::with_components(
            config,
            transport,
            directory.clone(),
            directory,
            ip_provider,
            share_provider,
        ))
    }

    /// Wire explicit components; used by tests and embedders
    pub fn with_components(
        config: RunConfig,
        transport: Arc<dyn Transport>,
        server_directory: Arc<dyn ServerDirectoryProvider>,
        quality_directory: Arc<dyn QualityDirectoryProvider>,
        ip_provider: Arc<dyn IPInfoProvider>,
        share_provider: Option<Arc<dyn ShareImageProvider>>,
    ) -> Self {
        let progress = ProgressReporter::new(config.verbose, config.enable_color);
        let logger = Logger::new(config.verbose, config.debug, config.enable_color);
        Self {
            config,
            transport,
            server_directory,
            quality_directory,
            ip_provider,
            share_provider,
            metrics: MetricWriter::new(),
            progress,
            logger,
        }
    }

    /// Run the requested subset of tests, printing metric lines as each
    /// phase completes.
    pub async fn run(&self) -> Result<TestResults> {
        if self.config.verbose {
            self.progress.status(&banner());
        }

        let ip = self.ip_provider.ip_info().await.map_err(|e| {
            AppError::network(format!("Unable to retrieve your IP info: {}", e))
        })?;
        self.progress.status(&format!(
            "IP: {} ( {} ) Location: [{}, {}]",
            ip.ip_address, ip.isp, ip.location.lat, ip.location.lon
        ));

        self.progress.status("Finding fastest server...");
        let servers = self.server_directory.server_list().await?;
        if servers.is_empty() {
            return Err(AppError::directory_unavailable("server directory is empty"));
        }
        self.progress
            .status(&format!("{} servers online", servers.len()));

        let selector = ServerSelector::new(ip.location)
            .with_probe_concurrency(self.config.probe_concurrency)
            .with_probe_timeout(self.config.probe_timeout());

        let ping_transport = self.transport.clone();
        let selected = selector
            .best_server(
                &servers,
                self.config.server_top_n,
                move |server| {
                    let transport = ping_transport.clone();
                    async move { transport.ping(&server.latency_url()).await }
                },
                |success| self.progress.tick(success),
            )
            .await?;
        self.progress.finish_row();

        let mut results = TestResults {
            server_name: selected.server.name.clone(),
            sponsor: selected.server.sponsor.clone(),
            server_distance_km: selected.server.distance_km,
            server_latency_ms: selected.latency_ms(),
            ..Default::default()
        };

        self.metrics.metric("server", &selected.server.name);
        self.metrics.metric("sponsor", &selected.server.sponsor);
        self.metrics
            .metric_f64("server_distance_km", selected.server.distance_km);
        self.metrics
            .metric_f64("server_latency_ms", selected.latency_ms());

        self.jitter_phase(&selected, &mut results).await;
        self.packet_loss_phase(&ip, &mut results).await;

        if self.config.latency_only {
            return Ok(results);
        }

        let engine = ThroughputEngine::new(self.transport.clone());

        self.progress.status(&format!(
            "Determine line type ({})",
            TestConfig::preflight().concurrency
        ));
        let (pre_speed, line_type) = engine
            .detect_line_type(&selected.server, |success| self.progress.tick(success))
            .await?;
        self.progress.finish_row();
        self.logger
            .debug(&format!("preflight speed {:.2} mbits", pre_speed));
        self.metrics.metric("detected_line_type", line_type.as_str());
        results.detected_line_type = Some(line_type.as_str().to_string());

        if !self.config.upload_only {
            let config = TestConfig::preset(line_type, Direction::Download);
            self.progress
                .status(&format!("Testing download speed ({})", config.concurrency));
            let mbits = engine
                .measure(Direction::Download, &selected.server, &config, |success| {
                    self.progress.tick(success)
                })
                .await?;
            self.progress.finish_row();
            self.metrics.metric_f64("download_mbits", mbits);
            results.download_mbits = Some(mbits);
        }

        if self.config.download_only {
            return Ok(results);
        }

        let config = TestConfig::preset(line_type, Direction::Upload);
        self.progress
            .status(&format!("Testing upload speed ({})", config.concurrency));
        let mbits = engine
            .measure(Direction::Upload, &selected.server, &config, |success| {
                self.progress.tick(success)
            })
            .await?;
        self.progress.finish_row();
        self.metrics.metric_f64("upload_mbits", mbits);
        results.upload_mbits = Some(mbits);

        if let Some(share_provider) = &self.share_provider {
            match share_provider.share(&results).await {
                Ok(url) => self.metrics.metric("results_image_url", url),
                Err(e) => self.logger.warn(&format!("share upload failed: {}", e)),
            }
        }

        Ok(results)
    }

    /// Jitter is optional: fewer than two successful samples leave it
    /// absent, never zero.
    async fn jitter_phase(&self, selected: &SelectedServer, results: &mut TestResults) {
        let estimator = LatencyJitterEstimator::new(self.config.latency_samples);
        let ping_transport = self.transport.clone();
        match estimator
            .measure(&selected.server, move |server: ServerInfo| {
                let transport = ping_transport.clone();
                async move { transport.ping(&server.latency_url()).await }
            })
            .await
        {
            Ok(report) => {
                self.metrics.metric_f64("jitter_ms", report.jitter_ms);
                results.jitter_ms = Some(report.jitter_ms);
            }
            Err(e) => self.logger.warn(&format!("jitter unavailable: {}", e)),
        }
    }

    /// Packet loss degrades to a stderr notice; it never fails the run.
    async fn packet_loss_phase(&self, ip: &crate::models::IPInfo, results: &mut TestResults) {
        self.progress
            .status("Finding fastest server for packet loss measurement...");
        let hosts = match self.quality_directory.quality_server_list().await {
            Ok(hosts) if !hosts.is_empty() => hosts,
            Ok(_) | Err(_) => {
                eprintln!(
                    "Unable to download quality server list. Packet loss analysis is not available at this time"
                );
                return;
            }
        };
        self.progress
            .status(&format!("{} ping hosts online", hosts.len()));

        let selector = ServerSelector::new(ip.location)
            .with_probe_concurrency(self.config.probe_concurrency)
            .with_probe_timeout(self.config.probe_timeout());
        let estimator =
            PacketLossEstimator::new(selector).with_probe_timeout(self.config.probe_timeout());

        let ping_transport = self.transport.clone();
        let quality_server = match estimator
            .best_quality_server(
                &hosts,
                self.config.quality_top_n,
                move |server| {
                    let transport = ping_transport.clone();
                    async move { transport.ping(&server.latency_url()).await }
                },
                |success| self.progress.tick(success),
            )
            .await
        {
            Ok(selected) => selected,
            Err(e) => {
                self.progress.finish_row();
                eprintln!("Packet loss analysis is not available at this time: {}", e);
                return;
            }
        };
        self.progress.finish_row();
        self.progress.status(&format!(
            "Server: {} by {} ({:.2} km from you)",
            quality_server.server.name, quality_server.server.sponsor, quality_server.server.distance_km
        ));

        let ping_transport = self.transport.clone();
        match estimator
            .packet_loss(&quality_server.server, self.config.loss_probes, move |server| {
                let transport = ping_transport.clone();
                async move { transport.ping(&server.latency_url()).await }
            })
            .await
        {
            Ok(loss) => {
                self.metrics.metric("packet_loss", loss);
                results.packet_loss_percent = Some(loss);
            }
            Err(e) => self.logger.warn(&format!("packet loss unavailable: {}", e)),
        }
    }
}
