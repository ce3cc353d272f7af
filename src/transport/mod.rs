//! Byte transport abstraction and its HTTP implementation
//!
//! Every engine component talks to the network through [`Transport`], so
//! selection, latency and throughput logic can be exercised against
//! scripted transports in tests. [`HttpTransport`] is the production
//! implementation on reqwest.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Abstract byte transport with deadline-bounded streaming.
///
/// Connection failures surface as typed errors, never as panics across
/// worker boundaries. Streaming calls cut off at `deadline` and report
/// the bytes moved up to that point.
#[async_trait]
pub trait Transport: Send + Sync {
    /// One-shot fetch of a small text body
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Lightweight round trip used for reachability/latency probes
    async fn ping(&self, url: &str) -> Result<Duration>;

    /// Pull bytes from `url` until the body ends or `deadline` passes;
    /// returns bytes received. A deadline cut-off is not an error.
    async fn stream_download(&self, url: &str, deadline: Instant) -> Result<u64>;

    /// Push `payload_size` generated bytes to `url` in `chunk_size`
    /// pieces until done or `deadline` passes; returns bytes sent.
    async fn stream_upload(
        &self,
        url: &str,
        payload_size: u64,
        chunk_size: u64,
        deadline: Instant,
    ) -> Result<u64>;
}

/// reqwest-backed [`Transport`]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn remaining(deadline: Instant) -> Duration {
        deadline.saturating_duration_since(Instant::now())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::http_request(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }

    async fn ping(&self, url: &str) -> Result<Duration> {
        let started = Instant::now();
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::http_request(format!(
                "probe of {} returned {}",
                url,
                response.status()
            )));
        }
        // Drain the (tiny) body so the round trip is complete
        let _ = response.bytes().await?;
        Ok(started.elapsed())
    }

    async fn stream_download(&self, url: &str, deadline: Instant) -> Result<u64> {
        let send = self.client.get(url).send();
        let mut response = match tokio::time::timeout(Self::remaining(deadline), send).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(e.into()),
            // Deadline elapsed before the connection came up
            Err(_) => return Ok(0),
        };

        if !response.status().is_success() {
            return Err(AppError::http_request(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        let mut received: u64 = 0;
        loop {
            let remaining = Self::remaining(deadline);
            if remaining.is_zero() {
                break;
            }
            match tokio::time::timeout(remaining, response.chunk()).await {
                Ok(Ok(Some(chunk))) => received += chunk.len() as u64,
                Ok(Ok(None)) => break,
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => break, // deadline: partial count still stands
            }
        }
        Ok(received)
    }

    async fn stream_upload(
        &self,
        url: &str,
        payload_size: u64,
        chunk_size: u64,
        deadline: Instant,
    ) -> Result<u64> {
        let sent = Arc::new(AtomicU64::new(0));
        let sent_in_stream = sent.clone();
        let chunk_size = chunk_size.max(1);

        let body_stream = futures::stream::unfold(0u64, move |generated| {
            let sent_in_stream = sent_in_stream.clone();
            async move {
                if generated >= payload_size || Instant::now() >= deadline {
                    return None;
                }
                let n = chunk_size.min(payload_size - generated);
                let chunk = vec![0x55u8; n as usize];
                sent_in_stream.fetch_add(n, Ordering::Relaxed);
                Some((Ok::<Vec<u8>, std::io::Error>(chunk), generated + n))
            }
        });

        let request = self
            .client
            .post(url)
            .body(reqwest::Body::wrap_stream(body_stream))
            .send();

        match tokio::time::timeout(Self::remaining(deadline), request).await {
            Ok(Ok(response)) => {
                if !response.status().is_success() {
                    return Err(AppError::http_request(format!(
                        "POST {} returned {}",
                        url,
                        response.status()
                    )));
                }
                Ok(sent.load(Ordering::Relaxed))
            }
            Ok(Err(e)) => Err(e.into()),
            // Deadline: whatever left the stream still counts
            Err(_) => Ok(sent.load(Ordering::Relaxed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/speedtest/latency.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("test=test"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let body = transport
            .fetch(&format!("{}/speedtest/latency.txt", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "test=test");
    }

    #[tokio::test]
    async fn test_fetch_http_error_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport.fetch(&server.uri()).await.unwrap_err();
        assert_eq!(err.category(), "HTTP");
    }

    #[tokio::test]
    async fn test_ping_measures_elapsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let elapsed = transport.ping(&server.uri()).await.unwrap();
        assert!(elapsed > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_ping_connection_refused_is_typed() {
        let transport = HttpTransport::new(Duration::from_secs(1)).unwrap();
        let err = transport.ping("http://127.0.0.1:9/latency.txt").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Network(_) | AppError::Timeout(_) | AppError::HttpRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_stream_download_counts_bytes() {
        let server = MockServer::start().await;
        let payload = vec![0u8; 128 * 1024];
        Mock::given(method("GET"))
            .and(path("/speedtest/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let received = transport
            .stream_download(&format!("{}/speedtest/download", server.uri()), far_deadline())
            .await
            .unwrap();
        assert_eq!(received, 128 * 1024);
    }

    #[tokio::test]
    async fn test_stream_download_expired_deadline_is_zero_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1024]))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let received = transport
            .stream_download(&server.uri(), Instant::now())
            .await
            .unwrap();
        assert_eq!(received, 0);
    }

    #[tokio::test]
    async fn test_stream_upload_counts_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/speedtest/upload.php"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let sent = transport
            .stream_upload(
                &format!("{}/speedtest/upload.php", server.uri()),
                50_000,
                4_096,
                far_deadline(),
            )
            .await
            .unwrap();
        assert_eq!(sent, 50_000);
    }
}
