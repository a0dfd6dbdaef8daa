//! HTTP client abstraction for testability

use bytes::Bytes;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::HttpConfig;

/// A completed HTTP exchange. Non-2xx statuses are not errors at this level:
/// deciding what a status means is the validator's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure to obtain any response at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not connect to the tile host
    #[error("connection failed: {0}")]
    Connect(String),

    /// The transport's timeout elapsed
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Request(String),
}

/// What the transport produced for one tile URL.
pub type TransportOutcome = Result<HttpResponse, TransportError>;

/// Trait for asynchronous HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The status and body, or a transport error if no response arrived.
    fn get(&self, url: &str) -> impl Future<Output = TransportOutcome> + Send;
}

/// Async HTTP client implementation using reqwest.
///
/// The underlying `reqwest::Client` owns the process-wide connection pool;
/// clone this type rather than building a new one per request.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new AsyncReqwestClient with default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::from_config(&HttpConfig::default())
    }

    /// Creates a client from transport settings.
    pub fn from_config(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            // Keep connections warm for the parallel tile fan-out
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                TransportError::Request(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> TransportOutcome {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else if e.is_connect() {
                    TransportError::Connect(e.to_string())
                } else {
                    TransportError::Request(e.to_string())
                });
            }
        };

        let status = response.status().as_u16();

        match response.bytes().await {
            Ok(body) => {
                trace!(url = url, bytes = body.len(), "HTTP response body read");
                Ok(HttpResponse { status, body })
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(TransportError::Request(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        }
    }
}
