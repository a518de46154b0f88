//! Remote source gateway.
//!
//! Fetches one snapshot document from one foundation. Every failure mode
//! (timeout, connection error, non-2xx status, undecodable body) collapses
//! into the empty document of the requested kind, so callers never see an
//! error from this layer.

use crate::models::{SnapshotDetail, SnapshotSummary};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Path of the full inventory document.
pub const DETAIL_PATH: &str = "/snapshot/detail";

/// Path of the counts-only document.
pub const SUMMARY_PATH: &str = "/snapshot/summary";

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Why a snapshot could not be obtained.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to {uri} failed: {message}")]
    Transport { uri: String, message: String },

    #[error("{uri} answered with status {status}")]
    Status { uri: String, status: u16 },

    #[error("could not decode response from {uri}: {source}")]
    Decode {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no response from {uri} within {timeout:?}")]
    Timeout { uri: String, timeout: Duration },
}

/// Read-only access to a snapshot endpoint.
///
/// Implementations return the raw response body; decoding and timeout
/// enforcement stay in [`Gateway`].
#[async_trait]
pub trait SnapshotTransport: Send + Sync {
    async fn get(&self, uri: &str) -> Result<String, GatewayError>;
}

/// HTTPS transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given request timeout.
    ///
    /// When `ssl_validation_skipped` is set, server certificates are not verified.
    pub fn new(timeout: Duration, ssl_validation_skipped: bool) -> Result<Self, reqwest::Error> {
        if ssl_validation_skipped {
            warn!("TLS certificate validation is disabled for snapshot requests");
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(ssl_validation_skipped)
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl SnapshotTransport for HttpTransport {
    async fn get(&self, uri: &str) -> Result<String, GatewayError> {
        let response = self.http_client.get(uri).send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Transport {
                    uri: uri.to_string(),
                    message: "request timed out".to_string(),
                }
            } else if e.is_connect() {
                GatewayError::Transport {
                    uri: uri.to_string(),
                    message: format!("cannot connect: {}", e),
                }
            } else {
                GatewayError::Transport {
                    uri: uri.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| GatewayError::Transport {
            uri: uri.to_string(),
            message: format!("failed to read body: {}", e),
        })
    }
}

/// Build the full snapshot URI for a configured address.
///
/// Addresses are configured without a scheme; HTTPS is always used.
pub fn snapshot_uri(address: &str, path: &str) -> String {
    format!("https://{}{}", address.trim_end_matches('/'), path)
}

/// Fetches snapshot documents, substituting empty ones on failure.
#[derive(Debug, Clone)]
pub struct Gateway<T> {
    transport: T,
    timeout: Duration,
}

impl<T: SnapshotTransport> Gateway<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the full inventory of the foundation at `address`.
    pub async fn fetch_detail(&self, address: &str) -> SnapshotDetail {
        self.fetch_or_empty(&snapshot_uri(address, DETAIL_PATH), "SnapshotDetail")
            .await
    }

    /// Fetch the counts summary of the foundation at `address`.
    pub async fn fetch_summary(&self, address: &str) -> SnapshotSummary {
        self.fetch_or_empty(&snapshot_uri(address, SUMMARY_PATH), "SnapshotSummary")
            .await
    }

    async fn fetch_or_empty<D>(&self, uri: &str, kind: &str) -> D
    where
        D: DeserializeOwned + Default,
    {
        match self.try_fetch(uri).await {
            Ok(document) => {
                debug!(uri, "obtained {}", kind);
                document
            }
            Err(e) => {
                warn!(uri, error = %e, "Could not obtain {} from {}", kind, uri);
                D::default()
            }
        }
    }

    /// Fetch and decode one document, bounded by the configured timeout.
    pub async fn try_fetch<D: DeserializeOwned>(&self, uri: &str) -> Result<D, GatewayError> {
        let body = tokio::time::timeout(self.timeout, self.transport.get(uri))
            .await
            .map_err(|_| GatewayError::Timeout {
                uri: uri.to_string(),
                timeout: self.timeout,
            })??;

        serde_json::from_str(&body).map_err(|source| GatewayError::Decode {
            uri: uri.to_string(),
            source,
        })
    }
}
