//! Error types for the pricing oracle

use thiserror::Error;

/// Errors that can occur when fetching video metrics from a provider
///
/// All of these are per-asset and non-fatal: the affected token keeps
/// its last good valuation until the next successful refresh.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response could not be parsed into video metrics
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Video id is malformed (empty, placeholder, or too short)
    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),

    /// Provider does not know the video
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    /// Provider API error
    #[error("Provider API error: {0}")]
    Api(String),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,
}

/// Errors surfaced by oracle operations
#[derive(Debug, Error)]
pub enum OracleError {
    /// Operation referenced an asset id that is not tracked
    ///
    /// Read operations return `Option` instead; this only comes out of
    /// `force_update` so callers learn why no update was produced.
    #[error("Asset {0} is not tracked")]
    UnknownAsset(u64),

    /// The metrics fetch behind a refresh failed
    #[error("Metrics fetch failed: {0}")]
    Metrics(#[from] MetricsError),
}
