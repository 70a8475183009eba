//! Constants for the pricing oracle
//!
//! All tuning for the oracle is centralized here. No runtime
//! configuration file is used - the system operates with these
//! compile-time constants, plus the `YOUTUBE_API_KEY` environment
//! variable for the metrics provider.

/// How often the scheduler refreshes tracked assets (in milliseconds)
pub const REFRESH_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// How long before a token's price data is considered stale (in seconds)
pub const STALE_THRESHOLD_SECS: u64 = 15 * 60;

/// HTTP request timeout when fetching video metrics (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Fallback view count when the initial metrics fetch fails
///
/// Deliberately small and deterministic: a token registered while the
/// metrics source is down starts near the price floor instead of at a
/// made-up valuation.
pub const FALLBACK_VIEWS: u64 = 100;

/// Fallback like count when the initial metrics fetch fails
pub const FALLBACK_LIKES: u64 = 5;

/// Token supply minted per video until the chain reports real numbers
pub const DEFAULT_TOTAL_SUPPLY: u64 = 1_000_000;

/// Base valuation a token starts from before factor adjustments
pub const BASE_PRICE: f64 = 1.0;

/// Hard price floor; no factor combination may push a price below this
pub const MIN_PRICE: f64 = 0.01;

/// Weight of the logarithmic view-count contribution
pub const VIEW_WEIGHT: f64 = 0.12;

/// Cap on the like-ratio contribution
///
/// Must stay at or below `VIEW_WEIGHT / 2`: the like factor is a ratio
/// against views, so a rising view count with fixed likes shrinks it,
/// and the view factor's log gain has to dominate that loss.
pub const LIKE_WEIGHT: f64 = 0.05;

/// Like-to-view ratio at which the like contribution saturates
pub const LIKE_RATE_REF: f64 = 0.1;

/// Weight of the logarithmic subscriber contribution
pub const SUBSCRIBER_WEIGHT: f64 = 0.05;

/// Maximum penalty applied to aged content
pub const DECAY_WEIGHT: f64 = 0.3;

/// Content-age time constant in days; decay saturates a few multiples out
pub const DECAY_TAU_DAYS: f64 = 180.0;

/// Weight of the scarcity (circulating vs. total supply) contribution
pub const SUPPLY_WEIGHT: f64 = 0.5;

/// Cap on the turnover-driven demand contribution
pub const DEMAND_WEIGHT: f64 = 0.2;

/// Daily turnover (24h volume / market cap) at which demand saturates
pub const TURNOVER_REF: f64 = 0.25;

/// Maximum number of latency samples kept for provider health metrics
pub const MAX_HEALTH_SAMPLES: usize = 100;

/// YouTube Data API base URL
pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Environment variable holding the YouTube Data API key
pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Shortest well-formed YouTube video id
pub const MIN_VIDEO_ID_LEN: usize = 10;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "content-token-oracle/0.1.0";
