//! Types for the pricing oracle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Point-in-time engagement and supply snapshot for one tokenized video
///
/// Immutable per computation; the refresh cycle builds a fresh snapshot
/// for every pass through the pricing model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMetrics {
    /// Asset id of the token backed by this video
    pub asset_id: u64,
    /// YouTube video id
    pub video_id: String,
    /// View count
    pub views: u64,
    /// Like count
    pub likes: u64,
    /// Subscriber count of the uploading channel
    pub subscribers: u64,
    /// When the video was published
    pub published_at: DateTime<Utc>,
    /// Total token supply
    pub total_supply: u64,
    /// Circulating token supply
    pub circulating_supply: u64,
    /// Trailing 24h trading volume, in quote currency
    pub trading_volume_24h: f64,
    /// Number of token holders
    pub holders: u64,
}

impl TokenMetrics {
    /// Days elapsed since the video was published, clamped at zero
    pub fn days_since_published(&self) -> f64 {
        let age_secs = Utc::now()
            .signed_duration_since(self.published_at)
            .num_seconds();
        (age_secs.max(0) as f64) / 86_400.0
    }
}

/// Named contributions to a price movement
///
/// Each field is a signed, bounded term of the factor sum in the
/// pricing model. Carried in every [`PriceUpdate`] so consumers can
/// show *why* a price moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceFactors {
    /// Logarithmic view-count contribution
    pub view_impact: f64,
    /// Like-to-view ratio contribution
    pub like_impact: f64,
    /// Logarithmic subscriber contribution
    pub subscriber_impact: f64,
    /// Content-age decay, zero or negative
    pub time_impact: f64,
    /// Scarcity contribution from circulating vs. total supply
    pub supply_impact: f64,
    /// Turnover-driven demand contribution
    pub demand_impact: f64,
}

impl PriceFactors {
    /// Sum of all contributions
    pub fn total(&self) -> f64 {
        self.view_impact
            + self.like_impact
            + self.subscriber_impact
            + self.time_impact
            + self.supply_impact
            + self.demand_impact
    }
}

/// Denormalized engagement numbers kept on [`TokenPriceData`] for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub views: u64,
    pub likes: u64,
    pub subscribers: u64,
    pub days_since_published: f64,
}

/// Live price state for one tracked token
///
/// Exactly one of these exists per registered asset id, owned by the
/// price store. Created on registration, mutated only by the refresh
/// cycle, removed on deregistration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPriceData {
    /// Asset id (unique key)
    pub asset_id: u64,
    /// YouTube video id backing the token
    pub video_id: String,
    /// Current price in quote currency
    pub current_price: f64,
    /// Absolute price change over the last refresh window
    pub price_change_24h: f64,
    /// Percent price change over the last refresh window
    pub price_change_percent: f64,
    /// Market cap (current price x circulating supply)
    pub market_cap: f64,
    /// Trailing 24h trading volume
    pub volume_24h: f64,
    /// Highest price seen in the rolling window
    pub high_24h: f64,
    /// Lowest price seen in the rolling window
    pub low_24h: f64,
    /// When this entry was last refreshed
    pub last_updated: DateTime<Utc>,
    /// When the next scheduled refresh is due
    pub next_update: DateTime<Utc>,
    /// Last known engagement numbers
    pub metrics: MetricsSnapshot,
    /// Video title, when the metrics source supplied one
    pub video_title: Option<String>,
}

impl TokenPriceData {
    /// Check if the price data is stale (older than threshold seconds)
    pub fn is_stale(&self, threshold_seconds: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.last_updated);
        age.num_seconds() > threshold_seconds as i64
    }

    /// Get the age of the price data
    pub fn age(&self) -> std::time::Duration {
        let duration = Utc::now().signed_duration_since(self.last_updated);
        std::time::Duration::from_secs(duration.num_seconds().max(0) as u64)
    }
}

/// Broadcast once per successful refresh, then discarded
///
/// Never stored: late subscribers read current state from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Event id
    pub id: Uuid,
    /// Asset id the update applies to
    pub asset_id: u64,
    /// YouTube video id backing the token
    pub video_id: String,
    /// Price before the refresh
    pub old_price: f64,
    /// Price after the refresh
    pub new_price: f64,
    /// Absolute delta
    pub price_change: f64,
    /// Percent delta relative to the old price
    pub price_change_percent: f64,
    /// Market cap after the refresh
    pub market_cap: f64,
    /// Trailing 24h trading volume
    pub volume_24h: f64,
    /// When the refresh completed
    pub updated_at: DateTime<Utc>,
    /// Factor breakdown behind the move
    pub factors: PriceFactors,
}

impl std::fmt::Display for PriceUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Price updated: asset {} {:.4} -> {:.4} ({:+.2}%)",
            self.asset_id, self.old_price, self.new_price, self.price_change_percent
        )
    }
}

/// Video metadata and engagement counts returned by a metrics provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Video id
    pub id: String,
    /// Video title
    pub title: String,
    /// View count
    pub view_count: u64,
    /// Like count
    pub like_count: u64,
    /// Subscriber count of the uploading channel, when available
    pub subscriber_count: u64,
    /// When the video was published
    pub published_at: DateTime<Utc>,
}

/// Aggregate view over all tracked tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceStatistics {
    /// Number of tracked tokens
    pub total_tokens: usize,
    /// Mean current price across tokens
    pub average_price: f64,
    /// Sum of market caps
    pub total_market_cap: f64,
    /// Token with the largest percent gain, if any are tracked
    pub top_gainer: Option<TokenPriceData>,
    /// Token with the largest percent loss, if any are tracked
    pub top_loser: Option<TokenPriceData>,
}
