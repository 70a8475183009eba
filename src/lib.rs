//! # Content Token Oracle
//!
//! Dynamic asset pricing oracle for tokenized video content. Maintains
//! a live price per token derived from external engagement metrics
//! (views, likes, subscribers, content age) plus supply and demand
//! context, refreshes it on a schedule, and pushes updates to
//! interested consumers.
//!
//! ## Usage
//!
//! The oracle is an explicit long-lived service object: construct it
//! once in the host application and pass it by reference to consumers.
//!
//! ```no_run
//! use content_token_oracle::PriceOracle;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let oracle = PriceOracle::from_env()?;
//!
//! // Track a token backed by a video
//! oracle.add_token(1001, "dQw4w9WgXcQ").await;
//!
//! // React to price movements
//! let sub = oracle.subscribe(|update| {
//!     println!("{update}");
//! });
//!
//! // Refresh every five minutes until stop()
//! oracle.start(Duration::from_secs(300)).await;
//!
//! // Read current state at any time
//! for token in oracle.get_all_token_prices().await {
//!     println!("asset {}: {:.4}", token.asset_id, token.current_price);
//! }
//! # sub.unsubscribe();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! PriceOracle::start()
//!     ↓
//! Scheduler tick (every interval, assets refreshed concurrently)
//!     ↓
//! MetricsProvider (YouTube Data API)
//!     ↓
//! pricing::calculate_price (pure factor model)
//!     ↓
//! PriceStore (in-memory, one entry per asset)
//!     ↓
//! SubscriptionBus → observers        Your code (get_token_price, ...)
//! ```
//!
//! ## Error handling
//!
//! Nothing in the oracle is fatal. A failed metrics fetch leaves the
//! asset's last good price in place; read operations return `Option`
//! for unknown assets; a panicking observer never blocks the others.
//!
//! ```no_run
//! use content_token_oracle::{OracleError, PriceOracle};
//!
//! # async fn example(oracle: &PriceOracle) {
//! match oracle.force_update(1001).await {
//!     Ok(update) => println!("{update}"),
//!     Err(OracleError::UnknownAsset(id)) => println!("asset {id} is not tracked"),
//!     Err(e) => eprintln!("refresh failed, price kept: {e}"),
//! }
//! # }
//! ```
//!
//! ## Adding new metrics sources
//!
//! 1. Implement the [`provider::MetricsProvider`] trait
//! 2. Add your source to `src/providers/`
//! 3. Hand it to [`PriceOracle::new`], optionally chained behind
//!    [`providers::FailoverMetricsProvider`]

pub mod bus;
pub mod constants;
pub mod error;
pub mod health;
pub mod oracle;
pub mod pricing;
pub mod provider;
pub mod providers;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use bus::{Subscription, SubscriptionBus};
pub use error::{MetricsError, OracleError};
pub use health::{ComponentHealth, HealthStatus, ProviderHealth};
pub use oracle::PriceOracle;
pub use pricing::{calculate_price, Valuation};
pub use provider::MetricsProvider;
pub use providers::{FailoverMetricsProvider, YouTubeMetricsProvider};
pub use types::{
    PriceFactors, PriceStatistics, PriceUpdate, TokenMetrics, TokenPriceData, VideoInfo,
};
