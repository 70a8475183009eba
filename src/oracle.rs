//! Price oracle service
//!
//! Owns the refresh scheduler, the price store, the subscription bus
//! and the metrics provider, and drives the refresh cycle:
//! fetch metrics -> compute valuation -> update store -> notify
//! subscribers.

use crate::{
    bus::{Subscription, SubscriptionBus},
    constants::{DEFAULT_TOTAL_SUPPLY, FALLBACK_LIKES, FALLBACK_VIEWS, REFRESH_INTERVAL_MS, STALE_THRESHOLD_SECS},
    error::{MetricsError, OracleError},
    health::{ComponentHealth, HealthCollector, HealthStatus, ProviderHealth},
    pricing::calculate_price,
    provider::MetricsProvider,
    providers::YouTubeMetricsProvider,
    store::PriceStore,
    types::{MetricsSnapshot, PriceStatistics, PriceUpdate, TokenMetrics, TokenPriceData},
};
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use uuid::Uuid;

/// Dynamic asset pricing oracle for tokenized video content
///
/// A long-lived service object: the host application constructs one,
/// calls [`start`](Self::start) to begin scheduled refreshes, and
/// passes it by reference to consumers. Trading UI code only reads
/// the store ([`get_token_price`](Self::get_token_price),
/// [`get_all_token_prices`](Self::get_all_token_prices)) or listens
/// on the bus ([`subscribe`](Self::subscribe)); it never prices
/// anything itself.
///
/// # Example
/// ```no_run
/// use content_token_oracle::PriceOracle;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let oracle = PriceOracle::from_env()?;
/// oracle.add_token(1001, "dQw4w9WgXcQ").await;
/// oracle.start(Duration::from_secs(300)).await;
///
/// if let Some(data) = oracle.get_token_price(1001).await {
///     println!("asset 1001: {:.4}", data.current_price);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PriceOracle {
    store: Arc<PriceStore>,
    provider: Arc<dyn MetricsProvider>,
    bus: Arc<SubscriptionBus>,
    health: Arc<HealthCollector>,
    update_queue: Arc<Mutex<HashSet<u64>>>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
    interval_ms: Arc<AtomicU64>,
}

impl PriceOracle {
    /// Creates an oracle backed by the given metrics provider
    pub fn new(provider: Arc<dyn MetricsProvider>) -> Self {
        let health = Arc::new(HealthCollector::new(provider.provider_name()));
        Self {
            store: Arc::new(PriceStore::new()),
            provider,
            bus: Arc::new(SubscriptionBus::new()),
            health,
            update_queue: Arc::new(Mutex::new(HashSet::new())),
            scheduler: Mutex::new(None),
            interval_ms: Arc::new(AtomicU64::new(REFRESH_INTERVAL_MS)),
        }
    }

    /// Creates an oracle backed by the YouTube Data API, with the key
    /// taken from the `YOUTUBE_API_KEY` environment variable
    pub fn from_env() -> Result<Self, MetricsError> {
        Ok(Self::new(Arc::new(YouTubeMetricsProvider::from_env()?)))
    }

    /// Starts scheduled price refreshes
    ///
    /// If the scheduler is already running it is restarted with the
    /// new interval; there is never more than one timer. Each tick
    /// refreshes every tracked asset concurrently and is awaited
    /// before the next tick is scheduled, so ticks do not overlap.
    pub async fn start(&self, interval: Duration) {
        self.interval_ms
            .store(interval.as_millis() as u64, Ordering::Relaxed);

        let mut scheduler = self.scheduler.lock().await;
        if let Some(handle) = scheduler.take() {
            handle.abort();
        }

        let store = self.store.clone();
        let provider = self.provider.clone();
        let bus = self.bus.clone();
        let health = self.health.clone();
        let update_queue = self.update_queue.clone();
        let interval_ms = self.interval_ms.clone();

        tracing::info!(
            interval_secs = interval.as_secs(),
            "Price oracle scheduler started"
        );

        *scheduler = Some(tokio::spawn(async move {
            loop {
                sleep(interval).await;
                Self::run_tick(
                    &store,
                    &provider,
                    &bus,
                    &health,
                    &update_queue,
                    interval_ms.load(Ordering::Relaxed),
                )
                .await;
            }
        }));
    }

    /// Stops scheduled refreshes; idempotent
    ///
    /// Only future ticks are prevented. Refreshes already in flight
    /// run as detached tasks and still update the store - a completed
    /// valid price is kept, not discarded.
    pub async fn stop(&self) {
        let mut scheduler = self.scheduler.lock().await;
        if let Some(handle) = scheduler.take() {
            handle.abort();
            tracing::info!("Price oracle scheduler stopped");
        }
    }

    /// True while the scheduler is running
    pub async fn is_running(&self) -> bool {
        self.scheduler.lock().await.is_some()
    }

    /// One scheduler tick: refresh every tracked asset concurrently
    async fn run_tick(
        store: &Arc<PriceStore>,
        provider: &Arc<dyn MetricsProvider>,
        bus: &Arc<SubscriptionBus>,
        health: &Arc<HealthCollector>,
        update_queue: &Arc<Mutex<HashSet<u64>>>,
        interval_ms: u64,
    ) {
        // Every tracked asset is due; the queue only carries tokens
        // awaiting their first scheduled refresh and is drained here.
        let due = store.asset_ids().await;
        update_queue.lock().await.clear();

        if due.is_empty() {
            tracing::debug!("No tokens to refresh");
            return;
        }
        tracing::debug!(count = due.len(), "Refreshing tracked tokens");

        // Spawned rather than joined in-place so that aborting the
        // scheduler never cancels a refresh that is already running.
        let refreshes: Vec<JoinHandle<()>> = due
            .into_iter()
            .map(|asset_id| {
                let store = store.clone();
                let provider = provider.clone();
                let bus = bus.clone();
                let health = health.clone();
                tokio::spawn(async move {
                    if let Err(e) =
                        Self::refresh_token(&store, &provider, &bus, &health, interval_ms, asset_id)
                            .await
                    {
                        tracing::warn!(
                            asset_id,
                            error = %e,
                            "Refresh failed, keeping last good price"
                        );
                    }
                })
            })
            .collect();

        let _ = join_all(refreshes).await;
    }

    /// One refresh cycle for a single asset
    async fn refresh_token(
        store: &Arc<PriceStore>,
        provider: &Arc<dyn MetricsProvider>,
        bus: &Arc<SubscriptionBus>,
        health: &Arc<HealthCollector>,
        interval_ms: u64,
        asset_id: u64,
    ) -> Result<PriceUpdate, OracleError> {
        let current = store
            .get(asset_id)
            .await
            .ok_or(OracleError::UnknownAsset(asset_id))?;

        let start = Instant::now();
        let video = match provider.get_video_info(&current.video_id).await {
            Ok(video) => {
                health.record_fetch(start.elapsed(), true).await;
                video
            }
            Err(e) => {
                health.record_fetch(start.elapsed(), false).await;
                return Err(e.into());
            }
        };

        let metrics = TokenMetrics {
            asset_id,
            video_id: video.id.clone(),
            views: video.view_count,
            likes: video.like_count,
            subscribers: video.subscriber_count,
            published_at: video.published_at,
            total_supply: DEFAULT_TOTAL_SUPPLY,
            circulating_supply: DEFAULT_TOTAL_SUPPLY,
            trading_volume_24h: current.volume_24h,
            holders: 0,
        };

        let valuation = calculate_price(&metrics);
        let snapshot = MetricsSnapshot {
            views: metrics.views,
            likes: metrics.likes,
            subscribers: metrics.subscribers,
            days_since_published: metrics.days_since_published(),
        };
        let next_update = Utc::now() + chrono::Duration::milliseconds(interval_ms as i64);

        let old_price = store
            .apply_refresh(asset_id, &valuation, snapshot, next_update, Some(video.title))
            .await
            .ok_or(OracleError::UnknownAsset(asset_id))?;

        let new_price = valuation.current_price;
        let price_change = new_price - old_price;
        let update = PriceUpdate {
            id: Uuid::new_v4(),
            asset_id,
            video_id: current.video_id,
            old_price,
            new_price,
            price_change,
            price_change_percent: if old_price > 0.0 {
                price_change / old_price * 100.0
            } else {
                0.0
            },
            market_cap: valuation.market_cap,
            volume_24h: valuation.volume_24h,
            updated_at: Utc::now(),
            factors: valuation.factors,
        };

        tracing::info!(
            asset_id,
            old_price,
            new_price,
            change_percent = update.price_change_percent,
            "Refreshed token price"
        );

        bus.publish(&update);
        Ok(update)
    }

    /// Adds a token to price tracking
    ///
    /// Idempotent: an already-tracked asset id returns immediately
    /// without touching its state. On a failed initial metrics fetch
    /// the token starts from small deterministic defaults instead of
    /// invented numbers, and picks up real data on the next refresh.
    pub async fn add_token(&self, asset_id: u64, video_id: &str) {
        if self.store.contains(asset_id).await {
            tracing::debug!(asset_id, "Token already tracked, skipping");
            return;
        }

        let start = Instant::now();
        let (metrics, video_title) = match self.provider.get_video_info(video_id).await {
            Ok(video) => {
                self.health.record_fetch(start.elapsed(), true).await;
                let metrics = TokenMetrics {
                    asset_id,
                    video_id: video.id.clone(),
                    views: video.view_count,
                    likes: video.like_count,
                    subscribers: video.subscriber_count,
                    published_at: video.published_at,
                    total_supply: DEFAULT_TOTAL_SUPPLY,
                    circulating_supply: DEFAULT_TOTAL_SUPPLY,
                    trading_volume_24h: 0.0,
                    holders: 0,
                };
                (metrics, Some(video.title))
            }
            Err(e) => {
                self.health.record_fetch(start.elapsed(), false).await;
                tracing::warn!(
                    asset_id,
                    video_id,
                    error = %e,
                    "Initial metrics fetch failed, starting from conservative defaults"
                );
                let metrics = TokenMetrics {
                    asset_id,
                    video_id: video_id.to_string(),
                    views: FALLBACK_VIEWS,
                    likes: FALLBACK_LIKES,
                    subscribers: 0,
                    published_at: Utc::now(),
                    total_supply: DEFAULT_TOTAL_SUPPLY,
                    circulating_supply: DEFAULT_TOTAL_SUPPLY,
                    trading_volume_24h: 0.0,
                    holders: 0,
                };
                (metrics, None)
            }
        };

        let valuation = calculate_price(&metrics);
        let now = Utc::now();
        let interval_ms = self.interval_ms.load(Ordering::Relaxed);
        let data = TokenPriceData {
            asset_id,
            video_id: metrics.video_id.clone(),
            current_price: valuation.current_price,
            price_change_24h: 0.0,
            price_change_percent: 0.0,
            market_cap: valuation.market_cap,
            volume_24h: 0.0,
            high_24h: valuation.current_price,
            low_24h: valuation.current_price,
            last_updated: now,
            next_update: now + chrono::Duration::milliseconds(interval_ms as i64),
            metrics: MetricsSnapshot {
                views: metrics.views,
                likes: metrics.likes,
                subscribers: metrics.subscribers,
                days_since_published: metrics.days_since_published(),
            },
            video_title,
        };

        if self.store.insert(data).await {
            self.update_queue.lock().await.insert(asset_id);
            tracing::info!(
                asset_id,
                video_id,
                price = valuation.current_price,
                "Token added to price tracking"
            );
        }
    }

    /// Registers a batch of tokens, skipping duplicate video ids
    ///
    /// Re-scans of the marketplace can surface the same video under
    /// several asset ids; only the first occurrence is registered.
    pub async fn register_tokens(&self, pairs: impl IntoIterator<Item = (u64, String)>) {
        let mut seen_video_ids = HashSet::new();
        for (asset_id, video_id) in pairs {
            if !seen_video_ids.insert(video_id.clone()) {
                tracing::debug!(asset_id, video_id, "Skipping duplicate video id");
                continue;
            }
            self.add_token(asset_id, &video_id).await;
        }
    }

    /// Removes a token from price tracking; no error if absent
    pub async fn remove_token(&self, asset_id: u64) {
        self.store.remove(asset_id).await;
        self.update_queue.lock().await.remove(&asset_id);
        tracing::info!(asset_id, "Token removed from price tracking");
    }

    /// Removes every token from price tracking
    ///
    /// Called before a full marketplace re-scan so re-discovered
    /// content does not produce duplicate entries.
    pub async fn clear_all_tokens(&self) {
        self.store.clear().await;
        self.update_queue.lock().await.clear();
        tracing::info!("Cleared all tokens from price tracking");
    }

    /// Gets current price data for a token
    pub async fn get_token_price(&self, asset_id: u64) -> Option<TokenPriceData> {
        self.store.get(asset_id).await
    }

    /// Gets price data for all tracked tokens, in no particular order
    pub async fn get_all_token_prices(&self) -> Vec<TokenPriceData> {
        self.store.get_all().await
    }

    /// True if the token's price data is stale or the token is unknown
    pub async fn is_stale(&self, asset_id: u64) -> bool {
        match self.store.get(asset_id).await {
            Some(data) => data.is_stale(STALE_THRESHOLD_SECS),
            None => true,
        }
    }

    /// Subscribes to price updates
    ///
    /// The callback runs once per successful refresh. No replay: use
    /// [`get_token_price`](Self::get_token_price) for current state.
    pub fn subscribe(
        &self,
        observer: impl Fn(&PriceUpdate) + Send + Sync + 'static,
    ) -> Subscription {
        self.bus.subscribe(observer)
    }

    /// Refreshes a single asset immediately, bypassing the schedule
    ///
    /// # Returns
    /// The resulting `PriceUpdate`, or an error if the asset is
    /// unknown or the metrics fetch fails. Failures leave the last
    /// good price in place.
    pub async fn force_update(&self, asset_id: u64) -> Result<PriceUpdate, OracleError> {
        Self::refresh_token(
            &self.store,
            &self.provider,
            &self.bus,
            &self.health,
            self.interval_ms.load(Ordering::Relaxed),
            asset_id,
        )
        .await
    }

    /// Aggregate statistics over all tracked tokens
    pub async fn price_statistics(&self) -> PriceStatistics {
        let all = self.store.get_all().await;
        if all.is_empty() {
            return PriceStatistics {
                total_tokens: 0,
                average_price: 0.0,
                total_market_cap: 0.0,
                top_gainer: None,
                top_loser: None,
            };
        }

        let total_tokens = all.len();
        let average_price =
            all.iter().map(|t| t.current_price).sum::<f64>() / total_tokens as f64;
        let total_market_cap = all.iter().map(|t| t.market_cap).sum::<f64>();

        let mut by_change = all;
        by_change.sort_by(|a, b| {
            b.price_change_percent
                .partial_cmp(&a.price_change_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let top_gainer = by_change.first().cloned();
        let top_loser = by_change.last().cloned();

        PriceStatistics {
            total_tokens,
            average_price,
            total_market_cap,
            top_gainer,
            top_loser,
        }
    }

    /// Returns the name of the metrics provider in use
    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Fetch latency percentiles and success rate for the provider
    pub async fn provider_health(&self) -> ProviderHealth {
        self.health.snapshot().await
    }

    /// Perform a health check on the oracle
    pub async fn health_check(&self) -> ComponentHealth {
        let mut details = std::collections::HashMap::new();

        let all = self.get_all_token_prices().await;
        details.insert("tracked_tokens".to_string(), serde_json::json!(all.len()));
        details.insert(
            "provider_name".to_string(),
            serde_json::json!(self.provider_name()),
        );
        details.insert(
            "scheduler_running".to_string(),
            serde_json::json!(self.is_running().await),
        );

        let stale_tokens: Vec<u64> = all
            .iter()
            .filter(|t| t.is_stale(STALE_THRESHOLD_SECS))
            .map(|t| t.asset_id)
            .collect();
        details.insert("stale_tokens".to_string(), serde_json::json!(stale_tokens));

        let provider_health = self.provider_health().await;
        let status = if provider_health.total_requests > 0 && provider_health.success_rate < 0.5 {
            HealthStatus::Unhealthy
        } else if !stale_tokens.is_empty() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let message = match status {
            HealthStatus::Healthy => "Price oracle is operational with fresh data".to_string(),
            HealthStatus::Degraded => {
                format!("Price oracle has {} stale tokens", stale_tokens.len())
            }
            HealthStatus::Unhealthy => format!(
                "Metrics provider failing ({:.0}% success rate)",
                provider_health.success_rate * 100.0
            ),
        };

        ComponentHealth {
            name: "price_oracle".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: Utc::now(),
        }
    }
}
