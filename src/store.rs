//! In-memory price store
//!
//! Single source of truth for the current price of every tracked
//! token. One entry per asset id; the refresh cycle is the only
//! writer after registration.

use crate::{
    pricing::Valuation,
    types::{MetricsSnapshot, TokenPriceData},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory store for token price data
///
/// All mutation goes through one `RwLock` over the whole map, so a
/// refresh replaces price, change, market cap and the high/low
/// envelope in a single step. Concurrent refreshes of the same asset
/// serialize on the write lock and the later-completing snapshot wins.
pub struct PriceStore {
    prices: RwLock<HashMap<u64, TokenPriceData>>,
}

impl PriceStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts initial price data for a token
    ///
    /// Returns false without touching anything if the asset id is
    /// already tracked, which keeps registration idempotent.
    pub async fn insert(&self, data: TokenPriceData) -> bool {
        let mut prices = self.prices.write().await;
        if prices.contains_key(&data.asset_id) {
            return false;
        }
        prices.insert(data.asset_id, data);
        true
    }

    /// True if the asset id is tracked
    pub async fn contains(&self, asset_id: u64) -> bool {
        self.prices.read().await.contains_key(&asset_id)
    }

    /// Removes a token; no error if absent
    pub async fn remove(&self, asset_id: u64) {
        self.prices.write().await.remove(&asset_id);
    }

    /// Removes every token
    pub async fn clear(&self) {
        self.prices.write().await.clear();
    }

    /// Gets the current price data for a token
    pub async fn get(&self, asset_id: u64) -> Option<TokenPriceData> {
        self.prices.read().await.get(&asset_id).cloned()
    }

    /// Gets price data for all tracked tokens, in no particular order
    pub async fn get_all(&self) -> Vec<TokenPriceData> {
        self.prices.read().await.values().cloned().collect()
    }

    /// Asset ids of all tracked tokens
    pub async fn asset_ids(&self) -> Vec<u64> {
        self.prices.read().await.keys().copied().collect()
    }

    /// Number of tracked tokens
    pub async fn len(&self) -> usize {
        self.prices.read().await.len()
    }

    /// True when nothing is tracked
    pub async fn is_empty(&self) -> bool {
        self.prices.read().await.is_empty()
    }

    /// Applies a completed refresh to a token
    ///
    /// Replaces price, change, market cap and volume, widens the
    /// high/low envelope against the new price, and stamps the
    /// timestamps and metrics snapshot, all under one write lock.
    ///
    /// # Returns
    /// The price before the refresh, or None if the token was removed
    /// while the refresh was in flight.
    pub async fn apply_refresh(
        &self,
        asset_id: u64,
        valuation: &Valuation,
        metrics: MetricsSnapshot,
        next_update: DateTime<Utc>,
        video_title: Option<String>,
    ) -> Option<f64> {
        let mut prices = self.prices.write().await;
        let entry = prices.get_mut(&asset_id)?;

        let old_price = entry.current_price;
        let new_price = valuation.current_price;

        entry.current_price = new_price;
        entry.price_change_24h = new_price - old_price;
        entry.price_change_percent = if old_price > 0.0 {
            (new_price - old_price) / old_price * 100.0
        } else {
            0.0
        };
        entry.market_cap = valuation.market_cap;
        entry.volume_24h = valuation.volume_24h;
        entry.high_24h = entry.high_24h.max(new_price);
        entry.low_24h = entry.low_24h.min(new_price);
        entry.last_updated = Utc::now();
        entry.next_update = next_update;
        entry.metrics = metrics;
        if video_title.is_some() {
            entry.video_title = video_title;
        }

        Some(old_price)
    }
}

impl Default for PriceStore {
    fn default() -> Self {
        Self::new()
    }
}
