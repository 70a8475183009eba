//! Pricing model for tokenized video content
//!
//! A pure mapping from an engagement snapshot to a valuation. No I/O,
//! no mutable state: the oracle fetches metrics, this module prices
//! them, the store keeps the result.
//!
//! The price is a base valuation scaled by a sum of bounded factor
//! contributions:
//!
//! ```text
//! price = BASE_PRICE * (1 + view + like + subscriber + time + supply + demand)
//! ```
//!
//! clamped to [`MIN_PRICE`]. Each term is exposed independently in
//! [`PriceFactors`] for display and testing.

use crate::{
    constants::{
        BASE_PRICE, DECAY_TAU_DAYS, DECAY_WEIGHT, DEMAND_WEIGHT, LIKE_RATE_REF, LIKE_WEIGHT,
        MIN_PRICE, SUBSCRIBER_WEIGHT, SUPPLY_WEIGHT, TURNOVER_REF, VIEW_WEIGHT,
    },
    types::{PriceFactors, TokenMetrics},
};

/// Output of one pricing pass
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    /// Price in quote currency, strictly positive
    pub current_price: f64,
    /// Price times circulating supply
    pub market_cap: f64,
    /// Trailing 24h volume carried through from the snapshot
    pub volume_24h: f64,
    /// Per-factor breakdown of the valuation
    pub factors: PriceFactors,
}

/// Computes a valuation for the given metrics snapshot
///
/// Malformed inputs are sanitized deterministically before pricing:
/// likes are clamped to views, circulating supply to total supply,
/// non-finite or negative volume to zero, future publish dates to an
/// age of zero days. The returned price is always finite and at least
/// [`MIN_PRICE`].
pub fn calculate_price(metrics: &TokenMetrics) -> Valuation {
    let views = metrics.views;
    let likes = metrics.likes.min(views);
    let total_supply = metrics.total_supply;
    let circulating = metrics.circulating_supply.min(total_supply);
    let volume_24h = if metrics.trading_volume_24h.is_finite() {
        metrics.trading_volume_24h.max(0.0)
    } else {
        0.0
    };
    let days = metrics.days_since_published();

    let view_impact = VIEW_WEIGHT * (1.0 + views as f64).ln();

    // Ratio against views, saturating at the reference like rate.
    let like_impact = if views == 0 {
        0.0
    } else {
        let ratio = likes as f64 / views as f64;
        LIKE_WEIGHT * (ratio / LIKE_RATE_REF).min(1.0)
    };

    let subscriber_impact = SUBSCRIBER_WEIGHT * (1.0 + metrics.subscribers as f64).ln();

    // Zero for fresh uploads, saturating at -DECAY_WEIGHT for old ones.
    let time_impact = -DECAY_WEIGHT * (1.0 - (-days / DECAY_TAU_DAYS).exp());

    let supply_impact = if total_supply == 0 {
        0.0
    } else {
        SUPPLY_WEIGHT * (1.0 - circulating as f64 / total_supply as f64)
    };

    // Demand is turnover against the cap implied by the other factors,
    // so that volume is judged relative to what the token is worth.
    let provisional = (BASE_PRICE
        * (1.0 + view_impact + like_impact + subscriber_impact + time_impact + supply_impact))
        .max(MIN_PRICE);
    let provisional_cap = provisional * circulating as f64;
    let demand_impact = if provisional_cap > 0.0 {
        let turnover = volume_24h / provisional_cap;
        DEMAND_WEIGHT * (turnover / TURNOVER_REF).min(1.0)
    } else {
        0.0
    };

    let factors = PriceFactors {
        view_impact,
        like_impact,
        subscriber_impact,
        time_impact,
        supply_impact,
        demand_impact,
    };

    let current_price = (BASE_PRICE * (1.0 + factors.total())).max(MIN_PRICE);
    let market_cap = current_price * circulating as f64;

    Valuation {
        current_price,
        market_cap,
        volume_24h,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn metrics(views: u64, likes: u64) -> TokenMetrics {
        TokenMetrics {
            asset_id: 1,
            video_id: "dQw4w9WgXcQ".to_string(),
            views,
            likes,
            subscribers: 0,
            published_at: Utc::now(),
            total_supply: 1_000_000,
            circulating_supply: 1_000_000,
            trading_volume_24h: 0.0,
            holders: 0,
        }
    }

    #[test]
    fn price_is_always_positive() {
        let snapshots = [
            metrics(0, 0),
            metrics(1, 1),
            metrics(u64::MAX / 2, 0),
            TokenMetrics {
                published_at: Utc::now() - Duration::days(36_500),
                total_supply: 0,
                circulating_supply: 0,
                ..metrics(0, 0)
            },
        ];
        for m in &snapshots {
            let v = calculate_price(m);
            assert!(v.current_price.is_finite());
            assert!(v.current_price >= MIN_PRICE);
        }
    }

    #[test]
    fn more_views_never_lower_the_price() {
        // Likes held fixed across each pair, including right at the
        // saturation ratio where the like factor loss is steepest.
        let cases = [
            (0u64, 1u64, 0u64),
            (100, 10_000, 5),
            (1_000, 2_000, 100),
            (10_000, 20_000, 1_000),
            (1_000_000, 100_000_000, 50_000),
        ];
        for (lo, hi, likes) in cases {
            let p_lo = calculate_price(&metrics(lo, likes)).current_price;
            let p_hi = calculate_price(&metrics(hi, likes)).current_price;
            assert!(
                p_hi >= p_lo,
                "views {lo} -> {hi} (likes {likes}) dropped price {p_lo} -> {p_hi}"
            );
        }
    }

    #[test]
    fn higher_like_ratio_raises_the_price() {
        let low = calculate_price(&metrics(10_000, 10)).current_price;
        let high = calculate_price(&metrics(10_000, 900)).current_price;
        assert!(high > low);
    }

    #[test]
    fn like_impact_is_bounded() {
        let v = calculate_price(&metrics(100, 100));
        assert!(v.factors.like_impact <= LIKE_WEIGHT + 1e-12);
    }

    #[test]
    fn subscribers_raise_the_price() {
        let few = TokenMetrics {
            subscribers: 100,
            ..metrics(1_000, 50)
        };
        let many = TokenMetrics {
            subscribers: 1_000_000,
            ..metrics(1_000, 50)
        };
        assert!(
            calculate_price(&many).current_price > calculate_price(&few).current_price
        );
    }

    #[test]
    fn old_content_decays_but_saturates() {
        let fresh = metrics(10_000, 500);
        let aged = TokenMetrics {
            published_at: Utc::now() - Duration::days(720),
            ..fresh.clone()
        };
        let ancient = TokenMetrics {
            published_at: Utc::now() - Duration::days(7_200),
            ..fresh.clone()
        };

        let p_fresh = calculate_price(&fresh);
        let p_aged = calculate_price(&aged);
        let p_ancient = calculate_price(&ancient);

        assert!(p_aged.current_price < p_fresh.current_price);
        assert!(p_ancient.current_price <= p_aged.current_price);
        // Saturation: the penalty approaches -DECAY_WEIGHT, never beyond.
        assert!(p_ancient.factors.time_impact >= -DECAY_WEIGHT);
        assert!(p_ancient.current_price >= MIN_PRICE);
    }

    #[test]
    fn scarcity_raises_the_price() {
        let diluted = metrics(10_000, 500);
        let scarce = TokenMetrics {
            circulating_supply: 100_000,
            ..diluted.clone()
        };
        assert!(
            calculate_price(&scarce).current_price > calculate_price(&diluted).current_price
        );
    }

    #[test]
    fn trading_volume_raises_the_price_up_to_a_cap() {
        let quiet = metrics(10_000, 500);
        let active = TokenMetrics {
            trading_volume_24h: 200_000.0,
            ..quiet.clone()
        };
        let frenzied = TokenMetrics {
            trading_volume_24h: 2e12,
            ..quiet.clone()
        };

        let p_quiet = calculate_price(&quiet);
        let p_active = calculate_price(&active);
        let p_frenzied = calculate_price(&frenzied);

        assert!(p_active.current_price > p_quiet.current_price);
        assert!(p_frenzied.factors.demand_impact <= DEMAND_WEIGHT + 1e-12);
    }

    #[test]
    fn market_cap_is_price_times_circulating_supply() {
        let m = metrics(50_000, 2_500);
        let v = calculate_price(&m);
        let expected = v.current_price * m.circulating_supply as f64;
        assert!((v.market_cap - expected).abs() < 1e-9);
    }

    #[test]
    fn malformed_snapshots_are_sanitized() {
        // Likes above views behave as a fully-liked video, not more.
        let overliked = metrics(100, 100_000);
        let fully_liked = metrics(100, 100);
        assert_eq!(
            calculate_price(&overliked).current_price,
            calculate_price(&fully_liked).current_price
        );

        // Circulating above total reads as fully diluted.
        let inconsistent = TokenMetrics {
            circulating_supply: 5_000_000,
            ..metrics(1_000, 50)
        };
        assert!(calculate_price(&inconsistent).factors.supply_impact.abs() < 1e-12);

        // Garbage volume contributes nothing.
        let nan_volume = TokenMetrics {
            trading_volume_24h: f64::NAN,
            ..metrics(1_000, 50)
        };
        let v = calculate_price(&nan_volume);
        assert_eq!(v.volume_24h, 0.0);
        assert!(v.current_price.is_finite());

        // A publish date in the future is treated as brand new.
        let future = TokenMetrics {
            published_at: Utc::now() + Duration::days(30),
            ..metrics(1_000, 50)
        };
        assert!(calculate_price(&future).factors.time_impact.abs() < 1e-9);
    }
}
