//! Metrics-source health tracking and reporting
//!
//! Tracks fetch latencies and success rates for the metrics provider,
//! and rolls component status up for the host application.

use crate::constants::MAX_HEALTH_SAMPLES;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;

/// Health summary for the metrics provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    /// Name of the provider
    pub provider_name: String,
    /// 50th percentile fetch latency in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile fetch latency in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of fetches tracked
    pub total_requests: u64,
    /// Number of failed fetches
    pub failed_requests: u64,
}

impl ProviderHealth {
    /// Health summary with no data
    pub fn empty(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_requests: 0,
            failed_requests: 0,
        }
    }
}

/// Overall component status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Component is operational with fresh data
    Healthy,
    /// Component is degraded but still functional
    Degraded,
    /// Component requires attention
    Unhealthy,
}

/// Component health information for the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}

/// Internal sample for latency tracking
#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

/// Collects fetch latency and success samples for one provider
pub struct HealthCollector {
    provider_name: String,
    samples: RwLock<VecDeque<LatencySample>>,
    total_requests: RwLock<u64>,
    failed_requests: RwLock<u64>,
}

impl HealthCollector {
    /// Creates a new collector for a provider
    pub fn new(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            samples: RwLock::new(VecDeque::with_capacity(MAX_HEALTH_SAMPLES)),
            total_requests: RwLock::new(0),
            failed_requests: RwLock::new(0),
        }
    }

    /// Records a fetch with its duration and success status
    pub async fn record_fetch(&self, duration: Duration, success: bool) {
        let duration_ms = duration.as_secs_f64() * 1000.0;

        {
            let mut total = self.total_requests.write().await;
            *total += 1;
        }

        if !success {
            let mut failed = self.failed_requests.write().await;
            *failed += 1;
        }

        let mut samples = self.samples.write().await;
        if samples.len() >= MAX_HEALTH_SAMPLES {
            samples.pop_front();
        }
        samples.push_back(LatencySample {
            duration_ms,
            success,
        });
    }

    /// Computes the current health summary from collected samples
    pub async fn snapshot(&self) -> ProviderHealth {
        let samples = self.samples.read().await;
        let total = *self.total_requests.read().await;
        let failed = *self.failed_requests.read().await;

        if samples.is_empty() {
            return ProviderHealth::empty(&self.provider_name);
        }

        let mut latencies: Vec<f64> = samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if total > 0 {
            (total - failed) as f64 / total as f64
        } else {
            1.0
        };

        ProviderHealth {
            provider_name: self.provider_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: total,
            failed_requests: failed,
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collector_tracks_totals_and_failures() {
        let collector = HealthCollector::new("youtube");

        collector
            .record_fetch(Duration::from_millis(100), true)
            .await;
        collector
            .record_fetch(Duration::from_millis(200), true)
            .await;
        collector
            .record_fetch(Duration::from_millis(150), false)
            .await;

        let health = collector.snapshot().await;
        assert_eq!(health.provider_name, "youtube");
        assert_eq!(health.total_requests, 3);
        assert_eq!(health.failed_requests, 1);
        assert!(health.success_rate > 0.6 && health.success_rate < 0.7);
    }

    #[test]
    fn percentile_of_sorted_values() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
        assert_eq!(percentile(&values, 99.0), 10.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
