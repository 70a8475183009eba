//! Failover metrics provider implementation

use crate::{error::MetricsError, provider::MetricsProvider, types::VideoInfo};
use async_trait::async_trait;
use std::sync::Arc;

/// Metrics provider that attempts each configured source in order
/// until one succeeds.
///
/// Mirrors the production setup where the official API is primary and
/// a scraper-style source covers quota exhaustion.
pub struct FailoverMetricsProvider {
    providers: Vec<Arc<dyn MetricsProvider>>,
}

impl FailoverMetricsProvider {
    /// Creates a new failover provider with a list of sources
    ///
    /// The sources are tried in the order they are provided.
    pub fn new(providers: Vec<Arc<dyn MetricsProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl MetricsProvider for FailoverMetricsProvider {
    async fn get_video_info(&self, video_id: &str) -> Result<VideoInfo, MetricsError> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.get_video_info(video_id).await {
                Ok(info) => return Ok(info),
                Err(e) => {
                    tracing::warn!(
                        provider = provider.provider_name(),
                        video_id,
                        error = %e,
                        "Metrics source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| MetricsError::Api("No providers configured for failover".to_string())))
    }

    fn provider_name(&self) -> &'static str {
        "failover"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;

    #[tokio::test]
    async fn falls_through_to_the_next_source() {
        let broken = MockProvider::new();
        broken.set_error("dQw4w9WgXcQ", MetricsError::RateLimited);
        let healthy = MockProvider::new();
        healthy.set_video("dQw4w9WgXcQ", 1_000, 50);

        let failover = FailoverMetricsProvider::new(vec![Arc::new(broken), Arc::new(healthy)]);
        let info = failover.get_video_info("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(info.view_count, 1_000);
    }

    #[tokio::test]
    async fn reports_the_last_error_when_all_sources_fail() {
        let a = MockProvider::new();
        a.set_error("dQw4w9WgXcQ", MetricsError::RateLimited);
        let b = MockProvider::new();
        b.set_error("dQw4w9WgXcQ", MetricsError::Timeout);

        let failover = FailoverMetricsProvider::new(vec![Arc::new(a), Arc::new(b)]);
        let err = failover.get_video_info("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, MetricsError::Timeout));
    }
}
