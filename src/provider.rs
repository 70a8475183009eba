//! Provider abstraction for fetching video engagement metrics

use crate::{error::MetricsError, types::VideoInfo};
use async_trait::async_trait;

/// Trait for video metrics providers
///
/// Implementations look up engagement numbers for a content id from
/// an external source (YouTube Data API, a scraper, a fixture).
/// Fetching is the oracle's only suspension point; everything
/// downstream of a returned [`VideoInfo`] is synchronous.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Fetches metadata and engagement counts for a single video
    ///
    /// # Arguments
    /// * `video_id` - The content id to look up
    ///
    /// # Returns
    /// Video info or an error if the lookup fails. Errors are treated
    /// as per-asset and non-fatal by the oracle.
    async fn get_video_info(&self, video_id: &str) -> Result<VideoInfo, MetricsError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock provider for testing
    pub struct MockProvider {
        responses: Arc<Mutex<HashMap<String, Result<VideoInfo, MetricsError>>>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl Default for MockProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self {
                responses: Arc::new(Mutex::new(HashMap::new())),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn set_video(&self, video_id: &str, views: u64, likes: u64) {
            self.set_video_published(video_id, views, likes, Utc::now());
        }

        pub fn set_video_published(
            &self,
            video_id: &str,
            views: u64,
            likes: u64,
            published_at: DateTime<Utc>,
        ) {
            let info = VideoInfo {
                id: video_id.to_string(),
                title: format!("video {video_id}"),
                view_count: views,
                like_count: likes,
                subscriber_count: 0,
                published_at,
            };
            self.responses
                .lock()
                .unwrap()
                .insert(video_id.to_string(), Ok(info));
        }

        pub fn set_error(&self, video_id: &str, error: MetricsError) {
            self.responses
                .lock()
                .unwrap()
                .insert(video_id.to_string(), Err(error));
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl MetricsProvider for MockProvider {
        async fn get_video_info(&self, video_id: &str) -> Result<VideoInfo, MetricsError> {
            *self.call_count.lock().unwrap() += 1;
            let responses = self.responses.lock().unwrap();
            match responses.get(video_id) {
                Some(Ok(info)) => Ok(info.clone()),
                Some(Err(err)) => {
                    // Manual "clone" of MetricsError since it doesn't implement Clone
                    match err {
                        MetricsError::Network(e) => {
                            Err(MetricsError::Api(format!("Network error (cloned): {e}")))
                        }
                        MetricsError::InvalidResponse(s) => {
                            Err(MetricsError::InvalidResponse(s.clone()))
                        }
                        MetricsError::RateLimited => Err(MetricsError::RateLimited),
                        MetricsError::InvalidVideoId(s) => {
                            Err(MetricsError::InvalidVideoId(s.clone()))
                        }
                        MetricsError::VideoNotFound(s) => {
                            Err(MetricsError::VideoNotFound(s.clone()))
                        }
                        MetricsError::Api(s) => Err(MetricsError::Api(s.clone())),
                        MetricsError::Timeout => Err(MetricsError::Timeout),
                    }
                }
                None => Err(MetricsError::VideoNotFound(video_id.to_string())),
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
