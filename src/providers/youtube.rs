//! YouTube Data API metrics provider implementation

use crate::{
    constants::{MIN_VIDEO_ID_LEN, REQUEST_TIMEOUT_SECS, USER_AGENT, YOUTUBE_API_KEY_ENV, YOUTUBE_API_URL},
    error::MetricsError,
    provider::MetricsProvider,
    types::VideoInfo,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// YouTube API response for `videos.list`
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    published_at: String,
    channel_id: String,
}

/// Counts come back as decimal strings; likeCount is withheld on some
/// videos and simply absent from the payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

/// YouTube API response for `channels.list`
#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    statistics: ChannelStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
}

/// YouTube Data API v3 metrics provider
pub struct YouTubeMetricsProvider {
    client: Client,
    api_key: String,
}

impl YouTubeMetricsProvider {
    /// Creates a new YouTube provider with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, MetricsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(MetricsError::Network)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Creates a provider from the `YOUTUBE_API_KEY` environment variable
    pub fn from_env() -> Result<Self, MetricsError> {
        let api_key = std::env::var(YOUTUBE_API_KEY_ENV)
            .map_err(|_| MetricsError::Api(format!("{YOUTUBE_API_KEY_ENV} is not set")))?;
        Self::new(api_key)
    }

    /// Rejects ids that cannot possibly resolve before spending a request
    fn validate_video_id(video_id: &str) -> Result<(), MetricsError> {
        if video_id.is_empty() || video_id == "unknown" || video_id.len() < MIN_VIDEO_ID_LEN {
            return Err(MetricsError::InvalidVideoId(video_id.to_string()));
        }
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, MetricsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(MetricsError::Network)?;

        if response.status().as_u16() == 429 {
            return Err(MetricsError::RateLimited);
        }

        if !response.status().is_success() {
            return Err(MetricsError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let response_text = response.text().await.map_err(MetricsError::Network)?;

        serde_json::from_str(&response_text).map_err(|e| {
            MetricsError::InvalidResponse(format!(
                "Failed to parse YouTube response: {e}. Response: {response_text}"
            ))
        })
    }

    /// Looks up the uploading channel's subscriber count
    ///
    /// Best effort: a failure here degrades the subscriber factor to
    /// zero rather than failing the whole metrics fetch.
    async fn fetch_subscriber_count(&self, channel_id: &str) -> u64 {
        let url = format!(
            "{}/channels?part=statistics&id={}&key={}",
            YOUTUBE_API_URL, channel_id, self.api_key
        );

        match self.get_json::<ChannelListResponse>(&url).await {
            Ok(response) => response
                .items
                .first()
                .and_then(|c| c.statistics.subscriber_count.as_deref())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            Err(e) => {
                tracing::debug!(channel_id, error = %e, "Channel statistics lookup failed");
                0
            }
        }
    }
}

#[async_trait]
impl MetricsProvider for YouTubeMetricsProvider {
    async fn get_video_info(&self, video_id: &str) -> Result<VideoInfo, MetricsError> {
        Self::validate_video_id(video_id)?;

        let url = format!(
            "{}/videos?part=snippet,statistics&id={}&key={}",
            YOUTUBE_API_URL, video_id, self.api_key
        );
        tracing::debug!(video_id, "Fetching video metrics from YouTube");

        let response: VideoListResponse = self.get_json(&url).await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| MetricsError::VideoNotFound(video_id.to_string()))?;

        let published_at: DateTime<Utc> = item
            .snippet
            .published_at
            .parse()
            .map_err(|e| {
                MetricsError::InvalidResponse(format!(
                    "Bad publishedAt '{}': {e}",
                    item.snippet.published_at
                ))
            })?;

        let view_count = item
            .statistics
            .view_count
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let like_count = item
            .statistics
            .like_count
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        let subscriber_count = self.fetch_subscriber_count(&item.snippet.channel_id).await;

        tracing::debug!(
            video_id,
            view_count,
            like_count,
            subscriber_count,
            "Successfully fetched video metrics from YouTube"
        );

        Ok(VideoInfo {
            id: item.id,
            title: item.snippet.title,
            view_count,
            like_count,
            subscriber_count,
            published_at,
        })
    }

    fn provider_name(&self) -> &'static str {
        "youtube"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_or_placeholder_ids_are_rejected() {
        assert!(YouTubeMetricsProvider::validate_video_id("").is_err());
        assert!(YouTubeMetricsProvider::validate_video_id("unknown").is_err());
        assert!(YouTubeMetricsProvider::validate_video_id("abc").is_err());
        assert!(YouTubeMetricsProvider::validate_video_id("dQw4w9WgXcQ").is_ok());
    }

    #[test]
    fn video_list_response_parses_string_counts() {
        let payload = r#"{
            "items": [{
                "id": "dQw4w9WgXcQ",
                "snippet": {
                    "title": "Never Gonna Give You Up",
                    "publishedAt": "2009-10-25T06:57:33Z",
                    "channelId": "UCuAXFkgsw1L7xaCfnd5JJOw"
                },
                "statistics": {"viewCount": "1700000000", "likeCount": "18000000"}
            }]
        }"#;
        let parsed: VideoListResponse = serde_json::from_str(payload).unwrap();
        let item = &parsed.items[0];
        assert_eq!(item.statistics.view_count.as_deref(), Some("1700000000"));
        assert_eq!(item.snippet.channel_id, "UCuAXFkgsw1L7xaCfnd5JJOw");
    }

    #[test]
    fn withheld_like_count_parses_as_absent() {
        let payload = r#"{
            "items": [{
                "id": "dQw4w9WgXcQ",
                "snippet": {
                    "title": "t",
                    "publishedAt": "2024-01-01T00:00:00Z",
                    "channelId": "c"
                },
                "statistics": {"viewCount": "10"}
            }]
        }"#;
        let parsed: VideoListResponse = serde_json::from_str(payload).unwrap();
        assert!(parsed.items[0].statistics.like_count.is_none());
    }
}
