//! Video metrics provider implementations

pub mod failover;
pub mod youtube;

pub use failover::FailoverMetricsProvider;
pub use youtube::YouTubeMetricsProvider;
