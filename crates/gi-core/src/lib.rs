//! Client-side model and aggregation logic for the `GlobalInsights` dashboard.
//!
//! Everything here is pure: the backend does search, scoring and geocoding,
//! this crate turns its responses into the numbers and colors the dashboard
//! panels show.

pub mod aggregate;
pub mod app_config;
pub mod chat;
pub mod colors;
pub mod config;
pub mod dashboard;
pub mod geo;
pub mod types;

use thiserror::Error;

pub use aggregate::{
    count_sentiment, filter_by_country, time_series, time_series_in, top_countries, BucketWidth,
    CountrySelection, SentimentBucket, SentimentCounts, TimePoint,
};
pub use app_config::{AppConfig, MapMode};
pub use chat::{ChatRequest, ChatTranscript};
pub use colors::{choropleth_color, color_for_avg, hue_for_avg, rgb_for_avg, Rgb};
pub use config::{load_app_config, load_app_config_from_env};
pub use dashboard::{Dashboard, InsightsParams, SAMPLE_QUERY};
pub use types::{
    Aspects, ChatMessage, ChatReply, ChatRole, CountryAggregate, Engine, GeoResult,
    InsightsResult, Post, Quote, SearchParams, SearchResult, TimeWindow,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read world boundaries at {path}: {source}")]
    WorldFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse world boundaries: {0}")]
    WorldFileParse(#[source] serde_json::Error),
}
