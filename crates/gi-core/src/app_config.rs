use std::path::PathBuf;

use crate::aggregate::BucketWidth;
use crate::types::Engine;

/// Which map strategy the dashboard draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// Markers at fixed country centroids, sized by post count.
    Bubble,
    /// Country polygons from a world `GeoJSON` file, filled by average sentiment.
    Choropleth,
}

impl std::fmt::Display for MapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapMode::Bubble => write!(f, "bubble"),
            MapMode::Choropleth => write!(f, "choropleth"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub default_hours: u32,
    pub default_engine: Engine,
    pub time_bucket: BucketWidth,
    pub map_mode: MapMode,
    pub world_geojson: Option<PathBuf>,
    pub post_limit: usize,
}
