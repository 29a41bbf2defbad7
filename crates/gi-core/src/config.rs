use crate::aggregate::BucketWidth;
use crate::app_config::{AppConfig, MapMode};
use crate::types::Engine;
use crate::ConfigError;

/// Load dashboard configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid, or if the
/// choropleth map is requested without a world boundaries file.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load dashboard configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_base = or_default("GI_API_BASE", "http://localhost:8000");
    if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
        return Err(invalid(
            "GI_API_BASE",
            format!("expected an http(s) URL, got '{api_base}'"),
        ));
    }

    let log_level = or_default("GI_LOG_LEVEL", "warn");
    let request_timeout_secs = parse_u64("GI_REQUEST_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("GI_USER_AGENT", "globalinsights/0.1 (dashboard)");

    let default_hours = parse_u32("GI_DEFAULT_HOURS", "168")?;
    if default_hours == 0 {
        return Err(invalid("GI_DEFAULT_HOURS", "must be at least 1".to_string()));
    }

    let default_engine = or_default("GI_DEFAULT_ENGINE", "auto")
        .parse::<Engine>()
        .map_err(|e| invalid("GI_DEFAULT_ENGINE", e))?;

    let time_bucket = or_default("GI_TIME_BUCKET", "hour")
        .parse::<BucketWidth>()
        .map_err(|e| invalid("GI_TIME_BUCKET", e))?;

    let map_mode = parse_map_mode(&or_default("GI_MAP_MODE", "bubble"))?;
    let world_geojson = lookup("GI_WORLD_GEOJSON").ok().map(PathBuf::from);
    if map_mode == MapMode::Choropleth && world_geojson.is_none() {
        return Err(ConfigError::MissingEnvVar("GI_WORLD_GEOJSON".to_string()));
    }

    let post_limit = parse_usize("GI_POST_LIMIT", "20")?;

    Ok(AppConfig {
        api_base,
        log_level,
        request_timeout_secs,
        user_agent,
        default_hours,
        default_engine,
        time_bucket,
        map_mode,
        world_geojson,
        post_limit,
    })
}

/// Parse a string into a `MapMode` variant.
fn parse_map_mode(s: &str) -> Result<MapMode, ConfigError> {
    match s {
        "bubble" => Ok(MapMode::Bubble),
        "choropleth" => Ok(MapMode::Choropleth),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GI_MAP_MODE".to_string(),
            reason: format!("expected 'bubble' or 'choropleth', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
