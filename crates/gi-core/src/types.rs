//! Backend response types as the dashboard consumes them.
//!
//! Field names follow the backend's JSON. Nothing here is persisted; values
//! live only as long as the dashboard state that holds them.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Sentiment scoring method the backend should use for a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Auto,
    Vader,
    Gemini,
}

impl Engine {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Auto => "auto",
            Engine::Vader => "vader",
            Engine::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Engine::Auto),
            "vader" => Ok(Engine::Vader),
            "gemini" => Ok(Engine::Gemini),
            other => Err(format!(
                "unknown engine '{other}' (expected auto, vader or gemini)"
            )),
        }
    }
}

/// Search window in hours, counted back from now on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow(pub u32);

impl TimeWindow {
    /// Windows offered by the dashboard's window selector.
    pub const PRESETS: [TimeWindow; 4] = [
        TimeWindow(24),
        TimeWindow(72),
        TimeWindow(168),
        TimeWindow(720),
    ];

    #[must_use]
    pub fn hours(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn label(self) -> String {
        match self.0 {
            168 => "Last 7d".to_string(),
            720 => "Last 30d".to_string(),
            h => format!("Last {h}h"),
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow(168)
    }
}

/// Accepts plain hours (`72`), an `h` suffix (`72h`) or days (`7d`).
impl std::str::FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let (digits, per_unit) = match s.strip_suffix('d') {
            Some(days) => (days, 24),
            None => (s.strip_suffix('h').unwrap_or(&s), 1),
        };
        let hours = digits
            .parse::<u32>()
            .ok()
            .and_then(|n| n.checked_mul(per_unit))
            .filter(|h| *h >= 1)
            .ok_or_else(|| format!("invalid window '{s}' (expected hours like 24, 72h or 7d)"))?;
        Ok(TimeWindow(hours))
    }
}

/// Query parameters shared by the search and geo endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub hours: u32,
    pub engine: Engine,
    /// Ask the backend to serve its bundled sample data instead of live sources.
    pub use_sample: bool,
}

/// A single scored social post or article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Free-form label; only its `pos`/`neg` prefix is interpreted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiment_label: String,
    /// Expected in `[-1.0, 1.0]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiment_score: f64,
    #[serde(default)]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub keyword: String,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub engine_used: Option<String>,
}

impl SearchResult {
    /// Number of posts the backend reports, falling back to the list length.
    #[must_use]
    pub fn total(&self) -> usize {
        self.count.unwrap_or(self.posts.len())
    }
}

/// Per-country rollup computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryAggregate {
    /// ISO 3166-1 alpha-2 code.
    pub cc: String,
    pub n: u64,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoResult {
    pub keyword: String,
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub countries: Vec<CountryAggregate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aspects {
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quality: f64,
    #[serde(default)]
    pub service: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default = "neutral_label")]
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub aspects: Aspects,
    #[serde(default)]
    pub quotes: Vec<Quote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body of a `/api/chat` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: Option<String>,
}

fn neutral_label() -> String {
    "neutral".to_string()
}

/// Nullable backend columns decode as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 timestamps and naive ISO timestamps (read as UTC).
///
/// The backend's SQLite rows come back without an offset while fresh rows
/// carry `+00:00`, so both shapes show up in the same response.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognized timestamp '{raw}'"))
    })
}

/// Parse a backend timestamp. Returns `None` for anything unrecognized.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn engine_parses_case_insensitively() {
        assert_eq!("VADER".parse::<Engine>().unwrap(), Engine::Vader);
        assert_eq!(" gemini ".parse::<Engine>().unwrap(), Engine::Gemini);
        assert!("bert".parse::<Engine>().is_err());
    }

    #[test]
    fn time_window_parses_hours_and_days() {
        assert_eq!("72".parse::<TimeWindow>(), Ok(TimeWindow(72)));
        assert_eq!("24h".parse::<TimeWindow>(), Ok(TimeWindow(24)));
        assert_eq!(" 7D ".parse::<TimeWindow>(), Ok(TimeWindow(168)));
        assert!("0".parse::<TimeWindow>().is_err());
        assert!("week".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn time_window_labels_match_selector() {
        let labels: Vec<String> = TimeWindow::PRESETS.iter().map(|w| w.label()).collect();
        assert_eq!(labels, ["Last 24h", "Last 72h", "Last 7d", "Last 30d"]);
        assert_eq!(TimeWindow::default().hours(), 168);
    }

    #[test]
    fn parse_timestamp_accepts_offset_and_naive() {
        let with_offset = parse_timestamp("2025-03-01T10:15:00+02:00").unwrap();
        assert_eq!(with_offset, Utc.with_ymd_and_hms(2025, 3, 1, 8, 15, 0).unwrap());

        let naive = parse_timestamp("2025-03-01T10:15:00.250000").unwrap();
        assert_eq!(naive.hour(), 10);
        assert_eq!(naive.nanosecond(), 250_000_000);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn post_deserializes_backend_shape() {
        let json = serde_json::json!({
            "id": "yt:abc",
            "source": "youtube",
            "author": "someone",
            "text": "love my new EV",
            "created_at": "2025-03-01T10:15:00",
            "sentiment_score": 0.8,
            "sentiment_label": "positive",
            "country_code": null
        });
        let post: Post = serde_json::from_value(json).unwrap();
        assert_eq!(post.source, "youtube");
        assert!(post.country_code.is_none());
        assert_eq!(post.created_at, Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap());
    }

    #[test]
    fn post_treats_null_columns_as_defaults() {
        let json = serde_json::json!({
            "source": null,
            "text": null,
            "created_at": "2025-03-01T10:15:00+00:00",
            "sentiment_score": null,
            "sentiment_label": null
        });
        let post: Post = serde_json::from_value(json).unwrap();
        assert_eq!(post.source, "");
        assert_eq!(post.text, "");
        assert_eq!(post.sentiment_label, "");
        assert!(post.sentiment_score.abs() < f64::EPSILON);
    }

    #[test]
    fn search_total_prefers_backend_count() {
        let result = SearchResult {
            keyword: "ev".to_string(),
            count: Some(12),
            posts: Vec::new(),
            engine_used: None,
        };
        assert_eq!(result.total(), 12);

        let result = SearchResult {
            count: None,
            ..result
        };
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn insights_fill_missing_fields() {
        let insights: InsightsResult =
            serde_json::from_value(serde_json::json!({ "summary": "ok" })).unwrap();
        assert!(insights.themes.is_empty());
        assert_eq!(insights.aspects, Aspects::default());

        let quote: Quote = serde_json::from_value(serde_json::json!({ "text": "hi" })).unwrap();
        assert_eq!(quote.sentiment, "neutral");
    }

    #[test]
    fn chat_message_roles_serialize_lowercase() {
        let json = serde_json::to_value(ChatMessage::assistant("hello")).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
