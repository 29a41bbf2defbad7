//! HTTP client for the sentiment backend's REST API.
//!
//! Wraps `reqwest` with URL building, status checking and typed response
//! decoding for the search, geo, insights and chat endpoints. There are no
//! retries: a failed call is reported once and the caller decides what the
//! user sees.

use std::time::Duration;

use gi_core::{ChatReply, ChatRequest, GeoResult, InsightsResult, SearchParams, SearchResult};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;

/// Client for the sentiment backend.
///
/// Use [`ApiClient::new`] with the configured origin, or point it at a mock
/// server in tests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct HealthBody {
    #[serde(default)]
    ok: bool,
}

impl ApiClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url`
    /// is not an absolute http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so endpoint paths land under any path
        // prefix the backend is mounted at.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// The backend origin, for messages shown to the user.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Runs a keyword search and returns the scored posts.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Status`] on a non-2xx response.
    /// - [`ApiError::Deserialize`] if the body does not match [`SearchResult`].
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResult, ApiError> {
        let hours = params.hours.to_string();
        let mut query = vec![
            ("q", params.query.as_str()),
            ("hours", hours.as_str()),
            ("engine", params.engine.as_str()),
        ];
        if params.use_sample {
            query.push(("use_sample", "true"));
        }
        let url = self.build_url("api/search", &query);
        self.get_json(url, "search").await
    }

    /// Fetches per-country post counts and average sentiment.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::search`].
    pub async fn geo(&self, params: &SearchParams) -> Result<GeoResult, ApiError> {
        let hours = params.hours.to_string();
        let mut query = vec![("q", params.query.as_str()), ("hours", hours.as_str())];
        if params.use_sample {
            query.push(("use_sample", "true"));
        }
        let url = self.build_url("api/geo", &query);
        self.get_json(url, "geo").await
    }

    /// Asks the backend for an LLM summary of recent posts.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::search`]; [`ApiError::detail`] carries the
    /// backend's explanation on a failed status.
    pub async fn insights(&self, query: &str, hours: u32) -> Result<InsightsResult, ApiError> {
        let hours = hours.to_string();
        let url = self.build_url("api/insights", &[("q", query), ("hours", hours.as_str())]);
        self.get_json(url, "insights").await
    }

    /// Sends one chat turn about `keyword`'s results.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::search`].
    pub async fn chat(
        &self,
        keyword: &str,
        hours: u32,
        request: &ChatRequest,
    ) -> Result<ChatReply, ApiError> {
        let hours = hours.to_string();
        let url = self.build_url("api/chat", &[("q", keyword), ("hours", hours.as_str())]);
        tracing::debug!(
            %url,
            history = request.history.len(),
            "sending chat message"
        );
        let builder = self.client.post(url.clone()).json(request);
        self.send_json(builder, &url, "chat").await
    }

    /// Returns `true` when the backend answers its health probe with `ok`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::search`].
    pub async fn health(&self) -> Result<bool, ApiError> {
        let url = self.build_url("api/health", &[]);
        let body: HealthBody = self.get_json(url, "health").await?;
        Ok(body.ok)
    }

    /// Builds an endpoint URL with percent-encoded query parameters.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{path}", self.base_url.path()));
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, endpoint: &str) -> Result<T, ApiError> {
        tracing::debug!(endpoint, %url, "GET");
        let builder = self.client.get(url.clone());
        self.send_json(builder, &url, endpoint).await
    }

    /// Sends the request, maps non-2xx statuses to [`ApiError::Status`], and
    /// parses the body as `T`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        url: &Url,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = extract_detail(&body);
            tracing::debug!(endpoint, status = status.as_u16(), ?detail, "backend error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: format!("{endpoint} ({url})"),
            source: e,
        })
    }
}

/// Pull a human-readable `detail` out of an error body.
///
/// FastAPI-style bodies carry either a string or a list of validation
/// errors; the latter is flattened to its `msg` fields.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
