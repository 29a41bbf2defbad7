//! Root dashboard state and the views derived from it.
//!
//! `Dashboard` holds every piece of client state: the controls, the latest
//! backend responses, loading/error flags, the country filter and the chat
//! transcript. Fetching is the caller's job; it asks for parameters with the
//! `begin_*` methods and hands results back with the `finish_*` methods.
//! Derived views are recomputed on every call.

use std::fmt::Write as _;

use chrono::TimeZone;

use crate::aggregate::{
    count_sentiment, filter_by_country, time_series, time_series_in, top_countries, BucketWidth,
    CountrySelection, SentimentCounts, TimePoint,
};
use crate::chat::ChatTranscript;
use crate::types::{
    CountryAggregate, Engine, GeoResult, InsightsResult, Post, SearchParams, SearchResult,
    TimeWindow,
};

/// Query used by "use sample" when the search box is blank.
pub const SAMPLE_QUERY: &str = "electric cars";

/// Countries shown in the top-countries chart.
pub const TOP_COUNTRIES: usize = 10;

/// Parameters for the follow-up insights request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsParams {
    pub query: String,
    pub hours: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub query: String,
    pub window: TimeWindow,
    pub engine: Engine,
    pub bucket: BucketWidth,

    search: Option<SearchResult>,
    geo: Option<GeoResult>,
    loading: bool,
    error: Option<String>,

    insights: Option<InsightsResult>,
    insights_loading: bool,
    insights_error: Option<String>,

    selection: CountrySelection,
    chat: ChatTranscript,
}

impl Dashboard {
    #[must_use]
    pub fn new(engine: Engine, window: TimeWindow, bucket: BucketWidth) -> Self {
        Self {
            engine,
            window,
            bucket,
            ..Self::default()
        }
    }

    /// Start a search. Returns `None` for a blank query or while a search is
    /// already in flight.
    ///
    /// A sample search falls back to [`SAMPLE_QUERY`] when `query` is blank.
    /// Starting a search drops the previous insights and any errors.
    pub fn begin_search(&mut self, query: &str, use_sample: bool) -> Option<SearchParams> {
        if self.loading {
            return None;
        }
        let query = match query.trim() {
            "" if use_sample => SAMPLE_QUERY,
            "" => return None,
            q => q,
        };

        self.query = query.to_string();
        self.loading = true;
        self.error = None;
        self.insights = None;
        self.insights_error = None;

        Some(SearchParams {
            query: self.query.clone(),
            hours: self.window.hours(),
            engine: self.engine,
            use_sample,
        })
    }

    /// Store the search and geo responses and clear the country filter.
    ///
    /// Returns insights parameters when the search produced posts; the caller
    /// should then fetch insights and report back via [`Self::finish_insights`].
    pub fn finish_search(&mut self, search: SearchResult, geo: GeoResult) -> Option<InsightsParams> {
        let keyword_changed = self
            .search
            .as_ref()
            .is_none_or(|prev| prev.keyword != search.keyword);
        if keyword_changed {
            self.chat.reset();
        }

        let has_posts = search.total() > 0;
        self.search = Some(search);
        self.geo = Some(geo);
        self.selection.clear();
        self.loading = false;

        if has_posts {
            self.insights_loading = true;
            self.insights_error = None;
            Some(InsightsParams {
                query: self.query.clone(),
                hours: self.window.hours(),
            })
        } else {
            self.insights = None;
            None
        }
    }

    /// Record a failed search. Previous results stay on screen.
    pub fn fail_search(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.loading = false;
    }

    pub fn finish_insights(&mut self, result: Result<InsightsResult, String>) {
        match result {
            Ok(insights) => {
                self.insights = Some(insights);
                self.insights_error = None;
            }
            Err(message) => {
                self.insights = None;
                self.insights_error = Some(message);
            }
        }
        self.insights_loading = false;
    }

    /// Drop a pending insights request without recording an error.
    pub fn cancel_insights(&mut self) {
        self.insights_loading = false;
    }

    /// Map click: select a country, or clear the filter if it is already selected.
    pub fn toggle_country(&mut self, cc: &str) {
        self.selection.toggle(cc);
    }

    pub fn clear_country(&mut self) {
        self.selection.clear();
    }

    #[must_use]
    pub fn selection(&self) -> &CountrySelection {
        &self.selection
    }

    #[must_use]
    pub fn selected_country(&self) -> Option<&str> {
        self.selection.get()
    }

    #[must_use]
    pub fn search(&self) -> Option<&SearchResult> {
        self.search.as_ref()
    }

    #[must_use]
    pub fn geo(&self) -> Option<&GeoResult> {
        self.geo.as_ref()
    }

    #[must_use]
    pub fn countries(&self) -> &[CountryAggregate] {
        self.geo.as_ref().map_or(&[], |g| g.countries.as_slice())
    }

    #[must_use]
    pub fn insights(&self) -> Option<&InsightsResult> {
        self.insights.as_ref()
    }

    #[must_use]
    pub fn insights_loading(&self) -> bool {
        self.insights_loading
    }

    #[must_use]
    pub fn insights_error(&self) -> Option<&str> {
        self.insights_error.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn chat(&self) -> &ChatTranscript {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatTranscript {
        &mut self.chat
    }

    /// Keyword and window the chat endpoint should answer about.
    #[must_use]
    pub fn chat_context(&self) -> Option<InsightsParams> {
        self.search.as_ref().map(|s| InsightsParams {
            query: s.keyword.clone(),
            hours: self.window.hours(),
        })
    }

    /// Posts after the country filter.
    #[must_use]
    pub fn filtered_posts(&self) -> Vec<&Post> {
        match &self.search {
            Some(search) => filter_by_country(&search.posts, self.selection.get()),
            None => Vec::new(),
        }
    }

    #[must_use]
    pub fn counts(&self) -> SentimentCounts {
        count_sentiment(self.filtered_posts())
    }

    /// Time series in the local timezone.
    #[must_use]
    pub fn series(&self) -> Vec<TimePoint> {
        time_series(self.filtered_posts(), self.bucket)
    }

    #[must_use]
    pub fn series_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<TimePoint> {
        time_series_in(self.filtered_posts(), self.bucket, tz)
    }

    #[must_use]
    pub fn top_countries(&self) -> Vec<&CountryAggregate> {
        top_countries(self.countries(), TOP_COUNTRIES)
    }

    /// One-line summary under the controls; `None` before the first search.
    #[must_use]
    pub fn status_line(&self) -> Option<String> {
        let search = self.search.as_ref()?;
        let engine = search
            .engine_used
            .clone()
            .unwrap_or_else(|| self.engine.to_string());
        let mut line = format!(
            "Engine: {engine} \u{2022} Window: last {}h \u{2022} Returned: {} posts",
            self.window.hours(),
            search.total()
        );
        if let Some(cc) = self.selection.get() {
            let _ = write!(line, " \u{2022} Filter: {cc}");
        }
        Some(line)
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
