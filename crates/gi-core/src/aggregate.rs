//! Client-side rollups over a search's post list.
//!
//! Every function recomputes from the full list it is given; there is no
//! incremental state. Filtering by country happens before aggregation, so the
//! filtered and unfiltered views share the same code path.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, TimeZone, Timelike, Utc};

use crate::types::{CountryAggregate, Post};

/// Three-way sentiment class derived from a post's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBucket {
    Positive,
    Neutral,
    Negative,
}

impl SentimentBucket {
    /// Classify by label prefix: `pos*` is positive, `neg*` negative,
    /// anything else (including an empty label) neutral.
    #[must_use]
    pub fn of_label(label: &str) -> Self {
        if label.starts_with("pos") {
            SentimentBucket::Positive
        } else if label.starts_with("neg") {
            SentimentBucket::Negative
        } else {
            SentimentBucket::Neutral
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SentimentBucket::Positive => "Positive",
            SentimentBucket::Neutral => "Neutral",
            SentimentBucket::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentCounts {
    pub pos: usize,
    pub neu: usize,
    pub neg: usize,
}

impl SentimentCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.pos + self.neu + self.neg
    }

    #[must_use]
    pub fn get(&self, bucket: SentimentBucket) -> usize {
        match bucket {
            SentimentBucket::Positive => self.pos,
            SentimentBucket::Neutral => self.neu,
            SentimentBucket::Negative => self.neg,
        }
    }

    /// Whole-number share of the total for `bucket`; `0` when there are no posts.
    #[must_use]
    pub fn percent(&self, bucket: SentimentBucket) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let pct = ((self.get(bucket) as f64 * 100.0) / total as f64).round() as u32;
        pct
    }
}

/// Partition posts into positive/neutral/negative in one pass.
pub fn count_sentiment<'a, I>(posts: I) -> SentimentCounts
where
    I: IntoIterator<Item = &'a Post>,
{
    posts
        .into_iter()
        .fold(SentimentCounts::default(), |mut acc, post| {
            match SentimentBucket::of_label(&post.sentiment_label) {
                SentimentBucket::Positive => acc.pos += 1,
                SentimentBucket::Neutral => acc.neu += 1,
                SentimentBucket::Negative => acc.neg += 1,
            }
            acc
        })
}

/// Width of a time-series bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketWidth {
    #[default]
    Hour,
    HalfHour,
}

impl BucketWidth {
    #[must_use]
    pub fn minutes(self) -> u32 {
        match self {
            BucketWidth::Hour => 60,
            BucketWidth::HalfHour => 30,
        }
    }
}

impl std::str::FromStr for BucketWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "hour" | "60m" => Ok(BucketWidth::Hour),
            "half-hour" | "30m" => Ok(BucketWidth::HalfHour),
            other => Err(format!(
                "unknown bucket width '{other}' (expected hour or half-hour)"
            )),
        }
    }
}

impl std::fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketWidth::Hour => write!(f, "hour"),
            BucketWidth::HalfHour => write!(f, "half-hour"),
        }
    }
}

/// Mean sentiment of the posts that fall in one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    /// Bucket start.
    pub t: DateTime<Utc>,
    pub avg: f64,
    pub n: usize,
}

/// Truncate `ts` to the start of its bucket, as seen in timezone `tz`.
fn bucket_start<Tz: TimeZone>(ts: DateTime<Utc>, width: BucketWidth, tz: &Tz) -> DateTime<Utc> {
    let local = ts.with_timezone(tz);
    let minutes_in = local.minute() % width.minutes();
    let (sec, nano) = (local.second(), local.nanosecond());
    // Subtracting keeps the instant valid across DST gaps, unlike `with_minute`.
    let start = local
        - Duration::minutes(i64::from(minutes_in))
        - Duration::seconds(i64::from(sec))
        - Duration::nanoseconds(i64::from(nano));
    start.with_timezone(&Utc)
}

/// Bucket posts by local wall-clock time and average their scores.
pub fn time_series<'a, I>(posts: I, width: BucketWidth) -> Vec<TimePoint>
where
    I: IntoIterator<Item = &'a Post>,
{
    time_series_in(posts, width, &Local)
}

/// Bucket posts in timezone `tz` and average their scores.
///
/// Points come back in strictly increasing order of bucket start.
pub fn time_series_in<'a, I, Tz>(posts: I, width: BucketWidth, tz: &Tz) -> Vec<TimePoint>
where
    I: IntoIterator<Item = &'a Post>,
    Tz: TimeZone,
{
    let mut buckets: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
    for post in posts {
        let key = bucket_start(post.created_at, width, tz);
        let entry = buckets.entry(key).or_insert((0.0, 0));
        entry.0 += post.sentiment_score;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(t, (sum, n))| {
            #[allow(clippy::cast_precision_loss)]
            let avg = sum / n as f64;
            TimePoint { t, avg, n }
        })
        .collect()
}

/// Posts whose country matches `selected` (case-insensitive), or all posts
/// when nothing is selected.
#[must_use]
pub fn filter_by_country<'a>(posts: &'a [Post], selected: Option<&str>) -> Vec<&'a Post> {
    match selected {
        None => posts.iter().collect(),
        Some(cc) => posts
            .iter()
            .filter(|p| {
                p.country_code
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(cc))
            })
            .collect(),
    }
}

/// The dashboard's country cross-filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountrySelection(Option<String>);

impl CountrySelection {
    /// Select `cc`, or clear the filter when `cc` is already selected.
    ///
    /// Codes are stored uppercase. Blank input clears.
    pub fn toggle(&mut self, cc: &str) {
        let cc = cc.trim().to_uppercase();
        if cc.is_empty() || self.0.as_deref() == Some(cc.as_str()) {
            self.0 = None;
        } else {
            self.0 = Some(cc);
        }
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    #[must_use]
    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    #[must_use]
    pub fn is_selected(&self, cc: &str) -> bool {
        self.0
            .as_deref()
            .is_some_and(|selected| selected.eq_ignore_ascii_case(cc))
    }
}

/// Countries ordered by post count (descending), first `limit` kept.
///
/// Ties keep the backend's order.
#[must_use]
pub fn top_countries(countries: &[CountryAggregate], limit: usize) -> Vec<&CountryAggregate> {
    let mut sorted: Vec<&CountryAggregate> = countries.iter().collect();
    sorted.sort_by_key(|c| Reverse(c.n));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
