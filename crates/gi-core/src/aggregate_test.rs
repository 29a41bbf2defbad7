use chrono::{FixedOffset, TimeZone, Utc};

use super::*;

fn post(label: &str, score: f64, cc: Option<&str>, h: u32, m: u32) -> Post {
    Post {
        id: None,
        source: "youtube".to_string(),
        author: None,
        text: format!("{label} post"),
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, h, m, 0).unwrap(),
        sentiment_label: label.to_string(),
        sentiment_score: score,
        country_code: cc.map(str::to_string),
    }
}

fn sample_posts() -> Vec<Post> {
    vec![
        post("positive", 0.8, Some("US"), 10, 5),
        post("negative", -0.5, Some("de"), 10, 40),
        post("neutral", 0.1, None, 11, 10),
    ]
}

#[test]
fn counts_one_of_each() {
    let counts = count_sentiment(&sample_posts());
    assert_eq!(
        counts,
        SentimentCounts {
            pos: 1,
            neu: 1,
            neg: 1
        }
    );
}

#[test]
fn counts_sum_to_list_length() {
    let labels = ["pos", "positive", "negative", "neg", "", "mixed", "Positive", "neutral"];
    let posts: Vec<Post> = labels
        .iter()
        .map(|l| post(l, 0.0, None, 9, 0))
        .collect();
    let counts = count_sentiment(&posts);
    assert_eq!(counts.total(), posts.len());
    assert_eq!(counts.pos, 2);
    assert_eq!(counts.neg, 2);
}

#[test]
fn unprefixed_labels_are_neutral() {
    for label in ["", "mixed", "Positive", "NEG", "n/a", " positive"] {
        assert_eq!(
            SentimentBucket::of_label(label),
            SentimentBucket::Neutral,
            "label {label:?} should be neutral"
        );
    }
}

#[test]
fn percent_rounds_and_handles_empty() {
    let counts = SentimentCounts {
        pos: 1,
        neu: 1,
        neg: 1,
    };
    assert_eq!(counts.percent(SentimentBucket::Positive), 33);
    let counts = SentimentCounts {
        pos: 2,
        neu: 1,
        neg: 0,
    };
    assert_eq!(counts.percent(SentimentBucket::Positive), 67);
    assert_eq!(SentimentCounts::default().percent(SentimentBucket::Neutral), 0);
}

#[test]
fn hourly_series_averages_per_bucket() {
    let posts = sample_posts();
    let series = time_series_in(&posts, BucketWidth::Hour, &Utc);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].t, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    assert_eq!(series[0].n, 2);
    assert!((series[0].avg - 0.15).abs() < 1e-9);
    assert_eq!(series[1].t, Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap());
    assert!((series[1].avg - 0.1).abs() < 1e-9);
}

#[test]
fn half_hour_series_splits_the_hour() {
    let posts = sample_posts();
    let series = time_series_in(&posts, BucketWidth::HalfHour, &Utc);
    let starts: Vec<_> = series.iter().map(|p| p.t).collect();
    assert_eq!(
        starts,
        vec![
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap(),
        ]
    );
}

#[test]
fn bucket_start_drops_seconds_and_subseconds() {
    let mut late = post("positive", 0.4, None, 10, 5);
    late.created_at += Duration::seconds(42) + Duration::milliseconds(750);
    let series = time_series_in(&[late], BucketWidth::HalfHour, &Utc);
    assert_eq!(series[0].t, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
}

#[test]
fn series_is_strictly_chronological_regardless_of_input_order() {
    let mut posts = sample_posts();
    posts.reverse();
    posts.push(post("positive", 1.0, None, 2, 0));
    posts.push(post("negative", -1.0, None, 23, 59));
    let series = time_series_in(&posts, BucketWidth::Hour, &Utc);
    assert!(series.windows(2).all(|w| w[0].t < w[1].t));
}

#[test]
fn buckets_follow_local_wall_clock() {
    // 10:45 UTC is 16:15 at +05:30, so the local hour bucket starts at 10:30 UTC.
    let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
    let posts = vec![post("positive", 0.5, None, 10, 45)];
    let series = time_series_in(&posts, BucketWidth::Hour, &ist);
    assert_eq!(series[0].t, Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap());
}

#[test]
fn empty_posts_give_empty_series() {
    let posts: Vec<Post> = Vec::new();
    assert!(time_series_in(&posts, BucketWidth::Hour, &Utc).is_empty());
}

#[test]
fn filter_matches_country_case_insensitively() {
    let posts = sample_posts();
    let de = filter_by_country(&posts, Some("DE"));
    assert_eq!(de.len(), 1);
    assert_eq!(de[0].sentiment_label, "negative");

    let us = filter_by_country(&posts, Some("us"));
    assert_eq!(us.len(), 1);

    assert_eq!(filter_by_country(&posts, None).len(), posts.len());
    assert!(filter_by_country(&posts, Some("FR")).is_empty());
}

#[test]
fn filtered_counts_never_exceed_unfiltered() {
    let posts = sample_posts();
    let all = count_sentiment(&posts);
    for cc in ["US", "DE", "FR"] {
        let filtered = count_sentiment(filter_by_country(&posts, Some(cc)));
        assert!(filtered.pos <= all.pos);
        assert!(filtered.neu <= all.neu);
        assert!(filtered.neg <= all.neg);
    }
}

#[test]
fn selecting_same_country_twice_clears() {
    let mut selection = CountrySelection::default();
    selection.toggle("de");
    assert_eq!(selection.get(), Some("DE"));
    assert!(selection.is_selected("de"));
    selection.toggle("DE");
    assert_eq!(selection.get(), None);
}

#[test]
fn selecting_other_country_switches() {
    let mut selection = CountrySelection::default();
    selection.toggle("US");
    selection.toggle("GB");
    assert_eq!(selection.get(), Some("GB"));
    selection.toggle("  ");
    assert_eq!(selection.get(), None);
}

#[test]
fn top_countries_sorted_by_count_and_truncated() {
    let countries: Vec<CountryAggregate> = (0..12u64)
        .map(|i| CountryAggregate {
            cc: format!("C{i}"),
            n: i % 5,
            avg: 0.0,
        })
        .collect();
    let top = top_countries(&countries, 10);
    assert_eq!(top.len(), 10);
    assert!(top.windows(2).all(|w| w[0].n >= w[1].n));
    // Stable: the first country with n == 4 in input order comes first.
    assert_eq!(top[0].cc, "C4");
    assert_eq!(top[1].cc, "C9");
}

#[test]
fn bucket_width_parses_names() {
    assert_eq!("hour".parse::<BucketWidth>().unwrap(), BucketWidth::Hour);
    assert_eq!("half-hour".parse::<BucketWidth>().unwrap(), BucketWidth::HalfHour);
    assert!("day".parse::<BucketWidth>().is_err());
}
