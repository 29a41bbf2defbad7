use chrono::{TimeZone, Utc};

use super::*;

fn post(label: &str, score: f64, cc: Option<&str>, hour: u32) -> Post {
    Post {
        id: None,
        source: "news".to_string(),
        author: None,
        text: "text".to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 5, 2, hour, 12, 0).unwrap(),
        sentiment_label: label.to_string(),
        sentiment_score: score,
        country_code: cc.map(str::to_string),
    }
}

fn search_result(keyword: &str, posts: Vec<Post>) -> SearchResult {
    SearchResult {
        keyword: keyword.to_string(),
        count: Some(posts.len()),
        posts,
        engine_used: Some("vader".to_string()),
    }
}

fn geo_result(keyword: &str) -> GeoResult {
    GeoResult {
        keyword: keyword.to_string(),
        hours: 168,
        countries: vec![
            CountryAggregate {
                cc: "US".to_string(),
                n: 2,
                avg: 0.3,
            },
            CountryAggregate {
                cc: "DE".to_string(),
                n: 1,
                avg: -0.5,
            },
        ],
    }
}

fn loaded_dashboard() -> Dashboard {
    let mut dash = Dashboard::new(Engine::Auto, TimeWindow(168), BucketWidth::Hour);
    dash.begin_search("electric cars", false).unwrap();
    let posts = vec![
        post("positive", 0.8, Some("US"), 9),
        post("neutral", 0.0, Some("us"), 9),
        post("negative", -0.5, Some("DE"), 11),
    ];
    dash.finish_search(search_result("electric cars", posts), geo_result("electric cars"));
    dash
}

#[test]
fn blank_query_does_not_start_a_search() {
    let mut dash = Dashboard::default();
    assert!(dash.begin_search("   ", false).is_none());
    assert!(!dash.is_loading());
}

#[test]
fn blank_sample_search_uses_default_query() {
    let mut dash = Dashboard::default();
    let params = dash.begin_search("", true).unwrap();
    assert_eq!(params.query, SAMPLE_QUERY);
    assert!(params.use_sample);
    assert_eq!(params.hours, 168);
    assert_eq!(params.engine, Engine::Auto);
}

#[test]
fn second_search_is_refused_while_loading() {
    let mut dash = Dashboard::default();
    dash.begin_search("ev", false).unwrap();
    assert!(dash.begin_search("ev", false).is_none());
}

#[test]
fn begin_search_clears_insights_and_errors() {
    let mut dash = loaded_dashboard();
    dash.finish_insights(Err("boom".to_string()));
    assert_eq!(dash.insights_error(), Some("boom"));

    dash.begin_search("ev", false).unwrap();
    assert!(dash.insights_error().is_none());
    assert!(dash.insights().is_none());
    assert!(dash.is_loading());
}

#[test]
fn finish_search_requests_insights_only_with_posts() {
    let mut dash = Dashboard::default();
    dash.begin_search("nothing here", false).unwrap();
    let next = dash.finish_search(search_result("nothing here", Vec::new()), geo_result("x"));
    assert!(next.is_none());
    assert!(!dash.insights_loading());

    let mut dash = Dashboard::default();
    dash.begin_search("  ev  ", false).unwrap();
    let next = dash
        .finish_search(search_result("ev", vec![post("positive", 0.5, None, 1)]), geo_result("ev"))
        .unwrap();
    assert_eq!(next.query, "ev");
    assert_eq!(next.hours, 168);
    assert!(dash.insights_loading());
}

#[test]
fn cancelled_insights_leave_no_error() {
    let mut dash = loaded_dashboard();
    assert!(dash.insights_loading());
    dash.cancel_insights();
    assert!(!dash.insights_loading());
    assert!(dash.insights_error().is_none());
}

#[test]
fn finish_search_clears_country_filter() {
    let mut dash = loaded_dashboard();
    dash.toggle_country("DE");
    dash.begin_search("electric cars", false).unwrap();
    dash.finish_search(
        search_result("electric cars", vec![post("positive", 0.1, None, 2)]),
        geo_result("electric cars"),
    );
    assert!(dash.selected_country().is_none());
}

#[test]
fn failed_search_keeps_previous_results() {
    let mut dash = loaded_dashboard();
    dash.begin_search("ev", false).unwrap();
    dash.fail_search("Could not reach backend");
    assert!(!dash.is_loading());
    assert_eq!(dash.error(), Some("Could not reach backend"));
    assert_eq!(dash.filtered_posts().len(), 3);
}

#[test]
fn insights_failure_clears_previous_insights() {
    let mut dash = loaded_dashboard();
    dash.finish_insights(Ok(InsightsResult {
        summary: "mostly positive".to_string(),
        themes: vec!["range".to_string()],
        aspects: crate::types::Aspects::default(),
        quotes: Vec::new(),
    }));
    assert!(dash.insights().is_some());
    dash.finish_insights(Err("Failed to generate insights".to_string()));
    assert!(dash.insights().is_none());
    assert!(!dash.insights_loading());
}

#[test]
fn country_filter_restricts_aggregates() {
    let mut dash = loaded_dashboard();
    let all = dash.counts();
    assert_eq!(all.total(), 3);

    dash.toggle_country("us");
    let us = dash.counts();
    assert_eq!(us.pos, 1);
    assert_eq!(us.neu, 1);
    assert_eq!(us.neg, 0);
    assert_eq!(dash.series_in(&Utc).len(), 1);

    dash.toggle_country("US");
    assert_eq!(dash.counts(), all);
    assert_eq!(dash.series_in(&Utc).len(), 2);
}

#[test]
fn status_line_reports_engine_window_and_filter() {
    let mut dash = loaded_dashboard();
    assert_eq!(
        dash.status_line().unwrap(),
        "Engine: vader \u{2022} Window: last 168h \u{2022} Returned: 3 posts"
    );
    dash.toggle_country("de");
    assert!(dash.status_line().unwrap().ends_with("\u{2022} Filter: DE"));
    assert!(Dashboard::default().status_line().is_none());
}

#[test]
fn chat_resets_when_keyword_changes() {
    let mut dash = loaded_dashboard();
    dash.chat_mut().begin("what's up?").unwrap();
    dash.chat_mut().complete(Some("not much".to_string()));

    dash.begin_search("electric cars", true).unwrap();
    dash.finish_search(search_result("electric cars", Vec::new()), geo_result("electric cars"));
    assert_eq!(dash.chat().messages().len(), 2);

    dash.begin_search("heat pumps", false).unwrap();
    dash.finish_search(search_result("heat pumps", Vec::new()), geo_result("heat pumps"));
    assert!(dash.chat().messages().is_empty());
}

#[test]
fn chat_context_uses_backend_keyword() {
    let dash = loaded_dashboard();
    let ctx = dash.chat_context().unwrap();
    assert_eq!(ctx.query, "electric cars");
    assert_eq!(ctx.hours, 168);
    assert!(Dashboard::default().chat_context().is_none());
}

#[test]
fn top_countries_come_from_geo() {
    let dash = loaded_dashboard();
    let top = dash.top_countries();
    assert_eq!(top[0].cc, "US");
    assert_eq!(top.len(), 2);
}
