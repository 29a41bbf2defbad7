//! Text panels for the terminal dashboard.
//!
//! Every panel writes into a `String` so callers can print the whole frame
//! at once and tests can inspect it without touching stdout.

mod map;

use std::fmt::Write as _;

use chrono::Local;
use gi_core::colors::{
    ANSI_RESET, DONUT_NEGATIVE, DONUT_NEUTRAL, DONUT_POSITIVE, LEGEND_NEGATIVE, LEGEND_NEUTRAL,
    LEGEND_POSITIVE,
};
use gi_core::geo::WorldBoundaries;
use gi_core::{
    rgb_for_avg, ChatRole, ChatTranscript, CountryAggregate, CountrySelection, Dashboard,
    InsightsResult, Post, Rgb, SentimentBucket, SentimentCounts, TimePoint,
};

pub(crate) use map::MapView;

const DONUT_WIDTH: usize = 40;
const BAR_WIDTH: usize = 30;
const MAX_QUOTES: usize = 5;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const CHAT_HINT: &str = "Ask things like: \u{201c}Why is sentiment higher in DE than US?\u{201d} \
                         or \u{201c}Summarize key concerns by country.\u{201d}";

#[derive(Debug, Clone)]
pub(crate) struct Renderer {
    color: bool,
    map: MapView,
    post_limit: usize,
}

impl Renderer {
    pub(crate) fn new(color: bool, map: MapView, post_limit: usize) -> Self {
        Self {
            color,
            map,
            post_limit,
        }
    }

    /// Bubble map, no color. Used by tests and as a fallback.
    #[cfg(test)]
    pub(crate) fn plain() -> Self {
        Self::new(false, MapView::Bubble, 20)
    }

    pub(crate) fn with_world(world: WorldBoundaries, color: bool, post_limit: usize) -> Self {
        Self::new(color, MapView::Choropleth(world), post_limit)
    }

    fn paint(&self, rgb: Rgb, text: &str) -> String {
        if self.color {
            format!("{}{text}{ANSI_RESET}", rgb.ansi_fg())
        } else {
            text.to_string()
        }
    }

    fn bucket_color(bucket: SentimentBucket) -> Rgb {
        match bucket {
            SentimentBucket::Positive => LEGEND_POSITIVE,
            SentimentBucket::Neutral => DONUT_NEUTRAL,
            SentimentBucket::Negative => LEGEND_NEGATIVE,
        }
    }

    /// The full dashboard frame: everything from the header down to the posts.
    pub(crate) fn dashboard(&self, dash: &Dashboard) -> String {
        let mut out = String::new();
        // Writes into a String are infallible.
        let _ = self.write_dashboard(&mut out, dash);
        out
    }

    fn write_dashboard(&self, out: &mut String, dash: &Dashboard) -> std::fmt::Result {
        Self::write_header(out)?;
        if dash.is_loading() {
            writeln!(out, "Searching\u{2026}")?;
        }
        if let Some(error) = dash.error() {
            writeln!(out, "{}", self.paint(LEGEND_NEGATIVE, error))?;
        }
        let Some(search) = dash.search() else {
            writeln!(out, "Search a topic to get started (e.g. electric cars).")?;
            return Ok(());
        };
        if let Some(status) = dash.status_line() {
            writeln!(out, "{status}")?;
        }
        writeln!(out)?;

        let posts = dash.filtered_posts();
        let counts = dash.counts();
        self.write_summary(out, &search.keyword, &counts, posts.len())?;
        self.write_donut(out, &counts)?;
        self.write_series(out, &dash.series())?;
        if !dash.countries().is_empty() {
            self.write_top_countries(out, &dash.top_countries())?;
        }
        self.write_map(out, dash.countries(), dash.selection())?;
        self.write_insights(
            out,
            dash.insights(),
            dash.insights_loading(),
            dash.insights_error(),
        )?;
        self.write_chat(out, dash.chat())?;
        if !posts.is_empty() {
            self.write_posts(out, &posts, dash.selected_country())?;
        }
        Ok(())
    }

    /// Top countries and map only, for `gi geo`.
    pub(crate) fn geo(&self, countries: &[CountryAggregate]) -> String {
        let mut out = String::new();
        let _ = self.write_geo(&mut out, countries);
        out
    }

    fn write_geo(&self, out: &mut String, countries: &[CountryAggregate]) -> std::fmt::Result {
        let top = gi_core::top_countries(countries, gi_core::dashboard::TOP_COUNTRIES);
        self.write_top_countries(out, &top)?;
        self.write_map(out, countries, &CountrySelection::default())
    }

    pub(crate) fn insights(
        &self,
        insights: Option<&InsightsResult>,
        loading: bool,
        error: Option<&str>,
    ) -> String {
        let mut out = String::new();
        let _ = self.write_insights(&mut out, insights, loading, error);
        out
    }

    pub(crate) fn chat(&self, chat: &ChatTranscript) -> String {
        let mut out = String::new();
        let _ = self.write_chat(&mut out, chat);
        out
    }

    fn write_header(out: &mut String) -> std::fmt::Result {
        writeln!(out, "GlobalInsights  Keyword \u{2192} Social Sentiment")?;
        writeln!(out, "{}", "=".repeat(60))
    }

    fn write_summary(
        &self,
        out: &mut String,
        keyword: &str,
        counts: &SentimentCounts,
        total: usize,
    ) -> std::fmt::Result {
        writeln!(out, "Keyword: {keyword} ({total} posts)")?;
        let cards: Vec<String> = [
            SentimentBucket::Positive,
            SentimentBucket::Neutral,
            SentimentBucket::Negative,
        ]
        .into_iter()
        .map(|b| {
            let text = format!("{} {}%", b.name(), counts.percent(b));
            self.paint(Self::bucket_color(b), &text)
        })
        .collect();
        writeln!(out, "{}", cards.join("   "))?;
        writeln!(out)
    }

    fn write_donut(&self, out: &mut String, counts: &SentimentCounts) -> std::fmt::Result {
        writeln!(out, "Sentiment mix")?;
        let total = counts.total();
        if total == 0 {
            writeln!(out, "  No posts.")?;
            return writeln!(out);
        }

        let slices = [
            (SentimentBucket::Positive, DONUT_POSITIVE),
            (SentimentBucket::Neutral, DONUT_NEUTRAL),
            (SentimentBucket::Negative, DONUT_NEGATIVE),
        ];
        // Rounding cumulative edges keeps the bar exactly full width and
        // empty slices at zero cells.
        let mut bar = String::new();
        let mut seen = 0;
        let mut edge = 0;
        for (bucket, rgb) in &slices {
            seen += counts.get(*bucket);
            let next = (seen * DONUT_WIDTH + total / 2) / total;
            bar.push_str(&self.paint(*rgb, &"█".repeat(next - edge)));
            edge = next;
        }
        writeln!(out, "  {bar}")?;

        let legend: Vec<String> = slices
            .iter()
            .map(|(bucket, rgb)| {
                format!(
                    "{} {} {}",
                    self.paint(*rgb, "■"),
                    bucket.name(),
                    counts.get(*bucket)
                )
            })
            .collect();
        writeln!(out, "  {}", legend.join("  "))?;
        writeln!(out)
    }

    fn write_series(&self, out: &mut String, points: &[TimePoint]) -> std::fmt::Result {
        writeln!(out, "Sentiment over time")?;
        if points.is_empty() {
            writeln!(out, "  No data.")?;
            return writeln!(out);
        }

        let spark: String = points
            .iter()
            .map(|p| self.paint(rgb_for_avg(p.avg), &spark_char(p.avg).to_string()))
            .collect();
        writeln!(out, "  {spark}")?;
        writeln!(out, "  {:<18}{:>8}{:>7}", "TIME", "AVG", "POSTS")?;
        for p in points {
            let local = p.t.with_timezone(&Local).format("%m-%d %H:%M");
            writeln!(out, "  {:<18}{:>8.2}{:>7}", local.to_string(), p.avg, p.n)?;
        }
        writeln!(out)
    }

    fn write_top_countries(
        &self,
        out: &mut String,
        countries: &[&CountryAggregate],
    ) -> std::fmt::Result {
        writeln!(out, "Top countries by posts")?;
        let Some(max) = countries.iter().map(|c| c.n).max().filter(|m| *m > 0) else {
            writeln!(out, "  No country data.")?;
            return writeln!(out);
        };
        for c in countries {
            let width = bar_width(c.n, max);
            // Pad by hand; escape codes would throw off `{:<N}`.
            writeln!(
                out,
                "  {:<4}{}{} {:>5}  avg {:+.2}",
                c.cc,
                self.paint(rgb_for_avg(c.avg), &"█".repeat(width)),
                " ".repeat(BAR_WIDTH - width),
                c.n,
                c.avg,
            )?;
        }
        writeln!(out)
    }

    fn write_map(
        &self,
        out: &mut String,
        countries: &[CountryAggregate],
        selection: &CountrySelection,
    ) -> std::fmt::Result {
        map::write_map(self, out, countries, selection)?;
        writeln!(
            out,
            "  {} Negative  {} Neutral  {} Positive",
            self.paint(LEGEND_NEGATIVE, "■"),
            self.paint(LEGEND_NEUTRAL, "■"),
            self.paint(LEGEND_POSITIVE, "■"),
        )?;
        writeln!(out)
    }

    fn write_insights(
        &self,
        out: &mut String,
        insights: Option<&InsightsResult>,
        loading: bool,
        error: Option<&str>,
    ) -> std::fmt::Result {
        if loading {
            writeln!(out, "Gemini Insights  (Generating\u{2026})")?;
        } else {
            writeln!(out, "Gemini Insights")?;
        }
        if let Some(error) = error {
            writeln!(out, "  {}", self.paint(LEGEND_NEGATIVE, error))?;
        }
        if let Some(insights) = insights {
            writeln!(out, "  {}", insights.summary)?;
            if !insights.themes.is_empty() {
                let tags: Vec<String> = insights.themes.iter().map(|t| format!("[{t}]")).collect();
                writeln!(out, "  {}", tags.join(" "))?;
            }
            let a = &insights.aspects;
            writeln!(
                out,
                "  Aspects: Price {:.2}, Quality {:.2}, Service {:.2}",
                a.price, a.quality, a.service
            )?;
            for quote in insights.quotes.iter().take(MAX_QUOTES) {
                writeln!(out, "  \u{2022} \u{201c}{}\u{201d} ({})", quote.text, quote.sentiment)?;
            }
        }
        writeln!(out)
    }

    fn write_chat(&self, out: &mut String, chat: &ChatTranscript) -> std::fmt::Result {
        writeln!(out, "Ask Gemini about these results")?;
        if chat.messages().is_empty() {
            writeln!(out, "  {CHAT_HINT}")?;
        }
        for msg in chat.messages() {
            match msg.role {
                ChatRole::User => writeln!(
                    out,
                    "  {} {}",
                    self.paint(Rgb::new(0x1e, 0x40, 0xaf), "You:"),
                    msg.content
                )?,
                ChatRole::Assistant => writeln!(out, "  Assistant: {}", msg.content)?,
            }
        }
        if chat.is_pending() {
            writeln!(out, "  Asking\u{2026}")?;
        }
        if let Some(error) = chat.error() {
            writeln!(out, "  {}", self.paint(LEGEND_NEGATIVE, error))?;
        }
        writeln!(out)
    }

    fn write_posts(
        &self,
        out: &mut String,
        posts: &[&Post],
        selected: Option<&str>,
    ) -> std::fmt::Result {
        match selected {
            Some(cc) => writeln!(out, "Recent posts for {cc}")?,
            None => writeln!(out, "Recent posts")?,
        }
        for post in posts.iter().take(self.post_limit) {
            let when = post.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
            match &post.country_code {
                Some(cc) => writeln!(out, "  {} \u{2022} {when} \u{2022} {cc}", post.source)?,
                None => writeln!(out, "  {} \u{2022} {when}", post.source)?,
            }
            writeln!(out, "  {}", post.text)?;
            let label = format!(
                "{} ({:.2})",
                post.sentiment_label.to_uppercase(),
                post.sentiment_score
            );
            let bucket = SentimentBucket::of_label(&post.sentiment_label);
            writeln!(out, "  {}", self.paint(Self::bucket_color(bucket), &label))?;
            writeln!(out)?;
        }
        if posts.len() > self.post_limit {
            writeln!(out, "  \u{2026} {} more", posts.len() - self.post_limit)?;
        }
        Ok(())
    }
}

/// Sparkline glyph for an average in `[-1, 1]`.
fn spark_char(avg: f64) -> char {
    let t = (avg.clamp(-1.0, 1.0) + 1.0) / 2.0;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let idx = (t * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
    SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
}

/// Bar length proportional to `n / max`, at least one cell for any posts.
fn bar_width(n: u64, max: u64) -> usize {
    if n == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let width = (n.saturating_mul(BAR_WIDTH as u64) / max) as usize;
    width.clamp(1, BAR_WIDTH)
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
