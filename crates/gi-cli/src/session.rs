//! Fetch orchestration and the interactive dashboard loop.
//!
//! A search fetches `/api/search` and `/api/geo` together and only updates
//! the dashboard when both succeed. Insights follow as a separate request
//! once the primary view has been printed. Commands run one at a time, so a
//! response can never land on top of a newer one.

use std::io::Write;
use std::ops::ControlFlow;
use std::str::FromStr;

use futures::future::try_join;
use gi_client::{ApiClient, ApiError};
use gi_core::{Dashboard, Engine, InsightsParams, SearchParams, TimeWindow};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::render::Renderer;

pub(crate) const INSIGHTS_FALLBACK: &str = "Failed to generate insights";
pub(crate) const CHAT_FALLBACK: &str = "Chat failed.";

const HELP: &str = "\
Commands:
  search <query>    search a topic
  sample [query]    search the backend's sample data (default: electric cars)
  window <hours>    set the window, e.g. 24, 72h, 7d
  engine <name>     auto, vader or gemini
  country <CC>      filter by country; repeat to clear
  clear             clear the country filter
  ask <question>    ask about the current results
  show              redraw the dashboard
  help              this text
  quit              leave";

/// Message shown when search or geo fails.
pub(crate) fn unreachable_message(base_url: &str) -> String {
    format!("Could not reach backend at {base_url}. Is it running?")
}

/// The backend's `detail` when it answered with one, otherwise
/// [`unreachable_message`].
pub(crate) fn search_error_message(err: &ApiError, base_url: &str) -> String {
    err.detail()
        .map_or_else(|| unreachable_message(base_url), str::to_string)
}

/// The backend's `detail`, or the generic insights failure text.
pub(crate) fn insights_error_message(err: &ApiError) -> String {
    err.detail()
        .map_or_else(|| INSIGHTS_FALLBACK.to_string(), str::to_string)
}

/// Fetch search and geo for a search already started with
/// [`Dashboard::begin_search`], and store the outcome.
///
/// Returns the follow-up insights request when the search found posts.
pub(crate) async fn fetch_search(
    client: &ApiClient,
    dash: &mut Dashboard,
    params: &SearchParams,
) -> Option<InsightsParams> {
    match try_join(client.search(params), client.geo(params)).await {
        Ok((search, geo)) => {
            tracing::info!(
                keyword = %search.keyword,
                posts = search.total(),
                countries = geo.countries.len(),
                "search complete"
            );
            dash.finish_search(search, geo)
        }
        Err(e) => {
            tracing::warn!(query = %params.query, error = %e, "search failed");
            dash.fail_search(search_error_message(&e, client.base_url()));
            None
        }
    }
}

pub(crate) async fn fetch_insights(
    client: &ApiClient,
    dash: &mut Dashboard,
    params: &InsightsParams,
) {
    let result = client
        .insights(&params.query, params.hours)
        .await
        .map_err(|e| {
            tracing::warn!(query = %params.query, error = %e, "insights failed");
            insights_error_message(&e)
        });
    dash.finish_insights(result);
}

/// Send one chat turn about the current results.
///
/// Returns `false` without a request when there are no results yet or the
/// message is blank.
pub(crate) async fn ask(client: &ApiClient, dash: &mut Dashboard, message: &str) -> bool {
    let Some(ctx) = dash.chat_context() else {
        return false;
    };
    let Some(request) = dash.chat_mut().begin(message) else {
        return false;
    };
    match client.chat(&ctx.query, ctx.hours, &request).await {
        Ok(reply) => dash.chat_mut().complete(reply.reply),
        Err(e) => {
            tracing::warn!(keyword = %ctx.query, error = %e, "chat failed");
            let message = e
                .detail()
                .map_or_else(|| CHAT_FALLBACK.to_string(), str::to_string);
            dash.chat_mut().fail(message);
        }
    }
    true
}

/// One line of input to the interactive dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Search(String),
    Sample(String),
    Window(TimeWindow),
    Engine(Engine),
    Country(String),
    Clear,
    Ask(String),
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(h, r)| (h, r.trim()));
        let need = |usage: &str| -> Result<String, String> {
            if rest.is_empty() {
                Err(format!("usage: {usage}"))
            } else {
                Ok(rest.to_string())
            }
        };

        match head.to_lowercase().as_str() {
            "search" | "s" => Ok(Command::Search(rest.to_string())),
            "sample" => Ok(Command::Sample(rest.to_string())),
            "window" | "hours" => need("window <hours>")?.parse().map(Command::Window),
            "engine" => need("engine <auto|vader|gemini>")?.parse().map(Command::Engine),
            "country" | "cc" => need("country <CC>").map(Command::Country),
            "clear" => Ok(Command::Clear),
            "ask" => Ok(Command::Ask(rest.to_string())),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}'; type `help`")),
        }
    }
}

/// Options for a search beyond the query itself.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchOptions<'a> {
    pub use_sample: bool,
    pub country: Option<&'a str>,
    pub skip_insights: bool,
}

/// Client, dashboard state and renderer for one run of the binary.
pub(crate) struct Session {
    client: ApiClient,
    dash: Dashboard,
    renderer: Renderer,
}

impl Session {
    pub(crate) fn new(client: ApiClient, dash: Dashboard, renderer: Renderer) -> Self {
        Self {
            client,
            dash,
            renderer,
        }
    }

    pub(crate) fn dashboard(&self) -> &Dashboard {
        &self.dash
    }

    /// Run a search, print the dashboard, then fetch and print insights.
    ///
    /// Returns `Ok(false)` when nothing was fetched (blank query) or the
    /// backend could not be reached; the dashboard already says why.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `out` fails.
    pub(crate) async fn search<W: Write>(
        &mut self,
        query: &str,
        opts: &SearchOptions<'_>,
        out: &mut W,
    ) -> anyhow::Result<bool> {
        let Some(params) = self.dash.begin_search(query, opts.use_sample) else {
            writeln!(out, "Enter a search term, or use `sample`.")?;
            return Ok(false);
        };

        let mut next = fetch_search(&self.client, &mut self.dash, &params).await;
        let reached = self.dash.error().is_none();
        if let (true, Some(cc)) = (reached, opts.country) {
            self.dash.toggle_country(cc);
        }
        if opts.skip_insights && next.take().is_some() {
            self.dash.cancel_insights();
        }
        write!(out, "{}", self.renderer.dashboard(&self.dash))?;
        out.flush()?;

        if let Some(next) = next {
            fetch_insights(&self.client, &mut self.dash, &next).await;
            write!(
                out,
                "{}",
                self.renderer
                    .insights(self.dash.insights(), false, self.dash.insights_error())
            )?;
        }
        Ok(reached)
    }

    /// Apply one command, writing whatever it produces to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `out` fails.
    pub(crate) async fn execute<W: Write>(
        &mut self,
        command: Command,
        out: &mut W,
    ) -> anyhow::Result<ControlFlow<()>> {
        match command {
            Command::Search(query) => {
                self.search(&query, &SearchOptions::default(), out).await?;
            }
            Command::Sample(query) => {
                let opts = SearchOptions {
                    use_sample: true,
                    ..SearchOptions::default()
                };
                self.search(&query, &opts, out).await?;
            }
            Command::Window(window) => {
                self.dash.window = window;
                writeln!(out, "Window: {} (applies to the next search)", window.label())?;
            }
            Command::Engine(engine) => {
                self.dash.engine = engine;
                writeln!(out, "Engine: {engine} (applies to the next search)")?;
            }
            Command::Country(cc) => {
                self.dash.toggle_country(&cc);
                write!(out, "{}", self.renderer.dashboard(&self.dash))?;
            }
            Command::Clear => {
                self.dash.clear_country();
                write!(out, "{}", self.renderer.dashboard(&self.dash))?;
            }
            Command::Ask(message) => {
                if self.dash.search().is_none() {
                    writeln!(out, "Run a search first.")?;
                } else if ask(&self.client, &mut self.dash, &message).await {
                    write!(out, "{}", self.renderer.chat(self.dash.chat()))?;
                } else {
                    writeln!(out, "Type a question after `ask`.")?;
                }
            }
            Command::Show => write!(out, "{}", self.renderer.dashboard(&self.dash))?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(ControlFlow::Break(())),
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Read commands from `input` until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading `input` or writing `out` fails.
    pub(crate) async fn run<R, W>(&mut self, input: R, out: &mut W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        loop {
            write!(out, "gi> ")?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    tracing::debug!(?command, "dashboard command");
                    if self.execute(command, out).await?.is_break() {
                        break;
                    }
                }
                Err(message) => writeln!(out, "{message}")?,
            }
        }
        Ok(())
    }

    /// Initial frame for the interactive dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub(crate) fn greet<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        write!(out, "{}", self.renderer.dashboard(&self.dash))?;
        writeln!(out, "{HELP}")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
