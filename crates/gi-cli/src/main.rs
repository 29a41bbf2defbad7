mod render;
mod session;

use std::io::{IsTerminal, Write};

use anyhow::Context;
use clap::{Parser, Subcommand};
use gi_client::ApiClient;
use gi_core::{AppConfig, BucketWidth, ChatTranscript, Dashboard, Engine, MapMode, TimeWindow};
use tracing_subscriber::EnvFilter;

use crate::render::{MapView, Renderer};
use crate::session::{SearchOptions, Session};

#[derive(Debug, Parser)]
#[command(name = "gi")]
#[command(about = "GlobalInsights: social sentiment for a keyword, in the terminal")]
struct Cli {
    /// Backend origin, e.g. `http://localhost:8000` (overrides `GI_API_BASE`)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Disable ANSI colors (also honored via `NO_COLOR`)
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search a topic and print the full dashboard
    Search {
        /// Topic to search; may be several words
        query: Vec<String>,

        /// Window in hours (24, 72h, 7d, ...)
        #[arg(long)]
        hours: Option<TimeWindow>,

        /// Sentiment engine: auto, vader or gemini
        #[arg(long)]
        engine: Option<Engine>,

        /// Use the backend's sample data (query defaults to "electric cars")
        #[arg(long)]
        sample: bool,

        /// Filter the dashboard to one country (ISO-2 code)
        #[arg(long)]
        country: Option<String>,

        /// Time-series bucket: hour or half-hour
        #[arg(long)]
        bucket: Option<BucketWidth>,

        /// Maximum posts to list
        #[arg(long)]
        limit: Option<usize>,

        /// Skip the Gemini insights request
        #[arg(long)]
        no_insights: bool,
    },
    /// Print per-country counts and the map for a topic
    Geo {
        query: Vec<String>,

        #[arg(long)]
        hours: Option<TimeWindow>,

        #[arg(long)]
        sample: bool,
    },
    /// Print Gemini insights for a topic
    Insights {
        query: Vec<String>,

        #[arg(long)]
        hours: Option<TimeWindow>,
    },
    /// Ask one question about a topic's results
    Chat {
        query: Vec<String>,

        /// The question to ask
        #[arg(long, short)]
        message: String,

        #[arg(long)]
        hours: Option<TimeWindow>,
    },
    /// Interactive dashboard reading commands from stdin
    Dashboard {
        /// Optional first search
        query: Vec<String>,
    },
    /// Check that the backend is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut config = gi_core::load_app_config()?;
    if let Some(api_base) = &cli.api_base {
        config.api_base.clone_from(api_base);
    }

    // stderr keeps log lines out of the rendered panels.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = ApiClient::new(
        &config.api_base,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let color = use_color(cli.no_color);
    let mut stdout = std::io::stdout();

    match cli.command {
        Some(Commands::Search {
            query,
            hours,
            engine,
            sample,
            country,
            bucket,
            limit,
            no_insights,
        }) => {
            let renderer = build_renderer(&config, color, limit)?;
            let dash = Dashboard::new(
                engine.unwrap_or(config.default_engine),
                hours.unwrap_or(TimeWindow(config.default_hours)),
                bucket.unwrap_or(config.time_bucket),
            );
            let mut session = Session::new(client, dash, renderer);
            let opts = SearchOptions {
                use_sample: sample,
                country: country.as_deref(),
                skip_insights: no_insights,
            };
            let reached = session.search(&query.join(" "), &opts, &mut stdout).await?;
            if !reached {
                anyhow::bail!(
                    "{}",
                    session
                        .dashboard()
                        .error()
                        .unwrap_or("nothing to search for")
                );
            }
        }
        Some(Commands::Geo {
            query,
            hours,
            sample,
        }) => {
            let renderer = build_renderer(&config, color, None)?;
            let mut dash = Dashboard::new(
                config.default_engine,
                hours.unwrap_or(TimeWindow(config.default_hours)),
                config.time_bucket,
            );
            let params = dash
                .begin_search(&query.join(" "), sample)
                .context("query must not be empty")?;
            let geo = client.geo(&params).await?;
            println!(
                "{}: {} countries, last {}h",
                geo.keyword,
                geo.countries.len(),
                geo.hours
            );
            print!("{}", renderer.geo(&geo.countries));
        }
        Some(Commands::Insights { query, hours }) => {
            let query = non_empty(&query)?;
            let hours = hours.unwrap_or(TimeWindow(config.default_hours)).hours();
            let renderer = build_renderer(&config, color, None)?;
            let insights = client.insights(&query, hours).await;
            let text = match &insights {
                Ok(result) => renderer.insights(Some(result), false, None),
                Err(e) => {
                    tracing::warn!(error = %e, "insights failed");
                    renderer.insights(None, false, Some(&session::insights_error_message(e)))
                }
            };
            print!("{text}");
            insights?;
        }
        Some(Commands::Chat {
            query,
            message,
            hours,
        }) => {
            let query = non_empty(&query)?;
            let hours = hours.unwrap_or(TimeWindow(config.default_hours)).hours();
            let renderer = build_renderer(&config, color, None)?;
            let mut chat = ChatTranscript::default();
            let request = chat
                .begin(&message)
                .context("message must not be empty")?;
            let reply = client.chat(&query, hours, &request).await?;
            chat.complete(reply.reply);
            print!("{}", renderer.chat(&chat));
        }
        Some(Commands::Dashboard { query }) => {
            run_dashboard(client, &config, color, &query.join(" ")).await?;
        }
        None => run_dashboard(client, &config, color, "").await?,
        Some(Commands::Health) => {
            let ok = client.health().await?;
            if !ok {
                anyhow::bail!("backend at {} reported not ok", client.base_url());
            }
            println!("backend at {} is healthy", client.base_url());
        }
    }

    stdout.flush()?;
    Ok(())
}

async fn run_dashboard(
    client: ApiClient,
    config: &AppConfig,
    color: bool,
    query: &str,
) -> anyhow::Result<()> {
    let renderer = build_renderer(config, color, None)?;
    let dash = Dashboard::new(
        config.default_engine,
        TimeWindow(config.default_hours),
        config.time_bucket,
    );
    let mut session = Session::new(client, dash, renderer);
    let mut stdout = std::io::stdout();

    if query.trim().is_empty() {
        session.greet(&mut stdout)?;
    } else {
        session
            .search(query, &SearchOptions::default(), &mut stdout)
            .await?;
    }
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    session.run(input, &mut stdout).await
}

/// Renderer for the configured map mode; choropleth loads the world file here.
fn build_renderer(
    config: &AppConfig,
    color: bool,
    limit: Option<usize>,
) -> anyhow::Result<Renderer> {
    let post_limit = limit.unwrap_or(config.post_limit);
    match (config.map_mode, &config.world_geojson) {
        (MapMode::Choropleth, Some(path)) => {
            let world = gi_core::geo::load_world(path)?;
            tracing::debug!(features = world.features.len(), "loaded world boundaries");
            Ok(Renderer::with_world(world, color, post_limit))
        }
        _ => Ok(Renderer::new(color, MapView::Bubble, post_limit)),
    }
}

fn non_empty(query: &[String]) -> anyhow::Result<String> {
    let query = query.join(" ");
    if query.trim().is_empty() {
        anyhow::bail!("query must not be empty");
    }
    Ok(query.trim().to_string())
}

/// Colors only on a terminal, and never with `--no-color` or `NO_COLOR` set.
fn use_color(no_color_flag: bool) -> bool {
    !no_color_flag
        && std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty())
        && std::io::stdout().is_terminal()
}
