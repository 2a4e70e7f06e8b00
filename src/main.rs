use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use dotenvy::dotenv;
use serde::Serialize;
use taipei_bus_stops::config::{Command, Config};
use taipei_bus_stops::extractor::{self, extract_route_listing};
use taipei_bus_stops::fetcher::{DataSource, PageFetcher};
use taipei_bus_stops::model::{Direction, RouteExtractionResult, StopArrivals, StopRecord};
use taipei_bus_stops::scrape::scrape_routes;
use tokio::select;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// One line of output
#[derive(Serialize)]
struct ScrapedRoute<'a> {
    fetched_at: DateTime<Utc>,
    source: DataSource,
    #[serde(flatten)]
    route: &'a RouteExtractionResult,
}

/// One line of output per stop found with `--find`
#[derive(Serialize)]
struct FoundStop<'a> {
    fetched_at: DateTime<Utc>,
    source: DataSource,
    route_id: &'a str,
    direction: Direction,
    #[serde(flatten)]
    stop: &'a StopRecord,
}

#[derive(Serialize)]
struct ScrapedStop<'a> {
    fetched_at: DateTime<Utc>,
    #[serde(flatten)]
    stop: &'a StopArrivals,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();
    let config = Config::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily(&config.log_dir, "taipei_bus_stops.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false);

    // stdout is for the scraped data, logs go to stderr.
    let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    Registry::default()
        .with(file_log)
        .with(stderr_log)
        .with(env_filter)
        .init();

    match &config.command {
        Command::Route {
            source,
            route_url_template,
            concurrency,
            find,
            route_ids,
        } => {
            let fetcher = PageFetcher::new(
                *source,
                route_url_template.clone(),
                &config.user_agent,
                config.timeout(),
            )?;

            select! {
                res = scrape_and_print(&fetcher, route_ids, *concurrency, find.as_deref()) => res?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("interrupted, stopping");
                }
            }
        }
        Command::Parse {
            source,
            route_id,
            find,
            file,
        } => {
            let content = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("couldn't read {}", file.display()))?;

            let route = extractor::extract(route_id, &content, source.format())?;
            print_route(*source, &route, find.as_deref())?;
        }
        Command::Routes { source, url } => {
            let fetcher =
                PageFetcher::new(*source, None, &config.user_agent, config.timeout())?;
            let url = url
                .clone()
                .unwrap_or_else(|| source.default_route_list_url().to_string());

            let content = fetcher.fetch_page(&url).await?;
            let routes = extract_route_listing(&content)
                .with_context(|| format!("couldn't list the routes of {url}"))?;

            info!("got {} routes", routes.len());
            for route in routes {
                println!("{}", serde_json::to_string(&route)?);
            }
        }
        Command::Stop {
            stop_url_template,
            stop_ids,
        } => {
            let fetcher =
                PageFetcher::new(DataSource::Pda, None, &config.user_agent, config.timeout())?;

            for stop_id in stop_ids {
                let page = fetcher.fetch_stop_page(stop_url_template, stop_id).await?;
                let stop = page.extract()?;

                info!(stop_id, "got {} arrivals", stop.arrivals.len());
                let line = serde_json::to_string(&ScrapedStop {
                    fetched_at: Utc::now(),
                    stop: &stop,
                })?;
                println!("{line}");
            }
        }
    }

    Ok(())
}

async fn scrape_and_print(
    fetcher: &PageFetcher,
    route_ids: &[String],
    concurrency: usize,
    find: Option<&str>,
) -> Result<()> {
    let outcomes = scrape_routes(fetcher, route_ids, concurrency).await;

    let mut succeeded = 0;
    for outcome in &outcomes {
        if let Ok(route) = &outcome.result {
            print_route(fetcher.source(), route, find)?;
            succeeded += 1;
        }
    }

    if succeeded == 0 {
        error!("none of the {} routes could be scraped", outcomes.len());
        bail!("every route failed");
    }

    Ok(())
}

/// Prints the whole route, or with `find` one line per matching stop.
fn print_route(
    source: DataSource,
    route: &RouteExtractionResult,
    find: Option<&str>,
) -> Result<()> {
    let fetched_at = Utc::now();

    let Some(query) = find else {
        let line = serde_json::to_string(&ScrapedRoute {
            fetched_at,
            source,
            route,
        })?;
        println!("{line}");

        return Ok(());
    };

    let found = route.find_stops(query);
    if found.is_empty() {
        warn!(route_id = route.route_id(), query, "no stop matches");
    }

    for (direction, stop) in found {
        let line = serde_json::to_string(&FoundStop {
            fetched_at,
            source,
            route_id: route.route_id(),
            direction,
            stop,
        })?;
        println!("{line}");
    }

    Ok(())
}
