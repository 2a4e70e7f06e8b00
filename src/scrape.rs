//! Fetches and extracts many routes at once.
//!
//! One broken route never stops the others: every requested route gets its own outcome.

use futures::{StreamExt, stream};
use tracing::{error, info, warn};

use crate::extractor::ExtractError;
use crate::fetcher::{FetchError, PageFetcher};
use crate::model::RouteExtractionResult;

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("error fetching the route page")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

#[derive(Debug)]
pub struct RouteOutcome {
    pub route_id: String,
    pub result: Result<RouteExtractionResult, ScrapeError>,
}

/// Scrapes `route_ids` with at most `concurrency` requests in flight.
/// Outcomes are returned in the order the ids were given.
#[tracing::instrument(skip(fetcher, route_ids), fields(routes = route_ids.len(), source = ?fetcher.source()))]
pub async fn scrape_routes(
    fetcher: &PageFetcher,
    route_ids: &[String],
    concurrency: usize,
) -> Vec<RouteOutcome> {
    let outcomes: Vec<RouteOutcome> = stream::iter(route_ids)
        .map(|route_id| async move {
            let result = scrape_route(fetcher, route_id).await;
            log_failure(route_id, &result);

            RouteOutcome {
                route_id: route_id.clone(),
                result,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        succeeded = outcomes.len() - failed,
        failed, "finished scraping routes"
    );

    outcomes
}

async fn scrape_route(
    fetcher: &PageFetcher,
    route_id: &str,
) -> Result<RouteExtractionResult, ScrapeError> {
    let page = fetcher.fetch_route_page(route_id).await?;

    Ok(page.extract()?)
}

fn log_failure(route_id: &str, result: &Result<RouteExtractionResult, ScrapeError>) {
    match result {
        Ok(_) => {}
        Err(ScrapeError::Extract(ExtractError::EmptyRoute { .. })) => {
            warn!(route_id, "route has no published stops yet")
        }
        Err(ScrapeError::Extract(e @ ExtractError::MalformedSource { .. })) => {
            error!(route_id, "route page can't be scraped: {e}")
        }
        Err(ScrapeError::Fetch(e)) => error!(route_id, error = ?e, "error fetching route page"),
    }
}
