//! Turns a raw route page into the stops of that route, per direction.
//!
//! Extraction is a pure function of its input: no I/O, no state kept between calls.
//! Any number of pages can be extracted concurrently.

pub mod html;
pub mod json;
pub mod markers;
pub mod normalize;
pub mod route_list;
pub mod stop_page;

use serde::Serialize;
use tracing::info;

use crate::model::RouteExtractionResult;

pub use normalize::normalize_name;
pub use route_list::{RouteListError, extract_route_listing};
pub use stop_page::{StopPageError, extract_stop_arrivals};

/// How a route page represents its stops
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SourceFormat {
    /// HTML with one table row per stop, tagged with a direction class
    HtmlTableMarked,
    /// JSON with one array per direction
    JsonStructured,
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    /// The page doesn't look like a stop listing at all
    #[error("no stop listing found in {format:?} page of route {route_id}: {reason}")]
    MalformedSource {
        route_id: String,
        format: SourceFormat,
        reason: String,
    },

    /// The stop listing is there but every row was unusable
    #[error("route {route_id} has a stop listing without any usable stop")]
    EmptyRoute { route_id: String },
}

impl ExtractError {
    pub fn route_id(&self) -> &str {
        match self {
            ExtractError::MalformedSource { route_id, .. } => route_id,
            ExtractError::EmptyRoute { route_id } => route_id,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ExtractError::MalformedSource { .. })
    }

    pub fn is_empty_route(&self) -> bool {
        matches!(self, ExtractError::EmptyRoute { .. })
    }
}

/// Extracts the stops of one route from its page.
#[tracing::instrument(err, skip(page_content), fields(page_len = page_content.len()))]
pub fn extract(
    route_id: &str,
    page_content: &str,
    source_format: SourceFormat,
) -> Result<RouteExtractionResult, ExtractError> {
    let route = match source_format {
        SourceFormat::HtmlTableMarked => html::extract_marked_table(route_id, page_content)?,
        SourceFormat::JsonStructured => json::extract_structured(route_id, page_content)?,
    };

    info!(
        outbound = route.outbound().len(),
        inbound = route.inbound().len(),
        "extracted route"
    );

    Ok(route)
}
