//! Stop pages, which show the live arrival board of a single stop.

use std::sync::LazyLock;

use itertools::Itertools;
use scraper::{Html, Selector};
use tracing::debug;

use super::html::direct_cells;
use super::normalize::normalize_name;
use super::route_list::route_id_from_href;
use crate::model::{ArrivalStatus, LiveArrival, StopArrivals};

static BOARD_ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.realTimeTable tr").unwrap());
static BOARD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.realTimeTable").unwrap());
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

#[derive(thiserror::Error, Debug)]
pub enum StopPageError {
    #[error("stop page of {stop_id} has no real time table")]
    NoArrivalBoard { stop_id: String },
}

/// Reads the `realTimeTable` of a stop page, one arrival per route row.
///
/// The header row and rows without a route and a time cell are skipped. A board with no
/// routes on it is fine, a page without a board is not.
#[tracing::instrument(err, skip(page_content), fields(page_len = page_content.len()))]
pub fn extract_stop_arrivals(
    stop_id: &str,
    page_content: &str,
) -> Result<StopArrivals, StopPageError> {
    let document = Html::parse_document(page_content);

    if document.select(&BOARD_SELECTOR).next().is_none() {
        return Err(StopPageError::NoArrivalBoard {
            stop_id: stop_id.to_string(),
        });
    }

    let arrivals = document
        .select(&BOARD_ROW_SELECTOR)
        .filter_map(|row| {
            let cells = direct_cells(row);
            let [route_cell, time_cell, ..] = cells.as_slice() else {
                debug!(stop_id, "skipping board row without a time cell");
                return None;
            };

            let route_name = normalize_name(&route_cell.text().collect::<String>())?;
            let route_id = route_cell
                .select(&LINK_SELECTOR)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(route_id_from_href);

            let arrival_text = time_cell.text().collect::<String>();

            Some(LiveArrival {
                route_name,
                route_id,
                status: ArrivalStatus::from_cell(&arrival_text),
                arrival_text: arrival_text.trim().to_string(),
            })
        })
        .collect_vec();

    Ok(StopArrivals {
        stop_id: stop_id.to_string(),
        arrivals,
    })
}
