//! Route pages that render every stop as a table row tagged with a direction class.

use std::collections::HashSet;
use std::sync::LazyLock;

use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::markers::direction_of;
use super::normalize::normalize_name;
use super::{ExtractError, SourceFormat};
use crate::model::{ArrivalStatus, Direction, RouteExtractionResult, StopRecord};

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr[class]").unwrap());
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// A stop row before sequences are assigned
#[derive(Debug)]
struct MarkedRow {
    direction: Direction,
    name: String,
    stop_link: Option<String>,
    arrival_status: Option<ArrivalStatus>,
}

pub(super) fn extract_marked_table(
    route_id: &str,
    page_content: &str,
) -> Result<RouteExtractionResult, ExtractError> {
    let document = Html::parse_document(page_content);

    let mut anchored = 0;
    let mut rows = vec![];

    for row in document.select(&ROW_SELECTOR) {
        let Some(direction) = direction_of(row.value().classes()) else {
            debug!(
                route_id,
                classes = row.value().attr("class").unwrap_or_default(),
                "skipping row without a direction marker"
            );
            continue;
        };
        anchored += 1;

        match parse_row(direction, row) {
            Some(row) => rows.push(row),
            None => debug!(route_id, ?direction, "dropping stop row without a name"),
        }
    }

    if anchored == 0 {
        return Err(ExtractError::MalformedSource {
            route_id: route_id.to_string(),
            format: SourceFormat::HtmlTableMarked,
            reason: "no rows carry a direction marker".to_string(),
        });
    }

    let (outbound, inbound): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|r| r.direction == Direction::Outbound);

    let outbound = into_stop_records(outbound);
    let inbound = into_stop_records(inbound);

    if outbound.is_empty() && inbound.is_empty() {
        return Err(ExtractError::EmptyRoute {
            route_id: route_id.to_string(),
        });
    }

    debug!(
        route_id,
        marked_rows = anchored,
        outbound = outbound.len(),
        inbound = inbound.len(),
        "extracted marked table"
    );

    Ok(RouteExtractionResult::new(route_id, outbound, inbound))
}

/// First cell is the stop, second (if any) the live arrival text.
/// Only direct cells are looked at since the pages nest tables inside rows.
fn parse_row(direction: Direction, row: ElementRef) -> Option<MarkedRow> {
    let cells = direct_cells(row);

    let name_cell = cells.first()?;
    let name = normalize_name(&name_cell.text().collect::<String>())?;

    let stop_link = name_cell
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string);

    let arrival_status = cells
        .get(1)
        .and_then(|cell| ArrivalStatus::from_cell(&cell.text().collect::<String>()));

    Some(MarkedRow {
        direction,
        name,
        stop_link,
        arrival_status,
    })
}

/// The `td` children of a row, ignoring cells of tables nested inside it
pub(super) fn direct_cells(row: ElementRef) -> Vec<ElementRef> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "td")
        .collect_vec()
}

/// Drops rows repeating a stop link already seen in this direction and numbers the rest.
fn into_stop_records(rows: Vec<MarkedRow>) -> Vec<StopRecord> {
    let mut seen_links = HashSet::new();

    rows.into_iter()
        .filter(|r| match &r.stop_link {
            Some(link) => seen_links.insert(link.clone()),
            None => true,
        })
        .zip(1..)
        .map(|(row, sequence)| StopRecord {
            sequence,
            stop_id: row.stop_link.as_deref().and_then(stop_id_from_link),
            name: row.name,
            stop_link: row.stop_link,
            latitude: None,
            longitude: None,
            arrival_status: row.arrival_status,
        })
        .collect_vec()
}

/// `stop.jsp?sid=10785` -> `10785`
pub fn stop_id_from_link(link: &str) -> Option<String> {
    let (_, id) = link.rsplit_once('=')?;
    let id = id.trim();

    if id.is_empty() { None } else { Some(id.to_string()) }
}
