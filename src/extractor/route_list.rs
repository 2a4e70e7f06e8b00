//! Route directory pages, used to discover route ids before scraping each route.

use std::sync::LazyLock;

use itertools::Itertools;
use scraper::{Html, Selector};

use super::normalize::normalize_name;
use crate::model::RouteListing;
use crate::utils::str_between_str;

static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

#[derive(thiserror::Error, Debug)]
pub enum RouteListError {
    #[error("the page has no route links")]
    NoRouteLinks,
}

/// Collects `(name, route id)` pairs from route links in page order.
///
/// Understands `javascript:go('<id>')` links and `route.jsp?rid=<id>` links. A route linked
/// more than once is only listed the first time.
pub fn extract_route_listing(page_content: &str) -> Result<Vec<RouteListing>, RouteListError> {
    let document = Html::parse_document(page_content);

    let listings = document
        .select(&LINK_SELECTOR)
        .filter_map(|a| {
            let route_id = route_id_from_href(a.value().attr("href")?)?;
            let name = normalize_name(&a.text().collect::<String>())?;

            Some(RouteListing { name, route_id })
        })
        .unique_by(|r| r.route_id.clone())
        .collect_vec();

    if listings.is_empty() {
        return Err(RouteListError::NoRouteLinks);
    }

    Ok(listings)
}

pub(super) fn route_id_from_href(href: &str) -> Option<String> {
    let id = if href.trim_start().starts_with("javascript:go(") {
        str_between_str(href, "go('", "')")?
    } else {
        let (_, query) = href.split_once("route.jsp?")?;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("rid="))?
    };

    let id = id.trim();
    if id.is_empty() { None } else { Some(id.to_string()) }
}
