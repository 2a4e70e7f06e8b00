use serde::Serialize;

use super::stop::{Direction, StopRecord};
use crate::extractor::normalize_name;

/// The stops of one route, split by direction.
///
/// Built once per extracted page and never mutated afterwards. Sequences inside each
/// direction start at 1 for pages that don't number their rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteExtractionResult {
    route_id: String,
    outbound_stops: Vec<StopRecord>,
    inbound_stops: Vec<StopRecord>,
}

impl RouteExtractionResult {
    pub(crate) fn new(
        route_id: impl Into<String>,
        outbound_stops: Vec<StopRecord>,
        inbound_stops: Vec<StopRecord>,
    ) -> Self {
        RouteExtractionResult {
            route_id: route_id.into(),
            outbound_stops,
            inbound_stops,
        }
    }

    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    pub fn outbound(&self) -> &[StopRecord] {
        &self.outbound_stops
    }

    pub fn inbound(&self) -> &[StopRecord] {
        &self.inbound_stops
    }

    pub fn stops(&self, direction: Direction) -> &[StopRecord] {
        match direction {
            Direction::Outbound => self.outbound(),
            Direction::Inbound => self.inbound(),
        }
    }

    /// Total number of stops over both directions
    pub fn len(&self) -> usize {
        self.outbound_stops.len() + self.inbound_stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outbound stops first, then inbound ones.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &StopRecord)> {
        Direction::ALL
            .into_iter()
            .flat_map(move |d| self.stops(d).iter().map(move |s| (d, s)))
    }

    /// Stops whose name contains `query`, outbound first. The query is cleaned up the same
    /// way stop names are, so a pasted "松山車站..." still matches. A blank query matches nothing.
    pub fn find_stops(&self, query: &str) -> Vec<(Direction, &StopRecord)> {
        let Some(query) = normalize_name(query) else {
            return vec![];
        };

        self.iter()
            .filter(|(_, stop)| stop.name.contains(&query))
            .collect()
    }
}

/// One entry of a route directory page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteListing {
    pub name: String,
    pub route_id: String,
}
