//! Closed tables of the markers the source pages use.
//!
//! Everything that is matched by string lives here so the parsing code only ever deals
//! with [`Direction`] and [`ArrivalStatus`](crate::model::ArrivalStatus) values.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::Direction;

/// Row classes of the marked-table route page. Each direction is rendered with two
/// alternating classes for striping.
pub const DIRECTION_MARKERS: [(&str, Direction); 4] = [
    ("ttego1", Direction::Outbound),
    ("ttego2", Direction::Outbound),
    ("tteback1", Direction::Inbound),
    ("tteback2", Direction::Inbound),
];

/// Matched against lowercased text
pub const NOT_YET_DEPARTED_PHRASES: &[&str] = &["未發車", "not yet departed", "not departed"];

/// Matched against lowercased text
pub const ARRIVING_PHRASES: &[&str] = &["即將進站", "進站中", "arriving", "approaching"];

pub static MINUTES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:分|min)").unwrap());

static DIRECTION_BY_MARKER: LazyLock<HashMap<&'static str, Direction>> = LazyLock::new(|| {
    let by_marker: HashMap<_, _> = DIRECTION_MARKERS.into_iter().collect();

    assert_eq!(
        by_marker.len(),
        DIRECTION_MARKERS.len(),
        "direction marker listed twice"
    );
    for direction in Direction::ALL {
        assert!(
            by_marker.values().any(|d| *d == direction),
            "no marker for {direction:?}"
        );
    }

    by_marker
});

/// Direction of a row given its class list. The first class that is a known marker wins.
pub fn direction_of<'a>(mut classes: impl Iterator<Item = &'a str>) -> Option<Direction> {
    classes.find_map(|class| DIRECTION_BY_MARKER.get(class).copied())
}

pub fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::{DIRECTION_MARKERS, direction_of};
    use crate::model::Direction;

    #[test]
    fn test_every_marker_resolves() {
        for (marker, direction) in DIRECTION_MARKERS {
            assert_eq!(direction_of([marker].into_iter()), Some(direction));
        }
    }

    #[test]
    fn test_direction_ignores_other_classes() {
        assert_eq!(
            direction_of(["odd", "tteback2"].into_iter()),
            Some(Direction::Inbound)
        );
        assert_eq!(direction_of(["ttego3", "header"].into_iter()), None);
        assert_eq!(direction_of(std::iter::empty()), None);
    }
}
