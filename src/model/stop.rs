use serde::Serialize;

use crate::extractor::markers::{
    ARRIVING_PHRASES, MINUTES_PATTERN, NOT_YET_DEPARTED_PHRASES, contains_any,
};

/// One leg of a round-trip route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The "going" leg (去程).
    Outbound,
    /// The "returning" leg (回程).
    Inbound,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Outbound, Direction::Inbound];
}

/// One physical stop on one route in one direction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopRecord {
    /// 1-based position along the direction
    pub sequence: u32,
    pub name: String,
    pub stop_id: Option<String>,
    /// Relative link the stop row pointed at, if any. Only the marked-table pages carry one.
    pub stop_link: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub arrival_status: Option<ArrivalStatus>,
}

/// Coarse classification of the live arrival text shown next to a stop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArrivalStatus {
    NotYetDeparted,
    MinutesAway(u32),
    Arriving,
    /// Keeps the original text so it can still be displayed
    Unrecognized(String),
}

impl ArrivalStatus {
    /// Classifies a status string.
    ///
    /// Precedence is "not yet departed", then "N minutes", then "arriving".
    /// A minutes phrase without a parseable number doesn't count as one.
    pub fn classify(raw: &str) -> Self {
        let text = raw.trim();
        let lowered = text.to_lowercase();

        if contains_any(&lowered, NOT_YET_DEPARTED_PHRASES) {
            return ArrivalStatus::NotYetDeparted;
        }

        if let Some(minutes) = MINUTES_PATTERN
            .captures(&lowered)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            return ArrivalStatus::MinutesAway(minutes);
        }

        if contains_any(&lowered, ARRIVING_PHRASES) {
            return ArrivalStatus::Arriving;
        }

        ArrivalStatus::Unrecognized(text.to_string())
    }

    /// Like [`ArrivalStatus::classify`] but a blank cell means there is no status at all.
    pub fn from_cell(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self::classify(raw))
        }
    }
}

/// The live board of one stop: every route calling there and when its next bus comes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopArrivals {
    pub stop_id: String,
    pub arrivals: Vec<LiveArrival>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LiveArrival {
    /// Route number as shown on the board, e.g. "282" or "棕9"
    pub route_name: String,
    /// Taken from the route link, when the board links the route
    pub route_id: Option<String>,
    pub arrival_text: String,
    /// `None` when the board shows nothing for this route
    pub status: Option<ArrivalStatus>,
}

#[cfg(test)]
mod tests {
    use super::ArrivalStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_source_phrases() {
        assert_eq!(ArrivalStatus::classify("尚未發車"), ArrivalStatus::NotYetDeparted);
        assert_eq!(ArrivalStatus::classify("約 3 分"), ArrivalStatus::MinutesAway(3));
        assert_eq!(ArrivalStatus::classify("12分"), ArrivalStatus::MinutesAway(12));
        assert_eq!(ArrivalStatus::classify("即將進站"), ArrivalStatus::Arriving);
        assert_eq!(ArrivalStatus::classify("進站中"), ArrivalStatus::Arriving);
    }

    #[test]
    fn test_classify_english_phrases() {
        assert_eq!(
            ArrivalStatus::classify("Not yet departed"),
            ArrivalStatus::NotYetDeparted
        );
        assert_eq!(ArrivalStatus::classify("5 min"), ArrivalStatus::MinutesAway(5));
        assert_eq!(ArrivalStatus::classify("ARRIVING"), ArrivalStatus::Arriving);
    }

    #[test]
    fn test_not_yet_departed_wins_over_minutes() {
        assert_eq!(
            ArrivalStatus::classify("未發車 (預計 15 分)"),
            ArrivalStatus::NotYetDeparted
        );
    }

    #[test]
    fn test_minutes_wins_over_arriving() {
        assert_eq!(
            ArrivalStatus::classify("即將進站 / 2分"),
            ArrivalStatus::MinutesAway(2)
        );
    }

    #[test]
    fn test_minutes_marker_without_number_is_not_minutes() {
        assert_eq!(
            ArrivalStatus::classify("末班車已過 分"),
            ArrivalStatus::Unrecognized("末班車已過 分".to_string())
        );
    }

    #[test]
    fn test_unrecognized_keeps_original_text() {
        assert_eq!(
            ArrivalStatus::classify("  交管不停靠  "),
            ArrivalStatus::Unrecognized("交管不停靠".to_string())
        );
        assert_eq!(
            ArrivalStatus::classify("Last Bus Left"),
            ArrivalStatus::Unrecognized("Last Bus Left".to_string())
        );
    }

    #[test]
    fn test_blank_cell_has_no_status() {
        assert_eq!(ArrivalStatus::from_cell("   "), None);
        assert_eq!(
            ArrivalStatus::from_cell("即將進站"),
            Some(ArrivalStatus::Arriving)
        );
    }
}
