//! Route payloads that come as JSON with one array per direction.

use itertools::Itertools;
use tracing::debug;

use super::{ExtractError, SourceFormat};
use crate::model::ebus_api_model::{EbusStop, EbusStopsOfRoute, UNKNOWN_PLACEHOLDER};
use crate::model::{RouteExtractionResult, StopRecord};

/// Name used when a stop carries no localized name at all
pub const UNKNOWN_STOP_NAME: &str = UNKNOWN_PLACEHOLDER;

pub(super) fn extract_structured(
    route_id: &str,
    page_content: &str,
) -> Result<RouteExtractionResult, ExtractError> {
    let payload: EbusStopsOfRoute =
        serde_json::from_str(page_content).map_err(|e| ExtractError::MalformedSource {
            route_id: route_id.to_string(),
            format: SourceFormat::JsonStructured,
            reason: e.to_string(),
        })?;

    if payload.go_back.is_none() && payload.back.is_none() {
        return Err(ExtractError::MalformedSource {
            route_id: route_id.to_string(),
            format: SourceFormat::JsonStructured,
            reason: "no direction keys".to_string(),
        });
    }

    let outbound = into_stop_records(route_id, payload.go_back.unwrap_or_default());
    let inbound = into_stop_records(route_id, payload.back.unwrap_or_default());

    if outbound.is_empty() && inbound.is_empty() {
        return Err(ExtractError::EmptyRoute {
            route_id: route_id.to_string(),
        });
    }

    Ok(RouteExtractionResult::new(route_id, outbound, inbound))
}

/// Keeps source order. The source sequences are used as they are when every kept stop
/// has one and they only go up; otherwise the whole direction is numbered by position.
fn into_stop_records(route_id: &str, stops: Vec<EbusStop>) -> Vec<StopRecord> {
    let stops = stops
        .into_iter()
        .filter_map(|stop| {
            let name = match stop.stop_name.as_ref().and_then(|n| n.zh_tw.as_deref()) {
                Some(name) => name.trim().to_string(),
                None => UNKNOWN_STOP_NAME.to_string(),
            };

            if name.is_empty() {
                debug!(route_id, stop_id = ?stop.stop_id, "dropping stop with a blank name");
                return None;
            }

            Some((name, stop))
        })
        .collect_vec();

    let source_sequences = stops
        .iter()
        .map(|(_, stop)| stop.stop_sequence.filter(|s| *s > 0))
        .collect::<Option<Vec<u32>>>()
        .filter(|sequences| sequences.iter().tuple_windows().all(|(a, b)| a < b));

    if source_sequences.is_none() && !stops.is_empty() {
        debug!(route_id, "stop sequences missing or out of order, numbering by position");
    }

    let sequences = source_sequences.unwrap_or_else(|| (1..=stops.len() as u32).collect_vec());

    stops
        .into_iter()
        .zip(sequences)
        .map(|((name, stop), sequence)| StopRecord {
            sequence,
            name,
            stop_id: stop.stop_id,
            stop_link: None,
            latitude: stop.stop_position.and_then(|p| p.position_lat),
            longitude: stop.stop_position.and_then(|p| p.position_lon),
            arrival_status: None,
        })
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::{UNKNOWN_STOP_NAME, extract_structured};
    use crate::extractor::ExtractError;
    use crate::model::StopRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_outbound_stop() -> Result<(), anyhow::Error> {
        let json = r#"{"GoBack": [{"StopName":{"Zh_tw":"Stop A"},"StopSequence":1,"StopID":"001","StopPosition":{"PositionLat":25.03,"PositionLon":121.5}}], "Back": []}"#;

        let route = extract_structured("0100028200", json)?;

        assert_eq!(
            route.outbound(),
            &[StopRecord {
                sequence: 1,
                name: "Stop A".to_string(),
                stop_id: Some("001".to_string()),
                stop_link: None,
                latitude: Some(25.03),
                longitude: Some(121.5),
                arrival_status: None,
            }]
        );
        assert!(route.inbound().is_empty());

        Ok(())
    }

    #[test]
    fn test_fixture_payload() -> Result<(), anyhow::Error> {
        let json =
            include_str!("../../documentation/example_responses/ebus_stops_of_route_0100028200.json");

        let route = extract_structured("0100028200", json)?;

        assert_eq!(route.outbound().len(), 4);
        assert_eq!(route.inbound().len(), 3);
        assert_eq!(route.outbound()[0].name, "捷運科技大樓站");
        assert_eq!(route.outbound()[0].stop_id.as_deref(), Some("10785"));
        assert_eq!(route.outbound()[3].sequence, 4);
        assert_eq!(route.inbound()[0].name, "松山車站(八德)");
        assert_eq!(route.inbound()[2].latitude, Some(25.05204));

        Ok(())
    }

    #[test]
    fn test_missing_name_is_unknown() -> Result<(), anyhow::Error> {
        let json = r#"{"Back": [{"StopSequence": 1, "StopID": "9"}, {"StopName": {"En": "B"}, "StopSequence": 2}]}"#;

        let route = extract_structured("1", json)?;

        assert_eq!(route.inbound().len(), 2);
        assert!(route.inbound().iter().all(|s| s.name == UNKNOWN_STOP_NAME));
        assert_eq!(route.inbound()[0].latitude, None);

        Ok(())
    }

    #[test]
    fn test_name_trimmed_and_blank_dropped() -> Result<(), anyhow::Error> {
        let json = r#"{"GoBack": [
            {"StopName": {"Zh_tw": "  A "}, "StopSequence": 1},
            {"StopName": {"Zh_tw": "   "}, "StopSequence": 2},
            {"StopName": {"Zh_tw": "C"}, "StopSequence": 3}
        ]}"#;

        let route = extract_structured("1", json)?;

        assert_eq!(
            route.outbound().iter().map(|s| (s.sequence, s.name.as_str())).collect::<Vec<_>>(),
            vec![(1, "A"), (3, "C")]
        );

        Ok(())
    }

    #[test]
    fn test_missing_sequence_falls_back_to_position() -> Result<(), anyhow::Error> {
        let json = r#"{"GoBack": [
            {"StopName": {"Zh_tw": "A"}},
            {"StopName": {"Zh_tw": "B"}, "StopSequence": 0}
        ]}"#;

        let route = extract_structured("1", json)?;

        assert_eq!(
            route.outbound().iter().map(|s| s.sequence).collect::<Vec<_>>(),
            vec![1, 2]
        );

        Ok(())
    }

    #[test]
    fn test_partly_missing_sequences_renumber_direction() -> Result<(), anyhow::Error> {
        let json = r#"{"GoBack": [
            {"StopName": {"Zh_tw": "A"}, "StopSequence": 2},
            {"StopName": {"Zh_tw": "B"}},
            {"StopName": {"Zh_tw": "C"}, "StopSequence": 3}
        ], "Back": [
            {"StopName": {"Zh_tw": "D"}, "StopSequence": 5},
            {"StopName": {"Zh_tw": "E"}, "StopSequence": 5}
        ]}"#;

        let route = extract_structured("1", json)?;

        assert_eq!(
            route.outbound().iter().map(|s| (s.sequence, s.name.as_str())).collect::<Vec<_>>(),
            vec![(1, "A"), (2, "B"), (3, "C")]
        );
        assert_eq!(
            route.inbound().iter().map(|s| s.sequence).collect::<Vec<_>>(),
            vec![1, 2]
        );

        Ok(())
    }

    #[test]
    fn test_unusable_sequence_numbers_are_not_malformed() -> Result<(), anyhow::Error> {
        let json = r#"{"GoBack": [
            {"StopName": {"Zh_tw": "A"}, "StopSequence": 1.0},
            {"StopName": {"Zh_tw": "B"}, "StopSequence": -1}
        ]}"#;

        let route = extract_structured("1", json)?;

        assert_eq!(
            route.outbound().iter().map(|s| s.sequence).collect::<Vec<_>>(),
            vec![1, 2]
        );

        Ok(())
    }

    #[test]
    fn test_both_directions_empty_is_empty_route() {
        let json = r#"{"GoBack": [], "Back": [{"StopName": {"Zh_tw": ""}}]}"#;

        assert!(matches!(
            extract_structured("1", json),
            Err(ExtractError::EmptyRoute { .. })
        ));
    }

    #[test]
    fn test_no_direction_keys_is_malformed() {
        for json in [r#"{"Stops": []}"#, "[]", "<html></html>", r#"{"GoBack": null}"#] {
            assert!(
                matches!(
                    extract_structured("1", json),
                    Err(ExtractError::MalformedSource { .. })
                ),
                "{json} should be malformed"
            );
        }
    }
}
