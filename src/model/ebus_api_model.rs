use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// What the API puts in fields it has no value for
pub const UNKNOWN_PLACEHOLDER: &str = "未知";

/// Body of `Route/StopsOfRoute?routeid=...`
#[derive(Debug, Deserialize)]
pub struct EbusStopsOfRoute {
    /// The outbound leg, despite the name
    #[serde(rename = "GoBack", default)]
    pub go_back: Option<Vec<EbusStop>>,
    /// The inbound leg
    #[serde(rename = "Back", default)]
    pub back: Option<Vec<EbusStop>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct EbusStop {
    #[serde(default)]
    pub stop_name: Option<EbusLocalizedName>,
    /// Can be missing or 0 on some routes
    #[serde(default, deserialize_with = "lenient_u32")]
    pub stop_sequence: Option<u32>,
    /// Sometimes a string, sometimes a number
    #[serde(rename = "StopID", default, deserialize_with = "lenient_string")]
    pub stop_id: Option<String>,
    #[serde(default)]
    pub stop_position: Option<EbusPosition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EbusLocalizedName {
    #[serde(rename = "Zh_tw", default)]
    pub zh_tw: Option<String>,
    #[serde(rename = "En", default)]
    pub en: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "PascalCase")]
pub struct EbusPosition {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub position_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub position_lon: Option<f64>,
}

// The API isn't consistent about quoting numbers, so these accept both forms.
// Values that can't be read as the wanted type (null, objects, the "未知" placeholder) are absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Deserialize::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty() && s != UNKNOWN_PLACEHOLDER).then(|| s.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Deserialize::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Number(n)) => sequence_from_number(&n),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Whole numbers that fit, including `3.0`. Negative, fractional or huge values are absent.
fn sequence_from_number(n: &Number) -> Option<u32> {
    if let Some(n) = n.as_u64() {
        return u32::try_from(n).ok();
    }

    let f = n.as_f64()?;
    (f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Deserialize::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
