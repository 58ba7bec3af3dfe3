use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One ticker entry as published in the remote dataset
///
/// The upstream files mix strings, numbers and nulls freely, so every field
/// is read as an optional string and interpreted later by the parsers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawTickerRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    /// Last sale price, e.g. "$65.86"
    #[serde(default, deserialize_with = "lenient_string")]
    pub lastsale: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub netchange: Option<String>,

    /// Percent change, e.g. "0.259%"
    #[serde(default, deserialize_with = "lenient_string")]
    pub pctchange: Option<String>,

    /// Volume with thousands separators, e.g. "1,234"
    #[serde(default, deserialize_with = "lenient_string")]
    pub volume: Option<String>,

    #[serde(rename = "marketCap", default, deserialize_with = "lenient_string")]
    pub market_cap: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub ipoyear: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub industry: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub sector: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

impl RawTickerRecord {
    /// Decode a single dataset item
    ///
    /// Only JSON objects are accepted; serde would otherwise map arrays onto
    /// the struct positionally.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        if !value.is_object() {
            return Err(format!("expected object, got {}", json_type_name(value)));
        }

        serde_json::from_value(value.clone()).map_err(|e| e.to_string())
    }

    /// Symbol as it appears in the record, for log lines
    pub fn symbol_for_log(&self) -> &str {
        self.symbol.as_deref().unwrap_or("<missing>")
    }
}

/// Accept strings, numbers and booleans as text; everything else is absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_dataset_entry() {
        let value = json!({
            "symbol": "AAPL",
            "name": "Apple Inc. Common Stock",
            "lastsale": "$229.87",
            "netchange": "-0.69",
            "pctchange": "-0.299%",
            "volume": "44,423,130",
            "marketCap": "3495365358000.00",
            "country": "United States",
            "ipoyear": "1980",
            "industry": "Computer Manufacturing",
            "sector": "Technology",
            "url": "/market-activity/stocks/aapl"
        });

        let record = RawTickerRecord::from_value(&value).unwrap();
        assert_eq!(record.symbol.as_deref(), Some("AAPL"));
        assert_eq!(record.market_cap.as_deref(), Some("3495365358000.00"));
        assert_eq!(record.ipoyear.as_deref(), Some("1980"));
    }

    #[test]
    fn test_numbers_and_nulls_are_tolerated() {
        let value = json!({
            "symbol": "XYZ",
            "volume": 1200,
            "ipoyear": null,
            "lastsale": 12.5
        });

        let record = RawTickerRecord::from_value(&value).unwrap();
        assert_eq!(record.volume.as_deref(), Some("1200"));
        assert_eq!(record.lastsale.as_deref(), Some("12.5"));
        assert_eq!(record.ipoyear, None);
        assert_eq!(record.sector, None);
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = RawTickerRecord::from_value(&json!(["AAPL", "Apple"])).unwrap_err();
        assert_eq!(err, "expected object, got array");
        assert!(RawTickerRecord::from_value(&json!("AAPL")).is_err());
    }

    #[test]
    fn test_symbol_for_log() {
        let record = RawTickerRecord::default();
        assert_eq!(record.symbol_for_log(), "<missing>");
    }
}
