use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Stock exchanges covered by the ticker dataset
///
/// The set is fixed and pre-seeded in the `exchanges` table. Declaration
/// order is the order a full sync walks them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExchangeCode {
    Nasdaq,
    Nyse,
    Amex,
}

impl ExchangeCode {
    /// All exchanges in full-sync order
    pub const ALL: [ExchangeCode; 3] = [ExchangeCode::Nasdaq, ExchangeCode::Nyse, ExchangeCode::Amex];

    /// Database / API code
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeCode::Nasdaq => "NASDAQ",
            ExchangeCode::Nyse => "NYSE",
            ExchangeCode::Amex => "AMEX",
        }
    }

    /// Human readable exchange name (matches the migration seed)
    pub fn display_name(&self) -> &'static str {
        match self {
            ExchangeCode::Nasdaq => "Nasdaq Stock Market",
            ExchangeCode::Nyse => "New York Stock Exchange",
            ExchangeCode::Amex => "NYSE American",
        }
    }

    /// Path of the exchange's ticker file relative to the dataset root
    pub fn dataset_path(&self) -> &'static str {
        match self {
            ExchangeCode::Nasdaq => "nasdaq/nasdaq_full_tickers.json",
            ExchangeCode::Nyse => "nyse/nyse_full_tickers.json",
            ExchangeCode::Amex => "amex/amex_full_tickers.json",
        }
    }

    /// Parse a code case-insensitively, ignoring surrounding whitespace
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "NASDAQ" => Some(ExchangeCode::Nasdaq),
            "NYSE" => Some(ExchangeCode::Nyse),
            "AMEX" => Some(ExchangeCode::Amex),
            _ => None,
        }
    }

    /// Comma-separated list of valid codes, for error messages
    pub fn valid_codes() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ExchangeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ExchangeCode::parse("nasdaq"), Some(ExchangeCode::Nasdaq));
        assert_eq!(ExchangeCode::parse(" Nyse "), Some(ExchangeCode::Nyse));
        assert_eq!(ExchangeCode::parse("AMEX"), Some(ExchangeCode::Amex));
        assert_eq!(ExchangeCode::parse("LSE"), None);
        assert_eq!(ExchangeCode::parse(""), None);
    }

    #[test]
    fn test_full_sync_order() {
        let codes: Vec<&str> = ExchangeCode::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["NASDAQ", "NYSE", "AMEX"]);
        assert_eq!(ExchangeCode::valid_codes(), "NASDAQ, NYSE, AMEX");
    }

    #[test]
    fn test_serde_uses_uppercase_codes() {
        let json = serde_json::to_string(&ExchangeCode::Nyse).unwrap();
        assert_eq!(json, "\"NYSE\"");
    }
}
