//! Field parsers for the dataset's display-formatted values
//!
//! Field-level parse failures degrade to `None`; only a bad symbol fails a
//! record.

use super::errors::SyncError;

const MAX_SYMBOL_LEN: usize = 20;

/// "$65.86" -> 65.86, "$1,234.50" -> 1234.5
pub fn parse_price(value: Option<&str>) -> Option<f64> {
    parse_float(&value?.replace(['$', ','], ""))
}

/// Plain decimal such as net change or market cap; same stripping as prices
pub fn parse_decimal(value: Option<&str>) -> Option<f64> {
    parse_price(value)
}

/// "0.259%" -> 0.259 (kept as a percentage number, not divided by 100)
pub fn parse_percentage(value: Option<&str>) -> Option<f64> {
    parse_float(value?.trim().trim_end_matches('%'))
}

/// "1,234" -> 1234
pub fn parse_volume(value: Option<&str>) -> Option<i64> {
    value?.replace(',', "").trim().parse::<i64>().ok()
}

/// "1999" -> 1999
pub fn parse_year(value: Option<&str>) -> Option<i32> {
    value?.trim().parse::<i32>().ok()
}

/// Trimmed text, blank -> None
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trim and uppercase a ticker symbol, rejecting anything malformed
///
/// Accepts 1-20 characters of `A-Z 0-9 . / ^ -`, starting with a letter or
/// digit (covers share classes like "BRK/A" and preferreds like "AGM^C").
pub fn normalize_symbol(raw: Option<&str>) -> Result<String, SyncError> {
    let symbol = raw.map(str::trim).unwrap_or_default().to_ascii_uppercase();

    if symbol.is_empty() {
        return Err(SyncError::InvalidArgument("missing ticker symbol".to_string()));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(SyncError::InvalidArgument(format!(
            "ticker symbol '{}' exceeds {} characters",
            symbol, MAX_SYMBOL_LEN
        )));
    }

    let starts_ok = symbol.starts_with(|c: char| c.is_ascii_alphanumeric());
    let chars_ok = symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '/' | '^' | '-'));

    if !starts_ok || !chars_ok {
        return Err(SyncError::InvalidArgument(format!(
            "malformed ticker symbol '{}'",
            symbol
        )));
    }

    Ok(symbol)
}

fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(Some("$65.86")), Some(65.86));
        assert_eq!(parse_price(Some("$1,234.50")), Some(1234.5));
        assert_eq!(parse_price(Some("12")), Some(12.0));
        assert_eq!(parse_price(Some("")), None);
        assert_eq!(parse_price(Some("N/A")), None);
        assert_eq!(parse_price(None), None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(Some("-0.69")), Some(-0.69));
        assert_eq!(parse_decimal(Some("3,495,365,358,000.00")), Some(3_495_365_358_000.0));
        assert_eq!(parse_decimal(Some("")), None);
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage(Some("0.259%")), Some(0.259));
        assert_eq!(parse_percentage(Some("-1.5%")), Some(-1.5));
        assert_eq!(parse_percentage(Some("")), None);
        assert_eq!(parse_percentage(Some("%")), None);
    }

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume(Some("1,234")), Some(1234));
        assert_eq!(parse_volume(Some("44,423,130")), Some(44_423_130));
        assert_eq!(parse_volume(Some("")), None);
        assert_eq!(parse_volume(Some("12.5")), None);
    }

    #[test]
    fn test_non_finite_values_are_dropped() {
        assert_eq!(parse_price(Some("NaN")), None);
        assert_eq!(parse_percentage(Some("inf%")), None);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(Some("1980")), Some(1980));
        assert_eq!(parse_year(Some("")), None);
        assert_eq!(parse_year(Some("n/a")), None);
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(Some(" aapl ")).unwrap(), "AAPL");
        assert_eq!(normalize_symbol(Some("BRK/A")).unwrap(), "BRK/A");
        assert_eq!(normalize_symbol(Some("agm^c")).unwrap(), "AGM^C");
        assert_eq!(normalize_symbol(Some("BF.B")).unwrap(), "BF.B");

        assert!(normalize_symbol(None).is_err());
        assert!(normalize_symbol(Some("   ")).is_err());
        assert!(normalize_symbol(Some("AB CD")).is_err());
        assert!(normalize_symbol(Some("^AB")).is_err());
        assert!(normalize_symbol(Some("ABCDEFGHIJKLMNOPQRSTU")).is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some(" United States ")), Some("United States".to_string()));
        assert_eq!(non_blank(Some("")), None);
        assert_eq!(non_blank(None), None);
    }
}
