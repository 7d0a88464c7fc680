//! Price text parsing shared by the adapters.

use rust_decimal::Decimal;

/// Parse a price from site text.
///
/// Accepts an optional leading `$` and a comma decimal separator (the
/// Argentine sites publish `"140,30"`). Returns `None` for anything that is
/// not a positive number.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().trim_start_matches('$').trim().replace(',', ".");
    cleaned
        .parse::<Decimal>()
        .ok()
        .filter(|value| *value > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parses_dot_and_comma_separators() {
        assert_eq!(parse_price("140.30"), Some(dec!(140.30)));
        assert_eq!(parse_price("140,30"), Some(dec!(140.30)));
        assert_eq!(parse_price(" $ 144,0 "), Some(dec!(144.0)));
    }

    #[test]
    fn test_rejects_garbage_and_non_positive() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price("0"), None);
        assert_eq!(parse_price("-140.30"), None);
    }
}
