//! Small parsing/formatting helpers shared by the storage models.

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Format used for all business dates persisted as TEXT.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a string into a Decimal, with a fallback through f64 for values
/// stored in scientific notation. Falls back to zero rather than failing a
/// whole load for one bad cell.
pub fn parse_decimal_tolerant(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(e_decimal) => match f64::from_str(value_str) {
            Ok(f_val) => Decimal::from_f64(f_val).unwrap_or_else(|| {
                log::error!(
                    "Failed to convert {} '{}' (parsed as f64: {}) to Decimal.",
                    field_name,
                    value_str,
                    f_val
                );
                Decimal::ZERO
            }),
            Err(e_f64) => {
                log::error!(
                    "Failed to parse {} '{}': as Decimal (err: {}), and as f64 (err: {}). Falling back to ZERO.",
                    field_name,
                    value_str,
                    e_decimal,
                    e_f64
                );
                Decimal::ZERO
            }
        },
    }
}

/// Parses a `%Y-%m-%d` date column, falling back to the epoch date and
/// logging when the stored value is unreadable.
pub fn parse_date_tolerant(value_str: &str, field_name: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value_str, DATE_FORMAT).unwrap_or_else(|e| {
        log::error!("Failed to parse {} '{}': {}", field_name, value_str, e);
        NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid")
    })
}

/// Formats a date for TEXT storage.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_plain_decimal() {
        assert_eq!(parse_decimal_tolerant("1234.56", "amount"), dec!(1234.56));
    }

    #[test]
    fn parses_scientific_notation_via_f64() {
        assert_eq!(parse_decimal_tolerant("1e3", "amount"), dec!(1000));
    }

    #[test]
    fn unreadable_decimal_falls_back_to_zero() {
        assert_eq!(parse_decimal_tolerant("not-a-number", "amount"), Decimal::ZERO);
    }

    #[test]
    fn date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        assert_eq!(parse_date_tolerant(&format_date(date), "date"), date);
    }
}
