//! Boundary conversions: cents to currency units, date and month strings.

use chrono::NaiveDate;

use super::error::ToolError;

const DATE_FORMAT: &str = "%Y-%m-%d";
/// Largest amount (in currency units) accepted from callers.
const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

#[allow(clippy::cast_precision_loss)]
pub(crate) fn to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn to_cents(amount: f64, field: &str) -> Result<i64, ToolError> {
    if !amount.is_finite() || amount.abs() > MAX_AMOUNT {
        return Err(ToolError::validation(format!(
            "{field} must be a finite amount"
        )));
    }
    Ok((amount * 100.0).round() as i64)
}

pub(crate) fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ToolError::validation(format!("{field} must be YYYY-MM-DD, got '{raw}'")))
}

pub(crate) fn parse_optional_date(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<NaiveDate>, ToolError> {
    raw.map(|raw| parse_date(raw, field)).transpose()
}

/// Normalizes a `YYYY-MM` month.
pub(crate) fn parse_month(raw: &str) -> Result<String, ToolError> {
    let trimmed = raw.trim();
    let invalid = || ToolError::validation(format!("month must be YYYY-MM, got '{raw}'"));
    if trimmed.len() != 7 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), DATE_FORMAT)
        .map(|first| first.format("%Y-%m").to_string())
        .map_err(|_| invalid())
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_and_amounts() {
        assert!((to_amount(-8550) - -85.5).abs() < f64::EPSILON);
        assert_eq!(to_cents(12.34, "amount").unwrap(), 1234);
        assert_eq!(to_cents(-0.1, "amount").unwrap(), -10);
        assert!(to_cents(f64::NAN, "amount").is_err());
    }

    #[test]
    fn dates_and_months() {
        assert_eq!(
            parse_date("2024-03-05", "date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        let err = parse_date("03/05/2024", "start_date").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid arguments: start_date must be YYYY-MM-DD, got '03/05/2024'"
        );
        assert_eq!(parse_month("2024-03").unwrap(), "2024-03");
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024-3").is_err());
        assert!(parse_month("2024-03-01").is_err());
    }
}
