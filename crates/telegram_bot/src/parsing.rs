use chrono::NaiveDate;

/// Format of the dates typed by the user.
pub(crate) const USER_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("invalid id")]
    InvalidId,
}

/// Parses a `dd.mm.yyyy` date.
pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(input.trim(), USER_DATE_FORMAT).map_err(|_| ParseError::InvalidDate)
}

/// Parses an amount in hryvnias. Both `.` and `,` are accepted as the
/// decimal separator.
pub(crate) fn parse_amount(input: &str) -> Result<f64, ParseError> {
    let normalized = input.trim().replace(',', ".");
    let amount: f64 = normalized.parse().map_err(|_| ParseError::InvalidAmount)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ParseError::InvalidAmount);
    }
    Ok(amount)
}

pub(crate) fn parse_id(input: &str) -> Result<i32, ParseError> {
    input.trim().parse().map_err(|_| ParseError::InvalidId)
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(USER_DATE_FORMAT).to_string()
}
