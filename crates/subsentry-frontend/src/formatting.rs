use chrono::{DateTime, NaiveDate};

/// Display format for renewal dates, e.g. `Oct 20, 2026`.
const DATE_FORMAT: &str = "%b %-d, %Y";

/// Parses a renewal date as sent by the service.
///
/// Accepts RFC 3339 date-times (the calendar date is taken in the offset the
/// value was written in) as well as plain `YYYY-MM-DD` dates, optionally
/// followed by a time part.
pub fn parse_renewal_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// Formats a renewal date for display. Unparseable input is shown verbatim.
pub fn format_date(raw: &str) -> String {
    match parse_renewal_date(raw) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Whole days from `today` to the renewal. Negative when overdue.
pub fn days_until_renewal(raw: &str, today: NaiveDate) -> Option<i64> {
    parse_renewal_date(raw).map(|date| (date - today).num_days())
}

/// A renewal is urgent when it is due today or within `within_days`.
/// Overdue and unparseable dates are never urgent.
pub fn is_urgent_renewal(raw: &str, today: NaiveDate, within_days: i64) -> bool {
    days_until_renewal(raw, today).is_some_and(|days| (0..=within_days).contains(&days))
}

/// Short relative label for a renewal: `Overdue`, `in 0d`, `in 12d`.
pub fn format_days_left(days: Option<i64>) -> Option<String> {
    match days? {
        days if days < 0 => Some("Overdue".to_string()),
        days => Some(format!("in {days}d")),
    }
}

/// Formats a subscription price, e.g. `12.99 USD`.
pub fn format_price(amount: Option<f64>, currency: Option<&str>) -> Option<String> {
    let amount = amount?;
    Some(match currency.map(str::trim).filter(|c| !c.is_empty()) {
        Some(currency) => format!("{amount:.2} {currency}"),
        None => format!("{amount:.2}"),
    })
}
