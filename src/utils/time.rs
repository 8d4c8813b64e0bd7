use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a string in signalnoise. Matches the keys
/// used by the `history` map and the `last_date` value.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_KEY_FORMAT)
        .with_context(|| format!("Can't parse {value:?} as a YYYY-MM-DD date"))
}

/// Returns the first day of a trailing window of `days` days that ends with `last`.
pub fn window_start(last: NaiveDate, days: u32) -> NaiveDate {
    last.checked_sub_days(Days::new(days.saturating_sub(1) as u64))
        .unwrap_or(NaiveDate::MIN)
}
