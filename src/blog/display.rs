//! Read-time values derived from a blog for display.

use chrono::{DateTime, NaiveDate};

pub const DATE_PLACEHOLDER: &str = "Date not available";

const WORDS_PER_MINUTE: usize = 200;

/// Date rendering used by the list (`Short`) and the detail pane (`Long`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
  /// "Jan 1, 2024"
  Short,
  /// "January 1, 2024"
  Long,
}

/// Count non-empty whitespace-separated tokens
pub fn word_count(content: &str) -> usize {
  content.split_whitespace().count()
}

/// Estimated reading time in whole minutes, never less than one
pub fn read_minutes(content: &str) -> usize {
  word_count(content).div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Format a stored date, degrading to a placeholder when it can't be parsed
pub fn format_date(date: &str, style: DateStyle) -> String {
  let day = DateTime::parse_from_rfc3339(date)
    .map(|dt| dt.date_naive())
    .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"));

  match day {
    Ok(day) => {
      let pattern = match style {
        DateStyle::Short => "%b %-d, %Y",
        DateStyle::Long => "%B %-d, %Y",
      };
      day.format(pattern).to_string()
    }
    Err(_) => DATE_PLACEHOLDER.to_string(),
  }
}
