use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};

/// Two-stage lenient date parser for externally maintained spreadsheets.
///
/// General-purpose formats are tried first (RFC 3339, ISO datetime, ISO
/// date), then the explicit `M/D/YYYY` export format. The precedence is
/// deliberate and must not be reordered: changing it would silently shift
/// historical aggregates. Failure is `None`, never an error; callers drop
/// the record from date-dependent aggregates.
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Some(date);
    }

    None
}

/// Spreadsheet exports sometimes surface dates as Unix epoch milliseconds.
pub(crate) fn date_from_epoch_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc().date())
}

/// Currency text to a number: strips symbols and separators, keeps digits,
/// `.` and `-`. Anything unparseable is 0, never an error.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// Trend bucket key, `YYYY-MM`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Short month name for trend labels.
pub fn month_label(date: NaiveDate) -> &'static str {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    MONTHS[date.month0() as usize]
}

/// First day of the month `back` months before `anchor`'s month.
pub(crate) fn month_start_back(anchor: NaiveDate, back: u32) -> NaiveDate {
    let first = anchor.with_day(1).unwrap_or(anchor);
    first
        .checked_sub_months(Months::new(back))
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_iso_and_rfc3339_dates() {
        assert_eq!(parse_date_lenient("2024-05-17"), Some(date(2024, 5, 17)));
        assert_eq!(
            parse_date_lenient("2024-05-17T09:30:00"),
            Some(date(2024, 5, 17))
        );
        assert_eq!(
            parse_date_lenient("2024-05-17T09:30:00Z"),
            Some(date(2024, 5, 17))
        );
    }

    #[test]
    fn falls_back_to_month_day_year() {
        assert_eq!(parse_date_lenient("5/7/2024"), Some(date(2024, 5, 7)));
        assert_eq!(parse_date_lenient("12/31/2023"), Some(date(2023, 12, 31)));
    }

    #[test]
    fn unparseable_dates_are_none_not_errors() {
        assert_eq!(parse_date_lenient(""), None);
        assert_eq!(parse_date_lenient("  "), None);
        assert_eq!(parse_date_lenient("last Tuesday"), None);
        assert_eq!(parse_date_lenient("31/12/2023"), None);
    }

    #[test]
    fn parse_amount_strips_currency_noise() {
        assert_eq!(parse_amount("NPR 12,500"), 12500.0);
        assert_eq!(parse_amount("  1,200.50 "), 1200.50);
        assert_eq!(parse_amount("-300"), -300.0);
    }

    #[test]
    fn parse_amount_defaults_to_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
    }

    #[test]
    fn month_helpers_agree_on_buckets() {
        let d = date(2024, 2, 29);
        assert_eq!(month_key(d), "2024-02");
        assert_eq!(month_label(d), "Feb");
        assert_eq!(month_start_back(d, 0), date(2024, 2, 1));
        assert_eq!(month_start_back(d, 3), date(2023, 11, 1));
        assert_eq!(month_start_back(d, 14), date(2022, 12, 1));
    }
}
