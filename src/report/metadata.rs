//! Match date and time detection.

use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::layout::Line;

lazy_static! {
    /// Day, month and two- or four-digit year separated by `.`, `/` or `-`
    static ref RE_DATE: Regex =
        Regex::new(r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{2})\b").unwrap();

    /// Hours and minutes separated by `:`, `h` or `,`, with an optional am/pm suffix
    static ref RE_TIME: Regex =
        Regex::new(r"(?i)\b(\d{1,2})[:h,](\d{2})(?:\s*([ap])\.?m\.?)?\b").unwrap();
}

/// Two-digit years below this pivot belong to the 2000s.
const YEAR_PIVOT: i32 = 70;

/// Date and time printed on the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchMetadata {
    /// Match date
    pub match_date: Option<NaiveDate>,
    /// Match start time (24h)
    pub match_time: Option<NaiveTime>,
}

impl MatchMetadata {
    /// Date as `YYYY-MM-DD`.
    pub fn date_string(&self) -> Option<String> {
        self.match_date.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Time as `HH:MM`.
    pub fn time_string(&self) -> Option<String> {
        self.match_time.map(|t| t.format("%H:%M").to_string())
    }

    /// Whether both date and time are known.
    pub fn is_complete(&self) -> bool {
        self.match_date.is_some() && self.match_time.is_some()
    }
}

/// Find the first valid day-month-year date in `text`.
///
/// When the month field exceeds 12 and the day field does not, the two are
/// swapped. Two-digit years below 70 map to 20xx, the rest to 19xx.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use volley_report::report::metadata::detect_match_date;
///
/// assert_eq!(detect_match_date("Date: 15/03/24"), NaiveDate::from_ymd_opt(2024, 3, 15));
/// assert_eq!(detect_match_date("03-25-2023"), NaiveDate::from_ymd_opt(2023, 3, 25));
/// assert_eq!(detect_match_date("no date here"), None);
/// ```
pub fn detect_match_date(text: &str) -> Option<NaiveDate> {
    RE_DATE.captures_iter(text).find_map(|caps| {
        let mut day: u32 = caps[1].parse().ok()?;
        let mut month: u32 = caps[2].parse().ok()?;
        let year_field = &caps[3];
        let mut year: i32 = year_field.parse().ok()?;

        if month > 12 && day <= 12 {
            std::mem::swap(&mut day, &mut month);
        }
        if year_field.len() == 2 {
            year += if year < YEAR_PIVOT { 2000 } else { 1900 };
        }

        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Find the first valid time in `text`, converted to 24h.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use volley_report::report::metadata::detect_match_time;
///
/// assert_eq!(detect_match_time("Time: 7:30pm"), NaiveTime::from_hms_opt(19, 30, 0));
/// assert_eq!(detect_match_time("20h15"), NaiveTime::from_hms_opt(20, 15, 0));
/// ```
pub fn detect_match_time(text: &str) -> Option<NaiveTime> {
    RE_TIME.captures_iter(text).find_map(|caps| {
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;

        if let Some(meridiem) = caps.get(3) {
            if !(1..=12).contains(&hour) {
                return None;
            }
            let pm = meridiem.as_str().eq_ignore_ascii_case("p");
            hour = match (pm, hour) {
                (false, 12) => 0,
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, h) => h,
            };
        }

        NaiveTime::from_hms_opt(hour, minute, 0)
    })
}

/// Scan lines top to bottom for the match date and time.
///
/// The first match of each wins; scanning stops once both are known.
pub fn detect_metadata(lines: &[Line]) -> MatchMetadata {
    let mut metadata = MatchMetadata::default();

    for line in lines {
        let text = line.text();
        if metadata.match_date.is_none() {
            metadata.match_date = detect_match_date(&text);
        }
        if metadata.match_time.is_none() {
            metadata.match_time = detect_match_time(&text);
        }
        if metadata.is_complete() {
            break;
        }
    }

    log::debug!(
        "Detected match date {:?}, time {:?}",
        metadata.match_date,
        metadata.match_time
    );
    metadata
}
