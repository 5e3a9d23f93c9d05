use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};

/// Year bound accepted when parsing filenames.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

static FULL_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[.-](\d{1,2})[.-](\d{1,2})").unwrap());
static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[.-](\d{1,2})").unwrap());
// Bare year must not sit inside a longer digit run ("20231" is not 2023)
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])(\d{4})(?:[^0-9]|$)").unwrap());

/// Calendar date parsed from a filename. Month and day are optional;
/// a present day implies a present month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl ExtractedDate {
    fn new(year: i32, month: Option<u32>, day: Option<u32>) -> Option<Self> {
        if !YEAR_RANGE.contains(&year) {
            return None;
        }
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return None;
            }
        }
        if let Some(d) = day {
            if !(1..=31).contains(&d) {
                return None;
            }
        }
        // Reject impossible calendar dates like Feb 30 up front
        NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))?;
        Some(Self { year, month, day })
    }

    /// Resolve to a concrete datetime: missing month/day default to 1,
    /// time of day is midnight. Validity is checked at construction.
    pub fn resolve(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }
}

/// Extract a date from a filename, most specific pattern first:
/// `YYYY.MM.DD` / `YYYY-MM-DD`, then `YYYY.MM` / `YYYY-MM`, then bare `YYYY`.
///
/// A matched pattern with an out-of-range component yields `None` outright
/// rather than falling back to a less specific pattern on the same name.
pub fn extract(filename: &str) -> Option<ExtractedDate> {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    if let Some(caps) = FULL_DATE_RE.captures(stem) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return ExtractedDate::new(year, Some(month), Some(day));
    }

    if let Some(caps) = YEAR_MONTH_RE.captures(stem) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        return ExtractedDate::new(year, Some(month), None);
    }

    if let Some(caps) = YEAR_RE.captures(stem) {
        let year = caps[1].parse().ok()?;
        return ExtractedDate::new(year, None, None);
    }

    None
}
