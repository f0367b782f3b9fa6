//! Date normalization: raw date-like substrings to canonical `YYYY-MM-DD`.
//!
//! # Strategy
//!
//! ```text
//! raw ──trim──► strict formats (whole-input, in order) ──► first valid date wins
//!                     │ none valid
//!                     ▼
//!               (a) "<day><suffix?> <month><'?><year>" anywhere
//!                     │ month unknown          │ month known, date invalid
//!                     ▼                        ▼
//!               (b) "D/M/Y <@|at> HHMM"        FAIL
//!                     │ recurse on "D/M/Y"
//!                     ▼
//!                   FAIL (None)
//! ```
//!
//! Strict field rules: day and month are 1-2 digits, `YYYY` is exactly four
//! digits (year 0 is rejected), `YY` maps to `19YY` when ≥ 69 and `20YY`
//! otherwise. Month names and literals are case-insensitive and a space
//! matches any run of whitespace. A format whose shape matches but whose
//! calendar date is invalid falls through to the next one.
//!
//! Failure is always `None`; nothing here returns an error.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const MON: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";
const MONTH: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

/// How the month field of a strict format is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MonthField {
    Numeric,
    Name,
}

/// How the year field of a strict format is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YearField {
    Four,
    Two,
}

struct StrictFormat {
    name: &'static str,
    regex: Regex,
    month: MonthField,
    year: YearField,
}

impl StrictFormat {
    fn new(name: &'static str, pattern: &str, month: MonthField, year: YearField) -> Self {
        Self {
            name,
            regex: Regex::new(&format!("(?i)^{pattern}$")).expect("valid regex"),
            month,
            year,
        }
    }

    fn apply(&self, input: &str) -> Option<NaiveDate> {
        let caps = self.regex.captures(input)?;
        let day: u32 = caps.name("d")?.as_str().parse().ok()?;
        let month = match self.month {
            MonthField::Numeric => caps.name("m")?.as_str().parse().ok()?,
            MonthField::Name => month_from_prefix(caps.name("m")?.as_str())?,
        };
        let year = match self.year {
            YearField::Four => caps.name("y")?.as_str().parse().ok()?,
            YearField::Two => pivot_two_digit_year(caps.name("y")?.as_str().parse().ok()?),
        };
        calendar_date(year, month, day)
    }
}

static STRICT_FORMATS: Lazy<Vec<StrictFormat>> = Lazy::new(|| {
    use MonthField::{Name, Numeric};
    use YearField::{Four, Two};

    let dmy = |sep: &str, year: &str| {
        format!(r"(?P<d>\d{{1,2}}){sep}(?P<m>\d{{1,2}}){sep}(?P<y>{year})")
    };
    vec![
        StrictFormat::new("DD-MM-YYYY", &dmy("-", r"\d{4}"), Numeric, Four),
        StrictFormat::new("DD/MM/YYYY", &dmy("/", r"\d{4}"), Numeric, Four),
        StrictFormat::new("DD.MM.YYYY", &dmy(r"\.", r"\d{4}"), Numeric, Four),
        StrictFormat::new("DD-MM-YY", &dmy("-", r"\d{2}"), Numeric, Two),
        StrictFormat::new("DD/MM/YY", &dmy("/", r"\d{2}"), Numeric, Two),
        StrictFormat::new("DD.MM.YY", &dmy(r"\.", r"\d{2}"), Numeric, Two),
        StrictFormat::new(
            "YYYY-MM-DD",
            r"(?P<y>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})",
            Numeric,
            Four,
        ),
        StrictFormat::new(
            "DD Mon YYYY",
            &format!(r"(?P<d>\d{{1,2}})\s+(?P<m>{MON})\s+(?P<y>\d{{4}})"),
            Name,
            Four,
        ),
        StrictFormat::new(
            "DD Month YYYY",
            &format!(r"(?P<d>\d{{1,2}})\s+(?P<m>{MONTH})\s+(?P<y>\d{{4}})"),
            Name,
            Four,
        ),
        StrictFormat::new(
            "DD Mon'YY",
            &format!(r"(?P<d>\d{{1,2}})\s+(?P<m>{MON})'(?P<y>\d{{2}})"),
            Name,
            Two,
        ),
        StrictFormat::new(
            "DDth Mon YYYY",
            &format!(r"(?P<d>\d{{1,2}})(?:st|nd|rd|th)\s+(?P<m>{MON})\s+(?P<y>\d{{4}})"),
            Name,
            Four,
        ),
    ]
});

// Recovery (a): "3rd Feb'23", "12 March 2021", found anywhere in the input.
static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)(?:st|nd|rd|th)?\s+([a-zA-Z]+)'*\s*'*(\d{2,4})").expect("valid regex")
});

// Recovery (b): "02/02/2023 @1445", "2.2.23 at 0900".
static DATE_WITH_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4})\s*[@at]*\s*\d+").expect("valid regex")
});

/// Parse a raw date-like substring into canonical `YYYY-MM-DD`.
///
/// Returns `None` when no supported form matches or the date does not exist.
///
/// ```rust
/// use dxdate::parse_date;
///
/// assert_eq!(parse_date("03-02-2023").as_deref(), Some("2023-02-03"));
/// assert_eq!(parse_date("3rd Feb'23").as_deref(), Some("2023-02-03"));
/// assert_eq!(parse_date("not a date"), None);
/// ```
#[must_use]
pub fn parse_date(raw: &str) -> Option<String> {
    parse_naive_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Like [`parse_date`], returning the calendar date itself.
#[must_use]
pub fn parse_naive_date(raw: &str) -> Option<NaiveDate> {
    let input = raw.trim();
    if input.is_empty() {
        return None;
    }

    for format in STRICT_FORMATS.iter() {
        if let Some(date) = format.apply(input) {
            log::trace!("'{}' matched {}", input, format.name);
            return Some(date);
        }
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(input) {
        if let Some(month) = month_from_prefix(&caps[2]) {
            // Known month: the outcome is final either way.
            return recover_day_month_year(&caps, month);
        }
    }

    let caps = DATE_WITH_TIME.captures(input)?;
    let date_part = caps.get(1)?.as_str();
    // The captured part is strictly shorter than the input, so this terminates.
    if date_part.len() < input.len() {
        parse_naive_date(date_part)
    } else {
        None
    }
}

fn recover_day_month_year(caps: &Captures<'_>, month: u32) -> Option<NaiveDate> {
    let day: u32 = caps[1].parse().ok()?;
    let year_text = &caps[3];
    let year: i32 = if year_text.len() == 2 {
        format!("20{year_text}").parse().ok()?
    } else {
        year_text.parse().ok()?
    };
    calendar_date(year, month, day)
}

fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn pivot_two_digit_year(yy: i32) -> i32 {
    if yy >= 69 {
        1900 + yy
    } else {
        2000 + yy
    }
}

/// Month number from the first three letters of a month name.
fn month_from_prefix(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    MON.split('|')
        .position(|m| m == prefix)
        .map(|i| i as u32 + 1)
}

/// Reference-timestamp formats, tried in order. The bool marks formats that
/// carry a time of day.
const TIMESTAMP_FORMATS: &[(&str, bool)] = &[
    ("%Y-%m-%d", false),
    ("%Y-%m-%d %H:%M:%S", true),
    ("%m/%d/%Y", false),
    ("%m/%d/%Y %H:%M:%S", true),
    ("%d-%b-%Y", false),
    ("%d %b %Y", false),
    ("%d/%m/%Y", false),
];

/// Parse a document reference timestamp.
///
/// Date-only forms resolve to midnight. US month-first forms are tried
/// before the day-first `%d/%m/%Y`, so `05/04/2025` is 4 May while
/// `14/05/2025` is 14 May.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let input = raw.trim();
    TIMESTAMP_FORMATS.iter().find_map(|(fmt, has_time)| {
        if *has_time {
            NaiveDateTime::parse_from_str(input, fmt).ok()
        } else {
            NaiveDate::parse_from_str(input, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Option<String> {
        parse_date(s)
    }

    #[test]
    fn test_numeric_day_first() {
        assert_eq!(p("03-02-2023").as_deref(), Some("2023-02-03"));
        assert_eq!(p("03/02/2023").as_deref(), Some("2023-02-03"));
        assert_eq!(p("3.2.2023").as_deref(), Some("2023-02-03"));
        assert_eq!(p("  03-02-2023 \n").as_deref(), Some("2023-02-03"));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(p("03-02-23").as_deref(), Some("2023-02-03"));
        assert_eq!(p("03/02/68").as_deref(), Some("2068-02-03"));
        assert_eq!(p("03.02.69").as_deref(), Some("1969-02-03"));
        assert_eq!(p("01/01/99").as_deref(), Some("1999-01-01"));
    }

    #[test]
    fn test_iso() {
        assert_eq!(p("2023-02-03").as_deref(), Some("2023-02-03"));
        assert_eq!(p("2023-2-3").as_deref(), Some("2023-02-03"));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(p("3 Feb 2023").as_deref(), Some("2023-02-03"));
        assert_eq!(p("3 FEB 2023").as_deref(), Some("2023-02-03"));
        assert_eq!(p("12 March 2021").as_deref(), Some("2021-03-12"));
        assert_eq!(p("3 Feb'23").as_deref(), Some("2023-02-03"));
        assert_eq!(p("1st Jan 2020").as_deref(), Some("2020-01-01"));
        assert_eq!(p("22nd Oct 2019").as_deref(), Some("2019-10-22"));
        assert_eq!(p("4th   Jul 1999").as_deref(), Some("1999-07-04"));
    }

    #[test]
    fn test_recovery_day_month_year() {
        assert_eq!(p("3rd Feb'23").as_deref(), Some("2023-02-03"));
        assert_eq!(p("seen on 5th September 2021").as_deref(), Some("2021-09-05"));
        assert_eq!(p("14 Sept 21").as_deref(), Some("2021-09-14"));
    }

    #[test]
    fn test_recovery_known_month_invalid_date_fails() {
        // Known month, impossible day: no fallback to the numeric recovery.
        assert_eq!(p("31st Feb 2023"), None);
    }

    #[test]
    fn test_recovery_date_with_time() {
        assert_eq!(p("02/02/2023 @1445").as_deref(), Some("2023-02-02"));
        assert_eq!(p("02/02/2023 at 0900").as_deref(), Some("2023-02-02"));
        assert_eq!(p("5.6.21 1200").as_deref(), Some("2021-06-05"));
    }

    #[test]
    fn test_invalid_falls_through() {
        // 31-02 fails every numeric format and both recoveries.
        assert_eq!(p("31-02-2023"), None);
        assert_eq!(p("00/00/0000"), None);
        assert_eq!(p("0000-01-01"), None);
    }

    #[test]
    fn test_garbage() {
        assert_eq!(p("not a date"), None);
        assert_eq!(p(""), None);
        assert_eq!(p("   "), None);
        assert_eq!(p("2023"), None);
        assert_eq!(p("last year"), None);
    }

    #[test]
    fn test_timestamp_formats_in_order() {
        let ts = |s: &str| parse_timestamp(s).map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string());
        assert_eq!(ts("2023-10-26").as_deref(), Some("2023-10-26 00:00:00"));
        assert_eq!(
            ts("2023-10-26 15:30:45").as_deref(),
            Some("2023-10-26 15:30:45")
        );
        assert_eq!(ts("10/26/2023").as_deref(), Some("2023-10-26 00:00:00"));
        assert_eq!(ts("26-Oct-2023").as_deref(), Some("2023-10-26 00:00:00"));
        assert_eq!(ts("26 Oct 2023").as_deref(), Some("2023-10-26 00:00:00"));
        assert_eq!(ts("14/05/2025").as_deref(), Some("2025-05-14 00:00:00"));
        assert_eq!(ts("05/04/2025").as_deref(), Some("2025-05-04 00:00:00"));
        assert_eq!(ts("yesterday"), None);
    }
}
