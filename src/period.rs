use crate::error::{AccrualError, Result};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month in `YYYYMM` integer form.
///
/// The zero value stands for a missing or unconvertible expected-receive
/// month; it compares below every real period and therefore fails every
/// range test.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct YearMonth(pub u32);

impl YearMonth {
    pub const NONE: YearMonth = YearMonth(0);

    pub fn from_parts(year: u32, month: u32) -> Self {
        YearMonth(year * 100 + month)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_parts(date.year() as u32, date.month())
    }

    /// Parses a strict `YYYYMM` string (e.g. a reporting cutoff supplied by
    /// the caller).
    pub fn parse(text: &str) -> Result<Self> {
        let value: u32 = text
            .trim()
            .parse()
            .map_err(|_| AccrualError::DateError(format!("expected YYYYMM, got '{}'", text)))?;
        let month = value % 100;
        if value < 100 || !(1..=12).contains(&month) {
            return Err(AccrualError::DateError(format!(
                "'{}' is not a valid YYYYMM period",
                text
            )));
        }
        Ok(YearMonth(value))
    }

    pub fn year(self) -> u32 {
        self.0 / 100
    }

    pub fn month(self) -> u32 {
        self.0 % 100
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

/// A delivery window extracted from an item description.
///
/// `start <= end` is not guaranteed by input; `contains` treats the pair as
/// an inclusive range regardless of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: YearMonth,
    pub end: YearMonth,
}

impl PeriodRange {
    /// Sentinel for descriptions matching none of the configured shapes.
    /// Deliberately out of the calendar domain so that no expected-receive
    /// month can ever fall inside it.
    pub const UNPARSABLE: PeriodRange = PeriodRange {
        start: YearMonth(100001),
        end: YearMonth(100002),
    };

    pub fn degenerate(period: YearMonth) -> Self {
        PeriodRange {
            start: period,
            end: period,
        }
    }

    pub fn is_unparsable(&self) -> bool {
        *self == Self::UNPARSABLE
    }

    pub fn contains(&self, period: YearMonth) -> bool {
        let lo = self.start.min(self.end);
        let hi = self.start.max(self.end);
        lo <= period && period <= hi
    }
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}

/// The four configurable description shapes, as regular-expression strings.
/// Each shape is matched as a prefix of the description.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PeriodPatterns {
    #[schemars(description = "Single year-month, e.g. '2024/05'")]
    pub year_month: String,

    #[schemars(description = "Single year-month-day, e.g. '2024/05/12'")]
    pub year_month_day: String,

    #[schemars(description = "Year-month to year-month range, e.g. '2024/05-2024/07'")]
    pub month_range: String,

    #[schemars(
        description = "Year-month-day to year-month-day range, e.g. '2024/05/01-2024/07/31'"
    )]
    pub day_range: String,
}

impl Default for PeriodPatterns {
    fn default() -> Self {
        Self {
            year_month: r"\d{4}/(0[1-9]|1[0-2])(\s|$)".to_string(),
            year_month_day: r"\d{4}/(0[1-9]|1[0-2])/(0[1-9]|[12][0-9]|3[01])(\s|$)".to_string(),
            month_range: r"\d{4}/(0[1-9]|1[0-2])-\d{4}/(0[1-9]|1[0-2])(\s|$)".to_string(),
            day_range:
                r"\d{4}/(0[1-9]|1[0-2])/(0[1-9]|[12][0-9]|3[01])-\d{4}/(0[1-9]|1[0-2])/(0[1-9]|[12][0-9]|3[01])(\s|$)"
                    .to_string(),
        }
    }
}

/// Compiled form of [`PeriodPatterns`], anchored at the start of the
/// description. Shapes are tried in priority order: single year-month or
/// year-month-day first, then the month range, then the day range.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    single: Regex,
    month_range: Regex,
    day_range: Regex,
}

impl CompiledPatterns {
    pub fn compile(patterns: &PeriodPatterns) -> Result<Self> {
        let single = format!("{}|{}", patterns.year_month, patterns.year_month_day);
        Ok(Self {
            single: anchored(&single)?,
            month_range: anchored(&patterns.month_range)?,
            day_range: anchored(&patterns.day_range)?,
        })
    }

    /// Extracts the delivery window declared at the head of a description.
    ///
    /// A missing, empty, or unrecognized description yields
    /// [`PeriodRange::UNPARSABLE`]; this function never fails.
    pub fn extract(&self, description: Option<&str>) -> PeriodRange {
        let text = match description {
            Some(text) if !text.trim().is_empty() => text,
            _ => return PeriodRange::UNPARSABLE,
        };

        if self.single.is_match(text) {
            return ym_at(text, 0)
                .map(PeriodRange::degenerate)
                .unwrap_or(PeriodRange::UNPARSABLE);
        }

        if self.month_range.is_match(text) {
            // "YYYY/MM-YYYY/MM": second period starts at byte 8
            if let (Some(start), Some(end)) = (ym_at(text, 0), ym_at(text, 8)) {
                return PeriodRange { start, end };
            }
            return PeriodRange::UNPARSABLE;
        }

        if self.day_range.is_match(text) {
            // "YYYY/MM/DD-YYYY/MM/DD": second period starts at byte 11, days
            // are discarded
            if let (Some(start), Some(end)) = (ym_at(text, 0), ym_at(text, 11)) {
                return PeriodRange { start, end };
            }
            return PeriodRange::UNPARSABLE;
        }

        PeriodRange::UNPARSABLE
    }
}

fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|source| AccrualError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Reads a "YYYY/MM" chunk at the given byte offset. Returns `None` when the
/// text is too short or the chunk does not have the expected shape, so a
/// permissive custom pattern can never cause a panic here.
fn ym_at(text: &str, offset: usize) -> Option<YearMonth> {
    let year: u32 = text.get(offset..offset + 4)?.parse().ok()?;
    if text.get(offset + 4..offset + 5)? != "/" {
        return None;
    }
    let month: u32 = text.get(offset + 5..offset + 7)?.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(YearMonth::from_parts(year, month))
}

/// Converts the textual expected-receive month (`%b-%y`, e.g. `May-24`) to a
/// [`YearMonth`]. Blank or unconvertible input coerces to [`YearMonth::NONE`],
/// which fails every subsequent range test.
pub fn parse_expected_month(text: Option<&str>) -> YearMonth {
    let trimmed = match text {
        Some(raw) => raw.trim(),
        None => return YearMonth::NONE,
    };
    if trimmed.is_empty() {
        return YearMonth::NONE;
    }
    NaiveDate::parse_from_str(&format!("01-{}", trimmed), "%d-%b-%y")
        .map(YearMonth::from_date)
        .unwrap_or(YearMonth::NONE)
}
