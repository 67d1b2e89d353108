//! Billing periods
//!
//! Every financial figure covers a half-open window `[start, end)`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// What a billing window was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeriodKind {
    /// Calendar month (year, month 1-12)
    Month { year: i32, month: u32 },
    /// Arbitrary window
    Range,
}

/// A billing window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    kind: PeriodKind,
}

fn first_of_month(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl BillingPeriod {
    /// Calendar month in UTC.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        let start = first_of_month(year, month)
            .ok_or_else(|| Error::Config(format!("invalid billing month {year}-{month:02}")))?;
        let end = first_of_month(next_year, next_month)
            .ok_or_else(|| Error::Config(format!("invalid billing month {year}-{month:02}")))?;

        Ok(Self {
            start,
            end,
            kind: PeriodKind::Month { year, month },
        })
    }

    /// Arbitrary window; `start` must precede `end`.
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(Error::Config(format!(
                "billing window start {start} must precede end {end}"
            )));
        }
        Ok(Self {
            start,
            end,
            kind: PeriodKind::Range,
        })
    }

    /// Parse `YYYY-MM`.
    pub fn parse_month(value: &str) -> Result<Self> {
        let invalid = || Error::Config(format!("invalid month {value:?}, expected YYYY-MM"));

        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Self::month(year, month)
    }

    /// The calendar month containing `ts`.
    pub fn month_of(ts: DateTime<Utc>) -> Self {
        let start = first_of_month(ts.year(), ts.month()).unwrap_or(ts);
        let end = ts
            .date_naive()
            .checked_add_months(chrono::Months::new(1))
            .and_then(|d| first_of_month(d.year(), d.month()))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            start,
            end,
            kind: PeriodKind::Month {
                year: ts.year(),
                month: ts.month(),
            },
        }
    }

    /// The current calendar month.
    pub fn current_month() -> Self {
        Self::month_of(Utc::now())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn kind(&self) -> PeriodKind {
        self.kind
    }

    /// Whether `ts` falls inside `[start, end)`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    pub fn display_name(&self) -> String {
        match self.kind {
            PeriodKind::Month { year, month } => {
                let month_name = match month {
                    1 => "January",
                    2 => "February",
                    3 => "March",
                    4 => "April",
                    5 => "May",
                    6 => "June",
                    7 => "July",
                    8 => "August",
                    9 => "September",
                    10 => "October",
                    11 => "November",
                    12 => "December",
                    _ => "Unknown",
                };
                format!("{} {}", month_name, year)
            }
            PeriodKind::Range => format!(
                "{} to {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_bounds() {
        let period = BillingPeriod::month(2024, 12).unwrap();
        assert_eq!(period.start(), Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(period.end(), Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(period.display_name(), "December 2024");
    }

    #[test]
    fn test_window_is_half_open() {
        let period = BillingPeriod::month(2025, 2).unwrap();
        assert!(period.contains(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()));
        assert!(period.contains(Utc.with_ymd_and_hms(2025, 2, 28, 23, 59, 59).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_parse_month() {
        let period = BillingPeriod::parse_month("2025-03").unwrap();
        assert_eq!(period.kind(), PeriodKind::Month { year: 2025, month: 3 });
        assert!(BillingPeriod::parse_month("2025-13").is_err());
        assert!(BillingPeriod::parse_month("March").is_err());
        assert!(BillingPeriod::parse_month("2025-0x").is_err());
    }

    #[test]
    fn test_range_must_be_ordered() {
        let t = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        assert!(BillingPeriod::range(t, t).is_err());
    }

    #[test]
    fn test_month_of() {
        let ts = Utc.with_ymd_and_hms(2025, 12, 17, 15, 30, 0).unwrap();
        assert_eq!(BillingPeriod::month_of(ts), BillingPeriod::month(2025, 12).unwrap());
    }
}
