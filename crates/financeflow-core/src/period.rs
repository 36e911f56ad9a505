//! Calendar period resolution for reports

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::{Error, Result};

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPeriod {
    pub month: u32,
    pub year: i32,
}

impl MonthPeriod {
    /// Validate and build a month period
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(Error::InvalidData(format!("Year out of range: {}", year)));
        }
        Ok(Self { month, year })
    }

    /// The month containing `today`
    pub fn containing(today: NaiveDate) -> Self {
        Self {
            month: today.month(),
            year: today.year(),
        }
    }

    /// Resolve optional month/year query values, defaulting each to `today`'s
    pub fn resolve(month: Option<u32>, year: Option<i32>, today: NaiveDate) -> Result<Self> {
        let current = Self::containing(today);
        Self::new(
            month.unwrap_or(current.month),
            year.unwrap_or(current.year),
        )
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Inclusive bounds: first day 00:00:00 through last day 23:59:59 (UTC)
    pub fn range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.first_day().and_hms_opt(0, 0, 0).unwrap_or_default();
        let end = self.last_day().and_hms_opt(23, 59, 59).unwrap_or_default();
        (start.and_utc(), end.and_utc())
    }
}

impl std::fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_range_covers_whole_month() {
        let (start, end) = MonthPeriod::new(2, 2024).unwrap().range();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_december_rolls_year() {
        let period = MonthPeriod::new(12, 2024).unwrap();
        assert_eq!(
            period.last_day(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(matches!(
            MonthPeriod::new(13, 2024),
            Err(Error::InvalidData(_))
        ));
        assert!(MonthPeriod::new(0, 2024).is_err());
    }

    #[test]
    fn test_resolve_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let period = MonthPeriod::resolve(None, None, today).unwrap();
        assert_eq!(period, MonthPeriod { month: 3, year: 2025 });

        let period = MonthPeriod::resolve(Some(1), None, today).unwrap();
        assert_eq!(period.to_string(), "2025-01");
    }
}
