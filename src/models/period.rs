//! Period model.
//!
//! This module contains the [`Period`] type: the (year, month) pair that scopes
//! a roster and every calculation derived from it.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A validated (year, month) pair.
///
/// Periods order chronologically, which is what project deactivation and
/// sharing-edge effective windows rely on.
///
/// # Example
///
/// ```
/// use roster_cost_engine::models::Period;
///
/// let period = Period::new(2024, 2).unwrap();
/// assert_eq!(period.days_in_month(), 29);
/// assert!(Period::new(2024, 13).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawPeriod> for Period {
    type Error = EngineError;

    fn try_from(raw: RawPeriod) -> EngineResult<Self> {
        Period::new(raw.year, raw.month)
    }
}

impl Period {
    /// Creates a period, rejecting months outside 1–12 and years outside 1–9999.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::invalid(
                "month",
                format!("must be between 1 and 12, got {}", month),
            ));
        }
        if !(1..=9999).contains(&year) {
            return Err(EngineError::invalid(
                "year",
                format!("must be between 1 and 9999, got {}", year),
            ));
        }
        Ok(Self { year, month })
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The calendar month, 1–12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in this month, honoring leap years.
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        // Both dates are in chrono's supported range for validated years.
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first| first.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }

    /// Checks that `day` falls within this period.
    pub fn validate_day(&self, day: u32) -> EngineResult<()> {
        let days = self.days_in_month();
        if day == 0 || day > days {
            return Err(EngineError::invalid(
                "day",
                format!("must be between 1 and {} for {}, got {}", days, self, day),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month_regular_months() {
        assert_eq!(Period::new(2025, 1).unwrap().days_in_month(), 31);
        assert_eq!(Period::new(2025, 4).unwrap().days_in_month(), 30);
        assert_eq!(Period::new(2025, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_days_in_month_february_leap_rules() {
        assert_eq!(Period::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(Period::new(2025, 2).unwrap().days_in_month(), 28);
        assert_eq!(Period::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(Period::new(2000, 2).unwrap().days_in_month(), 29);
    }

    #[test]
    fn test_month_out_of_range_is_invalid_input() {
        for month in [0, 13] {
            match Period::new(2025, month) {
                Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "month"),
                other => panic!("Expected InvalidInput, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_validate_day_bounds() {
        let period = Period::new(2025, 4).unwrap();
        assert!(period.validate_day(1).is_ok());
        assert!(period.validate_day(30).is_ok());
        assert!(period.validate_day(0).is_err());
        assert!(period.validate_day(31).is_err());
    }

    #[test]
    fn test_periods_order_chronologically() {
        let dec = Period::new(2024, 12).unwrap();
        let jan = Period::new(2025, 1).unwrap();
        assert!(dec < jan);
    }

    #[test]
    fn test_deserialize_rejects_invalid_month() {
        let ok: Period = serde_json::from_str(r#"{"year": 2025, "month": 3}"#).unwrap();
        assert_eq!(ok.to_string(), "2025-03");

        let bad = serde_json::from_str::<Period>(r#"{"year": 2025, "month": 0}"#);
        assert!(bad.is_err());
    }
}
