//! Configuration types for the cost engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every section has a
//! default so a partial file is valid.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// How much is deducted for one absent day.
///
/// Written in YAML as `{ mode: daily_wage }` or `{ mode: fixed, amount: "300" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "amount")]
pub enum AbsenceRate {
    /// Deduct the staff member's own daily wage.
    DailyWage,
    /// Deduct a fixed amount regardless of wage.
    Fixed(Decimal),
}

/// Per-category deduction rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeductionPolicy {
    /// Deduction per absent day.
    pub absence: AbsenceRate,
    /// Deduction per late day.
    pub late_rate: Decimal,
}

impl Default for DeductionPolicy {
    fn default() -> Self {
        Self {
            absence: AbsenceRate::DailyWage,
            late_rate: Decimal::ZERO,
        }
    }
}

impl DeductionPolicy {
    /// The deduction for one absent day of a staff member earning `daily_wage`.
    pub fn absence_amount(&self, daily_wage: Decimal) -> Decimal {
        match self.absence {
            AbsenceRate::DailyWage => daily_wage,
            AbsenceRate::Fixed(amount) => amount,
        }
    }
}

/// What to do when a project's outgoing percentages sum above 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverAllocationPolicy {
    /// Allow it and attach a warning to results.
    #[default]
    Warn,
    /// Refuse edges that cause it and fail resolution if stored data has it.
    Reject,
}

/// Cost-sharing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SharingConfig {
    /// Policy for outgoing totals above 100%.
    pub over_allocation: OverAllocationPolicy,
}

/// Portfolio evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Upper bound on projects evaluated at once.
    pub max_workers: usize,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self { max_workers: 4 }
    }
}

/// Attendance memoization settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether attendance results are memoized.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deduction rules.
    pub deductions: DeductionPolicy,
    /// Cost-sharing rules.
    pub sharing: SharingConfig,
    /// Portfolio worker pool.
    pub portfolio: PortfolioConfig,
    /// Attendance cache.
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Checks the values serde cannot rule out on its own.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the offending key when
    /// `portfolio.max_workers` is zero or a deduction amount is negative.
    pub fn validate(&self) -> EngineResult<()> {
        if self.portfolio.max_workers == 0 {
            return Err(EngineError::invalid(
                "portfolio.max_workers",
                "must be at least 1",
            ));
        }
        if self.deductions.late_rate < Decimal::ZERO {
            return Err(EngineError::invalid(
                "deductions.late_rate",
                format!("must not be negative, got {}", self.deductions.late_rate),
            ));
        }
        if let AbsenceRate::Fixed(amount) = self.deductions.absence {
            if amount < Decimal::ZERO {
                return Err(EngineError::invalid(
                    "deductions.absence.amount",
                    format!("must not be negative, got {}", amount),
                ));
            }
        }
        Ok(())
    }
}
