//! Cost-sharing edge model.
//!
//! A [`CostSharingEdge`] says that its source project hands `percentage` of
//! its original labor cost to the destination project in every period the
//! edge applies to.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{Period, ProjectId};

/// A percentage bounded to `0..=100`.
///
/// # Example
///
/// ```
/// use roster_cost_engine::models::Percentage;
/// use rust_decimal::Decimal;
///
/// let thirty = Percentage::new(Decimal::new(30, 0)).unwrap();
/// assert_eq!(thirty.share_of(Decimal::new(10800, 0)), Decimal::new(3240, 0));
/// assert!(Percentage::new(Decimal::new(101, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage(Decimal);

impl Percentage {
    /// Validates and wraps a percentage value.
    pub fn new(value: Decimal) -> EngineResult<Self> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(EngineError::invalid(
                "percentage",
                format!("must be between 0 and 100, got {}", value),
            ));
        }
        Ok(Self(value))
    }

    /// The raw percentage value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The portion of `amount` this percentage represents.
    ///
    /// Both sides of a sharing edge use this function so shared amounts are
    /// conserved exactly.
    pub fn share_of(&self, amount: Decimal) -> Decimal {
        amount * self.0 / Decimal::ONE_HUNDRED
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = EngineError;

    fn try_from(value: Decimal) -> EngineResult<Self> {
        Percentage::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(percentage: Percentage) -> Self {
        percentage.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A directed cost-sharing relationship between two projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSharingEdge {
    /// The project sharing its cost out.
    pub source: ProjectId,
    /// The project receiving the shared cost.
    pub destination: ProjectId,
    /// Share of the source's original cost.
    pub percentage: Percentage,
    /// First period the edge applies to; open when `None`.
    #[serde(default)]
    pub effective_from: Option<Period>,
    /// Last period the edge applies to; open when `None`.
    #[serde(default)]
    pub effective_until: Option<Period>,
}

impl CostSharingEdge {
    /// Creates an edge that applies to every period.
    pub fn new(
        source: impl Into<ProjectId>,
        destination: impl Into<ProjectId>,
        percentage: Percentage,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            percentage,
            effective_from: None,
            effective_until: None,
        }
    }

    /// Checks the structural rules of a single edge.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a self-referential edge or an effective
    /// window that ends before it starts.
    pub fn validate(&self) -> EngineResult<()> {
        if self.source == self.destination {
            return Err(EngineError::invalid(
                "destination",
                format!("project {} cannot share cost with itself", self.source),
            ));
        }
        if let (Some(from), Some(until)) = (self.effective_from, self.effective_until) {
            if until < from {
                return Err(EngineError::invalid(
                    "effective_until",
                    format!("{} is before effective_from {}", until, from),
                ));
            }
        }
        Ok(())
    }

    /// Whether the edge is in force during `period`.
    pub fn applies_to(&self, period: Period) -> bool {
        self.effective_from.is_none_or(|from| period >= from)
            && self.effective_until.is_none_or(|until| period <= until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn pct(s: &str) -> Percentage {
        Percentage::new(dec(s)).unwrap()
    }

    #[test]
    fn test_percentage_bounds_are_inclusive() {
        assert!(Percentage::new(Decimal::ZERO).is_ok());
        assert!(Percentage::new(Decimal::ONE_HUNDRED).is_ok());
        assert!(Percentage::new(dec("-0.01")).is_err());
        assert!(Percentage::new(dec("100.01")).is_err());
    }

    #[test]
    fn test_share_of_scenario_amounts() {
        assert_eq!(pct("30").share_of(dec("10800")), dec("3240"));
        assert_eq!(pct("20").share_of(dec("10800")), dec("2160"));
        assert_eq!(pct("12.5").share_of(dec("1000")), dec("125"));
    }

    #[test]
    fn test_percentage_deserialize_validates_range() {
        let ok: Percentage = serde_json::from_str("\"30\"").unwrap();
        assert_eq!(ok.value(), dec("30"));
        assert!(serde_json::from_str::<Percentage>("\"150\"").is_err());
    }

    #[test]
    fn test_self_edge_is_invalid() {
        let edge = CostSharingEdge::new("prj_a", "prj_a", pct("10"));
        assert!(matches!(
            edge.validate(),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_applies_to_respects_window() {
        let mut edge = CostSharingEdge::new("prj_a", "prj_b", pct("10"));
        assert!(edge.applies_to(Period::new(2000, 1).unwrap()));

        edge.effective_from = Some(Period::new(2025, 3).unwrap());
        edge.effective_until = Some(Period::new(2025, 5).unwrap());
        assert!(edge.validate().is_ok());
        assert!(!edge.applies_to(Period::new(2025, 2).unwrap()));
        assert!(edge.applies_to(Period::new(2025, 3).unwrap()));
        assert!(edge.applies_to(Period::new(2025, 5).unwrap()));
        assert!(!edge.applies_to(Period::new(2025, 6).unwrap()));
    }

    #[test]
    fn test_inverted_window_is_invalid() {
        let mut edge = CostSharingEdge::new("prj_a", "prj_b", pct("10"));
        edge.effective_from = Some(Period::new(2025, 5).unwrap());
        edge.effective_until = Some(Period::new(2025, 3).unwrap());
        assert!(edge.validate().is_err());
    }
}
