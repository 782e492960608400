//! Core data models for the Roster Cost Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod cost_sharing;
mod ids;
mod period;
mod project;
mod report;
mod roster;
mod shift_code;
mod staff;

pub use cost_sharing::{CostSharingEdge, Percentage};
pub use ids::{ProjectId, RosterId, StaffId};
pub use period::Period;
pub use project::{Project, ProjectTheme};
pub use report::{
    AttendanceCounts, AttendanceResult, CostSharingResult, DayStats, DeductionReport,
    DeductionTotals, EngineWarning, FinancialOverview, GrandTotals, OutgoingAllocation,
    PortfolioReport, ProjectCostSummary, WarningCode,
};
pub use roster::{EntryUpdate, Roster, RosterEntry};
pub use shift_code::{DayCategory, ShiftCode};
pub use staff::Staff;
