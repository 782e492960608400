//! Calculation logic for the Roster Cost Engine.
//!
//! This module contains the attendance aggregation that turns shift codes
//! into day counts and salary, per-project cost and deduction reports,
//! cost-sharing resolution between projects, portfolio aggregation, and the
//! monthly attendance cache.

mod attendance;
mod cache;
mod portfolio;
mod project_cost;
mod sharing;

pub use attendance::{aggregate_attendance, clamp_deduction, count_days, summarize_day};
pub use cache::{AttendanceCache, CacheStamp, CacheStats, MonthlyAttendance};
pub use portfolio::{OriginalCostMemo, active_projects, aggregate_portfolio, evaluate_project};
pub use project_cost::ProjectCostCalculator;
pub use sharing::{SharingResolver, outgoing_allocation};
