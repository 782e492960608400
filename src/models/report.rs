//! Calculation result models.
//!
//! This module contains the structured outputs of the engine: per-staff
//! attendance, per-project deduction reports, cost-sharing breakdowns and the
//! consolidated portfolio report. Serialization of these into CSV, PDF or
//! screens is left to callers.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Period, ProjectId, ShiftCode, StaffId};

/// The kind of a non-fatal finding attached to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    /// Two projects share cost with each other in both directions.
    ReciprocalSharing,
    /// A project shares out more than 100% of its cost in total.
    OverAllocated,
}

/// A warning raised during calculation.
///
/// Warnings never stop a calculation; the caller decides whether to act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineWarning {
    /// A code identifying the type of warning.
    pub code: WarningCode,
    /// A human-readable description of the warning.
    pub message: String,
}

/// Day counts for one staff member in one period.
///
/// `worked + off + absent + sick_leave + personal_leave + vacation` always
/// equals the number of days in the period; unrecorded days count as `off`.
/// `late` is a subset of `worked`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCounts {
    /// Days on any on-duty shift, late days included.
    pub worked: u32,
    /// Scheduled days off, unrecorded days included.
    pub off: u32,
    /// Unexcused absences.
    pub absent: u32,
    /// Sick leave days.
    pub sick_leave: u32,
    /// Personal leave days.
    pub personal_leave: u32,
    /// Vacation days.
    pub vacation: u32,
    /// Worked days on which the staff member was late.
    pub late: u32,
    /// Days with no roster entry.
    pub unrecorded: u32,
}

impl AttendanceCounts {
    /// Sum of the partitioning categories.
    pub fn classified_days(&self) -> u32 {
        self.worked + self.off + self.absent + self.sick_leave + self.personal_leave + self.vacation
    }
}

/// Attendance and salary for one staff member in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceResult {
    /// The staff member.
    pub staff_id: StaffId,
    /// Staff display name.
    pub staff_name: String,
    /// Staff position.
    pub position: String,
    /// The staff member's project.
    pub project_id: ProjectId,
    /// The period covered.
    pub period: Period,
    /// Wage per worked day.
    pub daily_wage: Decimal,
    /// Day counts.
    pub counts: AttendanceCounts,
    /// `worked × daily_wage`.
    pub expected_salary: Decimal,
    /// Deduction applied, never more than `expected_salary`.
    pub deduction_amount: Decimal,
    /// `expected_salary − deduction_amount`; never negative.
    pub net_salary: Decimal,
    /// Whether the policy deduction exceeded the expected salary and was capped.
    pub deduction_clamped: bool,
}

/// Summed attendance figures across a project's staff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionTotals {
    /// Total worked days.
    pub worked: u32,
    /// Total absences.
    pub absent: u32,
    /// Total sick leave days.
    pub sick_leave: u32,
    /// Total personal leave days.
    pub personal_leave: u32,
    /// Total vacation days.
    pub vacation: u32,
    /// Total late days.
    pub late: u32,
    /// Total deductions.
    pub deduction: Decimal,
    /// Total expected salary.
    pub expected_salary: Decimal,
    /// Total net salary; equals the project's original cost.
    pub net_salary: Decimal,
}

impl DeductionTotals {
    /// Adds one staff member's figures.
    pub fn add(&mut self, row: &AttendanceResult) {
        self.worked += row.counts.worked;
        self.absent += row.counts.absent;
        self.sick_leave += row.counts.sick_leave;
        self.personal_leave += row.counts.personal_leave;
        self.vacation += row.counts.vacation;
        self.late += row.counts.late;
        self.deduction += row.deduction_amount;
        self.expected_salary += row.expected_salary;
        self.net_salary += row.net_salary;
    }
}

/// Monthly deduction report for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionReport {
    /// The project.
    pub project_id: ProjectId,
    /// Project display name.
    pub project_name: String,
    /// The period covered.
    pub period: Period,
    /// One row per staff member of the project.
    pub staff: Vec<AttendanceResult>,
    /// Column totals.
    pub totals: DeductionTotals,
}

impl DeductionReport {
    /// The project's original cost: the sum of staff net salaries.
    pub fn original_cost(&self) -> Decimal {
        self.totals.net_salary
    }
}

/// Cost of one project for one period before and after sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSharingResult {
    /// The project.
    pub project_id: ProjectId,
    /// Project display name.
    pub project_name: String,
    /// Cost before sharing.
    pub original_cost: Decimal,
    /// Cost handed to other projects.
    pub shared_out: Decimal,
    /// Cost received from other projects.
    pub shared_in: Decimal,
    /// `original_cost − shared_out + shared_in`.
    pub net_cost: Decimal,
    /// Non-fatal findings such as reciprocal sharing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<EngineWarning>,
}

/// Sums of each cost field across a portfolio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrandTotals {
    /// Σ original cost.
    pub original_cost: Decimal,
    /// Σ shared out.
    pub shared_out: Decimal,
    /// Σ shared in.
    pub shared_in: Decimal,
    /// Σ net cost.
    pub net_cost: Decimal,
}

impl GrandTotals {
    /// Adds one project's figures.
    pub fn add(&mut self, result: &CostSharingResult) {
        self.original_cost += result.original_cost;
        self.shared_out += result.shared_out;
        self.shared_in += result.shared_in;
        self.net_cost += result.net_cost;
    }
}

/// Consolidated multi-project cost report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioReport {
    /// The period covered.
    pub period: Period,
    /// One row per evaluated project.
    pub projects: Vec<CostSharingResult>,
    /// Column totals.
    pub grand_totals: GrandTotals,
}

impl PortfolioReport {
    /// Builds the report and its grand totals from per-project rows.
    pub fn from_results(period: Period, projects: Vec<CostSharingResult>) -> Self {
        let mut grand_totals = GrandTotals::default();
        for result in &projects {
            grand_totals.add(result);
        }
        Self {
            period,
            projects,
            grand_totals,
        }
    }

    /// Whether shared cost is conserved: Σ shared out equals Σ shared in.
    ///
    /// Holds whenever every project referenced by an edge is in the report.
    pub fn is_balanced(&self) -> bool {
        self.grand_totals.shared_out == self.grand_totals.shared_in
    }
}

/// Total outgoing share of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingAllocation {
    /// The source project.
    pub project_id: ProjectId,
    /// Σ percentage over the project's outgoing edges.
    pub total_percentage: Decimal,
    /// Number of outgoing edges.
    pub edge_count: usize,
    /// Whether the total exceeds 100%.
    pub over_allocated: bool,
}

/// One row of the financial overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCostSummary {
    /// The project.
    pub project_id: ProjectId,
    /// Project display name.
    pub project_name: String,
    /// Number of currently active staff.
    pub staff_count: usize,
    /// Original cost for the period.
    pub total_cost: Decimal,
}

/// Labor cost of every active project, before sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialOverview {
    /// The period covered.
    pub period: Period,
    /// One row per active project.
    pub projects: Vec<ProjectCostSummary>,
    /// Σ total cost.
    pub grand_total: Decimal,
    /// Number of projects in the overview.
    pub project_count: usize,
}

/// Head counts for one roster day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    /// Day of month.
    pub day: u32,
    /// Number of recorded entries.
    pub total: u32,
    /// Staff on duty.
    pub working: u32,
    /// Staff off.
    pub off: u32,
    /// Staff absent.
    pub absent: u32,
    /// Staff on sick leave.
    pub sick_leave: u32,
    /// Staff on personal leave.
    pub personal_leave: u32,
    /// Staff on vacation.
    pub vacation: u32,
    /// Entry count per shift code.
    pub by_shift: BTreeMap<ShiftCode, u32>,
}
