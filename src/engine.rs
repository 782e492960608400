//! The engine facade.
//!
//! [`CostEngine`] ties a [`RosterStore`] to the engine configuration and the
//! attendance cache, and exposes every calculation, report and roster write
//! as a single method.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::calculation::{
    AttendanceCache, CacheStats, MonthlyAttendance, OriginalCostMemo, ProjectCostCalculator,
    SharingResolver, active_projects, aggregate_portfolio, evaluate_project, outgoing_allocation,
    summarize_day,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceResult, CostSharingResult, DayStats, DeductionReport, EntryUpdate,
    FinancialOverview, OutgoingAllocation, Period, PortfolioReport, ProjectCostSummary, ProjectId,
    Roster, RosterEntry, RosterId, StaffId,
};
use crate::store::RosterStore;

/// Roster cost and payroll deduction engine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use roster_cost_engine::config::EngineConfig;
/// use roster_cost_engine::engine::CostEngine;
/// use roster_cost_engine::models::{Period, Project, ProjectId};
/// use roster_cost_engine::store::MemoryStore;
/// use rust_decimal::Decimal;
///
/// let store = MemoryStore::new();
/// store.add_project(Project::new("prj_a", "Tower A")).unwrap();
///
/// let engine = CostEngine::new(Arc::new(store), EngineConfig::default()).unwrap();
/// let period = Period::new(2025, 1).unwrap();
/// let cost = engine.compute_project_cost(&ProjectId::new("prj_a"), period).unwrap();
/// assert_eq!(cost, Decimal::ZERO);
/// ```
pub struct CostEngine {
    store: Arc<dyn RosterStore>,
    config: EngineConfig,
    cache: AttendanceCache,
}

impl CostEngine {
    /// Creates an engine over `store`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `config` fails [`EngineConfig::validate`].
    pub fn new(store: Arc<dyn RosterStore>, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            cache: AttendanceCache::new(),
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &dyn RosterStore {
        self.store.as_ref()
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Attendance cache hit and miss counts.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn costs(&self) -> ProjectCostCalculator<'_> {
        let calculator = ProjectCostCalculator::new(self.store.as_ref(), &self.config.deductions);
        if self.config.cache.enabled {
            calculator.with_cache(&self.cache)
        } else {
            calculator
        }
    }

    fn resolver(&self) -> SharingResolver<'_> {
        SharingResolver::new(self.store.as_ref(), self.config.sharing.over_allocation)
    }

    // ---------------------------------------------------------------------
    // Calculations
    // ---------------------------------------------------------------------

    /// Attendance and salary for one staff member in one period.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown staff member. A missing roster is not
    /// an error; every day then counts as off.
    pub fn compute_attendance(
        &self,
        staff_id: &StaffId,
        period: Period,
    ) -> EngineResult<AttendanceResult> {
        Ok(self.monthly_attendance(staff_id, period)?.result)
    }

    /// Like [`CostEngine::compute_attendance`], with the remark built from
    /// entry notes.
    pub fn monthly_attendance(
        &self,
        staff_id: &StaffId,
        period: Period,
    ) -> EngineResult<MonthlyAttendance> {
        let staff = self
            .store
            .staff(staff_id)
            .ok_or_else(|| EngineError::not_found("staff", staff_id))?;
        let monthly = self.costs().monthly_attendance(&staff, period)?;
        debug!(
            staff_id = %staff_id,
            period = %period,
            worked = monthly.result.counts.worked,
            net_salary = %monthly.result.net_salary,
            "Attendance computed"
        );
        Ok(monthly)
    }

    /// A project's original cost: Σ staff net salary for the period.
    pub fn compute_project_cost(
        &self,
        project_id: &ProjectId,
        period: Period,
    ) -> EngineResult<Decimal> {
        let start = Instant::now();
        let cost = self.costs().original_cost(project_id, period)?;
        info!(
            project_id = %project_id,
            period = %period,
            original_cost = %cost,
            duration_us = start.elapsed().as_micros(),
            "Project cost computed"
        );
        Ok(cost)
    }

    /// Resolves sharing for a project whose original cost is already known.
    ///
    /// The original cost of every project sharing into this one is computed
    /// independently.
    pub fn compute_cost_sharing(
        &self,
        project_id: &ProjectId,
        period: Period,
        original_cost: Decimal,
    ) -> EngineResult<CostSharingResult> {
        let costs = self.costs();
        let result = self.resolver().resolve(project_id, period, original_cost, |source| {
            costs.original_cost(source, period)
        })?;
        self.log_warnings(&result);
        Ok(result)
    }

    /// Computes the original cost, then resolves sharing.
    pub fn compute_project_sharing(
        &self,
        project_id: &ProjectId,
        period: Period,
    ) -> EngineResult<CostSharingResult> {
        let original_cost = self.compute_project_cost(project_id, period)?;
        self.compute_cost_sharing(project_id, period, original_cost)
    }

    /// Portfolio report over every project active in `period`.
    pub fn compute_portfolio(&self, period: Period) -> EngineResult<PortfolioReport> {
        let ids = self.active_project_ids(period);
        self.compute_portfolio_for(period, &ids)
    }

    /// Portfolio report over an explicit set of projects, in the given order.
    ///
    /// The report is only balanced when every project referenced by an edge
    /// is included.
    pub fn compute_portfolio_for(
        &self,
        period: Period,
        project_ids: &[ProjectId],
    ) -> EngineResult<PortfolioReport> {
        let start = Instant::now();
        let report = aggregate_portfolio(&self.costs(), &self.resolver(), project_ids, period)?;
        report.projects.iter().for_each(|r| self.log_warnings(r));
        self.log_portfolio(&report, start);
        Ok(report)
    }

    /// Portfolio report over every project active in `period`, evaluating up
    /// to `portfolio.max_workers` projects at a time on the blocking pool.
    ///
    /// Rows come back in the same order as [`CostEngine::compute_portfolio`].
    pub async fn compute_portfolio_concurrent(
        self: &Arc<Self>,
        period: Period,
    ) -> EngineResult<PortfolioReport> {
        let start = Instant::now();
        let ids = self.active_project_ids(period);
        let memo = Arc::new(OriginalCostMemo::new());
        let semaphore = Arc::new(Semaphore::new(self.config.portfolio.max_workers));
        let mut tasks = JoinSet::new();

        for (index, project_id) in ids.iter().cloned().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| EngineError::inconsistent(format!("worker pool closed: {e}")))?;
            let engine = Arc::clone(self);
            let memo = Arc::clone(&memo);
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let result = evaluate_project(
                    &engine.costs(),
                    &engine.resolver(),
                    &memo,
                    &project_id,
                    period,
                );
                (index, result)
            });
        }

        let mut rows: Vec<Option<CostSharingResult>> = vec![None; ids.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined
                .map_err(|e| EngineError::inconsistent(format!("portfolio worker failed: {e}")))?;
            rows[index] = Some(result?);
        }

        let report = PortfolioReport::from_results(period, rows.into_iter().flatten().collect());
        report.projects.iter().for_each(|r| self.log_warnings(r));
        self.log_portfolio(&report, start);
        Ok(report)
    }

    /// Whether edges exist in both directions between `source` and
    /// `destination`. Symmetric in its arguments.
    pub fn has_reciprocal_sharing(&self, source: &ProjectId, destination: &ProjectId) -> bool {
        self.store.sharing_edge(source, destination).is_some()
            && self.store.sharing_edge(destination, source).is_some()
    }

    /// Total outgoing percentage of a project over the edges in force in
    /// `period`.
    pub fn outgoing_allocation(
        &self,
        project_id: &ProjectId,
        period: Period,
    ) -> EngineResult<OutgoingAllocation> {
        if self.store.project(project_id).is_none() {
            return Err(EngineError::not_found("project", project_id));
        }
        let edges: Vec<_> = self
            .store
            .sharing_from(project_id)
            .into_iter()
            .filter(|edge| edge.applies_to(period))
            .collect();
        Ok(outgoing_allocation(project_id, &edges))
    }

    // ---------------------------------------------------------------------
    // Reports
    // ---------------------------------------------------------------------

    /// Per-staff deduction report with totals.
    pub fn project_deduction_report(
        &self,
        project_id: &ProjectId,
        period: Period,
    ) -> EngineResult<DeductionReport> {
        let report = self.costs().deduction_report(project_id, period)?;
        info!(
            project_id = %project_id,
            period = %period,
            staff_count = report.staff.len(),
            total_deduction = %report.totals.deduction,
            "Deduction report built"
        );
        Ok(report)
    }

    /// Original cost and active head count of every project active in
    /// `period`.
    pub fn financial_overview(&self, period: Period) -> EngineResult<FinancialOverview> {
        let costs = self.costs();
        let mut projects = Vec::new();
        let mut grand_total = Decimal::ZERO;

        for project in active_projects(self.store.as_ref(), period) {
            let total_cost = costs.original_cost(&project.id, period)?;
            grand_total += total_cost;
            projects.push(ProjectCostSummary {
                staff_count: self.store.staff_for_project(&project.id, false).len(),
                project_id: project.id,
                project_name: project.name,
                total_cost,
            });
        }

        Ok(FinancialOverview {
            period,
            project_count: projects.len(),
            projects,
            grand_total,
        })
    }

    /// Head counts for one day of a roster.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown roster and `InvalidInput` for a day
    /// outside the roster's period.
    pub fn roster_day_stats(&self, roster_id: &RosterId, day: u32) -> EngineResult<DayStats> {
        let roster = self.require_roster(roster_id)?;
        roster.period.validate_day(day)?;
        Ok(summarize_day(day, &self.store.entries_for_day(roster_id, day)))
    }

    // ---------------------------------------------------------------------
    // Roster writes
    // ---------------------------------------------------------------------

    /// Returns the roster of a project for a period, creating it if needed.
    pub fn get_or_create_roster(
        &self,
        project_id: &ProjectId,
        period: Period,
    ) -> EngineResult<Roster> {
        self.store.get_or_create_roster(project_id, period)
    }

    /// Writes one roster cell. The last write to a cell wins.
    pub fn update_entry(
        &self,
        roster_id: &RosterId,
        update: EntryUpdate,
    ) -> EngineResult<RosterEntry> {
        let mut written = self.write_entries(roster_id, vec![update])?;
        written
            .pop()
            .ok_or_else(|| EngineError::inconsistent("store returned no written entry"))
    }

    /// Writes several roster cells as one unit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty batch. If any item fails
    /// validation nothing is written.
    pub fn batch_update_entries(
        &self,
        roster_id: &RosterId,
        updates: Vec<EntryUpdate>,
    ) -> EngineResult<Vec<RosterEntry>> {
        if updates.is_empty() {
            return Err(EngineError::invalid(
                "entries",
                "batch must contain at least one entry",
            ));
        }
        self.write_entries(roster_id, updates)
    }

    /// Removes one roster cell.
    pub fn delete_entry(
        &self,
        roster_id: &RosterId,
        staff_id: &StaffId,
        day: u32,
    ) -> EngineResult<RosterEntry> {
        let removed = self.store.delete_entry(roster_id, staff_id, day)?;
        info!(roster_id = %roster_id, staff_id = %staff_id, day, "Roster entry deleted");
        Ok(removed)
    }

    fn write_entries(
        &self,
        roster_id: &RosterId,
        updates: Vec<EntryUpdate>,
    ) -> EngineResult<Vec<RosterEntry>> {
        let roster = self.require_roster(roster_id)?;
        for update in &updates {
            roster.period.validate_day(update.day)?;
        }

        let count = updates.len();
        let entries = updates
            .into_iter()
            .map(|update| update.into_entry(roster_id))
            .collect();
        let written = self.store.upsert_entries(entries)?;
        info!(
            roster_id = %roster_id,
            project_id = %roster.project_id,
            period = %roster.period,
            entries = count,
            "Roster entries written"
        );
        Ok(written)
    }

    fn require_roster(&self, roster_id: &RosterId) -> EngineResult<Roster> {
        self.store
            .roster_by_id(roster_id)
            .ok_or_else(|| EngineError::not_found("roster", roster_id))
    }

    fn active_project_ids(&self, period: Period) -> Vec<ProjectId> {
        active_projects(self.store.as_ref(), period)
            .into_iter()
            .map(|p| p.id)
            .collect()
    }

    fn log_warnings(&self, result: &CostSharingResult) {
        for warning in &result.warnings {
            warn!(
                project_id = %result.project_id,
                code = ?warning.code,
                "{}",
                warning.message
            );
        }
    }

    fn log_portfolio(&self, report: &PortfolioReport, start: Instant) {
        info!(
            period = %report.period,
            projects = report.projects.len(),
            original_cost = %report.grand_totals.original_cost,
            net_cost = %report.grand_totals.net_cost,
            balanced = report.is_balanced(),
            duration_us = start.elapsed().as_micros(),
            "Portfolio computed"
        );
    }
}
