//! Project cost calculation.
//!
//! A project's original cost for a period is the sum of its staff members'
//! net salaries. Inactive staff are included so historical periods stay
//! accurate.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::config::DeductionPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{DeductionReport, DeductionTotals, Period, ProjectId, Roster, Staff, StaffId};
use crate::store::RosterStore;

use super::attendance::aggregate_attendance;
use super::cache::{AttendanceCache, CacheStamp, MonthlyAttendance};

/// Computes per-staff attendance and per-project cost from a store.
///
/// Holds only borrows, so it is cheap to build per request.
pub struct ProjectCostCalculator<'a> {
    store: &'a dyn RosterStore,
    policy: &'a DeductionPolicy,
    cache: Option<&'a AttendanceCache>,
}

impl<'a> ProjectCostCalculator<'a> {
    /// Creates a calculator without memoization.
    pub fn new(store: &'a dyn RosterStore, policy: &'a DeductionPolicy) -> Self {
        Self {
            store,
            policy,
            cache: None,
        }
    }

    /// Routes attendance lookups through `cache`.
    pub fn with_cache(mut self, cache: &'a AttendanceCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The store this calculator reads from.
    pub fn store(&self) -> &'a dyn RosterStore {
        self.store
    }

    /// Attendance for one staff member in one period.
    ///
    /// A missing roster yields zero counts with every day `off`.
    pub fn monthly_attendance(
        &self,
        staff: &Staff,
        period: Period,
    ) -> EngineResult<MonthlyAttendance> {
        // The revision is read before the entries: a write landing in between
        // leaves a stale stamp, which only costs a recomputation later.
        let roster = self.store.roster(&staff.project_id, period);
        let stamp = CacheStamp {
            revision: roster.as_ref().map(|r| r.revision),
            daily_wage: staff.daily_wage,
        };

        if let Some(cached) = self.cache.and_then(|c| c.get(&staff.id, period, stamp)) {
            return Ok(cached);
        }

        let entries = roster
            .as_ref()
            .map(|r| self.store.entries_for_staff(&r.id, &staff.id))
            .unwrap_or_default();
        let result = aggregate_attendance(staff, period, &entries, self.policy)?;
        let monthly = MonthlyAttendance::new(result, &entries);

        if let Some(cache) = self.cache {
            cache.insert(period, stamp, monthly.clone());
        }
        Ok(monthly)
    }

    /// Per-staff rows and totals for one project and period.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown project and `Inconsistent` when the
    /// project's roster holds entries for staff outside the project.
    pub fn deduction_report(
        &self,
        project_id: &ProjectId,
        period: Period,
    ) -> EngineResult<DeductionReport> {
        let project = self
            .store
            .project(project_id)
            .ok_or_else(|| EngineError::not_found("project", project_id))?;
        let staff = self.store.staff_for_project(project_id, true);

        if let Some(roster) = self.store.roster(project_id, period) {
            self.check_roster_membership(&roster, &staff)?;
        }

        let mut rows = Vec::with_capacity(staff.len());
        let mut totals = DeductionTotals::default();
        for member in &staff {
            let row = self.monthly_attendance(member, period)?.result;
            totals.add(&row);
            rows.push(row);
        }

        Ok(DeductionReport {
            project_id: project.id,
            project_name: project.name,
            period,
            staff: rows,
            totals,
        })
    }

    /// Σ staff net salary for one project and period.
    pub fn original_cost(&self, project_id: &ProjectId, period: Period) -> EngineResult<Decimal> {
        Ok(self.deduction_report(project_id, period)?.original_cost())
    }

    fn check_roster_membership(&self, roster: &Roster, staff: &[Staff]) -> EngineResult<()> {
        let members: BTreeSet<&StaffId> = staff.iter().map(|s| &s.id).collect();
        let stray = self
            .store
            .entries_for_roster(&roster.id)
            .into_iter()
            .find(|entry| !members.contains(&entry.staff_id));

        match stray {
            Some(entry) => Err(EngineError::inconsistent(format!(
                "roster {} holds an entry for staff {} who is not on project {}",
                roster.id, entry.staff_id, roster.project_id
            ))),
            None => Ok(()),
        }
    }
}
