//! Portfolio aggregation.
//!
//! Runs project costing and sharing resolution over a set of projects for one
//! period. Each project's original cost is computed once per run and shared
//! between its own row and the rows of the projects it shares into.

use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{CostSharingResult, Period, PortfolioReport, Project, ProjectId};
use crate::store::RosterStore;

use super::project_cost::ProjectCostCalculator;
use super::sharing::SharingResolver;

/// Projects active in `period`, ordered by id.
pub fn active_projects(store: &dyn RosterStore, period: Period) -> Vec<Project> {
    store
        .projects()
        .into_iter()
        .filter(|p| p.is_active_in(period))
        .collect()
}

/// Original costs computed during one portfolio run.
///
/// Safe to share between worker threads.
#[derive(Debug, Default)]
pub struct OriginalCostMemo {
    costs: DashMap<ProjectId, Decimal>,
}

impl OriginalCostMemo {
    /// Creates an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized cost of `project_id`, computing it on first use.
    ///
    /// Two threads may compute the same cost concurrently; both get the same
    /// value since the computation is deterministic.
    pub fn get_or_compute<F>(&self, project_id: &ProjectId, compute: F) -> EngineResult<Decimal>
    where
        F: FnOnce() -> EngineResult<Decimal>,
    {
        if let Some(cost) = self.costs.get(project_id) {
            return Ok(*cost);
        }
        let cost = compute()?;
        self.costs.insert(project_id.clone(), cost);
        Ok(cost)
    }

    /// Number of memoized projects.
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Whether nothing has been memoized yet.
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// Costs and resolves one project as part of a portfolio run.
pub fn evaluate_project(
    costs: &ProjectCostCalculator<'_>,
    resolver: &SharingResolver<'_>,
    memo: &OriginalCostMemo,
    project_id: &ProjectId,
    period: Period,
) -> EngineResult<CostSharingResult> {
    let original_cost =
        memo.get_or_compute(project_id, || costs.original_cost(project_id, period))?;
    resolver.resolve(project_id, period, original_cost, |source| {
        memo.get_or_compute(source, || costs.original_cost(source, period))
    })
}

/// Evaluates `project_ids` in order and builds the report.
///
/// Fails on the first project that fails.
pub fn aggregate_portfolio(
    costs: &ProjectCostCalculator<'_>,
    resolver: &SharingResolver<'_>,
    project_ids: &[ProjectId],
    period: Period,
) -> EngineResult<PortfolioReport> {
    let memo = OriginalCostMemo::new();
    let results = project_ids
        .iter()
        .map(|id| evaluate_project(costs, resolver, &memo, id, period))
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(PortfolioReport::from_results(period, results))
}
