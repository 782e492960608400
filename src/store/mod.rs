//! Storage interface consumed by the engine.
//!
//! The engine never talks to a database directly; it reads projects, staff,
//! rosters, entries and sharing edges through [`RosterStore`]. [`MemoryStore`]
//! is a concurrent in-memory implementation used by the HTTP layer, tests and
//! benchmarks.

mod graph;
mod memory;

pub use graph::SharingGraph;
pub use memory::MemoryStore;

use crate::error::EngineResult;
use crate::models::{
    CostSharingEdge, Period, Project, ProjectId, Roster, RosterEntry, RosterId, Staff, StaffId,
};

/// Read and write access to roster data.
///
/// Reads return owned snapshots. Implementations must apply
/// [`RosterStore::upsert_entries`] as a single unit: either every entry is
/// written or none is.
pub trait RosterStore: Send + Sync {
    /// Looks up a project by id.
    fn project(&self, id: &ProjectId) -> Option<Project>;

    /// Every project, active or not, ordered by id.
    fn projects(&self) -> Vec<Project>;

    /// Looks up a staff member by id.
    fn staff(&self, id: &StaffId) -> Option<Staff>;

    /// Staff of a project, ordered by id.
    fn staff_for_project(&self, project_id: &ProjectId, include_inactive: bool) -> Vec<Staff>;

    /// The roster of a project for a period, if one was created.
    fn roster(&self, project_id: &ProjectId, period: Period) -> Option<Roster>;

    /// Looks up a roster by id.
    fn roster_by_id(&self, roster_id: &RosterId) -> Option<Roster>;

    /// Returns the roster of a project for a period, creating an empty one on
    /// first use.
    fn get_or_create_roster(&self, project_id: &ProjectId, period: Period)
    -> EngineResult<Roster>;

    /// Entries of one staff member in a roster, ordered by day.
    fn entries_for_staff(&self, roster_id: &RosterId, staff_id: &StaffId) -> Vec<RosterEntry>;

    /// Every entry of a roster, ordered by staff then day.
    fn entries_for_roster(&self, roster_id: &RosterId) -> Vec<RosterEntry>;

    /// Entries of a roster on one day, ordered by staff.
    fn entries_for_day(&self, roster_id: &RosterId, day: u32) -> Vec<RosterEntry>;

    /// Writes entries, replacing any existing cell with the same
    /// (roster, staff, day). All or nothing.
    fn upsert_entries(&self, entries: Vec<RosterEntry>) -> EngineResult<Vec<RosterEntry>>;

    /// Removes one cell, returning it.
    fn delete_entry(
        &self,
        roster_id: &RosterId,
        staff_id: &StaffId,
        day: u32,
    ) -> EngineResult<RosterEntry>;

    /// Edges where the project is the source.
    fn sharing_from(&self, project_id: &ProjectId) -> Vec<CostSharingEdge>;

    /// Edges where the project is the destination.
    fn sharing_to(&self, project_id: &ProjectId) -> Vec<CostSharingEdge>;

    /// The edge for an ordered (source, destination) pair.
    fn sharing_edge(&self, source: &ProjectId, destination: &ProjectId)
    -> Option<CostSharingEdge>;
}
