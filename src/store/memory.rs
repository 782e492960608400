//! Concurrent in-memory [`RosterStore`].

use std::collections::{BTreeMap, BTreeSet};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::OverAllocationPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CostSharingEdge, Period, Project, ProjectId, Roster, RosterEntry, RosterId, Staff, StaffId,
};

use super::{RosterStore, SharingGraph};

/// In-memory roster store.
///
/// Roster cells live in a sharded map keyed by (roster, staff), so writes to
/// different rows never wait on one another and a single cell write is atomic.
/// Projects, staff and sharing edges change rarely and sit behind
/// reader-writer locks.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<BTreeMap<ProjectId, Project>>,
    staff: RwLock<BTreeMap<StaffId, Staff>>,
    rosters: DashMap<RosterId, Roster>,
    roster_index: DashMap<(ProjectId, Period), RosterId>,
    entries: DashMap<(RosterId, StaffId), BTreeMap<u32, RosterEntry>>,
    sharing: RwLock<SharingGraph>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a project.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a project with the same id exists.
    pub fn add_project(&self, project: Project) -> EngineResult<()> {
        let mut projects = self.projects.write();
        if projects.contains_key(&project.id) {
            return Err(EngineError::invalid(
                "project_id",
                format!("project {} already exists", project.id),
            ));
        }
        info!(project_id = %project.id, name = %project.name, "Project added");
        projects.insert(project.id.clone(), project);
        Ok(())
    }

    /// Marks a project inactive from `from` onwards.
    pub fn deactivate_project(&self, id: &ProjectId, from: Period) -> EngineResult<()> {
        let mut projects = self.projects.write();
        let project = projects
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("project", id))?;
        project.deactivated_from = Some(from);
        info!(project_id = %id, from = %from, "Project deactivated");
        Ok(())
    }

    /// Adds a staff member to an existing project.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a non-positive wage or a duplicate id
    /// - `NotFound` if the project does not exist
    pub fn add_staff(&self, staff: Staff) -> EngineResult<()> {
        staff.validate()?;
        if !self.projects.read().contains_key(&staff.project_id) {
            return Err(EngineError::not_found("project", &staff.project_id));
        }

        let mut all_staff = self.staff.write();
        if all_staff.contains_key(&staff.id) {
            return Err(EngineError::invalid(
                "staff_id",
                format!("staff {} already exists", staff.id),
            ));
        }
        all_staff.insert(staff.id.clone(), staff);
        Ok(())
    }

    /// Marks a staff member as no longer employed. Their entries are kept.
    pub fn deactivate_staff(&self, id: &StaffId) -> EngineResult<()> {
        let mut all_staff = self.staff.write();
        let staff = all_staff
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("staff", id))?;
        staff.active = false;
        Ok(())
    }

    /// Hard-deletes a staff member who has never been rostered.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the staff member does not exist
    /// - `Inconsistent` if any roster entry references them; deactivate instead
    pub fn delete_staff(&self, id: &StaffId) -> EngineResult<Staff> {
        let mut all_staff = self.staff.write();
        if !all_staff.contains_key(id) {
            return Err(EngineError::not_found("staff", id));
        }
        let has_entries = self
            .entries
            .iter()
            .any(|row| &row.key().1 == id && !row.value().is_empty());
        if has_entries {
            return Err(EngineError::inconsistent(format!(
                "staff {} has roster entries and can only be deactivated",
                id
            )));
        }
        all_staff
            .remove(id)
            .ok_or_else(|| EngineError::not_found("staff", id))
    }

    /// Adds a sharing edge between two existing projects.
    ///
    /// # Errors
    ///
    /// - `NotFound` if either project does not exist
    /// - `InvalidInput` for the structural violations listed on
    ///   [`SharingGraph::insert`]
    pub fn add_sharing_edge(
        &self,
        edge: CostSharingEdge,
        policy: OverAllocationPolicy,
    ) -> EngineResult<()> {
        {
            let projects = self.projects.read();
            for id in [&edge.source, &edge.destination] {
                if !projects.contains_key(id) {
                    return Err(EngineError::not_found("project", id));
                }
            }
        }
        let mut graph = self.sharing.write();
        debug!(
            source = %edge.source,
            destination = %edge.destination,
            percentage = %edge.percentage,
            "Adding sharing edge"
        );
        if graph.would_create_reciprocal(&edge.source, &edge.destination) {
            warn!(
                source = %edge.source,
                destination = %edge.destination,
                "Sharing edge closes a reciprocal pair"
            );
        }
        graph.insert(edge, policy)?;
        debug!(edges = graph.len(), "Sharing graph updated");
        Ok(())
    }

    /// Removes a sharing edge.
    pub fn remove_sharing_edge(
        &self,
        source: &ProjectId,
        destination: &ProjectId,
    ) -> EngineResult<CostSharingEdge> {
        self.sharing
            .write()
            .remove(source, destination)
            .ok_or_else(|| {
                EngineError::not_found("sharing edge", format!("{source}->{destination}"))
            })
    }

    fn bump_revision(&self, roster_id: &RosterId) {
        if let Some(mut roster) = self.rosters.get_mut(roster_id) {
            roster.revision += 1;
        }
    }

    fn check_entry(
        &self,
        staff: &BTreeMap<StaffId, Staff>,
        entry: &RosterEntry,
    ) -> EngineResult<()> {
        let roster = self
            .rosters
            .get(&entry.roster_id)
            .map(|r| r.clone())
            .ok_or_else(|| EngineError::not_found("roster", &entry.roster_id))?;
        roster.period.validate_day(entry.day)?;

        let staff_project = staff
            .get(&entry.staff_id)
            .map(|s| s.project_id.clone())
            .ok_or_else(|| EngineError::not_found("staff", &entry.staff_id))?;
        if staff_project != roster.project_id {
            return Err(EngineError::inconsistent(format!(
                "staff {} belongs to project {}, not roster project {}",
                entry.staff_id, staff_project, roster.project_id
            )));
        }
        Ok(())
    }
}

impl RosterStore for MemoryStore {
    fn project(&self, id: &ProjectId) -> Option<Project> {
        self.projects.read().get(id).cloned()
    }

    fn projects(&self) -> Vec<Project> {
        self.projects.read().values().cloned().collect()
    }

    fn staff(&self, id: &StaffId) -> Option<Staff> {
        self.staff.read().get(id).cloned()
    }

    fn staff_for_project(&self, project_id: &ProjectId, include_inactive: bool) -> Vec<Staff> {
        self.staff
            .read()
            .values()
            .filter(|s| &s.project_id == project_id && (include_inactive || s.active))
            .cloned()
            .collect()
    }

    fn roster(&self, project_id: &ProjectId, period: Period) -> Option<Roster> {
        let id = self
            .roster_index
            .get(&(project_id.clone(), period))?
            .clone();
        self.roster_by_id(&id)
    }

    fn roster_by_id(&self, roster_id: &RosterId) -> Option<Roster> {
        self.rosters.get(roster_id).map(|r| r.clone())
    }

    fn get_or_create_roster(
        &self,
        project_id: &ProjectId,
        period: Period,
    ) -> EngineResult<Roster> {
        if self.project(project_id).is_none() {
            return Err(EngineError::not_found("project", project_id));
        }

        let roster_id = match self.roster_index.entry((project_id.clone(), period)) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                let roster = Roster {
                    id: RosterId::new(format!("rst_{}", Uuid::new_v4().simple())),
                    project_id: project_id.clone(),
                    period,
                    revision: 0,
                };
                debug!(
                    roster_id = %roster.id,
                    project_id = %project_id,
                    period = %period,
                    "Roster created"
                );
                self.rosters.insert(roster.id.clone(), roster.clone());
                slot.insert(roster.id.clone());
                roster.id
            }
        };

        self.roster_by_id(&roster_id)
            .ok_or_else(|| EngineError::not_found("roster", &roster_id))
    }

    fn entries_for_staff(&self, roster_id: &RosterId, staff_id: &StaffId) -> Vec<RosterEntry> {
        self.entries
            .get(&(roster_id.clone(), staff_id.clone()))
            .map(|row| row.values().cloned().collect())
            .unwrap_or_default()
    }

    fn entries_for_roster(&self, roster_id: &RosterId) -> Vec<RosterEntry> {
        let mut rows: Vec<(StaffId, Vec<RosterEntry>)> = self
            .entries
            .iter()
            .filter(|row| &row.key().0 == roster_id)
            .map(|row| (row.key().1.clone(), row.value().values().cloned().collect()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows.into_iter().flat_map(|(_, entries)| entries).collect()
    }

    fn entries_for_day(&self, roster_id: &RosterId, day: u32) -> Vec<RosterEntry> {
        let mut entries: Vec<RosterEntry> = self
            .entries
            .iter()
            .filter(|row| &row.key().0 == roster_id)
            .filter_map(|row| row.value().get(&day).cloned())
            .collect();
        entries.sort_by(|a, b| a.staff_id.cmp(&b.staff_id));
        entries
    }

    fn upsert_entries(&self, entries: Vec<RosterEntry>) -> EngineResult<Vec<RosterEntry>> {
        // Held until the writes land so a staff member cannot be deleted
        // between validation and apply.
        let staff = self.staff.read();

        // Validate everything before the first write.
        for entry in &entries {
            self.check_entry(&staff, entry)?;
        }

        let mut touched = BTreeSet::new();
        for entry in &entries {
            self.entries
                .entry((entry.roster_id.clone(), entry.staff_id.clone()))
                .or_default()
                .insert(entry.day, entry.clone());
            touched.insert(entry.roster_id.clone());
        }
        for roster_id in &touched {
            self.bump_revision(roster_id);
        }
        drop(staff);

        Ok(entries)
    }

    fn delete_entry(
        &self,
        roster_id: &RosterId,
        staff_id: &StaffId,
        day: u32,
    ) -> EngineResult<RosterEntry> {
        let removed = self
            .entries
            .get_mut(&(roster_id.clone(), staff_id.clone()))
            .and_then(|mut row| row.remove(&day))
            .ok_or_else(|| {
                EngineError::not_found("roster entry", format!("{roster_id}/{staff_id}/{day}"))
            })?;
        self.bump_revision(roster_id);
        Ok(removed)
    }

    fn sharing_from(&self, project_id: &ProjectId) -> Vec<CostSharingEdge> {
        self.sharing
            .read()
            .outgoing(project_id)
            .into_iter()
            .cloned()
            .collect()
    }

    fn sharing_to(&self, project_id: &ProjectId) -> Vec<CostSharingEdge> {
        self.sharing
            .read()
            .incoming(project_id)
            .into_iter()
            .cloned()
            .collect()
    }

    fn sharing_edge(
        &self,
        source: &ProjectId,
        destination: &ProjectId,
    ) -> Option<CostSharingEdge> {
        self.sharing.read().edge(source, destination).cloned()
    }
}
