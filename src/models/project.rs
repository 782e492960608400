//! Project model.

use serde::{Deserialize, Serialize};

use super::{Period, ProjectId};

/// Presentation metadata for a project. Never read by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTheme {
    /// Primary color, e.g. `"#0f766e"`.
    pub primary_color: Option<String>,
    /// Logo URL.
    pub logo_url: Option<String>,
}

/// A building-management project whose labor cost the engine computes.
///
/// Projects are soft-deactivated: `deactivated_from` is the first period in
/// which the project no longer counts as active. Reports for earlier periods
/// stay computable.
///
/// # Example
///
/// ```
/// use roster_cost_engine::models::{Period, Project};
///
/// let mut project = Project::new("prj_a", "Riverside Condo");
/// project.deactivated_from = Some(Period::new(2025, 6).unwrap());
///
/// assert!(!project.is_active());
/// assert!(project.is_active_in(Period::new(2025, 5).unwrap()));
/// assert!(!project.is_active_in(Period::new(2025, 6).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Presentation-only theme.
    #[serde(default)]
    pub theme: ProjectTheme,
    /// First period in which the project is inactive, if deactivated.
    #[serde(default)]
    pub deactivated_from: Option<Period>,
}

impl Project {
    /// Creates an active project with no theme.
    pub fn new(id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            theme: ProjectTheme::default(),
            deactivated_from: None,
        }
    }

    /// Whether the project is currently active.
    pub fn is_active(&self) -> bool {
        self.deactivated_from.is_none()
    }

    /// Whether the project was active during `period`.
    pub fn is_active_in(&self, period: Period) -> bool {
        match self.deactivated_from {
            Some(from) => period < from,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_is_active_everywhere() {
        let project = Project::new("prj_a", "A");
        assert!(project.is_active());
        assert!(project.is_active_in(Period::new(1990, 1).unwrap()));
        assert!(project.is_active_in(Period::new(2090, 12).unwrap()));
    }

    #[test]
    fn test_deactivation_boundary_is_exclusive() {
        let mut project = Project::new("prj_a", "A");
        project.deactivated_from = Some(Period::new(2025, 1).unwrap());
        assert!(project.is_active_in(Period::new(2024, 12).unwrap()));
        assert!(!project.is_active_in(Period::new(2025, 1).unwrap()));
        assert!(!project.is_active_in(Period::new(2025, 2).unwrap()));
    }
}
