//! Staff model.
//!
//! This module defines the [`Staff`] struct for representing workers rostered
//! on a project.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{ProjectId, ShiftCode, StaffId};

/// A staff member belonging to exactly one project.
///
/// Staff who leave are deactivated rather than deleted so past attendance
/// and cost stay reconstructible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    /// Unique identifier for the staff member.
    pub id: StaffId,
    /// The owning project.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Job position (e.g., "security", "housekeeping").
    #[serde(default)]
    pub position: String,
    /// Wage paid per worked day. Must be positive.
    pub daily_wage: Decimal,
    /// Whether the staff member is currently employed on the project.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Shift code the roster grid pre-fills for this staff member.
    #[serde(default = "default_shift")]
    pub default_shift: ShiftCode,
}

fn default_active() -> bool {
    true
}

fn default_shift() -> ShiftCode {
    ShiftCode::Off
}

impl Staff {
    /// Creates an active staff member with `OFF` as default shift.
    pub fn new(
        id: impl Into<StaffId>,
        project_id: impl Into<ProjectId>,
        name: impl Into<String>,
        daily_wage: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            name: name.into(),
            position: String::new(),
            daily_wage,
            active: true,
            default_shift: ShiftCode::Off,
        }
    }

    /// Checks the fields the engine depends on.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the daily wage is zero or negative.
    pub fn validate(&self) -> EngineResult<()> {
        if self.daily_wage <= Decimal::ZERO {
            return Err(EngineError::invalid(
                "daily_wage",
                format!(
                    "must be positive for staff {}, got {}",
                    self.id, self.daily_wage
                ),
            ));
        }
        Ok(())
    }
}
