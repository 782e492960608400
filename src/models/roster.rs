//! Roster and roster entry models.

use serde::{Deserialize, Serialize};

use super::{Period, ProjectId, RosterId, ShiftCode, StaffId};

/// The roster of one project for one period.
///
/// `revision` increases on every entry write, which lets derived attendance
/// be checked for staleness without comparing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    /// Unique identifier.
    pub id: RosterId,
    /// The project the roster belongs to.
    pub project_id: ProjectId,
    /// The period covered.
    pub period: Period,
    /// Write counter.
    pub revision: u64,
}

/// A single roster cell: one staff member on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The roster the cell belongs to.
    pub roster_id: RosterId,
    /// The rostered staff member.
    pub staff_id: StaffId,
    /// Day of month, 1-based.
    pub day: u32,
    /// The shift code recorded for the day.
    pub shift_code: ShiftCode,
    /// Optional free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A requested change to one roster cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryUpdate {
    /// The rostered staff member.
    pub staff_id: StaffId,
    /// Day of month, 1-based.
    pub day: u32,
    /// The new shift code.
    pub shift_code: ShiftCode,
    /// Optional free-text note; empty strings are stored as `None`.
    #[serde(default)]
    pub notes: Option<String>,
}

impl EntryUpdate {
    /// Turns the update into an entry of `roster_id`.
    pub fn into_entry(self, roster_id: &RosterId) -> RosterEntry {
        RosterEntry {
            roster_id: roster_id.clone(),
            staff_id: self.staff_id,
            day: self.day,
            shift_code: self.shift_code,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_notes_are_dropped() {
        let update = EntryUpdate {
            staff_id: StaffId::new("stf_1"),
            day: 3,
            shift_code: ShiftCode::Morning,
            notes: Some("   ".to_string()),
        };
        let entry = update.into_entry(&RosterId::new("rst_1"));
        assert_eq!(entry.notes, None);
        assert_eq!(entry.day, 3);
    }

    #[test]
    fn test_update_rejects_unknown_shift_code() {
        let json = r#"{"staff_id": "stf_1", "day": 4, "shift_code": "X"}"#;
        assert!(serde_json::from_str::<EntryUpdate>(json).is_err());
    }
}
