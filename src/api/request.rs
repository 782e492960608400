//! Request types for the Roster Cost Engine API.
//!
//! Query strings and JSON bodies are deserialized into these loosely typed
//! structures first, then converted into validated domain types so that
//! validation failures surface as engine errors with a field name.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{EntryUpdate, Period, ProjectId, ShiftCode, StaffId};

/// `?year=&month=` query parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeriodQuery {
    /// Calendar year.
    pub year: i32,
    /// Month, 1 to 12.
    pub month: u32,
}

impl PeriodQuery {
    /// Validates the pair into a [`Period`].
    pub fn period(&self) -> EngineResult<Period> {
        Period::new(self.year, self.month)
    }
}

/// `?source=&destination=` query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReciprocalQuery {
    /// Source project id.
    pub source: String,
    /// Destination project id.
    pub destination: String,
}

impl ReciprocalQuery {
    /// The (source, destination) pair as project ids.
    pub fn pair(&self) -> (ProjectId, ProjectId) {
        (
            ProjectId::new(self.source.as_str()),
            ProjectId::new(self.destination.as_str()),
        )
    }
}

/// Body of `PUT /rosters/:roster_id/entries`, and one item of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRequest {
    /// The staff member whose cell is written.
    pub staff_id: String,
    /// Day of month.
    pub day: u32,
    /// Shift code token, e.g. `"1"`, `"OFF"` or `"ข"`.
    pub shift_code: String,
    /// Optional free-text note.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<EntryRequest> for EntryUpdate {
    type Error = EngineError;

    fn try_from(req: EntryRequest) -> EngineResult<Self> {
        if req.staff_id.trim().is_empty() {
            return Err(EngineError::invalid("staff_id", "must not be empty"));
        }
        Ok(EntryUpdate {
            staff_id: StaffId::new(req.staff_id),
            day: req.day,
            shift_code: ShiftCode::from_str(&req.shift_code)?,
            notes: req.notes,
        })
    }
}

/// Body of `POST /rosters/:roster_id/entries/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntryRequest {
    /// Cells to write; applied all or nothing.
    pub entries: Vec<EntryRequest>,
}

impl BatchEntryRequest {
    /// Converts every item, failing on the first invalid one.
    pub fn into_updates(self) -> EngineResult<Vec<EntryUpdate>> {
        self.entries.into_iter().map(EntryUpdate::try_from).collect()
    }
}
