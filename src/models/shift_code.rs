//! Shift codes and day categories.
//!
//! A roster cell holds one [`ShiftCode`] from a closed vocabulary. Every code
//! maps to exactly one [`DayCategory`], which is what attendance counting and
//! cost use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A roster shift code.
///
/// Serialized as its roster token (`"1"`, `"ดึก"`, `"OFF"`, ...). Parsing an
/// unknown token fails with `InvalidInput`; it is never treated as `OFF`.
///
/// # Example
///
/// ```
/// use roster_cost_engine::models::{DayCategory, ShiftCode};
///
/// let code: ShiftCode = "ดึก".parse().unwrap();
/// assert_eq!(code, ShiftCode::Night);
/// assert_eq!(code.category(), DayCategory::Worked);
/// assert!("X".parse::<ShiftCode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ShiftCode {
    /// First (morning) shift, token `1`.
    Morning,
    /// Second (afternoon) shift, token `2`.
    Afternoon,
    /// Third (evening) shift, token `3`.
    Evening,
    /// Night shift, token `ดึก`.
    Night,
    /// On duty but late, token `สาย`.
    Late,
    /// Scheduled non-work day, token `OFF`.
    Off,
    /// Unexcused absence, token `ข`.
    Absent,
    /// Sick leave, token `ป`.
    SickLeave,
    /// Personal leave, token `ก`.
    PersonalLeave,
    /// Vacation, token `พ`.
    Vacation,
}

/// The category a day is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCategory {
    /// Paid working day.
    Worked,
    /// Scheduled day off; no cost impact.
    Off,
    /// Unexcused absence; deducted.
    Absent,
    /// Sick leave.
    SickLeave,
    /// Personal leave.
    PersonalLeave,
    /// Vacation.
    Vacation,
}

impl ShiftCode {
    /// Every code in the vocabulary, in roster display order.
    pub const ALL: [ShiftCode; 10] = [
        ShiftCode::Morning,
        ShiftCode::Afternoon,
        ShiftCode::Evening,
        ShiftCode::Night,
        ShiftCode::Late,
        ShiftCode::Off,
        ShiftCode::Absent,
        ShiftCode::SickLeave,
        ShiftCode::PersonalLeave,
        ShiftCode::Vacation,
    ];

    /// The roster token for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftCode::Morning => "1",
            ShiftCode::Afternoon => "2",
            ShiftCode::Evening => "3",
            ShiftCode::Night => "ดึก",
            ShiftCode::Late => "สาย",
            ShiftCode::Off => "OFF",
            ShiftCode::Absent => "ข",
            ShiftCode::SickLeave => "ป",
            ShiftCode::PersonalLeave => "ก",
            ShiftCode::Vacation => "พ",
        }
    }

    /// The category this code is counted under.
    ///
    /// A late day is still a worked day; lateness is tracked separately
    /// through [`ShiftCode::is_late`].
    pub fn category(&self) -> DayCategory {
        match self {
            ShiftCode::Morning
            | ShiftCode::Afternoon
            | ShiftCode::Evening
            | ShiftCode::Night
            | ShiftCode::Late => DayCategory::Worked,
            ShiftCode::Off => DayCategory::Off,
            ShiftCode::Absent => DayCategory::Absent,
            ShiftCode::SickLeave => DayCategory::SickLeave,
            ShiftCode::PersonalLeave => DayCategory::PersonalLeave,
            ShiftCode::Vacation => DayCategory::Vacation,
        }
    }

    /// Whether the day counts towards late-day deductions.
    pub fn is_late(&self) -> bool {
        matches!(self, ShiftCode::Late)
    }
}

impl FromStr for ShiftCode {
    type Err = EngineError;

    fn from_str(token: &str) -> EngineResult<Self> {
        ShiftCode::ALL
            .into_iter()
            .find(|code| code.as_str() == token)
            .ok_or_else(|| {
                let valid: Vec<&str> = ShiftCode::ALL.iter().map(|c| c.as_str()).collect();
                EngineError::invalid(
                    "shift_code",
                    format!("unrecognized code '{}'; valid codes: {}", token, valid.join(", ")),
                )
            })
    }
}

impl TryFrom<String> for ShiftCode {
    type Error = EngineError;

    fn try_from(token: String) -> EngineResult<Self> {
        token.parse()
    }
}

impl From<ShiftCode> for String {
    fn from(code: ShiftCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ShiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
