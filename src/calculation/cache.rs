//! Monthly attendance memoization.
//!
//! Entries are keyed by (staff, period) and stamped with the roster revision
//! and daily wage they were computed from. A lookup with a different stamp is
//! a miss, so a cached value can never outlive the data it was derived from.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{AttendanceResult, Period, RosterEntry, StaffId};

/// The inputs a cached attendance value was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStamp {
    /// Roster revision; `None` when no roster existed.
    pub revision: Option<u64>,
    /// The staff member's daily wage at computation time.
    pub daily_wage: Decimal,
}

/// A cached per-staff monthly attendance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAttendance {
    /// The aggregated attendance.
    pub result: AttendanceResult,
    /// Notes recorded on the staff member's entries, as "day N: note".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl MonthlyAttendance {
    /// Pairs an attendance result with the remark built from `entries`.
    pub fn new(result: AttendanceResult, entries: &[RosterEntry]) -> Self {
        let notes: Vec<String> = entries
            .iter()
            .filter_map(|e| e.notes.as_ref().map(|n| format!("day {}: {}", e.day, n)))
            .collect();
        Self {
            result,
            remark: (!notes.is_empty()).then(|| notes.join("; ")),
        }
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to recompute.
    pub misses: u64,
}

/// Concurrent memo of [`MonthlyAttendance`] rows.
#[derive(Debug, Default)]
pub struct AttendanceCache {
    rows: DashMap<(StaffId, Period), (CacheStamp, MonthlyAttendance)>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AttendanceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached row if it was computed from `stamp`.
    pub fn get(
        &self,
        staff_id: &StaffId,
        period: Period,
        stamp: CacheStamp,
    ) -> Option<MonthlyAttendance> {
        let key = (staff_id.clone(), period);
        match self.rows.get(&key) {
            Some(cached) if cached.0 == stamp => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(cached.1.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a row, replacing any row for the same (staff, period).
    pub fn insert(&self, period: Period, stamp: CacheStamp, row: MonthlyAttendance) {
        self.rows
            .insert((row.result.staff_id.clone(), period), (stamp, row));
    }

    /// Drops every cached row.
    pub fn clear(&self) {
        self.rows.clear();
    }

    /// Number of cached rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the cache holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Current hit and miss counts.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::aggregate_attendance;
    use crate::config::DeductionPolicy;
    use crate::models::{RosterId, ShiftCode, Staff};

    fn row(notes: &[(u32, Option<&str>)]) -> (MonthlyAttendance, Staff) {
        let staff = Staff::new("stf_1", "prj_a", "Anan", Decimal::new(450, 0));
        let entries: Vec<RosterEntry> = notes
            .iter()
            .map(|(day, note)| RosterEntry {
                roster_id: RosterId::new("rst_1"),
                staff_id: staff.id.clone(),
                day: *day,
                shift_code: ShiftCode::Morning,
                notes: note.map(str::to_string),
            })
            .collect();
        let period = Period::new(2025, 1).unwrap();
        let result =
            aggregate_attendance(&staff, period, &entries, &DeductionPolicy::default()).unwrap();
        (MonthlyAttendance::new(result, &entries), staff)
    }

    fn stamp(revision: u64) -> CacheStamp {
        CacheStamp {
            revision: Some(revision),
            daily_wage: Decimal::new(450, 0),
        }
    }

    #[test]
    fn test_hit_only_with_matching_stamp() {
        let cache = AttendanceCache::new();
        let period = Period::new(2025, 1).unwrap();
        let (monthly, staff) = row(&[(1, None)]);
        cache.insert(period, stamp(3), monthly.clone());

        assert_eq!(cache.get(&staff.id, period, stamp(3)), Some(monthly));
        assert_eq!(cache.get(&staff.id, period, stamp(4)), None);

        let other_wage = CacheStamp {
            daily_wage: Decimal::new(500, 0),
            ..stamp(3)
        };
        assert_eq!(cache.get(&staff.id, period, other_wage), None);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2 });
    }

    #[test]
    fn test_period_is_part_of_the_key() {
        let cache = AttendanceCache::new();
        let (monthly, staff) = row(&[]);
        cache.insert(Period::new(2025, 1).unwrap(), stamp(1), monthly);
        assert!(cache.get(&staff.id, Period::new(2025, 2).unwrap(), stamp(1)).is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remark_collects_entry_notes() {
        let (monthly, _) = row(&[(1, Some("covering night")), (2, None), (5, Some("training"))]);
        assert_eq!(
            monthly.remark.as_deref(),
            Some("day 1: covering night; day 5: training")
        );

        let (plain, _) = row(&[(1, None)]);
        assert!(plain.remark.is_none());
    }
}
