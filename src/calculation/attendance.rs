//! Attendance aggregation.
//!
//! This module turns one staff member's roster entries for a period into day
//! counts, expected salary, deductions and net salary.

use rust_decimal::Decimal;

use crate::config::DeductionPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceCounts, AttendanceResult, DayCategory, DayStats, Period, RosterEntry, Staff,
};

/// Caps a deduction at the expected salary so net salary cannot go negative.
///
/// # Examples
///
/// ```
/// use roster_cost_engine::calculation::clamp_deduction;
/// use rust_decimal::Decimal;
///
/// let expected = Decimal::new(400, 0);
/// assert_eq!(clamp_deduction(expected, Decimal::new(450, 0)), expected);
/// assert_eq!(clamp_deduction(expected, Decimal::new(100, 0)), Decimal::new(100, 0));
/// ```
pub fn clamp_deduction(expected_salary: Decimal, deduction: Decimal) -> Decimal {
    deduction.min(expected_salary).max(Decimal::ZERO)
}

/// Classifies each day of the period into exactly one category.
///
/// Days without an entry count as `off` and `unrecorded`.
///
/// # Errors
///
/// Returns `Inconsistent` if an entry's day is outside the period or two
/// entries share a day.
pub fn count_days(period: Period, entries: &[RosterEntry]) -> EngineResult<AttendanceCounts> {
    let days_in_month = period.days_in_month();
    let mut seen = vec![false; days_in_month as usize];
    let mut counts = AttendanceCounts::default();

    for entry in entries {
        if entry.day == 0 || entry.day > days_in_month {
            return Err(EngineError::inconsistent(format!(
                "entry for staff {} on day {} is outside {}",
                entry.staff_id, entry.day, period
            )));
        }
        let slot = &mut seen[(entry.day - 1) as usize];
        if *slot {
            return Err(EngineError::inconsistent(format!(
                "staff {} has more than one entry on day {} of {}",
                entry.staff_id, entry.day, period
            )));
        }
        *slot = true;

        match entry.shift_code.category() {
            DayCategory::Worked => counts.worked += 1,
            DayCategory::Off => counts.off += 1,
            DayCategory::Absent => counts.absent += 1,
            DayCategory::SickLeave => counts.sick_leave += 1,
            DayCategory::PersonalLeave => counts.personal_leave += 1,
            DayCategory::Vacation => counts.vacation += 1,
        }
        if entry.shift_code.is_late() {
            counts.late += 1;
        }
    }

    counts.unrecorded = seen.iter().filter(|recorded| !**recorded).count() as u32;
    counts.off += counts.unrecorded;
    Ok(counts)
}

/// Computes attendance and salary for one staff member in one period.
///
/// `entries` must be the staff member's entries of the roster for `period`;
/// pass an empty slice when no roster exists yet.
///
/// # Errors
///
/// Returns `Inconsistent` if an entry belongs to another staff member or
/// fails the checks of [`count_days`].
///
/// # Examples
///
/// ```
/// use roster_cost_engine::calculation::aggregate_attendance;
/// use roster_cost_engine::config::DeductionPolicy;
/// use roster_cost_engine::models::{Period, Staff};
/// use rust_decimal::Decimal;
///
/// let staff = Staff::new("stf_1", "prj_a", "Anan", Decimal::new(450, 0));
/// let period = Period::new(2025, 1).unwrap();
/// let result = aggregate_attendance(&staff, period, &[], &DeductionPolicy::default()).unwrap();
///
/// assert_eq!(result.counts.off, 31);
/// assert_eq!(result.net_salary, Decimal::ZERO);
/// ```
pub fn aggregate_attendance(
    staff: &Staff,
    period: Period,
    entries: &[RosterEntry],
    policy: &DeductionPolicy,
) -> EngineResult<AttendanceResult> {
    if let Some(foreign) = entries.iter().find(|e| e.staff_id != staff.id) {
        return Err(EngineError::inconsistent(format!(
            "entry for staff {} passed while aggregating staff {}",
            foreign.staff_id, staff.id
        )));
    }

    let counts = count_days(period, entries)?;

    let expected_salary = Decimal::from(counts.worked) * staff.daily_wage;
    let policy_deduction = Decimal::from(counts.absent) * policy.absence_amount(staff.daily_wage)
        + Decimal::from(counts.late) * policy.late_rate;
    let deduction_amount = clamp_deduction(expected_salary, policy_deduction);

    Ok(AttendanceResult {
        staff_id: staff.id.clone(),
        staff_name: staff.name.clone(),
        position: staff.position.clone(),
        project_id: staff.project_id.clone(),
        period,
        daily_wage: staff.daily_wage,
        counts,
        expected_salary,
        deduction_amount,
        net_salary: expected_salary - deduction_amount,
        deduction_clamped: deduction_amount < policy_deduction,
    })
}

/// Head counts for one roster day across every staff member with an entry.
pub fn summarize_day(day: u32, entries: &[RosterEntry]) -> DayStats {
    let mut stats = DayStats {
        day,
        ..DayStats::default()
    };
    for entry in entries.iter().filter(|e| e.day == day) {
        stats.total += 1;
        *stats.by_shift.entry(entry.shift_code).or_default() += 1;
        match entry.shift_code.category() {
            DayCategory::Worked => stats.working += 1,
            DayCategory::Off => stats.off += 1,
            DayCategory::Absent => stats.absent += 1,
            DayCategory::SickLeave => stats.sick_leave += 1,
            DayCategory::PersonalLeave => stats.personal_leave += 1,
            DayCategory::Vacation => stats.vacation += 1,
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AbsenceRate;
    use crate::models::{RosterId, ShiftCode, StaffId};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn staff(wage: &str) -> Staff {
        Staff::new("stf_1", "prj_a", "Anan", dec(wage))
    }

    fn jan() -> Period {
        Period::new(2025, 1).unwrap()
    }

    fn entries(codes: &[(u32, ShiftCode)]) -> Vec<RosterEntry> {
        codes
            .iter()
            .map(|(day, code)| RosterEntry {
                roster_id: RosterId::new("rst_1"),
                staff_id: StaffId::new("stf_1"),
                day: *day,
                shift_code: *code,
                notes: None,
            })
            .collect()
    }

    #[test]
    fn test_24_worked_days_at_450() {
        let worked: Vec<(u32, ShiftCode)> = (1..=24).map(|d| (d, ShiftCode::Morning)).collect();
        let result = aggregate_attendance(
            &staff("450"),
            jan(),
            &entries(&worked),
            &DeductionPolicy::default(),
        )
        .unwrap();

        assert_eq!(result.counts.worked, 24);
        assert_eq!(result.counts.absent, 0);
        assert_eq!(result.counts.off, 7);
        assert_eq!(result.expected_salary, dec("10800"));
        assert_eq!(result.deduction_amount, Decimal::ZERO);
        assert_eq!(result.net_salary, dec("10800"));
    }

    #[test]
    fn test_night_shift_counts_as_worked() {
        let result = aggregate_attendance(
            &staff("450"),
            jan(),
            &entries(&[(1, ShiftCode::Night), (2, ShiftCode::Evening)]),
            &DeductionPolicy::default(),
        )
        .unwrap();
        assert_eq!(result.counts.worked, 2);
        assert_eq!(result.expected_salary, dec("900"));
    }

    #[test]
    fn test_absence_deducts_daily_wage() {
        let mut days: Vec<(u32, ShiftCode)> = (1..=20).map(|d| (d, ShiftCode::Afternoon)).collect();
        days.push((21, ShiftCode::Absent));
        let result = aggregate_attendance(
            &staff("450"),
            jan(),
            &entries(&days),
            &DeductionPolicy::default(),
        )
        .unwrap();

        assert_eq!(result.counts.absent, 1);
        assert_eq!(result.deduction_amount, dec("450"));
        assert_eq!(result.net_salary, dec("8550"));
        assert!(!result.deduction_clamped);
    }

    #[test]
    fn test_leave_and_off_carry_no_deduction() {
        let result = aggregate_attendance(
            &staff("450"),
            jan(),
            &entries(&[
                (1, ShiftCode::Morning),
                (2, ShiftCode::SickLeave),
                (3, ShiftCode::PersonalLeave),
                (4, ShiftCode::Vacation),
                (5, ShiftCode::Off),
            ]),
            &DeductionPolicy::default(),
        )
        .unwrap();

        assert_eq!(result.counts.sick_leave, 1);
        assert_eq!(result.counts.personal_leave, 1);
        assert_eq!(result.counts.vacation, 1);
        assert_eq!(result.counts.off, 27);
        assert_eq!(result.counts.unrecorded, 26);
        assert_eq!(result.deduction_amount, Decimal::ZERO);
        assert_eq!(result.net_salary, dec("450"));
    }

    #[test]
    fn test_deduction_clamped_to_expected_salary() {
        // Only absences: nothing earned, so nothing can be deducted.
        let result = aggregate_attendance(
            &staff("450"),
            jan(),
            &entries(&[(1, ShiftCode::Absent)]),
            &DeductionPolicy::default(),
        )
        .unwrap();

        assert_eq!(result.expected_salary, Decimal::ZERO);
        assert_eq!(result.deduction_amount, Decimal::ZERO);
        assert_eq!(result.net_salary, Decimal::ZERO);
        assert!(result.deduction_clamped);
    }

    #[test]
    fn test_clamp_expected_400_deduction_450() {
        let deduction = clamp_deduction(dec("400"), dec("450"));
        assert_eq!(deduction, dec("400"));
        assert_eq!(dec("400") - deduction, Decimal::ZERO);
    }

    #[test]
    fn test_fixed_absence_rate_and_late_rate() {
        let policy = DeductionPolicy {
            absence: AbsenceRate::Fixed(dec("300")),
            late_rate: dec("50"),
        };
        let result = aggregate_attendance(
            &staff("450"),
            jan(),
            &entries(&[
                (1, ShiftCode::Morning),
                (2, ShiftCode::Late),
                (3, ShiftCode::Late),
                (4, ShiftCode::Absent),
            ]),
            &policy,
        )
        .unwrap();

        assert_eq!(result.counts.worked, 3);
        assert_eq!(result.counts.late, 2);
        assert_eq!(result.expected_salary, dec("1350"));
        assert_eq!(result.deduction_amount, dec("400"));
        assert_eq!(result.net_salary, dec("950"));
    }

    #[test]
    fn test_late_days_free_by_default() {
        let result = aggregate_attendance(
            &staff("450"),
            jan(),
            &entries(&[(1, ShiftCode::Late)]),
            &DeductionPolicy::default(),
        )
        .unwrap();
        assert_eq!(result.counts.late, 1);
        assert_eq!(result.net_salary, dec("450"));
    }

    #[test]
    fn test_day_outside_period_is_inconsistent() {
        let feb = Period::new(2025, 2).unwrap();
        let result = aggregate_attendance(
            &staff("450"),
            feb,
            &entries(&[(30, ShiftCode::Morning)]),
            &DeductionPolicy::default(),
        );
        assert!(matches!(result, Err(EngineError::Inconsistent { .. })));
    }

    #[test]
    fn test_duplicate_day_is_inconsistent() {
        let result = count_days(
            jan(),
            &entries(&[(3, ShiftCode::Morning), (3, ShiftCode::Absent)]),
        );
        assert!(matches!(result, Err(EngineError::Inconsistent { .. })));
    }

    #[test]
    fn test_foreign_entry_is_inconsistent() {
        let mut list = entries(&[(1, ShiftCode::Morning)]);
        list[0].staff_id = StaffId::new("stf_other");
        let result = aggregate_attendance(&staff("450"), jan(), &list, &DeductionPolicy::default());
        assert!(matches!(result, Err(EngineError::Inconsistent { .. })));
    }

    #[test]
    fn test_summarize_day_counts_categories_and_codes() {
        let mut list = entries(&[(4, ShiftCode::Morning), (5, ShiftCode::Morning)]);
        for (staff, code) in [
            ("stf_2", ShiftCode::Morning),
            ("stf_3", ShiftCode::Night),
            ("stf_4", ShiftCode::SickLeave),
        ] {
            let mut entry = list[0].clone();
            entry.staff_id = StaffId::new(staff);
            entry.shift_code = code;
            list.push(entry);
        }

        let stats = summarize_day(4, &list);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.working, 3);
        assert_eq!(stats.sick_leave, 1);
        assert_eq!(stats.by_shift.get(&ShiftCode::Morning), Some(&2));
        assert_eq!(stats.by_shift.get(&ShiftCode::Night), Some(&1));

        assert_eq!(summarize_day(9, &list).total, 0);
    }

    fn arb_code() -> impl Strategy<Value = ShiftCode> {
        proptest::sample::select(ShiftCode::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_categories_partition_the_month(
            month in 1u32..=12,
            year in 2000i32..2100,
            codes in proptest::collection::vec(proptest::option::of(arb_code()), 31),
        ) {
            let period = Period::new(year, month).unwrap();
            let days = period.days_in_month();
            let recorded: Vec<(u32, ShiftCode)> = codes
                .iter()
                .take(days as usize)
                .enumerate()
                .filter_map(|(i, code)| code.map(|c| (i as u32 + 1, c)))
                .collect();

            let counts = count_days(period, &entries(&recorded)).unwrap();
            prop_assert_eq!(counts.classified_days(), days);
            prop_assert!(counts.late <= counts.worked);
        }

        #[test]
        fn prop_net_salary_never_negative(
            wage in 1i64..100_000,
            absence_fixed in 0i64..1_000_000,
            late_rate in 0i64..1_000_000,
            codes in proptest::collection::vec(arb_code(), 31),
        ) {
            let policy = DeductionPolicy {
                absence: AbsenceRate::Fixed(Decimal::new(absence_fixed, 2)),
                late_rate: Decimal::new(late_rate, 2),
            };
            let recorded: Vec<(u32, ShiftCode)> = codes
                .into_iter()
                .enumerate()
                .map(|(i, c)| (i as u32 + 1, c))
                .collect();
            let staff = Staff::new("stf_1", "prj_a", "Anan", Decimal::new(wage, 2));

            let result = aggregate_attendance(&staff, jan(), &entries(&recorded), &policy).unwrap();
            prop_assert!(result.net_salary >= Decimal::ZERO);
            prop_assert!(result.deduction_amount <= result.expected_salary);
            prop_assert_eq!(result.net_salary, result.expected_salary - result.deduction_amount);
        }
    }
}
