//! Deadline resolution: start instant + offset -> absolute due instant.
//!
//! Working-day arithmetic treats Saturday and Sunday (UTC) as the only
//! non-working days. Bank holidays are not modelled.

mod table;

pub use table::{
    MilestoneSpec, NamedDeadline, OffsetTable, ScheduleKey, COMPLAINT_STAGE_ONE,
    COMPLAINT_STAGE_TWO, HAZARD_EMERGENCY, HAZARD_SIGNIFICANT,
};

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OffsetKind {
    CalendarHours,
    CalendarDays,
    WorkingDays,
}

impl OffsetKind {
    pub const fn unit_label(self) -> &'static str {
        match self {
            Self::CalendarHours => "h",
            Self::CalendarDays => "d",
            Self::WorkingDays => "WD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeadlineError {
    #[error("invalid {kind:?} offset {offset}: {reason}")]
    InvalidOffset {
        offset: f64,
        kind: OffsetKind,
        reason: &'static str,
    },
}

/// A resolved deadline: the inputs that produced it plus the absolute due instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    pub start: DateTime<Utc>,
    pub offset: f64,
    pub kind: OffsetKind,
    pub due: DateTime<Utc>,
}

impl Deadline {
    pub fn new(start: DateTime<Utc>, offset: f64, kind: OffsetKind) -> Result<Self, DeadlineError> {
        let due = resolve(start, offset, kind)?;
        Ok(Self {
            start,
            offset,
            kind,
            due,
        })
    }
}

pub fn is_weekend(instant: DateTime<Utc>) -> bool {
    matches!(instant.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Resolve `start + offset` for the given offset kind.
///
/// `CalendarHours` and `CalendarDays` are plain additions and may be fractional.
/// `WorkingDays` advances day by day from `start`, counting only weekdays; the
/// offset must be a whole number. A zero working-day offset returns `start`,
/// moved forward to Monday (same time of day) when `start` falls on a weekend.
pub fn resolve(
    start: DateTime<Utc>,
    offset: f64,
    kind: OffsetKind,
) -> Result<DateTime<Utc>, DeadlineError> {
    let invalid = |reason| DeadlineError::InvalidOffset {
        offset,
        kind,
        reason,
    };

    if !offset.is_finite() {
        return Err(invalid("offset must be finite"));
    }
    if offset < 0.0 {
        return Err(invalid("offset must not be negative"));
    }

    match kind {
        OffsetKind::CalendarHours => add_millis(start, offset * MILLIS_PER_HOUR)
            .ok_or_else(|| invalid("deadline out of range")),
        OffsetKind::CalendarDays => add_millis(start, offset * MILLIS_PER_DAY)
            .ok_or_else(|| invalid("deadline out of range")),
        OffsetKind::WorkingDays => {
            if offset.fract() != 0.0 {
                return Err(invalid("working-day offsets must be whole days"));
            }
            if offset > u32::MAX as f64 {
                return Err(invalid("deadline out of range"));
            }
            add_working_days(start, offset as u32).ok_or_else(|| invalid("deadline out of range"))
        }
    }
}

fn add_millis(start: DateTime<Utc>, millis: f64) -> Option<DateTime<Utc>> {
    if millis >= i64::MAX as f64 {
        return None;
    }
    start.checked_add_signed(Duration::milliseconds(millis.round() as i64))
}

fn add_working_days(start: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    if days == 0 {
        return next_working_instant(start);
    }

    // From a weekend start the first counted day is Monday, exactly as if the
    // count had begun on the preceding Friday.
    let mut cursor = match start.weekday() {
        Weekday::Sat => start.checked_sub_signed(Duration::days(1))?,
        Weekday::Sun => start.checked_sub_signed(Duration::days(2))?,
        _ => start,
    };

    // Five weekdays from a weekday always land on the same weekday a week later.
    let whole_weeks = i64::from(days / 5);
    cursor = cursor.checked_add_signed(Duration::days(whole_weeks.checked_mul(7)?))?;

    let mut remaining = days % 5;
    while remaining > 0 {
        cursor = cursor.checked_add_signed(Duration::days(1))?;
        if !is_weekend(cursor) {
            remaining -= 1;
        }
    }

    Some(cursor)
}

fn next_working_instant(start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut cursor = start;
    while is_weekend(cursor) {
        cursor = cursor.checked_add_signed(Duration::days(1))?;
    }
    Some(cursor)
}

/// Whole calendar days until `due`, rounded up; negative once overdue.
pub fn remaining_days(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let millis = (due - now).num_milliseconds();
    let days = millis.div_euclid(86_400_000);
    if millis.rem_euclid(86_400_000) == 0 {
        days
    } else {
        days + 1
    }
}

/// Weekdays strictly after `now`'s date up to and including `due`'s date.
/// Zero once `due` has passed.
pub fn remaining_working_days(now: DateTime<Utc>, due: DateTime<Utc>) -> u32 {
    let mut count = 0;
    let mut day = now.date_naive();
    let target = due.date_naive();
    while day < target {
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid instant")
    }

    #[test]
    fn calendar_offsets_are_plain_addition() {
        let start = at(2026, 2, 6, 9);
        assert_eq!(
            resolve(start, 24.0, OffsetKind::CalendarHours).expect("hours"),
            at(2026, 2, 7, 9)
        );
        assert_eq!(
            resolve(start, 1.5, OffsetKind::CalendarHours).expect("fractional hours"),
            start + Duration::minutes(90)
        );
        assert_eq!(
            resolve(start, 7.0, OffsetKind::CalendarDays).expect("days"),
            at(2026, 2, 13, 9)
        );
    }

    #[test]
    fn working_days_skip_the_weekend() {
        // 2026-02-06 is a Friday.
        let friday = at(2026, 2, 6, 14);
        assert_eq!(
            resolve(friday, 1.0, OffsetKind::WorkingDays).expect("1 WD"),
            at(2026, 2, 9, 14)
        );
        assert_eq!(
            resolve(friday, 5.0, OffsetKind::WorkingDays).expect("5 WD"),
            at(2026, 2, 13, 14)
        );
        assert_eq!(
            resolve(friday, 10.0, OffsetKind::WorkingDays).expect("10 WD"),
            at(2026, 2, 20, 14)
        );

        let wednesday = at(2026, 2, 4, 8);
        assert_eq!(
            resolve(wednesday, 3.0, OffsetKind::WorkingDays).expect("3 WD"),
            at(2026, 2, 9, 8)
        );
    }

    #[test]
    fn weekend_start_counts_from_monday() {
        let saturday = at(2026, 2, 7, 10);
        let sunday = at(2026, 2, 8, 10);
        assert_eq!(
            resolve(saturday, 1.0, OffsetKind::WorkingDays).expect("sat + 1"),
            at(2026, 2, 9, 10)
        );
        assert_eq!(
            resolve(sunday, 5.0, OffsetKind::WorkingDays).expect("sun + 5"),
            at(2026, 2, 13, 10)
        );
    }

    #[test]
    fn zero_working_days_normalises_weekend_start_only() {
        let saturday = at(2026, 2, 7, 10);
        assert_eq!(
            resolve(saturday, 0.0, OffsetKind::WorkingDays).expect("zero from weekend"),
            at(2026, 2, 9, 10)
        );

        let tuesday = at(2026, 2, 10, 10);
        assert_eq!(
            resolve(tuesday, 0.0, OffsetKind::WorkingDays).expect("zero from weekday"),
            tuesday
        );
    }

    #[test]
    fn rejects_negative_non_finite_and_fractional_working_days() {
        let start = at(2026, 2, 6, 9);
        for (offset, kind) in [
            (-1.0, OffsetKind::CalendarDays),
            (-0.5, OffsetKind::CalendarHours),
            (f64::NAN, OffsetKind::CalendarHours),
            (f64::INFINITY, OffsetKind::WorkingDays),
            (2.5, OffsetKind::WorkingDays),
        ] {
            match resolve(start, offset, kind) {
                Err(DeadlineError::InvalidOffset { .. }) => {}
                other => panic!("expected invalid offset for {offset} {kind:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn countdowns_round_up_and_skip_weekends() {
        let now = at(2026, 2, 9, 9);
        assert_eq!(remaining_days(now, at(2026, 2, 10, 8)), 1);
        assert_eq!(remaining_days(now, at(2026, 2, 9, 9)), 0);
        assert_eq!(remaining_days(now, at(2026, 2, 7, 9)), -2);

        // Monday -> following Monday: Tue..Fri + Mon.
        assert_eq!(remaining_working_days(now, at(2026, 2, 16, 9)), 5);
        assert_eq!(remaining_working_days(now, at(2026, 2, 6, 9)), 0);
    }
}
