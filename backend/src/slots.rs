//! Turns resolved open windows into discrete [`ResourceSlot`]s, and
//! enumerates candidate start times inside a slot at the event type's
//! granularity (C3).

use crate::availability::{resolve_open_windows, OpenWindow};
use crate::error::GenerateError;
use crate::model::{Blackout, DateOverride, DivisionId, EventType, ResourceId, WeeklyAvailability};
use chrono::NaiveDate;

/// Practice and cage candidates are enumerated every hour; games use a finer
/// 30-minute grid. Practice/cage candidate sets dominate runtime, and a
/// coarser grid with the same scoring produces equivalent results in
/// practice, so the discrepancy is intentional rather than an oversight.
pub fn granularity_minutes(event_type: EventType) -> u16 {
    match event_type {
        EventType::Game => 30,
        EventType::Practice | EventType::Cage | EventType::PairedPractice => 60,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceSlot {
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub window: OpenWindow,
}

/// Builds the full slot universe for one resource across `start..=end`,
/// for events of `event_type`, respecting blackouts scoped to `division_id`.
pub fn generate_slots(
    resource_id: &ResourceId,
    start: NaiveDate,
    end: NaiveDate,
    division_id: &DivisionId,
    event_type: EventType,
    weekly: &[WeeklyAvailability],
    overrides: &[DateOverride],
    blackouts: &[Blackout],
) -> Result<Vec<ResourceSlot>, GenerateError> {
    let mut slots = Vec::new();
    let mut date = start;
    while date <= end {
        let windows = resolve_open_windows(
            resource_id,
            date,
            division_id,
            event_type,
            weekly,
            overrides,
            blackouts,
        )?;
        for window in windows {
            slots.push(ResourceSlot {
                resource_id: resource_id.clone(),
                date,
                window,
            });
        }
        date = date.succ_opt().expect("date arithmetic stays in range");
    }
    Ok(slots)
}

/// Enumerates every start minute inside `slot` at `event_type`'s
/// granularity for which an event of `duration_minutes` fits before the
/// slot's close.
pub fn candidate_start_times(slot: &ResourceSlot, event_type: EventType, duration_minutes: u16) -> Vec<u16> {
    let step = granularity_minutes(event_type);
    let mut starts = Vec::new();
    let mut t = slot.window.start_minute;
    while t + duration_minutes <= slot.window.end_minute {
        starts.push(t);
        t += step;
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldId;

    #[test]
    fn candidate_start_times_uses_games_granularity() {
        let slot = ResourceSlot {
            resource_id: ResourceId::Field(FieldId::from("f1")),
            date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            window: OpenWindow {
                start_minute: 9 * 60,
                end_minute: 12 * 60,
                single_event_only: false,
            },
        };
        let starts = candidate_start_times(&slot, EventType::Game, 60);
        // 9:00, 9:30, 10:00, 10:30, 11:00 all leave room for a 1h game before noon.
        assert_eq!(starts.len(), 5);
        assert_eq!(starts[0], 9 * 60);
        assert_eq!(starts[1], 9 * 60 + 30);
    }

    #[test]
    fn candidate_start_times_uses_practice_granularity() {
        let slot = ResourceSlot {
            resource_id: ResourceId::Field(FieldId::from("f1")),
            date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            window: OpenWindow {
                start_minute: 9 * 60,
                end_minute: 12 * 60,
                single_event_only: false,
            },
        };
        let starts = candidate_start_times(&slot, EventType::Practice, 60);
        assert_eq!(starts.len(), 3);
    }

    #[test]
    fn generate_slots_spans_a_date_range() {
        let weekly = vec![WeeklyAvailability {
            resource_id: ResourceId::Field(FieldId::from("f1")),
            day_of_week: 6, // Saturday
            start_minute: 9 * 60,
            end_minute: 12 * 60,
            single_event_only: false,
        }];
        let slots = generate_slots(
            &ResourceId::Field(FieldId::from("f1")),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            &DivisionId::from("u10"),
            EventType::Game,
            &weekly,
            &[],
            &[],
        )
        .unwrap();
        // Two Saturdays in range: 2026-03-07 and 2026-03-14.
        assert_eq!(slots.len(), 2);
    }
}
