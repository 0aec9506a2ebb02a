//! Materializes per-date open windows for a field or cage from weekly
//! recurring availability, date overrides, and blackouts (C2).

use crate::error::GenerateError;
use crate::model::{
    Blackout, DateOverride, DivisionId, EventType, OverrideType, ResourceId, WeeklyAvailability,
};
use crate::time::Weekday0;
use chrono::NaiveDate;

/// No event can fit in a window shorter than this, so sub-windows below the
/// floor are discarded by `subtract_interval`.
const MIN_WINDOW_MINUTES: u16 = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenWindow {
    pub start_minute: u16,
    pub end_minute: u16,
    pub single_event_only: bool,
}

impl OpenWindow {
    pub fn duration_minutes(&self) -> u16 {
        self.end_minute - self.start_minute
    }
}

/// Subtracts `blk` from `window`, returning 0, 1, or 2 sub-windows in
/// chronological order. Sub-windows shorter than [`MIN_WINDOW_MINUTES`] are
/// dropped.
pub fn subtract_interval(window: &OpenWindow, blk_start: u16, blk_end: u16) -> Vec<OpenWindow> {
    if blk_end <= window.start_minute || blk_start >= window.end_minute {
        return vec![window.clone()];
    }

    let mut result = Vec::with_capacity(2);

    if blk_start > window.start_minute {
        let left = OpenWindow {
            start_minute: window.start_minute,
            end_minute: blk_start.min(window.end_minute),
            single_event_only: window.single_event_only,
        };
        if left.duration_minutes() >= MIN_WINDOW_MINUTES {
            result.push(left);
        }
    }

    if blk_end < window.end_minute {
        let right = OpenWindow {
            start_minute: blk_end.max(window.start_minute),
            end_minute: window.end_minute,
            single_event_only: window.single_event_only,
        };
        if right.duration_minutes() >= MIN_WINDOW_MINUTES {
            result.push(right);
        }
    }

    result
}

/// Resolves the open windows for one (resource, date) pair given the
/// weekly rules, per-date overrides, season blackouts, and division
/// blackouts that apply to it. `weekly` and `overrides` should already be
/// filtered down to the resource in question; `blackouts` is the union of
/// season-level and division-level blackouts.
pub fn resolve_open_windows(
    resource_id: &ResourceId,
    date: NaiveDate,
    division_id: &DivisionId,
    event_type: EventType,
    weekly: &[WeeklyAvailability],
    overrides: &[DateOverride],
    blackouts: &[Blackout],
) -> Result<Vec<OpenWindow>, GenerateError> {
    if blackouts
        .iter()
        .any(|b| b.covers(date, division_id, event_type))
    {
        return Ok(vec![]);
    }

    let day_of_week = Weekday0::of(date).0;

    let mut windows: Vec<OpenWindow> = weekly
        .iter()
        .filter(|w| w.resource_id == *resource_id && w.day_of_week == day_of_week)
        .map(|w| OpenWindow {
            start_minute: w.start_minute,
            end_minute: w.end_minute,
            single_event_only: w.single_event_only,
        })
        .collect();

    let mut todays_overrides: Vec<&DateOverride> = overrides
        .iter()
        .filter(|o| o.resource_id == *resource_id && o.date == date)
        .collect();
    // Deterministic application order regardless of input ordering.
    todays_overrides.sort_by_key(|o| (o.start_minute, o.end_minute));

    for ov in todays_overrides {
        match ov.override_type {
            OverrideType::Added => {
                let (Some(s), Some(e)) = (ov.start_minute, ov.end_minute) else {
                    return Err(GenerateError::AmbiguousAddedOverride(
                        resource_id.to_string(),
                        date.to_string(),
                    ));
                };
                windows.push(OpenWindow {
                    start_minute: s,
                    end_minute: e,
                    single_event_only: ov.single_event_only,
                });
            }
            OverrideType::Blackout => match (ov.start_minute, ov.end_minute) {
                (Some(s), Some(e)) => {
                    windows = windows
                        .iter()
                        .flat_map(|w| subtract_interval(w, s, e))
                        .collect();
                }
                _ => {
                    // Whole-day blackout: every existing window is removed.
                    windows.clear();
                }
            },
        }
    }

    windows.sort_by_key(|w| w.start_minute);
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldId;

    fn field(id: &str) -> ResourceId {
        ResourceId::Field(FieldId::from(id))
    }

    #[test]
    fn subtract_interval_splits_a_window_into_two() {
        let window = OpenWindow {
            start_minute: 17 * 60,
            end_minute: 21 * 60,
            single_event_only: false,
        };
        let pieces = subtract_interval(&window, 18 * 60, 19 * 60);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].start_minute, 17 * 60);
        assert_eq!(pieces[0].end_minute, 18 * 60);
        assert_eq!(pieces[1].start_minute, 19 * 60);
        assert_eq!(pieces[1].end_minute, 21 * 60);
    }

    #[test]
    fn subtract_interval_drops_slivers_under_the_floor() {
        let window = OpenWindow {
            start_minute: 17 * 60,
            end_minute: 18 * 60,
            single_event_only: false,
        };
        // Leaves only a 10-minute sliver at the front, which should be dropped.
        let pieces = subtract_interval(&window, 17 * 60 + 10, 18 * 60);
        assert!(pieces.is_empty());
    }

    #[test]
    fn whole_day_blackout_override_clears_all_windows() {
        let weekly = vec![WeeklyAvailability {
            resource_id: field("f1"),
            day_of_week: 3,
            start_minute: 17 * 60,
            end_minute: 21 * 60,
            single_event_only: false,
        }];
        let overrides = vec![DateOverride {
            resource_id: field("f1"),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(), // Wednesday
            override_type: OverrideType::Blackout,
            start_minute: None,
            end_minute: None,
            single_event_only: false,
        }];
        let result = resolve_open_windows(
            &field("f1"),
            NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            &DivisionId::from("u10"),
            EventType::Practice,
            &weekly,
            &overrides,
            &[],
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn partial_blackout_override_splits_window_in_two() {
        let weekly = vec![WeeklyAvailability {
            resource_id: field("f1"),
            day_of_week: 3,
            start_minute: 17 * 60,
            end_minute: 21 * 60,
            single_event_only: false,
        }];
        let overrides = vec![DateOverride {
            resource_id: field("f1"),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            override_type: OverrideType::Blackout,
            start_minute: Some(18 * 60),
            end_minute: Some(19 * 60),
            single_event_only: false,
        }];
        let result = resolve_open_windows(
            &field("f1"),
            NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            &DivisionId::from("u10"),
            EventType::Practice,
            &weekly,
            &overrides,
            &[],
        )
        .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].start_minute, 17 * 60);
        assert_eq!(result[0].end_minute, 18 * 60);
        assert_eq!(result[1].start_minute, 19 * 60);
        assert_eq!(result[1].end_minute, 21 * 60);
    }

    #[test]
    fn added_override_without_times_is_rejected() {
        let overrides = vec![DateOverride {
            resource_id: field("f1"),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            override_type: OverrideType::Added,
            start_minute: None,
            end_minute: None,
            single_event_only: false,
        }];
        let result = resolve_open_windows(
            &field("f1"),
            NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            &DivisionId::from("u10"),
            EventType::Practice,
            &[],
            &overrides,
            &[],
        );
        assert!(matches!(result, Err(GenerateError::AmbiguousAddedOverride(_, _))));
    }

    #[test]
    fn blackout_covering_the_date_suppresses_all_windows() {
        let weekly = vec![WeeklyAvailability {
            resource_id: field("f1"),
            day_of_week: 3,
            start_minute: 17 * 60,
            end_minute: 21 * 60,
            single_event_only: false,
        }];
        let blackouts = vec![Blackout {
            start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            division_ids: None,
            blocked_event_types: vec![EventType::Practice],
        }];
        let result = resolve_open_windows(
            &field("f1"),
            NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            &DivisionId::from("u10"),
            EventType::Practice,
            &weekly,
            &[],
            &blackouts,
        )
        .unwrap();
        assert!(result.is_empty());
    }
}
