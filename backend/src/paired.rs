//! Builds the weekly Sunday paired-practice pairings and commits a single
//! paired event spanning both a field and a cage simultaneously (C9).

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::availability::{resolve_open_windows, OpenWindow};
use crate::conflict::ConflictIndex;
use crate::draft::DivisionInputs;
use crate::error::{GenerateError, ScheduleWarning};
use crate::model::{Booking, EventId, EventStatus, EventType, ResourceId, ScheduledEvent, TeamId};
use crate::slots::{candidate_start_times, ResourceSlot};
use crate::state::DraftState;
use crate::time::{Weekday0, WeekDefinition};

/// Partners rotate by the circle method keyed by week number, same
/// technique as [`crate::roundrobin`]'s full-season builder but evaluated
/// for a single round at a time since partners only need to change weekly,
/// not build out the whole season up front. `team_ids` must already be
/// sorted for the rotation to be deterministic.
fn pairings_for_week(team_ids: &[TeamId], week_number: u32) -> Vec<(TeamId, TeamId)> {
    let mut arr = team_ids.to_vec();
    if arr.len() % 2 == 1 {
        // An odd team out sits out paired practice this week; it still
        // gets its regular practice/cage quota from phases P and C.
        arr.pop();
    }
    let n = arr.len();
    if n < 2 {
        return vec![];
    }

    let fixed = arr[0].clone();
    let mut rotating: Vec<TeamId> = arr[1..].to_vec();
    let round_index = (week_number as usize) % (n - 1).max(1);
    for _ in 0..round_index {
        let last = rotating.pop().expect("rotating is non-empty for n >= 2");
        rotating.insert(0, last);
    }

    // Canonical circle method: lay the fixed element and the rotated line
    // out as one array and fold it symmetrically, pairing `arr[i]` with
    // `arr[n-1-i]`. This pairs the fixed element with the *last* rotating
    // entry (not the first), which is what keeps week 0 of a sorted
    // `[T1..T6]` at `{(T1,T6),(T2,T5),(T3,T4)}`.
    let mut line = Vec::with_capacity(n);
    line.push(fixed);
    line.extend(rotating);

    let mut pairs = Vec::with_capacity(n / 2);
    for i in 0..n / 2 {
        pairs.push((line[i].clone(), line[n - 1 - i].clone()));
    }
    pairs
}

#[allow(clippy::too_many_arguments)]
fn find_simultaneous_slot(
    field_windows: &[OpenWindow],
    cage_windows: &[OpenWindow],
    duration: u16,
    field_resource: &ResourceId,
    cage_resource: &ResourceId,
    date: NaiveDate,
    conflict: &ConflictIndex,
) -> Option<u16> {
    let mut field_starts: Vec<u16> = Vec::new();
    for w in field_windows {
        let slot = ResourceSlot { resource_id: field_resource.clone(), date, window: w.clone() };
        field_starts.extend(candidate_start_times(&slot, EventType::PairedPractice, duration));
    }
    let mut cage_starts: BTreeSet<u16> = BTreeSet::new();
    for w in cage_windows {
        let slot = ResourceSlot { resource_id: cage_resource.clone(), date, window: w.clone() };
        cage_starts.extend(candidate_start_times(&slot, EventType::PairedPractice, duration));
    }

    field_starts.sort_unstable();
    field_starts
        .into_iter()
        .filter(|t| cage_starts.contains(t))
        .find(|&t| {
            !conflict.resource_busy(field_resource, date, t, t + duration)
                && !conflict.resource_busy(cage_resource, date, t, t + duration)
        })
}

/// Builds this week's pairings and tries to commit each as a single
/// `paired_practice` event. Returns one `(event, warning)` slot per pair so
/// the caller can fold both the committed events and any shortfalls into
/// its running `DraftOutcome` without this module reaching into it.
pub fn generate_team_pairings_for_week(
    inputs: &DivisionInputs,
    week: &WeekDefinition,
    conflict: &mut ConflictIndex,
    draft: &mut DraftState,
    seq: &mut u64,
) -> Result<Vec<(Option<ScheduledEvent>, Option<ScheduleWarning>)>, GenerateError> {
    let config = inputs.config;
    let (Some(field_id), Some(cage_id)) =
        (&config.sunday_paired_practice_field_id, &config.sunday_paired_practice_cage_id)
    else {
        return Ok(vec![]);
    };
    let Some(sunday) = week.dates_in_range.iter().copied().find(|d| Weekday0::of(*d).0 == 0) else {
        return Ok(vec![]);
    };

    let mut sorted_ids: Vec<TeamId> = inputs.teams.iter().map(|t| t.id.clone()).collect();
    sorted_ids.sort();
    let pairs = pairings_for_week(&sorted_ids, week.week_number);
    if pairs.is_empty() {
        return Ok(vec![]);
    }

    let duration = (config.sunday_paired_practice_duration_hours * 60.0).round() as u16;
    let field_resource = ResourceId::Field(field_id.clone());
    let cage_resource = ResourceId::Cage(cage_id.clone());

    let field_windows = resolve_open_windows(
        &field_resource,
        sunday,
        &inputs.division.id,
        EventType::PairedPractice,
        inputs.field_weekly,
        inputs.field_overrides,
        inputs.blackouts,
    )?;
    let cage_windows = resolve_open_windows(
        &cage_resource,
        sunday,
        &inputs.division.id,
        EventType::PairedPractice,
        inputs.cage_weekly,
        inputs.cage_overrides,
        inputs.blackouts,
    )?;

    let mut results = Vec::with_capacity(pairs.len());
    for (a, b) in pairs {
        let already_busy = [&a, &b].into_iter().any(|t| {
            let state = draft.get(&inputs.division.id, t);
            state.field_dates_used().contains(&sunday) || state.dates_with_cage.contains(&sunday)
        });
        if already_busy {
            results.push((
                None,
                Some(ScheduleWarning::InsufficientResources {
                    division_id: inputs.division.id.clone(),
                    team_id: a.clone(),
                    week: week.week_number,
                }),
            ));
            continue;
        }

        let Some(start) = find_simultaneous_slot(
            &field_windows,
            &cage_windows,
            duration,
            &field_resource,
            &cage_resource,
            sunday,
            conflict,
        ) else {
            results.push((
                None,
                Some(ScheduleWarning::InsufficientResources {
                    division_id: inputs.division.id.clone(),
                    team_id: a.clone(),
                    week: week.week_number,
                }),
            ));
            continue;
        };
        let end = start + duration;

        *seq += 1;
        let id = EventId::from(format!("evt-{}-{:06}", inputs.division.id, seq));
        let event = ScheduledEvent {
            id: id.clone(),
            season_id: inputs.season.id.clone(),
            division_id: inputs.division.id.clone(),
            event_type: EventType::PairedPractice,
            date: sunday,
            start_minute: start,
            end_minute: end,
            field_id: Some(field_id.clone()),
            cage_id: Some(cage_id.clone()),
            booking: Booking::PairedPractice { team_a_id: a.clone(), team_b_id: b.clone() },
            status: EventStatus::Scheduled,
            notes: None,
            created_at: 0,
            updated_at: 0,
        };

        for team in [&a, &b] {
            let state = draft.get_mut(&inputs.division.id, team);
            state.record_practice(sunday, start, end, week.week_number);
            state.record_cage(sunday, start, end, week.week_number);
        }
        conflict.insert(event.clone());
        log::debug!("committed paired practice {id} for {a}/{b} on {sunday}");
        results.push((Some(event), None));
    }

    Ok(results)
}
