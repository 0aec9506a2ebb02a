//! The per-division, per-week draft loop: games, practices, cage sessions,
//! and optional paired practices, each phase generating candidates and
//! committing the scored winner (C6).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::availability::resolve_open_windows;
use crate::conflict::ConflictIndex;
use crate::error::{GenerateError, ScheduleWarning, SchedulingLogEntry};
use crate::model::{
    Blackout, Booking, Cage, DateOverride, DayPreferencePriority, Division, DivisionConfig, DivisionId,
    EventId, EventStatus, EventType, Field, ResourceId, Season, ScheduledEvent, SeasonId, Team, TeamId,
    WeeklyAvailability,
};
use crate::paired::generate_team_pairings_for_week;
use crate::roundrobin::{assign_matchups_to_weeks, build_round_robin, Matchup};
use crate::scoring::{score, score_excluding_time_of_day, Candidate, ScoringContext};
use crate::slots::{candidate_start_times, generate_slots};
use crate::state::DraftState;
use crate::time::{enumerate_weeks, WeekDefinition};
use crate::weights::ScoringWeights;

/// Everything `draft_division` needs about one division to run every phase,
/// bundled so the entrypoint doesn't carry a dozen positional parameters.
pub struct DivisionInputs<'a> {
    pub season: &'a Season,
    pub division: &'a Division,
    pub config: &'a DivisionConfig,
    pub teams: &'a [Team],
    pub fields: &'a [Field],
    pub cages: &'a [Cage],
    pub field_weekly: &'a [WeeklyAvailability],
    pub cage_weekly: &'a [WeeklyAvailability],
    pub field_overrides: &'a [DateOverride],
    pub cage_overrides: &'a [DateOverride],
    pub blackouts: &'a [Blackout],
}

#[derive(Default)]
pub struct DraftOutcome {
    pub events: Vec<ScheduledEvent>,
    pub warnings: Vec<ScheduleWarning>,
    pub log: Vec<SchedulingLogEntry>,
}

fn new_event_id(division_id: &DivisionId, seq: &mut u64) -> EventId {
    *seq += 1;
    EventId::from(format!("evt-{division_id}-{seq:06}"))
}

struct RawSlot {
    resource_id: ResourceId,
    date: NaiveDate,
    start_minute: u16,
    end_minute: u16,
    window_start: u16,
    window_end: u16,
    single_event_only: bool,
}

/// Builds every (resource, date, start-time) slot available across `week`
/// for a list of resources of one kind (all fields or all cages), already
/// accounting for the arrival buffer by shifting the scheduled start past
/// it while still requiring the buffer to fit inside the open window.
fn build_raw_slots(
    resource_ids: &[ResourceId],
    week: &WeekDefinition,
    division_id: &DivisionId,
    event_type: EventType,
    duration_minutes: u16,
    arrive_before_minutes: u16,
    weekly: &[WeeklyAvailability],
    overrides: &[DateOverride],
    blackouts: &[Blackout],
) -> Result<Vec<RawSlot>, GenerateError> {
    let Some(first) = week.dates_in_range.first().copied() else {
        return Ok(vec![]);
    };
    let last = *week.dates_in_range.last().unwrap();
    let needed = arrive_before_minutes + duration_minutes;

    let mut out = Vec::new();
    for resource_id in resource_ids {
        let slots = generate_slots(resource_id, first, last, division_id, event_type, weekly, overrides, blackouts)?;
        for slot in slots {
            for t in candidate_start_times(&slot, event_type, needed) {
                out.push(RawSlot {
                    resource_id: resource_id.clone(),
                    date: slot.date,
                    start_minute: t + arrive_before_minutes,
                    end_minute: t + arrive_before_minutes + duration_minutes,
                    window_start: slot.window.start_minute,
                    window_end: slot.window.end_minute,
                    single_event_only: slot.window.single_event_only,
                });
            }
        }
    }
    Ok(out)
}

fn resource_capacity_map(raw: &[RawSlot]) -> BTreeMap<ResourceId, usize> {
    let mut capacity: BTreeMap<ResourceId, usize> = BTreeMap::new();
    for slot in raw {
        *capacity.entry(slot.resource_id.clone()).or_insert(0) += 1;
    }
    capacity
}

/// `(backToBackPracticesCount DESC, name ASC)`, rotated by `week_number mod
/// |teams|` so first pick rotates fairly across weeks.
fn rotated_team_order(teams: &[Team], draft: &DraftState, division_id: &DivisionId, week_number: u32) -> Vec<TeamId> {
    let name_of: BTreeMap<&TeamId, &str> = teams.iter().map(|t| (&t.id, t.name.as_str())).collect();
    let mut ids: Vec<TeamId> = teams.iter().map(|t| t.id.clone()).collect();
    ids.sort_by(|a, b| {
        let ba = draft.get(division_id, a).back_to_back_practices_count;
        let bb = draft.get(division_id, b).back_to_back_practices_count;
        bb.cmp(&ba).then_with(|| name_of[a].cmp(name_of[b]))
    });
    if !ids.is_empty() {
        let offset = (week_number as usize) % ids.len();
        ids.rotate_left(offset);
    }
    ids
}

fn tie_break_key(c: &Candidate) -> (NaiveDate, u16, ResourceId, Option<TeamId>) {
    (c.date, c.start_minute, c.resource_id.clone(), c.teams.first().cloned())
}

/// Linear scan to argmax, ties broken by `(date, startTime, resourceId,
/// homeTeamId)` ascending via pre-sorted iteration order and strict `>`.
fn select_one_phase(candidates: &[Candidate], ctx: &ScoringContext) -> Option<(Candidate, f64)> {
    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| tie_break_key(a).cmp(&tie_break_key(b)));
    let mut best: Option<(&Candidate, f64)> = None;
    for c in sorted {
        let s = score(c, ctx).total;
        let better = match best {
            None => true,
            Some((_, bs)) => s > bs,
        };
        if better {
            best = Some((c, s));
        }
    }
    best.map(|(c, s)| (c.clone(), s))
}

/// Group by date, pick the date whose best candidate (scored without the
/// time-of-day factors) is highest, then return the globally best-scored
/// candidate within that date.
fn select_two_phase(candidates: &[Candidate], ctx: &ScoringContext) -> Option<(Candidate, f64)> {
    if candidates.is_empty() {
        return None;
    }
    let mut by_date: BTreeMap<NaiveDate, Vec<&Candidate>> = BTreeMap::new();
    for c in candidates {
        by_date.entry(c.date).or_default().push(c);
    }

    let mut winning_date = None;
    let mut winning_score = f64::NEG_INFINITY;
    for (date, cs) in &by_date {
        let best = cs
            .iter()
            .map(|c| score_excluding_time_of_day(c, ctx))
            .fold(f64::NEG_INFINITY, f64::max);
        if best > winning_score {
            winning_score = best;
            winning_date = Some(*date);
        }
    }

    let mut on_date: Vec<&Candidate> = by_date.remove(&winning_date?)?;
    on_date.sort_by(|a, b| tie_break_key(a).cmp(&tie_break_key(b)));
    let mut best: Option<(&Candidate, f64)> = None;
    for c in on_date {
        let s = score(c, ctx).total;
        let better = match best {
            None => true,
            Some((_, bs)) => s > bs,
        };
        if better {
            best = Some((c, s));
        }
    }
    best.map(|(c, s)| (c.clone(), s))
}

struct PhaseContext<'a> {
    season_id: &'a SeasonId,
    division_id: &'a DivisionId,
    weights: &'a ScoringWeights,
    team_count: usize,
}

/// Division-wide short-rest/back-to-back-practice averages as of right now,
/// recomputed before every phase so `shortRestBalance` and
/// `backToBackPracticeBalance` compare each candidate against the state the
/// draft has actually reached, not a value fixed at the division's start.
fn division_averages(draft: &DraftState, division_id: &DivisionId, teams: &[Team]) -> (f64, f64) {
    let n = teams.len().max(1) as f64;
    let short: f64 = teams.iter().map(|t| draft.get(division_id, &t.id).short_rest_games_count as f64).sum();
    let back_to_back: f64 = teams.iter().map(|t| draft.get(division_id, &t.id).back_to_back_practices_count as f64).sum();
    (short / n, back_to_back / n)
}

#[allow(clippy::too_many_arguments)]
fn build_candidate(
    event_type: EventType,
    raw: &RawSlot,
    week_number: u32,
    teams: Vec<TeamId>,
) -> Candidate {
    Candidate {
        event_type,
        resource_id: raw.resource_id.clone(),
        date: raw.date,
        start_minute: raw.start_minute,
        end_minute: raw.end_minute,
        week_number,
        teams,
        window_start: raw.window_start,
        window_end: raw.window_end,
    }
}

fn passes_static_filters(raw: &RawSlot, conflict: &ConflictIndex) -> bool {
    if raw.single_event_only && !conflict.resource_events_on(&raw.resource_id, raw.date).is_empty() {
        return false;
    }
    !conflict.resource_busy(&raw.resource_id, raw.date, raw.start_minute, raw.end_minute)
}

fn run_phase_games(
    inputs: &DivisionInputs,
    phase: &PhaseContext,
    week: &WeekDefinition,
    matchups: &[Matchup],
    field_ids: &[ResourceId],
    conflict: &mut ConflictIndex,
    draft: &mut DraftState,
    seq: &mut u64,
    out: &mut DraftOutcome,
) -> Result<(), GenerateError> {
    let config = inputs.config;
    let duration = config.game_duration_minutes() as u16;
    let arrive_before = config.game_arrive_before_minutes() as u16;

    let raw = build_raw_slots(
        field_ids,
        week,
        &inputs.division.id,
        EventType::Game,
        duration,
        arrive_before,
        inputs.field_weekly,
        inputs.field_overrides,
        inputs.blackouts,
    )?;
    let capacity = resource_capacity_map(&raw);

    let mut matchups = matchups.to_vec();
    matchups.sort_by(|a, b| (a.home.clone(), a.away.clone()).cmp(&(b.home.clone(), b.away.clone())));

    for m in &matchups {
        let day_allowed = |date: NaiveDate| -> bool {
            if date < inputs.season.games_start_date || date > inputs.season.end_date {
                return false;
            }
            !matches!(
                config.preference_for_day(crate::time::Weekday0::of(date).0).map(|p| p.priority),
                Some(DayPreferencePriority::Avoid)
            )
        };

        // Games occupy a field, so only an existing field-category booking
        // (game or practice) blocks a new one; a cage session that day is
        // allowed alongside it per Invariant 2.
        let home_busy =
            |date: NaiveDate| draft.get(&inputs.division.id, &m.home).field_dates_used().contains(&date);
        let away_busy =
            |date: NaiveDate| draft.get(&inputs.division.id, &m.away).field_dates_used().contains(&date);

        let candidates: Vec<Candidate> = raw
            .iter()
            .filter(|r| day_allowed(r.date))
            .filter(|r| !home_busy(r.date) && !away_busy(r.date))
            .filter(|r| passes_static_filters(r, conflict))
            .map(|r| build_candidate(EventType::Game, r, week.week_number, vec![m.home.clone(), m.away.clone()]))
            .collect();

        if candidates.is_empty() {
            out.warnings.push(ScheduleWarning::InsufficientResources {
                division_id: inputs.division.id.clone(),
                team_id: m.home.clone(),
                week: week.week_number,
            });
            out.log.push(
                SchedulingLogEntry::info(format!(
                    "no game candidate for {} vs {} in week {}",
                    m.home, m.away, week.week_number
                ))
                .with_division(inputs.division.id.clone()),
            );
            log::warn!("insufficient resources for {} vs {} (week {})", m.home, m.away, week.week_number);
            continue;
        }

        let teams_remaining = matchups
            .iter()
            .filter(|other| {
                draft.get(&inputs.division.id, &other.home).games_in_week(week.week_number) == 0
                    || draft.get(&inputs.division.id, &other.away).games_in_week(week.week_number) == 0
            })
            .count();

        let (avg_short_rest, avg_back_to_back) = division_averages(draft, &inputs.division.id, inputs.teams);
        let ctx = ScoringContext {
            weights: phase.weights,
            conflict,
            draft,
            division_id: &inputs.division.id,
            config,
            resource_capacity: &capacity,
            teams_remaining_this_phase: teams_remaining,
            team_count_in_division: phase.team_count,
            division_avg_short_rest: avg_short_rest,
            division_avg_back_to_back: avg_back_to_back,
        };

        let Some((winner, _)) = select_one_phase(&candidates, &ctx) else {
            continue;
        };

        let id = new_event_id(&inputs.division.id, seq);
        let event = ScheduledEvent {
            id: id.clone(),
            season_id: phase.season_id.clone(),
            division_id: inputs.division.id.clone(),
            event_type: EventType::Game,
            date: winner.date,
            start_minute: winner.start_minute,
            end_minute: winner.end_minute,
            field_id: field_id_of(&winner.resource_id),
            cage_id: None,
            booking: Booking::Game { home_team_id: m.home.clone(), away_team_id: m.away.clone() },
            status: EventStatus::Scheduled,
            notes: None,
            created_at: 0,
            updated_at: 0,
        };

        draft.get_mut(&inputs.division.id, &m.home).record_game(
            winner.date,
            winner.start_minute,
            winner.end_minute,
            week.week_number,
            true,
            &m.away,
        );
        draft.get_mut(&inputs.division.id, &m.away).record_game(
            winner.date,
            winner.start_minute,
            winner.end_minute,
            week.week_number,
            false,
            &m.home,
        );
        conflict.insert(event.clone());
        out.log.push(
            SchedulingLogEntry::info(format!("scheduled game {} on {}", id, winner.date))
                .with_division(inputs.division.id.clone()),
        );
        log::debug!("committed game {id} {} vs {} on {}", m.home, m.away, winner.date);
        out.events.push(event);
    }

    Ok(())
}

fn field_id_of(resource_id: &ResourceId) -> Option<crate::model::FieldId> {
    match resource_id {
        ResourceId::Field(id) => Some(id.clone()),
        ResourceId::Cage(_) => None,
    }
}

fn cage_id_of(resource_id: &ResourceId) -> Option<crate::model::CageId> {
    match resource_id {
        ResourceId::Cage(id) => Some(id.clone()),
        ResourceId::Field(_) => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn run_single_team_phase(
    inputs: &DivisionInputs,
    phase: &PhaseContext,
    week: &WeekDefinition,
    event_type: EventType,
    resource_ids: &[ResourceId],
    weekly: &[WeeklyAvailability],
    overrides: &[DateOverride],
    duration: u16,
    arrive_before: u16,
    quota: u32,
    two_phase: bool,
    conflict: &mut ConflictIndex,
    draft: &mut DraftState,
    seq: &mut u64,
    out: &mut DraftOutcome,
) -> Result<(), GenerateError> {
    if quota == 0 {
        return Ok(());
    }
    let raw = build_raw_slots(
        resource_ids,
        week,
        &inputs.division.id,
        event_type,
        duration,
        arrive_before,
        weekly,
        overrides,
        inputs.blackouts,
    )?;
    let capacity = resource_capacity_map(&raw);
    let order = rotated_team_order(inputs.teams, draft, &inputs.division.id, week.week_number);

    let already_has = |draft: &DraftState, team: &TeamId, date: NaiveDate| -> bool {
        let state = draft.get(&inputs.division.id, team);
        match event_type {
            EventType::Cage => state.dates_with_cage.contains(&date),
            _ => state.field_dates_used().contains(&date),
        }
    };
    let current_count = |draft: &DraftState, team: &TeamId| -> u32 {
        let state = draft.get(&inputs.division.id, team);
        match event_type {
            EventType::Cage => state.cage_sessions_in_week(week.week_number),
            _ => state.practices_in_week(week.week_number),
        }
    };

    for _round in 0..quota {
        for team in &order {
            if current_count(draft, team) >= quota {
                continue;
            }
            let candidates: Vec<Candidate> = raw
                .iter()
                .filter(|r| !already_has(draft, team, r.date))
                .filter(|r| passes_static_filters(r, conflict))
                .map(|r| build_candidate(event_type, r, week.week_number, vec![team.clone()]))
                .collect();

            if candidates.is_empty() {
                out.warnings.push(ScheduleWarning::InsufficientResources {
                    division_id: inputs.division.id.clone(),
                    team_id: team.clone(),
                    week: week.week_number,
                });
                continue;
            }

            let teams_remaining = order.iter().filter(|t| current_count(draft, t) < quota).count();
            let (avg_short_rest, avg_back_to_back) = division_averages(draft, &inputs.division.id, inputs.teams);
            let ctx = ScoringContext {
                weights: phase.weights,
                conflict,
                draft,
                division_id: &inputs.division.id,
                config: inputs.config,
                resource_capacity: &capacity,
                teams_remaining_this_phase: teams_remaining,
                team_count_in_division: phase.team_count,
                division_avg_short_rest: avg_short_rest,
                division_avg_back_to_back: avg_back_to_back,
            };

            let winner = if two_phase {
                select_two_phase(&candidates, &ctx)
            } else {
                select_one_phase(&candidates, &ctx)
            };
            let Some((winner, _)) = winner else { continue };

            let id = new_event_id(&inputs.division.id, seq);
            let event = ScheduledEvent {
                id: id.clone(),
                season_id: inputs.season.id.clone(),
                division_id: inputs.division.id.clone(),
                event_type,
                date: winner.date,
                start_minute: winner.start_minute,
                end_minute: winner.end_minute,
                field_id: field_id_of(&winner.resource_id),
                cage_id: cage_id_of(&winner.resource_id),
                booking: Booking::SingleTeam { team_id: team.clone() },
                status: EventStatus::Scheduled,
                notes: None,
                created_at: 0,
                updated_at: 0,
            };

            let state = draft.get_mut(&inputs.division.id, team);
            match event_type {
                EventType::Cage => state.record_cage(winner.date, winner.start_minute, winner.end_minute, week.week_number),
                _ => state.record_practice(winner.date, winner.start_minute, winner.end_minute, week.week_number),
            }
            conflict.insert(event.clone());
            log::debug!("committed {:?} {id} for {team} on {}", event_type, winner.date);
            out.events.push(event);
        }
    }

    Ok(())
}

/// Runs every phase (games, practices, cages, optional paired practices)
/// for one division across its full season span.
pub fn draft_division(
    inputs: &DivisionInputs,
    weights: &ScoringWeights,
    conflict: &mut ConflictIndex,
    draft: &mut DraftState,
    seq: &mut u64,
) -> Result<DraftOutcome, GenerateError> {
    let mut out = DraftOutcome::default();
    let weeks = enumerate_weeks(inputs.season.start_date, inputs.season.end_date);

    let field_ids: Vec<ResourceId> = inputs
        .fields
        .iter()
        .filter(|f| f.compatible_with(&inputs.division.id))
        .map(|f| ResourceId::Field(f.id.clone()))
        .collect();
    let cage_ids: Vec<ResourceId> = inputs
        .cages
        .iter()
        .filter(|c| c.compatible_with(&inputs.division.id))
        .map(|c| ResourceId::Cage(c.id.clone()))
        .collect();

    if inputs.config.games_per_week > 0 && field_ids.is_empty() {
        return Err(GenerateError::NoFieldsForGames(inputs.season.id.to_string()));
    }

    let team_ids: Vec<TeamId> = inputs.teams.iter().map(|t| t.id.clone()).collect();
    let phase = PhaseContext {
        season_id: &inputs.season.id,
        division_id: &inputs.division.id,
        weights,
        team_count: inputs.teams.len().max(1),
    };

    let game_weeks: Vec<&WeekDefinition> = weeks
        .iter()
        .filter(|w| {
            w.dates_in_range
                .iter()
                .any(|d| *d >= inputs.season.games_start_date && *d <= inputs.season.end_date)
        })
        .filter(|w| inputs.config.games_per_week_for(w.week_number) > 0)
        .collect();

    if !game_weeks.is_empty() && team_ids.len() >= 2 {
        let rounds_per_cycle = if team_ids.len() % 2 == 0 { team_ids.len() - 1 } else { team_ids.len() };
        let total_quota: u32 = game_weeks.iter().map(|w| inputs.config.games_per_week_for(w.week_number)).sum();
        let cycles = ((total_quota as f64) / (rounds_per_cycle.max(1) as f64)).ceil().max(1.0) as u32;
        let rounds = build_round_robin(&team_ids, cycles);
        let avg_games_per_week = (total_quota as f64 / game_weeks.len().max(1) as f64).ceil().max(1.0) as u32;
        let weekly_matchups = assign_matchups_to_weeks(rounds, game_weeks.len() as u32, avg_games_per_week);

        for (week, matchups) in game_weeks.iter().zip(weekly_matchups.iter()) {
            run_phase_games(inputs, &phase, week, matchups, &field_ids, conflict, draft, seq, &mut out)?;
        }
    }

    for week in &weeks {
        run_single_team_phase(
            inputs,
            &phase,
            week,
            EventType::Practice,
            &field_ids,
            inputs.field_weekly,
            inputs.field_overrides,
            inputs.config.practice_duration_minutes() as u16,
            inputs.config.practice_arrive_before_minutes as u16,
            inputs.config.practices_per_week,
            true,
            conflict,
            draft,
            seq,
            &mut out,
        )?;

        run_single_team_phase(
            inputs,
            &phase,
            week,
            EventType::Cage,
            &cage_ids,
            inputs.cage_weekly,
            inputs.cage_overrides,
            inputs.config.cage_session_duration_minutes() as u16,
            inputs.config.practice_arrive_before_minutes as u16,
            inputs.config.cage_sessions_per_week,
            true,
            conflict,
            draft,
            seq,
            &mut out,
        )?;

        if inputs.config.sunday_paired_practice_enabled {
            let pairing_events = generate_team_pairings_for_week(
                inputs,
                week,
                conflict,
                draft,
                seq,
            )?;
            for (event, warning) in pairing_events {
                if let Some(event) = event {
                    out.events.push(event);
                }
                if let Some(warning) = warning {
                    out.warnings.push(warning);
                }
            }
        }
    }

    Ok(out)
}
