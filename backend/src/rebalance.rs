//! Post-pass rebalancing: home/away label swaps per matchup, and a bounded
//! short-rest swap pass across a division's committed games (C8).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{Booking, DivisionId, EventType, ScheduledEvent, TeamId};
use crate::time::days_between;

fn pair_key(a: &TeamId, b: &TeamId) -> (TeamId, TeamId) {
    if a < b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) }
}

/// Flips home/away labels (never dates or resources) until every matchup
/// pair in `division_id` is within 1 of balanced, or no further flip would
/// help. Operates directly on already-committed events.
pub fn rebalance_matchup_home_away(events: &mut [ScheduledEvent], division_id: &DivisionId) {
    let mut by_pair: BTreeMap<(TeamId, TeamId), Vec<usize>> = BTreeMap::new();
    for (i, e) in events.iter().enumerate() {
        if e.division_id != *division_id {
            continue;
        }
        if let Booking::Game { home_team_id, away_team_id } = &e.booking {
            by_pair.entry(pair_key(home_team_id, away_team_id)).or_default().push(i);
        }
    }

    for ((lo, hi), mut idxs) in by_pair {
        idxs.sort_by(|&a, &b| events[a].id.cmp(&events[b].id));
        loop {
            let mut lo_home = 0i64;
            let mut hi_home = 0i64;
            for &i in &idxs {
                if let Booking::Game { home_team_id, .. } = &events[i].booking {
                    if *home_team_id == lo {
                        lo_home += 1;
                    } else {
                        hi_home += 1;
                    }
                }
            }
            let diff = lo_home - hi_home;
            if diff.abs() <= 1 {
                break;
            }
            let overrepresented_home = if diff > 1 { &lo } else { &hi };
            let flip = idxs.iter().find(|&&i| match &events[i].booking {
                Booking::Game { home_team_id, .. } => home_team_id == overrepresented_home,
                _ => false,
            });
            let Some(&flip_idx) = flip else { break };
            if let Booking::Game { home_team_id, away_team_id } = events[flip_idx].booking.clone() {
                events[flip_idx].booking = Booking::Game { home_team_id: away_team_id, away_team_id: home_team_id };
            }
        }
    }
}

fn game_indices_for_team(events: &[ScheduledEvent], division_id: &DivisionId, team: &TeamId) -> Vec<usize> {
    let mut idxs: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.division_id == *division_id && matches!(e.event_type, EventType::Game) && e.teams().contains(team))
        .map(|(i, _)| i)
        .collect();
    idxs.sort_by(|&a, &b| events[a].id.cmp(&events[b].id));
    idxs
}

fn short_rest_count_for_team(events: &[ScheduledEvent], division_id: &DivisionId, team: &TeamId) -> u32 {
    let mut dates: Vec<NaiveDate> = game_indices_for_team(events, division_id, team)
        .into_iter()
        .map(|i| events[i].date)
        .collect();
    dates.sort();
    dates.windows(2).filter(|w| days_between(w[0], w[1]) <= 2).count() as u32
}

fn find_short_rest_game(events: &[ScheduledEvent], division_id: &DivisionId, team: &TeamId) -> Option<usize> {
    let idxs = game_indices_for_team(events, division_id, team);
    let mut dated: Vec<(usize, NaiveDate)> = idxs.into_iter().map(|i| (i, events[i].date)).collect();
    dated.sort_by_key(|(_, d)| *d);
    dated.windows(2).find(|w| days_between(w[0].1, w[1].1) <= 2).map(|w| w[0].0)
}

/// Only a field-category event (game, practice, paired practice) can
/// conflict with a game being swapped onto `date`: a cage session that day
/// is allowed alongside it per Invariant 2.
fn team_has_conflict(events: &[ScheduledEvent], division_id: &DivisionId, team: &TeamId, date: NaiveDate, exclude: &[usize]) -> bool {
    events.iter().enumerate().any(|(i, e)| {
        !exclude.contains(&i)
            && e.division_id == *division_id
            && e.date == date
            && e.field_category()
            && e.teams().contains(team)
    })
}

/// A rematch within 7 days of another meeting between the same pair is
/// avoided where achievable; this only blocks a swap, it never un-does a
/// spacing violation the initial draft already produced.
fn pair_violates_rematch_spacing(
    events: &[ScheduledEvent],
    division_id: &DivisionId,
    a: &TeamId,
    b: &TeamId,
    new_date: NaiveDate,
    exclude: usize,
) -> bool {
    events.iter().enumerate().any(|(i, e)| {
        i != exclude
            && e.division_id == *division_id
            && matches!(e.event_type, EventType::Game)
            && e.teams().contains(a)
            && e.teams().contains(b)
            && days_between(e.date, new_date) < 7
    })
}

fn swap_is_valid(events: &[ScheduledEvent], division_id: &DivisionId, high_idx: usize, low_idx: usize) -> bool {
    let high_date = events[high_idx].date;
    let low_date = events[low_idx].date;
    if high_date == low_date {
        return false;
    }
    let high_teams = events[high_idx].teams();
    let low_teams = events[low_idx].teams();
    let exclude = [high_idx, low_idx];

    if high_teams.iter().any(|t| team_has_conflict(events, division_id, t, low_date, &exclude)) {
        return false;
    }
    if low_teams.iter().any(|t| team_has_conflict(events, division_id, t, high_date, &exclude)) {
        return false;
    }
    if high_teams.len() == 2 && pair_violates_rematch_spacing(events, division_id, &high_teams[0], &high_teams[1], low_date, high_idx) {
        return false;
    }
    if low_teams.len() == 2 && pair_violates_rematch_spacing(events, division_id, &low_teams[0], &low_teams[1], high_date, low_idx) {
        return false;
    }
    true
}

fn apply_swap(events: &mut [ScheduledEvent], i: usize, j: usize) {
    let (date_i, start_i, end_i, field_i) = (events[i].date, events[i].start_minute, events[i].end_minute, events[i].field_id.clone());
    let (date_j, start_j, end_j, field_j) = (events[j].date, events[j].start_minute, events[j].end_minute, events[j].field_id.clone());
    events[i].date = date_j;
    events[i].start_minute = start_j;
    events[i].end_minute = end_j;
    events[i].field_id = field_j;
    events[j].date = date_i;
    events[j].start_minute = start_i;
    events[j].end_minute = end_i;
    events[j].field_id = field_i;
}

/// Swaps the dates/times/fields of a high-short-rest team's game with a
/// low-short-rest team's game, up to `max_attempts` times, stopping as soon
/// as no attempt can strictly improve the spread without a new conflict or
/// a sub-7-day rematch. Never increases the total short-rest count.
pub fn rebalance_short_rest(events: &mut [ScheduledEvent], division_id: &DivisionId, teams: &[TeamId], max_attempts: u32) -> u32 {
    let mut attempts_used = 0;
    for _ in 0..max_attempts {
        attempts_used += 1;
        let counts: BTreeMap<TeamId, u32> =
            teams.iter().map(|t| (t.clone(), short_rest_count_for_team(events, division_id, t))).collect();
        let Some((max_team, &max_c)) = counts.iter().max_by_key(|(_, c)| **c) else { break };
        let Some((min_team, &min_c)) = counts.iter().min_by_key(|(_, c)| **c) else { break };
        if max_c <= min_c + 1 {
            break;
        }
        let max_team = max_team.clone();
        let min_team = min_team.clone();

        let Some(high_idx) = find_short_rest_game(events, division_id, &max_team) else { break };
        let candidates = game_indices_for_team(events, division_id, &min_team);

        let swap_target = candidates.into_iter().find(|&low_idx| swap_is_valid(events, division_id, high_idx, low_idx));
        match swap_target {
            Some(low_idx) => apply_swap(events, high_idx, low_idx),
            None => break,
        }
    }
    attempts_used
}
