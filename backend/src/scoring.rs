//! Scores a candidate placement as `Σ weight_f · raw_f` over a fixed,
//! ordered list of factors (C5). Each raw factor returns a value in `[0,1]`
//! (continuous or binary); the sign of the contribution comes entirely from
//! the factor's weight in [`ScoringWeights`], not from the raw function.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::conflict::ConflictIndex;
use crate::model::{DayPreferencePriority, DivisionConfig, DivisionId, EventType, FieldId, ResourceId, TeamId};
use crate::state::{DraftState, CAGE_FIELD_GAP_THRESHOLD_MINUTES};
use crate::time::Weekday0;
use crate::weights::ScoringWeights;

/// A concrete placement under consideration: not yet committed, just scored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub event_type: EventType,
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub start_minute: u16,
    pub end_minute: u16,
    pub week_number: u32,
    /// `[team]` for practice/cage, `[home, away]` for a game, `[a, b]` for a
    /// paired practice. Order matters for games: index 0 is home.
    pub teams: Vec<TeamId>,
    /// The open window this candidate was drawn from, used by
    /// `earliestTime` to measure how early in the window the start is.
    pub window_start: u16,
    pub window_end: u16,
}

impl Candidate {
    fn is_field_category(&self) -> bool {
        matches!(self.event_type, EventType::Game | EventType::Practice | EventType::PairedPractice)
    }

    fn is_cage_category(&self) -> bool {
        matches!(self.event_type, EventType::Cage | EventType::PairedPractice)
    }

    fn day_of_week(&self) -> u8 {
        Weekday0::of(self.date).0
    }

    fn is_weekend(&self) -> bool {
        matches!(self.day_of_week(), 0 | 6)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FactorScore {
    pub raw: f64,
    pub weighted: f64,
}

/// Every factor's raw/weighted contribution, kept around so tests and the
/// evaluator (C11) can introspect exactly why a candidate scored the way it
/// did instead of only seeing the sum.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub day_spread: FactorScore,
    pub week_balance: FactorScore,
    pub resource_utilization: FactorScore,
    pub game_day_preference: FactorScore,
    pub time_quality: FactorScore,
    pub home_away_balance: FactorScore,
    pub matchup_home_away_balance: FactorScore,
    pub day_gap: FactorScore,
    pub practice_spacing: FactorScore,
    pub time_adjacency: FactorScore,
    pub earliest_time: FactorScore,
    pub field_preference: FactorScore,
    pub same_day_event: FactorScore,
    pub scarcity: FactorScore,
    pub same_day_cage_field_gap: FactorScore,
    pub weekend_morning_practice: FactorScore,
    pub short_rest_balance: FactorScore,
    pub back_to_back_practice_balance: FactorScore,
    pub large_gap_penalty: FactorScore,
    pub total: f64,
}

/// Everything the scoring engine reads from the running draft besides the
/// candidate itself. Borrowed for the lifetime of one `score` call.
pub struct ScoringContext<'a> {
    pub weights: &'a ScoringWeights,
    pub conflict: &'a ConflictIndex,
    pub draft: &'a DraftState,
    pub division_id: &'a DivisionId,
    pub config: &'a DivisionConfig,
    /// Total number of open slots generated for a resource across the whole
    /// season, used as `capacity(r)` in `resourceUtilization`.
    pub resource_capacity: &'a BTreeMap<ResourceId, usize>,
    /// How many teams in the division still need a placement of this
    /// event's type during the current phase/week; feeds `scarcity`.
    pub teams_remaining_this_phase: usize,
    pub team_count_in_division: usize,
    pub division_avg_short_rest: f64,
    pub division_avg_back_to_back: f64,
}

/// Time-of-day factors peak in the mid-afternoon; used by `timeQuality`.
const TIME_QUALITY_PEAK_MINUTE: f64 = 15.0 * 60.0;
const TIME_QUALITY_HALF_WIDTH_MINUTES: f64 = 7.0 * 60.0;

fn day_spread(c: &Candidate, ctx: &ScoringContext) -> f64 {
    let dow = c.day_of_week();
    average_over_teams(c, ctx, |state| {
        let total = state.total_events().max(1) as f64;
        1.0 - (state.dow_usage(dow) as f64 / total)
    })
}

fn week_balance(c: &Candidate, ctx: &ScoringContext) -> f64 {
    let quota = match c.event_type {
        EventType::Game => ctx.config.games_per_week_for(c.week_number),
        EventType::Practice | EventType::PairedPractice => ctx.config.practices_per_week,
        EventType::Cage => ctx.config.cage_sessions_per_week,
    };
    if quota == 0 {
        return 1.0;
    }
    average_over_teams(c, ctx, |state| {
        let current = match c.event_type {
            EventType::Game => state.games_in_week(c.week_number),
            EventType::Practice | EventType::PairedPractice => state.practices_in_week(c.week_number),
            EventType::Cage => state.cage_sessions_in_week(c.week_number),
        };
        (1.0 - current as f64 / quota as f64).clamp(0.0, 1.0)
    })
}

fn resource_utilization(c: &Candidate, ctx: &ScoringContext) -> f64 {
    let capacity = ctx.resource_capacity.get(&c.resource_id).copied().unwrap_or(0);
    if capacity == 0 {
        return 0.5;
    }
    let usage = ctx.conflict.resource_event_count(&c.resource_id);
    (1.0 - usage as f64 / capacity as f64).clamp(0.0, 1.0)
}

fn game_day_preference(c: &Candidate, ctx: &ScoringContext) -> f64 {
    if !matches!(c.event_type, EventType::Game) {
        return 1.0;
    }
    match ctx.config.preference_for_day(c.day_of_week()) {
        Some(p) => match p.priority {
            DayPreferencePriority::Required | DayPreferencePriority::Preferred => 1.0,
            DayPreferencePriority::Acceptable => 0.7,
            DayPreferencePriority::Avoid => 0.0,
        },
        // No explicit preference on record for this day: neither rewarded
        // nor punished as hard as an explicit "avoid".
        None => 0.85,
    }
}

fn time_quality(c: &Candidate, _ctx: &ScoringContext) -> f64 {
    if matches!(c.event_type, EventType::Game) {
        return 1.0;
    }
    let distance = (c.start_minute as f64 - TIME_QUALITY_PEAK_MINUTE).abs();
    (1.0 - distance / TIME_QUALITY_HALF_WIDTH_MINUTES).clamp(0.0, 1.0)
}

/// 1.0 if being on this side of the matchup corrects `team`'s current
/// home/away imbalance, 0.7 if it's already balanced, 0.3 if it would widen
/// the gap further.
fn side_correction_score(home_games: u32, away_games: u32, is_home: bool) -> f64 {
    let (mine, theirs) = if is_home { (home_games, away_games) } else { (away_games, home_games) };
    if mine < theirs {
        1.0
    } else if mine == theirs {
        0.7
    } else {
        0.3
    }
}

fn home_away_balance(c: &Candidate, ctx: &ScoringContext) -> f64 {
    if !matches!(c.event_type, EventType::Game) || c.teams.len() != 2 {
        return 1.0;
    }
    let home = ctx.draft.get(ctx.division_id, &c.teams[0]);
    let away = ctx.draft.get(ctx.division_id, &c.teams[1]);
    let home_score = side_correction_score(home.home_games, home.away_games, true);
    let away_score = side_correction_score(away.home_games, away.away_games, false);
    (home_score + away_score) / 2.0
}

fn matchup_home_away_balance(c: &Candidate, ctx: &ScoringContext) -> f64 {
    if !matches!(c.event_type, EventType::Game) || c.teams.len() != 2 {
        return 1.0;
    }
    let home = ctx.draft.get(ctx.division_id, &c.teams[0]);
    let away = ctx.draft.get(ctx.division_id, &c.teams[1]);
    let home_vs_away = *home.home_games_against.get(&c.teams[1]).unwrap_or(&0);
    let away_vs_home = *away.home_games_against.get(&c.teams[0]).unwrap_or(&0);
    side_correction_score(home_vs_away, away_vs_home, true)
}

fn gap_score(gap: Option<i64>) -> f64 {
    match gap {
        None => 1.0,
        Some(g) if g >= 2 => 1.0,
        Some(1) => 0.5,
        _ => 0.0,
    }
}

fn day_gap(c: &Candidate, ctx: &ScoringContext) -> f64 {
    average_over_teams(c, ctx, |state| {
        let gaps = [
            c.is_field_category().then(|| state.nearest_field_gap(c.date)).flatten(),
            c.is_cage_category().then(|| state.nearest_cage_gap(c.date)).flatten(),
        ];
        let relevant: Vec<i64> = gaps.into_iter().flatten().collect();
        gap_score(relevant.into_iter().min())
    })
}

fn practice_spacing(c: &Candidate, ctx: &ScoringContext) -> f64 {
    if !matches!(c.event_type, EventType::Practice) {
        return 1.0;
    }
    average_over_teams(c, ctx, |state| match state.nearest_practice_gap(c.date) {
        None => 1.0,
        Some(g) if g >= 2 => 1.0,
        Some(1) => 0.3,
        _ => 0.0,
    })
}

fn time_adjacency(c: &Candidate, ctx: &ScoringContext) -> f64 {
    let neighbors = ctx.conflict.resource_events_on(&c.resource_id, c.date);
    let adjacent = neighbors
        .iter()
        .any(|e| e.end_minute == c.start_minute || e.start_minute == c.end_minute);
    if adjacent {
        1.0
    } else {
        0.0
    }
}

fn earliest_time(c: &Candidate, _ctx: &ScoringContext) -> f64 {
    if !matches!(c.event_type, EventType::Game) {
        return 1.0;
    }
    let span = (c.window_end.saturating_sub(c.window_start)).max(1) as f64;
    (1.0 - (c.start_minute.saturating_sub(c.window_start)) as f64 / span).clamp(0.0, 1.0)
}

fn field_preference(c: &Candidate, ctx: &ScoringContext) -> f64 {
    let ResourceId::Field(field_id) = &c.resource_id else {
        return 1.0;
    };
    let prefs = &ctx.config.field_preferences;
    match prefs.iter().position(|f: &FieldId| f == field_id) {
        Some(idx) if !prefs.is_empty() => 1.0 - (idx as f64 / prefs.len() as f64),
        _ => 0.0,
    }
}

fn same_day_event(c: &Candidate, ctx: &ScoringContext) -> f64 {
    let conflict = c.teams.iter().any(|t| {
        let state = ctx.draft.get(ctx.division_id, t);
        (c.is_field_category() && state.field_dates_used().contains(&c.date))
            || (c.is_cage_category() && state.dates_with_cage.contains(&c.date))
    });
    if conflict {
        1.0
    } else {
        0.0
    }
}

/// Deliberately simplified: the exact "scarcity" population a real
/// deployment would poll (which other teams' availability windows also
/// cover this slot) isn't observable from `ScoringContext` without a second
/// pass over every other team's candidate set, which the draft loop doesn't
/// build. Approximated here as the fraction of the division's teams still
/// waiting on a placement in the current phase, which captures the same
/// "don't hog a contested resource early" intent at a fraction of the cost.
fn scarcity(_c: &Candidate, ctx: &ScoringContext) -> f64 {
    let others = ctx.team_count_in_division.saturating_sub(1).max(1);
    (ctx.teams_remaining_this_phase as f64 / others as f64).clamp(0.0, 1.0)
}

fn same_day_cage_field_gap(c: &Candidate, ctx: &ScoringContext) -> f64 {
    let flagged = c.teams.iter().any(|t| {
        let state = ctx.draft.get(ctx.division_id, t);
        let gap = if c.is_field_category() && !c.is_cage_category() {
            state.cage_slot_on_date.get(&c.date).map(|(cs, ce)| {
                if c.end_minute <= *cs {
                    *cs as i64 - c.end_minute as i64
                } else if *ce <= c.start_minute {
                    c.start_minute as i64 - *ce as i64
                } else {
                    0
                }
            })
        } else if c.is_cage_category() && !c.is_field_category() {
            state.field_slot_on_date.get(&c.date).map(|(fs, fe)| {
                if c.end_minute <= *fs {
                    *fs as i64 - c.end_minute as i64
                } else if *fe <= c.start_minute {
                    c.start_minute as i64 - *fe as i64
                } else {
                    0
                }
            })
        } else {
            state.cage_field_gap_minutes(c.date)
        };
        gap.is_some_and(|g| g > CAGE_FIELD_GAP_THRESHOLD_MINUTES)
    });
    if flagged {
        1.0
    } else {
        0.0
    }
}

fn weekend_morning_practice(c: &Candidate, _ctx: &ScoringContext) -> f64 {
    if matches!(c.event_type, EventType::Game) {
        return 0.0;
    }
    if c.is_weekend() && c.start_minute < 12 * 60 {
        1.0
    } else {
        0.0
    }
}

fn short_rest_balance(c: &Candidate, ctx: &ScoringContext) -> f64 {
    if !matches!(c.event_type, EventType::Game) {
        return 0.0;
    }
    let within_short_rest = c.teams.iter().any(|t| {
        ctx.draft
            .get(ctx.division_id, t)
            .nearest_field_gap(c.date)
            .is_some_and(|g| g <= 2)
    });
    let above_average = c.teams.iter().any(|t| {
        ctx.draft.get(ctx.division_id, t).short_rest_games_count as f64 > ctx.division_avg_short_rest
    });
    if within_short_rest && above_average {
        1.0
    } else {
        0.0
    }
}

fn back_to_back_practice_balance(c: &Candidate, ctx: &ScoringContext) -> f64 {
    if !matches!(c.event_type, EventType::Practice) {
        return 0.0;
    }
    average_over_teams(c, ctx, |state| {
        let adjacent = state.nearest_practice_gap(c.date).is_some_and(|g| g <= 1);
        if !adjacent {
            return 0.0;
        }
        let excess = (state.back_to_back_practices_count as f64 - ctx.division_avg_back_to_back).max(0.0);
        (excess / (ctx.division_avg_back_to_back + 1.0)).clamp(0.0, 1.0)
    })
}

fn large_gap_penalty(c: &Candidate, ctx: &ScoringContext) -> f64 {
    average_over_teams(c, ctx, |state| {
        let gap = if c.is_field_category() {
            state.nearest_field_gap(c.date)
        } else {
            state.nearest_cage_gap(c.date)
        };
        match gap {
            Some(g) if g > 5 => ((g - 5) as f64 / 10.0).min(1.0),
            _ => 0.0,
        }
    })
}

fn average_over_teams(
    c: &Candidate,
    ctx: &ScoringContext,
    f: impl Fn(&crate::state::TeamSchedulingState) -> f64,
) -> f64 {
    if c.teams.is_empty() {
        return 1.0;
    }
    let sum: f64 = c.teams.iter().map(|t| f(ctx.draft.get(ctx.division_id, t))).sum();
    sum / c.teams.len() as f64
}

macro_rules! factor {
    ($breakdown:expr, $total:expr, $ctx:expr, $c:expr, $field:ident, $raw_fn:expr, $weight_field:ident) => {{
        let raw = $raw_fn($c, $ctx);
        let weighted = raw * $ctx.weights.$weight_field;
        $breakdown.$field = FactorScore { raw, weighted };
        $total += weighted;
    }};
}

/// Scores `candidate` against every factor, returning the full breakdown.
/// The factor order is fixed at compile time; there is no runtime
/// registration of additional factors.
pub fn score(candidate: &Candidate, ctx: &ScoringContext) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();
    let mut total = 0.0;

    factor!(breakdown, total, ctx, candidate, day_spread, day_spread, day_spread);
    factor!(breakdown, total, ctx, candidate, week_balance, week_balance, week_balance);
    factor!(breakdown, total, ctx, candidate, resource_utilization, resource_utilization, resource_utilization);
    factor!(breakdown, total, ctx, candidate, game_day_preference, game_day_preference, game_day_preference);
    factor!(breakdown, total, ctx, candidate, time_quality, time_quality, time_quality);
    factor!(breakdown, total, ctx, candidate, home_away_balance, home_away_balance, home_away_balance);
    factor!(breakdown, total, ctx, candidate, matchup_home_away_balance, matchup_home_away_balance, matchup_home_away_balance);
    factor!(breakdown, total, ctx, candidate, day_gap, day_gap, day_gap);
    factor!(breakdown, total, ctx, candidate, practice_spacing, practice_spacing, practice_spacing);
    factor!(breakdown, total, ctx, candidate, time_adjacency, time_adjacency, time_adjacency);
    factor!(breakdown, total, ctx, candidate, earliest_time, earliest_time, earliest_time);
    factor!(breakdown, total, ctx, candidate, field_preference, field_preference, field_preference);
    factor!(breakdown, total, ctx, candidate, same_day_event, same_day_event, same_day_event);
    factor!(breakdown, total, ctx, candidate, scarcity, scarcity, scarcity);
    factor!(breakdown, total, ctx, candidate, same_day_cage_field_gap, same_day_cage_field_gap, same_day_cage_field_gap);
    factor!(breakdown, total, ctx, candidate, weekend_morning_practice, weekend_morning_practice, weekend_morning_practice);
    factor!(breakdown, total, ctx, candidate, short_rest_balance, short_rest_balance, short_rest_balance);
    factor!(breakdown, total, ctx, candidate, back_to_back_practice_balance, back_to_back_practice_balance, back_to_back_practice_balance);
    factor!(breakdown, total, ctx, candidate, large_gap_penalty, large_gap_penalty, large_gap_penalty);

    breakdown.total = total;
    breakdown
}

macro_rules! for_each_factor {
    ($self:ident, $other:ident, $op:tt) => {{
        $self.day_spread.raw $op $other.day_spread.raw; $self.day_spread.weighted $op $other.day_spread.weighted;
        $self.week_balance.raw $op $other.week_balance.raw; $self.week_balance.weighted $op $other.week_balance.weighted;
        $self.resource_utilization.raw $op $other.resource_utilization.raw; $self.resource_utilization.weighted $op $other.resource_utilization.weighted;
        $self.game_day_preference.raw $op $other.game_day_preference.raw; $self.game_day_preference.weighted $op $other.game_day_preference.weighted;
        $self.time_quality.raw $op $other.time_quality.raw; $self.time_quality.weighted $op $other.time_quality.weighted;
        $self.home_away_balance.raw $op $other.home_away_balance.raw; $self.home_away_balance.weighted $op $other.home_away_balance.weighted;
        $self.matchup_home_away_balance.raw $op $other.matchup_home_away_balance.raw; $self.matchup_home_away_balance.weighted $op $other.matchup_home_away_balance.weighted;
        $self.day_gap.raw $op $other.day_gap.raw; $self.day_gap.weighted $op $other.day_gap.weighted;
        $self.practice_spacing.raw $op $other.practice_spacing.raw; $self.practice_spacing.weighted $op $other.practice_spacing.weighted;
        $self.time_adjacency.raw $op $other.time_adjacency.raw; $self.time_adjacency.weighted $op $other.time_adjacency.weighted;
        $self.earliest_time.raw $op $other.earliest_time.raw; $self.earliest_time.weighted $op $other.earliest_time.weighted;
        $self.field_preference.raw $op $other.field_preference.raw; $self.field_preference.weighted $op $other.field_preference.weighted;
        $self.same_day_event.raw $op $other.same_day_event.raw; $self.same_day_event.weighted $op $other.same_day_event.weighted;
        $self.scarcity.raw $op $other.scarcity.raw; $self.scarcity.weighted $op $other.scarcity.weighted;
        $self.same_day_cage_field_gap.raw $op $other.same_day_cage_field_gap.raw; $self.same_day_cage_field_gap.weighted $op $other.same_day_cage_field_gap.weighted;
        $self.weekend_morning_practice.raw $op $other.weekend_morning_practice.raw; $self.weekend_morning_practice.weighted $op $other.weekend_morning_practice.weighted;
        $self.short_rest_balance.raw $op $other.short_rest_balance.raw; $self.short_rest_balance.weighted $op $other.short_rest_balance.weighted;
        $self.back_to_back_practice_balance.raw $op $other.back_to_back_practice_balance.raw; $self.back_to_back_practice_balance.weighted $op $other.back_to_back_practice_balance.weighted;
        $self.large_gap_penalty.raw $op $other.large_gap_penalty.raw; $self.large_gap_penalty.weighted $op $other.large_gap_penalty.weighted;
        $self.total $op $other.total;
    }};
}

impl ScoreBreakdown {
    /// Accumulates `other` into `self`, field by field, for the evaluator's
    /// running average over every committed event of one type.
    pub fn add(&mut self, other: &ScoreBreakdown) {
        for_each_factor!(self, other, +=);
    }

    pub fn scale(&mut self, factor: f64) {
        self.day_spread.raw *= factor;
        self.day_spread.weighted *= factor;
        self.week_balance.raw *= factor;
        self.week_balance.weighted *= factor;
        self.resource_utilization.raw *= factor;
        self.resource_utilization.weighted *= factor;
        self.game_day_preference.raw *= factor;
        self.game_day_preference.weighted *= factor;
        self.time_quality.raw *= factor;
        self.time_quality.weighted *= factor;
        self.home_away_balance.raw *= factor;
        self.home_away_balance.weighted *= factor;
        self.matchup_home_away_balance.raw *= factor;
        self.matchup_home_away_balance.weighted *= factor;
        self.day_gap.raw *= factor;
        self.day_gap.weighted *= factor;
        self.practice_spacing.raw *= factor;
        self.practice_spacing.weighted *= factor;
        self.time_adjacency.raw *= factor;
        self.time_adjacency.weighted *= factor;
        self.earliest_time.raw *= factor;
        self.earliest_time.weighted *= factor;
        self.field_preference.raw *= factor;
        self.field_preference.weighted *= factor;
        self.same_day_event.raw *= factor;
        self.same_day_event.weighted *= factor;
        self.scarcity.raw *= factor;
        self.scarcity.weighted *= factor;
        self.same_day_cage_field_gap.raw *= factor;
        self.same_day_cage_field_gap.weighted *= factor;
        self.weekend_morning_practice.raw *= factor;
        self.weekend_morning_practice.weighted *= factor;
        self.short_rest_balance.raw *= factor;
        self.short_rest_balance.weighted *= factor;
        self.back_to_back_practice_balance.raw *= factor;
        self.back_to_back_practice_balance.weighted *= factor;
        self.large_gap_penalty.raw *= factor;
        self.large_gap_penalty.weighted *= factor;
        self.total *= factor;
    }
}

/// The two-phase practice selection strips the time-of-day factors so a
/// date can be picked on its merits before the best time-of-day candidate
/// within that date is chosen (the "two-phase" selection mode).
pub fn score_excluding_time_of_day(candidate: &Candidate, ctx: &ScoringContext) -> f64 {
    let breakdown = score(candidate, ctx);
    breakdown.total - breakdown.earliest_time.weighted - breakdown.time_adjacency.weighted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DayPreferencePriority, GameDayPreference};
    use std::collections::BTreeMap as Map;

    fn base_config() -> DivisionConfig {
        DivisionConfig {
            division_id: DivisionId::from("u10"),
            practices_per_week: 1,
            practice_duration_hours: 1.0,
            games_per_week: 1,
            game_duration_hours: 1.0,
            game_arrive_before_hours: 0.25,
            game_day_preferences: vec![GameDayPreference {
                day_of_week: 6,
                priority: DayPreferencePriority::Preferred,
                max_games_per_day: None,
            }],
            cage_sessions_per_week: 1,
            cage_session_duration_hours: 1.0,
            field_preferences: vec![FieldId::from("f1"), FieldId::from("f2")],
            game_week_overrides: Map::new(),
            max_games_per_season: None,
            sunday_paired_practice_enabled: false,
            sunday_paired_practice_duration_hours: 1.0,
            sunday_paired_practice_field_id: None,
            sunday_paired_practice_cage_id: None,
            game_spacing_enabled: true,
            practice_arrive_before_minutes: 15,
            min_consecutive_day_gap: 1,
            home_away_diff_ceiling: 1,
        }
    }

    fn game_candidate(date: NaiveDate) -> Candidate {
        Candidate {
            event_type: EventType::Game,
            resource_id: ResourceId::Field(FieldId::from("f1")),
            date,
            start_minute: 9 * 60,
            end_minute: 10 * 60,
            week_number: 0,
            teams: vec![TeamId::from("home"), TeamId::from("away")],
            window_start: 9 * 60,
            window_end: 12 * 60,
        }
    }

    #[test]
    fn game_day_preference_rewards_the_preferred_weekday() {
        let config = base_config();
        let draft = DraftState::new();
        let conflict = ConflictIndex::new();
        let capacity = Map::new();
        let ctx = ScoringContext {
            weights: &ScoringWeights::default(),
            conflict: &conflict,
            draft: &draft,
            division_id: &DivisionId::from("u10"),
            config: &config,
            resource_capacity: &capacity,
            teams_remaining_this_phase: 0,
            team_count_in_division: 4,
            division_avg_short_rest: 0.0,
            division_avg_back_to_back: 0.0,
        };
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert_eq!(game_day_preference(&game_candidate(saturday), &ctx), 1.0);
        assert_eq!(game_day_preference(&game_candidate(sunday), &ctx), 0.85);
    }

    #[test]
    fn field_preference_scores_the_first_choice_field_highest() {
        let config = base_config();
        let draft = DraftState::new();
        let conflict = ConflictIndex::new();
        let capacity = Map::new();
        let ctx = ScoringContext {
            weights: &ScoringWeights::default(),
            conflict: &conflict,
            draft: &draft,
            division_id: &DivisionId::from("u10"),
            config: &config,
            resource_capacity: &capacity,
            teams_remaining_this_phase: 0,
            team_count_in_division: 4,
            division_avg_short_rest: 0.0,
            division_avg_back_to_back: 0.0,
        };
        let d = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let mut first_choice = game_candidate(d);
        first_choice.resource_id = ResourceId::Field(FieldId::from("f1"));
        let mut second_choice = game_candidate(d);
        second_choice.resource_id = ResourceId::Field(FieldId::from("f2"));
        let mut absent = game_candidate(d);
        absent.resource_id = ResourceId::Field(FieldId::from("f3"));

        assert_eq!(field_preference(&first_choice, &ctx), 1.0);
        assert!(field_preference(&second_choice, &ctx) < 1.0);
        assert_eq!(field_preference(&absent, &ctx), 0.0);
    }

    #[test]
    fn same_day_event_flags_an_existing_field_category_booking() {
        let config = base_config();
        let mut draft = DraftState::new();
        let div = DivisionId::from("u10");
        let d = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        draft.get_mut(&div, &TeamId::from("home")).record_practice(d, 17 * 60, 18 * 60, 0);
        let conflict = ConflictIndex::new();
        let capacity = Map::new();
        let ctx = ScoringContext {
            weights: &ScoringWeights::default(),
            conflict: &conflict,
            draft: &draft,
            division_id: &div,
            config: &config,
            resource_capacity: &capacity,
            teams_remaining_this_phase: 0,
            team_count_in_division: 4,
            division_avg_short_rest: 0.0,
            division_avg_back_to_back: 0.0,
        };
        assert_eq!(same_day_event(&game_candidate(d), &ctx), 1.0);
    }

    #[test]
    fn score_excluding_time_of_day_drops_earliest_time_and_adjacency() {
        let config = base_config();
        let draft = DraftState::new();
        let conflict = ConflictIndex::new();
        let capacity = Map::new();
        let ctx = ScoringContext {
            weights: &ScoringWeights::default(),
            conflict: &conflict,
            draft: &draft,
            division_id: &DivisionId::from("u10"),
            config: &config,
            resource_capacity: &capacity,
            teams_remaining_this_phase: 0,
            team_count_in_division: 4,
            division_avg_short_rest: 0.0,
            division_avg_back_to_back: 0.0,
        };
        let d = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let c = game_candidate(d);
        let full = score(&c, &ctx);
        let partial = score_excluding_time_of_day(&c, &ctx);
        assert_eq!(partial, full.total - full.earliest_time.weighted - full.time_adjacency.weighted);
    }
}
