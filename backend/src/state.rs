//! Per-team running counters the draft loop consults when scoring and
//! validating candidates: last event dates, weekly tallies, home/away
//! counts, and the like.

use crate::model::{DivisionId, EventType, TeamId};
use crate::time::{days_between, Weekday0};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// A team has at most one field-category (game or practice) event and one
/// cage event per day (Invariant 2); a gap between a field slot and a cage
/// slot on the same date beyond this many minutes is flagged by the
/// `sameDayCageFieldGap` scoring factor as an inconvenient back-and-forth.
pub const CAGE_FIELD_GAP_THRESHOLD_MINUTES: i64 = 120;

#[derive(Clone, Debug, Default)]
pub struct TeamSchedulingState {
    pub games_played: u32,
    pub home_games: u32,
    pub away_games: u32,
    pub practices_this_week: BTreeMap<u32, u32>,
    pub cage_sessions_this_week: BTreeMap<u32, u32>,
    pub games_this_week: BTreeMap<u32, u32>,
    pub last_game_date: Option<NaiveDate>,
    pub last_practice_date: Option<NaiveDate>,
    pub last_cage_date: Option<NaiveDate>,
    pub dates_with_game: BTreeSet<NaiveDate>,
    pub dates_with_practice: BTreeSet<NaiveDate>,
    pub dates_with_cage: BTreeSet<NaiveDate>,
    /// Per-opponent home-game counts, used by the rebalancer to find swap
    /// candidates without recomputing from the full event list each time.
    pub home_games_against: BTreeMap<TeamId, u32>,
    /// `dayOfWeekUsage`: how many of this team's events (of any type) have
    /// landed on each day of the week (0=Sunday..6=Saturday), feeding the
    /// `daySpread` factor.
    pub day_of_week_usage: BTreeMap<u8, u32>,
    /// A field-category slot and a cage slot recorded for the same date, so
    /// the `sameDayCageFieldGap` factor can measure the gap between them.
    pub field_slot_on_date: BTreeMap<NaiveDate, (u16, u16)>,
    pub cage_slot_on_date: BTreeMap<NaiveDate, (u16, u16)>,
    /// Short rest = a game within 2 days of another game for this team.
    pub short_rest_games_count: u32,
    /// Back-to-back = a practice within 1 day of another practice.
    pub back_to_back_practices_count: u32,
}

impl TeamSchedulingState {
    pub fn home_away_diff(&self) -> i64 {
        (self.home_games as i64 - self.away_games as i64).abs()
    }

    pub fn total_events(&self) -> u32 {
        self.games_played
            + self.practices_this_week.values().sum::<u32>()
            + self.cage_sessions_this_week.values().sum::<u32>()
    }

    pub fn dow_usage(&self, day_of_week: u8) -> u32 {
        self.day_of_week_usage.get(&day_of_week).copied().unwrap_or(0)
    }

    /// Union of game and practice dates: the dates on which this team
    /// already occupies a field-category slot (Invariant 2).
    pub fn field_dates_used(&self) -> BTreeSet<NaiveDate> {
        self.dates_with_game.union(&self.dates_with_practice).copied().collect()
    }

    fn bump_dow(&mut self, date: NaiveDate) {
        *self.day_of_week_usage.entry(Weekday0::of(date).0).or_insert(0) += 1;
    }

    /// Smallest gap in days between `date` and any other date in `dates`,
    /// or `None` if `dates` is empty once `date` itself is excluded.
    fn nearest_gap(dates: &BTreeSet<NaiveDate>, date: NaiveDate) -> Option<i64> {
        dates
            .iter()
            .filter(|d| **d != date)
            .map(|d| days_between(*d, date))
            .min()
    }

    /// Gap in days to the nearest other field-category date (used by
    /// `dayGap` and `largeGapPenalty` for games/practices).
    pub fn nearest_field_gap(&self, date: NaiveDate) -> Option<i64> {
        Self::nearest_gap(&self.field_dates_used(), date)
    }

    /// Gap in days to the nearest other practice date, excluding game dates
    /// entirely, per the `practiceSpacing` factor's definition.
    pub fn nearest_practice_gap(&self, date: NaiveDate) -> Option<i64> {
        Self::nearest_gap(&self.dates_with_practice, date)
    }

    pub fn nearest_cage_gap(&self, date: NaiveDate) -> Option<i64> {
        Self::nearest_gap(&self.dates_with_cage, date)
    }

    /// Minutes between an existing field slot and an existing cage slot on
    /// the same date, if the team has booked both.
    pub fn cage_field_gap_minutes(&self, date: NaiveDate) -> Option<i64> {
        let (fs, fe) = self.field_slot_on_date.get(&date).copied()?;
        let (cs, ce) = self.cage_slot_on_date.get(&date).copied()?;
        Some(if fe <= cs {
            cs as i64 - fe as i64
        } else if ce <= fs {
            fs as i64 - ce as i64
        } else {
            0
        })
    }

    pub fn record_game(
        &mut self,
        date: NaiveDate,
        start_minute: u16,
        end_minute: u16,
        week: u32,
        is_home: bool,
        opponent: &TeamId,
    ) {
        if let Some(gap) = self.nearest_field_gap(date) {
            if gap <= 2 {
                self.short_rest_games_count += 1;
            }
        }
        self.games_played += 1;
        if is_home {
            self.home_games += 1;
            *self.home_games_against.entry(opponent.clone()).or_insert(0) += 1;
        } else {
            self.away_games += 1;
        }
        *self.games_this_week.entry(week).or_insert(0) += 1;
        self.dates_with_game.insert(date);
        self.field_slot_on_date.insert(date, (start_minute, end_minute));
        self.bump_dow(date);
        self.last_game_date = Some(self.last_game_date.map_or(date, |d| d.max(date)));
    }

    pub fn record_practice(&mut self, date: NaiveDate, start_minute: u16, end_minute: u16, week: u32) {
        if let Some(gap) = self.nearest_practice_gap(date) {
            if gap <= 1 {
                self.back_to_back_practices_count += 1;
            }
        }
        *self.practices_this_week.entry(week).or_insert(0) += 1;
        self.dates_with_practice.insert(date);
        self.field_slot_on_date.insert(date, (start_minute, end_minute));
        self.bump_dow(date);
        self.last_practice_date = Some(self.last_practice_date.map_or(date, |d| d.max(date)));
    }

    pub fn record_cage(&mut self, date: NaiveDate, start_minute: u16, end_minute: u16, week: u32) {
        *self.cage_sessions_this_week.entry(week).or_insert(0) += 1;
        self.dates_with_cage.insert(date);
        self.cage_slot_on_date.insert(date, (start_minute, end_minute));
        self.bump_dow(date);
        self.last_cage_date = Some(self.last_cage_date.map_or(date, |d| d.max(date)));
    }

    pub fn practices_in_week(&self, week: u32) -> u32 {
        self.practices_this_week.get(&week).copied().unwrap_or(0)
    }

    pub fn cage_sessions_in_week(&self, week: u32) -> u32 {
        self.cage_sessions_this_week.get(&week).copied().unwrap_or(0)
    }

    pub fn games_in_week(&self, week: u32) -> u32 {
        self.games_this_week.get(&week).copied().unwrap_or(0)
    }

    pub fn last_date_for(&self, event_type: EventType) -> Option<NaiveDate> {
        match event_type {
            EventType::Game => self.last_game_date,
            EventType::Practice | EventType::PairedPractice => self.last_practice_date,
            EventType::Cage => self.last_cage_date,
        }
    }
}

/// Keyed by `(division_id, team_id)`; holds every team's running state for
/// the duration of one `generate` call.
#[derive(Clone, Debug, Default)]
pub struct DraftState {
    states: BTreeMap<(DivisionId, TeamId), TeamSchedulingState>,
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, division_id: &DivisionId, team_id: &TeamId) -> &TeamSchedulingState {
        self.states
            .get(&(division_id.clone(), team_id.clone()))
            .unwrap_or(Self::empty())
    }

    pub fn get_mut(&mut self, division_id: &DivisionId, team_id: &TeamId) -> &mut TeamSchedulingState {
        self.states
            .entry((division_id.clone(), team_id.clone()))
            .or_default()
    }

    fn empty() -> &'static TeamSchedulingState {
        static EMPTY: std::sync::OnceLock<TeamSchedulingState> = std::sync::OnceLock::new();
        EMPTY.get_or_init(TeamSchedulingState::default)
    }
}
