//! The top-level entrypoint (C10): loads inputs through the repository
//! traits, runs the draft loop division by division, rebalances, and
//! returns drafts plus statistics and a structured log. This is the only
//! function external collaborators call; everything else in the crate is
//! an implementation detail reached through here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conflict::ConflictIndex;
use crate::draft::{draft_division, DivisionInputs};
use crate::error::{GenerateError, LogCategory, ScheduleWarning, SchedulingLogEntry};
use crate::evaluator::check_structural_invariants;
use crate::model::{
    Cage, DivisionConfig, DivisionId, Field, ResourceId, ScheduledEvent, Season, SeasonId, Team,
    WeeklyAvailability,
};
use crate::rebalance::{rebalance_matchup_home_away, rebalance_short_rest};
use crate::repository::SeasonRepository;
use crate::state::DraftState;
use crate::weights::ScoringWeights;

/// The request a caller hands to [`generate`]. `division_ids` narrows the
/// run to a subset of the season's divisions (e.g. a single re-run after a
/// field outage); `None` schedules every division the repository lists.
/// `seed` is accepted for forward compatibility with tie-breaking shuffles
/// but the draft loop itself never consults randomness for anything that
/// would affect determinism of the committed schedule.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub season_id: SeasonId,
    pub division_ids: Option<Vec<DivisionId>>,
    pub clear_existing: bool,
    pub max_attempts: Option<u32>,
    pub scoring_weights: Option<ScoringWeights>,
    pub seed: Option<u64>,
}

impl GenerateRequest {
    pub fn new(season_id: SeasonId) -> Self {
        Self {
            season_id,
            division_ids: None,
            clear_existing: false,
            max_attempts: None,
            scoring_weights: None,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeCounts {
    pub games: usize,
    pub practices: usize,
    pub cages: usize,
    pub paired_practices: usize,
}

/// Aggregate statistics over a completed run, echoed back in
/// [`GenerateResult::statistics`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationStatistics {
    pub events_by_type: EventTypeCounts,
    pub events_by_division: BTreeMap<DivisionId, usize>,
    pub average_events_per_team: BTreeMap<DivisionId, f64>,
    #[serde(skip)]
    pub resource_utilization: BTreeMap<ResourceId, f64>,
    pub home_away_spread: BTreeMap<DivisionId, u32>,
    pub short_rest_spread: BTreeMap<DivisionId, u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateResult {
    pub success: bool,
    pub events_created: usize,
    pub message: String,
    pub errors: Vec<String>,
    pub warnings: Vec<ScheduleWarning>,
    pub statistics: GenerationStatistics,
    pub scheduling_log: Vec<SchedulingLogEntry>,
    /// The drafts the caller hands to its `ScheduleWriter` on success. Left
    /// empty on fatal failure; populated (and `success = false`) when a
    /// post-rebalance invariant check trips, so the caller has something
    /// to diagnose.
    #[serde(skip)]
    pub drafts: Vec<ScheduledEvent>,
}

const SHORT_REST_REBALANCE_MAX_ATTEMPTS: u32 = 200;

fn fail(message: impl Into<String>) -> GenerateResult {
    GenerateResult {
        success: false,
        events_created: 0,
        message: message.into(),
        errors: vec![],
        warnings: vec![],
        statistics: GenerationStatistics::default(),
        scheduling_log: vec![],
        drafts: vec![],
    }
}

/// Runs one generation: resolves inputs for `request.season_id` through
/// `repo`, schedules every requested division in `schedulingOrder`, then
/// rebalances home/away and short rest across each division's committed
/// games. Returns a populated [`GenerateResult`] rather than a bare
/// `Result` because even a partially successful run (some matchups
/// dropped for lack of a slot) is still useful to the caller; only fatal
/// input/config errors short-circuit to `success = false` with no drafts.
pub fn generate(request: &GenerateRequest, repo: &impl SeasonRepository) -> GenerateResult {
    let season = match repo.get_season(&request.season_id) {
        Ok(s) => s,
        Err(e) => return fail(e.to_string()),
    };

    let all_divisions = match repo.list_divisions(&request.season_id) {
        Ok(d) => d,
        Err(e) => return fail(e.to_string()),
    };

    let mut divisions: Vec<_> = match &request.division_ids {
        Some(ids) => all_divisions.into_iter().filter(|d| ids.contains(&d.id)).collect(),
        None => all_divisions,
    };
    divisions.sort_by_key(|d| d.scheduling_order);

    let mut seen_orders: BTreeMap<u32, DivisionId> = BTreeMap::new();
    for d in &divisions {
        if let Some(prior) = seen_orders.insert(d.scheduling_order, d.id.clone()) {
            return fail(
                GenerateError::DuplicateSchedulingOrder(prior.to_string(), d.id.to_string()).to_string(),
            );
        }
    }

    if let Some(requested) = &request.division_ids {
        let known: std::collections::HashSet<&DivisionId> = divisions.iter().map(|d| &d.id).collect();
        for id in requested {
            if !known.contains(id) {
                return fail(GenerateError::UnknownDivision(id.to_string()).to_string());
            }
        }
    }

    let configs = match repo.list_division_configs(&request.season_id) {
        Ok(c) => c,
        Err(e) => return fail(e.to_string()),
    };
    let config_by_division: BTreeMap<DivisionId, DivisionConfig> =
        configs.into_iter().map(|c| (c.division_id.clone(), c)).collect();

    let teams = match repo.list_teams(&request.season_id) {
        Ok(t) => t,
        Err(e) => return fail(e.to_string()),
    };
    if teams.is_empty() {
        return fail(GenerateError::NoTeams(request.season_id.to_string()).to_string());
    }

    let fields = match repo.list_fields(&request.season_id) {
        Ok(f) => f,
        Err(e) => return fail(e.to_string()),
    };
    let cages = match repo.list_cages(&request.season_id) {
        Ok(c) => c,
        Err(e) => return fail(e.to_string()),
    };
    let field_weekly = match repo.list_field_availabilities(&request.season_id) {
        Ok(v) => v,
        Err(e) => return fail(e.to_string()),
    };
    let cage_weekly = match repo.list_cage_availabilities(&request.season_id) {
        Ok(v) => v,
        Err(e) => return fail(e.to_string()),
    };
    let field_overrides = match repo.list_field_date_overrides(&request.season_id) {
        Ok(v) => v,
        Err(e) => return fail(e.to_string()),
    };
    let cage_overrides = match repo.list_cage_date_overrides(&request.season_id) {
        Ok(v) => v,
        Err(e) => return fail(e.to_string()),
    };

    let weights = request.scoring_weights.clone().unwrap_or_default();

    // Replaying existing events into both the conflict index and per-team
    // state (not just the index) matters when `clear_existing` is false:
    // the index alone is keyed by resource, so it can't stop a new event
    // from double-booking a team against history from a prior run.
    let (mut draft, mut conflict) = if request.clear_existing {
        (DraftState::new(), ConflictIndex::new())
    } else {
        let existing = match repo.list_scheduled_events(&request.season_id, None) {
            Ok(v) => v,
            Err(e) => return fail(e.to_string()),
        };
        crate::evaluator::replay(&season, &existing)
    };

    let mut all_events: Vec<ScheduledEvent> = Vec::new();
    let mut warnings: Vec<ScheduleWarning> = Vec::new();
    let mut log: Vec<SchedulingLogEntry> = Vec::new();
    let mut seq: u64 = 0;

    log.push(SchedulingLogEntry::info(format!(
        "generation started for season {} across {} division(s)",
        request.season_id,
        divisions.len()
    )));

    for division in &divisions {
        let Some(config) = config_by_division.get(&division.id) else {
            return fail(GenerateError::UnknownDivision(division.id.to_string()).to_string());
        };
        if config.practice_duration_hours <= 0.0
            || config.game_duration_hours <= 0.0
            || config.cage_session_duration_hours <= 0.0
        {
            return fail(GenerateError::NonPositiveDuration { field: "duration_hours" }.to_string());
        }

        let division_teams: Vec<Team> =
            teams.iter().filter(|t| t.division_id == division.id).cloned().collect();
        if division_teams.is_empty() {
            log.push(
                SchedulingLogEntry::info(format!("division {} has no teams, skipping", division.id))
                    .with_division(division.id.clone()),
            );
            continue;
        }

        let division_fields: Vec<Field> =
            fields.iter().filter(|f| f.compatible_with(&division.id)).cloned().collect();
        let division_cages: Vec<Cage> =
            cages.iter().filter(|c| c.compatible_with(&division.id)).cloned().collect();

        let field_resource_ids: std::collections::HashSet<ResourceId> =
            division_fields.iter().map(|f| ResourceId::Field(f.id.clone())).collect();
        let cage_resource_ids: std::collections::HashSet<ResourceId> =
            division_cages.iter().map(|c| ResourceId::Cage(c.id.clone())).collect();

        let field_weekly_div: Vec<WeeklyAvailability> =
            field_weekly.iter().filter(|a| field_resource_ids.contains(&a.resource_id)).cloned().collect();
        let cage_weekly_div: Vec<WeeklyAvailability> =
            cage_weekly.iter().filter(|a| cage_resource_ids.contains(&a.resource_id)).cloned().collect();
        let field_overrides_div =
            field_overrides.iter().filter(|o| field_resource_ids.contains(&o.resource_id)).cloned().collect();
        let cage_overrides_div =
            cage_overrides.iter().filter(|o| cage_resource_ids.contains(&o.resource_id)).cloned().collect();

        let inputs = DivisionInputs {
            season: &season,
            division,
            config,
            teams: &division_teams,
            fields: &division_fields,
            cages: &division_cages,
            field_weekly: &field_weekly_div,
            cage_weekly: &cage_weekly_div,
            field_overrides: &field_overrides_div,
            cage_overrides: &cage_overrides_div,
            blackouts: &season.blackouts,
        };

        let outcome = match draft_division(&inputs, &weights, &mut conflict, &mut draft, &mut seq) {
            Ok(o) => o,
            Err(e) => return fail(e.to_string()),
        };

        log.push(
            SchedulingLogEntry::info(format!(
                "division {} scheduled {} event(s)",
                division.id,
                outcome.events.len()
            ))
            .with_division(division.id.clone()),
        );
        for warning in &outcome.warnings {
            log.push(warning_log_entry(division, warning));
        }

        all_events.extend(outcome.events);
        warnings.extend(outcome.warnings);
        log.extend(outcome.log);
    }

    for division in &divisions {
        rebalance_matchup_home_away(&mut all_events, &division.id);

        let Some(config) = config_by_division.get(&division.id) else { continue };
        if !config.game_spacing_enabled {
            continue;
        }
        let division_team_ids: Vec<_> =
            teams.iter().filter(|t| t.division_id == division.id).map(|t| t.id.clone()).collect();
        if division_team_ids.len() < 2 {
            continue;
        }
        let attempts = rebalance_short_rest(
            &mut all_events,
            &division.id,
            &division_team_ids,
            request.max_attempts.unwrap_or(SHORT_REST_REBALANCE_MAX_ATTEMPTS),
        );
        log.push(
            SchedulingLogEntry::info(format!(
                "division {} short-rest rebalance ran {attempts} attempt(s)",
                division.id
            ))
            .with_division(division.id.clone())
            .with_category(LogCategory::Rebalance),
        );
    }

    // Rebalancing only flips labels and swaps dates/resources between
    // already-valid placements; a bug there would reintroduce a conflict the
    // draft loop had already ruled out. Catch it here rather than let a
    // caller persist a broken schedule.
    let post_checks = check_structural_invariants(&all_events);
    if let Some(failed) = post_checks.iter().find(|c| !c.passed) {
        return GenerateResult {
            success: false,
            events_created: 0,
            message: format!("post-rebalance invariant `{}` failed", failed.name),
            errors: vec![format!(
                "invariant `{}` violated for event(s): {:?}",
                failed.name, failed.violating_event_ids
            )],
            warnings,
            statistics: GenerationStatistics::default(),
            scheduling_log: log,
            drafts: all_events,
        };
    }

    let statistics = compute_statistics(&season, &divisions, &teams, &all_events, &draft);

    log.push(SchedulingLogEntry::info(format!(
        "generation finished: {} event(s) created, {} warning(s)",
        all_events.len(),
        warnings.len()
    )));

    GenerateResult {
        success: true,
        events_created: all_events.len(),
        message: "generation completed".to_string(),
        errors: vec![],
        warnings,
        statistics,
        scheduling_log: log,
        drafts: all_events,
    }
}

fn warning_log_entry(division: &crate::model::Division, warning: &ScheduleWarning) -> SchedulingLogEntry {
    match warning {
        ScheduleWarning::InsufficientResources { division_id, team_id, week } => {
            SchedulingLogEntry::info(format!("no candidate slot for team {team_id} in week {week}"))
                .with_division(division_id.clone())
                .with_team(team_id.clone())
                .with_category(LogCategory::InsufficientResources)
        }
        ScheduleWarning::UnbalancedHomeAway { division_id, team_a, team_b, diff } => {
            SchedulingLogEntry::info(format!("matchup {team_a} vs {team_b} home/away diff {diff}"))
                .with_division(division_id.clone())
                .with_category(LogCategory::UnbalancedHomeAway)
        }
        ScheduleWarning::FieldOverutilization { resource, date } => {
            SchedulingLogEntry::info(format!("resource {resource} overutilized on {date}"))
                .with_division(division.id.clone())
                .with_category(LogCategory::FieldOverutilization)
        }
    }
}

fn compute_statistics(
    season: &Season,
    divisions: &[crate::model::Division],
    teams: &[Team],
    events: &[ScheduledEvent],
    draft: &DraftState,
) -> GenerationStatistics {
    crate::evaluator::compute_statistics(season, divisions, teams, events, draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Booking, DayPreferencePriority, Division, DivisionConfig, FieldId, GameDayPreference, ResourceId,
        SeasonStatus, TeamId,
    };
    use crate::repository::InMemoryRepository;
    use chrono::NaiveDate;
    use std::collections::BTreeMap as Map;

    fn two_team_one_game_repo() -> (InMemoryRepository, SeasonId) {
        let season_id = SeasonId::from("s1");
        let division_id = DivisionId::from("u10");

        let season = Season {
            id: season_id.clone(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            games_start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            status: SeasonStatus::Active,
            blackouts: vec![],
        };

        let config = DivisionConfig {
            division_id: division_id.clone(),
            practices_per_week: 0,
            practice_duration_hours: 1.0,
            games_per_week: 1,
            game_duration_hours: 1.0,
            game_arrive_before_hours: 0.0,
            game_day_preferences: vec![GameDayPreference {
                day_of_week: 6,
                priority: DayPreferencePriority::Preferred,
                max_games_per_day: None,
            }],
            cage_sessions_per_week: 0,
            cage_session_duration_hours: 1.0,
            field_preferences: vec![],
            game_week_overrides: Map::new(),
            max_games_per_season: None,
            sunday_paired_practice_enabled: false,
            sunday_paired_practice_duration_hours: 1.0,
            sunday_paired_practice_field_id: None,
            sunday_paired_practice_cage_id: None,
            game_spacing_enabled: true,
            practice_arrive_before_minutes: 0,
            min_consecutive_day_gap: 1,
            home_away_diff_ceiling: 1,
        };

        let field_id = FieldId::from("f1");
        let repo = InMemoryRepository::new()
            .with_season(season)
            .with_division(&season_id, Division { id: division_id.clone(), name: "U10".into(), scheduling_order: 0 })
            .with_division_config(&season_id, config)
            .with_team(&season_id, Team { id: TeamId::from("Alpha"), season_id: season_id.clone(), division_id: division_id.clone(), name: "Alpha".into() })
            .with_team(&season_id, Team { id: TeamId::from("Bravo"), season_id: season_id.clone(), division_id: division_id.clone(), name: "Bravo".into() })
            .with_field(&season_id, Field { id: field_id.clone(), name: "Diamond".into(), division_compatibility: vec![] })
            .with_field_availability(
                &season_id,
                WeeklyAvailability {
                    resource_id: ResourceId::Field(field_id),
                    day_of_week: 6,
                    start_minute: 9 * 60,
                    end_minute: 12 * 60,
                    single_event_only: false,
                },
            );
        (repo, season_id)
    }

    #[test]
    fn two_teams_one_game_lands_saturday_with_alphabetical_home_tiebreak() {
        let (repo, season_id) = two_team_one_game_repo();
        let result = generate(&GenerateRequest::new(season_id), &repo);

        assert!(result.success, "{}", result.message);
        assert_eq!(result.events_created, 1);
        let event = &result.drafts[0];
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
        assert_eq!(event.start_minute, 9 * 60);
        match &event.booking {
            Booking::Game { home_team_id, away_team_id } => {
                assert_eq!(home_team_id.0, "Alpha");
                assert_eq!(away_team_id.0, "Bravo");
            }
            other => panic!("expected a game, got {other:?}"),
        }
    }

    #[test]
    fn identical_inputs_produce_identical_output_hashes() {
        let (repo, season_id) = two_team_one_game_repo();
        let first = generate(&GenerateRequest::new(season_id.clone()), &repo);
        let second = generate(&GenerateRequest::new(season_id), &repo);

        let fingerprint = |r: &GenerateResult| -> Vec<(String, NaiveDate, u16, u16)> {
            let mut v: Vec<_> = r
                .drafts
                .iter()
                .map(|e| (e.id.to_string(), e.date, e.start_minute, e.end_minute))
                .collect();
            v.sort();
            v
        };
        assert_eq!(fingerprint(&first), fingerprint(&second));
    }

    #[test]
    fn existing_field_event_blocks_a_same_day_game_for_that_team() {
        use crate::model::EventId;
        use crate::repository::ScheduleWriter;

        let (mut repo, season_id) = two_team_one_game_repo();
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let existing_practice = ScheduledEvent {
            id: EventId::from("pre-existing-practice"),
            season_id: season_id.clone(),
            division_id: DivisionId::from("u10"),
            event_type: crate::model::EventType::Practice,
            date: saturday,
            start_minute: 10 * 60,
            end_minute: 11 * 60,
            field_id: Some(FieldId::from("f1")),
            cage_id: None,
            booking: Booking::SingleTeam { team_id: TeamId::from("Alpha") },
            status: crate::model::EventStatus::Scheduled,
            notes: None,
            created_at: 0,
            updated_at: 0,
        };
        repo.insert_scheduled_events_batch(&[existing_practice]).unwrap();

        let result = generate(&GenerateRequest::new(season_id), &repo);

        assert!(result.success, "{}", result.message);
        assert_eq!(
            result.events_created, 0,
            "Alpha already has a field-category event on the only available Saturday; the game must not double-book the team"
        );
        assert!(result.warnings.iter().any(|w| matches!(w, ScheduleWarning::InsufficientResources { .. })));
    }

    #[test]
    fn missing_season_fails_fast_with_no_drafts() {
        let repo = InMemoryRepository::new();
        let result = generate(&GenerateRequest::new(SeasonId::from("nope")), &repo);
        assert!(!result.success);
        assert!(result.drafts.is_empty());
    }
}
