//! Scenario 6: a hand-built 4-team fixture where one team carries 3
//! short-rest games (back-to-back days) while another carries none. Running
//! the short-rest rebalance pass brings the spread down to within 1 without
//! ever increasing the total number of short-rest games.

use backend::model::{Booking, DivisionId, EventId, EventStatus, EventType, FieldId, ScheduledEvent, SeasonId, TeamId};
use backend::rebalance::rebalance_short_rest;
use chrono::NaiveDate;

fn game(id: &str, date: NaiveDate, home: &str, away: &str) -> ScheduledEvent {
    ScheduledEvent {
        id: EventId::from(id),
        season_id: SeasonId::from("s1"),
        division_id: DivisionId::from("u10"),
        event_type: EventType::Game,
        date,
        start_minute: 9 * 60,
        end_minute: 10 * 60,
        field_id: Some(FieldId::from("f1")),
        cage_id: None,
        booking: Booking::Game { home_team_id: TeamId::from(home), away_team_id: TeamId::from(away) },
        status: EventStatus::Scheduled,
        notes: None,
        created_at: 0,
        updated_at: 0,
    }
}

fn short_rest_spread(events: &[ScheduledEvent], division_id: &DivisionId, teams: &[TeamId]) -> (i64, i64) {
    let counts: Vec<i64> = teams
        .iter()
        .map(|t| {
            let mut dates: Vec<NaiveDate> = events
                .iter()
                .filter(|e| {
                    e.division_id == *division_id
                        && matches!(e.event_type, EventType::Game)
                        && match &e.booking {
                            Booking::Game { home_team_id, away_team_id } => {
                                home_team_id == t || away_team_id == t
                            }
                            _ => false,
                        }
                })
                .map(|e| e.date)
                .collect();
            dates.sort();
            dates.windows(2).filter(|w| (w[1] - w[0]).num_days().abs() <= 2).count() as i64
        })
        .collect();
    let total: i64 = counts.iter().sum();
    let spread = counts.iter().max().copied().unwrap_or(0) - counts.iter().min().copied().unwrap_or(0);
    (total, spread)
}

#[test]
fn short_rest_rebalance_shrinks_the_spread_without_growing_the_total() {
    let division_id = DivisionId::from("u10");
    let d0 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

    // A plays 4 straight days (3 short-rest pairs); B plays twice, far apart
    // (0 short-rest pairs). C and D each sit at 1.
    let mut events = vec![
        game("e1", d0, "A", "C"),
        game("e2", d0 + chrono::Duration::days(1), "A", "D"),
        game("e3", d0 + chrono::Duration::days(2), "A", "C"),
        game("e4", d0 + chrono::Duration::days(3), "A", "D"),
        game("e5", d0 + chrono::Duration::days(50), "B", "C"),
        game("e6", d0 + chrono::Duration::days(60), "B", "D"),
    ];
    let teams = vec![
        TeamId::from("A"),
        TeamId::from("B"),
        TeamId::from("C"),
        TeamId::from("D"),
    ];

    let (total_before, spread_before) = short_rest_spread(&events, &division_id, &teams);
    assert!(spread_before > 1, "fixture should start lopsided, got spread {spread_before}");

    rebalance_short_rest(&mut events, &division_id, &teams, 50);

    let (total_after, spread_after) = short_rest_spread(&events, &division_id, &teams);
    assert!(spread_after <= 1, "spread should shrink to at most 1, got {spread_after}");
    assert!(total_after <= total_before, "rebalancing must never add short-rest games");

    // The pass must not invent, drop, or retype any booking or field id.
    assert_eq!(events.len(), 6);
    for event in &events {
        assert_eq!(event.field_id, Some(FieldId::from("f1")));
        assert!(event.cage_id.is_none());
    }
}
