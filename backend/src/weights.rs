//! Weights for each scoring factor (C5). Only the relative ordering between
//! factor magnitudes is load-bearing, not the exact numbers, so callers are
//! free to override any subset via `GenerateRequest::scoring_weights`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub day_spread: f64,
    pub week_balance: f64,
    pub resource_utilization: f64,
    pub game_day_preference: f64,
    pub time_quality: f64,
    pub home_away_balance: f64,
    pub matchup_home_away_balance: f64,
    pub day_gap: f64,
    pub practice_spacing: f64,
    pub time_adjacency: f64,
    pub earliest_time: f64,
    pub field_preference: f64,
    pub same_day_event: f64,
    pub scarcity: f64,
    pub same_day_cage_field_gap: f64,
    pub weekend_morning_practice: f64,
    pub short_rest_balance: f64,
    pub back_to_back_practice_balance: f64,
    pub large_gap_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            day_spread: 20.0,
            week_balance: 15.0,
            resource_utilization: 10.0,
            game_day_preference: 40.0,
            time_quality: 8.0,
            home_away_balance: 35.0,
            matchup_home_away_balance: 35.0,
            day_gap: 25.0,
            practice_spacing: 500.0,
            time_adjacency: 5.0,
            earliest_time: 6.0,
            field_preference: 12.0,
            same_day_event: -1000.0,
            scarcity: -8.0,
            same_day_cage_field_gap: -15.0,
            weekend_morning_practice: -4.0,
            short_rest_balance: -30.0,
            back_to_back_practice_balance: -20.0,
            large_gap_penalty: -10.0,
        }
    }
}
