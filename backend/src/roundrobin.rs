//! Builds a division's round-robin matchups with balanced home/away, and
//! assigns them to target weeks (C4).

use crate::model::TeamId;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matchup {
    pub home: TeamId,
    pub away: TeamId,
}

/// Rotates the sorted team list by `sum(last char code) mod n`, so the
/// "fixed" position in the circle method varies deterministically from
/// season to season without depending on anything outside the team ids
/// themselves.
fn rotation_offset(sorted_ids: &[TeamId]) -> usize {
    let n = sorted_ids.len();
    if n == 0 {
        return 0;
    }
    let sum: u32 = sorted_ids
        .iter()
        .filter_map(|id| id.0.chars().last())
        .map(|c| c as u32)
        .sum();
    (sum as usize) % n
}

/// One "BYE" placeholder keeps the circle method's pairing-by-halves
/// working for odd team counts; pairings involving it are filtered out of
/// the final rounds.
const BYE: &str = "__BYE__";

fn circle_method_rounds(teams: &[TeamId]) -> Vec<Vec<(TeamId, TeamId)>> {
    let mut arr = teams.to_vec();
    if arr.len() % 2 == 1 {
        arr.push(TeamId::from(BYE));
    }

    let n = arr.len();
    if n < 2 {
        return vec![];
    }

    let fixed = arr[0].clone();
    let mut rotating: Vec<TeamId> = arr[1..].to_vec();

    let mut rounds = Vec::with_capacity(n - 1);

    for _ in 0..(n - 1) {
        // Canonical circle method: lay the fixed element and the rotated
        // line out as one array and fold it symmetrically, pairing
        // `line[i]` with `line[n-1-i]`. This pairs the fixed element with
        // the *last* rotating entry, not the first.
        let mut line = Vec::with_capacity(n);
        line.push(fixed.clone());
        line.extend(rotating.iter().cloned());

        let mut round = Vec::with_capacity(n / 2);
        for i in 0..n / 2 {
            round.push((line[i].clone(), line[n - 1 - i].clone()));
        }
        round.retain(|(a, b)| a.0 != BYE && b.0 != BYE);
        rounds.push(round);

        let last = rotating.pop().expect("rotating is non-empty for n >= 2");
        rotating.insert(0, last);
    }

    rounds
}

struct HomeAwayAssigner {
    // keyed by (lexicographically-smaller id, larger id) -> (lo_home_count, hi_home_count)
    pair_state: HashMap<(TeamId, TeamId), (u32, u32)>,
    global_home: HashMap<TeamId, u32>,
}

impl HomeAwayAssigner {
    fn new() -> Self {
        Self {
            pair_state: HashMap::new(),
            global_home: HashMap::new(),
        }
    }

    /// Two-level tie-break: primary balances within the pair, secondary
    /// balances global home counts, tertiary alternates by meeting parity
    /// in lexicographic team-id order.
    fn assign(&mut self, a: &TeamId, b: &TeamId) -> Matchup {
        let (lo, hi) = if a < b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
        let (lo_home, hi_home) = *self.pair_state.get(&(lo.clone(), hi.clone())).unwrap_or(&(0, 0));

        let home = if lo_home < hi_home {
            lo.clone()
        } else if hi_home < lo_home {
            hi.clone()
        } else {
            let g_lo = *self.global_home.get(&lo).unwrap_or(&0);
            let g_hi = *self.global_home.get(&hi).unwrap_or(&0);
            if g_lo < g_hi {
                lo.clone()
            } else if g_hi < g_lo {
                hi.clone()
            } else if (lo_home + hi_home) % 2 == 0 {
                lo.clone()
            } else {
                hi.clone()
            }
        };
        let is_home_lo = home == lo;
        let away = if is_home_lo { hi.clone() } else { lo.clone() };

        let entry = self.pair_state.entry((lo, hi)).or_insert((0, 0));
        if is_home_lo {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
        *self.global_home.entry(home.clone()).or_insert(0) += 1;

        Matchup { home, away }
    }
}

/// Builds `games_per_matchup` cycles of the circle method for `team_ids`
/// and assigns balanced home/away to every pairing.
pub fn build_round_robin(team_ids: &[TeamId], games_per_matchup: u32) -> Vec<Vec<Matchup>> {
    let mut sorted_ids = team_ids.to_vec();
    sorted_ids.sort();

    let offset = rotation_offset(&sorted_ids);
    let mut rotated = sorted_ids.clone();
    rotated.rotate_left(offset);

    let mut assigner = HomeAwayAssigner::new();
    let mut all_rounds = Vec::new();

    for _ in 0..games_per_matchup {
        for round in circle_method_rounds(&rotated) {
            let matchups: Vec<Matchup> = round
                .into_iter()
                .map(|(a, b)| assigner.assign(&a, &b))
                .collect();
            all_rounds.push(matchups);
        }
    }

    all_rounds
}

/// Advances a week cursor across `rounds`; each round contributes one game
/// per team, so a round is "used up" against a week's quota as a whole.
/// Rounds that would overflow `total_weeks` land in the final week instead
/// of being silently dropped — the draft loop is responsible for emitting
/// `insufficient_resources` warnings if they can't actually be placed.
pub fn assign_matchups_to_weeks(
    rounds: Vec<Vec<Matchup>>,
    total_weeks: u32,
    games_per_team_per_week: u32,
) -> Vec<Vec<Matchup>> {
    let total_weeks = total_weeks.max(1);
    let mut weeks: Vec<Vec<Matchup>> = (0..total_weeks).map(|_| Vec::new()).collect();

    let mut week_idx: u32 = 0;
    let mut rounds_in_week: u32 = 0;

    for round in rounds {
        let target = week_idx.min(total_weeks - 1) as usize;
        weeks[target].extend(round);

        rounds_in_week += 1;
        if rounds_in_week >= games_per_team_per_week.max(1) && week_idx + 1 < total_weeks {
            week_idx += 1;
            rounds_in_week = 0;
        }
    }

    weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(ids: &[&str]) -> Vec<TeamId> {
        ids.iter().map(|s| TeamId::from(*s)).collect()
    }

    #[test]
    fn four_teams_single_round_robin_has_three_rounds_of_two_games() {
        let ids = teams(&["A", "B", "C", "D"]);
        let rounds = build_round_robin(&ids, 1);
        assert_eq!(rounds.len(), 3);
        for round in &rounds {
            assert_eq!(round.len(), 2);
        }
        let total_games: usize = rounds.iter().map(Vec::len).sum();
        assert_eq!(total_games, 6); // C(4,2)
    }

    #[test]
    fn four_teams_double_round_robin_covers_every_matchup_twice() {
        let ids = teams(&["A", "B", "C", "D"]);
        let rounds = build_round_robin(&ids, 2);
        let total_games: usize = rounds.iter().map(Vec::len).sum();
        assert_eq!(total_games, 12);

        let mut meetings: HashMap<(String, String), u32> = HashMap::new();
        let mut home_counts: HashMap<(String, String), (u32, u32)> = HashMap::new();

        for round in &rounds {
            for m in round {
                let (lo, hi) = if m.home < m.away {
                    (m.home.0.clone(), m.away.0.clone())
                } else {
                    (m.away.0.clone(), m.home.0.clone())
                };
                *meetings.entry((lo.clone(), hi.clone())).or_insert(0) += 1;
                let entry = home_counts.entry((lo.clone(), hi.clone())).or_insert((0, 0));
                if m.home.0 == lo {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
        }

        for count in meetings.values() {
            assert_eq!(*count, 2, "every pair should meet exactly twice");
        }
        for (lo_home, hi_home) in home_counts.values() {
            assert!((*lo_home as i32 - *hi_home as i32).abs() <= 1);
        }
    }

    #[test]
    fn odd_team_count_drops_the_bye() {
        let ids = teams(&["A", "B", "C"]);
        let rounds = build_round_robin(&ids, 1);
        for round in &rounds {
            for m in round {
                assert_ne!(m.home.0, BYE);
                assert_ne!(m.away.0, BYE);
            }
        }
        let total_games: usize = rounds.iter().map(Vec::len).sum();
        assert_eq!(total_games, 3); // C(3,2)
    }

    #[test]
    fn assign_matchups_to_weeks_advances_cursor_on_quota() {
        let ids = teams(&["A", "B", "C", "D"]);
        let rounds = build_round_robin(&ids, 1);
        let weeks = assign_matchups_to_weeks(rounds, 3, 1);
        assert_eq!(weeks.len(), 3);
        for week in &weeks {
            assert_eq!(week.len(), 2);
        }
    }

    #[test]
    fn two_team_single_game_home_team_is_alphabetically_first() {
        let ids = teams(&["Rockies", "Dragons"]);
        let rounds = build_round_robin(&ids, 1);
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].len(), 1);
        assert_eq!(rounds[0][0].home.0, "Dragons");
        assert_eq!(rounds[0][0].away.0, "Rockies");
    }
}
