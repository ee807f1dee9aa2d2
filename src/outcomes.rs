// Game outcome determination.
//
// Independent of the ranking pipeline: each game's winner comes from the
// final post-event scoreboard (the last pitch in at-bat/pitch sequence
// order), and the per-game team delta totals come from summing each side's
// attributed shares. Win/loss tallies feed the team rollup.

use std::collections::BTreeMap;

use crate::ingest::events::{EventRecord, HalfInning};
use crate::rank::attribution::AttributedEvent;
use crate::rank::StatTriple;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The resolved result of one game.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub game_id: u64,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub winner: String,
    /// Sum of the home side's attributed deltas (home batters in the bottom
    /// half plus home pitchers in the top half).
    pub home_totals: StatTriple,
    pub away_totals: StatTriple,
}

/// A team's win/loss record across all resolved games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
}

// ---------------------------------------------------------------------------
// Outcome determination
// ---------------------------------------------------------------------------

/// Resolve every game found in the event slice. The two slices are parallel
/// (one attributed entry per event, same order).
pub fn determine_outcomes(
    events: &[EventRecord],
    attributed: &[AttributedEvent],
) -> Vec<GameOutcome> {
    let mut by_game: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for (i, ev) in events.iter().enumerate() {
        by_game.entry(ev.game_id).or_default().push(i);
    }

    by_game
        .into_iter()
        .filter_map(|(game_id, indices)| {
            let last = indices
                .iter()
                .copied()
                .max_by_key(|&i| (events[i].at_bat_number, events[i].pitch_number))?;
            let final_event = &events[last];

            let mut home_totals = StatTriple::default();
            let mut away_totals = StatTriple::default();
            for &i in &indices {
                let Some(share) = attributed.get(i) else {
                    continue;
                };
                match events[i].half {
                    HalfInning::Bottom => {
                        home_totals.add(share.batter_deltas);
                        away_totals.add(share.pitcher_deltas);
                    }
                    HalfInning::Top => {
                        away_totals.add(share.batter_deltas);
                        home_totals.add(share.pitcher_deltas);
                    }
                }
            }

            let winner = if final_event.post_home_score > final_event.post_away_score {
                final_event.home_team.clone()
            } else {
                final_event.away_team.clone()
            };

            Some(GameOutcome {
                game_id,
                home_team: final_event.home_team.clone(),
                away_team: final_event.away_team.clone(),
                home_score: final_event.post_home_score,
                away_score: final_event.post_away_score,
                winner,
                home_totals,
                away_totals,
            })
        })
        .collect()
}

/// Tally wins and losses per team across all resolved games.
pub fn team_records(outcomes: &[GameOutcome]) -> BTreeMap<String, WinLoss> {
    let mut records: BTreeMap<String, WinLoss> = BTreeMap::new();
    for outcome in outcomes {
        records.entry(outcome.home_team.clone()).or_default();
        records.entry(outcome.away_team.clone()).or_default();

        let loser = if outcome.winner == outcome.home_team {
            &outcome.away_team
        } else {
            &outcome.home_team
        };
        if let Some(record) = records.get_mut(&outcome.winner) {
            record.wins += 1;
        }
        if let Some(record) = records.get_mut(loser) {
            record.losses += 1;
        }
    }
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
