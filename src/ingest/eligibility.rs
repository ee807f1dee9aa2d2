// Appearance-based eligibility filtering.
//
// Players with fewer than the configured minimum number of event appearances
// are dropped from the stat tables, and events involving a dropped player are
// removed so the graph only ever sees eligible matchups.

use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::ingest::events::EventRecord;
use crate::ingest::players::PlayerRecord;

/// Filter the dataset down to eligible players and their events.
///
/// Appearance counts come from the event table itself: a batter appearance is
/// one event with that batter id, and likewise for pitchers. Both sides of an
/// event must be eligible for the event to survive.
pub fn apply_eligibility(
    events: Vec<EventRecord>,
    batters: Vec<PlayerRecord>,
    pitchers: Vec<PlayerRecord>,
    min_appearances: usize,
) -> (Vec<EventRecord>, Vec<PlayerRecord>, Vec<PlayerRecord>) {
    let mut batter_counts: HashMap<u32, usize> = HashMap::new();
    let mut pitcher_counts: HashMap<u32, usize> = HashMap::new();
    for ev in &events {
        *batter_counts.entry(ev.batter).or_insert(0) += 1;
        *pitcher_counts.entry(ev.pitcher).or_insert(0) += 1;
    }

    let eligible_batters: HashSet<u32> = batter_counts
        .iter()
        .filter(|(_, &count)| count >= min_appearances)
        .map(|(&id, _)| id)
        .collect();
    let eligible_pitchers: HashSet<u32> = pitcher_counts
        .iter()
        .filter(|(_, &count)| count >= min_appearances)
        .map(|(&id, _)| id)
        .collect();

    let batters_before = batters.len();
    let pitchers_before = pitchers.len();
    let events_before = events.len();

    let batters: Vec<PlayerRecord> = batters
        .into_iter()
        .filter(|p| eligible_batters.contains(&p.id))
        .collect();
    let pitchers: Vec<PlayerRecord> = pitchers
        .into_iter()
        .filter(|p| eligible_pitchers.contains(&p.id))
        .collect();
    let events: Vec<EventRecord> = events
        .into_iter()
        .filter(|ev| {
            eligible_batters.contains(&ev.batter) && eligible_pitchers.contains(&ev.pitcher)
        })
        .collect();

    info!(
        "eligibility filter (min {} appearances): {} -> {} batters, {} -> {} pitchers, {} -> {} events",
        min_appearances,
        batters_before,
        batters.len(),
        pitchers_before,
        pitchers.len(),
        events_before,
        events.len(),
    );

    (events, batters, pitchers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
