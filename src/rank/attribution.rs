// Per-event attribution.
//
// Splits each event's win probability delta, run expectancy delta, and
// outcome score between the batter and the pitcher. All three inputs are
// treated as home-team-perspective values: when the away team is batting
// (Top), the batter's share is the negation, and the pitcher always takes
// the opposite sign of the batter.

use std::collections::HashMap;

use crate::ingest::events::{EventRecord, HalfInning};
use crate::rank::StatTriple;

// ---------------------------------------------------------------------------
// Outcome score table
// ---------------------------------------------------------------------------

/// Built-in outcome scores per raw event type. Event types absent from the
/// table score 0.
pub const DEFAULT_EVENT_SCORES: &[(&str, f64)] = &[
    ("strikeout", -0.336_210),
    ("field_out", -0.2),
    ("single", 0.9),
    ("home_run", 2.0),
    ("walk", 0.65),
    ("fielders_choice_out", -0.2),
    ("double", 1.4),
    ("sac_bunt", 0.0),
    ("force_out", -0.2),
    ("grounded_into_double_play", 0.0),
    ("hit_by_pitch", 0.67),
    ("sac_fly", -0.1),
    ("fielders_choice", -0.3),
    ("triple", 1.9),
    ("caught_stealing_2b", 0.0),
    ("other_out", -0.2),
    ("field_error", 0.0),
    ("double_play", -0.3),
    ("catcher_interf", 0.0),
    ("strikeout_double_play", -0.33),
];

/// Lookup table mapping raw event types to outcome scores.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    scores: HashMap<String, f64>,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            scores: DEFAULT_EVENT_SCORES
                .iter()
                .map(|&(event, score)| (event.to_string(), score))
                .collect(),
        }
    }
}

impl ScoreTable {
    /// Build the default table with config-supplied overrides applied on top.
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Self {
        let mut table = Self::default();
        for (event, score) in overrides {
            table.scores.insert(event.clone(), *score);
        }
        table
    }

    /// Score a raw event type. Unknown types score 0.
    pub fn score(&self, event_type: &str) -> f64 {
        self.scores.get(event_type).copied().unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Attributed events
// ---------------------------------------------------------------------------

/// One event with its deltas split between the two players involved. The
/// pitcher's share is always the negation of the batter's.
#[derive(Debug, Clone)]
pub struct AttributedEvent {
    pub batter: u32,
    pub pitcher: u32,
    pub batter_deltas: StatTriple,
    pub pitcher_deltas: StatTriple,
}

/// Attribute a single event.
pub fn attribute_event(ev: &EventRecord, scores: &ScoreTable) -> AttributedEvent {
    let outcome_score = scores.score(&ev.event_type);

    // Home-team perspective: the batter is on the home side only in the
    // bottom half of an inning.
    let batter_sign = match ev.half {
        HalfInning::Top => -1.0,
        HalfInning::Bottom => 1.0,
    };

    let batter_deltas = StatTriple::new(
        batter_sign * ev.delta_win_exp,
        batter_sign * ev.delta_run_exp,
        batter_sign * outcome_score,
    );

    AttributedEvent {
        batter: ev.batter,
        pitcher: ev.pitcher,
        batter_deltas,
        pitcher_deltas: batter_deltas.negated(),
    }
}

/// Attribute every event, preserving input order.
pub fn attribute_all(events: &[EventRecord], scores: &ScoreTable) -> Vec<AttributedEvent> {
    events
        .iter()
        .map(|ev| attribute_event(ev, scores))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
