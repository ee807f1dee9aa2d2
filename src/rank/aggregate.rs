// Matchup aggregation.
//
// Accumulates attributed per-event deltas into per-(batter, pitcher) totals.
// The accumulator is scoped to one aggregation run and is deliberately
// permissive: player ids are not validated against any node set here, that
// happens when the graph is built.

use std::collections::BTreeMap;

use crate::rank::attribution::AttributedEvent;
use crate::rank::StatTriple;

// ---------------------------------------------------------------------------
// Matchup key
// ---------------------------------------------------------------------------

/// An ordered (batter, pitcher) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchupKey {
    pub batter: u32,
    pub pitcher: u32,
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Running matchup totals for one aggregation run.
///
/// Totals are the batter-perspective sums of the three deltas; the sign of a
/// finished total later decides the direction of each emitted edge. Keys are
/// kept in a `BTreeMap` so iteration order is deterministic regardless of
/// event order.
#[derive(Debug, Default)]
pub struct MatchupAccumulator {
    totals: BTreeMap<MatchupKey, StatTriple>,
}

impl MatchupAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one attributed event into the running totals.
    pub fn record(&mut self, ev: &AttributedEvent) {
        let entry = self
            .totals
            .entry(MatchupKey {
                batter: ev.batter,
                pitcher: ev.pitcher,
            })
            .or_default();
        entry.add(ev.batter_deltas);
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Consume the accumulator and hand the finished totals to the builder.
    pub fn finish(self) -> BTreeMap<MatchupKey, StatTriple> {
        self.totals
    }
}

/// Aggregate a full event slice in one call.
pub fn aggregate(events: &[AttributedEvent]) -> BTreeMap<MatchupKey, StatTriple> {
    let mut acc = MatchupAccumulator::new();
    for ev in events {
        acc.record(ev);
    }
    acc.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_attributed(batter: u32, pitcher: u32, wpa: f64, re: f64, score: f64) -> AttributedEvent {
        let batter_deltas = StatTriple::new(wpa, re, score);
        AttributedEvent {
            batter,
            pitcher,
            batter_deltas,
            pitcher_deltas: batter_deltas.negated(),
        }
    }

    #[test]
    fn sums_deltas_per_pair() {
        let events = vec![
            make_attributed(1, 10, 0.1, 0.2, 0.9),
            make_attributed(1, 10, -0.05, 0.1, -0.2),
            make_attributed(2, 10, 0.03, -0.1, 0.65),
        ];

        let totals = aggregate(&events);
        assert_eq!(totals.len(), 2);

        let t = &totals[&MatchupKey { batter: 1, pitcher: 10 }];
        assert!(approx_eq(t.wpa, 0.05, 1e-12));
        assert!(approx_eq(t.re, 0.3, 1e-12));
        assert!(approx_eq(t.score, 0.7, 1e-12));

        let t = &totals[&MatchupKey { batter: 2, pitcher: 10 }];
        assert!(approx_eq(t.wpa, 0.03, 1e-12));
    }

    #[test]
    fn event_order_does_not_change_totals() {
        let forward = vec![
            make_attributed(1, 10, 0.1, 0.0, 0.0),
            make_attributed(1, 10, 0.2, 0.0, 0.0),
            make_attributed(2, 11, -0.3, 0.0, 0.0),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(aggregate(&forward), aggregate(&reversed));
    }

    #[test]
    fn iteration_order_is_deterministic() {
        let events = vec![
            make_attributed(9, 2, 0.1, 0.0, 0.0),
            make_attributed(1, 5, 0.1, 0.0, 0.0),
            make_attributed(1, 2, 0.1, 0.0, 0.0),
        ];

        let keys: Vec<MatchupKey> = aggregate(&events).into_keys().collect();
        assert_eq!(
            keys,
            vec![
                MatchupKey { batter: 1, pitcher: 2 },
                MatchupKey { batter: 1, pitcher: 5 },
                MatchupKey { batter: 9, pitcher: 2 },
            ]
        );
    }

    #[test]
    fn unregistered_ids_are_accepted() {
        // No node set exists at aggregation time, so arbitrary ids flow through.
        let events = vec![make_attributed(u32::MAX, 0, 0.5, 0.0, 0.0)];
        let totals = aggregate(&events);
        assert_eq!(totals.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_totals() {
        let acc = MatchupAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.finish().is_empty());
    }
}
