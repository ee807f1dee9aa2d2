// Ranking engine: event attribution, matchup aggregation, graph construction,
// per-statistic normalization, PageRank, and score propagation.

pub mod aggregate;
pub mod attribution;
pub mod graph;
pub mod normalize;
pub mod pagerank;
pub mod propagate;

use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Statistic labels
// ---------------------------------------------------------------------------

/// The three statistics every matchup is measured on. Each one drives its own
/// normalized sub-graph and PageRank run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Statistic {
    #[serde(rename = "wpa")]
    WinProbability,
    #[serde(rename = "re")]
    RunExpectancy,
    #[serde(rename = "score")]
    OutcomeScore,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [
        Statistic::WinProbability,
        Statistic::RunExpectancy,
        Statistic::OutcomeScore,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Statistic::WinProbability => "wpa",
            Statistic::RunExpectancy => "re",
            Statistic::OutcomeScore => "score",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Per-statistic value triple
// ---------------------------------------------------------------------------

/// One f64 per statistic. Used for matchup totals, cumulative player stats,
/// rank scores, and derived edge weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatTriple {
    pub wpa: f64,
    pub re: f64,
    pub score: f64,
}

impl StatTriple {
    pub fn new(wpa: f64, re: f64, score: f64) -> Self {
        Self { wpa, re, score }
    }

    pub fn get(&self, stat: Statistic) -> f64 {
        match stat {
            Statistic::WinProbability => self.wpa,
            Statistic::RunExpectancy => self.re,
            Statistic::OutcomeScore => self.score,
        }
    }

    pub fn set(&mut self, stat: Statistic, value: f64) {
        match stat {
            Statistic::WinProbability => self.wpa = value,
            Statistic::RunExpectancy => self.re = value,
            Statistic::OutcomeScore => self.score = value,
        }
    }

    pub fn add(&mut self, other: StatTriple) {
        self.wpa += other.wpa;
        self.re += other.re;
        self.score += other.score;
    }

    /// Componentwise negation, used to mirror a delta onto the opposing player.
    pub fn negated(self) -> StatTriple {
        StatTriple {
            wpa: -self.wpa,
            re: -self.re,
            score: -self.score,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
