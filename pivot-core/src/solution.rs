//! Solution types returned by the solve entry points.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Terminal state of a solve, reported in-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Optimal solution found within tolerance.
    Optimal,

    /// No feasible assignment exists.
    Infeasible,

    /// The objective improves without bound.
    Unbounded,

    /// Cycle suspicion with `exit_on_cycles` set; the best basis seen is
    /// returned.
    CycleDetected,

    /// Wall-clock limit hit; the best incumbent (if any) is returned.
    TimedOut,

    /// Every pivot candidate fell below the pivot epsilon.
    NumericalFailure,
}

impl SolveStatus {
    /// True unless the verdict is `Infeasible`. An unbounded model still
    /// has feasible assignments; only the objective diverges.
    pub fn is_feasible(&self) -> bool {
        !matches!(self, SolveStatus::Infeasible)
    }

    /// True when optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

/// Counters from a solve, excluded from serialized output so that two runs
/// on the same model serialize identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Simplex pivots across all LP solves.
    pub iterations: u64,

    /// Branch-and-bound nodes evaluated (0 for a pure LP).
    pub nodes_explored: u64,

    /// Incumbent improvements (0 for a pure LP).
    pub incumbent_updates: u64,

    /// Wall-clock time in milliseconds.
    pub solve_time_ms: u64,
}

/// Solved assignment in the user's terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Terminal state.
    pub status: SolveStatus,

    /// False iff the model is infeasible (or no incumbent was found).
    pub feasible: bool,

    /// False iff the model is unbounded.
    pub bounded: bool,

    /// Objective value in the user's sign convention.
    pub result: f64,

    /// For mixed-integer solves: whether every integer variable landed
    /// within `precision` of an integer. `None` for pure LPs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_integral: Option<bool>,

    /// Values of the declared solution variables. Entries with magnitude
    /// at or below `precision` are dropped unless the solve asked for
    /// `full` output.
    pub variables: BTreeMap<String, f64>,

    /// Run counters (not serialized).
    #[serde(skip)]
    pub stats: SolveStats,
}

impl Solution {
    /// An infeasible verdict with no assignment.
    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            feasible: false,
            bounded: true,
            result: 0.0,
            is_integral: None,
            variables: BTreeMap::new(),
            stats: SolveStats::default(),
        }
    }

    /// An unbounded verdict.
    pub fn unbounded() -> Self {
        Self {
            status: SolveStatus::Unbounded,
            feasible: true,
            bounded: false,
            result: 0.0,
            is_integral: None,
            variables: BTreeMap::new(),
            stats: SolveStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_predicates() {
        assert!(SolveStatus::Optimal.is_feasible());
        assert!(SolveStatus::Optimal.is_optimal());
        assert!(SolveStatus::CycleDetected.is_feasible());
        assert!(SolveStatus::Unbounded.is_feasible());
        assert!(!SolveStatus::Infeasible.is_feasible());
        assert!(!SolveStatus::TimedOut.is_optimal());
    }

    #[test]
    fn stats_do_not_leak_into_serialized_form() {
        let mut sol = Solution::infeasible();
        sol.stats.iterations = 42;
        let json = serde_json::to_string(&sol).unwrap();
        assert!(!json.contains("iterations"));
        assert!(!json.contains("42"));
    }
}
