//! Two-phase dense simplex.
//!
//! Phase I minimizes the artificial sum from the preprocessor's starting
//! basis; Phase II optimizes the true costs with artificial columns barred
//! from entering. Entering columns follow Dantzig's rule until a cycle is
//! suspected, after which the engine either stops (`exit_on_cycles`) or
//! falls back to Bland's rule. The leaving row is the minimum-ratio row,
//! ties broken by the smallest basis index.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Instant;

use crate::settings::SolverSettings;
use crate::solution::SolveStatus;
use crate::tableau::Tableau;

/// Result of one LP solve on a tableau.
#[derive(Debug, Clone)]
pub struct LpResult {
    /// Terminal state.
    pub status: SolveStatus,

    /// Standard-form assignment (basic solution of the final tableau).
    pub x: Vec<f64>,

    /// Objective value `c . x` in minimization convention; meaningful only
    /// when `feasible` is set.
    pub objective: f64,

    /// Pivots performed across both phases.
    pub iterations: u64,

    /// True once Phase I succeeded: the returned basis satisfies the
    /// constraints even for non-`Optimal` statuses.
    pub feasible: bool,
}

/// Dense two-phase simplex runner.
pub struct Simplex<'a> {
    settings: &'a SolverSettings,
    deadline: Option<Instant>,
    bland: bool,
    iterations: u64,
}

enum Step {
    Done(SolveStatus),
    Pivoted,
}

impl<'a> Simplex<'a> {
    /// Create a runner; `deadline` is the absolute wall-clock cutoff.
    pub fn new(settings: &'a SolverSettings, deadline: Option<Instant>) -> Self {
        Self {
            settings,
            deadline,
            bland: false,
            iterations: 0,
        }
    }

    /// Solve `minimize costs . x` over the tableau's rows.
    ///
    /// `costs` covers every tableau column (zeros on auxiliaries). The
    /// tableau must come from the preprocessor: rhs non-negative, one basic
    /// column per row.
    pub fn solve(&mut self, tab: &mut Tableau, costs: &[f64]) -> LpResult {
        if tab.has_artificials() {
            let mut phase1 = vec![0.0; tab.ncols()];
            for j in tab.art_start..tab.ncols() {
                phase1[j] = 1.0;
            }
            tab.install_costs(&phase1);

            match self.optimize(tab) {
                SolveStatus::Optimal => {}
                SolveStatus::Unbounded => {
                    // The Phase-I objective is bounded below by zero; a
                    // failed ratio test here is numerical noise.
                    return self.finish(tab, SolveStatus::NumericalFailure, false);
                }
                status => return self.finish(tab, status, false),
            }

            if tab.objective() > self.settings.precision {
                return self.finish(tab, SolveStatus::Infeasible, false);
            }

            self.evict_artificials(tab);
        }

        tab.install_costs(costs);
        let status = self.optimize(tab);
        self.finish(tab, status, true)
    }

    /// Pivots performed so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    fn finish(&self, tab: &Tableau, status: SolveStatus, feasible: bool) -> LpResult {
        LpResult {
            status,
            x: tab.basic_solution(),
            objective: tab.objective(),
            iterations: self.iterations,
            feasible,
        }
    }

    /// Run the pivot loop until an optimality, unboundedness, cycle, or
    /// deadline verdict.
    fn optimize(&mut self, tab: &mut Tableau) -> SolveStatus {
        let cap = self.settings.iter_cap_factor
            * std::cmp::max(tab.nrows(), tab.ncols()) as u64;
        let hard_cap = cap.saturating_mul(20);
        let mut local_iters: u64 = 0;
        let mut seen_bases: HashSet<u64> = HashSet::new();
        seen_bases.insert(basis_signature(tab));

        loop {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return SolveStatus::TimedOut;
                }
            }

            match self.step(tab) {
                Step::Done(status) => return status,
                Step::Pivoted => {}
            }

            local_iters += 1;
            self.iterations += 1;

            if local_iters > hard_cap {
                return SolveStatus::CycleDetected;
            }
            if self.bland {
                continue;
            }

            let revisit = !seen_bases.insert(basis_signature(tab));
            if revisit || local_iters > cap {
                if self.settings.exit_on_cycles {
                    log::debug!(
                        "cycle suspicion after {} pivots (revisit: {})",
                        local_iters,
                        revisit
                    );
                    return SolveStatus::CycleDetected;
                }
                log::debug!(
                    "cycle suspicion after {} pivots; switching to Bland's rule",
                    local_iters
                );
                self.bland = true;
            }
        }
    }

    /// One pivot: select entering and leaving columns and apply.
    fn step(&self, tab: &mut Tableau) -> Step {
        let Some(entering) = self.choose_entering(tab) else {
            return Step::Done(SolveStatus::Optimal);
        };
        let Some(leaving) = self.choose_leaving(tab, entering) else {
            // No blocking row: a truly non-positive column is an
            // unbounded ray; positive entries that all fell below the
            // pivot epsilon are a numerical failure instead.
            let has_positive = (0..tab.nrows()).any(|i| tab.at(i, entering) > 0.0);
            return Step::Done(if has_positive {
                SolveStatus::NumericalFailure
            } else {
                SolveStatus::Unbounded
            });
        };
        tab.pivot(leaving, entering);
        Step::Pivoted
    }

    /// Entering column among non-artificials with reduced cost below
    /// `-eps_cost`: most negative (Dantzig) or lowest index (Bland).
    fn choose_entering(&self, tab: &Tableau) -> Option<usize> {
        let eps = self.settings.eps_cost;
        if self.bland {
            return (0..tab.art_start).find(|&j| tab.cost[j] < -eps);
        }
        let mut best: Option<usize> = None;
        let mut best_cost = -eps;
        for j in 0..tab.art_start {
            if tab.cost[j] < best_cost {
                best_cost = tab.cost[j];
                best = Some(j);
            }
        }
        best
    }

    /// Minimum-ratio leaving row over entries above `eps_pivot`; ties go to
    /// the smallest basis index.
    fn choose_leaving(&self, tab: &Tableau, entering: usize) -> Option<usize> {
        let eps = self.settings.eps_pivot;
        let tie = self.settings.precision;
        let mut best: Option<(usize, f64)> = None;

        for i in 0..tab.nrows() {
            let a = tab.at(i, entering);
            if a <= eps {
                continue;
            }
            let ratio = tab.rhs(i) / a;
            match best {
                None => best = Some((i, ratio)),
                Some((row, r)) => {
                    if ratio < r - tie
                        || ((ratio - r).abs() <= tie && tab.basis[i] < tab.basis[row])
                    {
                        best = Some((i, ratio));
                    }
                }
            }
        }

        best.map(|(row, _)| row)
    }

    /// After Phase I: drive residual basic artificials out of the basis,
    /// dropping rows that are redundant over the real columns.
    fn evict_artificials(&mut self, tab: &mut Tableau) {
        let eps = self.settings.eps_pivot;
        let mut row = 0;
        while row < tab.nrows() {
            if tab.basis[row] < tab.art_start {
                row += 1;
                continue;
            }
            let art_start = tab.art_start;
            match (0..art_start).find(|&j| tab.at(row, j).abs() > eps) {
                Some(j) => {
                    // The artificial sits at zero, so this pivot keeps the
                    // basis feasible regardless of the entry's sign.
                    tab.pivot(row, j);
                    self.iterations += 1;
                    row += 1;
                }
                None => {
                    tab.remove_row(row);
                }
            }
        }
    }
}

/// Order-independent signature of the current basis set.
fn basis_signature(tab: &Tableau) -> u64 {
    let mut basis: Vec<usize> = tab.basis.clone();
    basis.sort_unstable();
    let mut hasher = DefaultHasher::new();
    basis.hash(&mut hasher);
    hasher.finish()
}
