//! Branch-and-bound tree controller.

use std::time::Instant;

use pivot_core::{Simplex, SolveStatus};

use super::{select_most_fractional, NodeQueue, SearchNode};
use crate::model::{IncumbentTracker, MipOutcome, MipProblem};
use crate::settings::MipSettings;

/// Drives the best-bound search: pops nodes, solves their LP relaxations,
/// prunes, branches, and tracks the incumbent.
pub struct BranchAndBound<'a> {
    problem: &'a MipProblem,
    settings: &'a MipSettings,
    queue: NodeQueue,
    incumbent: IncumbentTracker,
    defaults: Vec<(f64, f64)>,
    next_node_id: u64,
    nodes_explored: u64,
    nodes_pruned: u64,
    iterations: u64,
    deadline: Option<Instant>,
}

impl<'a> BranchAndBound<'a> {
    /// Set up a search over a canonicalized problem.
    pub fn new(
        problem: &'a MipProblem,
        settings: &'a MipSettings,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            problem,
            settings,
            queue: NodeQueue::new(),
            incumbent: IncumbentTracker::new(),
            defaults: problem.default_bounds(),
            next_node_id: 1,
            nodes_explored: 0,
            nodes_pruned: 0,
            iterations: 0,
            deadline,
        }
    }

    /// Run the search to completion and return the outcome.
    pub fn run(mut self) -> MipOutcome {
        self.queue.push(SearchNode::root());

        let status = loop {
            let Some(node) = self.queue.pop() else {
                break if self.incumbent.has_incumbent() {
                    SolveStatus::Optimal
                } else {
                    SolveStatus::Infeasible
                };
            };

            if self.deadline_passed() {
                break SolveStatus::TimedOut;
            }
            if self.nodes_explored >= self.settings.max_nodes {
                log::warn!(
                    "node cap {} reached; returning best incumbent",
                    self.settings.max_nodes
                );
                break SolveStatus::TimedOut;
            }

            let cutoff = self.incumbent.cutoff(self.settings.lp.tolerance);
            if node.bound >= cutoff {
                self.nodes_pruned += 1;
                continue;
            }
            if !self.node_domains_consistent(&node) {
                self.nodes_pruned += 1;
                continue;
            }

            match self.evaluate(&node) {
                NodeVerdict::Terminal(status) => break status,
                NodeVerdict::Handled => {}
            }

            self.log_progress();
        };

        MipOutcome {
            status,
            x: self.incumbent.solution.clone(),
            objective: self.incumbent.objective,
            best_bound: self.queue.best_bound(),
            nodes_explored: self.nodes_explored,
            nodes_pruned: self.nodes_pruned,
            incumbent_updates: self.incumbent.update_count,
            iterations: self.iterations,
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn node_domains_consistent(&self, node: &SearchNode) -> bool {
        node.is_consistent(&self.defaults, self.settings.lp.precision)
    }

    /// Solve one node's LP and act on the verdict.
    fn evaluate(&mut self, node: &SearchNode) -> NodeVerdict {
        let sf = &self.problem.sf;
        let overrides = node.overrides(&self.defaults);
        let mut tab = sf.assemble(&overrides);
        let costs = sf.costs_for(&tab);

        let mut simplex = Simplex::new(&self.settings.lp, self.deadline);
        let lp = simplex.solve(&mut tab, &costs);
        self.nodes_explored += 1;
        self.iterations += lp.iterations;

        match lp.status {
            SolveStatus::Infeasible => {
                self.nodes_pruned += 1;
                NodeVerdict::Handled
            }
            SolveStatus::Unbounded => {
                if node.id == 0 {
                    NodeVerdict::Terminal(SolveStatus::Unbounded)
                } else {
                    // A child's feasible region is a subset of the root's;
                    // this only happens through numerical noise.
                    log::warn!("unbounded relaxation at node {}; pruned", node.id);
                    self.nodes_pruned += 1;
                    NodeVerdict::Handled
                }
            }
            SolveStatus::TimedOut => NodeVerdict::Terminal(SolveStatus::TimedOut),
            SolveStatus::CycleDetected | SolveStatus::NumericalFailure => {
                if node.id == 0 {
                    NodeVerdict::Terminal(lp.status)
                } else {
                    log::warn!("node {} LP ended with {:?}; pruned", node.id, lp.status);
                    self.nodes_pruned += 1;
                    NodeVerdict::Handled
                }
            }
            SolveStatus::Optimal => {
                let objective = lp.objective + sf.obj_constant;
                let cutoff = self.incumbent.cutoff(self.settings.lp.tolerance);
                if objective >= cutoff {
                    self.nodes_pruned += 1;
                    return NodeVerdict::Handled;
                }

                let values = self.problem.integer_values(&lp.x);
                match select_most_fractional(&values, self.settings.lp.precision) {
                    None => {
                        if self.incumbent.update(&lp.x, objective) {
                            let cutoff = self.incumbent.cutoff(self.settings.lp.tolerance);
                            let dropped = self.queue.prune_by_bound(cutoff);
                            self.nodes_pruned += dropped as u64;
                            if self.settings.lp.verbose {
                                log::info!(
                                    "new incumbent {:.6e} at node {} ({} open nodes dropped)",
                                    objective,
                                    node.id,
                                    dropped
                                );
                            }
                        }
                        NodeVerdict::Handled
                    }
                    Some(decision) => {
                        let (down, up) = decision.children();
                        let down_id = self.next_node_id;
                        let up_id = self.next_node_id + 1;
                        self.next_node_id += 2;

                        // Down branch enqueued first: insertion order is
                        // the queue's tiebreak.
                        self.queue.push(node.child(down_id, objective, down));
                        self.queue.push(node.child(up_id, objective, up));
                        NodeVerdict::Handled
                    }
                }
            }
        }
    }

    fn log_progress(&self) {
        if !self.settings.lp.verbose || self.settings.log_freq == 0 {
            return;
        }
        if self.nodes_explored % self.settings.log_freq != 0 {
            return;
        }
        log::info!(
            "nodes: {} ({} open) | bound: {:.6e} | incumbent: {:.6e} | pivots: {}",
            self.nodes_explored,
            self.queue.len(),
            self.queue.best_bound(),
            self.incumbent.objective,
            self.iterations,
        );
    }
}

enum NodeVerdict {
    /// The whole search stops with this status.
    Terminal(SolveStatus),
    /// Pruned, bounded, branched, or incumbent-updated; keep looping.
    Handled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_core::preprocess::StandardForm;
    use pivot_core::{ConstraintSpec, Model, OpType};

    fn run_model(model: &Model) -> MipOutcome {
        let problem = MipProblem::new(StandardForm::build(model).unwrap());
        let settings = MipSettings::default();
        BranchAndBound::new(&problem, &settings, None).run()
    }

    #[test]
    fn knapsack_finds_the_integer_optimum() {
        // max 3a + 4b + 5c + 6d; 2a + 3b + 4c + 5d <= 5; all binary.
        let mut m = Model::new("obj", OpType::Max);
        m.define(
            "obj",
            [("a", 3.0), ("b", 4.0), ("c", 5.0), ("d", 6.0)],
        );
        m.define(
            "cap",
            [("a", 2.0), ("b", 3.0), ("c", 4.0), ("d", 5.0)],
        );
        m.constrain("cap", ConstraintSpec::max(5.0));
        for v in ["a", "b", "c", "d"] {
            m.flag_binary(v);
        }

        let out = run_model(&m);
        assert_eq!(out.status, SolveStatus::Optimal);
        // Internal minimization objective is the negated maximum.
        assert!((out.objective - (-7.0)).abs() < 1e-6);

        let x = out.x.expect("incumbent");
        let problem = MipProblem::new(StandardForm::build(&m).unwrap());
        let values = problem.integer_values(&x);
        assert!((values[0] - 1.0).abs() < 1e-6); // a
        assert!((values[1] - 1.0).abs() < 1e-6); // b
        assert!(values[2].abs() < 1e-6); // c
        assert!(values[3].abs() < 1e-6); // d
    }

    #[test]
    fn integer_infeasible_model_is_reported() {
        // x integer, 0.2 <= x <= 0.8: LP-feasible, integer-infeasible.
        let mut m = Model::new("obj", OpType::Min);
        m.define("obj", [("x", 1.0)]);
        m.define("lo", [("x", 1.0)]);
        m.define("hi", [("x", 1.0)]);
        m.constrain("lo", ConstraintSpec::min(0.2));
        m.constrain("hi", ConstraintSpec::max(0.8));
        m.flag_int("x");

        let out = run_model(&m);
        assert_eq!(out.status, SolveStatus::Infeasible);
        assert!(out.x.is_none());
    }

    #[test]
    fn unbounded_root_is_terminal() {
        let mut m = Model::new("obj", OpType::Max);
        m.define("obj", [("x", 1.0)]);
        m.define("row", [("x", 1.0), ("y", -1.0)]);
        m.constrain("row", ConstraintSpec::max(1.0));
        m.flag_int("x");

        let out = run_model(&m);
        assert_eq!(out.status, SolveStatus::Unbounded);
    }

    #[test]
    fn node_cap_stops_with_best_effort() {
        let mut m = Model::new("obj", OpType::Max);
        m.define("obj", [("x", 1.0), ("y", 1.0)]);
        m.define("row", [("x", 2.0), ("y", 2.0)]);
        m.constrain("row", ConstraintSpec::max(7.0));
        m.flag_int("x");
        m.flag_int("y");

        let problem = MipProblem::new(StandardForm::build(&m).unwrap());
        let settings = MipSettings::default().with_max_nodes(1);
        let out = BranchAndBound::new(&problem, &settings, None).run();
        assert_eq!(out.status, SolveStatus::TimedOut);
    }
}
