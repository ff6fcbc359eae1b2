//! Search node representation.

use pivot_core::preprocess::BoundOverride;

/// A domain tightening on one integer variable.
///
/// Neutral values (`lower = 0`, `upper = +inf`) leave that side untouched;
/// folding a change takes the max of lower bounds and min of uppers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundChange {
    /// Integer-variable ordinal.
    pub var: usize,

    /// New lower bound (0 = no tightening).
    pub lower: f64,

    /// New upper bound (+inf = no tightening).
    pub upper: f64,
}

impl BoundChange {
    /// Down branch: `x <= floor(value)`.
    pub fn down_branch(var: usize, value: f64) -> Self {
        Self {
            var,
            lower: 0.0,
            upper: value.floor(),
        }
    }

    /// Up branch: `x >= ceil(value)`.
    pub fn up_branch(var: usize, value: f64) -> Self {
        Self {
            var,
            lower: value.ceil(),
            upper: f64::INFINITY,
        }
    }
}

/// A node in the branch-and-bound tree.
///
/// Nodes store only the cumulative bound changes from the root; a node's
/// tableau is rebuilt from the root standard form when the node is
/// evaluated.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Node identifier (0 for the root; assigned in creation order).
    pub id: u64,

    /// Depth in the tree.
    pub depth: usize,

    /// Parent's LP objective: a lower bound on everything in this subtree
    /// (minimization convention, constant included).
    pub bound: f64,

    /// Cumulative bound changes from the root.
    pub changes: Vec<BoundChange>,
}

impl SearchNode {
    /// The root node.
    pub fn root() -> Self {
        Self {
            id: 0,
            depth: 0,
            bound: f64::NEG_INFINITY,
            changes: Vec::new(),
        }
    }

    /// Child with one additional bound change and the parent's LP value as
    /// its bound.
    pub fn child(&self, id: u64, bound: f64, change: BoundChange) -> Self {
        let mut changes = self.changes.clone();
        changes.push(change);
        Self {
            id,
            depth: self.depth + 1,
            bound,
            changes,
        }
    }

    /// Effective `(lower, upper)` per integer variable after folding this
    /// node's changes over the defaults.
    pub fn effective_bounds(&self, defaults: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let mut bounds = defaults.to_vec();
        for change in &self.changes {
            let (lb, ub) = bounds[change.var];
            bounds[change.var] = (lb.max(change.lower), ub.min(change.upper));
        }
        bounds
    }

    /// Overrides for tableau assembly: only the variables whose effective
    /// domain differs from the default.
    pub fn overrides(&self, defaults: &[(f64, f64)]) -> Vec<BoundOverride> {
        self.effective_bounds(defaults)
            .into_iter()
            .enumerate()
            .filter(|&(var, bounds)| bounds != defaults[var])
            .map(|(var, (lower, upper))| BoundOverride { var, lower, upper })
            .collect()
    }

    /// False when some folded domain is empty.
    pub fn is_consistent(&self, defaults: &[(f64, f64)], tol: f64) -> bool {
        self.effective_bounds(defaults)
            .iter()
            .all(|&(lb, ub)| lb <= ub + tol)
    }
}
