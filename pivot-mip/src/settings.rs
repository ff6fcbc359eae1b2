//! Configuration for the branch-and-bound search.

use pivot_core::SolverSettings;

/// MILP search settings.
///
/// The LP settings carry the shared tolerances: `precision` doubles as the
/// integer feasibility tolerance and `tolerance` as the relative
/// optimality gap.
#[derive(Debug, Clone)]
pub struct MipSettings {
    /// Settings for the per-node LP solves.
    pub lp: SolverSettings,

    /// Maximum number of nodes to evaluate before giving up with the best
    /// incumbent.
    pub max_nodes: u64,

    /// Print progress every N nodes when the LP settings are verbose.
    pub log_freq: u64,
}

impl Default for MipSettings {
    fn default() -> Self {
        Self {
            lp: SolverSettings::default(),
            max_nodes: 1_000_000,
            log_freq: 100,
        }
    }
}

impl MipSettings {
    /// Wrap LP settings with search defaults.
    pub fn new(lp: SolverSettings) -> Self {
        Self {
            lp,
            ..Default::default()
        }
    }

    /// Cap the node count.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = nodes;
        self
    }
}
