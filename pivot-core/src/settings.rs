//! Configuration settings for the simplex engine.

/// Solver settings and numerical tolerances.
///
/// All equality and sign tests in the engine go through these tolerances;
/// there are no exact floating-point comparisons on solver state.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    /// Integer feasibility / output rounding tolerance.
    /// A value is considered integral if |x - round(x)| <= precision.
    pub precision: f64,

    /// Relative optimality gap tolerance for the branch-and-bound layer.
    /// A node is pruned when its bound is within tolerance * max(1, |incumbent|)
    /// of the incumbent.
    pub tolerance: f64,

    /// Entries with |v| < eps_pivot are treated as zero; divisions by
    /// candidate pivots below this threshold are skipped.
    /// Must stay strictly below `precision`.
    pub eps_pivot: f64,

    /// Reduced costs >= -eps_cost are treated as non-negative.
    pub eps_cost: f64,

    /// Wall-clock limit in milliseconds (None = unlimited).
    pub time_limit_ms: Option<u64>,

    /// On cycle suspicion: terminate with `CycleDetected` (true, default)
    /// or switch to Bland's rule and keep going (false).
    pub exit_on_cycles: bool,

    /// Iteration cap factor: cycle suspicion is raised after
    /// `iter_cap_factor * max(m, n)` pivots.
    pub iter_cap_factor: u64,

    /// Print search progress via the `log` facade.
    pub verbose: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            precision: 1e-9,
            tolerance: 0.0,
            eps_pivot: 1e-12,
            eps_cost: 1e-9,
            time_limit_ms: None,
            exit_on_cycles: true,
            iter_cap_factor: 50,
            verbose: false,
        }
    }
}

impl SolverSettings {
    /// Set the integer feasibility tolerance.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Set the relative optimality gap tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the wall-clock limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Set the cycle policy.
    pub fn with_exit_on_cycles(mut self, exit: bool) -> Self {
        self.exit_on_cycles = exit;
        self
    }

    /// Enable verbose progress logging.
    pub fn verbose() -> Self {
        let mut s = Self::default();
        s.verbose = true;
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_pivot_epsilon_below_precision() {
        let s = SolverSettings::default();
        assert!(s.eps_pivot < s.precision);
        assert!(s.eps_cost <= s.precision);
        assert!(s.exit_on_cycles);
    }

    #[test]
    fn builders() {
        let s = SolverSettings::default()
            .with_precision(1e-6)
            .with_tolerance(1e-4)
            .with_time_limit_ms(500)
            .with_exit_on_cycles(false);
        assert_eq!(s.precision, 1e-6);
        assert_eq!(s.tolerance, 1e-4);
        assert_eq!(s.time_limit_ms, Some(500));
        assert!(!s.exit_on_cycles);
    }
}
