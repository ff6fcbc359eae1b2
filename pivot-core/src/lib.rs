//! pivot-core: a dense two-phase simplex engine for linear programs.
//!
//! The crate takes a JSON-native [`Model`] (objective, linear constraint
//! records, solution-variable combinations, domain flags), canonicalizes it
//! into an all-equality standard form with a Phase-I-feasible basis, and
//! optimizes it with a tableau simplex:
//!
//! - **Preprocessing** ([`preprocess`]): slack/surplus/artificial
//!   introduction, unrestricted-variable splitting, fixed-variable
//!   substitution, rhs sign normalization.
//! - **Simplex** ([`simplex`]): two-phase with Dantzig pricing, Bland
//!   fallback on cycle suspicion, epsilon-guarded pivots, cooperative
//!   deadlines.
//! - **Assembly** ([`assemble`]): projection back onto the user's declared
//!   solution variables.
//!
//! Branch-and-bound for integer models lives in the companion `pivot-mip`
//! crate, which drives this engine once per search node.
//!
//! # Example
//!
//! ```
//! use pivot_core::{ConstraintSpec, Model, OpType, SolverSettings};
//!
//! // max x + y  s.t.  x + 2y <= 14, 3x - y >= 0, x - y <= 2
//! let mut model = Model::new("obj", OpType::Max);
//! model.define("obj", [("x", 1.0), ("y", 1.0)]);
//! model.define("c1", [("x", 1.0), ("y", 2.0)]);
//! model.define("c2", [("x", 3.0), ("y", -1.0)]);
//! model.define("c3", [("x", 1.0), ("y", -1.0)]);
//! model.define("x", [("x", 1.0)]);
//! model.define("y", [("y", 1.0)]);
//! model.constrain("c1", ConstraintSpec::max(14.0));
//! model.constrain("c2", ConstraintSpec::min(0.0));
//! model.constrain("c3", ConstraintSpec::max(2.0));
//!
//! let solution = pivot_core::solve_continuous(&model, &SolverSettings::default()).unwrap();
//! assert!((solution.result - 10.0).abs() < 1e-6);
//! ```

#![warn(missing_docs)]

pub mod assemble;
pub mod error;
pub mod model;
pub mod preprocess;
pub mod settings;
pub mod simplex;
pub mod solution;
pub mod tableau;

pub use assemble::OutputOptions;
pub use error::{CoreResult, SolveError, ValidationError};
pub use model::{ConstraintSpec, ExternalSolver, Model, ModelOptions, OpType};
pub use settings::SolverSettings;
pub use simplex::{LpResult, Simplex};
pub use solution::{Solution, SolveStats, SolveStatus};

use std::time::{Duration, Instant};

/// Solve the continuous relaxation of a model end to end.
///
/// Integer and binary flags are ignored here; `pivot-mip` layers the
/// branch-and-bound search on top of this entry.
pub fn solve_continuous(model: &Model, settings: &SolverSettings) -> CoreResult<Solution> {
    solve_continuous_full(model, settings, false)
}

/// [`solve_continuous`] with control over zero-entry reporting.
pub fn solve_continuous_full(
    model: &Model,
    settings: &SolverSettings,
    full: bool,
) -> CoreResult<Solution> {
    let started = Instant::now();
    let sf = preprocess::StandardForm::build(model)?;
    let mut tab = sf.assemble(&[]);
    let costs = sf.costs_for(&tab);

    let deadline = settings
        .time_limit_ms
        .map(|ms| started + Duration::from_millis(ms));
    let lp = Simplex::new(settings, deadline).solve(&mut tab, &costs);

    let mut solution = assemble::assemble_solution(
        model,
        &sf,
        &lp,
        OutputOptions {
            precision: settings.precision,
            full,
        },
        None,
    );
    solution.stats.solve_time_ms = started.elapsed().as_millis() as u64;
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_solve_round_trips_the_doc_example() {
        let mut model = Model::new("obj", OpType::Max);
        model.define("obj", [("x", 1.0), ("y", 1.0)]);
        model.define("c1", [("x", 1.0), ("y", 2.0)]);
        model.define("c2", [("x", 3.0), ("y", -1.0)]);
        model.define("c3", [("x", 1.0), ("y", -1.0)]);
        model.define("x", [("x", 1.0)]);
        model.define("y", [("y", 1.0)]);
        model.constrain("c1", ConstraintSpec::max(14.0));
        model.constrain("c2", ConstraintSpec::min(0.0));
        model.constrain("c3", ConstraintSpec::max(2.0));

        let solution = solve_continuous(&model, &SolverSettings::default()).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!((solution.result - 10.0).abs() < 1e-6);
        assert!((solution.variables["x"] - 6.0).abs() < 1e-6);
        assert!((solution.variables["y"] - 4.0).abs() < 1e-6);
    }
}
