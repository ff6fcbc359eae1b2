//! pivot-mip: branch-and-bound MILP solving over the pivot-core simplex.
//!
//! This crate is the user-facing entry point of the solver. [`solve`] (and
//! [`solve_with`]) accept a [`Model`], run validation on request, route
//! continuous models straight through the simplex and integer models
//! through a deterministic best-bound branch-and-bound search, and return
//! an in-band [`Solution`].
//!
//! # Example
//!
//! ```
//! use pivot_core::{ConstraintSpec, Model, OpType};
//!
//! // Binary knapsack: max 3a + 4b + 5c + 6d, 2a + 3b + 4c + 5d <= 5.
//! let mut model = Model::new("obj", OpType::Max);
//! model.define("obj", [("a", 3.0), ("b", 4.0), ("c", 5.0), ("d", 6.0)]);
//! model.define("cap", [("a", 2.0), ("b", 3.0), ("c", 4.0), ("d", 5.0)]);
//! model.define("a", [("a", 1.0)]);
//! model.define("b", [("b", 1.0)]);
//! model.constrain("cap", ConstraintSpec::max(5.0));
//! for v in ["a", "b", "c", "d"] {
//!     model.flag_binary(v);
//! }
//!
//! let solution = pivot_mip::solve(&model).unwrap();
//! assert!((solution.result - 7.0).abs() < 1e-6);
//! assert_eq!(solution.is_integral, Some(true));
//! ```

#![warn(missing_docs)]

pub mod model;
pub mod search;
pub mod settings;

pub use settings::MipSettings;

use std::sync::Mutex;
use std::time::{Duration, Instant};

use pivot_core::assemble::{assemble_solution, OutputOptions};
use pivot_core::preprocess::StandardForm;
use pivot_core::{
    CoreResult, LpResult, Model, Solution, SolveStatus, SolverSettings,
};

use model::MipProblem;
use search::BranchAndBound;

/// Knobs for a single [`solve_with`] call.
#[derive(Debug, Clone, Copy)]
pub struct SolveOptions {
    /// Integer feasibility / output drop tolerance.
    pub precision: f64,

    /// Include zero-valued solution variables in the output.
    pub full: bool,

    /// Run structural model validation before solving.
    pub validate: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            precision: 1e-9,
            full: false,
            validate: false,
        }
    }
}

/// Most recently solved model.
///
/// Holds the sentinel empty model until the first successful solve, is
/// overwritten on every successful return, and is never cleared. The lock
/// is taken only for the final store, so it is not readable mid-solve.
static LAST_SOLVED: Mutex<Option<Model>> = Mutex::new(None);

/// Read the most recently solved model (sentinel empty model before any
/// solve completes).
pub fn last_solved_model() -> Model {
    LAST_SOLVED
        .lock()
        .map(|guard| guard.clone().unwrap_or_default())
        .unwrap_or_default()
}

fn record_solved(model: &Model) {
    if let Ok(mut guard) = LAST_SOLVED.lock() {
        *guard = Some(model.clone());
    }
}

/// Solve a model with default options.
pub fn solve(model: &Model) -> CoreResult<Solution> {
    solve_with(model, &SolveOptions::default())
}

/// Solve a model: validation (on request), LP or branch-and-bound
/// dispatch, and solution assembly.
///
/// Parsing/validation defects are raised as errors; solver-state verdicts
/// (infeasible, unbounded, cycle, timeout) come back in-band on the
/// [`Solution`]. The input model is never mutated, and the
/// [`last_solved_model`] slot is updated only on successful return.
pub fn solve_with(model: &Model, opts: &SolveOptions) -> CoreResult<Solution> {
    if opts.validate {
        model.validate()?;
    }

    let settings = solver_settings(model, opts);
    let solution = if model.has_integers() {
        solve_milp(model, &settings, opts.full)?
    } else {
        pivot_core::solve_continuous_full(model, &settings, opts.full)?
    };

    record_solved(model);
    Ok(solution)
}

/// Per-solve settings from the model's options plus call options.
fn solver_settings(model: &Model, opts: &SolveOptions) -> SolverSettings {
    let mut settings = SolverSettings::default().with_precision(opts.precision);
    if let Some(tolerance) = model.options.tolerance {
        settings.tolerance = tolerance;
    }
    if let Some(timeout) = model.options.timeout {
        settings.time_limit_ms = Some(timeout);
    }
    if let Some(exit) = model.options.exit_on_cycles {
        settings.exit_on_cycles = exit;
    }
    if model.options.use_mir_cuts.unwrap_or(false) {
        // Deprecated knob: accepted and ignored.
        log::debug!("useMIRCuts is deprecated and has no effect");
    }
    settings
}

fn solve_milp(model: &Model, settings: &SolverSettings, full: bool) -> CoreResult<Solution> {
    let started = Instant::now();
    let deadline = settings
        .time_limit_ms
        .map(|ms| started + Duration::from_millis(ms));

    let sf = StandardForm::build(model)?;
    let problem = MipProblem::new(sf);
    let mip_settings = MipSettings::new(settings.clone());

    let outcome = BranchAndBound::new(&problem, &mip_settings, deadline).run();

    let sf = &problem.sf;
    let feasible = outcome.x.is_some();
    let lp = LpResult {
        status: outcome.status,
        x: outcome.x.clone().unwrap_or_default(),
        objective: outcome.objective - sf.obj_constant,
        iterations: outcome.iterations,
        feasible,
    };

    let is_integral = feasible && problem.is_integer_feasible(&lp.x, settings.precision);
    let mut solution = assemble_solution(
        model,
        sf,
        &lp,
        OutputOptions {
            precision: settings.precision,
            full,
        },
        Some(is_integral),
    );

    // The search, not the last LP, decides feasibility here. An unbounded
    // relaxation still has feasible assignments; otherwise the incumbent
    // decides (a timeout without one found no feasible point).
    solution.feasible = match outcome.status {
        SolveStatus::Unbounded => true,
        SolveStatus::Infeasible => false,
        _ => feasible,
    };
    solution.stats.nodes_explored = outcome.nodes_explored;
    solution.stats.incumbent_updates = outcome.incumbent_updates;
    solution.stats.solve_time_ms = started.elapsed().as_millis() as u64;
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_core::{ConstraintSpec, OpType};

    // The facade tests share the process-wide last-solved slot; serialize
    // them so concurrent test threads cannot interleave stores.
    static TEST_GUARD: Mutex<()> = Mutex::new(());

    fn guard() -> std::sync::MutexGuard<'static, ()> {
        TEST_GUARD.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn continuous_models_bypass_the_search() {
        let _guard = guard();
        let mut m = Model::new("obj", OpType::Min);
        m.define("obj", [("x", 1.0)]);
        m.define("floor", [("x", 1.0)]);
        m.constrain("floor", ConstraintSpec::min(2.5));

        let sol = solve(&m).unwrap();
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert!((sol.result - 2.5).abs() < 1e-9);
        assert_eq!(sol.is_integral, None);
        assert_eq!(sol.stats.nodes_explored, 0);
    }

    #[test]
    fn validation_is_opt_in() {
        let _guard = guard();
        let mut broken = Model::new("obj", OpType::Min);
        broken.define("obj", [("x", 1.0)]);
        broken.define("row", [("x", 1.0)]);
        broken.constrain("row", ConstraintSpec::min(1.0));
        broken.flag_binary("x");
        broken.flag_unrestricted("x");

        // Without validation the solve proceeds (and still terminates).
        assert!(solve(&broken).is_ok());

        let opts = SolveOptions {
            validate: true,
            ..Default::default()
        };
        assert!(solve_with(&broken, &opts).is_err());
    }

    #[test]
    fn last_solved_model_updates_on_success_only() {
        let _guard = guard();
        let mut good = Model::new("obj", OpType::Min);
        good.define("obj", [("x", 1.0)]);
        good.define("row", [("x", 1.0)]);
        good.constrain("row", ConstraintSpec::min(7.0));
        solve(&good).unwrap();
        assert_eq!(last_solved_model(), good);

        let mut broken = good.clone();
        broken.optimize = "nope".into();
        let opts = SolveOptions {
            validate: true,
            ..Default::default()
        };
        assert!(solve_with(&broken, &opts).is_err());
        // The failed solve left the slot untouched.
        assert_eq!(last_solved_model(), good);
    }
}
