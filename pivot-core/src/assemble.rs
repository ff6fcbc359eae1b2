//! Projection of standard-form solutions back onto the user's model.

use std::collections::BTreeMap;

use crate::model::Model;
use crate::preprocess::StandardForm;
use crate::simplex::LpResult;
use crate::solution::{Solution, SolveStats, SolveStatus};

/// Output shaping knobs.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    /// Drop threshold for solution-variable values.
    pub precision: f64,
    /// Keep zero-valued entries.
    pub full: bool,
}

/// Build the user-facing [`Solution`] from an LP (or B&B incumbent) result.
///
/// Each declared solution variable is evaluated through the binding map;
/// the objective is re-flipped into the user's sign convention; entries at
/// or below `precision` in magnitude are dropped unless `full` is set.
pub fn assemble_solution(
    model: &Model,
    sf: &StandardForm,
    lp: &LpResult,
    opts: OutputOptions,
    is_integral: Option<bool>,
) -> Solution {
    let status = lp.status;
    let feasible = lp.feasible && status.is_feasible();
    let bounded = status != SolveStatus::Unbounded;

    let result = if lp.feasible && bounded {
        let z = lp.objective + sf.obj_constant;
        if sf.maximize {
            -z
        } else {
            z
        }
    } else {
        0.0
    };

    let mut variables = BTreeMap::new();
    if lp.feasible {
        for (name, combo) in &model.variables {
            if *name == model.optimize {
                continue;
            }
            let value = sf.combo_value(combo, &lp.x);
            if opts.full || value.abs() > opts.precision {
                variables.insert(name.clone(), value);
            }
        }
    }

    Solution {
        status,
        feasible,
        bounded,
        result,
        is_integral,
        variables,
        stats: SolveStats {
            iterations: lp.iterations,
            ..SolveStats::default()
        },
    }
}
