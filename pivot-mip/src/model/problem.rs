//! Integer-aware view over a canonicalized model.

use pivot_core::preprocess::StandardForm;

/// A standard form plus integrality helpers.
///
/// Integer variables are addressed by ordinal (their position in
/// [`StandardForm::integer_vars`], which is primary-column order); all
/// branching tiebreaks use that ordinal.
pub struct MipProblem {
    /// Canonicalized problem.
    pub sf: StandardForm,
}

impl MipProblem {
    /// Wrap a standard form.
    pub fn new(sf: StandardForm) -> Self {
        Self { sf }
    }

    /// Number of integer variables.
    pub fn num_integers(&self) -> usize {
        self.sf.integer_vars.len()
    }

    /// Default `(lower, upper)` domain per integer variable.
    pub fn default_bounds(&self) -> Vec<(f64, f64)> {
        self.sf
            .integer_vars
            .iter()
            .map(|iv| (0.0, iv.upper))
            .collect()
    }

    /// Current value of every integer variable under a standard-form
    /// assignment, by ordinal.
    pub fn integer_values(&self, x: &[f64]) -> Vec<f64> {
        self.sf
            .integer_vars
            .iter()
            .map(|iv| iv.binding.value(x))
            .collect()
    }

    /// True when every integer variable is within `tol` of an integer.
    pub fn is_integer_feasible(&self, x: &[f64], tol: f64) -> bool {
        self.integer_values(x)
            .iter()
            .all(|&v| (v - v.round()).abs() <= tol)
    }
}
