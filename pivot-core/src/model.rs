//! User-facing model representation and validation.
//!
//! A [`Model`] is the JSON-native problem description: an objective name,
//! an optimization direction, constraint records, and solution-variable
//! definitions. Solution variables are linear combinations of internal
//! variables; the combination named by `optimize` is the objective row,
//! combinations named in `constraints` are constraint rows, and the rest
//! are named outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpType {
    /// Maximize the objective.
    Max,
    /// Minimize the objective.
    #[default]
    Min,
}

/// Bounds attached to a constraint key.
///
/// `min`/`max` give one- or two-sided inequalities; `equal` pins the row
/// (or, for a raw variable, the variable itself) to a value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSpec {
    /// Lower bound (row >= min).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound (row <= max).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Exact value (row == equal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equal: Option<f64>,
}

impl ConstraintSpec {
    /// A `>= v` record.
    pub fn min(v: f64) -> Self {
        Self {
            min: Some(v),
            ..Default::default()
        }
    }

    /// A `<= v` record.
    pub fn max(v: f64) -> Self {
        Self {
            max: Some(v),
            ..Default::default()
        }
    }

    /// An `== v` record.
    pub fn equal(v: f64) -> Self {
        Self {
            equal: Some(v),
            ..Default::default()
        }
    }

    /// True when no bound is present.
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.equal.is_none()
    }
}

/// Solver knobs carried on the model itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelOptions {
    /// Relative MILP optimality gap tolerance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,

    /// Wall-clock limit in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Terminate with `CycleDetected` on cycle suspicion (default true);
    /// when false, the engine switches to Bland's rule instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_on_cycles: Option<bool>,

    /// Deprecated and ignored; accepted for compatibility with older
    /// model files.
    #[serde(rename = "useMIRCuts", skip_serializing_if = "Option::is_none")]
    pub use_mir_cuts: Option<bool>,
}

/// Description of an external solver binary to hand the model to.
///
/// Consumed by the CLI layer only; the engine ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalSolver {
    /// Path to the solver binary.
    pub bin_path: String,

    /// Arguments passed before the staged model file.
    pub args: Vec<String>,

    /// Path of the staging file the LP text is written to.
    pub temp_name: String,
}

/// A linear program / mixed-integer program in user terms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    /// Name of the objective solution variable.
    pub optimize: String,

    /// Optimization direction.
    #[serde(rename = "opType")]
    pub op_type: OpType,

    /// Constraint records keyed by solution-variable or raw variable name.
    pub constraints: BTreeMap<String, ConstraintSpec>,

    /// Solution-variable definitions: name -> (internal variable -> coeff).
    pub variables: BTreeMap<String, BTreeMap<String, f64>>,

    /// Integer variables.
    #[serde(deserialize_with = "truthy_flags")]
    pub ints: BTreeMap<String, bool>,

    /// Binary variables (0/1, integer).
    #[serde(deserialize_with = "truthy_flags")]
    pub binaries: BTreeMap<String, bool>,

    /// Sign-unrestricted variables.
    #[serde(deserialize_with = "truthy_flags")]
    pub unrestricted: BTreeMap<String, bool>,

    /// Solver knobs.
    pub options: ModelOptions,

    /// Optional external-solver hand-off descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalSolver>,
}

/// Accepts `true`, `1`, `1.0`, or any nonzero number as a set flag.
///
/// Model files in the wild mix booleans and numbers here; internally a
/// plain `bool` is all we keep.
fn truthy_flags<'de, D>(deserializer: D) -> Result<BTreeMap<String, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Num(f64),
    }

    let raw = BTreeMap::<String, Flag>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| {
            let set = match v {
                Flag::Bool(b) => b,
                Flag::Num(n) => n != 0.0,
            };
            (k, set)
        })
        .collect())
}

impl Model {
    /// Create an empty model with the given objective name and direction.
    pub fn new(optimize: impl Into<String>, op_type: OpType) -> Self {
        Self {
            optimize: optimize.into(),
            op_type,
            ..Default::default()
        }
    }

    /// Define (or replace) a solution variable as a linear combination.
    pub fn define<I, S>(&mut self, name: impl Into<String>, terms: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let combo = terms
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<BTreeMap<_, _>>();
        self.variables.insert(name.into(), combo);
        self
    }

    /// Attach a constraint record to a key.
    pub fn constrain(&mut self, name: impl Into<String>, spec: ConstraintSpec) -> &mut Self {
        self.constraints.insert(name.into(), spec);
        self
    }

    /// Flag a variable as integer.
    pub fn flag_int(&mut self, name: impl Into<String>) -> &mut Self {
        self.ints.insert(name.into(), true);
        self
    }

    /// Flag a variable as binary.
    pub fn flag_binary(&mut self, name: impl Into<String>) -> &mut Self {
        self.binaries.insert(name.into(), true);
        self
    }

    /// Flag a variable as sign-unrestricted.
    pub fn flag_unrestricted(&mut self, name: impl Into<String>) -> &mut Self {
        self.unrestricted.insert(name.into(), true);
        self
    }

    /// True when any variable carries an integer or binary flag.
    pub fn has_integers(&self) -> bool {
        self.ints.values().any(|&v| v) || self.binaries.values().any(|&v| v)
    }

    /// Internal variables: every name appearing inside a combination.
    ///
    /// Order is deterministic (definition order, then combination order).
    pub fn internal_variables(&self) -> Vec<&str> {
        let mut seen = std::collections::BTreeSet::new();
        let mut out = Vec::new();
        for combo in self.variables.values() {
            for name in combo.keys() {
                if seen.insert(name.as_str()) {
                    out.push(name.as_str());
                }
            }
        }
        out
    }

    /// True when `name` appears inside some combination.
    pub fn is_internal(&self, name: &str) -> bool {
        self.variables.values().any(|combo| combo.contains_key(name))
    }

    /// Structural validation per the documented error kinds.
    ///
    /// The solve entry points run this when asked to `validate`; the
    /// preprocessor independently rejects the subset of defects it cannot
    /// work around.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.optimize.is_empty() || !self.variables.contains_key(&self.optimize) {
            return Err(ValidationError::MissingObjective(self.optimize.clone()));
        }

        for (name, spec) in &self.constraints {
            if spec.is_empty() {
                return Err(ValidationError::MalformedConstraint {
                    name: name.clone(),
                    detail: "no min, max, or equal bound".into(),
                });
            }
            if let (Some(lo), Some(hi)) = (spec.min, spec.max) {
                if lo > hi {
                    return Err(ValidationError::MalformedConstraint {
                        name: name.clone(),
                        detail: format!("min {} exceeds max {}", lo, hi),
                    });
                }
            }
            if let Some(eq) = spec.equal {
                let lo_ok = spec.min.map_or(true, |lo| lo <= eq);
                let hi_ok = spec.max.map_or(true, |hi| eq <= hi);
                if !lo_ok || !hi_ok {
                    return Err(ValidationError::MalformedConstraint {
                        name: name.clone(),
                        detail: format!("equal {} conflicts with min/max", eq),
                    });
                }
            }
            if !self.variables.contains_key(name) && !self.is_internal(name) {
                return Err(ValidationError::UnknownVariable(name.clone()));
            }
        }

        for name in self.binaries.keys().filter(|n| self.binaries[*n]) {
            if self.unrestricted.get(name).copied().unwrap_or(false) {
                return Err(ValidationError::ConflictingDomain(name.clone()));
            }
        }

        for flags in [&self.ints, &self.binaries, &self.unrestricted] {
            for name in flags.keys().filter(|n| flags[*n]) {
                if !self.is_internal(name) {
                    return Err(ValidationError::UnknownVariable(name.clone()));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_var_model() -> Model {
        let mut m = Model::new("obj", OpType::Max);
        m.define("obj", [("x", 1.0), ("y", 1.0)]);
        m.define("c1", [("x", 1.0), ("y", 2.0)]);
        m.constrain("c1", ConstraintSpec::max(14.0));
        m
    }

    #[test]
    fn validate_accepts_well_formed_model() {
        assert!(two_var_model().validate().is_ok());
    }

    #[test]
    fn validate_missing_objective() {
        let mut m = two_var_model();
        m.optimize = "profit".into();
        assert!(matches!(
            m.validate(),
            Err(ValidationError::MissingObjective(_))
        ));
    }

    #[test]
    fn validate_unknown_constraint_key() {
        let mut m = two_var_model();
        m.constrain("ghost", ConstraintSpec::max(1.0));
        assert!(matches!(
            m.validate(),
            Err(ValidationError::UnknownVariable(name)) if name == "ghost"
        ));
    }

    #[test]
    fn validate_conflicting_domain() {
        let mut m = two_var_model();
        m.flag_binary("x");
        m.flag_unrestricted("x");
        assert!(matches!(
            m.validate(),
            Err(ValidationError::ConflictingDomain(name)) if name == "x"
        ));
    }

    #[test]
    fn validate_malformed_constraint() {
        let mut m = two_var_model();
        m.constrain(
            "c1",
            ConstraintSpec {
                min: Some(5.0),
                max: Some(3.0),
                equal: None,
            },
        );
        assert!(matches!(
            m.validate(),
            Err(ValidationError::MalformedConstraint { .. })
        ));

        let mut m = two_var_model();
        m.constrain("c1", ConstraintSpec::default());
        assert!(matches!(
            m.validate(),
            Err(ValidationError::MalformedConstraint { .. })
        ));
    }

    #[test]
    fn truthy_flags_accept_numbers_and_bools() {
        let json = r#"{
            "optimize": "obj",
            "opType": "max",
            "variables": {
                "obj": {"x": 1.0, "y": 2.0},
                "x": {"x": 1.0},
                "y": {"y": 1.0}
            },
            "constraints": {"x": {"max": 3}},
            "ints": {"x": 1, "y": 0},
            "binaries": {"y": true}
        }"#;
        let m: Model = serde_json::from_str(json).unwrap();
        assert_eq!(m.ints.get("x"), Some(&true));
        assert_eq!(m.ints.get("y"), Some(&false));
        assert_eq!(m.binaries.get("y"), Some(&true));
        assert!(m.has_integers());
    }

    #[test]
    fn internal_variables_are_deterministic() {
        let m = two_var_model();
        assert_eq!(m.internal_variables(), vec!["x", "y"]);
        assert!(m.is_internal("x"));
        assert!(!m.is_internal("c1"));
    }
}
