//! Model canonicalization: user model -> standard form -> tableau.
//!
//! The standard form keeps rows symbolically (terms + operator + rhs) so
//! the search layer can re-assemble a tableau with extra bound rows per
//! node without cloning matrices.

use std::collections::BTreeMap;

use crate::error::{CoreResult, ValidationError};
use crate::model::{Model, OpType};
use crate::tableau::{ColumnInfo, ColumnKind, Tableau};

/// How an internal variable maps onto standard-form columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    /// One non-negative column.
    Single(usize),
    /// Unrestricted split `x = pos - neg`.
    Split {
        /// Column of the positive part.
        pos: usize,
        /// Column of the negative part.
        neg: usize,
    },
    /// Substituted out at a fixed value.
    Fixed(f64),
}

impl Binding {
    /// Value of the variable under a standard-form assignment.
    pub fn value(&self, x: &[f64]) -> f64 {
        match *self {
            Binding::Single(col) => x[col],
            Binding::Split { pos, neg } => x[pos] - x[neg],
            Binding::Fixed(v) => v,
        }
    }

    /// Columns and coefficients expressing the variable.
    fn terms(&self) -> Vec<(usize, f64)> {
        match *self {
            Binding::Single(col) => vec![(col, 1.0)],
            Binding::Split { pos, neg } => vec![(pos, 1.0), (neg, -1.0)],
            Binding::Fixed(_) => Vec::new(),
        }
    }
}

/// An integer-constrained variable in branching order.
#[derive(Debug, Clone)]
pub struct IntegerVar {
    /// User-facing name.
    pub name: String,
    /// Column binding (never `Fixed`).
    pub binding: Binding,
    /// Default domain upper bound (1 for binaries, +inf otherwise).
    pub upper: f64,
}

/// Row operator before slack/surplus introduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOp {
    /// `terms <= rhs`
    Le,
    /// `terms >= rhs`
    Ge,
    /// `terms == rhs`
    Eq,
}

/// A symbolic constraint row.
#[derive(Debug, Clone)]
pub struct Row {
    /// `(column, coefficient)` pairs.
    pub terms: Vec<(usize, f64)>,
    /// Operator.
    pub op: RowOp,
    /// Right-hand side (may be negative; normalized at assembly).
    pub rhs: f64,
}

/// A per-node tightening of an integer variable's domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundOverride {
    /// Ordinal into [`StandardForm::integer_vars`].
    pub var: usize,
    /// Effective lower bound.
    pub lower: f64,
    /// Effective upper bound.
    pub upper: f64,
}

/// Canonicalized problem: minimization costs over non-negative columns,
/// symbolic rows, and the name->column binding map.
#[derive(Debug, Clone)]
pub struct StandardForm {
    /// Number of structural columns.
    pub n_structural: usize,
    /// Metadata for the structural columns.
    pub cols: Vec<ColumnInfo>,
    /// Constraint rows (includes binary `x <= 1` rows).
    pub rows: Vec<Row>,
    /// Minimization cost vector (already negated for `max` models).
    pub objective: Vec<f64>,
    /// Constant folded out of the objective by substitutions
    /// (minimization sign convention).
    pub obj_constant: f64,
    /// True when the user asked to maximize.
    pub maximize: bool,
    /// Internal variable name -> binding.
    pub bindings: BTreeMap<String, Binding>,
    /// Integer variables ordered by primary column index.
    pub integer_vars: Vec<IntegerVar>,
}

impl StandardForm {
    /// Canonicalize a model.
    pub fn build(model: &Model) -> CoreResult<Self> {
        let objective_combo = model
            .variables
            .get(&model.optimize)
            .ok_or_else(|| ValidationError::MissingObjective(model.optimize.clone()))?;

        let maximize = model.op_type == OpType::Max;
        let flagged = |map: &BTreeMap<String, bool>, name: &str| {
            map.get(name).copied().unwrap_or(false)
        };

        // Raw single-variable `equal` records substitute the variable out.
        // A key counts as raw when it has no combination, or when its
        // combination is the identity (the shape the LP parser declares for
        // named outputs).
        let raw_key = |key: &str| -> bool {
            match model.variables.get(key) {
                None => model.is_internal(key),
                Some(combo) => combo.len() == 1 && combo.get(key).copied() == Some(1.0),
            }
        };

        let mut fixed: BTreeMap<&str, f64> = BTreeMap::new();
        for (key, spec) in &model.constraints {
            if !raw_key(key) {
                continue;
            }
            let pinned = spec.equal.or(match (spec.min, spec.max) {
                (Some(lo), Some(hi)) if lo == hi => Some(lo),
                _ => None,
            });
            if let Some(v) = pinned {
                fixed.insert(key.as_str(), v);
            }
        }

        // Assign columns on first encounter, in definition order.
        let mut bindings: BTreeMap<String, Binding> = BTreeMap::new();
        let mut cols: Vec<ColumnInfo> = Vec::new();
        let mut integer_vars: Vec<IntegerVar> = Vec::new();

        for combo in model.variables.values() {
            for name in combo.keys() {
                if bindings.contains_key(name) {
                    continue;
                }
                let binding = if let Some(&v) = fixed.get(name.as_str()) {
                    Binding::Fixed(v)
                } else {
                    let is_binary = flagged(&model.binaries, name);
                    let is_integer = is_binary || flagged(&model.ints, name);
                    let upper = if is_binary { 1.0 } else { f64::INFINITY };
                    let info = ColumnInfo {
                        kind: ColumnKind::Structural,
                        integer: is_integer,
                        lower: 0.0,
                        upper,
                    };
                    let binding = if flagged(&model.unrestricted, name) {
                        let pos = cols.len();
                        cols.push(info);
                        cols.push(info);
                        Binding::Split { pos, neg: pos + 1 }
                    } else {
                        let col = cols.len();
                        cols.push(info);
                        Binding::Single(col)
                    };
                    if is_integer {
                        integer_vars.push(IntegerVar {
                            name: name.clone(),
                            binding,
                            upper,
                        });
                    }
                    binding
                };
                bindings.insert(name.clone(), binding);
            }
        }

        let n_structural = cols.len();
        let sign = if maximize { -1.0 } else { 1.0 };

        // Objective row.
        let mut objective = vec![0.0; n_structural];
        let mut obj_constant = 0.0;
        for (name, &coeff) in objective_combo {
            match bindings[name] {
                Binding::Fixed(v) => obj_constant += sign * coeff * v,
                binding => {
                    for (col, unit) in binding.terms() {
                        objective[col] += sign * coeff * unit;
                    }
                }
            }
        }

        // Constraint rows.
        let mut rows: Vec<Row> = Vec::new();
        for (key, spec) in &model.constraints {
            if fixed.contains_key(key.as_str()) {
                // This record defined the substitution; no row remains.
                continue;
            }
            let combo: Vec<(&str, f64)> = if let Some(combo) = model.variables.get(key) {
                combo.iter().map(|(n, &c)| (n.as_str(), c)).collect()
            } else if model.is_internal(key) {
                vec![(key.as_str(), 1.0)]
            } else {
                return Err(ValidationError::UnknownVariable(key.clone()).into());
            };

            let mut terms: Vec<(usize, f64)> = Vec::new();
            let mut shift = 0.0;
            for (name, coeff) in combo {
                match bindings[name] {
                    Binding::Fixed(v) => shift += coeff * v,
                    binding => {
                        for (col, unit) in binding.terms() {
                            terms.push((col, coeff * unit));
                        }
                    }
                }
            }

            if let Some(v) = spec.equal {
                rows.push(Row {
                    terms,
                    op: RowOp::Eq,
                    rhs: v - shift,
                });
                continue;
            }
            if let Some(v) = spec.min {
                rows.push(Row {
                    terms: terms.clone(),
                    op: RowOp::Ge,
                    rhs: v - shift,
                });
            }
            if let Some(v) = spec.max {
                rows.push(Row {
                    terms,
                    op: RowOp::Le,
                    rhs: v - shift,
                });
            }
        }

        // Binary domains: x <= 1 as an explicit row.
        for iv in &integer_vars {
            if iv.upper.is_finite() {
                rows.push(Row {
                    terms: iv.binding.terms(),
                    op: RowOp::Le,
                    rhs: iv.upper,
                });
            }
        }

        Ok(Self {
            n_structural,
            cols,
            rows,
            objective,
            obj_constant,
            maximize,
            bindings,
            integer_vars,
        })
    }

    /// Value of an internal variable under a standard-form assignment.
    pub fn internal_value(&self, name: &str, x: &[f64]) -> f64 {
        self.bindings
            .get(name)
            .map(|b| b.value(x))
            .unwrap_or(0.0)
    }

    /// Value of a solution-variable combination.
    pub fn combo_value(&self, combo: &BTreeMap<String, f64>, x: &[f64]) -> f64 {
        combo
            .iter()
            .map(|(name, &coeff)| coeff * self.internal_value(name, x))
            .sum()
    }

    /// Build the dense tableau for this form plus per-node bound rows.
    ///
    /// Post-conditions: every rhs is non-negative and every row has exactly
    /// one basic column (slack or artificial) forming a Phase-I-feasible
    /// start.
    pub fn assemble(&self, overrides: &[BoundOverride]) -> Tableau {
        let mut rows: Vec<Row> = self.rows.clone();
        for ov in overrides {
            let binding = self.integer_vars[ov.var].binding;
            if ov.lower > 0.0 {
                rows.push(Row {
                    terms: binding.terms(),
                    op: RowOp::Ge,
                    rhs: ov.lower,
                });
            }
            if ov.upper.is_finite() {
                rows.push(Row {
                    terms: binding.terms(),
                    op: RowOp::Le,
                    rhs: ov.upper,
                });
            }
        }

        // Sign normalization: rows with negative rhs flip, swapping the
        // slack/surplus role chosen below.
        for row in &mut rows {
            if row.rhs < 0.0 {
                row.rhs = -row.rhs;
                for term in &mut row.terms {
                    term.1 = -term.1;
                }
                row.op = match row.op {
                    RowOp::Le => RowOp::Ge,
                    RowOp::Ge => RowOp::Le,
                    RowOp::Eq => RowOp::Eq,
                };
            }
        }

        let n_aux = rows
            .iter()
            .filter(|r| matches!(r.op, RowOp::Le | RowOp::Ge))
            .count();
        let n_art = rows
            .iter()
            .filter(|r| matches!(r.op, RowOp::Ge | RowOp::Eq))
            .count();

        let art_start = self.n_structural + n_aux;
        let ncols = art_start + n_art;

        let mut all_cols = self.cols.clone();
        all_cols.resize(ncols, ColumnInfo::aux(ColumnKind::Slack));
        let mut tab = Tableau::new(rows.len(), ncols, art_start, all_cols);

        let mut next_aux = self.n_structural;
        let mut next_art = art_start;
        for (i, row) in rows.iter().enumerate() {
            for &(col, coeff) in &row.terms {
                tab.add(i, col, coeff);
            }
            tab.set_rhs(i, row.rhs);

            match row.op {
                RowOp::Le => {
                    tab.set(i, next_aux, 1.0);
                    tab.cols[next_aux] = ColumnInfo::aux(ColumnKind::Slack);
                    tab.basis[i] = next_aux;
                    next_aux += 1;
                }
                RowOp::Ge => {
                    tab.set(i, next_aux, -1.0);
                    tab.cols[next_aux] = ColumnInfo::aux(ColumnKind::Surplus);
                    next_aux += 1;
                    tab.set(i, next_art, 1.0);
                    tab.cols[next_art] = ColumnInfo::aux(ColumnKind::Artificial);
                    tab.basis[i] = next_art;
                    next_art += 1;
                }
                RowOp::Eq => {
                    tab.set(i, next_art, 1.0);
                    tab.cols[next_art] = ColumnInfo::aux(ColumnKind::Artificial);
                    tab.basis[i] = next_art;
                    next_art += 1;
                }
            }
        }
        debug_assert_eq!(next_aux, art_start);
        debug_assert_eq!(next_art, ncols);

        tab
    }

    /// Structural cost vector extended over all tableau columns.
    pub fn costs_for(&self, tab: &Tableau) -> Vec<f64> {
        let mut c = vec![0.0; tab.ncols()];
        c[..self.n_structural].copy_from_slice(&self.objective);
        c
    }
}
