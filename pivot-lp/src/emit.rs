//! Emitter: [`Model`] -> LP text lines.
//!
//! Inverse of the parser over the structured subset: parsing the emitted
//! lines reproduces an equivalent model up to row ordering, anonymous-row
//! and objective renaming, duplicate-term merging, and regeneration of
//! identity output entries.

use std::collections::BTreeMap;

use pivot_core::{ConstraintSpec, Model, OpType};

/// Render a model as LP statements, one per line.
pub fn emit(model: &Model) -> Vec<String> {
    let mut lines = Vec::new();

    let direction = match model.op_type {
        OpType::Max => "max",
        OpType::Min => "min",
    };
    let objective = model
        .variables
        .get(&model.optimize)
        .map(|combo| format_expr(combo))
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "0".to_string());
    lines.push(format!("{}: {};", direction, objective));

    for (name, spec) in &model.constraints {
        if is_raw_key(model, name) {
            lines.extend(bound_lines(name, spec));
        } else if let Some(combo) = model.variables.get(name) {
            lines.extend(row_lines(name, combo, spec));
        }
    }

    let ints: Vec<&str> = flagged(&model.ints)
        .into_iter()
        .filter(|name| !model.binaries.get(*name).copied().unwrap_or(false))
        .collect();
    if !ints.is_empty() {
        lines.push(format!("int {};", ints.join(", ")));
    }
    let bins = flagged(&model.binaries);
    if !bins.is_empty() {
        lines.push(format!("bin {};", bins.join(", ")));
    }
    let frees = flagged(&model.unrestricted);
    if !frees.is_empty() {
        lines.push(format!("free {};", frees.join(", ")));
    }

    lines
}

fn flagged(map: &BTreeMap<String, bool>) -> Vec<&str> {
    map.iter()
        .filter(|(_, &on)| on)
        .map(|(name, _)| name.as_str())
        .collect()
}

/// A key counts as raw when it has no combination or an identity one.
fn is_raw_key(model: &Model, key: &str) -> bool {
    match model.variables.get(key) {
        None => true,
        Some(combo) => combo.len() == 1 && combo.get(key).copied() == Some(1.0),
    }
}

fn bound_lines(name: &str, spec: &ConstraintSpec) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(v) = spec.equal {
        lines.push(format!("{} = {};", name, format_num(v)));
        return lines;
    }
    if let Some(v) = spec.min {
        lines.push(format!("{} >= {};", name, format_num(v)));
    }
    if let Some(v) = spec.max {
        lines.push(format!("{} <= {};", name, format_num(v)));
    }
    lines
}

fn row_lines(name: &str, combo: &BTreeMap<String, f64>, spec: &ConstraintSpec) -> Vec<String> {
    let expr = format_expr(combo);
    let mut lines = Vec::new();
    if let Some(v) = spec.equal {
        lines.push(format!("{}: {} = {};", name, expr, format_num(v)));
        return lines;
    }
    match (spec.min, spec.max) {
        (Some(lo), Some(hi)) => {
            lines.push(format!(
                "{}: {} <= {} <= {};",
                name,
                format_num(lo),
                expr,
                format_num(hi)
            ));
        }
        (Some(lo), None) => lines.push(format!("{}: {} >= {};", name, expr, format_num(lo))),
        (None, Some(hi)) => lines.push(format!("{}: {} <= {};", name, expr, format_num(hi))),
        (None, None) => {}
    }
    lines
}

fn format_expr(combo: &BTreeMap<String, f64>) -> String {
    let mut out = String::new();
    for (name, &coeff) in combo {
        if coeff == 0.0 {
            continue;
        }
        if out.is_empty() {
            if coeff < 0.0 {
                out.push('-');
            }
        } else if coeff < 0.0 {
            out.push_str(" - ");
        } else {
            out.push_str(" + ");
        }
        let mag = coeff.abs();
        if mag != 1.0 {
            out.push_str(&format_num(mag));
            out.push(' ');
        }
        out.push_str(name);
    }
    out
}

fn format_num(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use pivot_core::{ConstraintSpec, OpType};

    #[test]
    fn emits_objective_rows_bounds_and_declarations() {
        let mut m = Model::new("profit", OpType::Max);
        m.define("profit", [("table", 1200.0), ("chair", 1600.0)]);
        m.define("wood", [("table", 30.0), ("chair", 20.0)]);
        m.constrain("wood", ConstraintSpec::max(300.0));
        m.constrain("table", ConstraintSpec::min(2.0));
        m.flag_int("table");

        let lines = emit(&m);
        // Combination terms render in name order.
        assert_eq!(lines[0], "max: 1600 chair + 1200 table;");
        assert!(lines.contains(&"wood: 20 chair + 30 table <= 300;".to_string()));
        assert!(lines.contains(&"table >= 2;".to_string()));
        assert!(lines.contains(&"int table;".to_string()));
    }

    #[test]
    fn negative_and_unit_coefficients() {
        let mut m = Model::new("obj", OpType::Min);
        m.define("obj", [("x", -1.0), ("y", 1.0), ("z", -2.5)]);
        let lines = emit(&m);
        assert_eq!(lines[0], "min: -x + y - 2.5 z;");
    }

    #[test]
    fn identity_outputs_are_not_emitted() {
        let mut m = Model::new("obj", OpType::Min);
        m.define("obj", [("x", 1.0)]);
        m.define("x", [("x", 1.0)]);
        m.define("row", [("x", 2.0)]);
        m.constrain("row", ConstraintSpec::max(4.0));

        let lines = emit(&m);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "row: 2 x <= 4;");
    }

    #[test]
    fn round_trip_reproduces_the_model() {
        let text = "max: 3 a + 4 b + 5 c + 6 d;\n\
                    cap: 2 a + 3 b + 4 c + 5 d <= 5;\n\
                    a <= 1;\n\
                    span: 1 <= a + b + c <= 3;\n\
                    bin a, b, c, d;";
        let parsed = parse(text).unwrap();
        let emitted = emit(&parsed);
        let reparsed = parse(&emitted.join("\n")).unwrap();
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn round_trip_with_equality_and_free() {
        let text = "min: x + y;\n\
                    sum: x + y = 10;\n\
                    x >= 3;\n\
                    free y;";
        let parsed = parse(text).unwrap();
        let reparsed = parse(&emit(&parsed).join("\n")).unwrap();
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn emit_is_deterministic() {
        let text = "min: x + y; c: x + 2 y >= 4; x <= 9;";
        let parsed = parse(text).unwrap();
        assert_eq!(emit(&parsed), emit(&parsed));
    }
}
