//! External-solver hand-off.
//!
//! When a model carries an [`ExternalSolver`] descriptor, the CLI stages
//! the LP text to the descriptor's temp file, spawns the binary, and
//! parses its stdout (lp_solve's report format). This never touches the
//! in-process engine.

use std::collections::BTreeMap;
use std::process::Command;

use pivot_core::{ExternalSolver, Model};
use thiserror::Error;

/// Where the hand-off failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalStage {
    /// Descriptor validation or staging-file write.
    Write,
    /// Process spawn or non-zero exit.
    Spawn,
    /// Output parsing.
    Parse,
}

/// Failure talking to the external binary.
#[derive(Error, Debug)]
#[error("external solver failed during {stage:?}: {detail}")]
pub struct ExternalError {
    /// Failed stage.
    pub stage: ExternalStage,
    /// Human-readable detail.
    pub detail: String,
}

impl ExternalError {
    fn new(stage: ExternalStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

/// What the external binary reported.
#[derive(Debug, Clone)]
pub struct ExternalOutcome {
    /// Objective value parsed from the report.
    pub objective: f64,
    /// Variable values parsed from the report.
    pub variables: BTreeMap<String, f64>,
    /// Raw stdout, for display.
    pub raw: String,
}

/// Stage the model, spawn the solver, and parse its report.
///
/// Every missing descriptor field is fatal; the first violation wins.
pub fn run(model: &Model) -> Result<ExternalOutcome, ExternalError> {
    let descriptor = model
        .external
        .as_ref()
        .ok_or_else(|| ExternalError::new(ExternalStage::Write, "no external descriptor"))?;
    validate(descriptor)?;

    let text = pivot_lp::emit(model).join("\n");
    std::fs::write(&descriptor.temp_name, &text).map_err(|e| {
        ExternalError::new(
            ExternalStage::Write,
            format!("writing {}: {}", descriptor.temp_name, e),
        )
    })?;

    let output = Command::new(&descriptor.bin_path)
        .args(&descriptor.args)
        .arg(&descriptor.temp_name)
        .output()
        .map_err(|e| {
            ExternalError::new(
                ExternalStage::Spawn,
                format!("spawning {}: {}", descriptor.bin_path, e),
            )
        })?;
    if !output.status.success() {
        return Err(ExternalError::new(
            ExternalStage::Spawn,
            format!("{} exited with {}", descriptor.bin_path, output.status),
        ));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|_| ExternalError::new(ExternalStage::Parse, "stdout is not UTF-8"))?;
    parse_report(&stdout)
}

fn validate(descriptor: &ExternalSolver) -> Result<(), ExternalError> {
    if descriptor.bin_path.is_empty() {
        return Err(ExternalError::new(ExternalStage::Write, "binPath is empty"));
    }
    if descriptor.temp_name.is_empty() {
        return Err(ExternalError::new(ExternalStage::Write, "tempName is empty"));
    }
    Ok(())
}

/// Parse lp_solve's stdout: an objective line followed by a variable
/// table.
fn parse_report(stdout: &str) -> Result<ExternalOutcome, ExternalError> {
    const OBJECTIVE_TAG: &str = "Value of objective function:";

    let mut objective = None;
    let mut variables = BTreeMap::new();
    let mut in_table = false;

    for line in stdout.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(OBJECTIVE_TAG) {
            objective = Some(rest.trim().parse::<f64>().map_err(|_| {
                ExternalError::new(
                    ExternalStage::Parse,
                    format!("bad objective value '{}'", rest.trim()),
                )
            })?);
            continue;
        }
        if line.starts_with("Actual values of the variables") {
            in_table = true;
            continue;
        }
        if !in_table || line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let value = value.parse::<f64>().map_err(|_| {
            ExternalError::new(
                ExternalStage::Parse,
                format!("bad value '{}' for variable {}", value, name),
            )
        })?;
        variables.insert(name.to_string(), value);
    }

    let objective = objective.ok_or_else(|| {
        ExternalError::new(ExternalStage::Parse, "no objective line in solver output")
    })?;

    Ok(ExternalOutcome {
        objective,
        variables,
        raw: stdout.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bin_path_fails_before_any_side_effect() {
        let mut model = Model::default();
        model.external = Some(ExternalSolver {
            bin_path: String::new(),
            args: vec![],
            temp_name: "/tmp/model.lp".into(),
        });
        let err = run(&model).unwrap_err();
        assert_eq!(err.stage, ExternalStage::Write);
    }

    #[test]
    fn missing_temp_name_fails_first() {
        let mut model = Model::default();
        model.external = Some(ExternalSolver {
            bin_path: "/usr/bin/lp_solve".into(),
            args: vec![],
            temp_name: String::new(),
        });
        let err = run(&model).unwrap_err();
        assert_eq!(err.stage, ExternalStage::Write);
    }

    #[test]
    fn parses_objective_and_variable_table() {
        let report = "\n\
            Value of objective function: 6266.00000000\n\
            \n\
            Actual values of the variables:\n\
            x                              22\n\
            y                              52\n";
        let out = parse_report(report).unwrap();
        assert!((out.objective - 6266.0).abs() < 1e-9);
        assert_eq!(out.variables["x"], 22.0);
        assert_eq!(out.variables["y"], 52.0);
    }

    #[test]
    fn missing_objective_line_is_a_parse_error() {
        let err = parse_report("nothing to see here\n").unwrap_err();
        assert_eq!(err.stage, ExternalStage::Parse);
    }
}
