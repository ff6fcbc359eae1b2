//! End-to-end mixed-integer scenarios through the public facade.

use pivot_core::{ConstraintSpec, Model, OpType, SolveStatus};
use pivot_mip::{solve, solve_with, SolveOptions};

fn knapsack() -> Model {
    // max 3a + 4b + 5c + 6d; 2a + 3b + 4c + 5d <= 5; all binary.
    let mut m = Model::new("obj", OpType::Max);
    m.define("obj", [("a", 3.0), ("b", 4.0), ("c", 5.0), ("d", 6.0)]);
    m.define("cap", [("a", 2.0), ("b", 3.0), ("c", 4.0), ("d", 5.0)]);
    for v in ["a", "b", "c", "d"] {
        m.define(v, [(v, 1.0)]);
        m.flag_binary(v);
    }
    m.constrain("cap", ConstraintSpec::max(5.0));
    m
}

#[test]
fn binary_knapsack() {
    let sol = solve(&knapsack()).unwrap();
    assert_eq!(sol.status, SolveStatus::Optimal);
    assert!(sol.feasible);
    assert_eq!(sol.is_integral, Some(true));
    assert!((sol.result - 7.0).abs() < 1e-6);
    assert!((sol.variables["a"] - 1.0).abs() < 1e-6);
    assert!((sol.variables["b"] - 1.0).abs() < 1e-6);
    assert!(!sol.variables.contains_key("c"));
    assert!(!sol.variables.contains_key("d"));
}

#[test]
fn full_output_reports_zero_binaries() {
    let opts = SolveOptions {
        full: true,
        ..Default::default()
    };
    let sol = solve_with(&knapsack(), &opts).unwrap();
    assert_eq!(sol.variables.get("c"), Some(&0.0));
    assert_eq!(sol.variables.get("d"), Some(&0.0));
}

#[test]
fn fractional_relaxation_gets_branched() {
    // max x; 2x <= 7; x integer  ->  x = 3, not 3.5.
    let mut m = Model::new("obj", OpType::Max);
    m.define("obj", [("x", 1.0)]);
    m.define("cap", [("x", 2.0)]);
    m.define("x", [("x", 1.0)]);
    m.constrain("cap", ConstraintSpec::max(7.0));
    m.flag_int("x");

    let sol = solve(&m).unwrap();
    assert_eq!(sol.status, SolveStatus::Optimal);
    assert!((sol.result - 3.0).abs() < 1e-6);
    assert!((sol.variables["x"] - 3.0).abs() < 1e-6);
    assert!(sol.stats.nodes_explored >= 2);
}

#[test]
fn integer_infeasibility_is_in_band() {
    // 0.2 <= x <= 0.8, x integer.
    let mut m = Model::new("obj", OpType::Min);
    m.define("obj", [("x", 1.0)]);
    m.define("lo", [("x", 1.0)]);
    m.define("hi", [("x", 1.0)]);
    m.constrain("lo", ConstraintSpec::min(0.2));
    m.constrain("hi", ConstraintSpec::max(0.8));
    m.flag_int("x");

    let sol = solve(&m).unwrap();
    assert_eq!(sol.status, SolveStatus::Infeasible);
    assert!(!sol.feasible);
}

#[test]
fn unbounded_integer_model_is_in_band() {
    let mut m = Model::new("obj", OpType::Max);
    m.define("obj", [("x", 1.0)]);
    m.define("row", [("x", 1.0), ("y", -1.0)]);
    m.constrain("row", ConstraintSpec::max(1.0));
    m.flag_int("x");

    let sol = solve(&m).unwrap();
    assert_eq!(sol.status, SolveStatus::Unbounded);
    assert!(!sol.bounded);
    assert!(sol.feasible);
}

#[test]
fn milp_solutions_are_deterministic() {
    let first = solve(&knapsack()).unwrap();
    for _ in 0..3 {
        let again = solve(&knapsack()).unwrap();
        assert_eq!(
            serde_json::to_string(&again).unwrap(),
            serde_json::to_string(&first).unwrap()
        );
    }
}

#[test]
fn sign_symmetry_holds_for_milp() {
    let max_side = solve(&knapsack()).unwrap();

    let mut negated = knapsack();
    negated.op_type = OpType::Min;
    negated.define(
        "obj",
        [("a", -3.0), ("b", -4.0), ("c", -5.0), ("d", -6.0)],
    );
    let min_side = solve(&negated).unwrap();

    assert!((max_side.result - (-min_side.result)).abs() < 1e-9);
    assert_eq!(max_side.variables, min_side.variables);
}

#[test]
fn tightening_never_improves_the_optimum() {
    let base = solve(&knapsack()).unwrap();

    let mut tightened = knapsack();
    tightened.define("extra", [("a", 1.0), ("b", 1.0)]);
    tightened.constrain("extra", ConstraintSpec::max(1.0));
    let tight = solve(&tightened).unwrap();

    assert!(tight.result <= base.result + 1e-9);
}

#[test]
fn timeout_of_zero_returns_in_band() {
    let mut m = knapsack();
    m.options.timeout = Some(0);

    let sol = solve(&m).unwrap();
    assert_eq!(sol.status, SolveStatus::TimedOut);
    assert!(!sol.feasible);
}

#[test]
fn mir_cuts_knob_is_accepted_and_ignored() {
    let mut m = knapsack();
    m.options.use_mir_cuts = Some(true);

    let sol = solve(&m).unwrap();
    assert_eq!(sol.status, SolveStatus::Optimal);
    assert!((sol.result - 7.0).abs() < 1e-6);
}

#[test]
fn lp_text_solves_end_to_end() {
    let model = pivot_lp::parse(
        "max: 3a + 4b + 5c + 6d;\n\
         cap: 2a + 3b + 4c + 5d <= 5; // knapsack capacity\n\
         bin a, b, c, d;",
    )
    .unwrap();

    let sol = solve(&model).unwrap();
    assert_eq!(sol.status, SolveStatus::Optimal);
    assert!((sol.result - 7.0).abs() < 1e-6);
    assert!((sol.variables["a"] - 1.0).abs() < 1e-6);
    assert!((sol.variables["b"] - 1.0).abs() < 1e-6);
}

#[test]
fn lp_round_trip_solves_identically() {
    let text = "max: 143 x + 60 y;\n\
                land: x + y <= 75;\n\
                budget: 110 x + 30 y <= 4000;\n\
                int x, y;";
    let model = pivot_lp::parse(text).unwrap();
    let reparsed = pivot_lp::parse(&pivot_lp::emit(&model).join("\n")).unwrap();
    assert_eq!(model, reparsed);

    let a = solve(&model).unwrap();
    let b = solve(&reparsed).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
