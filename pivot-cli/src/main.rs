//! Command-line front end for the pivot solver.

mod external;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pivot_core::{Model, SolveStatus};
use pivot_mip::SolveOptions;

#[derive(Parser)]
#[command(name = "pivot")]
#[command(about = "LP/MILP solver (simplex + branch-and-bound)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a model from an .lp or .json file
    Solve {
        /// Model file (.lp text or .json model object)
        file: PathBuf,
        /// Integer feasibility / output tolerance
        #[arg(long, default_value = "1e-9")]
        precision: f64,
        /// Wall-clock limit in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Include zero-valued variables in the output
        #[arg(long)]
        full: bool,
        /// Validate the model before solving
        #[arg(long)]
        validate: bool,
        /// Print the solution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse an .lp file and print its canonical form
    Reformat {
        /// LP text file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            precision,
            timeout,
            full,
            validate,
            json,
        } => solve_command(&file, precision, timeout, full, validate, json),
        Commands::Reformat { file } => reformat_command(&file),
    }
}

fn load_model(path: &Path) -> Result<Model> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&text).with_context(|| format!("parsing {} as JSON", path.display()))
    } else {
        pivot_lp::parse(&text)
            .with_context(|| format!("parsing {} as LP text", path.display()))
    }
}

fn solve_command(
    path: &Path,
    precision: f64,
    timeout: Option<u64>,
    full: bool,
    validate: bool,
    json: bool,
) -> Result<()> {
    let mut model = load_model(path)?;
    if let Some(ms) = timeout {
        model.options.timeout = Some(ms);
    }

    // A model carrying an external descriptor is staged and handed to
    // that binary instead of the in-process engine.
    if model.external.is_some() {
        let outcome = external::run(&model)?;
        println!("{}", outcome.raw.trim_end());
        return Ok(());
    }

    let opts = SolveOptions {
        precision,
        full,
        validate,
    };
    let solution = pivot_mip::solve_with(&model, &opts)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
        return Ok(());
    }

    match solution.status {
        SolveStatus::Infeasible => println!("infeasible"),
        SolveStatus::Unbounded => println!("unbounded"),
        status => {
            println!("status: {:?}", status);
            println!("objective: {}", solution.result);
            for (name, value) in &solution.variables {
                println!("{:<24} {}", name, value);
            }
            if let Some(integral) = solution.is_integral {
                println!("integral: {}", integral);
            }
        }
    }
    log::debug!(
        "{} pivots, {} nodes, {} ms",
        solution.stats.iterations,
        solution.stats.nodes_explored,
        solution.stats.solve_time_ms
    );
    Ok(())
}

fn reformat_command(path: &Path) -> Result<()> {
    let model = load_model(path)?;
    for line in pivot_lp::emit(&model) {
        println!("{}", line);
    }
    Ok(())
}
