//! Resnet - Resistor Network Solver
//!
//! Computes node voltages and branch currents of a resistor network
//! described in a netlist file.
//!
//! # Usage
//!
//! ```bash
//! resnet solve circuit.net --check
//! resnet bench --size 500
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use rand::Rng;
use resnet_core::{
    circuit::Circuit,
    error::{ResnetError, Result},
    linalg::{BackendKind, DenseMatrix},
    netlist, report,
    solver::{compare_solutions, Method, NetworkSolver, RelaxationConfig, SolverConfig, Validator},
};

/// Resistor network solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a netlist and print voltages and currents
    Solve {
        /// Path to the netlist file
        #[arg(value_name = "NETLIST")]
        netlist: PathBuf,

        /// Solution method (direct, relaxation)
        #[arg(short, long, default_value = "direct")]
        method: Method,

        /// Linear algebra backend for the direct method (sequential, parallel, iterative)
        #[arg(short, long, default_value = "sequential")]
        backend: BackendKind,

        /// Relaxation passes
        #[arg(long, default_value_t = resnet_core::solver::DEFAULT_RELAXATION_ITERATIONS)]
        iterations: usize,

        /// Relaxation learning rate
        #[arg(long, default_value_t = resnet_core::solver::DEFAULT_LEARNING_RATE)]
        learning_rate: f64,

        /// Validate the result against KCL
        #[arg(long)]
        check: bool,

        /// Also solve directly and report the difference (relaxation only)
        #[arg(long)]
        compare: bool,
    },

    /// Time matrix inversion on every available backend
    Bench {
        /// Matrix dimension
        #[arg(short, long, default_value_t = 500)]
        size: usize,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match args.command {
        Command::Solve {
            netlist: path,
            method,
            backend,
            iterations,
            learning_rate,
            check,
            compare,
        } => {
            let ast = netlist::parse_file(&path)?;
            let (circuit, boundary) = Circuit::from_ast(ast)?;

            let config = SolverConfig::new()
                .with_method(method)
                .with_backend(backend)
                .with_relaxation(
                    RelaxationConfig::new()
                        .with_iterations(iterations)
                        .with_learning_rate(learning_rate),
                );
            let outcome = NetworkSolver::new(config).solve(&circuit, boundary)?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            report::write_solution(&mut out, &circuit, &outcome.solution)?;

            if let Some(relaxation) = &outcome.relaxation {
                report::write_relaxation(&mut out, relaxation)?;
            }

            if check {
                let validation = Validator::new().check(&outcome.solution, &boundary);
                report::write_validation(&mut out, &validation)?;
            }

            if compare && outcome.method == Method::Relaxation {
                let reference = NetworkSolver::new(SolverConfig::new().with_backend(backend))
                    .solve(&circuit, boundary)?;
                let cmp = compare_solutions(&reference.solution, &outcome.solution)?;
                report::write_comparison(&mut out, "relaxation vs direct", &cmp)?;
            }
        }

        Command::Bench { size } => bench(size)?,
    }

    Ok(())
}

/// Random diagonally dominant system, solved on each backend.
fn bench(size: usize) -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut matrix = DenseMatrix::zeros(size);
    for i in 0..size {
        let row: Vec<f64> = (0..size)
            .map(|j| if i == j { 0.0 } else { rng.gen_range(-1.0..1.0) })
            .collect();
        // Unit diagonal keeps the spectrum inside the iterative backend's convergence disc
        let scale = row.iter().map(|v| v.abs()).sum::<f64>() + 1.0;
        for (j, v) in row.into_iter().enumerate() {
            matrix.set(i, j, if i == j { 1.0 } else { v / scale });
        }
    }
    let rhs: Vec<f64> = (0..size).map(|_| rng.gen::<f64>()).collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let write_err = |e: io::Error| ResnetError::OutputError {
        message: e.to_string(),
    };

    let mut reference: Option<Vec<f64>> = None;
    for kind in BackendKind::ALL {
        let backend = match kind.create() {
            Ok(backend) => backend,
            Err(e) => {
                writeln!(out, "{:<12} skipped: {}", kind, e).map_err(write_err)?;
                continue;
            }
        };

        let start = Instant::now();
        let result = backend.solve(&matrix, &rhs);
        let elapsed = start.elapsed();

        match result {
            Ok(x) => {
                let deviation = reference.as_ref().map(|r| {
                    r.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum::<f64>() / size.max(1) as f64
                });
                writeln!(
                    out,
                    "{:<12} {:>10.3} ms  mean |dx| vs sequential: {}",
                    kind,
                    elapsed.as_secs_f64() * 1e3,
                    deviation.map_or_else(|| "-".to_string(), |d| format!("{:.3e}", d))
                )
                .map_err(write_err)?;
                if reference.is_none() {
                    reference = Some(x);
                }
            }
            Err(e) => {
                writeln!(out, "{:<12} failed after {:?}: {}", kind, elapsed, e).map_err(write_err)?;
            }
        }
    }

    Ok(())
}
