//! Gradspice - gradient-relaxation circuit solver
//!
//! Loads a netlist, relaxes the circuit over the configured instants and
//! prints the probe voltages.
//!
//! # Usage
//!
//! ```bash
//! gradspice rc.net --instants 200 --history -vv
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gradspice::{
    circuit::Circuit,
    dsl,
    error::{GradspiceError, Result},
    solver::{ProbeLog, SimulationConfig, Simulator},
};
use tracing::Level;

/// Gradient-relaxation circuit solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "NETLIST")]
    netlist: PathBuf,

    /// Simulated time between instants, in seconds
    #[arg(short = 't', long)]
    time_step: Option<f64>,

    /// Fraction of each residual corrected per iteration
    #[arg(short = 'r', long)]
    learning_rate: Option<f64>,

    /// Number of instants to simulate
    #[arg(short = 'n', long)]
    instants: Option<usize>,

    /// Iteration budget per instant
    #[arg(short = 'i', long)]
    max_iterations: Option<usize>,

    /// Error below which an instant counts as settled
    #[arg(short = 'e', long)]
    tolerance: Option<f64>,

    /// Print probe voltages for every instant instead of only the last
    #[arg(long)]
    history: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self, ast: &dsl::CircuitAst) -> SimulationConfig {
        let mut config = SimulationConfig::new().with_settings(&ast.settings);
        if let Some(v) = self.time_step {
            config.time_step = v;
        }
        if let Some(v) = self.learning_rate {
            config.learning_rate = v;
        }
        if let Some(v) = self.instants {
            config.instants = v;
        }
        if let Some(v) = self.max_iterations {
            config.max_iterations = v;
        }
        if let Some(v) = self.tolerance {
            config.tolerance = v;
        }
        config
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let ast = dsl::parse_file(&args.netlist)?;
    let mut circuit = Circuit::from_ast(&ast)?;
    let simulator = Simulator::new(args.config(&ast))?;

    let mut log = ProbeLog::new();
    let report = simulator.run_with(&mut circuit, &mut log)?;

    if args.history {
        print!("{}", log.render());
    } else {
        print!("{}", log.render_last());
    }

    if let Some(last) = report.last() {
        println!(
            "# {} instants, {} unsettled, {} iterations, final error {:.3e}",
            report.instants.len(),
            report.unconverged(),
            report.total_iterations(),
            last.error
        );
    }

    if let Some(instant) = report.divergence() {
        return Err(GradspiceError::Diverged {
            instant: instant.index,
            time: instant.time,
            error: instant.error,
        });
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
