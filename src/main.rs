//! Wave Picking Solver - Command Line Interface
//!
//! A hybrid metaheuristic solver for the SBPO-2025 wave order picking
//! problem.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use wave_picking_solver::benchmark::{Benchmark, BenchmarkConfig};
use wave_picking_solver::heuristics::constructive::{
    ConstructiveHeuristic, DecreasingEffort, DecreasingTotal,
};
use wave_picking_solver::heuristics::iwoa::{Iwoa, IwoaConfig, DEFAULT_POPULATION};
use wave_picking_solver::instance::{WaveInstance, MAX_RUNTIME_MS};
use wave_picking_solver::solution::Wave;

#[derive(Parser)]
#[command(name = "wave-picking-solver")]
#[command(version = "1.0")]
#[command(about = "A hybrid metaheuristic solver for wave order picking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance
    Solve {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "iwoa")]
        algorithm: Algorithm,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Population size for the whale optimizer
        #[arg(short, long, default_value_t = DEFAULT_POPULATION)]
        population: usize,

        /// Wall-clock budget in milliseconds
        #[arg(short, long, default_value_t = MAX_RUNTIME_MS)]
        time_limit_ms: u64,

        /// Write the wave in challenge output format
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the wave as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },

    /// Check a solution file against an instance
    Check {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Path to the solution file
        #[arg(short, long)]
        solution: PathBuf,
    },

    /// Compare algorithms on an instance
    Benchmark {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Number of runs for stochastic algorithms
        #[arg(short, long, default_value = "3")]
        runs: usize,

        /// Time limit per run in milliseconds
        #[arg(short, long, default_value = "10000")]
        time_limit_ms: u64,

        /// Output CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Improved Whale Optimization Algorithm
    Iwoa,
    /// Greedy builder ranking orders by unit total
    DecreasingTotal,
    /// Greedy builder ranking orders by units per required aisle
    DecreasingEffort,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            instance,
            algorithm,
            seed,
            population,
            time_limit_ms,
            output,
            json,
        } => solve(instance, algorithm, seed, population, time_limit_ms, output, json),
        Commands::Analyze { instance } => analyze(instance),
        Commands::Check { instance, solution } => check(instance, solution),
        Commands::Benchmark {
            instance,
            runs,
            time_limit_ms,
            output,
        } => benchmark(instance, runs, time_limit_ms, output),
    }
}

fn load_instance(path: &PathBuf) -> WaveInstance {
    match WaveInstance::from_file(path) {
        Ok(instance) => instance,
        Err(e) => {
            log::error!("Failed to load instance {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn solve(
    instance_path: PathBuf,
    algorithm: Algorithm,
    seed: u64,
    population: usize,
    time_limit_ms: u64,
    output: Option<PathBuf>,
    json: Option<PathBuf>,
) {
    let instance = load_instance(&instance_path);
    log::info!(
        "Solving {} ({} orders, {} items, {} aisles)",
        instance.name,
        instance.n_orders,
        instance.n_items,
        instance.n_aisles
    );

    let started = Instant::now();
    let wave = match algorithm {
        Algorithm::Iwoa => {
            let config = IwoaConfig {
                population_size: population,
                seed,
                time_limit_ms,
                ..IwoaConfig::default()
            };
            Iwoa::new(&instance, config).solve(started)
        }
        Algorithm::DecreasingTotal => DecreasingTotal.construct(&instance),
        Algorithm::DecreasingEffort => DecreasingEffort.construct(&instance),
    };
    let elapsed = started.elapsed().as_secs_f64();

    println!("{}", wave);
    println!("  Feasible: {}", wave.is_feasible(&instance));
    println!("  Time: {:.3}s", elapsed);

    if let Some(path) = output {
        if let Err(e) = wave.write_file(&path) {
            log::error!("Failed to write solution: {}", e);
            std::process::exit(1);
        }
        println!("Solution written to {}", path.display());
    }

    if let Some(path) = json {
        let serialized = serde_json::to_string_pretty(&wave).expect("wave serializes");
        if let Err(e) = std::fs::write(&path, serialized) {
            log::error!("Failed to write JSON: {}", e);
            std::process::exit(1);
        }
        println!("JSON written to {}", path.display());
    }
}

fn analyze(instance_path: PathBuf) {
    let instance = load_instance(&instance_path);
    println!("{}", instance.statistics());
}

fn check(instance_path: PathBuf, solution_path: PathBuf) {
    let instance = load_instance(&instance_path);
    let wave = match Wave::read_file(&solution_path, &instance) {
        Ok(wave) => wave,
        Err(e) => {
            log::error!("Failed to read solution {}: {}", solution_path.display(), e);
            std::process::exit(1);
        }
    };

    println!("{}", wave);
    if wave.is_feasible(&instance) {
        println!("  Feasible: true");
    } else {
        println!("  Feasible: false");
        std::process::exit(2);
    }
}

fn benchmark(
    instance_path: PathBuf,
    runs: usize,
    time_limit_ms: u64,
    output: Option<PathBuf>,
) {
    let instance = load_instance(&instance_path);
    let mut benchmark = Benchmark::new(BenchmarkConfig {
        runs,
        time_limit_ms,
        ..BenchmarkConfig::default()
    });

    benchmark.run_constructive(&instance);
    benchmark.run_iwoa(&instance);
    benchmark.print_summary();

    if let Some(path) = output {
        if let Err(e) = benchmark.export_to_csv(&path) {
            log::error!("Failed to export results: {}", e);
            std::process::exit(1);
        }
        println!("Results written to {}", path.display());
    }
}
