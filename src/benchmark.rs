//! Benchmarking and experimentation module.
//!
//! Provides tools for running the solver's algorithms over instances,
//! collecting per-run records and aggregated statistics, and exporting
//! results to CSV.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::heuristics::constructive::{ConstructiveHeuristic, DecreasingEffort, DecreasingTotal};
use crate::heuristics::iwoa::{Iwoa, IwoaConfig};
use crate::instance::WaveInstance;
use crate::solution::Wave;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Objective value (units per aisle)
    pub objective: f64,
    /// Total units picked
    pub total_units: u32,
    /// Number of aisles visited
    pub num_aisles: usize,
    /// Whether the wave is feasible
    pub feasible: bool,
    /// Computation time in seconds
    pub time: f64,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    pub num_runs: usize,
    pub num_feasible: usize,
    pub avg_objective: f64,
    pub best_objective: f64,
    pub worst_objective: f64,
    pub avg_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs per stochastic algorithm
    pub runs: usize,
    /// Time limit per run in milliseconds
    pub time_limit_ms: u64,
    /// Base random seed (run r uses seed + r)
    pub seed: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            runs: 3,
            time_limit_ms: 10_000,
            seed: 42,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }

    /// Runs both constructive heuristics once (they are deterministic).
    pub fn run_constructive(&mut self, instance: &WaveInstance) {
        log::info!("Running constructive heuristics on instance: {}", instance.name);

        let heuristics: Vec<Box<dyn ConstructiveHeuristic>> =
            vec![Box::new(DecreasingTotal), Box::new(DecreasingEffort)];

        for heuristic in heuristics {
            let started = Instant::now();
            let wave = heuristic.construct(instance);
            self.record(instance, heuristic.name(), &wave, started.elapsed().as_secs_f64());
        }
    }

    /// Runs the whale optimizer `config.runs` times with distinct seeds.
    pub fn run_iwoa(&mut self, instance: &WaveInstance) {
        log::info!(
            "Running IWOA ({} runs) on instance: {}",
            self.config.runs,
            instance.name
        );

        for run in 0..self.config.runs {
            let config = IwoaConfig {
                seed: self.config.seed + run as u64,
                time_limit_ms: self.config.time_limit_ms,
                ..IwoaConfig::default()
            };
            let started = Instant::now();
            let wave = Iwoa::new(instance, config).solve(started);
            self.record(instance, "IWOA", &wave, started.elapsed().as_secs_f64());
        }
    }

    fn record(&mut self, instance: &WaveInstance, algorithm: &str, wave: &Wave, time: f64) {
        self.results.push(AlgorithmResult {
            algorithm: algorithm.to_string(),
            instance: instance.name.clone(),
            objective: wave.objective(),
            total_units: wave.total_units,
            num_aisles: wave.aisles.len(),
            feasible: wave.is_feasible(instance),
            time,
        });
    }

    /// Aggregates the collected results per algorithm.
    pub fn statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut grouped: HashMap<String, Vec<&AlgorithmResult>> = HashMap::new();
        for result in &self.results {
            grouped
                .entry(result.algorithm.clone())
                .or_default()
                .push(result);
        }

        let mut statistics: Vec<AlgorithmStatistics> = grouped
            .into_iter()
            .map(|(algorithm, runs)| {
                let objectives: Vec<f64> = runs.iter().map(|r| r.objective).collect();
                let num_runs = runs.len();
                AlgorithmStatistics {
                    algorithm,
                    num_runs,
                    num_feasible: runs.iter().filter(|r| r.feasible).count(),
                    avg_objective: objectives.iter().sum::<f64>() / num_runs as f64,
                    best_objective: objectives.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                    worst_objective: objectives.iter().cloned().fold(f64::INFINITY, f64::min),
                    avg_time: runs.iter().map(|r| r.time).sum::<f64>() / num_runs as f64,
                }
            })
            .collect();

        statistics.sort_by(|a, b| a.algorithm.cmp(&b.algorithm));
        statistics
    }

    /// Export all raw results to a CSV file
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        for result in &self.results {
            writer.serialize(result)?;
        }
        writer.flush()
    }

    /// Print a summary table of the aggregated statistics
    pub fn print_summary(&self) {
        println!(
            "{:<18} {:>5} {:>9} {:>10} {:>10} {:>10} {:>9}",
            "Algorithm", "Runs", "Feasible", "Avg obj", "Best obj", "Worst obj", "Avg time"
        );
        for stats in self.statistics() {
            println!(
                "{:<18} {:>5} {:>9} {:>10.4} {:>10.4} {:>10.4} {:>8.3}s",
                stats.algorithm,
                stats.num_runs,
                stats.num_feasible,
                stats.avg_objective,
                stats.best_objective,
                stats.worst_objective,
                stats.avg_time
            );
        }
    }
}
