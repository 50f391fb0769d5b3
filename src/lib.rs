//! Wave Picking Solver Library
//!
//! A hybrid metaheuristic solver for the SBPO-2025 wave order picking
//! problem: select a subset of orders (the wave) and a subset of aisles so
//! that the total units picked lie within a size window, every item's
//! demand is covered by the visited aisles, and units picked per aisle
//! visited is maximized.
//!
//! # Features
//!
//! - Bitset-encoded whale optimization over continuous [0,1] positions
//! - Two greedy constructive heuristics (DecreasingTotal, DecreasingEffort)
//! - Feasibility repair shared by every population update
//! - Greedy and weighted-random aisle coverage selection
//! - Optional CBC-backed integer-programming seed (feature `milp`)
//! - Benchmarking tools with CSV export
//!
//! # Example
//!
//! ```no_run
//! use wave_picking_solver::instance::WaveInstance;
//! use wave_picking_solver::heuristics::iwoa::{Iwoa, IwoaConfig};
//! use std::time::Instant;
//!
//! // Load instance
//! let instance = WaveInstance::from_file("instance.txt").unwrap();
//!
//! // Run the whale optimizer against the wall clock
//! let mut solver = Iwoa::new(&instance, IwoaConfig::default());
//! let wave = solver.solve(Instant::now());
//!
//! println!("Objective: {:.2}", wave.objective());
//! ```

pub mod benchmark;
pub mod heuristics;
pub mod ilp;
pub mod instance;
pub mod maps;
pub mod matrix;
pub mod solution;

pub use instance::WaveInstance;
pub use solution::Wave;
