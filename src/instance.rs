//! Module for parsing and representing wave picking instances.
//!
//! This module handles the SBPO-2025 challenge text format and precomputes
//! the immutable view every heuristic works against: global stock, per-order
//! unit totals, per-order validity flags and the item-by-aisle CSR matrix.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::maps;
use crate::matrix::CsrMatrix;

/// Hard wall-clock budget for a solver run, in milliseconds.
pub const MAX_RUNTIME_MS: u64 = 600_000;

/// A complete wave picking instance together with its precomputed context.
///
/// Everything here is immutable after construction and freely shared by the
/// heuristics, the repair operator and the objective function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveInstance {
    /// Name of the instance (file stem, or caller-provided)
    pub name: String,
    /// Demanded quantity per item, per order
    pub orders: Vec<HashMap<usize, u32>>,
    /// Stocked quantity per item, per aisle
    pub aisles: Vec<HashMap<usize, u32>>,
    /// Number of distinct items
    pub n_items: usize,
    /// Number of orders
    pub n_orders: usize,
    /// Number of aisles
    pub n_aisles: usize,
    /// Inclusive lower bound on total units per wave
    pub wave_size_lb: u32,
    /// Inclusive upper bound on total units per wave
    pub wave_size_ub: u32,
    /// Global availability per item (elementwise sum of all aisles)
    pub stock: HashMap<usize, u32>,
    /// Total units demanded by each order
    pub order_sums: Vec<u32>,
    /// Whether each order can possibly be served (see [`WaveInstance::new`])
    pub valid_orders: Vec<bool>,
    /// Item-indexed CSR view of the aisle catalog
    #[serde(skip, default = "empty_matrix")]
    pub aisles_matrix: CsrMatrix,
}

fn empty_matrix() -> CsrMatrix {
    CsrMatrix {
        row_ptr: vec![0],
        col: Vec::new(),
        qty: Vec::new(),
    }
}

impl WaveInstance {
    /// Builds an instance and runs the one-shot precompute.
    ///
    /// An order is valid iff every item quantity it demands is available in
    /// global stock and no single item quantity exceeds the wave upper
    /// bound. The per-order checks are independent, so they run
    /// data-parallel across orders.
    pub fn new(
        name: &str,
        orders: Vec<HashMap<usize, u32>>,
        aisles: Vec<HashMap<usize, u32>>,
        n_items: usize,
        wave_size_lb: u32,
        wave_size_ub: u32,
    ) -> Self {
        let n_orders = orders.len();
        let n_aisles = aisles.len();
        let stock = maps::sum_all(&aisles);
        let aisles_matrix = CsrMatrix::from_aisles(&aisles, n_items);

        let processed: Vec<(bool, u32)> = orders
            .par_iter()
            .map(|order| {
                let mut valid = true;
                let mut sum = 0u32;
                for (&item, &quantity) in order {
                    let available = stock.get(&item).copied().unwrap_or(0);
                    if available < quantity || quantity > wave_size_ub {
                        valid = false;
                    }
                    sum += quantity;
                }
                (valid, sum)
            })
            .collect();

        let valid_orders = processed.iter().map(|&(v, _)| v).collect();
        let order_sums = processed.iter().map(|&(_, s)| s).collect();

        WaveInstance {
            name: name.to_string(),
            orders,
            aisles,
            n_items,
            n_orders,
            n_aisles,
            wave_size_lb,
            wave_size_ub,
            stock,
            order_sums,
            valid_orders,
            aisles_matrix,
        }
    }

    /// Parse an instance from a challenge-format file.
    ///
    /// Format: a header line `n_orders n_items n_aisles`, then one line per
    /// order and one line per aisle (`k item qty item qty ...` with `k`
    /// pairs), and a trailing `lb ub` line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let name = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "instance".to_string());
        let file = File::open(&path).map_err(|e| format!("Cannot open file: {}", e))?;
        Self::parse(BufReader::new(file), &name)
    }

    /// Parse an instance from any buffered reader.
    pub fn parse<R: BufRead>(reader: R, name: &str) -> Result<Self, String> {
        let mut lines = reader.lines();

        let header = next_line(&mut lines)?;
        let header: Vec<usize> = parse_numbers(&header, "header")?;
        if header.len() != 3 {
            return Err(format!(
                "Expected header `n_orders n_items n_aisles`, got {} fields",
                header.len()
            ));
        }
        let (n_orders, n_items, n_aisles) = (header[0], header[1], header[2]);

        let mut orders = Vec::with_capacity(n_orders);
        for o in 0..n_orders {
            let line = next_line(&mut lines)?;
            orders.push(parse_item_map(&line, n_items, &format!("order {}", o))?);
        }

        let mut aisles = Vec::with_capacity(n_aisles);
        for a in 0..n_aisles {
            let line = next_line(&mut lines)?;
            aisles.push(parse_item_map(&line, n_items, &format!("aisle {}", a))?);
        }

        let bounds = next_line(&mut lines)?;
        let bounds: Vec<u32> = parse_numbers(&bounds, "bounds")?;
        if bounds.len() != 2 {
            return Err("Expected trailing `lb ub` line".to_string());
        }
        if bounds[0] > bounds[1] {
            return Err(format!(
                "Lower bound {} exceeds upper bound {}",
                bounds[0], bounds[1]
            ));
        }

        Ok(Self::new(name, orders, aisles, n_items, bounds[0], bounds[1]))
    }

    /// Milliseconds left before the hard runtime wall.
    pub fn remaining_ms(&self, start: &Instant) -> u64 {
        MAX_RUNTIME_MS.saturating_sub(start.elapsed().as_millis() as u64)
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let total_demand: u64 = self.order_sums.iter().map(|&s| s as u64).sum();
        let total_stock: u64 = self.stock.values().map(|&q| q as u64).sum();
        let num_valid = self.valid_orders.iter().filter(|&&v| v).count();
        let avg_order_size = if self.n_orders > 0 {
            total_demand as f64 / self.n_orders as f64
        } else {
            0.0
        };

        InstanceStatistics {
            name: self.name.clone(),
            n_orders: self.n_orders,
            n_items: self.n_items,
            n_aisles: self.n_aisles,
            wave_size_lb: self.wave_size_lb,
            wave_size_ub: self.wave_size_ub,
            num_valid_orders: num_valid,
            total_demand,
            total_stock,
            avg_order_size,
        }
    }
}

fn next_line(lines: &mut std::io::Lines<impl BufRead>) -> Result<String, String> {
    loop {
        match lines.next() {
            Some(Ok(line)) => {
                if !line.trim().is_empty() {
                    return Ok(line);
                }
            }
            Some(Err(e)) => return Err(format!("Read error: {}", e)),
            None => return Err("Unexpected end of file".to_string()),
        }
    }
}

fn parse_numbers<T: std::str::FromStr>(line: &str, what: &str) -> Result<Vec<T>, String> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse()
                .map_err(|_| format!("Invalid number `{}` in {}", tok, what))
        })
        .collect()
}

fn parse_item_map(line: &str, n_items: usize, what: &str) -> Result<HashMap<usize, u32>, String> {
    let numbers: Vec<u64> = parse_numbers(line, what)?;
    if numbers.is_empty() {
        return Err(format!("Empty line for {}", what));
    }
    let k = numbers[0] as usize;
    if numbers.len() != 1 + 2 * k {
        return Err(format!(
            "{}: expected {} item/quantity pairs, got {} fields",
            what,
            k,
            (numbers.len() - 1) / 2
        ));
    }

    let mut map = HashMap::with_capacity(k);
    for pair in numbers[1..].chunks(2) {
        let item = pair[0] as usize;
        let quantity = pair[1] as u32;
        if item >= n_items {
            return Err(format!("{}: item index {} out of range", what, item));
        }
        if quantity == 0 {
            return Err(format!("{}: zero quantity for item {}", what, item));
        }
        map.insert(item, quantity);
    }
    Ok(map)
}

/// Statistics about a wave picking instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub n_orders: usize,
    pub n_items: usize,
    pub n_aisles: usize,
    pub wave_size_lb: u32,
    pub wave_size_ub: u32,
    pub num_valid_orders: usize,
    pub total_demand: u64,
    pub total_stock: u64,
    pub avg_order_size: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(
            f,
            "  Orders: {} ({} valid)",
            self.n_orders, self.num_valid_orders
        )?;
        writeln!(f, "  Items: {}", self.n_items)?;
        writeln!(f, "  Aisles: {}", self.n_aisles)?;
        writeln!(
            f,
            "  Wave size: [{}, {}]",
            self.wave_size_lb, self.wave_size_ub
        )?;
        writeln!(f, "  Total demand: {}", self.total_demand)?;
        writeln!(f, "  Total stock: {}", self.total_stock)?;
        writeln!(f, "  Avg order size: {:.2}", self.avg_order_size)
    }
}
