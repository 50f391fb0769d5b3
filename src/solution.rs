//! Wave representation and feasibility checking.
//!
//! A wave is a chosen subset of orders plus a chosen subset of aisles,
//! together with the derived aggregates the challenge scores on: units
//! picked per item, units available per item and the total unit count.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::instance::WaveInstance;
use crate::maps;

/// A wave: selected orders, visited aisles and their derived aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    /// Indices of selected orders
    pub orders: HashSet<usize>,
    /// Indices of visited aisles
    pub aisles: HashSet<usize>,
    /// Units demanded per item across the selected orders
    pub units_picked: HashMap<usize, u32>,
    /// Units stocked per item across the visited aisles
    pub units_available: HashMap<usize, u32>,
    /// Total units across the selected orders
    pub total_units: u32,
}

impl Wave {
    /// The empty wave: nothing selected, nothing visited.
    pub fn empty() -> Self {
        Wave {
            orders: HashSet::new(),
            aisles: HashSet::new(),
            units_picked: HashMap::new(),
            units_available: HashMap::new(),
            total_units: 0,
        }
    }

    /// Builds a wave from order and aisle index sets, deriving the
    /// per-item aggregates and the unit total from the instance.
    pub fn from_sets(
        instance: &WaveInstance,
        orders: HashSet<usize>,
        aisles: HashSet<usize>,
    ) -> Self {
        let mut units_picked = HashMap::new();
        let mut total_units = 0u32;
        for &o in &orders {
            maps::merge_into(&mut units_picked, &instance.orders[o]);
            total_units += instance.order_sums[o];
        }

        let mut units_available = HashMap::new();
        for &a in &aisles {
            maps::merge_into(&mut units_available, &instance.aisles[a]);
        }

        Wave {
            orders,
            aisles,
            units_picked,
            units_available,
            total_units,
        }
    }

    /// Units picked per aisle visited; `0.0` when no aisle is visited.
    pub fn objective(&self) -> f64 {
        if self.aisles.is_empty() {
            return 0.0;
        }
        self.total_units as f64 / self.aisles.len() as f64
    }

    /// A wave is feasible iff both sets are non-empty, the unit total lies
    /// within the wave size bounds, and no item is picked beyond what the
    /// visited aisles stock.
    pub fn is_feasible(&self, instance: &WaveInstance) -> bool {
        if self.orders.is_empty() || self.aisles.is_empty() {
            return false;
        }
        if self.total_units < instance.wave_size_lb || self.total_units > instance.wave_size_ub {
            return false;
        }
        !maps::exceeds(&self.units_picked, &self.units_available)
    }

    /// Write the wave in the challenge output format: the order count, one
    /// order index per line, the aisle count, one aisle index per line.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut orders: Vec<usize> = self.orders.iter().copied().collect();
        orders.sort_unstable();
        let mut aisles: Vec<usize> = self.aisles.iter().copied().collect();
        aisles.sort_unstable();

        writeln!(writer, "{}", orders.len())?;
        for o in orders {
            writeln!(writer, "{}", o)?;
        }
        writeln!(writer, "{}", aisles.len())?;
        for a in aisles {
            writeln!(writer, "{}", a)?;
        }
        Ok(())
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let file = File::create(&path).map_err(|e| format!("Cannot create file: {}", e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .map_err(|e| format!("Write error: {}", e))
    }

    /// Read the order and aisle index sets of a challenge-format solution
    /// file and rebuild the wave's aggregates against `instance`.
    pub fn read_from<R: BufRead>(reader: R, instance: &WaveInstance) -> Result<Self, String> {
        let mut numbers = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|e| format!("Read error: {}", e))?;
            for tok in line.split_whitespace() {
                let n: usize = tok
                    .parse()
                    .map_err(|_| format!("Invalid index `{}` in solution", tok))?;
                numbers.push(n);
            }
        }

        let mut cursor = numbers.into_iter();
        let n_orders = cursor.next().ok_or("Empty solution file")?;
        let orders: HashSet<usize> = cursor.by_ref().take(n_orders).collect();
        if orders.len() != n_orders {
            return Err("Solution file ended before listing all orders".to_string());
        }
        let n_aisles = cursor.next().ok_or("Missing aisle count in solution")?;
        let aisles: HashSet<usize> = cursor.by_ref().take(n_aisles).collect();
        if aisles.len() != n_aisles {
            return Err("Solution file ended before listing all aisles".to_string());
        }

        if let Some(&o) = orders.iter().find(|&&o| o >= instance.n_orders) {
            return Err(format!("Order index {} out of range", o));
        }
        if let Some(&a) = aisles.iter().find(|&&a| a >= instance.n_aisles) {
            return Err(format!("Aisle index {} out of range", a));
        }

        Ok(Wave::from_sets(instance, orders, aisles))
    }

    pub fn read_file<P: AsRef<Path>>(path: P, instance: &WaveInstance) -> Result<Self, String> {
        let file = File::open(&path).map_err(|e| format!("Cannot open file: {}", e))?;
        Self::read_from(BufReader::new(file), instance)
    }
}

impl Default for Wave {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for Wave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Wave")?;
        writeln!(f, "  Orders: {}", self.orders.len())?;
        writeln!(f, "  Aisles: {}", self.aisles.len())?;
        writeln!(f, "  Total units: {}", self.total_units)?;
        writeln!(f, "  Objective: {:.4}", self.objective())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    fn two_order_instance() -> WaveInstance {
        WaveInstance::new(
            "test",
            vec![
                HashMap::from([(0, 3), (1, 2)]),
                HashMap::from([(1, 4)]),
            ],
            vec![
                HashMap::from([(0, 5), (1, 1)]),
                HashMap::from([(1, 8)]),
            ],
            2,
            1,
            10,
        )
    }

    #[test]
    fn test_from_sets_derives_aggregates() {
        let instance = two_order_instance();
        let wave = Wave::from_sets(
            &instance,
            HashSet::from([0, 1]),
            HashSet::from([0, 1]),
        );
        assert_eq!(wave.units_picked, HashMap::from([(0, 3), (1, 6)]));
        assert_eq!(wave.units_available, HashMap::from([(0, 5), (1, 9)]));
        assert_eq!(wave.total_units, 9);
    }

    #[test]
    fn test_objective_is_units_per_aisle() {
        let instance = WaveInstance::new(
            "test",
            vec![HashMap::from([(0, 5)])],
            vec![HashMap::from([(0, 10)])],
            1,
            1,
            10,
        );
        let wave = Wave::from_sets(&instance, HashSet::from([0]), HashSet::from([0]));
        assert_eq!(wave.total_units, 5);
        assert!((wave.objective() - 5.0).abs() < 1e-12);
        assert!(wave.is_feasible(&instance));
        assert_eq!(Wave::empty().objective(), 0.0);
    }

    #[test]
    fn test_feasibility_requires_non_empty_sets() {
        let instance = two_order_instance();
        assert!(!Wave::empty().is_feasible(&instance));
        let orders_only = Wave::from_sets(&instance, HashSet::from([0]), HashSet::new());
        assert!(!orders_only.is_feasible(&instance));
        let aisles_only = Wave::from_sets(&instance, HashSet::new(), HashSet::from([0]));
        assert!(!aisles_only.is_feasible(&instance));
    }

    #[test]
    fn test_feasibility_checks_bounds_and_coverage() {
        let instance = two_order_instance();
        // Order 1 alone needs 4 of item 1; aisle 0 stocks only 1 of it.
        let uncovered = Wave::from_sets(&instance, HashSet::from([1]), HashSet::from([0]));
        assert!(!uncovered.is_feasible(&instance));
        let covered = Wave::from_sets(&instance, HashSet::from([1]), HashSet::from([1]));
        assert!(covered.is_feasible(&instance));

        let tight = WaveInstance::new(
            "tight",
            vec![HashMap::from([(0, 2)])],
            vec![HashMap::from([(0, 9)])],
            1,
            5,
            9,
        );
        let below_lb = Wave::from_sets(&tight, HashSet::from([0]), HashSet::from([0]));
        assert!(!below_lb.is_feasible(&tight));
    }

    #[test]
    fn test_solution_io_round_trip() {
        let instance = two_order_instance();
        let wave = Wave::from_sets(&instance, HashSet::from([0, 1]), HashSet::from([1]));

        let mut buffer = Vec::new();
        wave.write_to(&mut buffer).unwrap();
        let parsed = Wave::read_from(Cursor::new(buffer), &instance).unwrap();
        assert_eq!(parsed, wave);
    }

    #[test]
    fn test_read_rejects_out_of_range_indices() {
        let instance = two_order_instance();
        assert!(Wave::read_from(Cursor::new("1\n9\n0\n"), &instance).is_err());
    }
}
