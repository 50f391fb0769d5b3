//! Population members of the whale optimizer and the penalized objective.
//!
//! An individual carries two continuous position vectors in [0, 1], one per
//! order and one per aisle. Thresholding at 0.5 yields the binary wave the
//! objective scores. The penalized objective is the single fitness function
//! of the whole solver.

use std::collections::HashMap;

use fixedbitset::FixedBitSet;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::instance::WaveInstance;
use crate::maps;
use crate::solution::Wave;

/// Coordinates at or above this value binarize to a set bit.
pub const BINARIZE_THRESHOLD: f64 = 0.5;

/// Penalty weight applied to every infeasibility term of the objective.
pub const PENALTY_LAMBDA: f64 = 1.0;

/// A population member: continuous order and aisle position vectors.
#[derive(Debug, Clone)]
pub struct Individual {
    pub orders: Vec<f64>,
    pub aisles: Vec<f64>,
}

impl Individual {
    /// All-zero positions (the empty wave).
    pub fn zeros(instance: &WaveInstance) -> Self {
        Individual {
            orders: vec![0.0; instance.n_orders],
            aisles: vec![0.0; instance.n_aisles],
        }
    }

    /// Every coordinate drawn uniformly from [0, 1).
    pub fn random(instance: &WaveInstance, rng: &mut ChaCha8Rng) -> Self {
        Individual {
            orders: (0..instance.n_orders).map(|_| rng.gen::<f64>()).collect(),
            aisles: (0..instance.n_aisles).map(|_| rng.gen::<f64>()).collect(),
        }
    }

    /// Positions set to 1.0 at the wave's selected indices, 0.0 elsewhere.
    pub fn from_wave(instance: &WaveInstance, wave: &Wave) -> Self {
        let mut individual = Self::zeros(instance);
        for &o in &wave.orders {
            individual.orders[o] = 1.0;
        }
        for &a in &wave.aisles {
            individual.aisles[a] = 1.0;
        }
        individual
    }

    /// Clamps every coordinate into [0, 1].
    pub fn clip(&mut self) {
        for x in self.orders.iter_mut().chain(self.aisles.iter_mut()) {
            *x = x.clamp(0.0, 1.0);
        }
    }

    /// Thresholds both vectors into packed bitsets.
    pub fn binarize(&self) -> (FixedBitSet, FixedBitSet) {
        (threshold_bits(&self.orders), threshold_bits(&self.aisles))
    }

    /// Scores the binarized wave with the penalized objective.
    pub fn evaluate(&self, instance: &WaveInstance) -> f64 {
        let (orders, aisles) = self.binarize();
        objective_function(&orders, &aisles, instance)
    }

    /// Converts the binarized positions into a full wave record.
    pub fn to_wave(&self, instance: &WaveInstance) -> Wave {
        let (orders, aisles) = self.binarize();
        Wave::from_sets(instance, orders.ones().collect(), aisles.ones().collect())
    }
}

/// Packs a continuous vector into a bitset at the 0.5 threshold.
pub fn threshold_bits(values: &[f64]) -> FixedBitSet {
    let mut bits = FixedBitSet::with_capacity(values.len());
    for (i, &x) in values.iter().enumerate() {
        bits.set(i, x >= BINARIZE_THRESHOLD);
    }
    bits
}

/// Sums the item maps selected by the set bits.
pub fn compute_required(bits: &FixedBitSet, catalog: &[HashMap<usize, u32>]) -> HashMap<usize, u32> {
    let mut required = HashMap::new();
    for index in bits.ones() {
        maps::merge_into(&mut required, &catalog[index]);
    }
    required
}

/// Total units across the orders selected by the set bits.
pub fn total_units(bits: &FixedBitSet, order_sums: &[u32]) -> u32 {
    bits.ones().map(|o| order_sums[o]).sum()
}

/// The penalized objective.
///
/// Base value is units picked per aisle visited. Penalties (weight
/// [`PENALTY_LAMBDA`]) are added for a unit total outside [LB, UB]
/// (distance to the bounds' midpoint), for an empty aisle set, and for any
/// item demanded beyond what the selected aisles stock.
pub fn objective_function(
    orders: &FixedBitSet,
    aisles: &FixedBitSet,
    instance: &WaveInstance,
) -> f64 {
    let total = total_units(orders, &instance.order_sums);
    let n_visited = aisles.count_ones(..);

    let base = if n_visited > 0 {
        total as f64 / n_visited as f64
    } else {
        0.0
    };

    let mut penalty = 0.0;
    if total > instance.wave_size_ub || total < instance.wave_size_lb {
        let midpoint = (instance.wave_size_ub + instance.wave_size_lb) as f64 / 2.0;
        penalty += PENALTY_LAMBDA * (total as f64 - midpoint).abs();
    }

    if n_visited == 0 {
        penalty += PENALTY_LAMBDA * total as f64;
    }

    let required = compute_required(orders, &instance.orders);
    let available = compute_required(aisles, &instance.aisles);
    if maps::exceeds(&required, &available) {
        penalty += PENALTY_LAMBDA * total as f64;
    }

    if penalty == 0.0 {
        base
    } else {
        base - penalty
    }
}
