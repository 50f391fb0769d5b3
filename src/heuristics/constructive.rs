//! Constructive heuristics: greedy order-first wave builders.
//!
//! Both heuristics rank the orders once, then commit greedily in a single
//! pass: an order is accepted when it fits under the upper bound and its
//! induced item deficit can be covered by extending the aisle set from the
//! remaining pool. Below the lower bound, orders are accepted on global
//! stock alone and aisle selection is deferred.

use std::cmp::Reverse;
use std::collections::HashSet;

use ordered_float::OrderedFloat;

use crate::heuristics::coverage::select_aisles_greedy;
use crate::instance::WaveInstance;
use crate::maps;
use crate::solution::Wave;

pub trait ConstructiveHeuristic {
    fn construct(&self, instance: &WaveInstance) -> Wave;
    fn name(&self) -> &str;
}

/// Ranks orders by total unit count, largest first.
pub struct DecreasingTotal;

/// Ranks orders by units per aisle the order alone would require, largest
/// first. Each order is pre-evaluated against a greedy coverage of its own
/// demand to estimate its aisle cost.
pub struct DecreasingEffort;

impl ConstructiveHeuristic for DecreasingTotal {
    fn construct(&self, instance: &WaveInstance) -> Wave {
        let mut indices: Vec<usize> = (0..instance.n_orders).collect();
        indices.sort_by_key(|&o| Reverse(instance.order_sums[o]));
        build_wave(instance, &indices)
    }

    fn name(&self) -> &str {
        "DecreasingTotal"
    }
}

impl ConstructiveHeuristic for DecreasingEffort {
    fn construct(&self, instance: &WaveInstance) -> Wave {
        let mut indices: Vec<usize> = (0..instance.n_orders).collect();
        indices.sort_by_key(|&o| {
            let aisle_cost = select_aisles_greedy(&instance.orders[o], instance).len();
            OrderedFloat(-(instance.order_sums[o] as f64 / aisle_cost as f64))
        });
        build_wave(instance, &indices)
    }

    fn name(&self) -> &str {
        "DecreasingEffort"
    }
}

/// Single-pass greedy acceptance over pre-ranked orders.
fn build_wave(instance: &WaveInstance, order_indices: &[usize]) -> Wave {
    // Aisles not yet committed to the wave; shrinks as commits extend it.
    let mut pool: HashSet<usize> = (0..instance.n_aisles).collect();
    let mut wave = Wave::empty();

    for &o in order_indices {
        if !instance.valid_orders[o] {
            continue;
        }

        let new_total = wave.total_units + instance.order_sums[o];
        if new_total > instance.wave_size_ub {
            continue;
        }

        let mut picked = wave.units_picked.clone();
        maps::merge_into(&mut picked, &instance.orders[o]);

        if new_total < instance.wave_size_lb {
            // Below the lower bound: accept on global stock alone and
            // leave the aisle set for a later in-range commit.
            if !maps::exceeds(&picked, &instance.stock) {
                wave.orders.insert(o);
                wave.units_picked = picked;
                wave.total_units = new_total;
            }
            continue;
        }

        let shortfall = maps::deficit(&picked, &wave.units_available);
        if shortfall.is_empty() {
            wave.orders.insert(o);
            wave.units_picked = picked;
            wave.total_units = new_total;
            continue;
        }

        // The order introduces unmet demand: cover every deficient item
        // from the pool, richest aisles first, or reject the order.
        let mut extension: HashSet<usize> = HashSet::new();
        let mut coverable = true;
        for (&item, &needed) in &shortfall {
            match instance.aisles_matrix.cover_row(item, &pool, needed, true) {
                Some(found) => extension.extend(found),
                None => {
                    coverable = false;
                    break;
                }
            }
        }
        if !coverable {
            continue;
        }

        for &a in &extension {
            wave.aisles.insert(a);
            maps::merge_into(&mut wave.units_available, &instance.aisles[a]);
            pool.remove(&a);
        }
        wave.orders.insert(o);
        wave.units_picked = picked;
        wave.total_units = new_total;
    }

    wave
}
