//! Aisle coverage selection.
//!
//! Given the units required per item, pick a small set of aisles whose
//! combined stock covers the requirement. Two modes share one skeleton:
//! the greedy selector commits to the aisle with the largest marginal
//! contribution each round, the weighted selector draws an aisle with
//! probability proportional to its contribution. Both return the best
//! partial cover when full coverage is impossible.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::instance::WaveInstance;

/// Accumulates each eligible aisle's marginal contribution to the remaining
/// requirement: the sum over remaining items of `min(stocked, needed)`.
fn round_contributions(
    remaining: &HashMap<usize, u32>,
    instance: &WaveInstance,
    available: &[bool],
    contributions: &mut [u64],
) -> u64 {
    contributions.fill(0);
    let mut total = 0u64;
    for (&item, &needed) in remaining {
        let (cols, qtys) = instance.aisles_matrix.row(item);
        for (&aisle, &quantity) in cols.iter().zip(qtys) {
            if !available[aisle] {
                continue;
            }
            let contribution = quantity.min(needed) as u64;
            contributions[aisle] += contribution;
            total += contribution;
        }
    }
    total
}

/// Subtracts the chosen aisle's stock from the remaining requirement,
/// dropping items that become fully covered.
fn consume(remaining: &mut HashMap<usize, u32>, instance: &WaveInstance, aisle: usize) {
    for (&item, &quantity) in &instance.aisles[aisle] {
        if let Some(&needed) = remaining.get(&item) {
            if needed > quantity {
                remaining.insert(item, needed - quantity);
            } else {
                remaining.remove(&item);
            }
        }
    }
}

/// Greedy mode: each round picks the aisle with the maximum contribution
/// (lowest index wins ties).
pub fn select_aisles_greedy(
    required: &HashMap<usize, u32>,
    instance: &WaveInstance,
) -> HashSet<usize> {
    let mut selected = HashSet::new();
    let mut remaining = required.clone();
    let mut available = vec![true; instance.n_aisles];
    let mut contributions = vec![0u64; instance.n_aisles];

    while !remaining.is_empty() {
        let total = round_contributions(&remaining, instance, &available, &mut contributions);
        if total == 0 {
            break;
        }

        let mut best = 0;
        let mut best_contribution = 0u64;
        for (aisle, &contribution) in contributions.iter().enumerate() {
            if contribution > best_contribution {
                best_contribution = contribution;
                best = aisle;
            }
        }

        selected.insert(best);
        available[best] = false;
        consume(&mut remaining, instance, best);
    }

    selected
}

/// Weighted mode: each round draws an aisle with probability proportional
/// to its contribution, via a cumulative walk over `[1, total]`.
pub fn select_aisles_weighted(
    required: &HashMap<usize, u32>,
    instance: &WaveInstance,
    rng: &mut ChaCha8Rng,
) -> HashSet<usize> {
    let mut selected = HashSet::new();
    let mut remaining = required.clone();
    let mut available = vec![true; instance.n_aisles];
    let mut contributions = vec![0u64; instance.n_aisles];

    while !remaining.is_empty() {
        let total = round_contributions(&remaining, instance, &available, &mut contributions);
        if total == 0 {
            break;
        }

        let mut draw = rng.gen_range(1..=total) as i64;
        let mut chosen = None;
        for (aisle, &contribution) in contributions.iter().enumerate() {
            if contribution == 0 {
                continue;
            }
            draw -= contribution as i64;
            if draw <= 0 {
                chosen = Some(aisle);
                break;
            }
        }
        let Some(chosen) = chosen else { break };

        selected.insert(chosen);
        available[chosen] = false;
        consume(&mut remaining, instance, chosen);
    }

    selected
}

/// Dispatches on the mode flag; the weighted selector draws from `rng`.
pub fn select_aisles(
    required: &HashMap<usize, u32>,
    instance: &WaveInstance,
    weighted: bool,
    rng: &mut ChaCha8Rng,
) -> HashSet<usize> {
    if weighted {
        select_aisles_weighted(required, instance, rng)
    } else {
        select_aisles_greedy(required, instance)
    }
}
