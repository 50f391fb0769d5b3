//! Feasibility repair for population members.
//!
//! The repair does not chase local optimality; it pushes an individual far
//! enough toward the feasible region that the penalized objective keeps a
//! usable gradient. Orders are pruned or added until the unit total fits
//! the wave bounds, and the aisle set is extended to cover the demand.

use fixedbitset::FixedBitSet;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::heuristics::coverage::select_aisles;
use crate::heuristics::individual::{compute_required, total_units, Individual};
use crate::instance::WaveInstance;
use crate::maps;

/// Repairs an individual in place.
///
/// 1. Binarize both position vectors.
/// 2. While the total exceeds UB, clear the lowest-indexed set order bit.
/// 3. While the total is below LB, set a uniformly random clear order bit;
///    stop when none remain.
/// 4. Seed one random aisle if the aisle set is empty.
/// 5. If demand exceeds availability on any item, union in a coverage
///    (greedy or weighted, by a fresh coin flip).
/// 6. Write the bits back as 0.0 / 1.0 coordinates.
pub fn repair(individual: &mut Individual, instance: &WaveInstance, rng: &mut ChaCha8Rng) {
    let (mut orders, mut aisles) = individual.binarize();
    let mut total = total_units(&orders, &instance.order_sums);

    while total > instance.wave_size_ub && orders.count_ones(..) > 0 {
        let lowest = orders.ones().next().unwrap();
        orders.set(lowest, false);
        total = total_units(&orders, &instance.order_sums);
    }

    while total < instance.wave_size_lb {
        match random_clear_index(&orders, instance.n_orders, rng) {
            Some(candidate) => {
                orders.insert(candidate);
                total = total_units(&orders, &instance.order_sums);
            }
            None => break,
        }
    }

    if aisles.count_ones(..) == 0 && instance.n_aisles > 0 {
        aisles.insert(rng.gen_range(0..instance.n_aisles));
    }

    let required = compute_required(&orders, &instance.orders);
    let available = compute_required(&aisles, &instance.aisles);
    if maps::exceeds(&required, &available) {
        let weighted = rng.gen::<bool>();
        for a in select_aisles(&required, instance, weighted, rng) {
            aisles.insert(a);
        }
    }

    for (i, x) in individual.orders.iter_mut().enumerate() {
        *x = if orders.contains(i) { 1.0 } else { 0.0 };
    }
    for (i, x) in individual.aisles.iter_mut().enumerate() {
        *x = if aisles.contains(i) { 1.0 } else { 0.0 };
    }
}

/// A uniformly random clear bit index, or `None` when every bit is set.
fn random_clear_index(bits: &FixedBitSet, len: usize, rng: &mut ChaCha8Rng) -> Option<usize> {
    let clear_count = len - bits.count_ones(..);
    if clear_count == 0 {
        return None;
    }
    let target = rng.gen_range(0..clear_count);
    (0..len).filter(|&i| !bits.contains(i)).nth(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn instance(lb: u32, ub: u32) -> WaveInstance {
        WaveInstance::new(
            "test",
            vec![
                HashMap::from([(0, 4)]),
                HashMap::from([(0, 3)]),
                HashMap::from([(1, 2)]),
            ],
            vec![
                HashMap::from([(0, 9)]),
                HashMap::from([(1, 6)]),
            ],
            2,
            lb,
            ub,
        )
    }

    fn binarized_total(individual: &Individual, instance: &WaveInstance) -> u32 {
        let (orders, _) = individual.binarize();
        total_units(&orders, &instance.order_sums)
    }

    #[test]
    fn test_prunes_lowest_indexed_orders_above_ub() {
        let instance = instance(1, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut individual = Individual::zeros(&instance);
        individual.orders = vec![1.0, 1.0, 1.0]; // 9 units, UB is 5

        repair(&mut individual, &instance, &mut rng);

        // Order 0 goes first; orders 1 and 2 (5 units) remain.
        assert_eq!(individual.orders, vec![0.0, 1.0, 1.0]);
        assert_eq!(binarized_total(&individual, &instance), 5);
    }

    #[test]
    fn test_fills_up_to_lb_from_clear_bits() {
        let instance = instance(9, 9);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut individual = Individual::zeros(&instance);

        repair(&mut individual, &instance, &mut rng);

        // Reaching LB = 9 requires every order.
        assert_eq!(individual.orders, vec![1.0, 1.0, 1.0]);
        assert_eq!(binarized_total(&individual, &instance), 9);
    }

    #[test]
    fn test_total_lands_in_bounds_or_orders_are_exhausted() {
        let instance = instance(2, 7);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut individual = Individual::random(&instance, &mut rng);
            repair(&mut individual, &instance, &mut rng);

            let (orders, _) = individual.binarize();
            let total = total_units(&orders, &instance.order_sums);
            let exhausted = orders.count_ones(..) == instance.n_orders;
            assert!(
                (total >= 2 && total <= 7) || exhausted,
                "seed {}: total {} with {} orders set",
                seed,
                total,
                orders.count_ones(..)
            );
        }
    }

    #[test]
    fn test_seeds_an_aisle_when_none_selected() {
        let instance = instance(0, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut individual = Individual::zeros(&instance);

        repair(&mut individual, &instance, &mut rng);

        let (_, aisles) = individual.binarize();
        assert!(aisles.count_ones(..) >= 1);
    }

    #[test]
    fn test_extends_aisles_to_cover_demand() {
        let instance = instance(2, 9);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut individual = Individual::random(&instance, &mut rng);
            repair(&mut individual, &instance, &mut rng);

            let (orders, aisles) = individual.binarize();
            let required = compute_required(&orders, &instance.orders);
            let available = compute_required(&aisles, &instance.aisles);
            assert!(
                !maps::exceeds(&required, &available),
                "seed {}: demand left uncovered",
                seed
            );
        }
    }

    #[test]
    fn test_positions_are_binary_after_repair() {
        let instance = instance(2, 9);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut individual = Individual::random(&instance, &mut rng);
        repair(&mut individual, &instance, &mut rng);

        assert!(individual
            .orders
            .iter()
            .chain(individual.aisles.iter())
            .all(|&x| x == 0.0 || x == 1.0));
    }

    #[test]
    fn test_random_clear_index_exhaustion() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut bits = FixedBitSet::with_capacity(3);
        bits.insert(0);
        bits.insert(1);
        bits.insert(2);
        assert_eq!(random_clear_index(&bits, 3, &mut rng), None);

        bits.set(1, false);
        assert_eq!(random_clear_index(&bits, 3, &mut rng), Some(1));
    }
}
