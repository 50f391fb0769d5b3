//! Arithmetic over item -> quantity maps.
//!
//! Orders, aisles, stock levels and deficits are all sparse maps from item
//! index to a unit count; this module collects the handful of merge/subtract
//! operations the heuristics and the feasibility check share.

use std::collections::HashMap;

/// Adds every entry of `src` into `target`, summing values on common keys.
pub fn merge_into(target: &mut HashMap<usize, u32>, src: &HashMap<usize, u32>) {
    for (&item, &qty) in src {
        *target.entry(item).or_insert(0) += qty;
    }
}

/// Non-destructive merge of two maps, summing values on common keys.
pub fn merged(a: &HashMap<usize, u32>, b: &HashMap<usize, u32>) -> HashMap<usize, u32> {
    let mut out = a.clone();
    merge_into(&mut out, b);
    out
}

/// Sums a whole catalog of maps into one (e.g. global stock across aisles).
pub fn sum_all(maps: &[HashMap<usize, u32>]) -> HashMap<usize, u32> {
    let mut out = HashMap::new();
    for map in maps {
        merge_into(&mut out, map);
    }
    out
}

/// Per-item shortfall of `have` against `need`: entries where
/// `need[item] > have[item]`, valued at the difference. Items fully covered
/// are absent from the result.
pub fn deficit(need: &HashMap<usize, u32>, have: &HashMap<usize, u32>) -> HashMap<usize, u32> {
    let mut out = HashMap::new();
    for (&item, &needed) in need {
        let covered = have.get(&item).copied().unwrap_or(0);
        if needed > covered {
            out.insert(item, needed - covered);
        }
    }
    out
}

/// True iff `a` exceeds `b` on at least one key (missing keys in `b` count
/// as zero). This is an exists-greater predicate, not a dominance check:
/// `a` may be smaller than `b` on every other key and still exceed it.
pub fn exceeds(a: &HashMap<usize, u32>, b: &HashMap<usize, u32>) -> bool {
    for (&item, &qty) in a {
        if b.get(&item).copied().unwrap_or(0) < qty {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_into_sums_common_keys() {
        let mut target = HashMap::from([(0, 2), (1, 3)]);
        let src = HashMap::from([(1, 4), (2, 5)]);
        merge_into(&mut target, &src);
        assert_eq!(target, HashMap::from([(0, 2), (1, 7), (2, 5)]));
    }

    #[test]
    fn test_sum_all() {
        let maps = vec![HashMap::from([(0, 1)]), HashMap::from([(0, 2), (3, 9)])];
        assert_eq!(sum_all(&maps), HashMap::from([(0, 3), (3, 9)]));
    }

    #[test]
    fn test_deficit_drops_covered_items() {
        let need = HashMap::from([(0, 5), (1, 2), (2, 4)]);
        let have = HashMap::from([(0, 5), (1, 1)]);
        assert_eq!(deficit(&need, &have), HashMap::from([(1, 1), (2, 4)]));
    }

    #[test]
    fn test_deficit_empty_when_fully_covered() {
        let need = HashMap::from([(0, 5)]);
        let have = HashMap::from([(0, 8)]);
        assert!(deficit(&need, &have).is_empty());
    }

    #[test]
    fn test_exceeds_is_exists_greater() {
        let a = HashMap::from([(0, 1), (1, 10)]);
        let b = HashMap::from([(0, 100), (1, 9)]);
        // a is far below b on item 0 but above it on item 1.
        assert!(exceeds(&a, &b));
        assert!(!exceeds(&b, &HashMap::from([(0, 100), (1, 10)])));
    }

    #[test]
    fn test_exceeds_missing_key_counts_as_zero() {
        let a = HashMap::from([(7, 1)]);
        assert!(exceeds(&a, &HashMap::new()));
        assert!(!exceeds(&HashMap::new(), &a));
    }
}
