//! Compressed sparse row view of the aisle catalog, keyed by item.
//!
//! The aisle catalog is a list of item -> quantity maps. Transposing it into
//! an item-indexed CSR structure lets every repair step and both coverage
//! selectors answer "which aisles stock item i, and with how much" with a
//! single contiguous slice scan. Row entries are sorted by ascending
//! quantity so callers can walk them cheapest-first or richest-first by
//! direction alone.

use std::collections::{HashMap, HashSet};

/// Item-by-aisle sparse matrix in CSR form.
///
/// For item `i`, the aisles stocking it are `col[row_ptr[i]..row_ptr[i+1]]`
/// and their quantities sit at the same offsets of `qty`.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    pub row_ptr: Vec<usize>,
    pub col: Vec<usize>,
    pub qty: Vec<u32>,
}

impl CsrMatrix {
    /// Builds the transposed matrix from the aisle catalog. Each row is
    /// sorted ascending by quantity; the sort is stable, so quantity ties
    /// keep ascending aisle order.
    pub fn from_aisles(aisles: &[HashMap<usize, u32>], n_items: usize) -> Self {
        let mut rows: Vec<Vec<(u32, usize)>> = vec![Vec::new(); n_items];
        for (aisle, stocked) in aisles.iter().enumerate() {
            for (&item, &quantity) in stocked {
                rows[item].push((quantity, aisle));
            }
        }

        let mut row_ptr = Vec::with_capacity(n_items + 1);
        let mut col = Vec::new();
        let mut qty = Vec::new();
        row_ptr.push(0);

        for row in &mut rows {
            row.sort_by_key(|&(q, _)| q);
            for &(q, aisle) in row.iter() {
                qty.push(q);
                col.push(aisle);
            }
            row_ptr.push(col.len());
        }

        CsrMatrix { row_ptr, col, qty }
    }

    /// The (aisles, quantities) slices for one item row.
    pub fn row(&self, item: usize) -> (&[usize], &[u32]) {
        let start = self.row_ptr[item];
        let end = self.row_ptr[item + 1];
        (&self.col[start..end], &self.qty[start..end])
    }

    /// Walks the row of `item` (richest-first when `descending`), skipping
    /// aisles outside `eligible`, and accumulates aisles until their
    /// combined quantity reaches `demand`. Returns `None` when the eligible
    /// part of the row cannot cover the demand.
    pub fn cover_row(
        &self,
        item: usize,
        eligible: &HashSet<usize>,
        demand: u32,
        descending: bool,
    ) -> Option<Vec<usize>> {
        let start = self.row_ptr[item];
        let end = self.row_ptr[item + 1];
        let mut outstanding = demand as i64;
        let mut chosen = Vec::new();

        for offset in 0..end - start {
            let idx = if descending {
                end - 1 - offset
            } else {
                start + offset
            };
            let aisle = self.col[idx];
            if !eligible.contains(&aisle) {
                continue;
            }
            outstanding -= self.qty[idx] as i64;
            chosen.push(aisle);
            if outstanding <= 0 {
                return Some(chosen);
            }
        }

        None
    }
}
