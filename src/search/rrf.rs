//! Reciprocal Rank Fusion.
//!
//! `spec.md` §4.C step 4, GLOSSARY: each id at 0-based rank `r` in a list
//! contributes `1 / (k + r + 1)`; contributions sum across lists, and the
//! result is sorted by total score descending. Ties resolve by
//! first-appearance order across the input lists (`spec.md` §5) — a stable
//! sort over a first-appearance-ordered id sequence gives exactly that.

use std::collections::{HashMap, HashSet};

/// Fuses ranked `lists` of ids with RRF constant `k`, returning
/// `(id, score)` pairs sorted by score descending.
#[must_use]
pub fn fuse(lists: &[Vec<String>], k: u32) -> Vec<(String, f32)> {
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut scores: HashMap<String, f32> = HashMap::new();

    for list in lists {
        for (rank, id) in list.iter().enumerate() {
            let contribution = 1.0 / (k as f32 + rank as f32 + 1.0);
            *scores.entry(id.clone()).or_insert(0.0) += contribution;
            if seen.insert(id.clone()) {
                order.push(id.clone());
            }
        }
    }

    order.sort_by(|a, b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
        .into_iter()
        .map(|id| {
            let score = scores[&id];
            (id, score)
        })
        .collect()
}

/// Fuses and returns only the top `n` ids, discarding scores.
#[must_use]
pub fn fuse_top_ids(lists: &[Vec<String>], k: u32, n: usize) -> Vec<String> {
    fuse(lists, k)
        .into_iter()
        .take(n)
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn scenario_2_worked_example() {
        let vec_ids = ids(&["A", "B", "C"]);
        let bm25_ids = ids(&["B", "D", "A"]);
        let fused = fuse_top_ids(&[vec_ids, bm25_ids], 60, 20);
        assert_eq!(fused, ids(&["B", "A", "D", "C"]));
    }

    #[test]
    fn order_agnostic_across_lists_not_within() {
        let a = fuse_top_ids(&[ids(&["X", "Y"]), ids(&["Y", "X"])], 60, 20);
        let b = fuse_top_ids(&[ids(&["Y", "X"]), ids(&["X", "Y"])], 60, 20);
        // Swapping which list is dense vs. lexical changes nothing because
        // both lists rank the same two ids the same way either direction.
        assert_eq!(a, b);
    }

    #[test]
    fn empty_lists_fuse_to_empty() {
        assert!(fuse_top_ids(&[], 60, 20).is_empty());
        assert!(fuse_top_ids(&[Vec::new(), Vec::new()], 60, 20).is_empty());
    }

    #[test]
    fn unranked_items_are_absent_not_infinite_rank() {
        // An id only in one list still contributes and can outrank an id
        // present in both lists at very low (late) rank in each.
        let only_in_one = fuse_top_ids(&[ids(&["A"]), Vec::new()], 60, 20);
        assert_eq!(only_in_one, ids(&["A"]));
    }
}
