//! Whole-heap comparisons.
//!
//! Two heaps holding the same keys can have completely different tree shapes, so comparing
//! them structurally is meaningless.  These helpers compare the sorted sequences of keys instead,
//! which is exactly what repeatedly extracting the minimum from each would produce.

use std::cmp::Ordering;

use crate::FibHeap;

fn sorted_keys<K: Ord>(heap: &FibHeap<K>) -> Vec<&K> {
	let mut keys: Vec<&K> = heap.iter().collect();
	keys.sort_unstable();
	keys
}

/// Lexicographically compare the extraction orders of two heaps, without modifying them
pub fn cmp_by_extraction<K: Ord>(a: &FibHeap<K>, b: &FibHeap<K>) -> Ordering {
	sorted_keys(a).cmp(&sorted_keys(b))
}

/// True if both heaps hold the same multiset of keys
pub fn eq_by_extraction<K: Ord>(a: &FibHeap<K>, b: &FibHeap<K>) -> bool {
	a.len() == b.len() && cmp_by_extraction(a, b).is_eq()
}
