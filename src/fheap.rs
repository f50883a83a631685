use std::{cmp::max, collections::HashMap, fmt, mem, sync::atomic::{AtomicU64, Ordering}};

use log::{debug, trace};

use crate::{error::HeapError, pool::{NodeIdx, Pool}};
#[cfg(any(test, feature = "check_invariants"))]
use crate::error::Corruption;

static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(0);

fn next_heap_id() -> u64 {
	NEXT_HEAP_ID.fetch_add(1, Ordering::Relaxed)
}

/// Upper bound on the degree of any node in a heap of `count` nodes.
/// A node of degree d roots at least F(d+2) >= phi^d nodes, so d <= log_phi(count).
/// This takes the bit length of count (an overestimate of its base 2 log)
/// and multiplies by the reciprocal of the base 2 log of the golden ratio.
fn max_degree(count: usize) -> usize {
	(((usize::BITS - count.leading_zeros()) as f64)*1.4404200904125567).ceil() as usize
}

/// Opaque reference to one element of a `FibHeap`, returned by `FibHeap::insert`.
///
/// A handle stays valid until its element is extracted or removed, or the heap is cleared.
/// It also survives `FibHeap::union`: the absorbing heap accepts handles issued by the absorbed one.
/// Using a stale handle, or one from an unrelated heap, gives `HeapError::InvalidHandle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
	heap: u64,
	index: usize,
	generation: u32
}

/// A Fibonacci heap: a min priority queue that supports
/// - Insert: O(1)
/// - Find min: O(1)
/// - Union: O(1) link work (the absorbed heap's node arena is moved, see `FibHeap::union`)
/// - Decrease key: O(1) amortized
/// - Extract min / remove: O(log(n)) amortized
/// - Find by key: O(n), there is no index
///
/// Elements are referenced by `Handle`s.  All nodes live in an arena owned by the heap,
/// and links between them are arena indices, so there is no unsafe code or reference counting.
#[derive(Debug)]
pub struct FibHeap<K> {
	pool: Pool<K>,
	min_root: Option<NodeIdx>,
	count: usize,
	max_seen: Option<K>,
	id: u64,
	/// ids of heaps merged into this one, with the offset their node indices were shifted by
	absorbed: HashMap<u64, usize>
}

/// Pre-order walk over every node, yielding each node with its depth (roots are depth 0).
/// Each stack frame is (node, head of the sibling cycle it belongs to, depth).
struct Walk<'a, K> {
	pool: &'a Pool<K>,
	stack: Vec<(NodeIdx, NodeIdx, usize)>
}

impl<'a, K> Walk<'a, K> {
	fn new(pool: &'a Pool<K>, start: Option<NodeIdx>) -> Self {
		Self{pool, stack: start.map(|s|(s, s, 0)).into_iter().collect()}
	}
}

impl<'a, K> Iterator for Walk<'a, K> {
	type Item = (NodeIdx, usize);
	fn next(&mut self) -> Option<Self::Item> {
		let (idx, head, depth) = self.stack.pop()?;
		let node = &self.pool[idx];
		if node.next != head {
			self.stack.push((node.next, head, depth));
		}
		if let Some(child) = node.child {
			self.stack.push((child, child, depth + 1));
		}
		Some((idx, depth))
	}
}

/// Iterator over the keys of a heap in structural (not sorted) order.
/// It borrows the heap, so the heap cannot change while it is alive.
pub struct Iter<'a, K> {
	walk: Walk<'a, K>,
	remaining: usize
}

impl<'a, K> Iterator for Iter<'a, K> {
	type Item = &'a K;
	fn next(&mut self) -> Option<Self::Item> {
		let (idx, _) = self.walk.next()?;
		self.remaining -= 1;
		let pool = self.walk.pool;
		Some(&pool[idx].key)
	}
	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<'a, K> ExactSizeIterator for Iter<'a, K> {}

impl<K> FibHeap<K> {
	/// Create an empty heap
	pub fn new() -> Self {
		Self::with_capacity(0)
	}

	/// Create an empty heap with room for `capacity` nodes before the arena reallocates
	pub fn with_capacity(capacity: usize) -> Self {
		Self{pool: Pool::with_capacity(capacity), min_root: None, count: 0, max_seen: None, id: next_heap_id(), absorbed: HashMap::new()}
	}

	/// Number of elements currently in the heap
	pub fn len(&self) -> usize {
		self.count
	}

	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	/// Get the minimum key without removing it
	pub fn minimum(&self) -> Result<&K, HeapError> {
		self.min_root.map(|m|&self.pool[m].key).ok_or(HeapError::EmptyHeap)
	}

	/// The largest key ever inserted since creation or the last `clear`.
	/// This is a running record, it does not go down when that key is extracted.
	pub fn max_seen(&self) -> Option<&K> {
		self.max_seen.as_ref()
	}

	/// Current key of the element `handle` refers to
	pub fn get(&self, handle: Handle) -> Result<&K, HeapError> {
		self.resolve(handle).map(|idx|&self.pool[idx].key)
	}

	/// Iterate over all keys in structural order
	pub fn iter(&self) -> Iter<'_, K> {
		Iter{walk: self.walk(), remaining: self.count}
	}

	/// Remove every element.  All outstanding handles become invalid.
	pub fn clear(&mut self) {
		self.pool.clear();
		self.min_root = None;
		self.count = 0;
		self.max_seen = None;
		self.absorbed.clear();
		self.id = next_heap_id();
	}

	fn walk(&self) -> Walk<'_, K> {
		Walk::new(&self.pool, self.min_root)
	}

	fn handle_for(&self, idx: NodeIdx) -> Handle {
		Handle{heap: self.id, index: idx.0, generation: self.pool.generation(idx)}
	}

	fn resolve(&self, handle: Handle) -> Result<NodeIdx, HeapError> {
		let offset = if handle.heap == self.id {
			Some(0)
		} else {
			self.absorbed.get(&handle.heap).copied()
		};
		match offset.map(|o|NodeIdx(handle.index + o)) {
			Some(idx) if self.pool.is_live(idx, handle.generation) => Ok(idx),
			_ => {
				debug!("rejected handle {:?} for heap {}", handle, self.id);
				Err(HeapError::InvalidHandle)
			}
		}
	}
}

impl<K: Ord + Clone> FibHeap<K> {
	/// Insert a key and get a handle to it.  Never restructures the heap.
	pub fn insert(&mut self, key: K) -> Handle {
		if self.max_seen.as_ref().map_or(true, |m|key > *m) {
			self.max_seen = Some(key.clone());
		}
		let idx = self.pool.alloc(key);
		self.min_root = self.pool.splice(self.min_root, Some(idx));
		self.count += 1;
		self.after_mutation();
		self.handle_for(idx)
	}
}

impl<K: Ord> FibHeap<K> {
	/// Move every element of `other` into this heap, leaving `other` empty.
	///
	/// The root lists are spliced in O(1) without any consolidation.  Since nodes live in
	/// per-heap arenas, the smaller arena is appended to the larger one, which costs
	/// time proportional to the smaller heap's arena.  Handles issued by either heap stay
	/// valid for `self`; handles `other` issues after this call are unrelated to them.
	pub fn union(&mut self, other: &mut FibHeap<K>) {
		let mut donor = mem::take(other);
		if donor.count == 0 {
			return
		}
		if self.pool.slot_count() < donor.pool.slot_count() {
			mem::swap(self, &mut donor);
		}
		let offset = self.pool.absorb(donor.pool);
		self.absorbed.insert(donor.id, offset);
		self.absorbed.extend(donor.absorbed.into_iter().map(|(id, o)|(id, o + offset)));
		let donor_min = donor.min_root.map(|m|NodeIdx(m.0 + offset));
		self.min_root = self.pool.splice(self.min_root, donor_min);
		self.count += donor.count;
		self.max_seen = match (self.max_seen.take(), donor.max_seen) {
			(Some(a), Some(b)) => Some(max(a, b)),
			(a, b) => a.or(b)
		};
		debug!("union into heap {}: {} elements, arena offset {}", self.id, self.count, offset);
		self.after_mutation();
	}

	/// Remove the minimum element and return its key.
	///
	/// The children of the minimum become roots, then roots of equal degree are linked
	/// until every root has a distinct degree, and the new minimum is found among them.
	pub fn extract_min(&mut self) -> Result<K, HeapError> {
		let min_root = self.min_root.ok_or(HeapError::EmptyHeap)?;
		let children = self.pool[min_root].child.take();
		self.pool[min_root].degree = 0;
		if let Some(first) = children {
			let mut c = first;
			loop {
				let node = &mut self.pool[c];
				node.parent = None;
				node.marked = false;
				c = node.next;
				if c == first { break }
			}
		}
		let rest = self.pool.unlink(min_root);
		self.min_root = match self.pool.splice(rest, children) {
			Some(start) => Some(self.consolidate(start)),
			None => None
		};
		self.count -= 1;
		let key = self.pool.release(min_root);
		self.after_mutation();
		Ok(key)
	}

	/// Decrease the key of the element `handle` refers to.
	///
	/// If `key` is not strictly less than the current key, nothing happens and `Ok(false)`
	/// is returned: increasing a key is silently ignored rather than reported as an error.
	pub fn decrease_key(&mut self, handle: Handle, key: K) -> Result<bool, HeapError> {
		let idx = self.resolve(handle)?;
		if key >= self.pool[idx].key {
			return Ok(false)
		}
		self.pool[idx].key = key;
		match self.pool[idx].parent {
			Some(parent) => if self.pool[idx].key < self.pool[parent].key {
				self.cascading_cut(idx)
			},
			None => if self.min_root.is_some_and(|m|self.pool[idx].key < self.pool[m].key) {
				self.min_root = Some(idx)
			}
		}
		self.after_mutation();
		Ok(true)
	}

	/// Remove an arbitrary element and return its key
	pub fn remove(&mut self, handle: Handle) -> Result<K, HeapError> {
		let idx = self.resolve(handle)?;
		if self.pool[idx].parent.is_some() {
			self.cascading_cut(idx);
		}
		// idx is now a root; extracting it as if it were the minimum rescans for the real one
		self.min_root = Some(idx);
		self.extract_min()
	}

	/// Find some element with key equal to `key` by exhaustive search
	pub fn find(&self, key: &K) -> Option<Handle> {
		self.walk().find(|&(idx, _)|self.pool[idx].key == *key).map(|(idx, _)|self.handle_for(idx))
	}

	pub fn contains(&self, key: &K) -> bool {
		self.find(key).is_some()
	}

	/// Drain the heap into a vector sorted in increasing order
	pub fn into_sorted_vec(mut self) -> Vec<K> {
		let mut res = Vec::with_capacity(self.count);
		while let Ok(key) = self.extract_min() {
			res.push(key);
		}
		res
	}

	/// Link the root list containing `start` into roots of distinct degree, and return the new minimum root
	fn consolidate(&mut self, start: NodeIdx) -> NodeIdx {
		let roots: Vec<NodeIdx> = self.pool.siblings(start).collect();
		let mut buckets: Vec<Option<NodeIdx>> = vec![None; max_degree(self.count) + 1];
		for mut root in roots.iter().copied() {
			self.pool.isolate(root);
			loop { // repeatedly try to insert the root into the buckets, merging it with the root with the same degree until it has unique degree
				let degree = self.pool[root].degree;
				match buckets[degree].take() {
					None => {
						buckets[degree] = Some(root);
						break
					},
					Some(other) => root = self.link(root, other)
				}
			}
		}
		let mut min_root = None;
		let mut survivors = 0;
		for root in buckets.into_iter().flatten() {
			// splice keeps the smaller head, so this also finds the minimum
			min_root = self.pool.splice(min_root, Some(root));
			survivors += 1;
		}
		trace!("consolidated {} roots into {}", roots.len(), survivors);
		match min_root {
			Some(m) => m,
			None => unreachable!("consolidated a non-empty root list into nothing")
		}
	}

	/// Make the larger of two isolated roots of equal degree a child of the other, breaking ties toward `node`
	fn link(&mut self, node: NodeIdx, other: NodeIdx) -> NodeIdx {
		let (parent, child) = if self.pool[node].key <= self.pool[other].key {
			(node, other)
		} else { (other, node) };
		let child_node = &mut self.pool[child];
		child_node.parent = Some(parent);
		child_node.marked = false;
		let first_child = self.pool[parent].child;
		let first_child = self.pool.splice(first_child, Some(child));
		let parent_node = &mut self.pool[parent];
		parent_node.child = first_child;
		parent_node.degree += 1;
		parent
	}

	/// Detach `idx` from its parent and make it a root.  Returns the former parent.
	fn cut(&mut self, idx: NodeIdx) -> Option<NodeIdx> {
		let parent = self.pool[idx].parent.take()?;
		let rest = self.pool.unlink(idx);
		let parent_node = &mut self.pool[parent];
		if parent_node.child == Some(idx) {
			parent_node.child = rest;
		}
		parent_node.degree -= 1;
		self.pool[idx].marked = false;
		self.min_root = self.pool.splice(self.min_root, Some(idx));
		Some(parent)
	}

	/// Cut `idx`, then keep cutting marked ancestors.
	/// The first unmarked ancestor gets marked, unless it is a root.
	fn cascading_cut(&mut self, idx: NodeIdx) {
		let mut parent = self.cut(idx);
		let mut depth = 1;
		while let Some(p) = parent {
			if !self.pool[p].marked {
				if self.pool[p].parent.is_some() {
					self.pool[p].marked = true;
				}
				break
			}
			parent = self.cut(p);
			depth += 1;
		}
		trace!("cascading cut removed {} nodes from their parents", depth);
	}

	fn after_mutation(&self) {
		debug_assert_eq!(self.count, self.pool.len());
		#[cfg(all(any(test, feature = "check_invariants"), not(feature = "stress_tests")))]{
			assert_eq!(self.check(), Ok(()));
		}
	}

	/// Verify every structural invariant: sibling cycles are consistent, parent links match,
	/// children are not less than their parents, degrees are exact, a subtree of degree d
	/// has at least F(d+2) nodes, roots are unmarked, the min root is minimal, and the count is right.
	#[cfg(any(test, feature = "check_invariants"))]
	pub(crate) fn check(&self) -> Result<(), Corruption> {
		use Corruption::*;
		if (self.count == 0) != self.min_root.is_none() || self.count != self.pool.len() {
			return Err(WrongCount)
		}
		let Some(min_root) = self.min_root else { return Ok(()) };
		// a broken cycle could loop forever, so never walk more nodes than exist
		let order: Vec<NodeIdx> = self.walk().map(|(idx, _)|idx).take(self.count + 1).collect();
		if order.len() != self.count {
			return Err(WrongCount)
		}
		let mut sizes = vec![0; self.pool.slot_count()];
		for &idx in order.iter().rev() {
			let node = &self.pool[idx];
			if self.pool[node.next].prev != idx {
				return Err(BrokenPrevLink(node.next))
			}
			let (mut degree, mut size) = (0, 1);
			for child in node.child.into_iter().flat_map(|c|self.pool.siblings(c)) {
				let child_node = &self.pool[child];
				if child_node.parent != Some(idx) {
					return Err(BrokenParentLink(child))
				} else if child_node.key < node.key {
					return Err(LessThanParent(child))
				}
				degree += 1;
				size += sizes[child.0];
			}
			if degree != node.degree {
				return Err(WrongDegree(idx))
			}
			let (mut fib_d1, mut fib_d2) = (1usize, 1usize);
			for _ in 0..degree {
				(fib_d1, fib_d2) = (fib_d2, fib_d1.saturating_add(fib_d2));
			}
			if size < fib_d2 {
				return Err(TooSmall(idx))
			}
			if node.parent.is_none() {
				if node.marked {
					return Err(MarkedRoot(idx))
				} else if node.key < self.pool[min_root].key {
					return Err(WrongMinimum(idx))
				}
			}
			sizes[idx.0] = size;
		}
		Ok(())
	}
}

impl<K> Default for FibHeap<K> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K: Ord + Clone> Extend<K> for FibHeap<K> {
	fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
		for key in iter {
			self.insert(key);
		}
	}
}

impl<K: Ord + Clone> FromIterator<K> for FibHeap<K> {
	fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
		let mut res = Self::new();
		res.extend(iter);
		res
	}
}

impl<'a, K> IntoIterator for &'a FibHeap<K> {
	type Item = &'a K;
	type IntoIter = Iter<'a, K>;
	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Dump of the tree structure, one node per line, indented by depth
impl<K: fmt::Display> fmt::Display for FibHeap<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Some(min_root) = self.min_root else {
			return writeln!(f, "empty heap")
		};
		writeln!(f, "heap of {} elements, minimum {}", self.count, self.pool[min_root].key)?;
		for (idx, depth) in self.walk() {
			let node = &self.pool[idx];
			writeln!(f, "{:indent$}{} (degree {}{})", "", node.key, node.degree,
				if node.marked { ", marked" } else { "" }, indent = 2*depth + 2)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

	use crate::error::HeapError;
	use super::{FibHeap, Handle};

	#[test]
	fn minimum_of_inserts() {
		let mut heap = FibHeap::new();
		for k in [5, 3, 8, 1] {
			heap.insert(k);
		}
		assert_eq!(heap.minimum(), Ok(&1));
		assert_eq!(heap.len(), 4);
	}

	#[test]
	fn extracts_in_order() {
		let mut heap: FibHeap<i32> = [5, 3, 8, 1].into_iter().collect();
		let mut res = Vec::new();
		for _ in 0..4 {
			res.push(heap.extract_min().unwrap());
		}
		assert_eq!(res, [1, 3, 5, 8]);
		assert!(heap.is_empty());
		assert_eq!(heap.extract_min(), Err(HeapError::EmptyHeap));
		assert_eq!(heap.minimum(), Err(HeapError::EmptyHeap));
	}

	#[test]
	fn decrease_to_new_minimum() {
		let mut heap = FibHeap::new();
		heap.insert(5);
		heap.insert(3);
		let eight = heap.insert(8);
		heap.insert(1);
		assert_eq!(heap.decrease_key(eight, 0), Ok(true));
		assert_eq!(heap.minimum(), Ok(&0));
		assert_eq!(heap.extract_min(), Ok(0));
		assert_eq!(heap.into_sorted_vec(), [1, 3, 5]);
	}

	#[test]
	fn increase_is_ignored() {
		let mut heap = FibHeap::new();
		let a = heap.insert(4);
		heap.insert(2);
		heap.insert(9);
		heap.extract_min().unwrap();
		let shape = heap.to_string();
		assert_eq!(heap.decrease_key(a, 4), Ok(false));
		assert_eq!(heap.decrease_key(a, 100), Ok(false));
		assert_eq!(heap.get(a), Ok(&4));
		assert_eq!(heap.len(), 2);
		assert_eq!(heap.minimum(), Ok(&4));
		assert_eq!(heap.to_string(), shape);
	}

	#[test]
	fn union_with_empty() {
		let mut heap: FibHeap<i32> = [7, 4, 9].into_iter().collect();
		let mut empty = FibHeap::new();
		heap.union(&mut empty);
		assert_eq!(heap.len(), 3);
		assert_eq!(heap.minimum(), Ok(&4));
		empty.union(&mut heap);
		assert_eq!(empty.len(), 3);
		assert!(heap.is_empty());
		assert_eq!(empty.minimum(), Ok(&4));
	}

	#[test]
	fn find_after_extract() {
		let mut heap = FibHeap::new();
		heap.insert(10);
		assert!(heap.contains(&10));
		assert_eq!(heap.extract_min(), Ok(10));
		assert!(!heap.contains(&10));
		assert_eq!(heap.find(&10), None);
	}

	#[test]
	fn find_returns_usable_handle() {
		let mut heap: FibHeap<i32> = (0..50).collect();
		heap.extract_min().unwrap();
		let h = heap.find(&37).unwrap();
		assert_eq!(heap.get(h), Ok(&37));
		heap.decrease_key(h, -1).unwrap();
		assert_eq!(heap.extract_min(), Ok(-1));
	}

	#[test]
	fn union_keeps_handles() {
		let mut small = FibHeap::new();
		let s = small.insert(40);
		let mut big = FibHeap::new();
		let b: Vec<Handle> = (0..10).map(|k|big.insert(k + 50)).collect();
		small.union(&mut big);
		assert!(big.is_empty());
		assert_eq!(small.len(), 11);
		assert_eq!(small.minimum(), Ok(&40));
		assert_eq!(small.max_seen(), Some(&59));
		small.decrease_key(b[9], 1).unwrap();
		assert_eq!(small.get(s), Ok(&40));
		assert_eq!(small.extract_min(), Ok(1));
		assert_eq!(small.remove(s), Ok(40));
		// the drained heap is usable and unrelated afterwards
		let fresh = big.insert(3);
		assert_eq!(small.get(fresh), Err(HeapError::InvalidHandle));
		assert_eq!(big.get(b[0]), Err(HeapError::InvalidHandle));
		let mut outer = FibHeap::new();
		outer.insert(0);
		outer.union(&mut small);
		assert_eq!(outer.get(b[0]), Ok(&50));
		assert_eq!(outer.into_sorted_vec(), [0, 50, 51, 52, 53, 54, 55, 56, 57, 58]);
	}

	#[test]
	fn stale_and_foreign_handles() {
		let mut heap = FibHeap::new();
		let a = heap.insert(1);
		let mut other = FibHeap::new();
		let o = other.insert(1);
		assert_eq!(heap.decrease_key(o, 0), Err(HeapError::InvalidHandle));
		assert_eq!(heap.remove(o), Err(HeapError::InvalidHandle));
		assert_eq!(heap.extract_min(), Ok(1));
		assert_eq!(heap.get(a), Err(HeapError::InvalidHandle));
		// the slot gets reused, but the old handle must not see the new element
		let b = heap.insert(2);
		assert_eq!(heap.decrease_key(a, 0), Err(HeapError::InvalidHandle));
		assert_eq!(heap.get(b), Ok(&2));
		heap.clear();
		assert_eq!(heap.get(b), Err(HeapError::InvalidHandle));
	}

	#[test]
	fn max_seen_is_a_record() {
		let mut heap = FibHeap::new();
		assert_eq!(heap.max_seen(), None);
		heap.extend([3, 12, 7]);
		assert_eq!(heap.max_seen(), Some(&12));
		while heap.extract_min().is_ok() {}
		assert_eq!(heap.max_seen(), Some(&12));
		heap.insert(1);
		heap.clear();
		assert!(heap.is_empty());
		assert_eq!(heap.max_seen(), None);
		assert_eq!(heap.minimum(), Err(HeapError::EmptyHeap));
	}

	#[test]
	fn cascading_cut_unmarks_and_detaches() {
		// 8 singletons consolidate into one binomial tree of degree 3 rooted at 2
		let mut heap: FibHeap<i32> = (1..=9).collect();
		assert_eq!(heap.extract_min(), Ok(1));
		let root = heap.min_root.unwrap();
		assert_eq!(heap.pool[root].degree, 3);
		let (x, _) = heap.walk().find(|&(_, depth)|depth == 3).unwrap();
		let y = heap.pool[x].parent.unwrap();
		let z = heap.pool[y].parent.unwrap();
		assert_eq!(heap.pool[z].parent, Some(root));
		assert_eq!(heap.pool[z].degree, 2);
		let w = heap.pool[y].next;
		assert_eq!(heap.pool[w].parent, Some(z));
		let (hx, hy, hz, hw) = (heap.handle_for(x), heap.handle_for(y), heap.handle_for(z), heap.handle_for(w));
		heap.decrease_key(hx, -1).unwrap();
		assert!(heap.pool[y].marked);
		assert_eq!(heap.pool[y].degree, 0);
		heap.decrease_key(hw, -2).unwrap();
		assert!(heap.pool[z].marked);
		assert_eq!(heap.pool[z].degree, 1);
		heap.decrease_key(hy, -3).unwrap();
		// z was marked, so losing y cuts it too; the root never gets marked
		assert_eq!(heap.pool[z].parent, None);
		assert!(!heap.pool[z].marked);
		assert!(!heap.pool[y].marked);
		assert!(!heap.pool[root].marked);
		assert_eq!(heap.pool[root].degree, 2);
		assert_eq!(heap.minimum(), Ok(&-3));
		let z_key = *heap.get(hz).unwrap();
		let rest = heap.into_sorted_vec();
		assert_eq!(rest.len(), 8);
		assert_eq!(&rest[..3], [-3, -2, -1]);
		assert!(rest.contains(&z_key));
	}

	#[test]
	fn remove_inner_node() {
		let mut heap = FibHeap::new();
		let handles: Vec<Handle> = (0..20).map(|k|heap.insert(k)).collect();
		heap.extract_min().unwrap();
		for &k in &[7, 13, 1, 19] {
			assert_eq!(heap.remove(handles[k]), Ok(k as i32));
		}
		assert_eq!(heap.len(), 15);
		assert_eq!(heap.remove(handles[7]), Err(HeapError::InvalidHandle));
		let expected: Vec<i32> = (2..20).filter(|k|![7, 13, 19].contains(k)).collect();
		assert_eq!(heap.into_sorted_vec(), expected);
	}

	#[test]
	fn iter_visits_everything() {
		let mut heap: FibHeap<u32> = (0..100).rev().collect();
		heap.extract_min().unwrap();
		let h = heap.find(&60).unwrap();
		heap.decrease_key(h, 0).unwrap();
		assert_eq!(heap.iter().len(), 99);
		let mut keys: Vec<u32> = heap.iter().copied().collect();
		keys.sort();
		let mut expected: Vec<u32> = (1..100).filter(|&k|k != 60).collect();
		expected.insert(0, 0);
		assert_eq!(keys, expected);
		assert_eq!((&heap).into_iter().count(), 99);
	}

	#[test]
	fn display_lists_nodes() {
		let mut heap = FibHeap::new();
		assert_eq!(heap.to_string(), "empty heap\n");
		heap.extend([2, 1, 3]);
		heap.extract_min().unwrap();
		let text = heap.to_string();
		assert!(text.starts_with("heap of 2 elements, minimum 2\n"));
		assert_eq!(text.lines().count(), 3);
		assert!(text.contains("  2 (degree 1)"));
		assert!(text.contains("    3 (degree 0)"));
	}

	#[test]
	fn random_ops_match_model() {
		let mut rng = StdRng::seed_from_u64(0xf1b);
		let mut heap = FibHeap::new();
		let mut model: Vec<(Handle, i64)> = Vec::new();
		for _ in 0..3000 {
			match rng.gen_range(0..10) {
				0..=3 => {
					let k = rng.gen_range(-1000..1000);
					model.push((heap.insert(k), k));
				},
				4..=5 if !model.is_empty() => {
					let i = rng.gen_range(0..model.len());
					let k = model[i].1 - rng.gen_range(0..500);
					assert_eq!(heap.decrease_key(model[i].0, k), Ok(k < model[i].1));
					model[i].1 = k;
				},
				6 if !model.is_empty() => {
					let (h, k) = model.swap_remove(rng.gen_range(0..model.len()));
					assert_eq!(heap.remove(h), Ok(k));
				},
				_ => {
					let min = model.iter().map(|&(_, k)|k).min();
					match min {
						None => assert_eq!(heap.extract_min(), Err(HeapError::EmptyHeap)),
						Some(m) => {
							assert_eq!(heap.extract_min(), Ok(m));
							let i = model.iter().position(|&(h, k)|k == m && heap.get(h).is_err()).unwrap();
							model.swap_remove(i);
						}
					}
				}
			}
			assert_eq!(heap.len(), model.len());
			assert_eq!(heap.minimum().ok(), model.iter().map(|(_, k)|k).min());
		}
	}

	#[test]
	fn shuffled_heapsort() {
		let mut rng = StdRng::seed_from_u64(7);
		let mut keys: Vec<u32> = (0..1000).map(|i|i/3).collect();
		keys.shuffle(&mut rng);
		let heap: FibHeap<u32> = keys.iter().copied().collect();
		keys.sort();
		assert_eq!(heap.into_sorted_vec(), keys);
	}

	#[test]
	fn prime_fheap() {
		// incremental sieve: each prime p waits in the heap keyed by its next multiple
		let mut prime_sum = 0;
		let mut my_heap: FibHeap<(u64, u64)> = FibHeap::new();
		let ub = 100;
		for n in 2..ub {
			while my_heap.minimum().is_ok_and(|&(multiple, _)|multiple < n) {
				let (multiple, prime) = my_heap.extract_min().unwrap();
				if multiple + prime < ub {
					my_heap.insert((multiple + prime, prime));
				}
			}
			if !my_heap.minimum().is_ok_and(|&(multiple, _)|multiple == n) {
				prime_sum += n;
				if n*n < ub {
					my_heap.insert((n*n, n));
				}
			}
		}
		eprintln!("Sum of primes < {} = {}", ub, prime_sum);
		assert_eq!(prime_sum, 1060);
	}

	#[cfg(feature = "stress_tests")]
	#[test]
	fn stress_decrease_and_extract() {
		let mut rng = StdRng::seed_from_u64(42);
		let mut heap = FibHeap::with_capacity(200_000);
		let mut handles: Vec<(Handle, u64)> = (0..200_000).map(|_|{
			let k = rng.gen_range(0..u64::MAX/2);
			(heap.insert(k), k)
		}).collect();
		let mut prev = heap.extract_min().unwrap();
		handles.retain(|&(h, _)|heap.get(h).is_ok());
		for round in 0..1000 {
			for _ in 0..50 {
				let (h, k) = &mut handles[rng.gen_range(0..handles.len())];
				if heap.get(*h).is_ok() {
					let nk = rng.gen_range(prev..=*k);
					heap.decrease_key(*h, nk).unwrap();
					*k = nk;
				}
			}
			let cur = heap.extract_min().unwrap();
			assert!(cur >= prev, "round {}", round);
			prev = cur;
		}
		assert_eq!(heap.check(), Ok(()));
	}
}
