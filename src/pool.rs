use std::ops::{Index, IndexMut};

/// Stable index of a node inside a `Pool`.
/// Links between nodes are stored as indices, so splicing and cutting can never dangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(pub(crate) usize);

#[derive(Debug)]
pub(crate) struct Node<K> {
	pub(crate) key: K,
	pub(crate) prev: NodeIdx,
	pub(crate) next: NodeIdx,
	pub(crate) child: Option<NodeIdx>,
	pub(crate) parent: Option<NodeIdx>,
	pub(crate) degree: usize,
	pub(crate) marked: bool
}

#[derive(Debug)]
enum Entry<K> {
	Occupied(Node<K>),
	/// next free slot
	Vacant(Option<usize>)
}

#[derive(Debug)]
struct Slot<K> {
	generation: u32,
	entry: Entry<K>
}

/// Growable arena owning every node of one heap.
/// Freed slots are reused, and their generation is bumped so stale handles can be detected.
#[derive(Debug)]
pub(crate) struct Pool<K> {
	slots: Vec<Slot<K>>,
	free: Option<usize>,
	len: usize
}

pub(crate) struct Siblings<'a, K> {
	pool: &'a Pool<K>,
	start: Option<NodeIdx>,
	iter: NodeIdx
}

impl<'a, K> Iterator for Siblings<'a, K> {
	type Item = NodeIdx;
	fn next(&mut self) -> Option<Self::Item> {
		let start = self.start?;
		let res = self.iter;
		self.iter = self.pool[res].next;
		if self.iter == start { self.start = None }
		Some(res)
	}
}

impl<K> Pool<K> {
	pub(crate) fn with_capacity(capacity: usize) -> Self {
		Self{slots: Vec::with_capacity(capacity), free: None, len: 0}
	}

	/// Number of live nodes
	pub(crate) fn len(&self) -> usize {
		self.len
	}

	/// Number of slots, live or vacant.  Every `NodeIdx` handed out is below this.
	pub(crate) fn slot_count(&self) -> usize {
		self.slots.len()
	}

	pub(crate) fn generation(&self, idx: NodeIdx) -> u32 {
		self.slots[idx.0].generation
	}

	pub(crate) fn is_live(&self, idx: NodeIdx, generation: u32) -> bool {
		self.slots.get(idx.0).is_some_and(|s|s.generation == generation && matches!(s.entry, Entry::Occupied(_)))
	}

	/// Allocate a detached singleton: self-linked, no parent, no child, degree 0, unmarked
	pub(crate) fn alloc(&mut self, key: K) -> NodeIdx {
		let idx = match self.free {
			Some(i) => i,
			None => {
				self.slots.push(Slot{generation: 0, entry: Entry::Vacant(None)});
				self.slots.len() - 1
			}
		};
		let slot = &mut self.slots[idx];
		if let Entry::Vacant(next_free) = slot.entry {
			self.free = next_free;
		} else {
			panic!("free list points at live slot {}", idx)
		}
		let me = NodeIdx(idx);
		slot.entry = Entry::Occupied(Node{key, prev: me, next: me, child: None, parent: None, degree: 0, marked: false});
		self.len += 1;
		me
	}

	/// Drop a node from the arena and return its key.
	/// The caller must already have unlinked it from every list.
	pub(crate) fn release(&mut self, idx: NodeIdx) -> K {
		let slot = &mut self.slots[idx.0];
		match std::mem::replace(&mut slot.entry, Entry::Vacant(self.free)) {
			Entry::Occupied(node) => {
				slot.generation = slot.generation.wrapping_add(1);
				self.free = Some(idx.0);
				self.len -= 1;
				node.key
			},
			Entry::Vacant(_) => panic!("released vacant node slot {}", idx.0)
		}
	}

	/// Move every slot of `other` to the end of this pool, rewriting its links.
	/// Returns the offset that was added to each of `other`'s indices.
	pub(crate) fn absorb(&mut self, other: Pool<K>) -> usize {
		let offset = self.slots.len();
		let shift = |i: NodeIdx| NodeIdx(i.0 + offset);
		self.slots.reserve(other.slots.len());
		for (i, Slot{generation, entry}) in other.slots.into_iter().enumerate() {
			let entry = match entry {
				Entry::Occupied(mut node) => {
					node.prev = shift(node.prev);
					node.next = shift(node.next);
					node.child = node.child.map(shift);
					node.parent = node.parent.map(shift);
					Entry::Occupied(node)
				},
				Entry::Vacant(_) => {
					let next_free = self.free.replace(i + offset);
					Entry::Vacant(next_free)
				}
			};
			self.slots.push(Slot{generation, entry});
		}
		self.len += other.len;
		offset
	}

	pub(crate) fn clear(&mut self) {
		self.slots.clear();
		self.free = None;
		self.len = 0;
	}

	/// Iterate over the circular sibling list containing `start`, beginning at `start`
	pub(crate) fn siblings(&self, start: NodeIdx) -> Siblings<'_, K> {
		Siblings{pool: self, start: Some(start), iter: start}
	}

	/// Make `idx` a self-linked singleton without touching its old neighbours
	pub(crate) fn isolate(&mut self, idx: NodeIdx) {
		let node = &mut self[idx];
		node.prev = idx;
		node.next = idx;
	}

	/// Remove `idx` from its sibling cycle and leave it as a singleton.
	/// Returns a remaining member of the old cycle, or None if `idx` was alone.
	pub(crate) fn unlink(&mut self, idx: NodeIdx) -> Option<NodeIdx> {
		let Node{prev, next, ..} = self[idx];
		if next == idx {
			return None
		}
		self[prev].next = next;
		self[next].prev = prev;
		self.isolate(idx);
		Some(next)
	}
}

impl<K: Ord> Pool<K> {
	/// Union two circular sibling lists in O(1).
	/// Returns whichever head has the smaller key, ties going to `a`.
	pub(crate) fn splice(&mut self, a: Option<NodeIdx>, b: Option<NodeIdx>) -> Option<NodeIdx> {
		let (mut a, mut b) = match (a, b) {
			(None, b) => return b,
			(a, None) => return a,
			(Some(a), Some(b)) => (a, b)
		};
		if self[a].key > self[b].key {
			std::mem::swap(&mut a, &mut b);
		}
		let a_next = self[a].next;
		let b_prev = self[b].prev;
		self[a].next = b;
		self[b].prev = a;
		self[a_next].prev = b_prev;
		self[b_prev].next = a_next;
		Some(a)
	}
}

impl<K> Index<NodeIdx> for Pool<K> {
	type Output = Node<K>;
	fn index(&self, idx: NodeIdx) -> &Node<K> {
		match &self.slots[idx.0].entry {
			Entry::Occupied(node) => node,
			Entry::Vacant(_) => panic!("vacant node slot {}", idx.0)
		}
	}
}

impl<K> IndexMut<NodeIdx> for Pool<K> {
	fn index_mut(&mut self, idx: NodeIdx) -> &mut Node<K> {
		match &mut self.slots[idx.0].entry {
			Entry::Occupied(node) => node,
			Entry::Vacant(_) => panic!("vacant node slot {}", idx.0)
		}
	}
}
