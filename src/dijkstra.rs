//! Single source shortest paths, the classic use of a heap with cheap decrease key.

use log::debug;
use num_traits::{CheckedAdd, Zero};

use crate::{FibHeap, Handle};

/// Distances and shortest path tree from one source vertex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths<W> {
	pub source: usize,
	/// `dist[v]` is None if v is unreachable
	pub dist: Vec<Option<W>>,
	/// `pred[v]` is the vertex before v on a shortest path, None for the source and unreachable vertices
	pub pred: Vec<Option<usize>>
}

impl<W> ShortestPaths<W> {
	/// Vertices on a shortest path from the source to `target`, both included
	pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
		self.dist.get(target)?.as_ref()?;
		let mut path = vec![target];
		let mut v = target;
		while let Some(u) = self.pred[v] {
			path.push(u);
			v = u;
		}
		path.reverse();
		Some(path)
	}
}

/// Dijkstra's algorithm over an adjacency list, where `adjacency[u]` holds `(v, weight)` edges.
/// Weights must be non-negative.  A path whose length would overflow `W` is treated as unusable.
/// Panics if an edge points past the end of `adjacency`.
pub fn shortest_paths<W>(adjacency: &[Vec<(usize, W)>], source: usize) -> ShortestPaths<W>
where W: Zero + CheckedAdd + Ord + Copy {
	let n = adjacency.len();
	let mut res = ShortestPaths{source, dist: vec![None; n], pred: vec![None; n]};
	if source >= n {
		debug!("source {} is not one of the {} vertices", source, n);
		return res
	}
	let mut handles: Vec<Option<Handle>> = vec![None; n];
	let mut done = vec![false; n];
	let mut heap = FibHeap::with_capacity(n);
	res.dist[source] = Some(W::zero());
	handles[source] = Some(heap.insert((W::zero(), source)));
	while let Ok((d, u)) = heap.extract_min() {
		done[u] = true;
		handles[u] = None;
		for &(v, w) in &adjacency[u] {
			if done[v] {
				continue
			}
			let Some(nd) = d.checked_add(&w) else { continue };
			match handles[v] {
				Some(h) => if heap.decrease_key(h, (nd, v)) == Ok(true) {
					res.dist[v] = Some(nd);
					res.pred[v] = Some(u);
				},
				None => {
					res.dist[v] = Some(nd);
					res.pred[v] = Some(u);
					handles[v] = Some(heap.insert((nd, v)));
				}
			}
		}
	}
	res
}
