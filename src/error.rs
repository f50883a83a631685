use crate::pool::NodeIdx;

/// Errors returned by fallible heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeapError {
	/// The heap has no elements
	#[error("heap is empty")]
	EmptyHeap,
	/// The handle was issued by another heap, or its node has already been removed
	#[error("handle does not refer to a live node of this heap")]
	InvalidHandle
}

/// A broken structural invariant, found by `FibHeap::check`.
/// Any of these means a bug in the heap itself, never a caller error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(any(test, feature = "check_invariants")), allow(dead_code))]
pub(crate) enum Corruption {
	BrokenPrevLink(NodeIdx),
	BrokenParentLink(NodeIdx),
	LessThanParent(NodeIdx),
	WrongDegree(NodeIdx),
	TooSmall(NodeIdx),
	MarkedRoot(NodeIdx),
	WrongMinimum(NodeIdx),
	WrongCount
}
