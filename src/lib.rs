//! A Fibonacci heap: a mergeable min priority queue with cheap decrease key,
//! meant as a building block for graph algorithms like Dijkstra's (see `dijkstra`).
//!
//! ```
//! use fibheap::FibHeap;
//!
//! let mut heap = FibHeap::new();
//! for k in [5, 3, 8, 1] {
//! 	heap.insert(k);
//! }
//! let eight = heap.find(&8).unwrap();
//! heap.decrease_key(eight, 0).unwrap();
//! assert_eq!(heap.extract_min(), Ok(0));
//! assert_eq!(heap.into_sorted_vec(), [1, 3, 5]);
//! ```

pub mod compare;
pub mod dijkstra;
mod error;
mod fheap;
mod pool;

pub use error::HeapError;
pub use fheap::{FibHeap, Handle, Iter};
