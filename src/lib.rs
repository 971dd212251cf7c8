//! A max heap stored as an explicit complete binary tree instead of an implicit array.
//! Every node is also threaded onto a level order linked list, which is how the heap finds
//! the next free slot on insert and the last occupied slot on remove in O(1).
//! The tree can be walked in preorder and exported as a Graphviz DOT graph (see `dot`).

pub mod theap;
pub mod dot;

use thiserror::Error;

pub use theap::{Heap, NodeView, Walk, LevelOrder};
pub use dot::{DotOptions, to_dot, write_dot};



#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// `remove` or `peek` was called with nothing in the heap
    #[error("heap is empty")]
    Empty
}
