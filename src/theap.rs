use std::{fmt, mem};

use tracing::trace;

use crate::HeapError;

/// Index of a node in the heap's arena.
/// Nodes are only ever created at the last slot and destroyed at the last slot,
/// so the arena behaves like a stack and a node's index is also its level order position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug)]
struct Node<T> {
	value: T,
	id: u64,
	parent: Option<NodeId>,
	left: Option<NodeId>,
	right: Option<NodeId>,
	prev: Option<NodeId>,
	next: Option<NodeId>
}

/// A max heap stored as an explicit complete binary tree.
/// Besides the usual parent/child links, every node is threaded onto a doubly linked list
/// in level order (root first, then left to right across each layer).  The thread is what lets
/// insert find the next free slot and remove find the last occupied slot without any index arithmetic.
/// - Peek max: O(1)
/// - Remove max: O(log(n))
/// - Insert: O(log(n))
/// Values only ever move between nodes by swapping payloads; the tree shape and the thread
/// are decided purely by how many elements are in the heap.
/// Not safe for concurrent mutation without external locking (all mutation goes through `&mut self`).
pub struct Heap<T> {
	nodes: Vec<Node<T>>,
	head: Option<NodeId>,
	tail: Option<NodeId>,
	next_id: u64
}

#[cfg(test)]
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum HeapCheckError {
	LessThanChild(u64),
	BrokenParentLink(u64),
	BrokenThread(u64),
	NotComplete(u64),
	WrongTail,
	WrongCount
}

/// Read only description of one node, as yielded by `Heap::walk`.
/// Identifiers are assigned when a node is created and are only meant for visualization;
/// they are unique for the lifetime of the heap and never reused.
#[derive(Debug, PartialEq, Eq)]
pub struct NodeView<'a, T> {
	pub id: u64,
	pub value: &'a T,
	pub left: Option<u64>,
	pub right: Option<u64>
}

impl<T> Clone for NodeView<'_, T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for NodeView<'_, T> {}

/// Preorder walk over the nodes of a heap.  See `Heap::walk`
pub struct Walk<'a, T> {
	heap: &'a Heap<T>,
	todo: Vec<NodeId>
}

impl<'a, T> Iterator for Walk<'a, T> {
	type Item = NodeView<'a, T>;
	fn next(&mut self) -> Option<Self::Item> {
		let heap = self.heap;
		let idx = self.todo.pop()?;
		let node = &heap.nodes[idx.0];
		// right first so the left subtree comes off the stack first
		self.todo.extend(node.right);
		self.todo.extend(node.left);
		Some(NodeView{
			id: node.id,
			value: &node.value,
			left: node.left.map(|c|heap.nodes[c.0].id),
			right: node.right.map(|c|heap.nodes[c.0].id)
		})
	}
}

/// Iterator following the level order thread from the root to the last slot.  See `Heap::level_order`
pub struct LevelOrder<'a, T> {
	heap: &'a Heap<T>,
	curr: Option<NodeId>
}

impl<'a, T> Iterator for LevelOrder<'a, T> {
	type Item = &'a T;
	fn next(&mut self) -> Option<Self::Item> {
		let heap = self.heap;
		let node = &heap.nodes[self.curr?.0];
		self.curr = node.next;
		Some(&node.value)
	}
}

impl<T> Heap<T> {
	/// Create an empty heap
	pub fn new() -> Self {
		Self{nodes: Vec::new(), head: None, tail: None, next_id: 0}
	}

	/// Get the number of elements in the heap
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.head.is_none()
	}

	/// Get the maximum element without removing it
	pub fn peek(&self) -> Result<&T, HeapError> {
		self.head.map(|h|&self.nodes[h.0].value).ok_or(HeapError::Empty)
	}

	/// Lazily walk the tree in preorder (node, left subtree, right subtree).
	/// Each item carries the node's identifier, a reference to its value, and the identifiers
	/// of its children if present, which is enough for a renderer to rebuild the shape of the tree.
	/// The walk borrows the heap, so calling this again always starts over from the current state.
	pub fn walk(&self) -> Walk<'_, T> {
		Walk{heap: self, todo: self.head.into_iter().collect()}
	}

	/// Iterate over the values in slot order by following the thread from the root
	pub fn level_order(&self) -> LevelOrder<'_, T> {
		LevelOrder{heap: self, curr: self.head}
	}

	fn swap_values(&mut self, a: NodeId, b: NodeId) {
		let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
		let (front, back) = self.nodes.split_at_mut(hi);
		mem::swap(&mut front[lo].value, &mut back[0].value);
	}
}

impl<T: Ord> Heap<T> {
	#[cfg(test)]
	pub(crate) fn check(&self) -> Result<(), HeapCheckError> {
		use HeapCheckError::*;
		let n = self.nodes.len();
		if self.head.is_none() != (n == 0) || self.head.is_some_and(|h|h.0 != 0) {
			return Err(WrongCount)
		}
		if self.tail != n.checked_sub(1).map(NodeId) {
			return Err(WrongTail)
		}
		// the per node pass is too slow to run after every operation in stress tests
		#[cfg(not(feature = "stress_tests"))]
		self.check_links()?;
		Ok(())
	}

	#[cfg(all(test, not(feature = "stress_tests")))]
	fn check_links(&self) -> Result<(), HeapCheckError> {
		use HeapCheckError::*;
		let n = self.nodes.len();
		// since arena index == level order position, slot i of a complete tree has children 2i+1 and 2i+2
		let mut reachable = 0;
		for (i, node) in self.nodes.iter().enumerate() {
			let want_prev = i.checked_sub(1).map(NodeId);
			let want_next = Some(i + 1).filter(|&j|j < n).map(NodeId);
			// ids are handed out in creation order, which is also slot order
			if node.prev != want_prev || node.next != want_next || (i > 0 && node.id <= self.nodes[i - 1].id) {
				return Err(BrokenThread(node.id))
			}
			let want_left = Some(2*i + 1).filter(|&j|j < n).map(NodeId);
			let want_right = Some(2*i + 2).filter(|&j|j < n).map(NodeId);
			if node.left != want_left || node.right != want_right {
				return Err(NotComplete(node.id))
			}
			for child in node.left.into_iter().chain(node.right) {
				let c = &self.nodes[child.0];
				if c.parent != Some(NodeId(i)) {
					return Err(BrokenParentLink(c.id))
				}
				if c.value > node.value {
					return Err(LessThanChild(node.id))
				}
				reachable += 1;
			}
		}
		if n > 0 && self.nodes[0].parent.is_some() {
			return Err(BrokenParentLink(self.nodes[0].id))
		}
		if reachable + usize::from(n > 0) != n {
			return Err(WrongCount)
		}
		Ok(())
	}

	/// Insert an element into the heap.
	/// Elements that compare equal are fine, but their relative order is unspecified
	pub fn insert(&mut self, value: T) {
		let idx = NodeId(self.nodes.len());
		self.next_id += 1;
		let mut node = Node{value, id: self.next_id, parent: None, left: None, right: None, prev: self.tail, next: None};
		let Some(tail) = self.tail else {
			trace!(id = node.id, "insert into empty heap");
			self.nodes.push(node);
			self.head = Some(idx);
			self.tail = Some(idx);
			#[cfg(test)]{
				assert_eq!(self.check(), Ok(()))
			}
			return
		};
		// find the slot right after the tail: the tail's parent still has room on the right,
		// or it's full and the slot is the left child of the parent's successor
		let (parent, is_left) = match self.nodes[tail.0].parent {
			None => (tail, true),
			Some(p) if self.nodes[p.0].right.is_some() => {
				// p is slot i and the tail is its right child at slot 2i+2 > i+1, so slot i+1 is occupied
				let Some(q) = self.nodes[p.0].next else { unreachable!("full parent at slot i has no node at slot i+1") };
				(q, true)
			},
			Some(p) => (p, false)
		};
		node.parent = Some(parent);
		trace!(id = node.id, parent = self.nodes[parent.0].id, is_left, "insert");
		self.nodes.push(node);
		if is_left {
			self.nodes[parent.0].left = Some(idx);
		} else {
			self.nodes[parent.0].right = Some(idx);
		}
		self.nodes[tail.0].next = Some(idx);
		self.tail = Some(idx);
		self.sift_up(idx);
		#[cfg(test)]{
			assert_eq!(self.check(), Ok(()))
		}
	}

	/// Remove the maximal element and return it.
	/// The value in the last slot takes the root's place and is sifted down, and the last slot is destroyed.
	/// On an empty heap this returns `HeapError::Empty` and does not touch anything.
	pub fn remove(&mut self) -> Result<T, HeapError> {
		let (Some(root), Some(tail)) = (self.head, self.tail) else { return Err(HeapError::Empty) };
		debug_assert_eq!(tail.0 + 1, self.nodes.len());
		let Some(last) = self.nodes.pop() else { return Err(HeapError::Empty) };
		let Some(parent) = last.parent else {
			// the last slot was the root, so it was the only node
			trace!(id = last.id, "remove only node");
			self.head = None;
			self.tail = None;
			return Ok(last.value)
		};
		let p = &mut self.nodes[parent.0];
		if p.right == Some(tail) {
			p.right = None;
		} else {
			p.left = None;
		}
		if let Some(prev) = last.prev {
			self.nodes[prev.0].next = None;
		}
		self.tail = last.prev;
		let res = mem::replace(&mut self.nodes[root.0].value, last.value);
		trace!(id = last.id, len = self.nodes.len(), "remove");
		self.sift_down(root);
		#[cfg(test)]{
			assert_eq!(self.check(), Ok(()))
		}
		Ok(res)
	}

	fn sift_up(&mut self, mut i: NodeId) {
		while let Some(p) = self.nodes[i.0].parent {
			if self.nodes[i.0].value <= self.nodes[p.0].value {
				break
			}
			self.swap_values(i, p);
			i = p;
		}
	}

	fn sift_down(&mut self, mut i: NodeId) {
		loop {
			let node = &self.nodes[i.0];
			let child = match (node.left, node.right) {
				(None, _) => return,
				// a left-only node sits right above the last layer, so its child is a leaf
				// and the loop ends on the next pass
				(Some(l), None) => l,
				// ties go to the left child
				(Some(l), Some(r)) => if self.nodes[r.0].value > self.nodes[l.0].value { r } else { l }
			};
			if self.nodes[child.0].value <= node.value {
				return
			}
			self.swap_values(i, child);
			i = child;
		}
	}
}

impl<T> Default for Heap<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.level_order()).finish()
	}
}

impl<'a, T> IntoIterator for &'a Heap<T> {
	type Item = NodeView<'a, T>;
	type IntoIter = Walk<'a, T>;
	fn into_iter(self) -> Self::IntoIter {
		self.walk()
	}
}
