//! An addressable priority queue implemented with a 4-ary heap.
//!
//! Elements are dense node ids in `[0, max_id)` with a weight key and a per
//! node payload. On top of the usual insert, decrease-key and delete-min the
//! queue remembers every node inserted since the last `clear`: `key` keeps
//! answering with the final key after a node left the heap, which is what
//! the witness searches and the alternative route filters read their
//! distances from. A single instance is meant to be reused; `clear` resets
//! membership without reallocating.
//!
//! # Examples
//!
//! ```
//! use ch_routing_engine::datastr::index_heap::AddressableMinHeap;
//!
//! let mut heap = AddressableMinHeap::<()>::new(3);
//! heap.push(0, 42, ());
//! heap.push(1, 23, ());
//! heap.push(2, 50000, ());
//! assert_eq!(heap.peek(), Some(1));
//! heap.decrease_key(0, 1);
//! assert_eq!(heap.pop(), Some(0));
//! assert_eq!(heap.key(0), 1);
//! ```

use crate::datastr::graph::{NodeId, Weight};

const TREE_ARITY: usize = 4;
const INVALID_POSITION: usize = usize::MAX;
const NOT_IN_HEAP: usize = usize::MAX;

#[derive(Debug)]
struct Entry<D> {
    node: NodeId,
    key: Weight,
    heap_pos: usize,
    data: D,
}

#[derive(Debug, Clone, Copy)]
struct HeapSlot {
    key: Weight,
    entry: usize,
}

#[derive(Debug)]
pub struct AddressableMinHeap<D> {
    // node id to index into `inserted`, `INVALID_POSITION` while absent
    positions: Vec<usize>,
    // every node inserted since the last clear, popped ones included
    inserted: Vec<Entry<D>>,
    heap: Vec<HeapSlot>,
}

impl<D> AddressableMinHeap<D> {
    /// Creates an empty heap for node ids in `[0, max_id)`.
    pub fn new(max_id: usize) -> AddressableMinHeap<D> {
        AddressableMinHeap {
            positions: vec![INVALID_POSITION; max_id],
            inserted: Vec::new(),
            heap: Vec::new(),
        }
    }

    /// Number of elements currently queued.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Was this node inserted since the last `clear`? Stays true after the
    /// node was popped.
    pub fn was_inserted(&self, node: NodeId) -> bool {
        self.positions[node as usize] != INVALID_POSITION
    }

    /// Reset membership. Amortised linear in the number of inserted nodes,
    /// no reallocation.
    pub fn clear(&mut self) {
        for entry in &self.inserted {
            self.positions[entry.node as usize] = INVALID_POSITION;
        }
        self.inserted.clear();
        self.heap.clear();
    }

    /// Drop all queued elements but keep the insertion record, so `key` and
    /// `data` stay usable for everything seen so far.
    pub fn delete_all(&mut self) {
        for slot in &self.heap {
            self.inserted[slot.entry].heap_pos = NOT_IN_HEAP;
        }
        self.heap.clear();
    }

    /// Insert a node. Panics if it was already inserted since the last `clear`.
    pub fn push(&mut self, node: NodeId, key: Weight, data: D) {
        assert!(!self.was_inserted(node));
        let entry_index = self.inserted.len();
        let heap_pos = self.heap.len();
        self.positions[node as usize] = entry_index;
        self.inserted.push(Entry { node, key, heap_pos, data });
        self.heap.push(HeapSlot { key, entry: entry_index });
        self.move_up(heap_pos);
    }

    /// Lower the key of a queued node. The new key must not be larger than
    /// the current one.
    pub fn decrease_key(&mut self, node: NodeId, key: Weight) {
        let entry_index = self.positions[node as usize];
        let entry = &mut self.inserted[entry_index];
        debug_assert!(key <= entry.key);
        debug_assert!(entry.heap_pos != NOT_IN_HEAP);
        entry.key = key;
        let pos = entry.heap_pos;
        self.heap[pos].key = key;
        self.move_up(pos);
    }

    /// Remove and return the node with the smallest key. Its final key stays
    /// readable through `key`.
    pub fn pop(&mut self) -> Option<NodeId> {
        if self.heap.is_empty() {
            return None;
        }
        let min = self.heap[0];
        self.inserted[min.entry].heap_pos = NOT_IN_HEAP;
        let last = self.heap.pop().unwrap();
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.inserted[last.entry].heap_pos = 0;
            self.move_down(0);
        }
        Some(self.inserted[min.entry].node)
    }

    /// The node with the smallest key, or None if the queue is empty.
    pub fn peek(&self) -> Option<NodeId> {
        self.heap.first().map(|slot| self.inserted[slot.entry].node)
    }

    /// The smallest queued key, or None if the queue is empty.
    pub fn peek_key(&self) -> Option<Weight> {
        self.heap.first().map(|slot| slot.key)
    }

    /// Current key of an inserted node; the final key once it was popped.
    pub fn key(&self, node: NodeId) -> Weight {
        self.inserted[self.positions[node as usize]].key
    }

    pub fn data(&self, node: NodeId) -> &D {
        &self.inserted[self.positions[node as usize]].data
    }

    pub fn data_mut(&mut self, node: NodeId) -> &mut D {
        &mut self.inserted[self.positions[node as usize]].data
    }

    fn move_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / TREE_ARITY;
            if self.heap[parent].key <= self.heap[pos].key {
                break;
            }
            self.swap_slots(parent, pos);
            pos = parent;
        }
    }

    fn move_down(&mut self, mut pos: usize) {
        loop {
            let first_child = TREE_ARITY * pos + 1;
            let last_child = std::cmp::min(TREE_ARITY * pos + TREE_ARITY + 1, self.heap.len());
            let Some(smallest_child) = (first_child..last_child).min_by_key(|&child| self.heap[child].key) else {
                return;
            };
            if self.heap[smallest_child].key >= self.heap[pos].key {
                return;
            }
            self.swap_slots(smallest_child, pos);
            pos = smallest_child;
        }
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.inserted[self.heap[a].entry].heap_pos = b;
        self.inserted[self.heap[b].entry].heap_pos = a;
        self.heap.swap(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_key_order() {
        let mut heap = AddressableMinHeap::<()>::new(10);
        for (node, key) in [(3, 30), (1, 10), (7, 70), (2, 20), (9, 90)] {
            heap.push(node, key, ());
        }
        let order: Vec<_> = std::iter::from_fn(|| heap.pop()).collect();
        assert_eq!(order, vec![1, 2, 3, 7, 9]);
    }

    #[test]
    fn decrease_key_reorders() {
        let mut heap = AddressableMinHeap::<()>::new(4);
        heap.push(0, 40, ());
        heap.push(1, 30, ());
        heap.push(2, 20, ());
        heap.decrease_key(0, 10);
        assert_eq!(heap.pop(), Some(0));
        assert_eq!(heap.pop(), Some(2));
    }

    #[test]
    fn key_survives_pop() {
        let mut heap = AddressableMinHeap::new(4);
        heap.push(2, 5, "aux");
        assert_eq!(heap.pop(), Some(2));
        assert!(heap.was_inserted(2));
        assert_eq!(heap.key(2), 5);
        assert_eq!(*heap.data(2), "aux");
        assert!(heap.is_empty());
    }

    #[test]
    fn clear_resets_membership() {
        let mut heap = AddressableMinHeap::<()>::new(4);
        heap.push(1, 1, ());
        heap.push(2, 2, ());
        heap.clear();
        assert!(!heap.was_inserted(1));
        assert!(heap.is_empty());
        heap.push(1, 7, ());
        assert_eq!(heap.key(1), 7);
    }

    #[test]
    fn delete_all_keeps_settled_keys() {
        let mut heap = AddressableMinHeap::<()>::new(4);
        heap.push(0, 1, ());
        heap.push(1, 2, ());
        heap.push(3, 3, ());
        assert_eq!(heap.pop(), Some(0));
        heap.delete_all();
        assert!(heap.is_empty());
        assert!(heap.was_inserted(3));
        assert_eq!(heap.key(0), 1);
        assert_eq!(heap.key(3), 3);
    }

    #[test]
    fn mutable_payload() {
        let mut heap = AddressableMinHeap::new(2);
        heap.push(0, 1, 0u32);
        *heap.data_mut(0) += 41;
        assert_eq!(*heap.data(0), 41);
    }
}
