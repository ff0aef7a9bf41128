//! Doubly linked ranking list whose nodes live in a [`SlotArena`].
//!
//! A node's [`SlotId`] doubles as the policy token: it stays valid until the
//! node is removed, and every link operation is O(1). Order is front to back;
//! the recency and insertion-order policies read their victim off one end.
//!
//! ```text
//!   front ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── back
//! ```
//!
//! All splicing goes through two primitives: `link_between` places a detached
//! node between two neighbours, `unlink` detaches it again.

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug)]
pub struct IntrusiveList<T> {
    nodes: SlotArena<Node<T>>,
    front: Option<SlotId>,
    back: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity),
            front: None,
            back: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.nodes.contains(id)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.nodes.get(id).map(|node| &node.value)
    }

    pub fn front(&self) -> Option<&T> {
        self.get(self.front?)
    }

    pub fn back(&self) -> Option<&T> {
        self.get(self.back?)
    }

    pub fn front_id(&self) -> Option<SlotId> {
        self.front
    }

    pub fn back_id(&self) -> Option<SlotId> {
        self.back
    }

    /// Values from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cursor: self.front,
        }
    }

    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.detached(value);
        self.link_between(None, id, self.front);
        id
    }

    pub fn push_back(&mut self, value: T) -> SlotId {
        let id = self.detached(value);
        self.link_between(self.back, id, None);
        id
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.remove(self.front?)
    }

    /// Removes the back node, returning its former id with the value.
    pub fn pop_back_entry(&mut self) -> Option<(SlotId, T)> {
        let id = self.back?;
        self.remove(id).map(|value| (id, value))
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.unlink(id)?;
        self.nodes.remove(id).map(|node| node.value)
    }

    /// Relinks `id` at the front. Returns `false` for an unknown id.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if self.front == Some(id) {
            return true;
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.link_between(None, id, self.front);
        true
    }

    fn detached(&mut self, value: T) -> SlotId {
        self.nodes.insert(Node {
            value,
            prev: None,
            next: None,
        })
    }

    fn link_between(&mut self, prev: Option<SlotId>, id: SlotId, next: Option<SlotId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = prev;
            node.next = next;
        }
        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(prev_node) => prev_node.next = Some(id),
            None => self.front = Some(id),
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(next_node) => next_node.prev = Some(id),
            None => self.back = Some(id),
        }
    }

    fn unlink(&mut self, id: SlotId) -> Option<()> {
        let node = self.nodes.get_mut(id)?;
        let (prev, next) = (node.prev.take(), node.next.take());
        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.front = next,
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.back = prev,
        }
        Some(())
    }

    /// Walks the list checking both link directions and the node count.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut walked = 0usize;
        let mut expected_prev = None;
        let mut cursor = self.front;
        while let Some(id) = cursor {
            let node = self.nodes.get(id).expect("linked node missing");
            assert_eq!(node.prev, expected_prev, "broken back link at {:?}", id);
            walked += 1;
            assert!(walked <= self.len(), "cycle in list");
            expected_prev = Some(id);
            cursor = node.next;
        }
        assert_eq!(self.back, expected_prev);
        assert_eq!(walked, self.len());
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, T> {
    nodes: &'a SlotArena<Node<T>>,
    cursor: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(list: &IntrusiveList<T>) -> Vec<T> {
        list.iter().copied().collect()
    }

    #[test]
    fn pushes_land_on_the_requested_end() {
        let mut list = IntrusiveList::new();
        list.push_back(2);
        list.push_front(1);
        list.push_back(3);
        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.back(), Some(&3));
        list.debug_validate_invariants();
    }

    #[test]
    fn move_to_front_relinks_middle_and_back_nodes() {
        let mut list = IntrusiveList::with_capacity(3);
        let a = list.push_back('a');
        let b = list.push_back('b');
        let c = list.push_back('c');

        assert!(list.move_to_front(b));
        assert_eq!(values(&list), vec!['b', 'a', 'c']);
        assert!(list.move_to_front(c));
        assert_eq!(values(&list), vec!['c', 'b', 'a']);
        assert!(list.move_to_front(c));
        assert_eq!(list.back_id(), Some(a));
        list.debug_validate_invariants();
    }

    #[test]
    fn removal_from_either_end() {
        let mut list = IntrusiveList::new();
        let a = list.push_back("a");
        let b = list.push_back("b");
        let c = list.push_back("c");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.pop_back_entry(), Some((c, "c")));
        assert_eq!(list.front_id(), Some(a));
        assert_eq!(list.pop_front(), Some("a"));
        assert!(list.is_empty());
        assert_eq!(list.front_id(), None);
        assert_eq!(list.back_id(), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn removed_ids_are_inert() {
        let mut list = IntrusiveList::new();
        let a = list.push_back('a');
        list.push_back('b');
        list.remove(a);

        assert!(!list.contains(a));
        assert!(list.get(a).is_none());
        assert!(!list.move_to_front(a));
        assert_eq!(list.remove(a), None);
        assert_eq!(list.len(), 1);
    }
}
