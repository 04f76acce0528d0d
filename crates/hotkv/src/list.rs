//! Sentinel-bounded doubly-linked order list backed by an index arena
//!
//! Nodes live in an [`Arena`] and are linked by slot index instead of by
//! reference, so a node can be detached from one [`OrderList`] and attached to
//! another without moving or reallocating it. Every list owns two sentinel
//! slots that never hold data:
//!
//! ```text
//!   head ─► [newest] ◄──► ... ◄──► [oldest] ◄── tail
//! ```
//!
//! The first list created in an arena has its sentinels at slots 0 and 1.
//! Several lists may share one arena (the LFU cache keeps one list per
//! frequency).

use crate::error::{Error, Result};

/// Upper bound on slots reserved up front; arenas grow on demand past it
pub(crate) const PREALLOCATE_LIMIT: usize = 4096;

/// Stable handle to a node stored in an [`Arena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw slot index
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Slot<T> {
    prev: usize,
    next: usize,
    value: Option<T>,
}

/// Owner of all node and sentinel storage
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<usize>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an arena with room for `capacity` slots
    ///
    /// At most [`PREALLOCATE_LIMIT`] slots are reserved up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.min(PREALLOCATE_LIMIT)),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Number of live (non-sentinel) nodes
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the arena holds no live nodes
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Store `value` in a detached node
    pub fn alloc(&mut self, value: T) -> NodeId {
        self.live += 1;
        NodeId(self.alloc_slot(Some(value)))
    }

    /// Destroy a detached node and return its value
    ///
    /// The node must already have been removed from its list.
    pub fn free(&mut self, id: NodeId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        debug_assert!(slot.prev == id.0, "freeing a node that is still linked");
        let value = slot.value.take()?;
        self.free_list.push(id.0);
        self.live -= 1;
        Some(value)
    }

    /// Borrow the value stored in a node
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.value.as_ref())
    }

    /// Mutably borrow the value stored in a node
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(|slot| slot.value.as_mut())
    }

    /// Allocate the two sentinels of a new, empty list
    pub fn new_list(&mut self) -> OrderList {
        let head = self.alloc_slot(None);
        let tail = self.alloc_slot(None);
        self.slots[head].next = tail;
        self.slots[tail].prev = head;
        OrderList { head, tail, len: 0 }
    }

    /// Return an empty list's sentinels to the free list
    pub fn release_list(&mut self, list: OrderList) {
        debug_assert!(list.is_empty(), "releasing a non-empty list");
        self.free_list.push(list.head);
        self.free_list.push(list.tail);
    }

    /// Drop every node and sentinel
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.live = 0;
    }

    fn alloc_slot(&mut self, value: Option<T>) -> usize {
        match self.free_list.pop() {
            Some(idx) => {
                self.slots[idx] = Slot {
                    prev: idx,
                    next: idx,
                    value,
                };
                idx
            }
            None => {
                let idx = self.slots.len();
                self.slots.push(Slot {
                    prev: idx,
                    next: idx,
                    value,
                });
                idx
            }
        }
    }
}

/// Recency-ordered list of arena nodes
///
/// Front is the newest node, back is the oldest.
#[derive(Debug)]
pub struct OrderList {
    head: usize,
    tail: usize,
    len: usize,
}

impl OrderList {
    /// Number of nodes between the sentinels
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Attach a detached node next to the head sentinel
    pub fn push_front<T>(&mut self, arena: &mut Arena<T>, id: NodeId) {
        let first = arena.slots[self.head].next;

        let slot = &mut arena.slots[id.0];
        debug_assert!(slot.value.is_some(), "pushing a sentinel or freed slot");
        debug_assert!(slot.prev == id.0, "pushing a node that is already linked");
        slot.prev = self.head;
        slot.next = first;

        arena.slots[first].prev = id.0;
        arena.slots[self.head].next = id.0;
        self.len += 1;
    }

    /// Detach a node from this list without destroying it
    ///
    /// The node must currently be a member of this list.
    pub fn remove<T>(&mut self, arena: &mut Arena<T>, id: NodeId) {
        let (prev, next) = {
            let slot = &arena.slots[id.0];
            (slot.prev, slot.next)
        };
        debug_assert!(prev != id.0, "removing a node that is not linked");

        arena.slots[prev].next = next;
        arena.slots[next].prev = prev;

        let slot = &mut arena.slots[id.0];
        slot.prev = id.0;
        slot.next = id.0;
        self.len -= 1;
    }

    /// Detach and return the oldest node
    pub fn pop_back<T>(&mut self, arena: &mut Arena<T>) -> Option<NodeId> {
        let id = self.back(arena)?;
        self.remove(arena, id);
        Some(id)
    }

    /// Oldest node, if any
    pub fn back<T>(&self, arena: &Arena<T>) -> Option<NodeId> {
        if self.len == 0 {
            return None;
        }
        Some(NodeId(arena.slots[self.tail].prev))
    }

    /// Newest node, if any
    pub fn front<T>(&self, arena: &Arena<T>) -> Option<NodeId> {
        if self.len == 0 {
            return None;
        }
        Some(NodeId(arena.slots[self.head].next))
    }

    /// Iterate from newest to oldest
    pub fn iter<'a, T>(&self, arena: &'a Arena<T>) -> Iter<'a, T> {
        Iter {
            arena,
            cursor: arena.slots[self.head].next,
            end: self.tail,
            remaining: self.len,
        }
    }

    /// Walk the list in both directions and confirm the links agree
    pub fn check_invariants<T>(&self, arena: &Arena<T>) -> Result<()> {
        let mut forward = Vec::with_capacity(self.len);
        let mut cursor = arena.slots[self.head].next;
        while cursor != self.tail {
            if forward.len() > self.len {
                return Err(Error::invariant("forward walk longer than len"));
            }
            let slot = &arena.slots[cursor];
            if slot.value.is_none() {
                return Err(Error::invariant(format!(
                    "slot {} between sentinels holds no value",
                    cursor
                )));
            }
            if arena.slots[slot.next].prev != cursor {
                return Err(Error::invariant(format!(
                    "slot {} next/prev links disagree",
                    cursor
                )));
            }
            forward.push(cursor);
            cursor = slot.next;
        }
        if forward.len() != self.len {
            return Err(Error::invariant(format!(
                "list len {} but {} linked nodes",
                self.len,
                forward.len()
            )));
        }

        let mut cursor = arena.slots[self.tail].prev;
        for &expected in forward.iter().rev() {
            if cursor != expected {
                return Err(Error::invariant("backward walk differs from forward walk"));
            }
            cursor = arena.slots[cursor].prev;
        }
        if cursor != self.head {
            return Err(Error::invariant("backward walk does not end at head"));
        }
        Ok(())
    }
}

/// Iterator over `(NodeId, &T)` from newest to oldest
pub struct Iter<'a, T> {
    arena: &'a Arena<T>,
    cursor: usize,
    end: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == self.end {
            return None;
        }
        let slot = &self.arena.slots[self.cursor];
        let id = NodeId(self.cursor);
        self.cursor = slot.next;
        self.remaining = self.remaining.saturating_sub(1);
        slot.value.as_ref().map(|value| (id, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
