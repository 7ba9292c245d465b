//! Recency ledger backing the LRU policy.
//!
//! Keys live in an arena of slots addressed by stable indices. The occupied
//! slots form a doubly-linked list ordered from most to least recently used,
//! and a side index maps each key to its slot, so every operation is O(1)
//! without any shared pointers.

use std::collections::HashMap;
use std::hash::Hash;

use infercache_core::error::{CacheError, Result};

/// Stable handle to a key's position in a [`Ledger`].
///
/// Valid from the `touch` that returned it until the key is evicted or
/// removed. A handle never moves while its key stays in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecencyToken(usize);

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
enum Slot<K> {
    Occupied(Node<K>),
    Vacant,
}

/// Recency-ordered set of keys with O(1) touch, remove and eviction.
///
/// New keys enter at the most-recently-used end, so keys that were never
/// touched again leave in insertion order.
#[derive(Debug)]
pub struct Ledger<K> {
    slots: Vec<Slot<K>>,
    free: Vec<usize>,
    index: HashMap<K, usize>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
}

impl<K: Hash + Eq + Clone> Ledger<K> {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty ledger with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of keys tracked.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the ledger tracks no keys.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns true if `key` is tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Marks `key` as most recently used, inserting it if absent.
    pub fn touch(&mut self, key: &K) -> RecencyToken {
        if let Some(&idx) = self.index.get(key) {
            self.move_to_front(idx);
            return RecencyToken(idx);
        }

        let idx = self.alloc(key.clone());
        self.push_front(idx);
        self.index.insert(key.clone(), idx);
        RecencyToken(idx)
    }

    /// Marks the key behind `token` as most recently used.
    ///
    /// # Panics
    ///
    /// Panics if the token's key has already left the ledger.
    pub fn promote(&mut self, token: RecencyToken) {
        self.move_to_front(token.0);
    }

    /// Returns the token currently assigned to `key`.
    pub fn token_of(&self, key: &K) -> Option<RecencyToken> {
        self.index.get(key).copied().map(RecencyToken)
    }

    /// Removes and returns the least recently used key.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::EmptyLedger`] if there is nothing to evict.
    pub fn evict_least_recent(&mut self) -> Result<K> {
        let idx = self.tail.ok_or(CacheError::EmptyLedger)?;
        let key = self.release(idx);
        self.index.remove(&key);
        Ok(key)
    }

    /// Returns the key that would be evicted next.
    pub fn peek_least_recent(&self) -> Option<&K> {
        self.tail.map(|idx| &self.node(idx).key)
    }

    /// Removes `key` if present. Returns whether it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.release(idx);
                true
            }
            None => false,
        }
    }

    /// Drops every key.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            ledger: self,
            cursor: self.head,
        }
    }

    // -- arena helpers -------------------------------------------------------

    fn node(&self, idx: usize) -> &Node<K> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant => unreachable!("ledger slot {idx} is vacant"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant => unreachable!("ledger slot {idx} is vacant"),
        }
    }

    fn alloc(&mut self, key: K) -> usize {
        let node = Slot::Occupied(Node {
            key,
            prev: None,
            next: None,
        });
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = node;
                idx
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> K {
        self.unlink(idx);
        match std::mem::replace(&mut self.slots[idx], Slot::Vacant) {
            Slot::Occupied(node) => {
                self.free.push(idx);
                node.key
            }
            Slot::Vacant => unreachable!("ledger slot {idx} released twice"),
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let node = self.node_mut(idx);
        node.prev = None;
        node.next = None;
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.node_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}

impl<K: Hash + Eq + Clone> Default for Ledger<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ledger keys, most recently used first.
pub struct Iter<'a, K> {
    ledger: &'a Ledger<K>,
    cursor: Option<usize>,
}

impl<'a, K: Hash + Eq + Clone> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.ledger.node(idx);
        self.cursor = node.next;
        Some(&node.key)
    }
}
