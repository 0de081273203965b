//! Dense slot table with an intrusive free list.
//!
//! [`GenerationalArena`] keeps values packed in a dense `Vec` and maps
//! stable slot indices onto it through a sparse `Vec` of slots. Removal
//! swap-removes from the dense side and patches the moved value's slot, so
//! iteration walks only live values regardless of how many slots are free.
//!
//! Free slots are threaded into a doubly-linked list through the slots
//! themselves, so allocation pops the list head in O(1) and removal pushes
//! a new head in O(1). The back links let
//! [`shrink()`](GenerationalArena::shrink) unlink any trailing free slot
//! without walking the list.
//!
//! The arena itself carries no generation data. Stale-reference detection
//! is layered on top by [`HandleRegistry`](crate::HandleRegistry), which
//! stamps each occupant with a serial number.

use cadence_core::{ArenaError, ConfigError};

use crate::config::ArenaConfig;

#[derive(Clone, Copy)]
enum Slot {
    /// Position of the occupant in `dense`.
    Occupied(u32),
    Free { prev: Option<u32>, next: Option<u32> },
}

/// Growable slot table with O(1) add/remove and slot reuse.
///
/// Indices returned by [`add()`](Self::add) stay stable until the slot is
/// removed. Freed slots are reused most-recently-freed first. Iteration
/// order is unspecified and changes as values are removed.
pub struct GenerationalArena<T> {
    slots: Vec<Slot>,
    dense: Vec<(u32, T)>,
    free_head: Option<u32>,
    free_count: u32,
    limit: u32,
}

impl<T> GenerationalArena<T> {
    /// Create an arena with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(&ArenaConfig::default())
    }

    /// Create an arena from a validated configuration.
    pub fn with_config(config: &ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: &ArenaConfig) -> Self {
        Self {
            slots: Vec::with_capacity(config.initial_capacity as usize),
            dense: Vec::with_capacity(config.initial_capacity as usize),
            free_head: None,
            free_count: 0,
            limit: config.effective_limit(),
        }
    }

    /// Store `value` and return its slot index.
    ///
    /// Reuses the head of the free list if there is one; otherwise appends
    /// a new slot. Fails with [`ArenaError::CapacityExceeded`] once the
    /// slot count has reached the configured limit and no slot is free.
    pub fn add(&mut self, value: T) -> Result<u32, ArenaError> {
        let pos = self.dense.len() as u32;
        let index = match self.free_head {
            Some(index) => {
                self.unlink(index);
                self.slots[index as usize] = Slot::Occupied(pos);
                index
            }
            None => {
                let index = self.slot_count();
                if index >= self.limit {
                    return Err(ArenaError::CapacityExceeded {
                        capacity: self.limit,
                    });
                }
                self.slots.push(Slot::Occupied(pos));
                index
            }
        };
        self.dense.push((index, value));
        Ok(index)
    }

    /// Remove and return the value at `index`.
    ///
    /// Returns `Ok(None)` if the slot is already free. Callers are expected
    /// to have validated the index through a handle; the free case is a
    /// no-op rather than an error.
    pub fn remove(&mut self, index: u32) -> Result<Option<T>, ArenaError> {
        let slot_count = self.slot_count();
        let pos = match self.slots.get(index as usize) {
            None => return Err(ArenaError::IndexOutOfRange { index, slot_count }),
            Some(Slot::Free { .. }) => return Ok(None),
            Some(&Slot::Occupied(pos)) => pos,
        };

        self.slots[index as usize] = Slot::Free {
            prev: None,
            next: self.free_head,
        };
        if let Some(head) = self.free_head {
            self.set_prev(head, Some(index));
        }
        self.free_head = Some(index);
        self.free_count += 1;

        let (_, value) = self.dense.swap_remove(pos as usize);
        if let Some(&(moved, _)) = self.dense.get(pos as usize) {
            self.slots[moved as usize] = Slot::Occupied(pos);
        }
        Ok(Some(value))
    }

    /// Shared access to an occupied slot.
    pub fn get(&self, index: u32) -> Option<&T> {
        match self.slots.get(index as usize) {
            Some(&Slot::Occupied(pos)) => self.dense.get(pos as usize).map(|(_, value)| value),
            _ => None,
        }
    }

    /// Mutable access to an occupied slot.
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        match self.slots.get(index as usize) {
            Some(&Slot::Occupied(pos)) => {
                self.dense.get_mut(pos as usize).map(|(_, value)| value)
            }
            _ => None,
        }
    }

    /// Whether `index` currently holds a value.
    pub fn is_occupied(&self, index: u32) -> bool {
        matches!(self.slots.get(index as usize), Some(Slot::Occupied(_)))
    }

    /// Iterate occupied slots. Each step is O(1); free slots are never
    /// visited.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (u32, &T)> {
        self.dense.iter().map(|(index, value)| (*index, value))
    }

    /// Iterate occupied slots mutably.
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (u32, &mut T)> {
        self.dense.iter_mut().map(|(index, value)| (*index, value))
    }

    /// Remove every value, yielding them with their former indices.
    ///
    /// The arena is empty (zero slots) afterwards.
    pub fn drain(&mut self) -> impl Iterator<Item = (u32, T)> {
        let dense = std::mem::take(&mut self.dense);
        self.slots = Vec::new();
        self.free_head = None;
        self.free_count = 0;
        dense.into_iter()
    }

    /// Drop trailing free slots and release unused backing storage.
    ///
    /// Free slots below the new high-water mark stay linked.
    pub fn shrink(&mut self) {
        while let Some(Slot::Free { .. }) = self.slots.last() {
            let index = self.slot_count() - 1;
            self.unlink(index);
            self.slots.pop();
        }
        self.slots.shrink_to_fit();
        self.dense.shrink_to_fit();
    }

    /// Remove every value and every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.dense.clear();
        self.free_head = None;
        self.free_count = 0;
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Total slots allocated (occupied + free).
    pub fn slot_count(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Number of free slots awaiting reuse.
    pub fn free_count(&self) -> u32 {
        self.free_count
    }

    /// The slot count at which `add` fails.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Slots the backing storage can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Detach a free slot from the list, patching its neighbours.
    fn unlink(&mut self, index: u32) {
        let (prev, next) = match self.slots[index as usize] {
            Slot::Free { prev, next } => (prev, next),
            Slot::Occupied(_) => return,
        };
        match prev {
            Some(p) => self.set_next(p, next),
            None => self.free_head = next,
        }
        if let Some(n) = next {
            self.set_prev(n, prev);
        }
        self.free_count -= 1;
    }

    fn set_prev(&mut self, index: u32, to: Option<u32>) {
        if let Slot::Free { prev, .. } = &mut self.slots[index as usize] {
            *prev = to;
        }
    }

    fn set_next(&mut self, index: u32, to: Option<u32>) {
        if let Slot::Free { next, .. } = &mut self.slots[index as usize] {
            *next = to;
        }
    }
}

impl<T> Default for GenerationalArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
