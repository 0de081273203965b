//! Serial-stamped handle registry.
//!
//! [`HandleRegistry`] layers stale-reference detection over a
//! [`GenerationalArena`]. The registry keeps a single serial counter:
//! registration stamps the new occupant with the current value, and every
//! successful unregistration bumps the counter before the slot can be
//! reused. A [`Handle`] resolves only while its slot is occupied by an
//! entry carrying the same serial, so handles to a recycled slot go inert
//! instead of aliasing the new occupant. Double-unregister is a safe no-op.
//!
//! The counter is per registry, not per slot. It wraps within 40 bits
//! (skipping zero) after 2^40 - 1 removals; a handle kept alive across a
//! full wrap could in principle alias a newer entry at the same index.

use cadence_core::{ArenaError, ConfigError, Handle, MAX_SERIAL};

use crate::arena::GenerationalArena;
use crate::config::ArenaConfig;

struct Stamped<T> {
    serial: u64,
    value: T,
}

/// Maps [`Handle`]s to owned values with O(1) validated lookup.
pub struct HandleRegistry<T> {
    arena: GenerationalArena<Stamped<T>>,
    serial: u64,
}

impl<T> HandleRegistry<T> {
    /// Create an empty registry with the default arena configuration.
    pub fn new() -> Self {
        Self {
            arena: GenerationalArena::new(),
            serial: 1,
        }
    }

    /// Create an empty registry backed by an arena built from `config`.
    pub fn with_config(config: &ArenaConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            arena: GenerationalArena::with_config(config)?,
            serial: 1,
        })
    }

    /// Store `value` and return a handle to it.
    pub fn register(&mut self, value: T) -> Result<Handle, ArenaError> {
        let serial = self.serial;
        let index = self.arena.add(Stamped { serial, value })?;
        Ok(Handle::new(serial, index))
    }

    /// Remove the value behind `handle`, returning it.
    ///
    /// Returns `None` for stale or never-issued handles; in particular a
    /// handle whose slot was reused by a newer registration leaves the
    /// newer occupant untouched.
    pub fn unregister(&mut self, handle: Handle) -> Option<T> {
        if self.resolve(handle).is_none() {
            return None;
        }
        self.bump_serial();
        self.arena
            .remove(handle.index())
            .ok()
            .flatten()
            .map(|stamped| stamped.value)
    }

    /// Look up the value behind `handle`.
    ///
    /// Must be called on every access; a resolved reference may not be
    /// held across anything that can unregister.
    pub fn resolve(&self, handle: Handle) -> Option<&T> {
        if handle.is_none() {
            return None;
        }
        self.arena
            .get(handle.index())
            .filter(|stamped| stamped.serial == handle.serial())
            .map(|stamped| &stamped.value)
    }

    /// Mutable variant of [`resolve()`](Self::resolve).
    pub fn resolve_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if handle.is_none() {
            return None;
        }
        self.arena
            .get_mut(handle.index())
            .filter(|stamped| stamped.serial == handle.serial())
            .map(|stamped| &mut stamped.value)
    }

    /// Whether `handle` currently resolves.
    pub fn contains(&self, handle: Handle) -> bool {
        self.resolve(handle).is_some()
    }

    /// Number of live entries.
    pub fn count(&self) -> usize {
        self.arena.len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Iterate live entries with their current handles. O(1) per entry;
    /// order is unspecified.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Handle, &T)> {
        self.arena
            .iter()
            .map(|(index, stamped)| (Handle::new(stamped.serial, index), &stamped.value))
    }

    /// Remove every entry, yielding each with the handle it was issued.
    ///
    /// All outstanding handles are invalid afterwards.
    pub fn drain(&mut self) -> Vec<(Handle, T)> {
        if self.arena.is_empty() {
            return Vec::new();
        }
        self.bump_serial();
        self.arena
            .drain()
            .map(|(index, stamped)| (Handle::new(stamped.serial, index), stamped.value))
            .collect()
    }

    /// Remove every entry without returning them. Outstanding handles are
    /// invalid afterwards.
    pub fn clear(&mut self) {
        if !self.arena.is_empty() {
            self.bump_serial();
        }
        self.arena.clear();
    }

    /// Release trailing free slots of the backing arena.
    pub fn shrink(&mut self) {
        self.arena.shrink();
    }

    /// Serial that the next registration will be stamped with.
    pub fn current_serial(&self) -> u64 {
        self.serial
    }

    fn bump_serial(&mut self) {
        if self.serial >= MAX_SERIAL {
            tracing::warn!(
                serial = self.serial,
                "registry serial counter wrapped; handles older than 2^40 removals may alias"
            );
            self.serial = 1;
        } else {
            self.serial += 1;
        }
    }
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn register_resolve() {
        let mut reg = HandleRegistry::new();
        let h = reg.register("actor").unwrap();
        assert_eq!(reg.resolve(h), Some(&"actor"));
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn resolve_mut_modifies_value() {
        let mut reg = HandleRegistry::new();
        let h = reg.register(10i32).unwrap();
        *reg.resolve_mut(h).unwrap() = 20;
        assert_eq!(reg.resolve(h), Some(&20));
    }

    #[test]
    fn first_handle_is_not_none() {
        let mut reg = HandleRegistry::new();
        let h = reg.register(()).unwrap();
        assert!(!h.is_none());
        assert_eq!(h.serial(), 1);
        assert_eq!(h.index(), 0);
    }

    #[test]
    fn none_handle_never_resolves() {
        let mut reg = HandleRegistry::new();
        reg.register(1u8).unwrap();
        assert_eq!(reg.resolve(Handle::NONE), None);
        assert_eq!(reg.unregister(Handle::NONE), None);
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn stale_handle_after_reuse() {
        let mut reg = HandleRegistry::new();
        let h1 = reg.register(1i32).unwrap();
        assert_eq!(reg.unregister(h1), Some(1));
        let h2 = reg.register(2i32).unwrap();
        assert_eq!(h1.index(), h2.index());
        assert_ne!(h1.serial(), h2.serial());
        assert_eq!(reg.resolve(h1), None);
        assert_eq!(reg.resolve(h2), Some(&2));
    }

    #[test]
    fn stale_unregister_spares_new_occupant() {
        let mut reg = HandleRegistry::new();
        let h1 = reg.register(1i32).unwrap();
        reg.unregister(h1);
        let h2 = reg.register(2i32).unwrap();
        assert_eq!(reg.unregister(h1), None);
        assert_eq!(reg.resolve(h2), Some(&2));
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn double_unregister_is_noop() {
        let mut reg = HandleRegistry::new();
        let h = reg.register(5i32).unwrap();
        let other = reg.register(6i32).unwrap();
        assert_eq!(reg.unregister(h), Some(5));
        let serial_after_first = reg.current_serial();
        assert_eq!(reg.unregister(h), None);
        assert_eq!(reg.current_serial(), serial_after_first);
        assert_eq!(reg.resolve(other), Some(&6));
    }

    #[test]
    fn registrations_between_removals_share_serial() {
        let mut reg = HandleRegistry::new();
        let a = reg.register('a').unwrap();
        let b = reg.register('b').unwrap();
        assert_eq!(a.serial(), b.serial());
        assert_ne!(a.index(), b.index());
    }

    #[test]
    fn capacity_error_propagates() {
        let mut reg = HandleRegistry::with_config(&ArenaConfig::bounded(1)).unwrap();
        reg.register(1u8).unwrap();
        assert_eq!(
            reg.register(2u8),
            Err(ArenaError::CapacityExceeded { capacity: 1 })
        );
    }

    #[test]
    fn drain_invalidates_everything() {
        let mut reg = HandleRegistry::new();
        let a = reg.register(1u32).unwrap();
        let b = reg.register(2u32).unwrap();
        let drained = reg.drain();
        assert_eq!(drained, vec![(a, 1), (b, 2)]);
        assert!(reg.is_empty());
        assert!(!reg.contains(a));
        let c = reg.register(3u32).unwrap();
        assert_eq!(c.index(), a.index());
        assert_eq!(reg.resolve(a), None);
    }

    #[test]
    fn clear_bumps_serial_and_restarts_slots() {
        let mut reg = HandleRegistry::new();
        let a = reg.register(1).unwrap();
        reg.register(2).unwrap();
        reg.clear();
        assert!(reg.is_empty());
        assert!(!reg.contains(a));
        let b = reg.register(3).unwrap();
        assert_eq!(b.index(), a.index());
        assert_ne!(b.serial(), a.serial());
    }

    #[test]
    fn iter_reports_issued_handles() {
        let mut reg = HandleRegistry::new();
        let a = reg.register(1u32).unwrap();
        let b = reg.register(2u32).unwrap();
        reg.unregister(a);
        let c = reg.register(3u32).unwrap();
        let mut seen: Vec<_> = reg.iter().map(|(h, v)| (*v, h)).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![(2, b), (3, c)]);
    }

    #[test]
    fn serial_wraps_past_forty_bits_skipping_zero() {
        let mut reg = HandleRegistry::new();
        reg.serial = MAX_SERIAL;
        let h = reg.register(1u8).unwrap();
        assert_eq!(h.serial(), MAX_SERIAL);
        reg.unregister(h);
        assert_eq!(reg.current_serial(), 1);
        let next = reg.register(2u8).unwrap();
        assert!(!next.is_none());
        assert_eq!(reg.resolve(h), None);
    }

    #[test]
    fn many_cycles_on_one_slot_never_alias() {
        let mut reg = HandleRegistry::new();
        let mut previous = Vec::new();
        for i in 0..10_000u32 {
            let h = reg.register(i).unwrap();
            assert_eq!(h.index(), 0);
            reg.unregister(h);
            previous.push(h);
        }
        let live = reg.register(u32::MAX).unwrap();
        assert!(previous.iter().all(|h| reg.resolve(*h).is_none()));
        assert_eq!(reg.resolve(live), Some(&u32::MAX));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Register,
        Unregister(usize),
    }

    proptest! {
        #[test]
        fn retired_handles_never_resolve(
            ops in proptest::collection::vec(
                prop_oneof![
                    Just(Op::Register),
                    (0usize..64).prop_map(Op::Unregister),
                ],
                1..300,
            )
        ) {
            let mut reg = HandleRegistry::new();
            let mut issued: Vec<(Handle, u32)> = Vec::new();
            let mut retired: Vec<Handle> = Vec::new();
            let mut next_value = 0u32;
            for op in ops {
                match op {
                    Op::Register => {
                        let h = reg.register(next_value).unwrap();
                        issued.push((h, next_value));
                        next_value += 1;
                    }
                    Op::Unregister(pick) => {
                        let all: Vec<Handle> = issued
                            .iter()
                            .map(|(h, _)| *h)
                            .chain(retired.iter().copied())
                            .collect();
                        if all.is_empty() {
                            continue;
                        }
                        let h = all[pick % all.len()];
                        let live_pos = issued.iter().position(|(x, _)| *x == h);
                        let removed = reg.unregister(h);
                        match live_pos {
                            Some(pos) => {
                                let (_, v) = issued.remove(pos);
                                prop_assert_eq!(removed, Some(v));
                                retired.push(h);
                            }
                            None => prop_assert_eq!(removed, None),
                        }
                    }
                }
                prop_assert_eq!(reg.count(), issued.len());
                for h in &retired {
                    prop_assert!(reg.resolve(*h).is_none(), "retired {} resolved", h);
                }
                for (h, v) in &issued {
                    prop_assert_eq!(reg.resolve(*h), Some(v));
                }
            }
        }
    }
}
