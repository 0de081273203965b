//! Global-object table with bulk invalidation.
//!
//! [`ObjectRegistry`] is the [`HandleRegistry`] applied to arbitrary host
//! objects (actors, pooled instances, resources). On top of plain
//! register/resolve/unregister it supports [`cleanup_all()`], which tears
//! the whole table down at once and tells every subscribed listener which
//! handles went stale so dependents can drop cached copies.
//!
//! [`cleanup_all()`]: ObjectRegistry::cleanup_all

use cadence_core::{ArenaError, ConfigError, Handle};

use crate::config::ArenaConfig;
use crate::registry::HandleRegistry;

/// Callback invoked once per handle invalidated by a bulk cleanup.
pub type CleanupListener = Box<dyn FnMut(Handle)>;

/// Handle-addressed table of host objects.
pub struct ObjectRegistry<T> {
    objects: HandleRegistry<T>,
    listeners: Vec<CleanupListener>,
}

impl<T> ObjectRegistry<T> {
    /// Create an empty, unbounded registry.
    pub fn new() -> Self {
        Self {
            objects: HandleRegistry::new(),
            listeners: Vec::new(),
        }
    }

    /// Create an empty registry with the given arena configuration.
    pub fn with_config(config: &ArenaConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            objects: HandleRegistry::with_config(config)?,
            listeners: Vec::new(),
        })
    }

    /// Store `object` and return its handle.
    pub fn register(&mut self, object: T) -> Result<Handle, ArenaError> {
        self.objects.register(object)
    }

    /// Look up the object behind `handle`. `None` if stale.
    pub fn resolve(&self, handle: Handle) -> Option<&T> {
        self.objects.resolve(handle)
    }

    /// Mutable lookup. `None` if stale.
    pub fn resolve_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.objects.resolve_mut(handle)
    }

    /// Remove and return the object behind `handle`. `None` if stale.
    pub fn unregister(&mut self, handle: Handle) -> Option<T> {
        self.objects.unregister(handle)
    }

    /// Number of live objects.
    pub fn count(&self) -> usize {
        self.objects.count()
    }

    /// Iterate live objects with their handles.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Handle, &T)> {
        self.objects.iter()
    }

    /// Subscribe to bulk-cleanup notifications.
    pub fn add_cleanup_listener(&mut self, listener: impl FnMut(Handle) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Invalidate every handle and return the removed objects.
    ///
    /// Listeners are called once per invalidated handle, in iteration order,
    /// after the table is already empty.
    pub fn cleanup_all(&mut self) -> Vec<T> {
        let drained = self.objects.drain();
        tracing::debug!(count = drained.len(), "object registry cleanup");
        let mut objects = Vec::with_capacity(drained.len());
        for (handle, object) in drained {
            for listener in &mut self.listeners {
                listener(handle);
            }
            objects.push(object);
        }
        self.objects.shrink();
        objects
    }
}

impl<T> Default for ObjectRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn register_resolve_unregister() {
        let mut objects = ObjectRegistry::new();
        let h = objects.register(String::from("crate")).unwrap();
        assert_eq!(objects.resolve(h).map(String::as_str), Some("crate"));
        objects.resolve_mut(h).unwrap().push_str("s");
        assert_eq!(objects.unregister(h).as_deref(), Some("crates"));
        assert_eq!(objects.resolve(h), None);
    }

    #[test]
    fn cleanup_notifies_each_handle_and_returns_objects() {
        let mut objects = ObjectRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        objects.add_cleanup_listener(move |h| sink.borrow_mut().push(h));

        let a = objects.register(1u32).unwrap();
        let b = objects.register(2u32).unwrap();
        let c = objects.register(3u32).unwrap();
        objects.unregister(b);

        let removed = objects.cleanup_all();
        assert_eq!(removed, vec![1, 3]);
        assert_eq!(*seen.borrow(), vec![a, c]);
        assert_eq!(objects.count(), 0);
        assert_eq!(objects.resolve(a), None);
        assert_eq!(objects.resolve(c), None);
    }

    #[test]
    fn handles_after_cleanup_do_not_alias() {
        let mut objects = ObjectRegistry::new();
        let old = objects.register('x').unwrap();
        objects.cleanup_all();
        let new = objects.register('y').unwrap();
        assert_eq!(old.index(), new.index());
        assert_eq!(objects.resolve(old), None);
        assert_eq!(objects.resolve(new), Some(&'y'));
    }

    #[test]
    fn cleanup_of_empty_table_is_quiet() {
        let mut objects: ObjectRegistry<u8> = ObjectRegistry::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        objects.add_cleanup_listener(move |_| *counter.borrow_mut() += 1);
        assert!(objects.cleanup_all().is_empty());
        assert_eq!(*calls.borrow(), 0);
    }
}
