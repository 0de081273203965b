//! Packed `{serial, index}` handles.
//!
//! A [`Handle`] is a weak reference into a registry slot. It carries no
//! ownership: every use must be revalidated against the registry, which
//! compares the handle's serial with the serial stamped on the slot's
//! current occupant.

use std::fmt;

/// Number of bits reserved for the slot index.
pub const INDEX_BITS: u32 = 24;

/// Number of bits reserved for the serial number.
pub const SERIAL_BITS: u32 = 40;

/// Largest representable slot index (exclusive bound is `MAX_INDEX + 1`).
pub const MAX_INDEX: u32 = (1 << INDEX_BITS) - 1;

/// Largest representable serial number.
pub const MAX_SERIAL: u64 = (1 << SERIAL_BITS) - 1;

/// Handle encoding: upper 40 bits = serial, lower 24 bits = slot index.
const fn encode(serial: u64, index: u32) -> u64 {
    (serial << INDEX_BITS) | index as u64
}

const fn decode(raw: u64) -> (u64, u32) {
    (raw >> INDEX_BITS, (raw & MAX_INDEX as u64) as u32)
}

/// Opaque reference to a registry slot.
///
/// `Handle::NONE` (all zero bits) is never issued by a registry, because
/// serial counters start at 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// The reserved "no handle" value. Never resolves.
    pub const NONE: Self = Self(0);

    /// Build a handle from its parts.
    ///
    /// # Panics
    ///
    /// Panics if `serial` exceeds 40 bits or `index` exceeds 24 bits.
    pub fn new(serial: u64, index: u32) -> Self {
        assert!(serial <= MAX_SERIAL, "handle serial {serial} exceeds 40 bits");
        assert!(index <= MAX_INDEX, "handle index {index} exceeds 24 bits");
        Self(encode(serial, index))
    }

    /// Reinterpret a packed 64-bit value as a handle.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The packed 64-bit representation.
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Serial number stamped at registration time.
    pub const fn serial(self) -> u64 {
        decode(self.0).0
    }

    /// Slot index inside the backing arena.
    pub const fn index(self) -> u32 {
        decode(self.0).1
    }

    /// Whether this is the reserved [`Handle::NONE`] value.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(serial={}, index={})", self.serial(), self.index())
    }
}

impl From<Handle> for u64 {
    fn from(h: Handle) -> Self {
        h.to_raw()
    }
}
