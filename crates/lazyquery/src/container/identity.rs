//! Item identities.
//!
//! Identities are positional: `ItemId::Indexed(i)` names whatever record sits
//! at position `i` right now. Sorting, adding, removing and refreshing may make
//! the same identity refer to a different record.
//!
//! # Tolerant and strict lookups
//!
//! Presentation layers tend to pass back whatever key they hold, so the
//! boundary predicates of [`IndexedContainer`](super::IndexedContainer)
//! accept any `&dyn Any` and match it with [`ItemId::from_any`]. A candidate
//! that is not integer-typed simply yields "not found" or `false`.
//! Operations that read or mutate a specific item take an `ItemId` and report
//! bad positions as errors.

use std::any::Any;
use std::fmt;

/// Identity of an item in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemId {
    /// The item at this position.
    Indexed(i64),
}

impl ItemId {
    /// Creates an identity for a position.
    pub const fn new(index: i64) -> Self {
        ItemId::Indexed(index)
    }

    /// Returns the raw position, which may be outside the container.
    pub const fn index(self) -> i64 {
        match self {
            ItemId::Indexed(index) => index,
        }
    }

    /// Returns the position if it lies in `[0, size)`.
    pub fn position(self, size: usize) -> Option<usize> {
        usize::try_from(self.index()).ok().filter(|&index| index < size)
    }

    /// The following identity. Not clamped.
    pub const fn next(self) -> Self {
        ItemId::Indexed(self.index() + 1)
    }

    /// The preceding identity. Not clamped.
    pub const fn prev(self) -> Self {
        ItemId::Indexed(self.index() - 1)
    }

    /// Matches an arbitrary candidate against the identity shapes.
    ///
    /// `ItemId`, `Some(ItemId)` and the integer types `i64`, `i32` and
    /// `usize` are recognized. Everything else, including `None::<ItemId>`,
    /// yields `None`.
    pub fn from_any(candidate: &dyn Any) -> Option<ItemId> {
        if let Some(id) = candidate.downcast_ref::<ItemId>() {
            Some(*id)
        } else if let Some(id) = candidate.downcast_ref::<Option<ItemId>>() {
            *id
        } else if let Some(&index) = candidate.downcast_ref::<i64>() {
            Some(ItemId::Indexed(index))
        } else if let Some(&index) = candidate.downcast_ref::<i32>() {
            Some(ItemId::Indexed(i64::from(index)))
        } else if let Some(&index) = candidate.downcast_ref::<usize>() {
            i64::try_from(index).ok().map(ItemId::Indexed)
        } else {
            None
        }
    }
}

/// Positions above `i64::MAX` saturate; they are out of range for any container.
impl From<usize> for ItemId {
    fn from(index: usize) -> Self {
        ItemId::Indexed(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<i64> for ItemId {
    fn from(index: i64) -> Self {
        ItemId::Indexed(index)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}
