//! The container capability surface.

use std::any::Any;

use lazyquery_core::{ContainerError, Result};

use super::identity::ItemId;
use crate::query::{Item, PropertyType, PropertyValue};

/// How edits reach the backing store.
///
/// Containers in this crate only support buffered editing: changes are held
/// until [`IndexedContainer::commit`] or [`IndexedContainer::discard`]. There
/// is no way to switch modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferingMode {
    /// Edits are buffered until commit.
    #[default]
    Buffered,
}

impl BufferingMode {
    /// Whether reads bypass the buffer. Always `false`.
    pub const fn is_read_through(self) -> bool {
        match self {
            BufferingMode::Buffered => false,
        }
    }

    /// Whether writes bypass the buffer. Always `false`.
    pub const fn is_write_through(self) -> bool {
        match self {
            BufferingMode::Buffered => false,
        }
    }
}

/// An ordered, indexable, append-only, buffered container.
///
/// Item identities are positions (see [`ItemId`]). Implementors provide the
/// positional and mutating operations; the identity mapping is provided.
///
/// There is deliberately no way to insert at a position, insert after an
/// identity, create an item with a caller-chosen identity, or change the
/// buffering mode.
///
/// # Notifications
///
/// Implementors notify item-set listeners once after [`add_item`],
/// [`remove_item`], [`remove_all_items`] and a successful [`commit`] or
/// [`discard`]. [`sort`] notifies nobody.
///
/// [`add_item`]: IndexedContainer::add_item
/// [`remove_item`]: IndexedContainer::remove_item
/// [`remove_all_items`]: IndexedContainer::remove_all_items
/// [`commit`]: IndexedContainer::commit
/// [`discard`]: IndexedContainer::discard
/// [`sort`]: IndexedContainer::sort
pub trait IndexedContainer {
    /// Returns the number of items, read from the current dataset.
    fn size(&self) -> usize;

    /// Returns the item named by `id`.
    ///
    /// Fails with [`ContainerError::IndexOutOfBounds`] outside `[0, size())`.
    fn item(&self, id: ItemId) -> Result<Item>;

    /// Returns the property ids in schema order.
    fn container_property_ids(&self) -> Vec<String>;

    /// Returns the ids of sortable properties in schema order.
    fn sortable_container_property_ids(&self) -> Vec<String>;

    /// Returns the type of a property, or `None` if it is unknown.
    fn property_type(&self, property_id: &str) -> Option<PropertyType>;

    /// Appends a new item and returns its identity.
    fn add_item(&self) -> Result<ItemId>;

    /// Removes the item named by `id`.
    fn remove_item(&self, id: ItemId) -> Result<()>;

    /// Removes every item from the backing store.
    fn remove_all_items(&self) -> Result<()>;

    /// Reorders the items. Identities are reassigned.
    fn sort(&self, property_ids: &[&str], ascending: &[bool]);

    /// Persists buffered changes.
    fn commit(&self) -> Result<()>;

    /// Drops buffered changes.
    fn discard(&self) -> Result<()>;

    /// Returns `true` if there are buffered changes.
    fn is_modified(&self) -> bool;

    /// Returns every identity in order: `[0, 1, ..., size() - 1]`.
    fn item_ids(&self) -> Vec<ItemId> {
        (0..self.size()).map(ItemId::from).collect()
    }

    /// Returns the identity of the item at `index`.
    fn id_by_index(&self, index: usize) -> ItemId {
        ItemId::from(index)
    }

    /// Returns the position of an identity-shaped candidate.
    ///
    /// The position is not checked against the size. Candidates that are not
    /// identity-shaped yield `None`.
    fn index_of_id(&self, candidate: &dyn Any) -> Option<i64> {
        ItemId::from_any(candidate).map(ItemId::index)
    }

    /// Returns `true` if `candidate` is identity-shaped and in range.
    fn contains_id(&self, candidate: &dyn Any) -> bool {
        ItemId::from_any(candidate).is_some_and(|id| id.position(self.size()).is_some())
    }

    /// Returns `true` if `candidate` names the first item.
    fn is_first_id(&self, candidate: &dyn Any) -> bool {
        self.size() > 0 && ItemId::from_any(candidate).is_some_and(|id| id.index() == 0)
    }

    /// Returns `true` if `candidate` names the last item.
    fn is_last_id(&self, candidate: &dyn Any) -> bool {
        let size = self.size();
        size > 0 && ItemId::from_any(candidate).is_some_and(|id| id.index() == size as i64 - 1)
    }

    /// Returns the identity of the first item. Always position `0`.
    fn first_item_id(&self) -> ItemId {
        ItemId::new(0)
    }

    /// Returns the identity of the last item; position `-1` when empty.
    fn last_item_id(&self) -> ItemId {
        ItemId::new(self.size() as i64 - 1)
    }

    /// Returns `id + 1`, which may be out of range.
    fn next_item_id(&self, id: ItemId) -> ItemId {
        id.next()
    }

    /// Returns `id - 1`, which may be out of range.
    fn prev_item_id(&self, id: ItemId) -> ItemId {
        id.prev()
    }

    /// Returns one property value of the item named by `id`.
    fn container_property(&self, id: ItemId, property_id: &str) -> Result<PropertyValue> {
        self.item(id)?
            .property(property_id)
            .ok_or_else(|| ContainerError::UnknownProperty(property_id.to_string()))
    }

    /// Returns the buffering mode. Always [`BufferingMode::Buffered`].
    fn buffering_mode(&self) -> BufferingMode {
        BufferingMode::Buffered
    }

    /// Always `false`.
    fn is_read_through(&self) -> bool {
        self.buffering_mode().is_read_through()
    }

    /// Always `false`.
    fn is_write_through(&self) -> bool {
        self.buffering_mode().is_write_through()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryDefinition;

    /// Positions only; every mutation is a no-op.
    struct Fixed(usize);

    impl IndexedContainer for Fixed {
        fn size(&self) -> usize {
            self.0
        }
        fn item(&self, id: ItemId) -> Result<Item> {
            id.position(self.0)
                .map(|_| Item::new(&QueryDefinition::new()))
                .ok_or_else(|| ContainerError::out_of_bounds(id.index(), self.0))
        }
        fn container_property_ids(&self) -> Vec<String> {
            Vec::new()
        }
        fn sortable_container_property_ids(&self) -> Vec<String> {
            Vec::new()
        }
        fn property_type(&self, _: &str) -> Option<PropertyType> {
            None
        }
        fn add_item(&self) -> Result<ItemId> {
            Ok(ItemId::from(self.0))
        }
        fn remove_item(&self, _: ItemId) -> Result<()> {
            Ok(())
        }
        fn remove_all_items(&self) -> Result<()> {
            Ok(())
        }
        fn sort(&self, _: &[&str], _: &[bool]) {}
        fn commit(&self) -> Result<()> {
            Ok(())
        }
        fn discard(&self) -> Result<()> {
            Ok(())
        }
        fn is_modified(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_item_ids_enumerate_positions() {
        assert!(Fixed(0).item_ids().is_empty());
        let ids: Vec<i64> = Fixed(4).item_ids().into_iter().map(ItemId::index).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(Fixed(4).id_by_index(2), ItemId::new(2));
    }

    #[test]
    fn test_tolerant_predicates() {
        let c = Fixed(3);
        assert!(c.contains_id(&0i64));
        assert!(c.contains_id(&ItemId::new(2)));
        assert!(!c.contains_id(&3usize));
        assert!(!c.contains_id(&-1i32));
        assert!(!c.contains_id(&"1"));
        assert!(!c.contains_id(&None::<ItemId>));

        assert_eq!(c.index_of_id(&"not-an-identity"), None);
        assert_eq!(c.index_of_id(&42i64), Some(42));
    }

    #[test]
    fn test_boundaries() {
        let c = Fixed(3);
        assert!(c.is_first_id(&ItemId::new(0)));
        assert!(c.is_last_id(&ItemId::new(2)));
        assert!(!c.is_last_id(&ItemId::new(0)));
        assert!(!c.is_first_id(&"0"));
        assert_eq!(c.last_item_id(), ItemId::new(2));

        let empty = Fixed(0);
        assert!(!empty.is_first_id(&ItemId::new(0)));
        assert!(!empty.is_last_id(&ItemId::new(-1)));
        assert_eq!(empty.first_item_id(), ItemId::new(0));
        assert_eq!(empty.last_item_id(), ItemId::new(-1));
    }

    #[test]
    fn test_neighbors_are_unchecked() {
        let c = Fixed(1);
        assert_eq!(c.next_item_id(ItemId::new(0)), ItemId::new(1));
        assert_eq!(c.prev_item_id(ItemId::new(0)), ItemId::new(-1));
        assert!(!c.contains_id(&c.next_item_id(ItemId::new(0))));
    }

    #[test]
    fn test_buffering_is_fixed() {
        let c = Fixed(1);
        assert_eq!(c.buffering_mode(), BufferingMode::Buffered);
        assert!(!c.is_read_through());
        assert!(!c.is_write_through());
    }

    #[test]
    fn test_container_property_errors() {
        let c = Fixed(1);
        assert_eq!(
            c.container_property(ItemId::new(0), "missing"),
            Err(ContainerError::UnknownProperty("missing".into()))
        );
        assert_eq!(
            c.container_property(ItemId::new(5), "missing"),
            Err(ContainerError::out_of_bounds(5, 1))
        );
    }
}
