//! The view trait containers delegate to.

use lazyquery_core::Result;

use super::definition::QueryDefinition;
use super::item::Item;

/// The collaborator that owns a container's dataset.
///
/// A view is the sole source of truth for size, ordering and modification
/// state. Containers address it purely by position and add nothing on top
/// except identity mapping and notifications, so a view must answer every
/// call from its current state without relying on the container to cache.
///
/// All methods take `&self`; implementations use interior mutability.
///
/// # Implementation Requirements
///
/// - [`add_item`](QueryView::add_item) appends and returns the new position.
/// - [`commit`](QueryView::commit) and [`discard`](QueryView::discard) leave
///   the buffered state untouched when they fail.
/// - [`refresh`](QueryView::refresh) reloads from the backing store and may
///   reassign every position.
pub trait QueryView: Send + Sync {
    /// Returns the property schema.
    fn definition(&self) -> &QueryDefinition;

    /// Returns the number of visible items.
    fn size(&self) -> usize;

    /// Returns the item at `index`.
    fn item(&self, index: usize) -> Result<Item>;

    /// Changes the ordering of the dataset.
    fn sort(&self, property_ids: &[&str], ascending: &[bool]);

    /// Appends a new item and returns its position.
    fn add_item(&self) -> Result<usize>;

    /// Removes the item at `index`.
    fn remove_item(&self, index: usize) -> Result<()>;

    /// Removes every item from the backing store.
    fn remove_all_items(&self) -> Result<()>;

    /// Reloads state from the backing store.
    fn refresh(&self);

    /// Persists buffered changes.
    fn commit(&self) -> Result<()>;

    /// Drops buffered changes.
    fn discard(&self) -> Result<()>;

    /// Returns `true` if there are buffered changes.
    fn is_modified(&self) -> bool;
}
