//! Default view: batch loading with buffered edits.
//!
//! `LazyQueryView` fetches items from its [`Query`] in aligned batches the
//! first time any item of a batch is requested, and keeps loaded items for the
//! lifetime of the query. Structural edits are buffered:
//!
//! - Added items are appended after the persisted ones.
//! - Removed persisted items are hidden and remembered for the next commit.
//! - Property edits live on the cached [`Item`] handles.
//!
//! Commit hands all three sets to [`Query::save_items`]; discard and refresh
//! drop them. Sorting reconstructs the query and therefore also drops
//! buffered changes.
//!
//! When properties are added to or removed from the definition, unmodified
//! cached items are dropped and reloaded in the new shape on next access.
//! Modified items keep their old shape until commit or discard.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use lazyquery_core::logging::targets;
use lazyquery_core::{ContainerError, Result};
use parking_lot::Mutex;

use super::definition::QueryDefinition;
use super::item::Item;
use super::view::QueryView;
use super::{Query, QueryFactory, SortCriteria};

struct ViewState {
    sort: SortCriteria,
    query: Box<dyn Query>,
    /// Size reported by the current query.
    query_size: usize,
    /// Loaded items keyed by query position.
    loaded: HashMap<usize, Item>,
    /// Items appended since the last refresh.
    added: Vec<Item>,
    /// Persisted items hidden since the last refresh, keyed by query position.
    removed: BTreeMap<usize, Item>,
    /// Definition revision the cached items were built against.
    revision: u64,
}

impl ViewState {
    fn persisted_visible(&self) -> usize {
        self.query_size - self.removed.len()
    }

    fn visible_size(&self) -> usize {
        self.persisted_visible() + self.added.len()
    }

    /// Maps a visible position among persisted items to a query position.
    fn query_index(&self, visible: usize) -> usize {
        let mut index = visible;
        for &removed in self.removed.keys() {
            if removed <= index {
                index += 1;
            } else {
                break;
            }
        }
        index
    }

    fn clear_buffers(&mut self) {
        self.loaded.clear();
        self.added.clear();
        self.removed.clear();
    }
}

/// A [`QueryView`] that loads items lazily in batches of `batch_size`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use lazyquery::query::{
///     LazyQueryView, MemoryQueryFactory, PropertyDescriptor, PropertyType, QueryDefinition,
///     QueryView,
/// };
///
/// let factory = Arc::new(MemoryQueryFactory::new(vec![
///     vec![("name".to_string(), "Alice".into())],
///     vec![("name".to_string(), "Bob".into())],
/// ]));
/// let definition = Arc::new(
///     QueryDefinition::new()
///         .with_property(PropertyDescriptor::new("name", PropertyType::String, "")),
/// );
///
/// let view = LazyQueryView::with_definition(definition, factory, 25);
/// assert_eq!(view.size(), 2);
/// assert_eq!(view.item(1).unwrap().property("name").unwrap().as_str(), Some("Bob"));
/// ```
pub struct LazyQueryView {
    definition: Arc<QueryDefinition>,
    factory: Arc<dyn QueryFactory>,
    batch_size: usize,
    state: Mutex<ViewState>,
}

impl LazyQueryView {
    /// Creates a view over an empty definition.
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn new(factory: Arc<dyn QueryFactory>, batch_size: usize) -> Self {
        Self::with_definition(Arc::new(QueryDefinition::new()), factory, batch_size)
    }

    /// Creates a view over an explicit definition.
    pub fn with_definition(
        definition: Arc<QueryDefinition>,
        factory: Arc<dyn QueryFactory>,
        batch_size: usize,
    ) -> Self {
        let sort = SortCriteria::default();
        let query = factory.construct_query(&definition, &sort);
        let query_size = query.size();
        let revision = definition.revision();
        Self {
            definition,
            factory,
            batch_size: batch_size.max(1),
            state: Mutex::new(ViewState {
                sort,
                query,
                query_size,
                loaded: HashMap::new(),
                added: Vec::new(),
                removed: BTreeMap::new(),
                revision,
            }),
        }
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the current sort criteria.
    pub fn sort_criteria(&self) -> SortCriteria {
        self.state.lock().sort.clone()
    }

    /// Returns the number of loaded persisted items.
    pub fn loaded_count(&self) -> usize {
        self.state.lock().loaded.len()
    }

    fn reload(&self, state: &mut ViewState) {
        state.query = self.factory.construct_query(&self.definition, &state.sort);
        state.query_size = state.query.size();
        state.revision = self.definition.revision();
        state.clear_buffers();
    }

    /// Drops unmodified cached items built against an older definition.
    fn sync_definition(&self, state: &mut ViewState) {
        let revision = self.definition.revision();
        if revision != state.revision {
            state.loaded.retain(|_, item| item.is_modified());
            state.revision = revision;
        }
    }

    /// Returns the persisted item at `query_index`, loading its batch if needed.
    fn load(&self, state: &mut ViewState, query_index: usize) -> Result<Item> {
        self.sync_definition(state);
        if let Some(item) = state.loaded.get(&query_index) {
            return Ok(item.clone());
        }

        let start = query_index / self.batch_size * self.batch_size;
        let count = self.batch_size.min(state.query_size - start);
        tracing::trace!(target: targets::VIEW, start, count, "loading batch");

        let batch = state.query.load_items(start, count)?;
        for (offset, item) in batch.into_iter().enumerate() {
            state.loaded.entry(start + offset).or_insert(item);
        }

        state.loaded.get(&query_index).cloned().ok_or_else(|| {
            ContainerError::source(format!(
                "query returned no item for position {query_index} in batch starting at {start}"
            ))
        })
    }
}

impl QueryView for LazyQueryView {
    fn definition(&self) -> &QueryDefinition {
        &self.definition
    }

    fn size(&self) -> usize {
        self.state.lock().visible_size()
    }

    fn item(&self, index: usize) -> Result<Item> {
        let mut state = self.state.lock();
        let persisted = state.persisted_visible();
        if index < persisted {
            let query_index = state.query_index(index);
            self.load(&mut state, query_index)
        } else {
            state
                .added
                .get(index - persisted)
                .cloned()
                .ok_or_else(|| ContainerError::out_of_bounds(index as i64, state.visible_size()))
        }
    }

    fn sort(&self, property_ids: &[&str], ascending: &[bool]) {
        let mut state = self.state.lock();
        state.sort = SortCriteria::new(property_ids, ascending);
        self.reload(&mut state);
    }

    fn add_item(&self) -> Result<usize> {
        let mut state = self.state.lock();
        let item = state.query.construct_item();
        state.added.push(item);
        Ok(state.visible_size() - 1)
    }

    fn remove_item(&self, index: usize) -> Result<()> {
        let mut state = self.state.lock();
        let persisted = state.persisted_visible();
        if index < persisted {
            let query_index = state.query_index(index);
            let item = self.load(&mut state, query_index)?;
            state.removed.insert(query_index, item);
            Ok(())
        } else if index - persisted < state.added.len() {
            state.added.remove(index - persisted);
            Ok(())
        } else {
            Err(ContainerError::out_of_bounds(index as i64, state.visible_size()))
        }
    }

    fn remove_all_items(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.query.delete_all_items()?;
        self.reload(&mut state);
        Ok(())
    }

    fn refresh(&self) {
        let mut state = self.state.lock();
        self.reload(&mut state);
    }

    fn commit(&self) -> Result<()> {
        let mut state = self.state.lock();
        let modified: Vec<Item> = state
            .loaded
            .iter()
            .filter(|(index, item)| item.is_modified() && !state.removed.contains_key(*index))
            .map(|(_, item)| item.clone())
            .collect();
        let removed: Vec<Item> = state.removed.values().cloned().collect();
        let added = state.added.clone();

        tracing::debug!(
            target: targets::VIEW,
            added = added.len(),
            modified = modified.len(),
            removed = removed.len(),
            "saving buffered changes"
        );
        state.query.save_items(&added, &modified, &removed)?;

        for item in added.iter().chain(&modified) {
            item.mark_unmodified();
        }
        self.reload(&mut state);
        Ok(())
    }

    fn discard(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.clear_buffers();
        Ok(())
    }

    fn is_modified(&self) -> bool {
        let state = self.state.lock();
        !state.added.is_empty()
            || !state.removed.is_empty()
            || state.loaded.values().any(Item::is_modified)
    }
}

static_assertions::assert_impl_all!(LazyQueryView: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MemoryQueryFactory, PropertyDescriptor, PropertyType, PropertyValue};

    fn numbered(count: i64) -> Arc<MemoryQueryFactory> {
        Arc::new(MemoryQueryFactory::new(
            (0..count).map(|n| vec![("n".to_string(), PropertyValue::Int(n))]).collect(),
        ))
    }

    fn view(count: i64, batch_size: usize) -> (LazyQueryView, Arc<MemoryQueryFactory>) {
        let factory = numbered(count);
        let definition = Arc::new(
            QueryDefinition::new()
                .with_property(
                    PropertyDescriptor::new("n", PropertyType::Int, -1).with_sortable(true),
                ),
        );
        (LazyQueryView::with_definition(definition, factory.clone(), batch_size), factory)
    }

    fn n(view: &LazyQueryView, index: usize) -> i64 {
        view.item(index).unwrap().property("n").and_then(|v| v.as_int()).unwrap()
    }

    #[test]
    fn test_loads_aligned_batches() {
        let (view, factory) = view(10, 4);
        assert_eq!(view.size(), 10);
        assert_eq!(view.loaded_count(), 0);

        assert_eq!(n(&view, 5), 5);
        assert_eq!(view.loaded_count(), 4);
        assert_eq!(factory.load_calls(), 1);

        assert_eq!(n(&view, 6), 6);
        assert_eq!(factory.load_calls(), 1);

        // Last batch is short.
        assert_eq!(n(&view, 9), 9);
        assert_eq!(view.loaded_count(), 6);
        assert_eq!(factory.load_calls(), 2);
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let (view, _) = view(3, 0);
        assert_eq!(view.batch_size(), 1);
        assert_eq!(n(&view, 2), 2);
        assert_eq!(view.loaded_count(), 1);
    }

    #[test]
    fn test_removed_items_shift_positions() {
        let (view, _) = view(5, 2);
        view.remove_item(1).unwrap();
        view.remove_item(2).unwrap(); // originally 3

        assert_eq!(view.size(), 3);
        assert_eq!((n(&view, 0), n(&view, 1), n(&view, 2)), (0, 2, 4));
        assert!(view.is_modified());
    }

    #[test]
    fn test_added_items_follow_persisted() {
        let (view, _) = view(2, 10);
        assert_eq!(view.add_item().unwrap(), 2);
        assert_eq!(view.add_item().unwrap(), 3);
        assert_eq!(n(&view, 3), -1);

        view.remove_item(2).unwrap();
        assert_eq!(view.size(), 3);
        assert!(matches!(
            view.item(3),
            Err(ContainerError::IndexOutOfBounds { index: 3, size: 3 })
        ));
        assert!(view.remove_item(3).is_err());
    }

    #[test]
    fn test_commit_persists_and_discard_reverts() {
        let (view, factory) = view(3, 10);
        view.item(0).unwrap().set_property("n", 100).unwrap();
        view.remove_item(1).unwrap();
        let added = view.add_item().unwrap();
        view.item(added).unwrap().set_property("n", 7).unwrap();

        view.commit().unwrap();
        assert!(!view.is_modified());

        view.refresh();
        let values: Vec<_> = (0..view.size()).map(|i| n(&view, i)).collect();
        assert_eq!(values, vec![100, 2, 7]);
        assert_eq!(factory.len(), 3);

        view.item(0).unwrap().set_property("n", 5).unwrap();
        assert!(view.is_modified());
        view.discard().unwrap();
        assert!(!view.is_modified());
        assert_eq!(n(&view, 0), 100);
    }

    #[test]
    fn test_sort_reorders() {
        let (view, _) = view(4, 2);
        view.sort(&["n"], &[false]);
        assert_eq!(view.sort_criteria(), SortCriteria::new(&["n"], &[false]));
        assert_eq!((n(&view, 0), n(&view, 3)), (3, 0));
    }

    #[test]
    fn test_remove_all_items_clears_store() {
        let (view, factory) = view(4, 2);
        view.add_item().unwrap();
        view.remove_all_items().unwrap();
        assert_eq!(view.size(), 0);
        assert!(factory.is_empty());
        assert!(!view.is_modified());
    }

    #[test]
    fn test_definition_change_reshapes_cached_items() {
        let (view, factory) = view(3, 10);
        view.item(0).unwrap().set_property("n", 50).unwrap();
        assert_eq!(view.item(1).unwrap().property("flag"), None);

        view.definition().add_property("flag", PropertyType::Bool, true, false, false);

        assert_eq!(view.item(1).unwrap().property("flag"), Some(PropertyValue::Bool(true)));
        assert_eq!(factory.load_calls(), 2);
        // Buffered edits survive.
        assert_eq!(n(&view, 0), 50);
        assert!(view.is_modified());
    }
}
