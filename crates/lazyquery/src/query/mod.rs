//! Queries, views and the property schema.
//!
//! A container never talks to a backing store directly. It owns a
//! [`QueryView`], which in turn reaches the store through a [`Query`] built by
//! a [`QueryFactory`]:
//!
//! ```text
//! ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    ┌─────────┐
//! │   Container   │───>│   QueryView   │───>│ QueryFactory │───>│  Query  │
//! │ (identities)  │    │ (batch cache, │    │              │    │ (store) │
//! │               │    │  buffering)   │    └──────────────┘    └─────────┘
//! └───────────────┘    └───────────────┘
//!         │                    │
//!         └──── QueryDefinition (property schema) ────┘
//! ```
//!
//! # Core Types
//!
//! - [`QueryDefinition`]: Ordered property descriptors
//! - [`Item`]: Shared handle to one record
//! - [`QueryView`]: What a container delegates to
//! - [`LazyQueryView`]: Default view loading items in batches
//! - [`Query`] / [`QueryFactory`]: Backing-store access
//! - [`MemoryQueryFactory`]: In-memory backing store

mod definition;
mod item;
mod lazy_view;
mod memory;
mod value;
mod view;

use std::cmp::Ordering;
use std::sync::Arc;

use lazyquery_core::{ContainerError, Result};

pub use definition::{PropertyDescriptor, QueryDefinition};
pub use item::Item;
pub use lazy_view::LazyQueryView;
pub use memory::{MemoryQueryFactory, Record, RecordValidator};
pub use value::{PropertyType, PropertyValue};
pub use view::QueryView;

/// One sort key: a property and its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// The property to sort on.
    pub property_id: String,
    /// `true` for ascending order.
    pub ascending: bool,
}

/// Ordered sort keys handed to a [`QueryFactory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortCriteria {
    keys: Vec<SortKey>,
}

impl SortCriteria {
    /// Pairs property ids with direction flags.
    ///
    /// A property without a matching flag sorts ascending; surplus flags are
    /// ignored.
    pub fn new(property_ids: &[&str], ascending: &[bool]) -> Self {
        let keys = property_ids
            .iter()
            .enumerate()
            .map(|(i, id)| SortKey {
                property_id: (*id).to_string(),
                ascending: ascending.get(i).copied().unwrap_or(true),
            })
            .collect();
        Self { keys }
    }

    /// Returns the sort keys in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns `true` if no sort keys are set.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compares two items key by key.
    pub fn compare_items(&self, a: &Item, b: &Item) -> Ordering {
        self.compare_by(a, b, |item, id| item.property(id).unwrap_or_default())
    }

    /// Compares two records key by key, reading values through `value_of`.
    pub fn compare_by<T>(
        &self,
        a: &T,
        b: &T,
        value_of: impl Fn(&T, &str) -> PropertyValue,
    ) -> Ordering {
        for key in &self.keys {
            let ordering = value_of(a, &key.property_id).sort_cmp(&value_of(b, &key.property_id));
            let ordering = if key.ascending { ordering } else { ordering.reverse() };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Access to one sorted result set of a backing store.
///
/// A query is constructed for a fixed sort order and answers size and range
/// requests against it. Read-only stores only implement the required methods;
/// the saving methods then report [`ContainerError::Unsupported`].
pub trait Query: Send {
    /// Returns the number of items in the result set.
    fn size(&self) -> usize;

    /// Loads `count` items starting at `start`.
    fn load_items(&self, start: usize, count: usize) -> Result<Vec<Item>>;

    /// Constructs a new, unsaved item with default values.
    fn construct_item(&self) -> Item;

    /// Persists buffered changes in one batch.
    fn save_items(&mut self, _added: &[Item], _modified: &[Item], _removed: &[Item]) -> Result<()> {
        Err(ContainerError::Unsupported("save_items"))
    }

    /// Deletes every item in the backing store.
    fn delete_all_items(&mut self) -> Result<()> {
        Err(ContainerError::Unsupported("delete_all_items"))
    }
}

/// Builds queries for a definition and sort order.
pub trait QueryFactory: Send + Sync {
    /// Constructs a query reflecting the current store contents.
    fn construct_query(
        &self,
        definition: &Arc<QueryDefinition>,
        sort: &SortCriteria,
    ) -> Box<dyn Query>;
}
