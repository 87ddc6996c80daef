//! In-memory backing store.
//!
//! `MemoryQueryFactory` keeps records in a shared map and serves sorted
//! queries over it. It is meant for prototyping and tests.
//!
//! Every record gets a key when it enters the store and keeps it until it is
//! removed, so items loaded by one query stay attached to their record while
//! other queries over the same store commit. Saving an item whose record has
//! since been removed fails with [`ContainerError::Source`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lazyquery_core::{ContainerError, Result};
use parking_lot::RwLock;

use super::definition::QueryDefinition;
use super::item::Item;
use super::value::PropertyValue;
use super::{Query, QueryFactory, SortCriteria};

/// One stored record: `(property id, value)` pairs.
pub type Record = Vec<(String, PropertyValue)>;

/// Checks a record before it is saved; `Err` carries the validation message.
pub type RecordValidator = Arc<dyn Fn(&Record) -> std::result::Result<(), String> + Send + Sync>;

fn value_of(record: &Record, id: &str) -> PropertyValue {
    record
        .iter()
        .find(|(key, _)| key == id)
        .map(|(_, value)| value.clone())
        .unwrap_or_default()
}

/// Writes `values` into `record`, keeping fields that `values` does not name.
fn merge(record: &mut Record, values: Record) {
    for (id, value) in values {
        match record.iter_mut().find(|(key, _)| *key == id) {
            Some((_, existing)) => *existing = value,
            None => record.push((id, value)),
        }
    }
}

#[derive(Default)]
struct Records {
    /// Keys are handed out in increasing order, so map order is storage order.
    rows: BTreeMap<u64, Record>,
    next_key: u64,
}

impl Records {
    fn push(&mut self, record: Record) {
        self.rows.insert(self.next_key, record);
        self.next_key += 1;
    }
}

#[derive(Default)]
struct Store {
    records: RwLock<Records>,
    load_calls: AtomicUsize,
}

/// A [`QueryFactory`] over records held in memory.
///
/// Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryQueryFactory {
    store: Arc<Store>,
    validator: Option<RecordValidator>,
}

impl MemoryQueryFactory {
    /// Creates a store holding `records`.
    pub fn new(records: Vec<Record>) -> Self {
        let mut rows = Records::default();
        for record in records {
            rows.push(record);
        }
        Self {
            store: Arc::new(Store {
                records: RwLock::new(rows),
                load_calls: AtomicUsize::new(0),
            }),
            validator: None,
        }
    }

    /// Sets a validator run on every added or modified record at save time.
    ///
    /// A failing record aborts the whole save with
    /// [`ContainerError::Validation`] before anything is written.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Record) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Returns a copy of the stored records in storage order.
    pub fn records(&self) -> Vec<Record> {
        self.store.records.read().rows.values().cloned().collect()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.store.records.read().rows.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.store.records.read().rows.is_empty()
    }

    /// Returns how many batch loads all queries of this store have served.
    pub fn load_calls(&self) -> usize {
        self.store.load_calls.load(Ordering::SeqCst)
    }
}

impl QueryFactory for MemoryQueryFactory {
    fn construct_query(
        &self,
        definition: &Arc<QueryDefinition>,
        sort: &SortCriteria,
    ) -> Box<dyn Query> {
        let records = self.store.records.read();
        let mut order: Vec<u64> = records.rows.keys().copied().collect();
        if !sort.is_empty() {
            // Stable, so equal keys keep storage order.
            order.sort_by(|a, b| sort.compare_by(&records.rows[a], &records.rows[b], value_of));
        }

        Box::new(MemoryQuery {
            definition: definition.clone(),
            store: self.store.clone(),
            validator: self.validator.clone(),
            order,
        })
    }
}

struct MemoryQuery {
    definition: Arc<QueryDefinition>,
    store: Arc<Store>,
    validator: Option<RecordValidator>,
    /// Record keys in query order.
    order: Vec<u64>,
}

impl MemoryQuery {
    fn validate(&self, items: &[Item]) -> Result<()> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        for item in items {
            validator(&item.values()).map_err(ContainerError::Validation)?;
        }
        Ok(())
    }
}

/// Returns the keys of `items`, failing if any item is not attached to a live record.
fn live_keys(records: &Records, items: &[Item]) -> Result<Vec<u64>> {
    items
        .iter()
        .map(|item| match item.key() {
            Some(key) if records.rows.contains_key(&key) => Ok(key),
            Some(key) => Err(ContainerError::source(format!("record {key} no longer exists"))),
            None => Err(ContainerError::source("item is not attached to a stored record")),
        })
        .collect()
}

impl Query for MemoryQuery {
    fn size(&self) -> usize {
        self.order.len()
    }

    fn load_items(&self, start: usize, count: usize) -> Result<Vec<Item>> {
        self.store.load_calls.fetch_add(1, Ordering::SeqCst);
        let records = self.store.records.read();
        let end = (start + count).min(self.order.len());

        self.order
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|&key| {
                let record = records.rows.get(&key).ok_or_else(|| {
                    ContainerError::source(format!("record {key} no longer exists"))
                })?;
                let item = record
                    .iter()
                    .fold(Item::with_key(&self.definition, key), |item, (id, value)| {
                        item.with_value(id, value.clone())
                    });
                Ok(item)
            })
            .collect()
    }

    fn construct_item(&self) -> Item {
        Item::new(&self.definition)
    }

    fn save_items(&mut self, added: &[Item], modified: &[Item], removed: &[Item]) -> Result<()> {
        self.validate(added)?;
        self.validate(modified)?;

        let mut records = self.store.records.write();
        let modified_keys = live_keys(&records, modified)?;
        let removed_keys = live_keys(&records, removed)?;

        for (key, item) in modified_keys.into_iter().zip(modified) {
            if let Some(record) = records.rows.get_mut(&key) {
                merge(record, item.values());
            }
        }
        for key in removed_keys {
            records.rows.remove(&key);
        }
        for item in added {
            records.push(item.values());
        }
        Ok(())
    }

    fn delete_all_items(&mut self) -> Result<()> {
        self.store.records.write().rows.clear();
        Ok(())
    }
}
