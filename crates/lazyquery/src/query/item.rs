//! Items: the records exposed by a view.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lazyquery_core::{ContainerError, Result};
use parking_lot::RwLock;

use super::definition::QueryDefinition;
use super::value::{PropertyType, PropertyValue};

struct ItemProperty {
    id: String,
    property_type: PropertyType,
    read_only: bool,
    value: PropertyValue,
}

struct ItemInner {
    properties: RwLock<Vec<ItemProperty>>,
    /// Backing-store key assigned by the query that produced the item.
    key: Option<u64>,
    modified: AtomicBool,
}

/// A shared handle to one record.
///
/// Cloning an `Item` clones the handle, not the record: edits made through any
/// clone are visible through all of them and mark the record modified until
/// the owning view commits or discards.
///
/// # Example
///
/// ```
/// use lazyquery::query::{Item, PropertyDescriptor, PropertyType, QueryDefinition};
///
/// let definition = QueryDefinition::new()
///     .with_property(PropertyDescriptor::new("name", PropertyType::String, ""));
///
/// let item = Item::new(&definition).with_value("name", "Alice");
/// assert!(!item.is_modified());
///
/// item.set_property("name", "Bob").unwrap();
/// assert!(item.is_modified());
/// ```
#[derive(Clone)]
pub struct Item {
    inner: Arc<ItemInner>,
}

impl Item {
    /// Creates an item holding the definition's default values.
    pub fn new(definition: &QueryDefinition) -> Self {
        Self::build(definition, None)
    }

    /// Creates an item carrying a backing-store key.
    pub fn with_key(definition: &QueryDefinition, key: u64) -> Self {
        Self::build(definition, Some(key))
    }

    fn build(definition: &QueryDefinition, key: Option<u64>) -> Self {
        let properties = definition
            .descriptors()
            .into_iter()
            .map(|d| ItemProperty {
                id: d.id,
                property_type: d.property_type,
                read_only: d.read_only,
                value: d.default_value,
            })
            .collect();
        Self {
            inner: Arc::new(ItemInner {
                properties: RwLock::new(properties),
                key,
                modified: AtomicBool::new(false),
            }),
        }
    }

    /// Initializes a property value as loaded from the backing store.
    ///
    /// Bypasses read-only checks and does not mark the item modified. Unknown
    /// property ids are ignored.
    pub fn with_value(self, id: &str, value: impl Into<PropertyValue>) -> Self {
        if let Some(property) = self.inner.properties.write().iter_mut().find(|p| p.id == id) {
            property.value = value.into();
        }
        self
    }

    /// Returns the backing-store key, if the item was loaded from a store.
    pub fn key(&self) -> Option<u64> {
        self.inner.key
    }

    /// Returns the value of a property.
    pub fn property(&self, id: &str) -> Option<PropertyValue> {
        self.inner
            .properties
            .read()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.value.clone())
    }

    /// Returns the property ids of this item.
    pub fn property_ids(&self) -> Vec<String> {
        self.inner.properties.read().iter().map(|p| p.id.clone()).collect()
    }

    /// Returns all `(id, value)` pairs.
    pub fn values(&self) -> Vec<(String, PropertyValue)> {
        self.inner
            .properties
            .read()
            .iter()
            .map(|p| (p.id.clone(), p.value.clone()))
            .collect()
    }

    /// Writes a property value.
    ///
    /// Fails for unknown or read-only properties and for values whose type
    /// does not match the declared type. Writing an equal value is accepted
    /// but does not mark the item modified.
    pub fn set_property(&self, id: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let value = value.into();
        let mut properties = self.inner.properties.write();
        let property = properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ContainerError::UnknownProperty(id.to_string()))?;

        if property.read_only {
            return Err(ContainerError::ReadOnlyProperty(id.to_string()));
        }
        if !value.fits(property.property_type) {
            return Err(ContainerError::validation(format!(
                "property '{id}' expects {}",
                property.property_type
            )));
        }

        if property.value != value {
            property.value = value;
            self.inner.modified.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    /// Returns `true` if a property was written since load or the last commit.
    pub fn is_modified(&self) -> bool {
        self.inner.modified.load(Ordering::SeqCst)
    }

    /// Clears the modified flag. Views call this once buffered edits are saved.
    pub fn mark_unmodified(&self) {
        self.inner.modified.store(false, Ordering::SeqCst);
    }

    /// Returns `true` if both handles refer to the same record.
    pub fn ptr_eq(&self, other: &Item) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("key", &self.inner.key)
            .field("values", &self.values())
            .field("modified", &self.is_modified())
            .finish()
    }
}

static_assertions::assert_impl_all!(Item: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PropertyDescriptor;

    fn definition() -> QueryDefinition {
        QueryDefinition::new()
            .with_property(PropertyDescriptor::new("id", PropertyType::Int, 0).with_read_only(true))
            .with_property(PropertyDescriptor::new("name", PropertyType::String, "unnamed"))
    }

    #[test]
    fn test_defaults_and_loaded_values() {
        let definition = definition();
        let fresh = Item::new(&definition);
        assert_eq!(fresh.property("name"), Some(PropertyValue::from("unnamed")));
        assert_eq!(fresh.key(), None);

        let loaded = Item::with_key(&definition, 7).with_value("id", 7).with_value("bogus", 1);
        assert_eq!(loaded.property("id"), Some(PropertyValue::Int(7)));
        assert_eq!(loaded.property("bogus"), None);
        assert_eq!(loaded.key(), Some(7));
        assert!(!loaded.is_modified());
    }

    #[test]
    fn test_set_property_rules() {
        let item = Item::new(&definition());

        assert_eq!(
            item.set_property("id", 3),
            Err(ContainerError::ReadOnlyProperty("id".into()))
        );
        assert_eq!(
            item.set_property("age", 3),
            Err(ContainerError::UnknownProperty("age".into()))
        );
        assert!(matches!(item.set_property("name", 3), Err(ContainerError::Validation(_))));
        assert!(!item.is_modified());

        item.set_property("name", "unnamed").unwrap();
        assert!(!item.is_modified());

        item.set_property("name", "Ada").unwrap();
        assert!(item.is_modified());

        item.mark_unmodified();
        assert!(!item.is_modified());
        assert_eq!(item.property("name"), Some(PropertyValue::from("Ada")));
    }

    #[test]
    fn test_clones_share_record() {
        let item = Item::new(&definition());
        let other = item.clone();
        other.set_property("name", "shared").unwrap();

        assert!(item.ptr_eq(&other));
        assert!(item.is_modified());
        assert_eq!(item.property("name"), Some(PropertyValue::from("shared")));
        assert!(!item.ptr_eq(&Item::new(&definition())));
    }
}
