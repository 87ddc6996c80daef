//! Query definitions: the property schema shared by a view and its queries.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::value::{PropertyType, PropertyValue};

/// Metadata describing one property of every item.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Unique property id.
    pub id: String,
    /// Declared value type.
    pub property_type: PropertyType,
    /// Value given to newly constructed items.
    pub default_value: PropertyValue,
    /// Whether items reject writes to this property.
    pub read_only: bool,
    /// Whether views may sort on this property.
    pub sortable: bool,
}

impl PropertyDescriptor {
    /// Creates a writable, non-sortable descriptor.
    pub fn new(
        id: impl Into<String>,
        property_type: PropertyType,
        default_value: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            id: id.into(),
            property_type,
            default_value: default_value.into(),
            read_only: false,
            sortable: false,
        }
    }

    /// Sets the read-only flag.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the sortable flag.
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }
}

/// The ordered set of property descriptors describing each item's shape.
///
/// A definition is shared (`Arc`) between a view, its query factory and the
/// queries it constructs, so it is mutated through `&self`. Property ids are
/// unique: adding an id that already exists replaces that descriptor in
/// place, keeping its position.
#[derive(Debug, Default)]
pub struct QueryDefinition {
    properties: RwLock<Vec<PropertyDescriptor>>,
    /// Bumped on every add or remove.
    revision: AtomicU64,
}

impl QueryDefinition {
    /// Creates an empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor, builder style.
    pub fn with_property(self, descriptor: PropertyDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Returns all property ids in definition order.
    pub fn property_ids(&self) -> Vec<String> {
        self.properties.read().iter().map(|p| p.id.clone()).collect()
    }

    /// Returns the ids of sortable properties in definition order.
    pub fn sortable_property_ids(&self) -> Vec<String> {
        self.properties
            .read()
            .iter()
            .filter(|p| p.sortable)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Returns the declared type of a property.
    pub fn property_type(&self, id: &str) -> Option<PropertyType> {
        self.with_descriptor(id, |p| p.property_type)
    }

    /// Returns the default value of a property.
    pub fn default_value(&self, id: &str) -> Option<PropertyValue> {
        self.with_descriptor(id, |p| p.default_value.clone())
    }

    /// Returns `true` if the property exists and is read-only.
    pub fn is_read_only(&self, id: &str) -> bool {
        self.with_descriptor(id, |p| p.read_only).unwrap_or(false)
    }

    /// Returns `true` if the property exists and is sortable.
    pub fn is_sortable(&self, id: &str) -> bool {
        self.with_descriptor(id, |p| p.sortable).unwrap_or(false)
    }

    /// Returns a copy of a property's descriptor.
    pub fn descriptor(&self, id: &str) -> Option<PropertyDescriptor> {
        self.with_descriptor(id, Clone::clone)
    }

    /// Returns copies of all descriptors in definition order.
    pub fn descriptors(&self) -> Vec<PropertyDescriptor> {
        self.properties.read().clone()
    }

    /// Adds a property.
    pub fn add_property(
        &self,
        id: impl Into<String>,
        property_type: PropertyType,
        default_value: impl Into<PropertyValue>,
        read_only: bool,
        sortable: bool,
    ) {
        self.insert(
            PropertyDescriptor::new(id, property_type, default_value)
                .with_read_only(read_only)
                .with_sortable(sortable),
        );
    }

    /// Removes a property. Removing an unknown id does nothing.
    pub fn remove_property(&self, id: &str) {
        self.properties.write().retain(|p| p.id != id);
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns a counter that changes whenever a property is added or removed.
    ///
    /// Views compare revisions to notice that cached items no longer match
    /// the definition.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Returns the number of properties.
    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    /// Returns `true` if no properties are defined.
    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }

    fn insert(&self, descriptor: PropertyDescriptor) {
        let mut properties = self.properties.write();
        match properties.iter_mut().find(|p| p.id == descriptor.id) {
            Some(existing) => *existing = descriptor,
            None => properties.push(descriptor),
        }
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    fn with_descriptor<R>(&self, id: &str, f: impl FnOnce(&PropertyDescriptor) -> R) -> Option<R> {
        self.properties.read().iter().find(|p| p.id == id).map(f)
    }
}
