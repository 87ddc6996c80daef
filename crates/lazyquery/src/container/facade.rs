//! The container facade.

use std::fmt;
use std::sync::{Arc, Weak};

use lazyquery_core::logging::targets;
use lazyquery_core::{ConnectionId, ContainerError, Result, SlotTag};

use super::events::{
    ContainerSignals, ItemSetChangeEvent, ItemSetChangeListener, PropertySetChangeEvent,
    PropertySetChangeListener,
};
use super::identity::ItemId;
use super::traits::IndexedContainer;
use crate::config::{LazyQueryConfig, PropertyDefaults};
use crate::query::{
    Item, LazyQueryView, PropertyType, PropertyValue, QueryDefinition, QueryFactory, QueryView,
};

/// A lazily loaded, buffered container addressed by positional identities.
///
/// The container owns exactly one [`QueryView`] for its lifetime and reads
/// size, order and modification state from it on every call. On top of the
/// view it maps identities to positions and notifies listeners.
///
/// Containers are always handled through `Arc` so events can carry a
/// reference back to their origin.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use lazyquery::prelude::*;
///
/// let factory = Arc::new(MemoryQueryFactory::default());
/// let container = LazyQueryContainer::new(factory, 50);
///
/// let changes = Arc::new(AtomicUsize::new(0));
/// let counter = changes.clone();
/// container.signals().item_set_changed.connect(move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// let id = container.add_item().unwrap();
/// assert_eq!(id, ItemId::new(0));
/// assert!(container.contains_id(&id));
/// assert_eq!(changes.load(Ordering::SeqCst), 1);
/// ```
pub struct LazyQueryContainer {
    view: Box<dyn QueryView>,
    signals: ContainerSignals,
    property_defaults: PropertyDefaults,
    this: Weak<LazyQueryContainer>,
}

impl LazyQueryContainer {
    /// Creates a container over the default lazy view with an empty schema.
    pub fn new(factory: Arc<dyn QueryFactory>, batch_size: usize) -> Arc<Self> {
        Self::with_view(LazyQueryView::new(factory, batch_size))
    }

    /// Creates a container over the default lazy view with an explicit schema.
    pub fn with_definition(
        definition: Arc<QueryDefinition>,
        factory: Arc<dyn QueryFactory>,
    ) -> Arc<Self> {
        Self::with_view(LazyQueryView::with_definition(
            definition,
            factory,
            LazyQueryConfig::DEFAULT_BATCH_SIZE,
        ))
    }

    /// Creates a container over a caller-supplied view.
    pub fn with_view(view: impl QueryView + 'static) -> Arc<Self> {
        Self::build(Box::new(view), PropertyDefaults::default())
    }

    /// Creates a container over the default lazy view from a configuration.
    ///
    /// Fails with [`ContainerError::Config`] if the configuration is invalid.
    pub fn from_config(
        factory: Arc<dyn QueryFactory>,
        config: &LazyQueryConfig,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let view = LazyQueryView::new(factory, config.batch_size);
        Ok(Self::build(Box::new(view), config.property_defaults))
    }

    fn build(view: Box<dyn QueryView>, property_defaults: PropertyDefaults) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            view,
            signals: ContainerSignals::default(),
            property_defaults,
            this: this.clone(),
        })
    }

    /// Returns the view this container delegates to.
    pub fn view(&self) -> &dyn QueryView {
        self.view.as_ref()
    }

    /// Returns the schema.
    pub fn definition(&self) -> &QueryDefinition {
        self.view.definition()
    }

    /// Returns the notification registries.
    pub fn signals(&self) -> &ContainerSignals {
        &self.signals
    }

    /// Returns the flags used by [`add_container_property`](Self::add_container_property).
    pub fn property_defaults(&self) -> PropertyDefaults {
        self.property_defaults
    }

    /// Reloads the view and notifies item-set listeners.
    pub fn refresh(&self) {
        self.view.refresh();
        self.notify_item_set_changed();
    }

    /// Adds a property using the configured read-only and sortable defaults.
    pub fn add_container_property(
        &self,
        property_id: &str,
        property_type: PropertyType,
        default_value: impl Into<PropertyValue>,
    ) {
        let PropertyDefaults { read_only, sortable } = self.property_defaults;
        self.add_container_property_with(
            property_id,
            property_type,
            default_value,
            read_only,
            sortable,
        );
    }

    /// Adds a property with explicit flags.
    ///
    /// Adding an id that already exists replaces its descriptor. With the
    /// default view, items read afterwards carry the new property; items
    /// with buffered edits keep their old shape until commit or discard.
    pub fn add_container_property_with(
        &self,
        property_id: &str,
        property_type: PropertyType,
        default_value: impl Into<PropertyValue>,
        read_only: bool,
        sortable: bool,
    ) {
        self.view
            .definition()
            .add_property(property_id, property_type, default_value, read_only, sortable);
        tracing::debug!(
            target: targets::CONTAINER,
            property_id,
            %property_type,
            read_only,
            sortable,
            "added property"
        );
        self.notify_property_set_changed();
    }

    /// Removes a property. Listeners are notified even if it did not exist.
    pub fn remove_container_property(&self, property_id: &str) {
        self.view.definition().remove_property(property_id);
        tracing::debug!(target: targets::CONTAINER, property_id, "removed property");
        self.notify_property_set_changed();
    }

    /// Registers an item-set listener.
    ///
    /// The same listener may be registered more than once and is then
    /// notified once per registration. Listeners that need this container
    /// outside of an event should hold a `Weak`; see [`ContainerSignals`].
    pub fn add_item_set_change_listener<L>(&self, listener: &Arc<L>) -> ConnectionId
    where
        L: ItemSetChangeListener + ?Sized + 'static,
    {
        let target = listener.clone();
        self.signals
            .item_set_changed
            .connect_tagged(SlotTag::of(listener), move |event| target.item_set_changed(event))
    }

    /// Removes one registration of `listener`.
    ///
    /// Returns `false` if it was not registered.
    pub fn remove_item_set_change_listener<L>(&self, listener: &Arc<L>) -> bool
    where
        L: ItemSetChangeListener + ?Sized,
    {
        self.signals.item_set_changed.disconnect_tagged(SlotTag::of(listener))
    }

    /// Registers a property-set listener.
    pub fn add_property_set_change_listener<L>(&self, listener: &Arc<L>) -> ConnectionId
    where
        L: PropertySetChangeListener + ?Sized + 'static,
    {
        let target = listener.clone();
        self.signals
            .property_set_changed
            .connect_tagged(SlotTag::of(listener), move |event| target.property_set_changed(event))
    }

    /// Removes one registration of `listener`.
    pub fn remove_property_set_change_listener<L>(&self, listener: &Arc<L>) -> bool
    where
        L: PropertySetChangeListener + ?Sized,
    {
        self.signals.property_set_changed.disconnect_tagged(SlotTag::of(listener))
    }

    fn notify_item_set_changed(&self) {
        if let Some(container) = self.this.upgrade() {
            self.signals.item_set_changed.emit(ItemSetChangeEvent::new(container));
        }
    }

    fn notify_property_set_changed(&self) {
        if let Some(container) = self.this.upgrade() {
            self.signals.property_set_changed.emit(PropertySetChangeEvent::new(container));
        }
    }

    fn position(&self, id: ItemId) -> Result<usize> {
        let size = self.view.size();
        id.position(size).ok_or_else(|| ContainerError::out_of_bounds(id.index(), size))
    }
}

impl IndexedContainer for LazyQueryContainer {
    fn size(&self) -> usize {
        self.view.size()
    }

    fn item(&self, id: ItemId) -> Result<Item> {
        let index = self.position(id)?;
        self.view.item(index)
    }

    fn container_property_ids(&self) -> Vec<String> {
        self.view.definition().property_ids()
    }

    fn sortable_container_property_ids(&self) -> Vec<String> {
        self.view.definition().sortable_property_ids()
    }

    fn property_type(&self, property_id: &str) -> Option<PropertyType> {
        self.view.definition().property_type(property_id)
    }

    fn add_item(&self) -> Result<ItemId> {
        let id = ItemId::from(self.view.add_item()?);
        tracing::debug!(target: targets::CONTAINER, %id, "added item");
        self.notify_item_set_changed();
        Ok(id)
    }

    fn remove_item(&self, id: ItemId) -> Result<()> {
        // Range is the view's concern; only positions that cannot exist are rejected here.
        let index = usize::try_from(id.index())
            .map_err(|_| ContainerError::out_of_bounds(id.index(), self.view.size()))?;
        self.view.remove_item(index)?;
        tracing::debug!(target: targets::CONTAINER, %id, "removed item");
        self.notify_item_set_changed();
        Ok(())
    }

    fn remove_all_items(&self) -> Result<()> {
        self.view.remove_all_items()?;
        self.view.refresh();
        tracing::debug!(target: targets::CONTAINER, "removed all items");
        self.notify_item_set_changed();
        Ok(())
    }

    fn sort(&self, property_ids: &[&str], ascending: &[bool]) {
        tracing::debug!(target: targets::CONTAINER, ?property_ids, ?ascending, "sorting");
        self.view.sort(property_ids, ascending);
    }

    fn commit(&self) -> Result<()> {
        if let Err(error) = self.view.commit() {
            tracing::warn!(target: targets::CONTAINER, %error, "commit failed");
            return Err(error);
        }
        self.view.refresh();
        tracing::debug!(target: targets::CONTAINER, size = self.view.size(), "committed");
        self.notify_item_set_changed();
        Ok(())
    }

    fn discard(&self) -> Result<()> {
        if let Err(error) = self.view.discard() {
            tracing::warn!(target: targets::CONTAINER, %error, "discard failed");
            return Err(error);
        }
        self.view.refresh();
        tracing::debug!(target: targets::CONTAINER, size = self.view.size(), "discarded");
        self.notify_item_set_changed();
        Ok(())
    }

    fn is_modified(&self) -> bool {
        self.view.is_modified()
    }
}

impl fmt::Debug for LazyQueryContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyQueryContainer")
            .field("size", &self.view.size())
            .field("properties", &self.view.definition().property_ids())
            .field("signals", &self.signals)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(LazyQueryContainer: Send, Sync);
