//! Change notifications.
//!
//! Events carry only the originating container. Receiving one means
//! "re-read the container", never "apply this delta".

use std::fmt;
use std::sync::Arc;

use lazyquery_core::Signal;

use super::facade::LazyQueryContainer;

/// The set of items, or their order, may have changed.
#[derive(Clone)]
pub struct ItemSetChangeEvent {
    container: Arc<LazyQueryContainer>,
}

impl ItemSetChangeEvent {
    pub(crate) fn new(container: Arc<LazyQueryContainer>) -> Self {
        Self { container }
    }

    /// The container that changed.
    pub fn container(&self) -> &Arc<LazyQueryContainer> {
        &self.container
    }
}

impl fmt::Debug for ItemSetChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemSetChangeEvent")
            .field("container", &Arc::as_ptr(&self.container))
            .finish()
    }
}

/// The set of container properties changed.
#[derive(Clone)]
pub struct PropertySetChangeEvent {
    container: Arc<LazyQueryContainer>,
}

impl PropertySetChangeEvent {
    pub(crate) fn new(container: Arc<LazyQueryContainer>) -> Self {
        Self { container }
    }

    /// The container that changed.
    pub fn container(&self) -> &Arc<LazyQueryContainer> {
        &self.container
    }
}

impl fmt::Debug for PropertySetChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySetChangeEvent")
            .field("container", &Arc::as_ptr(&self.container))
            .finish()
    }
}

/// Receives item-set notifications.
///
/// Implemented for every `Fn(&ItemSetChangeEvent) + Send + Sync` closure.
pub trait ItemSetChangeListener: Send + Sync {
    fn item_set_changed(&self, event: &ItemSetChangeEvent);
}

impl<F> ItemSetChangeListener for F
where
    F: Fn(&ItemSetChangeEvent) + Send + Sync,
{
    fn item_set_changed(&self, event: &ItemSetChangeEvent) {
        self(event)
    }
}

/// Receives property-set notifications.
///
/// Implemented for every `Fn(&PropertySetChangeEvent) + Send + Sync` closure.
pub trait PropertySetChangeListener: Send + Sync {
    fn property_set_changed(&self, event: &PropertySetChangeEvent);
}

impl<F> PropertySetChangeListener for F
where
    F: Fn(&PropertySetChangeEvent) + Send + Sync,
{
    fn property_set_changed(&self, event: &PropertySetChangeEvent) {
        self(event)
    }
}

/// The two notification registries of a container.
///
/// Closures can be connected here directly; listener objects are usually
/// registered through the container so they can be removed by value.
///
/// The container owns its registries, so a listener that holds an `Arc` of
/// the same container keeps it alive until the listener is disconnected.
/// Capture a `Weak` instead, or use [`ItemSetChangeEvent::container`] from
/// inside the listener.
#[derive(Default)]
pub struct ContainerSignals {
    /// Emitted after item-set changes.
    pub item_set_changed: Signal<ItemSetChangeEvent>,
    /// Emitted after property-set changes.
    pub property_set_changed: Signal<PropertySetChangeEvent>,
}

impl fmt::Debug for ContainerSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerSignals")
            .field("item_set_changed", &self.item_set_changed.connection_count())
            .field("property_set_changed", &self.property_set_changed.connection_count())
            .finish()
    }
}
