//! The container facade and its capability surface.
//!
//! # Core Types
//!
//! - [`LazyQueryContainer`]: The facade over one [`QueryView`](crate::query::QueryView)
//! - [`IndexedContainer`]: Ordered, indexable, append-only, buffered capability
//! - [`ItemId`]: Positional item identity
//! - [`ContainerSignals`]: Item-set and property-set registries
//!
//! # Identity
//!
//! Identities are positions and are reassigned by every structural change,
//! sort and refresh. Listeners should treat every notification as "re-read
//! everything".

mod events;
mod facade;
mod identity;
mod traits;

pub use events::{
    ContainerSignals, ItemSetChangeEvent, ItemSetChangeListener, PropertySetChangeEvent,
    PropertySetChangeListener,
};
pub use facade::LazyQueryContainer;
pub use identity::ItemId;
pub use traits::{BufferingMode, IndexedContainer};
