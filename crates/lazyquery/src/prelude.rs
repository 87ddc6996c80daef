//! Prelude module for Lazy Query.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use lazyquery::prelude::*;
//! ```

// ============================================================================
// Container
// ============================================================================

pub use crate::container::{
    BufferingMode, IndexedContainer, ItemId, ItemSetChangeEvent, ItemSetChangeListener,
    LazyQueryContainer, PropertySetChangeEvent, PropertySetChangeListener,
};

// ============================================================================
// Queries and Schema
// ============================================================================

pub use crate::query::{
    Item, MemoryQueryFactory, PropertyDescriptor, PropertyType, PropertyValue, Query,
    QueryDefinition, QueryFactory, QueryView, SortCriteria,
};

// ============================================================================
// Configuration and Errors
// ============================================================================

pub use crate::config::LazyQueryConfig;
pub use crate::ContainerError;
