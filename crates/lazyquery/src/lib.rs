//! Lazy Query - lazily loaded, buffered containers over remote data sources.
//!
//! A [`LazyQueryContainer`](container::LazyQueryContainer) exposes a dataset
//! that may be large and slow to fetch as an ordered collection addressed by
//! small positional identities. It supports sorting and buffered edits with
//! commit and discard, and tells listeners when items or properties change.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lazyquery::prelude::*;
//!
//! let factory = Arc::new(MemoryQueryFactory::new(vec![
//!     vec![("name".to_string(), "Bob".into())],
//!     vec![("name".to_string(), "Alice".into())],
//! ]));
//! let definition = Arc::new(QueryDefinition::new().with_property(
//!     PropertyDescriptor::new("name", PropertyType::String, "").with_read_only(false),
//! ));
//! let container = LazyQueryContainer::with_definition(definition, factory.clone());
//!
//! container.sort(&["name"], &[true]);
//! let first = container.item(container.first_item_id()).unwrap();
//! assert_eq!(first.property("name").unwrap().as_str(), Some("Alice"));
//!
//! let id = container.add_item().unwrap();
//! container.item(id).unwrap().set_property("name", "Carol").unwrap();
//! container.commit().unwrap();
//! assert_eq!(factory.len(), 3);
//! ```

pub use lazyquery_core::*;

pub mod config;
pub mod container;
pub mod prelude;
pub mod query;
