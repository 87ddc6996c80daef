//! Core systems for Lazy Query.
//!
//! This crate provides the foundational pieces shared by every Lazy Query
//! container:
//!
//! - **Signals**: Ordered observer registries with snapshot dispatch
//! - **Errors**: The error taxonomy collaborators report through
//! - **Logging**: `tracing` targets
//!
//! # Signal Example
//!
//! ```
//! use lazyquery_core::Signal;
//!
//! let item_set_changed = Signal::<usize>::new();
//!
//! let conn_id = item_set_changed.connect(|size| {
//!     println!("Item set changed, size is now {}", size);
//! });
//!
//! item_set_changed.emit(3);
//! item_set_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::{ContainerError, Result};
pub use signal::{ConnectionId, Signal, SlotTag};
