//! Logging facilities for Lazy Query.
//!
//! Lazy Query uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("lazyquery=debug,lazyquery_core=trace")
//!         .init();
//! }
//! ```
//!
//! Structural mutations (add, remove, commit, discard, refresh) log at
//! `debug`, batch loads at `trace`, and failed commits or discards at `warn`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal system target.
    pub const SIGNAL: &str = "lazyquery_core::signal";
    /// Container facade target.
    pub const CONTAINER: &str = "lazyquery::container";
    /// Default lazy view target.
    pub const VIEW: &str = "lazyquery::view";
    /// Configuration target.
    pub const CONFIG: &str = "lazyquery::config";
}
