//! Logging facilities for Tessella.
//!
//! Tessella uses the `tracing` crate for instrumentation. The library never
//! installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // Your application code...
//! }
//! ```
//!
//! The constants in [`targets`] can be used with `tracing` filter
//! directives to scope logs to a single subsystem, e.g.
//! `RUST_LOG=tessella::virtualizer=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Core plumbing target.
    pub const CORE: &str = "tessella_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "tessella_core::signal";
    /// Data connection target.
    pub const CONNECTION: &str = "tessella::connection";
    /// Column sizing target.
    pub const SIZING: &str = "tessella::sizing";
    /// Slot layout and group-header target.
    pub const SLOTS: &str = "tessella::slots";
    /// Row virtualization target.
    pub const VIRTUALIZER: &str = "tessella::virtualizer";
    /// Selection and currency target.
    pub const SELECTION: &str = "tessella::selection";
    /// Edit-state machine target.
    pub const EDITING: &str = "tessella::editing";
    /// Header and reorder interaction target.
    pub const INTERACTION: &str = "tessella::interaction";
}
