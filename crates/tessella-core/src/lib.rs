//! Core systems for Tessella.
//!
//! This crate provides the plumbing the grid core is built on:
//!
//! - [`Signal`] - A type-safe signal/slot mechanism for change notification
//! - [`DeferralCounter`] - A scope counter that coalesces cascading
//!   notifications from one gesture into a single event
//! - [`logging`] - Target names used for `tracing` filtering
//!
//! Tessella is a cooperative, single-threaded control: all state mutation
//! happens on one logical thread in response to input or collection-change
//! notifications. Signals here therefore invoke their slots directly, in
//! emission order, with no queueing layer.

pub mod defer;
pub mod logging;
pub mod signal;

pub use defer::DeferralCounter;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
