//! Curio event bus and analytics capture.
//!
//! - [`EventBus`] is the in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`GuideEvent`] is the canonical domain event envelope.
//! - [`LogSink`] is the background service that turns visit-related events
//!   into append-only log entries.

pub mod bus;
pub mod log_sink;
pub mod names;

pub use bus::{EventBus, GuideEvent};
pub use log_sink::LogSink;
