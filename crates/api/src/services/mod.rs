//! Gateway services: one module per controller surface.
//!
//! Every operation takes the shared [`AppState`](crate::state::AppState)
//! and a deserialized payload, and returns the uniform result envelope.
//! Capacity refusals and unmet preconditions are envelope codes, never
//! errors; only storage-level problems surface as failure envelopes.

pub mod heraldry;
pub mod occupancy;
pub mod progress;
pub mod settings;
pub mod visitors;
