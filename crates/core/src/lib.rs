//! Domain vocabulary shared by every Curio crate.
//!
//! Holds the id/time aliases, the error taxonomy, the wire envelope, the
//! location state machine's pure functions, and the visit-log type codes.
//! No internal dependencies.

pub mod envelope;
pub mod error;
pub mod location;
pub mod log_types;
pub mod types;
