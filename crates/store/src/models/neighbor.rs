use curio_core::types::DbId;

/// Directed timeline edge `(previous, next)`.
///
/// The edges define the single canonical traversal order; on arrival at
/// `next` they decide whether the preceding timeline location was already
/// unlocked.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub previous: DbId,
    pub next: DbId,
}
