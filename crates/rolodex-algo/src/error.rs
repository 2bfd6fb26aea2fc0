//! Error types for rolodex-algo.

use thiserror::Error;

use crate::record::RecordId;

/// Result type for rolodex-algo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or reordering a record list.
///
/// Searches and sorts never fail: a missing target or an empty list is
/// reported through the outcome values instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two records in the same list share an id.
    #[error("duplicate record id {0}")]
    DuplicateId(RecordId),

    /// An id was referenced that the list does not contain.
    #[error("unknown record id {0}")]
    UnknownId(RecordId),

    /// A proposed arrangement does not hold exactly the displayed ids.
    #[error("arrangement is not a permutation of the displayed list (expected {expected} records, got {actual})")]
    NotAPermutation {
        expected: usize,
        actual: usize,
    },
}
