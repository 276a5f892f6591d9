//! Error types for the keychain facade.
//!
//! Two disjoint families: local validation failures, which are deterministic
//! and must be fixed by the caller, and engine-reported statuses, which are
//! surfaced verbatim and never retried.

use thiserror::Error;

use crate::engine::EngineStatus;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while constructing or decoding a secret entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// The entry key is missing, empty or whitespace-only, or the identifying
    /// attribute could not be resolved to text.
    #[error("the entry key is missing, empty, or not valid text")]
    InvalidKey,

    /// The attribute set returned by the engine carried no fields at all.
    #[error("the attribute set is empty")]
    EmptyAttributes,

    /// The attribute set is missing the record's creation timestamp.
    #[error("the creation timestamp is missing")]
    MissingCreationTimestamp,

    /// The attribute set is missing the record's modification timestamp.
    #[error("the modification timestamp is missing")]
    MissingModificationTimestamp,
}

/// Errors raised by store construction and operations.
///
/// "Not found" is never an error: lookups return `None` or `false`, and
/// deletes of absent records succeed. Only validation failures and
/// non-success, non-not-found engine statuses surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The service namespace is empty or whitespace-only.
    #[error("the service namespace is empty")]
    InvalidNamespace,

    /// A sharing group was provided but is empty or whitespace-only.
    #[error("the sharing group is empty")]
    InvalidSharingGroup,

    /// The protection level is unrecognized or not accepted by the engine.
    #[error("invalid protection level: {0}")]
    InvalidProtectionLevel(String),

    /// An entry could not be constructed from the engine's attribute set.
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// The engine reported a status other than success or not-found.
    #[error("engine failure: {0}")]
    Engine(EngineStatus),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_displays_status_description() {
        let err = StoreError::Engine(EngineStatus::DUPLICATE_ITEM);
        assert_eq!(format!("{err}"), "engine failure: duplicate item (-25299)");
    }

    #[test]
    fn entry_error_is_transparent() {
        let err = StoreError::from(EntryError::EmptyAttributes);
        assert_eq!(format!("{err}"), "the attribute set is empty");
    }
}
