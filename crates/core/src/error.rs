//! Error types for ordered collections
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every error is reported synchronously to the immediate caller. Nothing in
//! this workspace catches or retries an error internally.

use crate::key::Key;
use thiserror::Error;

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ordered collections
#[derive(Debug, Error)]
pub enum Error {
    /// A collection with this name already exists in the registry
    #[error("Collection name already in use: {0:?}")]
    DuplicateCollectionName(String),

    /// No collection with this name exists in the registry
    #[error("Collection not found: {0:?}")]
    CollectionNotFound(String),

    /// Collection exists but was created as a different store kind
    #[error("Collection {name:?} is a {actual}, not a {expected}")]
    CollectionKindMismatch {
        /// Collection name
        name: String,
        /// Kind the caller asked for
        expected: &'static str,
        /// Kind recorded when the collection was created
        actual: &'static str,
    },

    /// Key does not satisfy the collection's key pattern
    #[error("Invalid key type for collection {collection:?}: {key}")]
    InvalidKeyType {
        /// Collection name
        collection: String,
        /// Offending key
        key: Key,
    },

    /// Value kind has no key encoding (lists, records)
    #[error("A {kind} cannot be used as a collection key")]
    UnsupportedKeyKind {
        /// Name of the rejected value kind
        kind: &'static str,
    },

    /// Pattern is not a valid key pattern
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Value filtering other than "match anything" was requested
    #[error("Only the match-anything value pattern is supported")]
    UnsupportedValuePattern,

    /// `init` on a key that is already present
    #[error("Key {key} already registered in collection {collection:?}")]
    DuplicateKey {
        /// Collection name
        collection: String,
        /// Offending key
        key: Key,
    },

    /// `get`/`set`/`delete` on an absent key
    #[error("Key {key} not found in collection {collection:?}")]
    KeyNotFound {
        /// Collection name
        collection: String,
        /// Missing key
        key: Key,
    },

    /// Encoded entry key exceeds the configured limit
    #[error("Key too large: {actual} bytes exceeds maximum {max}")]
    KeyTooLarge {
        /// Encoded length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Serialized value exceeds the configured limit
    #[error("Value too large: {actual} bytes exceeds maximum {max}")]
    ValueTooLarge {
        /// Serialized length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Stored key bytes do not decode under any known tag
    ///
    /// Signals substrate corruption or version skew. Fatal.
    #[error("Invalid database key: {0}")]
    InvalidDatabaseKeyEncoding(String),

    /// A key was added to the collection while this iteration was live
    #[error("Keys in collection {0:?} cannot be added to during iteration")]
    IterationInvalidated(String),

    /// Value serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Metadata row is missing or malformed
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Substrate failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error indicates a missing key or collection
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::KeyNotFound { .. } | Error::CollectionNotFound(_)
        )
    }

    /// Check if this error was caused by invalid caller input
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidKeyType { .. }
                | Error::UnsupportedKeyKind { .. }
                | Error::InvalidPattern(_)
                | Error::UnsupportedValuePattern
                | Error::KeyTooLarge { .. }
                | Error::ValueTooLarge { .. }
        )
    }

    /// Check if this error signals on-disk data that cannot be trusted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::InvalidDatabaseKeyEncoding(_) | Error::Corruption(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
