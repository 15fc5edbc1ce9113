//! Core types and traits for ordered collections
//!
//! This crate defines the foundational types used throughout the system:
//! - Key / KeyKind / CapRef: the dynamically-typed scalar keys collections accept
//! - Value / CapData: stored values and their serialized form
//! - Pattern: key predicates with rank covers for range scans
//! - Error: Error type hierarchy
//! - Limits / RegistryConfig: size limits and configuration
//! - Traits: interfaces consumed by collections (Substrate, ValueCodec, ReachabilityTracker)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod key;
pub mod limits;
pub mod pattern;
pub mod traits;
pub mod value;

pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use key::{CapRef, Key, KeyKind};
pub use limits::Limits;
pub use pattern::{KeyEncoder, Pattern};
pub use traits::{ReachabilityTracker, Substrate, ValueCodec};
pub use value::{CapData, Value};

// Re-exported so callers can build bigint keys without a direct dependency
pub use num_bigint::BigInt;
