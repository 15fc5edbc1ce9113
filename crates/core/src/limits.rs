//! Size limits for keys and values
//!
//! Encoded entry keys are bounded so a row key always fits comfortably in
//! the substrate's key space; serialized values are bounded to keep a single
//! row from exhausting memory. Violations return `KeyTooLarge` or
//! `ValueTooLarge`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Size limits for keys and values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum encoded entry key length in bytes, prefix excluded (default: 220)
    pub max_key_bytes: usize,

    /// Maximum serialized value row length in bytes (default: 10MB)
    pub max_value_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_key_bytes: 220,
            max_value_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_key_bytes: 32,
            max_value_bytes: 256,
        }
    }

    /// Validate an encoded entry key length
    pub fn validate_key_len(&self, len: usize) -> Result<()> {
        if len > self.max_key_bytes {
            return Err(Error::KeyTooLarge {
                actual: len,
                max: self.max_key_bytes,
            });
        }
        Ok(())
    }

    /// Validate a serialized value length
    pub fn validate_value_len(&self, len: usize) -> Result<()> {
        if len > self.max_value_bytes {
            return Err(Error::ValueTooLarge {
                actual: len,
                max: self.max_value_bytes,
            });
        }
        Ok(())
    }
}
