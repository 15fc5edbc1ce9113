//! Key patterns
//!
//! A [`Pattern`] is a declarative predicate over keys. Collections use
//! patterns two ways:
//!
//! - **Full match**: [`Pattern::matches`] decides whether a decoded key
//!   belongs to the result.
//! - **Rank cover**: [`Pattern::rank_cover`] computes a `[start, end)` byte
//!   range guaranteed to contain the encoding of every matching key. The
//!   cover may over-approximate, so candidates inside it are re-tested with
//!   the full match.
//!
//! Ordered comparisons (`Gt`, `Gte`, `Lt`, `Lte`) only match keys of the
//! bound's own kind, using the same order the key codec preserves.

use crate::error::{Error, Result};
use crate::key::{Key, KeyKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Byte-level view of a key encoding, as needed to compute rank covers
pub trait KeyEncoder {
    /// Encoding of a single key
    fn encode(&self, key: &Key) -> Result<Vec<u8>>;

    /// Range containing every encoding of keys of `kind`
    fn kind_cover(&self, kind: KeyKind) -> (Vec<u8>, Vec<u8>);

    /// Range containing every key encoding
    fn full_cover(&self) -> (Vec<u8>, Vec<u8>);
}

/// Predicate over keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Matches every key
    #[default]
    Any,
    /// Matches keys of one kind
    Kind(KeyKind),
    /// Matches exactly one key
    Eq(Key),
    /// Same kind, strictly greater
    Gt(Key),
    /// Same kind, greater or equal
    Gte(Key),
    /// Same kind, strictly less
    Lt(Key),
    /// Same kind, less or equal
    Lte(Key),
    /// Every sub-pattern matches
    And(Vec<Pattern>),
    /// Some sub-pattern matches
    Or(Vec<Pattern>),
}

impl Pattern {
    /// Keys of the bounds' kind within `[low, high]`
    pub fn between(low: Key, high: Key) -> Self {
        Pattern::And(vec![Pattern::Gte(low), Pattern::Lte(high)])
    }

    /// True for the match-anything pattern
    pub fn is_any(&self) -> bool {
        matches!(self, Pattern::Any)
    }

    /// Check that this is a well-formed key pattern
    ///
    /// Rejects ordered comparisons against capability references, which
    /// have no intrinsic order, and empty conjunctions/disjunctions.
    pub fn assert_key_pattern(&self) -> Result<()> {
        match self {
            Pattern::Any | Pattern::Kind(_) | Pattern::Eq(_) => Ok(()),
            Pattern::Gt(bound) | Pattern::Gte(bound) | Pattern::Lt(bound) | Pattern::Lte(bound) => {
                if bound.kind() == KeyKind::CapRef {
                    return Err(Error::InvalidPattern(format!(
                        "capability reference {} cannot bound an ordered comparison",
                        bound
                    )));
                }
                Ok(())
            }
            Pattern::And(parts) | Pattern::Or(parts) => {
                if parts.is_empty() {
                    return Err(Error::InvalidPattern(
                        "conjunction or disjunction with no parts".to_string(),
                    ));
                }
                parts.iter().try_for_each(Pattern::assert_key_pattern)
            }
        }
    }

    /// Full match test
    pub fn matches(&self, key: &Key) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Kind(kind) => key.kind() == *kind,
            Pattern::Eq(expected) => key == expected,
            Pattern::Gt(bound) => key.compare_within_kind(bound) == Some(Ordering::Greater),
            Pattern::Gte(bound) => matches!(
                key.compare_within_kind(bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Pattern::Lt(bound) => key.compare_within_kind(bound) == Some(Ordering::Less),
            Pattern::Lte(bound) => matches!(
                key.compare_within_kind(bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Pattern::And(parts) => parts.iter().all(|p| p.matches(key)),
            Pattern::Or(parts) => parts.iter().any(|p| p.matches(key)),
        }
    }

    /// Tightest `[start, end)` byte range this pattern can cheaply promise
    pub fn rank_cover(&self, encoder: &dyn KeyEncoder) -> Result<(Vec<u8>, Vec<u8>)> {
        match self {
            Pattern::Any => Ok(encoder.full_cover()),
            Pattern::Kind(kind) => Ok(encoder.kind_cover(*kind)),
            // Capability references encode through their ordinal, which a
            // pattern cannot know; fall back to the whole kind.
            Pattern::Eq(key) if key.kind() == KeyKind::CapRef => {
                Ok(encoder.kind_cover(KeyKind::CapRef))
            }
            Pattern::Eq(key) => {
                let start = encoder.encode(key)?;
                let end = successor(&start);
                Ok((start, end))
            }
            Pattern::Gt(bound) | Pattern::Gte(bound) | Pattern::Lt(bound) | Pattern::Lte(bound)
                if bound.kind() == KeyKind::CapRef =>
            {
                Ok(encoder.kind_cover(KeyKind::CapRef))
            }
            Pattern::Gt(bound) => {
                let (_, end) = encoder.kind_cover(bound.kind());
                Ok((successor(&encoder.encode(bound)?), end))
            }
            Pattern::Gte(bound) => {
                let (_, end) = encoder.kind_cover(bound.kind());
                Ok((encoder.encode(bound)?, end))
            }
            Pattern::Lt(bound) => {
                let (start, _) = encoder.kind_cover(bound.kind());
                Ok((start, encoder.encode(bound)?))
            }
            Pattern::Lte(bound) => {
                let (start, _) = encoder.kind_cover(bound.kind());
                Ok((start, successor(&encoder.encode(bound)?)))
            }
            Pattern::And(parts) => {
                let mut cover = encoder.full_cover();
                for part in parts {
                    let (start, end) = part.rank_cover(encoder)?;
                    if start > cover.0 {
                        cover.0 = start;
                    }
                    if end < cover.1 {
                        cover.1 = end;
                    }
                }
                if cover.1 < cover.0 {
                    cover.1 = cover.0.clone();
                }
                Ok(cover)
            }
            Pattern::Or(parts) => {
                let mut cover: Option<(Vec<u8>, Vec<u8>)> = None;
                for part in parts {
                    let (start, end) = part.rank_cover(encoder)?;
                    cover = Some(match cover {
                        None => (start, end),
                        Some((s, e)) => (s.min(start), e.max(end)),
                    });
                }
                Ok(cover.unwrap_or_else(|| {
                    let (start, _) = encoder.full_cover();
                    (start.clone(), start)
                }))
            }
        }
    }
}

/// Smallest byte string strictly greater than `bytes`
fn successor(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.extend_from_slice(bytes);
    out.push(0x00);
    out
}
