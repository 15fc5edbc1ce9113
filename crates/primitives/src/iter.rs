//! Lazy range iteration over a collection
//!
//! A [`RangeIter`] walks the rows inside a key pattern's rank cover with
//! repeated `get_after` calls, holding only the last row key it returned.
//! Nothing is buffered, so an abandoned iterator costs nothing.
//!
//! Candidates inside the cover are decoded and re-tested against the full
//! pattern; the cover is allowed to over-approximate. Values are only
//! deserialized by iterators that yield them.
//!
//! ## Concurrent Modification
//!
//! - Deleting entries during iteration is allowed; the cursor is a key, not
//!   a position.
//! - Replacing values is allowed and the iterator sees the new value.
//! - Adding an entry invalidates every live iterator over the collection:
//!   its next call yields `IterationInvalidated` and it then ends.

use tracing::warn;

use ordcoll_core::{Error, Key, Pattern, Result, Value};

use crate::collection::Collection;
use crate::encoding::CoverEncoder;

/// Cursor over the rows of a collection matching a key pattern
pub(crate) struct RangeIter {
    collection: Collection,
    key_pattern: Pattern,
    start: Vec<u8>,
    end: Vec<u8>,
    /// Row key of the last row returned; empty before the first
    prior: Vec<u8>,
    generation: u64,
    done: bool,
}

impl RangeIter {
    pub(crate) fn new(
        collection: Collection,
        key_pattern: Pattern,
        value_pattern: &Pattern,
    ) -> Result<Self> {
        key_pattern.assert_key_pattern()?;
        if !value_pattern.is_any() {
            return Err(Error::UnsupportedValuePattern);
        }
        let cover = key_pattern.rank_cover(&CoverEncoder)?;
        let (start, end) = collection.codec().to_row_range(cover);
        let generation = collection.generation();
        Ok(RangeIter {
            collection,
            key_pattern,
            start,
            end,
            prior: Vec::new(),
            generation,
            done: false,
        })
    }

    fn advance(&mut self) -> Result<Option<(Key, Vec<u8>)>> {
        loop {
            if self.collection.generation() != self.generation {
                return Err(Error::IterationInvalidated(format!(
                    "collection {:?} was added to during iteration",
                    self.collection.name()
                )));
            }
            let row = self
                .collection
                .substrate()
                .get_after(&self.prior, &self.start, &self.end)?;
            let (db_key, raw) = match row {
                Some(row) => row,
                None => return Ok(None),
            };
            let key = self.collection.codec().decode(&db_key).map_err(|e| {
                if e.is_corruption() {
                    warn!(collection = %self.collection.name(), error = %e, "undecodable row key");
                }
                e
            })?;
            self.prior = db_key;
            if self.key_pattern.matches(&key) {
                return Ok(Some((key, raw)));
            }
        }
    }
}

impl Iterator for RangeIter {
    type Item = Result<(Key, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Keys of a collection, in order
pub struct Keys {
    rows: RangeIter,
}

impl Keys {
    pub(crate) fn new(rows: RangeIter) -> Self {
        Keys { rows }
    }
}

impl Iterator for Keys {
    type Item = Result<Key>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| row.map(|(key, _)| key))
    }
}

/// Values of a collection, in key order
pub struct Values {
    rows: RangeIter,
}

impl Values {
    pub(crate) fn new(rows: RangeIter) -> Self {
        Values { rows }
    }
}

impl Iterator for Values {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        let collection = &self.rows.collection;
        Some(row.and_then(|(_, raw)| collection.decode_value(&raw)))
    }
}

/// Key-value pairs of a collection, in key order
pub struct Entries {
    rows: RangeIter,
}

impl Entries {
    pub(crate) fn new(rows: RangeIter) -> Self {
        Entries { rows }
    }
}

impl Iterator for Entries {
    type Item = Result<(Key, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        let collection = &self.rows.collection;
        Some(row.and_then(|(key, raw)| Ok((key, collection.decode_value(&raw)?))))
    }
}
