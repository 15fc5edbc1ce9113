//! Row key layout shared by collections and the registry
//!
//! ```text
//! vc.{id}.{encoded key}     entry rows
//! vc.{id}.|{name}           per-collection metadata
//! vc.{id}.|ord.{cap id}     capability reference ordinals
//! rc.nextId                 next collection id
//! rc.name.{name}            collection id by name
//! ```
//!
//! `|` sorts after every key tag, so metadata rows never fall inside an
//! entry range. Counters are stored as decimal text.

use ordcoll_core::{Error, Result, Substrate};

/// Metadata row marker, placed right after the collection prefix
pub(crate) const META_MARKER: u8 = b'|';

/// Registry row holding the next collection id
pub(crate) const NEXT_ID_ROW: &[u8] = b"rc.nextId";

/// Prefix of registry name rows
pub(crate) const NAME_ROW_PREFIX: &[u8] = b"rc.name.";

/// Row prefix for collection `id`
pub(crate) fn collection_prefix(id: u64) -> Vec<u8> {
    format!("vc.{}.", id).into_bytes()
}

/// Metadata row `name` under `prefix`
pub(crate) fn meta_key(prefix: &[u8], name: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 1 + name.len());
    key.extend_from_slice(prefix);
    key.push(META_MARKER);
    key.extend_from_slice(name.as_bytes());
    key
}

/// Registry row mapping `name` to a collection id
pub(crate) fn name_row(name: &str) -> Vec<u8> {
    let mut key = NAME_ROW_PREFIX.to_vec();
    key.extend_from_slice(name.as_bytes());
    key
}

/// Read a decimal counter row
pub(crate) fn read_u64(substrate: &dyn Substrate, key: &[u8]) -> Result<Option<u64>> {
    match read_string(substrate, key)? {
        None => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|_| {
            Error::Corruption(format!(
                "row {:?} holds {:?}, expected an unsigned integer",
                String::from_utf8_lossy(key),
                text
            ))
        }),
    }
}

/// Write a decimal counter row
pub(crate) fn write_u64(substrate: &dyn Substrate, key: &[u8], n: u64) -> Result<()> {
    substrate.set(key, n.to_string().as_bytes())
}

/// Read a UTF-8 text row
pub(crate) fn read_string(substrate: &dyn Substrate, key: &[u8]) -> Result<Option<String>> {
    match substrate.get(key)? {
        None => Ok(None),
        Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| {
            Error::Corruption(format!(
                "row {:?} is not UTF-8",
                String::from_utf8_lossy(key)
            ))
        }),
    }
}
