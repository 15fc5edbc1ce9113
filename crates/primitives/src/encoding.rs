//! Order-preserving key encoding
//!
//! Every key encodes to a byte string beginning with a one-byte kind tag.
//! For any two keys `a` and `b`, `encode(a) < encode(b)` byte-wise exactly
//! when `a` sorts before `b`. Byte-ordered substrate iteration therefore
//! visits entries in key order.
//!
//! ## Tags
//!
//! | Tag | Kind | Body |
//! |-----|------|------|
//! | `b` | boolean | `true` or `false` |
//! | `m` | number, sign bit set | 16 hex digits, all bits inverted |
//! | `n` | bigint, negative | `{10^10 - len:010}:{10^len + n:0len}` |
//! | `p` | bigint, non-negative | `{len:010}:{digits}` |
//! | `q` | number, sign bit clear | 16 hex digits, sign bit flipped |
//! | `r` | capability reference | `{ordinal:010}:{id}` |
//! | `s` | string | raw UTF-8 |
//! | `v` | null | empty |
//! | `y` | symbol | symbol name |
//! | `z` | undefined | empty |
//!
//! Numbers and bigints interleave by sign: all negatives of either kind sort
//! before all non-negatives. Within one sign, numbers sit on the outside:
//! negative numbers before negative bigints, non-negative bigints before
//! non-negative numbers. Within each tag the body is fixed-width or
//! length-prefixed, so lexicographic byte order equals numeric order.
//!
//! Capability references have no intrinsic order. Their body leads with an
//! ordinal assigned when the reference was first added to the collection,
//! so references iterate in insertion order.

use num_bigint::{BigInt, Sign};

use ordcoll_core::{CapRef, Error, Key, KeyEncoder, KeyKind, Limits, Result};

/// Tag byte for booleans
pub const BOOLEAN_TAG: u8 = b'b';
/// Tag byte for numbers with the sign bit set
pub const NEGATIVE_NUMBER_TAG: u8 = b'm';
/// Tag byte for negative bigints
pub const NEGATIVE_BIGINT_TAG: u8 = b'n';
/// Tag byte for non-negative bigints
pub const BIGINT_TAG: u8 = b'p';
/// Tag byte for numbers with the sign bit clear
pub const NUMBER_TAG: u8 = b'q';
/// Tag byte for capability references
pub const CAP_REF_TAG: u8 = b'r';
/// Tag byte for strings
pub const STRING_TAG: u8 = b's';
/// Tag byte for null
pub const NULL_TAG: u8 = b'v';
/// Tag byte for symbols
pub const SYMBOL_TAG: u8 = b'y';
/// Tag byte for undefined
pub const UNDEFINED_TAG: u8 = b'z';

/// One past the largest tag byte; upper bound of the full cover
const COVER_END: u8 = b'{';

/// Width of the ordinal and bigint length fields
pub const FIELD_WIDTH: usize = 10;

const FIELD_MODULUS: u64 = 10_000_000_000;
const SIGN_BIT: u64 = 1 << 63;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a key
///
/// `ordinal_of` supplies the ordinal for a capability reference key and is
/// not called for any other kind.
pub fn encode_key<F>(key: &Key, ordinal_of: F) -> Result<Vec<u8>>
where
    F: FnOnce(&CapRef) -> Result<u64>,
{
    let mut out = Vec::new();
    match key {
        Key::Bool(b) => {
            out.push(BOOLEAN_TAG);
            out.extend_from_slice(if *b { b"true" } else { b"false" });
        }
        Key::Number(n) => encode_number(*n, &mut out),
        Key::BigInt(n) => encode_bigint(n, &mut out),
        Key::CapRef(cap) => {
            let ordinal = ordinal_of(cap)?;
            out.push(CAP_REF_TAG);
            out.extend_from_slice(zero_pad(ordinal, FIELD_WIDTH)?.as_bytes());
            out.push(b':');
            out.extend_from_slice(cap.id().as_bytes());
        }
        Key::String(s) => {
            out.push(STRING_TAG);
            out.extend_from_slice(s.as_bytes());
        }
        Key::Null => out.push(NULL_TAG),
        Key::Symbol(name) => {
            out.push(SYMBOL_TAG);
            out.extend_from_slice(name.as_bytes());
        }
        Key::Undefined => out.push(UNDEFINED_TAG),
    }
    Ok(out)
}

fn encode_number(n: f64, out: &mut Vec<u8>) {
    let bits = n.to_bits();
    let (tag, mapped) = if bits & SIGN_BIT != 0 {
        (NEGATIVE_NUMBER_TAG, !bits)
    } else {
        (NUMBER_TAG, bits ^ SIGN_BIT)
    };
    out.push(tag);
    out.extend_from_slice(format!("{:016x}", mapped).as_bytes());
}

fn encode_bigint(n: &BigInt, out: &mut Vec<u8>) {
    let digits = n.magnitude().to_string();
    let len = digits.len();
    if n.sign() == Sign::Minus {
        // Longer magnitudes must sort first, so the length field counts down
        // and the digits are the complement against 10^len.
        let residue = BigInt::from(10u32).pow(len as u32) + n;
        out.push(NEGATIVE_BIGINT_TAG);
        out.extend_from_slice(format!("{:010}", FIELD_MODULUS - len as u64).as_bytes());
        out.push(b':');
        out.extend_from_slice(format!("{:0>width$}", residue.to_string(), width = len).as_bytes());
    } else {
        out.push(BIGINT_TAG);
        out.extend_from_slice(format!("{:010}", len).as_bytes());
        out.push(b':');
        out.extend_from_slice(digits.as_bytes());
    }
}

fn zero_pad(n: u64, width: usize) -> Result<String> {
    let s = format!("{:0width$}", n, width = width);
    if s.len() > width {
        return Err(Error::Corruption(format!(
            "{} does not fit in {} digits",
            n, width
        )));
    }
    Ok(s)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a key produced by [`encode_key`]
///
/// Capability references decode from their id; the ordinal is checked for
/// shape and discarded.
pub fn decode_key(bytes: &[u8]) -> Result<Key> {
    let (&tag, body) = bytes
        .split_first()
        .ok_or_else(|| invalid(bytes, "empty key"))?;
    match tag {
        BOOLEAN_TAG => match body {
            b"true" => Ok(Key::Bool(true)),
            b"false" => Ok(Key::Bool(false)),
            _ => Err(invalid(bytes, "boolean must be true or false")),
        },
        NEGATIVE_NUMBER_TAG | NUMBER_TAG => decode_number(tag, body, bytes),
        NEGATIVE_BIGINT_TAG | BIGINT_TAG => decode_bigint(tag, body, bytes),
        CAP_REF_TAG => {
            let (ordinal, id) = split_field(body).ok_or_else(|| invalid(bytes, "bad ordinal"))?;
            parse_digits(ordinal).ok_or_else(|| invalid(bytes, "bad ordinal"))?;
            Ok(Key::CapRef(CapRef::new(utf8(id, bytes)?)))
        }
        STRING_TAG => Ok(Key::String(utf8(body, bytes)?)),
        NULL_TAG if body.is_empty() => Ok(Key::Null),
        SYMBOL_TAG => Ok(Key::Symbol(utf8(body, bytes)?)),
        UNDEFINED_TAG if body.is_empty() => Ok(Key::Undefined),
        NULL_TAG | UNDEFINED_TAG => Err(invalid(bytes, "unexpected trailing bytes")),
        _ => Err(invalid(bytes, "unknown kind tag")),
    }
}

fn decode_number(tag: u8, body: &[u8], bytes: &[u8]) -> Result<Key> {
    let lower_hex = |b: &u8| b.is_ascii_digit() || (b'a'..=b'f').contains(b);
    if body.len() != 16 || !body.iter().all(lower_hex) {
        return Err(invalid(bytes, "number body must be 16 hex digits"));
    }
    let hex = std::str::from_utf8(body).map_err(|_| invalid(bytes, "number body is not hex"))?;
    let mapped = u64::from_str_radix(hex, 16).map_err(|_| invalid(bytes, "number body is not hex"))?;
    let negative = tag == NEGATIVE_NUMBER_TAG;
    // The top bit of the body is set exactly for non-negative numbers.
    if (mapped & SIGN_BIT != 0) == negative {
        return Err(invalid(bytes, "number tag disagrees with sign"));
    }
    let bits = if negative { !mapped } else { mapped ^ SIGN_BIT };
    Ok(Key::Number(f64::from_bits(bits)))
}

fn decode_bigint(tag: u8, body: &[u8], bytes: &[u8]) -> Result<Key> {
    let (len_field, digits) = split_field(body).ok_or_else(|| invalid(bytes, "bad length field"))?;
    let len_field = parse_digits(len_field).ok_or_else(|| invalid(bytes, "bad length field"))?;
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid(bytes, "bigint body must be decimal digits"));
    }
    let expected_len = if tag == NEGATIVE_BIGINT_TAG {
        FIELD_MODULUS - len_field
    } else {
        len_field
    };
    if digits.len() as u64 != expected_len {
        return Err(invalid(bytes, "bigint length field disagrees with body"));
    }
    let value = BigInt::parse_bytes(digits, 10).ok_or_else(|| invalid(bytes, "bad bigint digits"))?;
    if tag != NEGATIVE_BIGINT_TAG {
        if digits.len() > 1 && digits[0] == b'0' {
            return Err(invalid(bytes, "bigint has leading zeros"));
        }
        return Ok(Key::BigInt(value));
    }
    // The residue must leave a magnitude of exactly the declared width
    let value = value - BigInt::from(10u32).pow(digits.len() as u32);
    if value.magnitude().to_str_radix(10).len() != digits.len() {
        return Err(invalid(bytes, "bigint residue disagrees with length field"));
    }
    Ok(Key::BigInt(value))
}

/// Split a `{10 digits}:{rest}` body
fn split_field(body: &[u8]) -> Option<(&[u8], &[u8])> {
    if body.len() <= FIELD_WIDTH || body[FIELD_WIDTH] != b':' {
        return None;
    }
    Some((&body[..FIELD_WIDTH], &body[FIELD_WIDTH + 1..]))
}

fn parse_digits(field: &[u8]) -> Option<u64> {
    if !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}

fn utf8(body: &[u8], bytes: &[u8]) -> Result<String> {
    String::from_utf8(body.to_vec()).map_err(|_| invalid(bytes, "body is not UTF-8"))
}

fn invalid(bytes: &[u8], reason: &str) -> Error {
    Error::InvalidDatabaseKeyEncoding(format!(
        "{}: {:?}",
        reason,
        String::from_utf8_lossy(bytes)
    ))
}

// =============================================================================
// Covers
// =============================================================================

/// Tag range `[start, end)` holding every encoding of `kind`
///
/// Numbers span both number tags and therefore also the bigint tags
/// between them; callers re-test candidates with the full pattern.
pub fn kind_cover(kind: KeyKind) -> (Vec<u8>, Vec<u8>) {
    let (start, end) = match kind {
        KeyKind::Boolean => (BOOLEAN_TAG, BOOLEAN_TAG + 1),
        KeyKind::Number => (NEGATIVE_NUMBER_TAG, NUMBER_TAG + 1),
        KeyKind::BigInt => (NEGATIVE_BIGINT_TAG, BIGINT_TAG + 1),
        KeyKind::CapRef => (CAP_REF_TAG, CAP_REF_TAG + 1),
        KeyKind::String => (STRING_TAG, STRING_TAG + 1),
        KeyKind::Null => (NULL_TAG, NULL_TAG + 1),
        KeyKind::Symbol => (SYMBOL_TAG, SYMBOL_TAG + 1),
        KeyKind::Undefined => (UNDEFINED_TAG, UNDEFINED_TAG + 1),
    };
    (vec![start], vec![end])
}

/// Range holding every key encoding
pub fn full_cover() -> (Vec<u8>, Vec<u8>) {
    (Vec::new(), vec![COVER_END])
}

/// Entry-key encoder handed to [`ordcoll_core::Pattern::rank_cover`]
///
/// Patterns never ask for the encoding of a capability reference bound, so
/// this encoder has no ordinal source and rejects them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverEncoder;

impl KeyEncoder for CoverEncoder {
    fn encode(&self, key: &Key) -> Result<Vec<u8>> {
        encode_key(key, |cap| {
            Err(Error::InvalidPattern(format!(
                "capability reference {} has no position in a range",
                cap
            )))
        })
    }

    fn kind_cover(&self, kind: KeyKind) -> (Vec<u8>, Vec<u8>) {
        kind_cover(kind)
    }

    fn full_cover(&self) -> (Vec<u8>, Vec<u8>) {
        full_cover()
    }
}

// =============================================================================
// KeyCodec
// =============================================================================

/// Key codec bound to one collection's row prefix
///
/// Produces and parses full substrate keys (`prefix` + encoded entry key)
/// and enforces the entry key length limit.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    prefix: Vec<u8>,
    limits: Limits,
}

impl KeyCodec {
    /// Create a codec for rows under `prefix`
    pub fn new(prefix: Vec<u8>, limits: Limits) -> Self {
        KeyCodec { prefix, limits }
    }

    /// Row prefix shared by every entry of the collection
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Full substrate key for `key`
    pub fn encode<F>(&self, key: &Key, ordinal_of: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&CapRef) -> Result<u64>,
    {
        let entry = encode_key(key, ordinal_of)?;
        self.limits.validate_key_len(entry.len())?;
        let mut out = Vec::with_capacity(self.prefix.len() + entry.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(&entry);
        Ok(out)
    }

    /// Decode a full substrate key
    pub fn decode(&self, db_key: &[u8]) -> Result<Key> {
        let entry = db_key.strip_prefix(self.prefix.as_slice()).ok_or_else(|| {
            Error::InvalidDatabaseKeyEncoding(format!(
                "row {:?} is outside the collection",
                String::from_utf8_lossy(db_key)
            ))
        })?;
        decode_key(entry)
    }

    /// Prefix both ends of an entry-key range
    pub fn to_row_range(&self, cover: (Vec<u8>, Vec<u8>)) -> (Vec<u8>, Vec<u8>) {
        let mut start = self.prefix.clone();
        start.extend_from_slice(&cover.0);
        let mut end = self.prefix.clone();
        end.extend_from_slice(&cover.1);
        (start, end)
    }
}
