//! # Canonical Encoding: JCS Byte Production
//!
//! `CanonicalBytes` is the deterministic byte form of a decoded document
//! or any part of one. Two documents that decode to equal trees always
//! produce identical canonical bytes, whatever key order, whitespace, or
//! number spelling their sources used.
//!
//! Serialization uses `serde_jcs` for RFC 8785 (JSON Canonicalization
//! Scheme) output: sorted keys, compact separators, and ECMAScript number
//! formatting for fractional values. Integers are written exactly. Under
//! ECMAScript formatting an integral float such as `5.0` is written `5`,
//! so canonical bytes are for comparison, not for preserving the
//! integer/float distinction of the Value model.
//!
//! Unlike plain `serde_json::to_vec` (already deterministic for this
//! crate's types, whose maps are ordered), canonical output is also
//! stable across producers that emit `1.0e1` vs `10.0` or escape
//! non-ASCII differently, which makes it suitable for byte comparison
//! of documents.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// The inner `Vec<u8>` is private; the only constructor is
/// [`CanonicalBytes::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let s = serde_jcs::to_string(obj)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The canonical bytes as text. Always valid UTF-8.
    pub fn as_str(&self) -> &str {
        // JCS output is produced from a `String`.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes self and returns the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
