//! Key and value encodings for the document store
//!
//! Keys are the bincode encoding of the `(index, id)` pair. Because bincode
//! writes the index string first, every document of one index shares the
//! encoded index as a key prefix, which is what [`index_prefix`] returns.
//! Values wrap the document source as JSON text.

use super::error::DbError;
use crate::codec::RowIdentifier;
use bincode::{Decode, Encode};
use serde_json::Value;

/// Database key for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKey(pub RowIdentifier);

impl TryFrom<&DocumentKey> for Vec<u8> {
    type Error = DbError;

    fn try_from(key: &DocumentKey) -> Result<Self, Self::Error> {
        Ok(bincode::encode_to_vec(
            (key.0.index(), key.0.id()),
            bincode::config::standard(),
        )?)
    }
}

impl DocumentKey {
    #[must_use]
    pub const fn new(row: RowIdentifier) -> Self {
        Self(row)
    }

    /// # Errors
    ///
    /// Returns `DbError` if the bytes are not an encoded `(index, id)` pair.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DbError> {
        let ((index, id), _): ((String, String), usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(Self(RowIdentifier::new(index, id)))
    }

    #[must_use]
    pub fn into_inner(self) -> RowIdentifier {
        self.0
    }
}

/// Key prefix shared by every document of `index`
///
/// # Errors
///
/// Returns `DbError` if encoding fails.
pub fn index_prefix(index: &str) -> Result<Vec<u8>, DbError> {
    Ok(bincode::encode_to_vec(index, bincode::config::standard())?)
}

/// Stored document body
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// `_source` serialized as JSON
    pub source: String,
}

impl StoredDocument {
    /// # Errors
    ///
    /// Returns `DbError::Json` if the source cannot be serialized.
    pub fn from_source(source: &Value) -> Result<Self, DbError> {
        Ok(Self {
            source: serde_json::to_string(source)?,
        })
    }

    /// # Errors
    ///
    /// Returns `DbError::Json` if the stored text is not valid JSON.
    pub fn to_source(&self) -> Result<Value, DbError> {
        Ok(serde_json::from_str(&self.source)?)
    }

    /// # Errors
    ///
    /// Returns `DbError` if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DbError> {
        Ok(bincode::encode_to_vec(self, bincode::config::standard())?)
    }

    /// # Errors
    ///
    /// Returns `DbError` if the bytes are not an encoded document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DbError> {
        let (doc, _): (Self, usize) = bincode::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(doc)
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
