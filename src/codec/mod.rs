//! Selection token codec
//!
//! Turns a [`RowIdentifier`] into an opaque [`SelectionToken`] that survives a
//! round trip through a stateless form submission, and back again.
//!
//! # Format
//!
//! The canonical payload is a compact JSON object holding exactly two string
//! fields, serialized with keys in lexicographic order:
//!
//! ```text
//! {"id":"<document id>","index":"<index name>"}
//! ```
//!
//! The payload bytes are then base64 encoded with the standard padded alphabet,
//! which keeps the token safe as an HTML form value.
//!
//! Decoding is strict. A token is only accepted if re-encoding the decoded
//! identifier reproduces the exact same payload, so extra fields, missing
//! fields, non-string values, duplicate keys and alternative JSON spellings
//! are all hard failures instead of being coerced.

pub mod error;

pub use error::CodecError;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const INDEX_FIELD: &str = "index";
const ID_FIELD: &str = "id";
const FIELD_COUNT: usize = 2;

/// Identity of one document in the search index
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowIdentifier {
    index: String,
    id: String,
}

impl RowIdentifier {
    /// Create an identifier from an index name and a document id
    #[must_use]
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
        }
    }

    /// Name of the index holding the document
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Document id within the index
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Encode this identifier into its selection token
    #[must_use]
    pub fn token(&self) -> SelectionToken {
        encode(self)
    }
}

impl fmt::Display for RowIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.id)
    }
}

/// Opaque, form-safe text encoding of a [`RowIdentifier`]
///
/// Tokens are produced by [`encode`]. Values coming back from a form
/// submission are wrapped with [`SelectionToken::submitted`] and are only
/// trusted once [`decode`] accepts them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionToken(String);

impl SelectionToken {
    /// Wrap a raw value received from a form submission
    #[must_use]
    pub fn submitted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The token text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SelectionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encode an identifier into its canonical selection token
#[must_use]
pub fn encode(row: &RowIdentifier) -> SelectionToken {
    SelectionToken(BASE64.encode(canonical_payload(row)))
}

/// Decode a selection token back into the identifier it was produced from
///
/// # Errors
///
/// Returns `CodecError` if the token is not valid base64, the payload is not
/// UTF-8 JSON, the payload does not hold exactly the `index` and `id` string
/// fields, or the payload is not in canonical form.
pub fn decode(token: impl AsRef<str>) -> Result<RowIdentifier, CodecError> {
    let bytes = BASE64.decode(token.as_ref())?;
    let payload = String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;

    let value: Value = serde_json::from_str(&payload)
        .map_err(|e| CodecError::MalformedPayload(e.to_string()))?;

    let Value::Object(fields) = value else {
        return Err(CodecError::MalformedPayload(
            "payload is not a JSON object".to_string(),
        ));
    };

    if fields.len() != FIELD_COUNT {
        return Err(CodecError::InvalidArity {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let row = RowIdentifier::new(
        string_field(&fields, INDEX_FIELD)?,
        string_field(&fields, ID_FIELD)?,
    );

    if canonical_payload(&row) != payload {
        return Err(CodecError::NonCanonical);
    }

    Ok(row)
}

fn string_field<'a>(fields: &'a Map<String, Value>, name: &'static str) -> Result<&'a str, CodecError> {
    match fields.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(CodecError::InvalidField(name)),
        None => Err(CodecError::MissingField(name)),
    }
}

/// Compact JSON with keys sorted, which is the fixed field order
fn canonical_payload(row: &RowIdentifier) -> String {
    let mut fields = Map::new();
    fields.insert(ID_FIELD.to_string(), Value::String(row.id.clone()));
    fields.insert(INDEX_FIELD.to_string(), Value::String(row.index.clone()));
    Value::Object(fields).to_string()
}
