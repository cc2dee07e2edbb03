//! Tantivy schema of the entry index
//!
//! One document per dictionary entry. Nothing is tokenized: every lookup is an
//! exact term match.

use tantivy::schema::{Field, STORED, STRING, Schema};

use crate::errors::StoreError;

/// Separates dictionary name and headword inside the `key` field.
///
/// U+001F (unit separator) does not occur in dictionary names or headwords.
pub const KEY_SEPARATOR: char = '\u{1f}';

/// Typed handles of the entry schema fields.
#[derive(Clone, Copy, Debug)]
pub struct StoreFields {
  /// Owning dictionary name (STRING + STORED)
  pub dictionary: Field,
  /// Headword as imported, case preserved (STRING + STORED)
  pub headword: Field,
  /// `dictionary U+001F headword` (STRING), the upsert and lookup key
  pub key: Field,
  /// Entry payload (STORED only)
  pub payload: Field,
}

impl StoreFields {
  /// Rebuilds the field handles from an on-disk schema.
  ///
  /// # Errors
  /// `StoreError::MissingField` if the index was not created by this crate.
  pub fn from_schema(schema: &Schema) -> Result<Self, StoreError> {
    let field = |name: &str| {
      schema.get_field(name).map_err(|_| StoreError::MissingField { field: name.to_string() })
    };

    Ok(Self {
      dictionary: field("dictionary")?,
      headword: field("headword")?,
      key: field("key")?,
      payload: field("payload")?,
    })
  }
}

/// Builds the entry schema.
pub fn build_schema() -> (Schema, StoreFields) {
  let mut builder = Schema::builder();

  let dictionary = builder.add_text_field("dictionary", STRING | STORED);
  let headword = builder.add_text_field("headword", STRING | STORED);
  let key = builder.add_text_field("key", STRING);
  let payload = builder.add_text_field("payload", STORED);

  (builder.build(), StoreFields { dictionary, headword, key, payload })
}

/// Upsert key of `(dictionary, headword)`
pub fn entry_key(dictionary: &str, headword: &str) -> String {
  format!("{dictionary}{KEY_SEPARATOR}{headword}")
}
