//! Data Model Definition
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::ImportError;

/// Pronunciation label -> playable locator (local path or URL).
///
/// Ordered so that merged results from several libraries are deterministic.
pub type AudioMap = BTreeMap<String, String>;

/// What the payload of a dictionary's entries means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryKind {
  /// Definition text (plain, HTML or JSON)
  Glossary,
  /// Stringified 1-based frequency rank
  Freq,
  /// JSON array of audio file paths relative to the library root
  Audiolib,
}

impl DictionaryKind {
  /// Name used in the registry and in caller settings
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Glossary => "glossary",
      Self::Freq => "freq",
      Self::Audiolib => "audiolib",
    }
  }
}

impl fmt::Display for DictionaryKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Source formats accepted by the importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryFormat {
  /// StarDict (`.ifo` + `.idx` + `.dict`/`.dict.dz`)
  Stardict,
  /// Flat JSON object `{headword: definition}`
  Json,
  /// Migaku JSON array `[{term, definition}]`
  Migaku,
  /// JSON array of words, most frequent first
  Freq,
  /// Directory tree of audio files
  Audiolib,
  /// MDict `.mdx`
  Mdx,
  /// ABBYY Lingvo DSL
  Dsl,
  /// Comma separated values
  Csv,
  /// Tab separated values
  Tsv,
}

impl DictionaryFormat {
  /// All formats, in the order they are offered to users
  pub const ALL: [Self; 9] = [
    Self::Stardict,
    Self::Json,
    Self::Migaku,
    Self::Freq,
    Self::Audiolib,
    Self::Mdx,
    Self::Dsl,
    Self::Csv,
    Self::Tsv,
  ];

  /// Lower-case format name
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Stardict => "stardict",
      Self::Json => "json",
      Self::Migaku => "migaku",
      Self::Freq => "freq",
      Self::Audiolib => "audiolib",
      Self::Mdx => "mdx",
      Self::Dsl => "dsl",
      Self::Csv => "csv",
      Self::Tsv => "tsv",
    }
  }

  /// Kind of dictionary this format produces
  pub fn kind(&self) -> DictionaryKind {
    match self {
      Self::Freq => DictionaryKind::Freq,
      Self::Audiolib => DictionaryKind::Audiolib,
      _ => DictionaryKind::Glossary,
    }
  }
}

impl fmt::Display for DictionaryFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DictionaryFormat {
  type Err = ImportError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.to_lowercase();
    Self::ALL
      .into_iter()
      .find(|format| format.as_str() == lower)
      .ok_or_else(|| ImportError::UnknownFormat(s.to_string()))
  }
}

/// Registry record describing one imported dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryMetadata {
  /// Globally unique dictionary name
  pub name: String,

  /// Language code (ISO 639-1)
  pub language: String,

  /// Payload semantics
  pub kind: DictionaryKind,

  /// Source format the dictionary was imported from
  pub format: DictionaryFormat,

  /// Time the import committed (UTC)
  pub created_at: DateTime<Utc>,
}

/// The caller's settings record for an imported dictionary.
///
/// Audio libraries are indexed in the store but the files stay where they are,
/// so `path` is needed to turn stored relative paths into locators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDictionary {
  /// Dictionary name, matching the registry
  pub name: String,

  /// Language code
  pub lang: String,

  /// Dictionary kind
  #[serde(rename = "type")]
  pub kind: DictionaryKind,

  /// Source path the dictionary was imported from
  pub path: PathBuf,
}

impl CustomDictionary {
  /// Constructor for CustomDictionary
  pub fn new(
    name: impl Into<String>,
    lang: impl Into<String>,
    kind: DictionaryKind,
    path: impl Into<PathBuf>,
  ) -> Self {
    Self { name: name.into(), lang: lang.into(), kind, path: path.into() }
  }
}

/// One parsed `(headword, payload)` pair produced by an importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
  /// Headword as found in the source (case preserved)
  pub headword: String,

  /// Payload, interpreted according to the dictionary kind
  pub payload: String,
}

impl DictionaryEntry {
  /// Constructor for DictionaryEntry
  pub fn new(headword: impl Into<String>, payload: impl Into<String>) -> Self {
    Self { headword: headword.into(), payload: payload.into() }
  }
}

/// Frequency rank of a word within a frequency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
  /// 1-based rank, 1 is the most frequent
  pub rank: u64,

  /// Number of entries in the list
  pub corpus_size: u64,
}

/// Senses of one part of speech returned by a definition API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseGroup {
  /// Part of speech label, may be empty
  pub part_of_speech: String,

  /// Meanings, in source order
  pub senses: Vec<String>,
}

impl SenseGroup {
  /// Constructor for SenseGroup
  pub fn new(part_of_speech: impl Into<String>, senses: Vec<String>) -> Self {
    Self { part_of_speech: part_of_speech.into(), senses }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn format_parses_case_insensitively() {
    assert_eq!("StarDict".parse::<DictionaryFormat>().unwrap(), DictionaryFormat::Stardict);
    assert_eq!("tsv".parse::<DictionaryFormat>().unwrap(), DictionaryFormat::Tsv);
  }

  #[test]
  fn unknown_format_is_rejected() {
    let err = "xls".parse::<DictionaryFormat>().unwrap_err();
    assert!(matches!(err, ImportError::UnknownFormat(name) if name == "xls"));
  }

  #[test]
  fn format_maps_to_kind() {
    assert_eq!(DictionaryFormat::Freq.kind(), DictionaryKind::Freq);
    assert_eq!(DictionaryFormat::Audiolib.kind(), DictionaryKind::Audiolib);
    assert_eq!(DictionaryFormat::Mdx.kind(), DictionaryKind::Glossary);
  }

  #[test]
  fn custom_dictionary_uses_type_key() {
    let json = r#"{"name":"forvo-dump","lang":"ru","type":"audiolib","path":"/audio"}"#;
    let dict: CustomDictionary = serde_json::from_str(json).unwrap();

    assert_eq!(dict.kind, DictionaryKind::Audiolib);
    assert_eq!(dict.path, PathBuf::from("/audio"));
  }
}
