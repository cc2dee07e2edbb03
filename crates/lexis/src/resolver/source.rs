//! Lookup sources selected by the user
//!
//! Names are the labels shown in source pickers; they are parsed once into a
//! tagged enum and never compared as strings during a lookup.

use std::fmt;

/// Label of the remote definition source
pub const WIKTIONARY: &str = "Wiktionary (English)";

/// Label of the machine translation source
pub const TRANSLATION: &str = "Google Translate";

/// Label of the Forvo source returning every recording
pub const FORVO_ALL: &str = "Forvo (all)";

/// Label of the Forvo source returning the best recording
pub const FORVO_BEST: &str = "Forvo (best)";

/// Label of the source merging every local audio library
pub const ALL_LOCAL: &str = "<all>";

/// Per-lookup overrides of the configured translation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TranslationOptions {
  /// Target language; the configured one when `None`
  pub target: Option<String>,
  /// Translation service instance; the configured one when `None`
  pub endpoint: Option<String>,
}

/// Where a definition is looked up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefinitionSource {
  /// Remote definition API
  Wiktionary,
  /// Machine translation
  Translation(TranslationOptions),
  /// Imported dictionary with this name
  Local(String),
}

impl DefinitionSource {
  /// Parses a source label; any unknown label names a local dictionary.
  pub fn from_name(name: &str) -> Self {
    match name {
      WIKTIONARY => Self::Wiktionary,
      TRANSLATION => Self::Translation(TranslationOptions::default()),
      other => Self::Local(other.to_string()),
    }
  }

  /// Translation into `target`, optionally through another service instance.
  pub fn translation_into(target: &str, endpoint: Option<&str>) -> Self {
    Self::Translation(TranslationOptions {
      target: Some(target.to_string()),
      endpoint: endpoint.map(str::to_string),
    })
  }

  /// Label of this source
  pub fn name(&self) -> &str {
    match self {
      Self::Wiktionary => WIKTIONARY,
      Self::Translation(_) => TRANSLATION,
      Self::Local(name) => name,
    }
  }
}

impl fmt::Display for DefinitionSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Where pronunciations are looked up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AudioSource {
  /// Every Forvo recording
  ForvoAll,
  /// The best rated Forvo recording
  ForvoBest,
  /// Every local audio library of the language, merged
  AllLocal,
  /// Local audio library with this name
  Local(String),
}

impl AudioSource {
  /// Parses a source label; any unknown label names a local audio library.
  pub fn from_name(name: &str) -> Self {
    match name {
      FORVO_ALL => Self::ForvoAll,
      FORVO_BEST => Self::ForvoBest,
      ALL_LOCAL => Self::AllLocal,
      other => Self::Local(other.to_string()),
    }
  }

  /// Label of this source
  pub fn name(&self) -> &str {
    match self {
      Self::ForvoAll => FORVO_ALL,
      Self::ForvoBest => FORVO_BEST,
      Self::AllLocal => ALL_LOCAL,
      Self::Local(name) => name,
    }
  }
}

impl fmt::Display for AudioSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_labels_parse_to_remote_sources() {
    assert_eq!(DefinitionSource::from_name("Wiktionary (English)"), DefinitionSource::Wiktionary);
    assert_eq!(
      DefinitionSource::from_name("Google Translate"),
      DefinitionSource::Translation(TranslationOptions::default())
    );
    assert_eq!(AudioSource::from_name("Forvo (best)"), AudioSource::ForvoBest);
    assert_eq!(AudioSource::from_name("<all>"), AudioSource::AllLocal);
  }

  #[test]
  fn other_labels_are_local_dictionaries() {
    let source = DefinitionSource::from_name("Collins");

    assert_eq!(source, DefinitionSource::Local("Collins".to_string()));
    assert_eq!(source.to_string(), "Collins");
    assert_eq!(AudioSource::from_name("forvo-dump").name(), "forvo-dump");
  }

  #[test]
  fn translation_overrides_keep_the_label() {
    let source = DefinitionSource::translation_into("fr", Some("https://lingva.example"));

    assert_eq!(source.name(), "Google Translate");
    let DefinitionSource::Translation(options) = source else { panic!("not a translation") };
    assert_eq!(options.target.as_deref(), Some("fr"));
    assert_eq!(options.endpoint.as_deref(), Some("https://lingva.example"));
  }
}
