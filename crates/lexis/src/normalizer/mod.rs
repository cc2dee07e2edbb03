//! normalizer module
//!
//! Deterministic text normalization feeding lookup and frequency ranking:
//! stress-mark folding and per-language lemmatization.
//!
//! What each language gets is decided by a single capability table
//! ([`LanguageProfile::for_language`]).

pub mod accents;
pub mod lemmatizer;
pub mod lexicon;
pub mod russian;
pub mod suffixes;

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::errors::ConfigError;

pub use accents::fold_cyrillic_stress;
pub use lemmatizer::{IdentityLemmatizer, Lemmatizer, StemmingLemmatizer};
pub use lexicon::Lexicon;
pub use russian::RussianMorphology;
pub use suffixes::SuffixRules;

/// Languages served by the lexicon/suffix-rule/Snowball lemmatizer.
pub const RULE_LEMMATIZER_LANGUAGES: &[&str] = &[
  "bg", "ca", "cy", "da", "de", "en", "es", "et", "fa", "fi", "fr", "ga", "gd", "gl", "gv", "hu",
  "id", "it", "ka", "la", "lb", "lt", "lv", "nl", "pl", "pt", "ro", "ru", "sk", "sl", "sv", "tr",
  "uk", "ur",
];

/// Lemmatization strategy of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LemmatizerKind {
  /// Scored ending rules (Russian)
  Morphological,
  /// Lexicon lookup, then Snowball stemming when greedy
  RuleBased,
  /// No lemmatization
  Identity,
}

/// Accent folding applied before lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentFolding {
  /// Text is left alone
  None,
  /// Cyrillic stress marks are removed
  CyrillicStress,
}

/// Per-language normalization capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
  /// How words are lemmatized
  pub lemmatizer: LemmatizerKind,
  /// How accents are folded
  pub accent_folding: AccentFolding,
}

impl LanguageProfile {
  /// Capability entry for a language code
  pub fn for_language(language: &str) -> Self {
    match language {
      "ru" => Self {
        lemmatizer: LemmatizerKind::Morphological,
        accent_folding: AccentFolding::CyrillicStress,
      },
      lang if RULE_LEMMATIZER_LANGUAGES.contains(&lang) => {
        Self { lemmatizer: LemmatizerKind::RuleBased, accent_folding: AccentFolding::None }
      }
      _ => Self { lemmatizer: LemmatizerKind::Identity, accent_folding: AccentFolding::None },
    }
  }
}

/// Accent stripping and lemmatization for every supported language.
///
/// Built once (lexicons are read at construction) and shared; calls do no I/O.
#[derive(Debug)]
pub struct Normalizer {
  russian: RussianMorphology,
  russian_lexicon: Option<Lexicon>,
  rule_based: HashMap<&'static str, StemmingLemmatizer>,
}

impl Default for Normalizer {
  fn default() -> Self {
    Self::with_lexicons(HashMap::new())
  }
}

impl Normalizer {
  /// Normalizer with built-in rules only
  pub fn new() -> Self {
    Self::default()
  }

  /// Normalizer with pre-loaded lexicons, keyed by language code.
  ///
  /// Lexicons for languages without a lemmatizer are ignored.
  pub fn with_lexicons(mut lexicons: HashMap<String, Lexicon>) -> Self {
    let rule_based = RULE_LEMMATIZER_LANGUAGES
      .iter()
      .filter(|&&lang| lang != "ru")
      .map(|&lang| (lang, StemmingLemmatizer::new(lang, lexicons.remove(lang))))
      .collect();
    Self { russian: RussianMorphology::new(), russian_lexicon: lexicons.remove("ru"), rule_based }
  }

  /// Loads `<lang>.tsv` lexicons from `dir`.
  ///
  /// # Errors
  /// `ConfigError::ReadFailed` if the directory or a lexicon file cannot be read.
  pub fn from_lexicon_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
    Ok(Self::with_lexicons(lexicon::load_lexicons(dir)?))
  }

  /// Removes stress marks for languages with an accent-folding table.
  ///
  /// Identity for every other language.
  pub fn strip_accents(&self, word: &str, language: &str) -> String {
    match LanguageProfile::for_language(language).accent_folding {
      AccentFolding::CyrillicStress => fold_cyrillic_stress(word),
      AccentFolding::None => word.to_string(),
    }
  }

  /// Returns the lemma of `word` in `language`.
  ///
  /// Languages without a lemmatizer return the word unchanged.
  pub fn lemmatize(&self, word: &str, language: &str, greedy: bool) -> String {
    let lemma = match LanguageProfile::for_language(language).lemmatizer {
      LemmatizerKind::Morphological => {
        match self.russian_lexicon.as_ref().and_then(|l| l.lemma(word)) {
          Some(lemma) => lemma.to_string(),
          None => self.russian.lemmatize(word, greedy),
        }
      }
      LemmatizerKind::RuleBased => match self.rule_based.get(language) {
        Some(lemmatizer) => lemmatizer.lemmatize(word, greedy),
        None => word.to_string(),
      },
      LemmatizerKind::Identity => IdentityLemmatizer.lemmatize(word, greedy),
    };
    debug!(word, language, greedy, lemma = %lemma, "lemmatized");
    lemma
  }

  /// Accent stripping (where the language has a folding table) followed by lemmatization.
  pub fn apply_lemmatization(&self, word: &str, language: &str, greedy: bool) -> String {
    let stripped = self.strip_accents(word, language);
    self.lemmatize(&stripped, language, greedy)
  }
}
