//! Lemmatizer trait and the lexicon/Snowball lemmatizer

use rust_stemmers::{Algorithm, Stemmer};

use super::lexicon::Lexicon;
use super::suffixes::SuffixRules;

/// Maps an inflected word form to its dictionary form.
///
/// Implementations are deterministic and do no I/O.
pub trait Lemmatizer: Send + Sync {
  /// Returns the lemma of `word`.
  ///
  /// `greedy` allows more aggressive reductions that may overshoot.
  fn lemmatize(&self, word: &str, greedy: bool) -> String;
}

/// Snowball algorithm for a language code, if rust-stemmers has one.
pub fn snowball_algorithm(language: &str) -> Option<Algorithm> {
  let algorithm = match language {
    "da" => Algorithm::Danish,
    "de" => Algorithm::German,
    "en" => Algorithm::English,
    "es" => Algorithm::Spanish,
    "fi" => Algorithm::Finnish,
    "fr" => Algorithm::French,
    "hu" => Algorithm::Hungarian,
    "it" => Algorithm::Italian,
    "nl" => Algorithm::Dutch,
    "pt" => Algorithm::Portuguese,
    "ro" => Algorithm::Romanian,
    "ru" => Algorithm::Russian,
    "sv" => Algorithm::Swedish,
    "tr" => Algorithm::Turkish,
    _ => return None,
  };
  Some(algorithm)
}

/// Lexicon lookup, then inflection suffix rules, then (greedy only) Snowball
/// stemming.
///
/// A non-greedy call only reverses conservative endings such as plurals and
/// otherwise returns the word unchanged.
pub struct StemmingLemmatizer {
  lexicon: Option<Lexicon>,
  suffixes: SuffixRules,
  stemmer: Option<Stemmer>,
}

impl std::fmt::Debug for StemmingLemmatizer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StemmingLemmatizer")
      .field("lexicon_forms", &self.lexicon.as_ref().map(Lexicon::len))
      .field("has_suffix_rules", &!self.suffixes.is_empty())
      .field("has_stemmer", &self.stemmer.is_some())
      .finish()
  }
}

impl StemmingLemmatizer {
  /// Builds the lemmatizer for `language` with an optional lexicon.
  pub fn new(language: &str, lexicon: Option<Lexicon>) -> Self {
    Self {
      lexicon,
      suffixes: SuffixRules::for_language(language),
      stemmer: snowball_algorithm(language).map(Stemmer::create),
    }
  }
}

impl Lemmatizer for StemmingLemmatizer {
  fn lemmatize(&self, word: &str, greedy: bool) -> String {
    if let Some(lemma) = self.lexicon.as_ref().and_then(|lexicon| lexicon.lemma(word)) {
      return lemma.to_string();
    }
    if let Some(lemma) = self.suffixes.apply(word, greedy) {
      return lemma;
    }
    match &self.stemmer {
      Some(stemmer) if greedy => stemmer.stem(&word.to_lowercase()).into_owned(),
      _ => word.to_string(),
    }
  }
}

/// Returns the word unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
  fn lemmatize(&self, word: &str, _greedy: bool) -> String {
    word.to_string()
  }
}
