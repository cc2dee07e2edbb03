//! resolver module
//!
//! Turns a word into a definition, a frequency rank or a set of
//! pronunciations by consulting the user's selected source. Every failure
//! along the way is logged and folded into an empty result.
//!
//! # Logging
//!
//! - A miss (no entry) is logged at `debug`
//! - An unreachable remote source or a failing store at `warn`

pub mod audio;
pub mod definition;
pub mod frequency;
pub mod source;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::RemoteError;
use crate::normalizer::Normalizer;
use crate::remote::{DefinitionApi, PronunciationApi, TranslationApi};
use crate::store::DictionaryStore;

/// Re-export major types
pub use definition::{candidates, format_sense_groups};
pub use source::{AudioSource, DefinitionSource, TranslationOptions};

/// Shared handles consulted by every resolution.
///
/// Holds no per-lookup state; clone the `Arc` and resolve from any task.
pub struct Resolver {
  store: Arc<DictionaryStore>,
  normalizer: Arc<Normalizer>,
  definitions: Arc<dyn DefinitionApi>,
  translation: Arc<dyn TranslationApi>,
  pronunciations: Arc<dyn PronunciationApi>,
  translation_target: String,
}

impl std::fmt::Debug for Resolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Resolver")
      .field("store", &self.store)
      .field("translation_target", &self.translation_target)
      .finish_non_exhaustive()
  }
}

impl Resolver {
  /// Builds a resolver over a store, a normalizer and the remote collaborators.
  ///
  /// `translation_target` is the language definitions are translated into
  /// unless a lookup names another.
  pub fn new(
    store: Arc<DictionaryStore>,
    normalizer: Arc<Normalizer>,
    definitions: Arc<dyn DefinitionApi>,
    translation: Arc<dyn TranslationApi>,
    pronunciations: Arc<dyn PronunciationApi>,
    translation_target: impl Into<String>,
  ) -> Self {
    Self {
      store,
      normalizer,
      definitions,
      translation,
      pronunciations,
      translation_target: translation_target.into(),
    }
  }

  /// The store lookups go to
  pub fn store(&self) -> &DictionaryStore {
    &self.store
  }

  /// The translation collaborator
  pub fn translation(&self) -> &dyn TranslationApi {
    self.translation.as_ref()
  }
}

/// Logs a remote failure; misses at `debug`, unavailability at `warn`.
fn log_remote_failure(source: &str, word: &str, error: &RemoteError) {
  if error.is_unavailable() {
    warn!(source, word, %error, "remote source unavailable");
  } else {
    debug!(source, word, "remote miss");
  }
}

#[cfg(test)]
pub(crate) mod fakes {
  //! In-process collaborators for resolver and service tests

  use std::collections::HashMap;
  use std::sync::{Arc, Mutex};

  use async_trait::async_trait;
  use tempfile::TempDir;

  use crate::errors::RemoteError;
  use crate::models::{AudioMap, SenseGroup};
  use crate::normalizer::Normalizer;
  use crate::remote::{DefinitionApi, PronunciationApi, PronunciationMode, TranslationApi};
  use crate::resolver::Resolver;
  use crate::store::DictionaryStore;

  /// Resolver over a fresh store in `dir`; translates "Haus" into English.
  pub fn resolver_with(dir: &TempDir, definitions: Arc<FakeDefinitions>) -> Resolver {
    let store = DictionaryStore::open(dir.path().join("data"), 15_000_000).unwrap();
    let translation = FakeTranslation {
      entries: HashMap::from([("Haus".to_string(), "house".to_string())]),
    };
    Resolver::new(
      Arc::new(store),
      Arc::new(Normalizer::new()),
      definitions,
      Arc::new(translation),
      Arc::new(FakePronunciations::default()),
      "en",
    )
  }

  /// Definition API answering from a fixed table and recording every request
  #[derive(Default)]
  pub struct FakeDefinitions {
    pub entries: HashMap<String, Vec<SenseGroup>>,
    pub fail_with: Option<RemoteError>,
    pub requests: Mutex<Vec<String>>,
  }

  impl FakeDefinitions {
    pub fn with(word: &str, groups: Vec<SenseGroup>) -> Self {
      Self { entries: HashMap::from([(word.to_string(), groups)]), ..Self::default() }
    }

    pub fn failing(error: RemoteError) -> Self {
      Self { fail_with: Some(error), ..Self::default() }
    }

    pub fn requests(&self) -> Vec<String> {
      self.requests.lock().unwrap().clone()
    }
  }

  #[async_trait]
  impl DefinitionApi for FakeDefinitions {
    async fn define(&self, word: &str, _language: &str) -> Result<Vec<SenseGroup>, RemoteError> {
      self.requests.lock().unwrap().push(word.to_string());
      if let Some(error) = &self.fail_with {
        return Err(error.clone());
      }
      self.entries.get(word).cloned().ok_or(RemoteError::NotFound)
    }
  }

  /// Translation API answering from a fixed table; the answer names the
  /// target and any endpoint override.
  #[derive(Default)]
  pub struct FakeTranslation {
    pub entries: HashMap<String, String>,
  }

  #[async_trait]
  impl TranslationApi for FakeTranslation {
    async fn translate(
      &self,
      word: &str,
      _source: &str,
      target: &str,
      endpoint: Option<&str>,
    ) -> Result<String, RemoteError> {
      let translation = self.entries.get(word).ok_or(RemoteError::NotFound)?;
      Ok(match endpoint {
        Some(endpoint) => format!("{translation} [{target}] via {endpoint}"),
        None => format!("{translation} [{target}]"),
      })
    }

    fn supports_language(&self, language: &str) -> bool {
      language != "tlh"
    }
  }

  /// Pronunciation API returning one recording per mode
  #[derive(Default)]
  pub struct FakePronunciations {
    pub fail_with: Option<RemoteError>,
  }

  #[async_trait]
  impl PronunciationApi for FakePronunciations {
    async fn pronunciations(
      &self,
      word: &str,
      _language: &str,
      mode: PronunciationMode,
    ) -> Result<AudioMap, RemoteError> {
      if let Some(error) = &self.fail_with {
        return Err(error.clone());
      }
      let mut audio = AudioMap::new();
      audio.insert("Forvo:anna".to_string(), format!("https://audio.example/{word}-anna.mp3"));
      if mode == PronunciationMode::All {
        audio.insert("Forvo:ben".to_string(), format!("https://audio.example/{word}-ben.mp3"));
      }
      Ok(audio)
    }
  }
}
