// crates/lexis/src/service.rs

//! LexisService: the facade of the lexis crate.
//!
//! - Normalizer (accent folding, lemmatization)
//! - DictionaryStore (imported dictionaries)
//! - Resolver over the store and the remote collaborators
//!
//! Callers only need this struct. It is `Send + Sync`; share it through `Arc`.
//!
//! # Blocking
//!
//! `import_dictionary` parses and indexes synchronously. From async code run it
//! on a blocking thread (`tokio::task::spawn_blocking`); lookups keep working
//! while it runs.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::LexisConfig;
use crate::errors::{ImportError, LexisError, LexisResult};
use crate::importers::{self, ImportReport};
use crate::models::{
  AudioMap, CustomDictionary, DictionaryFormat, DictionaryKind, DictionaryMetadata, Frequency,
};
use crate::normalizer::Normalizer;
use crate::remote::{
  DefinitionApi, ForvoClient, LingvaClient, PronunciationApi, TranslationApi, WiktionaryClient,
  build_client,
};
use crate::resolver::{AudioSource, DefinitionSource, Resolver, TranslationOptions};
use crate::store::DictionaryStore;

/// The facade of the lexis crate.
///
/// Built once from a `LexisConfig` and passed around by reference or `Arc`.
#[derive(Debug)]
pub struct LexisService {
  /// Store, normalizer and remote collaborators
  resolver: Resolver,

  /// Shared with the resolver
  normalizer: Arc<Normalizer>,
}

impl LexisService {
  /// Initialization (normalizer + store open/create + remote clients)
  ///
  /// # Flow
  /// 1. Validate the configuration (creates `store.data_dir` if needed)
  /// 2. Load lemma lexicons when `normalizer.lexicon_dir` is set
  /// 3. Open the dictionary store
  /// 4. Build one HTTP client shared by every remote collaborator
  ///
  /// # Errors
  /// - Invalid configuration
  /// - Unreadable lexicon
  /// - Store open failure (corrupt registry, foreign index)
  /// - HTTP client construction failure
  pub fn init(config: &LexisConfig) -> LexisResult<Self> {
    config.validate()?;

    let normalizer = match &config.normalizer.lexicon_dir {
      Some(dir) => Normalizer::from_lexicon_dir(dir)?,
      None => Normalizer::new(),
    };
    let store = DictionaryStore::open_with_config(config)?;

    let remote = &config.remote;
    let client = build_client(remote)?;
    let definitions = WiktionaryClient::new(client.clone(), &remote.wiktionary_endpoint);
    let translation = LingvaClient::new(client.clone(), &remote.translation_endpoint);
    let pronunciations =
      ForvoClient::new(client, &remote.forvo_endpoint, remote.forvo_api_key.clone());

    info!(data_dir = %config.data_dir().display(), "lexis service initialized");
    Ok(Self::with_collaborators(
      store,
      normalizer,
      Arc::new(definitions),
      Arc::new(translation),
      Arc::new(pronunciations),
      &remote.translation_target,
    ))
  }

  /// Service over explicit collaborators, e.g. in-process fakes.
  pub fn with_collaborators(
    store: DictionaryStore,
    normalizer: Normalizer,
    definitions: Arc<dyn DefinitionApi>,
    translation: Arc<dyn TranslationApi>,
    pronunciations: Arc<dyn PronunciationApi>,
    translation_target: &str,
  ) -> Self {
    let normalizer = Arc::new(normalizer);
    let resolver = Resolver::new(
      Arc::new(store),
      normalizer.clone(),
      definitions,
      translation,
      pronunciations,
      translation_target,
    );
    Self { resolver, normalizer }
  }

  // ─── Resolution ──────────────────────────────────────────────────────

  /// Definition of `word` from `source`, `None` on a miss or any failure.
  pub async fn resolve_definition(
    &self,
    word: &str,
    language: &str,
    source: &DefinitionSource,
  ) -> Option<String> {
    self.resolver.definition(word, word, language, source).await
  }

  /// Definition of the lemma of `word`.
  ///
  /// The surface form still decides whether capitalized candidates are tried.
  pub async fn resolve_definition_lemmatized(
    &self,
    word: &str,
    language: &str,
    source: &DefinitionSource,
    greedy: bool,
  ) -> Option<String> {
    let lemma = self.normalizer.apply_lemmatization(word, language, greedy);
    self.resolver.definition(word, &lemma, language, source).await
  }

  /// Rank of `word` in frequency list `dictionary`.
  pub fn resolve_frequency(
    &self,
    word: &str,
    language: &str,
    dictionary: &str,
  ) -> Option<Frequency> {
    self.resolver.frequency(word, language, dictionary)
  }

  /// Rank of the lemma of `word` in frequency list `dictionary`.
  pub fn resolve_lemma_frequency(
    &self,
    word: &str,
    language: &str,
    dictionary: &str,
    greedy: bool,
  ) -> Option<Frequency> {
    let lemma = self.normalizer.apply_lemmatization(word, language, greedy);
    self.resolver.frequency(&lemma, language, dictionary)
  }

  /// Pronunciations of `word` as `label -> locator`.
  ///
  /// `custom_dictionaries` supplies the roots of local audio libraries.
  pub async fn resolve_audio(
    &self,
    word: &str,
    language: &str,
    source: &AudioSource,
    custom_dictionaries: &[CustomDictionary],
  ) -> AudioMap {
    self.resolver.audio(word, language, source, custom_dictionaries).await
  }

  // ─── Normalization ───────────────────────────────────────────────────

  /// Lemma of `word`; identity for languages without a lemmatizer.
  pub fn lemmatize(&self, word: &str, language: &str, greedy: bool) -> String {
    self.normalizer.lemmatize(word, language, greedy)
  }

  /// Accent folding followed by lemmatization.
  pub fn apply_lemmatization(&self, word: &str, language: &str, greedy: bool) -> String {
    self.normalizer.apply_lemmatization(word, language, greedy)
  }

  /// Removes stress marks where the language has a folding table.
  pub fn strip_accents(&self, word: &str, language: &str) -> String {
    self.normalizer.strip_accents(word, language)
  }

  // ─── Dictionary management ───────────────────────────────────────────

  /// Imports the source at `source_path` as dictionary `name`.
  ///
  /// Importing the same source again under the same name leaves the store
  /// unchanged; a new source under an existing name upserts its entries.
  ///
  /// # Errors
  /// - `Import` if the source is missing, unreadable or has no entries
  /// - `Store` if `name` is taken by another language or kind, or the write fails
  pub fn import_dictionary(
    &self,
    source_path: &Path,
    format: DictionaryFormat,
    language: &str,
    name: &str,
  ) -> LexisResult<ImportReport> {
    importers::import_into(self.resolver.store(), source_path, format, language, name).map_err(
      |e| match e {
        ImportError::Store(e) => LexisError::Store(e),
        other => LexisError::Import(other),
      },
    )
  }

  /// Removes dictionary `name` and all of its entries.
  ///
  /// # Errors
  /// `Store(DictionaryNotFound)` if `name` is not registered.
  pub fn delete_dictionary(&self, name: &str) -> LexisResult<()> {
    Ok(self.resolver.store().delete_dictionary(name)?)
  }

  /// Every registered dictionary, ordered by name.
  pub fn dictionaries(&self) -> LexisResult<Vec<DictionaryMetadata>> {
    Ok(self.resolver.store().dictionaries()?)
  }

  /// Metadata of dictionary `name`.
  pub fn metadata(&self, name: &str) -> LexisResult<Option<DictionaryMetadata>> {
    Ok(self.resolver.store().metadata(name)?)
  }

  // ─── Source catalogues ───────────────────────────────────────────────

  /// Definition sources offered for `language`.
  ///
  /// Wiktionary first, then translation when the language is supported, then
  /// the local glossaries by name.
  pub fn definition_sources(&self, language: &str) -> LexisResult<Vec<DefinitionSource>> {
    let mut sources = vec![DefinitionSource::Wiktionary];
    if self.resolver.translation().supports_language(language) {
      sources.push(DefinitionSource::Translation(TranslationOptions::default()));
    }
    let glossaries = self.resolver.store().list_dictionaries(language, DictionaryKind::Glossary)?;
    sources.extend(glossaries.into_iter().map(DefinitionSource::Local));
    Ok(sources)
  }

  /// Audio sources offered for `language`.
  ///
  /// Forvo first; `AllLocal` is listed ahead of the libraries only when
  /// there is more than one of them.
  pub fn audio_sources(&self, language: &str) -> LexisResult<Vec<AudioSource>> {
    let libraries = self.resolver.store().list_dictionaries(language, DictionaryKind::Audiolib)?;

    let mut sources = vec![AudioSource::ForvoAll, AudioSource::ForvoBest];
    if libraries.len() > 1 {
      sources.push(AudioSource::AllLocal);
    }
    sources.extend(libraries.into_iter().map(AudioSource::Local));
    Ok(sources)
  }

  /// Names of the frequency lists of `language`.
  pub fn frequency_lists(&self, language: &str) -> LexisResult<Vec<String>> {
    Ok(self.resolver.store().list_dictionaries(language, DictionaryKind::Freq)?)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Module
// ─────────────────────────────────────────────────────────────────────────────
