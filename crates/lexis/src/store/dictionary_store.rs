//! Dictionary Store
//!
//! A single tantivy index holds the entries of every imported dictionary,
//! keyed by `(dictionary, headword)`. `registry.json` next to it lists the
//! dictionaries that completed an import.
//!
//! # Visibility
//!
//! Entries become visible at commit; the registry record is written only after
//! the commit succeeded, so a crashed import never shows up in listings.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::TermQuery;
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info};

use crate::config::LexisConfig;
use crate::errors::StoreError;
use crate::models::{DictionaryEntry, DictionaryFormat, DictionaryKind, DictionaryMetadata};
use crate::store::registry::Registry;
use crate::store::schema::{StoreFields, build_schema, entry_key};

/// Meta file name used to determine index existence
const META_JSON: &str = "meta.json";

/// Persistent store of imported dictionaries.
///
/// # Concurrency
///
/// - Readers search a committed snapshot and never block on imports
/// - Writers are serialized by the `IndexWriter` mutex
/// - Registry updates go through an `RwLock`
pub struct DictionaryStore {
  /// IndexReader, reloaded after every commit
  reader: IndexReader,

  /// The one IndexWriter of this index
  writer: Mutex<IndexWriter>,

  /// Schema fields reference
  fields: StoreFields,

  /// Dictionary metadata
  registry: RwLock<Registry>,
}

impl std::fmt::Debug for DictionaryStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DictionaryStore").field("fields", &self.fields).finish_non_exhaustive()
  }
}

impl DictionaryStore {
  /// Opens the store under `data_dir`, creating it if it does not exist.
  ///
  /// The layout under `data_dir` is the one `LexisConfig` describes.
  pub fn open<P: AsRef<Path>>(data_dir: P, writer_memory_bytes: usize) -> Result<Self, StoreError> {
    let mut config = LexisConfig::with_data_dir(data_dir.as_ref());
    config.store.writer_memory_bytes = writer_memory_bytes;
    Self::open_with_config(&config)
  }

  /// Opens the store described by `config`.
  pub fn open_with_config(config: &LexisConfig) -> Result<Self, StoreError> {
    Self::open_at(&config.entries_path(), &config.registry_path(), config.writer_memory_bytes())
  }

  /// Opens the entry index at `entries_path` and the registry at
  /// `registry_path`, creating the index if it does not exist.
  ///
  /// # Errors
  /// - Directory creation failure
  /// - Tantivy index creation/open error, or a foreign schema
  /// - Unreadable or corrupt registry
  pub fn open_at(
    entries_path: &Path,
    registry_path: &Path,
    writer_memory_bytes: usize,
  ) -> Result<Self, StoreError> {
    let entries_path = entries_path.to_path_buf();

    let (index, fields) = if entries_path.join(META_JSON).exists() {
      let index = Index::open_in_dir(&entries_path)?;
      let fields = StoreFields::from_schema(&index.schema())?;
      (index, fields)
    } else {
      std::fs::create_dir_all(&entries_path).map_err(|e| StoreError::InvalidStorePath {
        path: entries_path.clone(),
        source: Arc::new(e),
      })?;
      let (schema, fields) = build_schema();
      let index = Index::create_in_dir(&entries_path, schema)?;
      (index, fields)
    };

    let reader: IndexReader =
      index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
    let writer = index.writer(writer_memory_bytes)?;
    let registry = Registry::load(registry_path)?;

    debug!(path = %entries_path.display(), "opened dictionary store");

    Ok(Self {
      reader,
      writer: Mutex::new(writer),
      fields,
      registry: RwLock::new(registry),
    })
  }

  /// Upserts `entries` into dictionary `name` and registers it.
  ///
  /// Entries are written under `(name, headword)`; a repeated headword keeps
  /// the last payload. All entries are committed at once, then the metadata
  /// record is created if the dictionary was not registered yet.
  ///
  /// Returns the number of distinct headwords written.
  ///
  /// # Errors
  /// - `NameConflict` if `name` is registered with another language or kind
  /// - Tantivy write/commit error (nothing is committed)
  /// - Registry write error (entries are committed but not listed)
  pub fn import_dictionary(
    &self,
    entries: Vec<DictionaryEntry>,
    language: &str,
    name: &str,
    format: DictionaryFormat,
  ) -> Result<usize, StoreError> {
    let kind = format.kind();
    let mut writer = self.writer.lock().map_err(|_| StoreError::LockPoisoned("index writer"))?;

    if let Some(existing) = self.read_registry()?.get(name) {
      if existing.language != language || existing.kind != kind {
        return Err(StoreError::NameConflict {
          name: name.to_string(),
          language: existing.language.clone(),
          kind: existing.kind.to_string(),
        });
      }
    }

    // last occurrence of each headword wins
    let mut last_index: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
      last_index.insert(entry.headword.as_str(), i);
    }

    let written = match self.write_entries(&writer, &entries, &last_index, name) {
      Ok(()) => last_index.len(),
      Err(e) => {
        writer.rollback()?;
        return Err(e);
      }
    };
    writer.commit()?;
    drop(writer);
    self.reader.reload()?;

    let metadata = DictionaryMetadata {
      name: name.to_string(),
      language: language.to_string(),
      kind,
      format,
      created_at: Utc::now(),
    };
    let registered = self.write_registry()?.insert_if_absent(metadata)?;

    info!(dictionary = name, language, %format, written, registered, "dictionary imported");
    Ok(written)
  }

  fn write_entries(
    &self,
    writer: &IndexWriter,
    entries: &[DictionaryEntry],
    last_index: &HashMap<&str, usize>,
    name: &str,
  ) -> Result<(), StoreError> {
    for (i, entry) in entries.iter().enumerate() {
      if last_index.get(entry.headword.as_str()) != Some(&i) {
        continue;
      }
      let key = entry_key(name, &entry.headword);
      writer.delete_term(Term::from_field_text(self.fields.key, &key));

      let mut doc = TantivyDocument::default();
      doc.add_text(self.fields.dictionary, name);
      doc.add_text(self.fields.headword, &entry.headword);
      doc.add_text(self.fields.key, &key);
      doc.add_text(self.fields.payload, &entry.payload);
      writer.add_document(doc)?;
    }
    Ok(())
  }

  /// Exact, case-sensitive lookup of `headword` in dictionary `dictionary`.
  pub fn lookup(&self, headword: &str, dictionary: &str) -> Result<Option<String>, StoreError> {
    let searcher = self.reader.searcher();
    let term = Term::from_field_text(self.fields.key, &entry_key(dictionary, headword));
    let query = TermQuery::new(term, IndexRecordOption::Basic);

    let top_docs = searcher.search(&query, &TopDocs::with_limit(1))?;
    let Some((_, address)) = top_docs.into_iter().next() else {
      return Ok(None);
    };

    let doc: TantivyDocument = searcher.doc(address)?;
    Ok(doc.get_first(self.fields.payload).and_then(|v| v.as_str().map(String::from)))
  }

  /// Number of entries in dictionary `dictionary` (0 if unknown).
  pub fn count_entries(&self, dictionary: &str) -> Result<u64, StoreError> {
    let searcher = self.reader.searcher();
    let term = Term::from_field_text(self.fields.dictionary, dictionary);
    let query = TermQuery::new(term, IndexRecordOption::Basic);

    Ok(searcher.search(&query, &Count)? as u64)
  }

  /// Unregisters dictionary `name` and deletes all of its entries in one commit.
  ///
  /// # Errors
  /// `DictionaryNotFound` if `name` is not registered.
  pub fn delete_dictionary(&self, name: &str) -> Result<(), StoreError> {
    let mut writer = self.writer.lock().map_err(|_| StoreError::LockPoisoned("index writer"))?;

    let removed = self.write_registry()?.remove(name)?;

    writer.delete_term(Term::from_field_text(self.fields.dictionary, name));
    writer.commit()?;
    drop(writer);
    self.reader.reload()?;

    info!(dictionary = name, language = %removed.language, "dictionary deleted");
    Ok(())
  }

  /// Names of registered dictionaries of `language` and `kind`, ordered by name.
  pub fn list_dictionaries(
    &self,
    language: &str,
    kind: DictionaryKind,
  ) -> Result<Vec<String>, StoreError> {
    Ok(self.read_registry()?.names(language, kind))
  }

  /// Every registered dictionary, ordered by name.
  pub fn dictionaries(&self) -> Result<Vec<DictionaryMetadata>, StoreError> {
    Ok(self.read_registry()?.iter().cloned().collect())
  }

  /// Metadata of dictionary `name`.
  pub fn metadata(&self, name: &str) -> Result<Option<DictionaryMetadata>, StoreError> {
    Ok(self.read_registry()?.get(name).cloned())
  }

  fn read_registry(&self) -> Result<std::sync::RwLockReadGuard<'_, Registry>, StoreError> {
    self.registry.read().map_err(|_| StoreError::LockPoisoned("registry"))
  }

  fn write_registry(&self) -> Result<std::sync::RwLockWriteGuard<'_, Registry>, StoreError> {
    self.registry.write().map_err(|_| StoreError::LockPoisoned("registry"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  const WRITER_MEMORY: usize = 15_000_000;

  fn open_store(dir: &TempDir) -> DictionaryStore {
    DictionaryStore::open(dir.path(), WRITER_MEMORY).expect("Failed to open store")
  }

  fn entries(pairs: &[(&str, &str)]) -> Vec<DictionaryEntry> {
    pairs.iter().map(|(h, p)| DictionaryEntry::new(*h, *p)).collect()
  }

  // ─── layout ──────────────────────────────────────────────────────────

  #[test]
  fn files_land_where_the_config_points() {
    let dir = TempDir::new().unwrap();
    let config = LexisConfig::with_data_dir(dir.path().join("data"));
    let store = DictionaryStore::open_with_config(&config).unwrap();
    store
      .import_dictionary(entries(&[("apple", "a fruit")]), "en", "fruits", DictionaryFormat::Json)
      .unwrap();

    assert!(config.entries_path().join(META_JSON).exists());
    assert!(config.registry_path().is_file());
  }

  #[test]
  fn open_at_keeps_the_registry_apart_from_the_index() {
    let dir = TempDir::new().unwrap();
    let entries_path = dir.path().join("index");
    let registry_path = dir.path().join("meta").join("dictionaries.json");
    std::fs::create_dir_all(registry_path.parent().unwrap()).unwrap();

    let store = DictionaryStore::open_at(&entries_path, &registry_path, WRITER_MEMORY).unwrap();
    store
      .import_dictionary(entries(&[("apple", "a fruit")]), "en", "fruits", DictionaryFormat::Json)
      .unwrap();
    drop(store);

    let reopened = DictionaryStore::open_at(&entries_path, &registry_path, WRITER_MEMORY).unwrap();
    assert_eq!(reopened.lookup("apple", "fruits").unwrap().as_deref(), Some("a fruit"));
    assert_eq!(reopened.dictionaries().unwrap().len(), 1);
  }

  // ─── import / lookup ─────────────────────────────────────────────────

  #[test]
  fn lookup_is_exact_and_case_sensitive() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store
      .import_dictionary(entries(&[("apple", "a fruit")]), "en", "fruits", DictionaryFormat::Json)
      .unwrap();

    assert_eq!(store.lookup("apple", "fruits").unwrap().as_deref(), Some("a fruit"));
    assert_eq!(store.lookup("Apple", "fruits").unwrap(), None);
    assert_eq!(store.lookup("apple", "vegetables").unwrap(), None);
  }

  #[test]
  fn repeated_headword_in_batch_keeps_last_payload() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let batch = entries(&[("a", "1"), ("b", "2"), ("a", "3")]);
    let written = store.import_dictionary(batch, "en", "d", DictionaryFormat::Json).unwrap();

    assert_eq!(written, 2);
    assert_eq!(store.count_entries("d").unwrap(), 2);
    assert_eq!(store.lookup("a", "d").unwrap().as_deref(), Some("3"));
  }

  #[test]
  fn import_registers_metadata_once() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.import_dictionary(entries(&[("a", "1")]), "en", "d", DictionaryFormat::Csv).unwrap();
    let first = store.metadata("d").unwrap().unwrap();

    store.import_dictionary(entries(&[("b", "2")]), "en", "d", DictionaryFormat::Csv).unwrap();
    let second = store.metadata("d").unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.format, DictionaryFormat::Csv);
    assert_eq!(store.count_entries("d").unwrap(), 2);
  }

  #[test]
  fn name_reused_for_other_language_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.import_dictionary(entries(&[("a", "1")]), "en", "d", DictionaryFormat::Json).unwrap();

    let err = store
      .import_dictionary(entries(&[("б", "2")]), "ru", "d", DictionaryFormat::Json)
      .unwrap_err();

    assert!(matches!(err, StoreError::NameConflict { .. }));
    assert_eq!(store.lookup("б", "d").unwrap(), None);
  }

  // ─── count / list ────────────────────────────────────────────────────

  #[test]
  fn count_is_per_dictionary() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store
      .import_dictionary(entries(&[("a", "1"), ("b", "2")]), "en", "one", DictionaryFormat::Freq)
      .unwrap();
    store.import_dictionary(entries(&[("a", "x")]), "en", "two", DictionaryFormat::Json).unwrap();

    assert_eq!(store.count_entries("one").unwrap(), 2);
    assert_eq!(store.count_entries("two").unwrap(), 1);
    assert_eq!(store.count_entries("three").unwrap(), 0);
  }

  #[test]
  fn list_dictionaries_filters_by_kind() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.import_dictionary(entries(&[("a", "1")]), "en", "freq", DictionaryFormat::Freq).unwrap();
    store.import_dictionary(entries(&[("a", "x")]), "en", "gloss", DictionaryFormat::Json).unwrap();

    assert_eq!(store.list_dictionaries("en", DictionaryKind::Freq).unwrap(), vec!["freq"]);
    assert_eq!(store.list_dictionaries("en", DictionaryKind::Glossary).unwrap(), vec!["gloss"]);
    assert!(store.list_dictionaries("de", DictionaryKind::Glossary).unwrap().is_empty());
  }

  // ─── delete ──────────────────────────────────────────────────────────

  #[test]
  fn delete_removes_entries_and_metadata() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.import_dictionary(entries(&[("a", "1")]), "en", "gone", DictionaryFormat::Json).unwrap();
    store.import_dictionary(entries(&[("a", "2")]), "en", "kept", DictionaryFormat::Json).unwrap();

    store.delete_dictionary("gone").unwrap();

    assert_eq!(store.lookup("a", "gone").unwrap(), None);
    assert_eq!(store.count_entries("gone").unwrap(), 0);
    assert!(store.metadata("gone").unwrap().is_none());
    assert_eq!(store.lookup("a", "kept").unwrap().as_deref(), Some("2"));
  }

  #[test]
  fn delete_unknown_dictionary_fails() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let err = store.delete_dictionary("missing").unwrap_err();
    assert!(matches!(err, StoreError::DictionaryNotFound(_)));
  }
}
