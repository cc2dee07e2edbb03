//! crates/lexis/tests/integration_test.rs
//!
//! End-to-end integration test.
//! Verifies the whole flow: Import source -> Persist -> Resolve definitions,
//! frequencies and audio through LexisService -> Delete.
//!
//! Remote collaborators are replaced by in-process fakes; no test touches the network.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use lexis::errors::RemoteError;
use lexis::models::{AudioMap, SenseGroup};
use lexis::normalizer::Normalizer;
use lexis::remote::{DefinitionApi, PronunciationApi, PronunciationMode, TranslationApi};
use lexis::store::DictionaryStore;
use lexis::{
  AudioSource, CustomDictionary, DefinitionSource, DictionaryFormat, DictionaryKind, Frequency,
  LexisService,
};

const WRITER_MEMORY: usize = 15_000_000;

/// Remote sources that never know any word.
struct Offline;

#[async_trait]
impl DefinitionApi for Offline {
  async fn define(&self, _word: &str, _language: &str) -> Result<Vec<SenseGroup>, RemoteError> {
    Err(RemoteError::NotFound)
  }
}

#[async_trait]
impl TranslationApi for Offline {
  async fn translate(
    &self,
    _word: &str,
    _src: &str,
    _tgt: &str,
    _endpoint: Option<&str>,
  ) -> Result<String, RemoteError> {
    Err(RemoteError::Unavailable("offline".to_string()))
  }

  fn supports_language(&self, _language: &str) -> bool {
    true
  }
}

#[async_trait]
impl PronunciationApi for Offline {
  async fn pronunciations(
    &self,
    _word: &str,
    _language: &str,
    _mode: PronunciationMode,
  ) -> Result<AudioMap, RemoteError> {
    Err(RemoteError::NotConfigured("forvo api key"))
  }
}

fn open_service(data_dir: &TempDir) -> LexisService {
  let store = DictionaryStore::open(data_dir.path(), WRITER_MEMORY).expect("Failed to open store");
  let offline = Arc::new(Offline);
  LexisService::with_collaborators(
    store,
    Normalizer::new(),
    offline.clone(),
    offline.clone(),
    offline,
    "en",
  )
}

fn write_source(dir: &TempDir, file: &str, content: &str) -> PathBuf {
  let path = dir.path().join(file);
  fs::write(&path, content).expect("Failed to write source");
  path
}

fn local(name: &str) -> DefinitionSource {
  DefinitionSource::Local(name.to_string())
}

// ─── Store properties ───────────────────────────────────────────────────

#[tokio::test]
async fn imported_entries_survive_a_restart() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let sources = TempDir::new().expect("Failed to create temporary directory");
  let source = write_source(&sources, "pets.json", r#"{"cat": "feline", "dog": "canine"}"#);

  {
    let service = open_service(&data_dir);
    service.import_dictionary(&source, DictionaryFormat::Json, "en", "pets").expect("import");
    assert_eq!(
      service.resolve_definition("cat", "en", &local("pets")).await.as_deref(),
      Some("feline")
    );
  }

  let service = open_service(&data_dir);
  let definition = service.resolve_definition("dog", "en", &local("pets")).await;
  assert_eq!(definition.as_deref(), Some("canine"));
  assert_eq!(service.dictionaries().expect("list").len(), 1);
}

#[tokio::test]
async fn deleted_dictionary_is_gone() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let sources = TempDir::new().expect("Failed to create temporary directory");
  let source = write_source(&sources, "pets.json", r#"{"cat": "feline", "dog": "canine"}"#);
  let service = open_service(&data_dir);
  service.import_dictionary(&source, DictionaryFormat::Json, "en", "pets").expect("import");

  service.delete_dictionary("pets").expect("delete");

  for word in ["cat", "dog"] {
    assert_eq!(service.resolve_definition(word, "en", &local("pets")).await, None);
  }
  assert!(!service.definition_sources("en").expect("sources").contains(&local("pets")));
}

#[test]
fn reimported_headword_overwrites() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let sources = TempDir::new().expect("Failed to create temporary directory");
  let first = write_source(&sources, "a.json", r#"{"cat": "a"}"#);
  let second = write_source(&sources, "b.json", r#"{"cat": "b"}"#);
  let store = DictionaryStore::open(data_dir.path(), WRITER_MEMORY).expect("Failed to open store");

  lexis::importers::import_into(&store, &first, DictionaryFormat::Json, "en", "pets")
    .expect("import");
  lexis::importers::import_into(&store, &second, DictionaryFormat::Json, "en", "pets")
    .expect("import");

  assert_eq!(store.count_entries("pets").expect("count"), 1);
  assert_eq!(store.lookup("cat", "pets").expect("lookup").as_deref(), Some("b"));
}

#[test]
fn importing_twice_equals_importing_once() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let sources = TempDir::new().expect("Failed to create temporary directory");
  let source = write_source(&sources, "d.csv", "cat,feline\ndog,canine\nowl,bird\n");
  let store = DictionaryStore::open(data_dir.path(), WRITER_MEMORY).expect("Failed to open store");

  let once = lexis::importers::import_into(&store, &source, DictionaryFormat::Csv, "en", "d")
    .expect("import");
  let created_at = store.metadata("d").expect("metadata").map(|m| m.created_at);
  let twice = lexis::importers::import_into(&store, &source, DictionaryFormat::Csv, "en", "d")
    .expect("import");

  assert_eq!(once, twice);
  assert_eq!(store.count_entries("d").expect("count"), 3);
  assert_eq!(store.lookup("owl", "d").expect("lookup").as_deref(), Some("bird"));
  assert_eq!(store.metadata("d").expect("metadata").map(|m| m.created_at), created_at);
}

// ─── Resolution ─────────────────────────────────────────────────────────

#[tokio::test]
async fn capitalized_word_finds_lowercase_entry() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let sources = TempDir::new().expect("Failed to create temporary directory");
  let source = write_source(&sources, "fruit.json", r#"{"apple": "fruit"}"#);
  let service = open_service(&data_dir);
  service.import_dictionary(&source, DictionaryFormat::Json, "en", "fruit").expect("import");

  let definition = service.resolve_definition("Apple", "en", &local("fruit")).await;

  assert_eq!(definition.as_deref(), Some("fruit"));
}

#[tokio::test]
async fn remote_failures_resolve_to_nothing() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let service = open_service(&data_dir);

  assert_eq!(service.resolve_definition("cat", "en", &DefinitionSource::Wiktionary).await, None);
  let translation = DefinitionSource::translation_into("de", Some("https://lingva.invalid"));
  assert_eq!(service.resolve_definition("cat", "en", &translation).await, None);
  assert!(service.resolve_audio("cat", "en", &AudioSource::ForvoAll, &[]).await.is_empty());
}

#[test]
fn frequency_ranks_follow_list_order() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let sources = TempDir::new().expect("Failed to create temporary directory");
  let source = write_source(&sources, "freq.json", r#"["the", "of", "and"]"#);
  let service = open_service(&data_dir);
  service.import_dictionary(&source, DictionaryFormat::Freq, "en", "top").expect("import");

  let the = service.resolve_frequency("the", "en", "top");
  let and = service.resolve_frequency("and", "en", "top");

  assert_eq!(the, Some(Frequency { rank: 1, corpus_size: 3 }));
  assert_eq!(and, Some(Frequency { rank: 3, corpus_size: 3 }));
  assert_eq!(service.resolve_frequency("banana", "en", "top"), None);
}

// ─── Normalization ──────────────────────────────────────────────────────

#[test]
fn russian_stress_marks_are_stripped() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let service = open_service(&data_dir);

  assert_eq!(service.strip_accents("а\u{301}", "ru"), "а");
  assert_eq!(service.strip_accents("naïve", "en"), "naïve");
  assert_eq!(service.strip_accents("молоко", "ru"), "молоко");
}

#[test]
fn unsupported_language_lemmatizes_to_itself() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let service = open_service(&data_dir);

  for word in ["走った", "Häuser", "running", ""] {
    assert_eq!(service.lemmatize(word, "ja", true), word);
    assert_eq!(service.lemmatize(word, "xx", false), word);
  }
}

// ─── Audio ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn all_local_aggregates_two_libraries() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let sources = TempDir::new().expect("Failed to create temporary directory");
  let service = open_service(&data_dir);

  let mut settings = Vec::new();
  for (name, file) in [("lib1", "run.mp3"), ("lib2", "run.ogg")] {
    let root = sources.path().join(name);
    fs::create_dir_all(&root).expect("Failed to create library");
    fs::write(root.join(file), b"").expect("Failed to write audio");
    service.import_dictionary(&root, DictionaryFormat::Audiolib, "en", name).expect("import");
    settings.push(CustomDictionary::new(name, "en", DictionaryKind::Audiolib, &root));
  }

  let audio = service.resolve_audio("run", "en", &AudioSource::AllLocal, &settings).await;

  assert_eq!(audio.len(), 2);
  assert_eq!(audio.keys().collect::<Vec<_>>(), vec!["lib1:run", "lib2:run"]);
  let paths: Vec<PathBuf> = audio.values().map(PathBuf::from).collect();
  assert_eq!(paths[0], sources.path().join("lib1").join("run.mp3"));
  assert_eq!(paths[1], sources.path().join("lib2").join("run.ogg"));
}

// ─── Concurrency ────────────────────────────────────────────────────────

#[test]
fn lookups_proceed_during_an_import() {
  let data_dir = TempDir::new().expect("Failed to create temporary directory");
  let sources = TempDir::new().expect("Failed to create temporary directory");
  let small = write_source(&sources, "small.json", r#"["the", "of", "and"]"#);
  let words: Vec<String> = (0..20_000).map(|i| format!("word{i}")).collect();
  let large = write_source(&sources, "large.json", &serde_json::to_string(&words).expect("json"));

  let service = Arc::new(open_service(&data_dir));
  service.import_dictionary(&small, DictionaryFormat::Freq, "en", "small").expect("import");

  std::thread::scope(|scope| {
    let importer = {
      let service = service.clone();
      scope.spawn(move || service.import_dictionary(&large, DictionaryFormat::Freq, "en", "large"))
    };

    for _ in 0..50 {
      let rank = service.resolve_frequency("of", "en", "small").map(|f| f.rank);
      assert_eq!(rank, Some(2));
      // the large list is either absent or complete
      if let Some(frequency) = service.resolve_frequency("word0", "en", "large") {
        assert_eq!(frequency.corpus_size, 20_000);
      }
    }

    let report = importer.join().expect("import thread panicked").expect("import");
    assert_eq!(report.imported, 20_000);
  });

  assert_eq!(service.frequency_lists("en").expect("lists"), vec!["large", "small"]);
}
