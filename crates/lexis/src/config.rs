// crates/lexis/src/config.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::ConfigError;

/// Default Wiktionary REST endpoint (definition API).
pub const DEFAULT_WIKTIONARY_ENDPOINT: &str = "https://en.wiktionary.org/api/rest_v1";

/// Default Lingva endpoint (translation API).
pub const DEFAULT_TRANSLATION_ENDPOINT: &str = "https://lingva.ml";

/// Default Forvo API endpoint (pronunciation API).
pub const DEFAULT_FORVO_ENDPOINT: &str = "https://apifree.forvo.com";

/// Default timeout for every remote request.
pub const DEFAULT_TIMEOUT_MS: u64 = 4_000;

/// Top-level configuration for lexis.
#[derive(Debug, Clone, Deserialize)]
pub struct LexisConfig {
  /// [store] section
  pub store: StoreConfig,
  /// [remote] section
  #[serde(default)]
  pub remote: RemoteConfig,
  /// [normalizer] section
  #[serde(default)]
  pub normalizer: NormalizerConfig,
  /// [logging] section
  #[serde(default)]
  pub logging: LoggingConfig,
}

/// [store] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Store directory (e.g., "~/.local/share/lexis")
  pub data_dir: PathBuf,
  /// Memory budget of the tantivy IndexWriter (bytes)
  #[serde(default = "default_writer_memory_bytes")]
  pub writer_memory_bytes: usize,
}

fn default_writer_memory_bytes() -> usize {
  50_000_000
}

/// [remote] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  /// Timeout applied to every remote request (milliseconds)
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Wiktionary REST base URL
  #[serde(default = "default_wiktionary_endpoint")]
  pub wiktionary_endpoint: String,
  /// Lingva instance base URL
  #[serde(default = "default_translation_endpoint")]
  pub translation_endpoint: String,
  /// Target language for the translation source
  #[serde(default = "default_translation_target")]
  pub translation_target: String,
  /// Forvo API base URL
  #[serde(default = "default_forvo_endpoint")]
  pub forvo_endpoint: String,
  /// Forvo API key. Pronunciation lookups return nothing when unset.
  #[serde(default)]
  pub forvo_api_key: Option<String>,
}

fn default_timeout_ms() -> u64 {
  DEFAULT_TIMEOUT_MS
}

fn default_wiktionary_endpoint() -> String {
  DEFAULT_WIKTIONARY_ENDPOINT.to_string()
}

fn default_translation_endpoint() -> String {
  DEFAULT_TRANSLATION_ENDPOINT.to_string()
}

fn default_translation_target() -> String {
  "en".to_string()
}

fn default_forvo_endpoint() -> String {
  DEFAULT_FORVO_ENDPOINT.to_string()
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      timeout_ms: default_timeout_ms(),
      wiktionary_endpoint: default_wiktionary_endpoint(),
      translation_endpoint: default_translation_endpoint(),
      translation_target: default_translation_target(),
      forvo_endpoint: default_forvo_endpoint(),
      forvo_api_key: None,
    }
  }
}

/// [normalizer] section configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NormalizerConfig {
  /// Directory of `<lang>.tsv` lemma lexicons (`form<TAB>lemma` per line).
  ///
  /// If omitted, lemmatizers run on their built-in rules only.
  #[serde(default)]
  pub lexicon_dir: Option<PathBuf>,
}

/// [logging] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// Log level: "trace" | "debug" | "info" | "warn" | "error"
  pub level: LogLevel,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self { level: LogLevel::Info }
  }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  /// trace
  Trace,

  /// debug
  Debug,

  /// info
  Info,

  /// warn
  Warn,

  ///error
  Error,
}

impl LogLevel {
  /// Directive string understood by `tracing_subscriber::EnvFilter`.
  pub fn as_directive(&self) -> &'static str {
    match self {
      LogLevel::Trace => "trace",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warn => "warn",
      LogLevel::Error => "error",
    }
  }
}

impl std::str::FromStr for LogLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "trace" => Ok(Self::Trace),
      "debug" => Ok(Self::Debug),
      "info" => Ok(Self::Info),
      "warn" => Ok(Self::Warn),
      "error" => Ok(Self::Error),
      _ => Err(format!("Unknown log level: {s}. Valid values: trace, debug, info, warn, error")),
    }
  }
}

// ===== Loading =====

impl LexisConfig {
  /// Builds a configuration with defaults rooted at `data_dir`.
  pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
    Self {
      store: StoreConfig {
        data_dir: data_dir.into(),
        writer_memory_bytes: default_writer_memory_bytes(),
      },
      remote: RemoteConfig::default(),
      normalizer: NormalizerConfig::default(),
      logging: LoggingConfig::default(),
    }
  }

  /// Loads the configuration from a JSON file.
  ///
  /// # Errors
  /// Returns `ReadFailed` or `ParseFailed`. The result is not validated.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
      path: path.to_path_buf(),
      source: Arc::new(e),
    })?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::ParseFailed {
      path: path.to_path_buf(),
      source: Arc::new(e),
    })
  }

  /// Loads the configuration from environment variables.
  ///
  /// | Variable                   | Default                         |
  /// |----------------------------|---------------------------------|
  /// | `LEXIS_DATA_DIR`           | `dirs::data_dir()/lexis`        |
  /// | `LEXIS_TIMEOUT_MS`         | `4000`                          |
  /// | `LEXIS_TRANSLATION_API`    | `https://lingva.ml`             |
  /// | `LEXIS_TRANSLATION_TARGET` | `en`                            |
  /// | `LEXIS_FORVO_API_KEY`      | unset                           |
  /// | `LEXIS_LEXICON_DIR`        | unset                           |
  /// | `LEXIS_LOG_LEVEL`          | `info`                          |
  ///
  /// # Errors
  /// Returns `InvalidEnvValue` if a numeric or enum variable cannot be parsed.
  pub fn from_env() -> Result<Self, ConfigError> {
    let data_dir = std::env::var("LEXIS_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
      dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("lexis")
    });
    let mut config = Self::with_data_dir(data_dir);

    if let Ok(raw) = std::env::var("LEXIS_TIMEOUT_MS") {
      config.remote.timeout_ms = raw
        .parse()
        .map_err(|_| ConfigError::InvalidEnvValue { name: "LEXIS_TIMEOUT_MS".into(), value: raw })?;
    }
    if let Ok(endpoint) = std::env::var("LEXIS_TRANSLATION_API") {
      config.remote.translation_endpoint = endpoint;
    }
    if let Ok(target) = std::env::var("LEXIS_TRANSLATION_TARGET") {
      config.remote.translation_target = target;
    }
    config.remote.forvo_api_key = std::env::var("LEXIS_FORVO_API_KEY").ok();
    config.normalizer.lexicon_dir = std::env::var("LEXIS_LEXICON_DIR").ok().map(PathBuf::from);
    if let Ok(raw) = std::env::var("LEXIS_LOG_LEVEL") {
      config.logging.level = raw
        .parse()
        .map_err(|_| ConfigError::InvalidEnvValue { name: "LEXIS_LOG_LEVEL".into(), value: raw })?;
    }

    Ok(config)
  }
}

// ===== Accessor Methods =====

impl LexisConfig {
  /// Returns the store base directory.
  pub fn data_dir(&self) -> &Path {
    &self.store.data_dir
  }

  /// Returns the tantivy entry index directory.
  ///
  /// Directory structure:
  /// ```text
  /// <data_dir>/
  ///   ├── entries/        (tantivy index)
  ///   └── registry.json   (dictionary metadata)
  /// ```
  pub fn entries_path(&self) -> PathBuf {
    self.store.data_dir.join("entries")
  }

  /// Returns the dictionary metadata registry file.
  pub fn registry_path(&self) -> PathBuf {
    self.store.data_dir.join("registry.json")
  }

  /// Returns the memory budget (bytes) for the IndexWriter.
  pub fn writer_memory_bytes(&self) -> usize {
    self.store.writer_memory_bytes
  }

  /// Returns the remote request timeout.
  pub fn remote_timeout(&self) -> Duration {
    Duration::from_millis(self.remote.timeout_ms)
  }

  /// Returns the log level.
  pub fn log_level(&self) -> LogLevel {
    self.logging.level
  }

  /// Validates the configuration.
  ///
  /// # Validation Items
  /// - `store.data_dir` is not empty
  /// - `store.writer_memory_bytes` is within allowable range (15MB - 1GB)
  /// - `remote.timeout_ms` is within 1ms - 60s
  /// - `store.data_dir` exists as a directory or can be created
  /// - `normalizer.lexicon_dir`, if set, is a directory
  ///
  /// # Errors
  /// Returns the first failing `ConfigError`.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.store.data_dir.as_os_str().is_empty() {
      return Err(ConfigError::EmptyDataDir);
    }

    // tantivy refuses writer budgets below 15MB
    const MIN_WRITER_MEMORY: u64 = 15_000_000;
    const MAX_WRITER_MEMORY: u64 = 1_000_000_000;
    let writer_memory = self.store.writer_memory_bytes as u64;
    if !(MIN_WRITER_MEMORY..=MAX_WRITER_MEMORY).contains(&writer_memory) {
      return Err(ConfigError::InvalidWriterMemoryBytes {
        min: MIN_WRITER_MEMORY,
        max: MAX_WRITER_MEMORY,
        actual: writer_memory,
      });
    }

    const MAX_TIMEOUT_MS: u64 = 60_000;
    if !(1..=MAX_TIMEOUT_MS).contains(&self.remote.timeout_ms) {
      return Err(ConfigError::InvalidRemoteTimeout {
        max: MAX_TIMEOUT_MS,
        actual: self.remote.timeout_ms,
      });
    }

    let data_dir = &self.store.data_dir;
    if data_dir.exists() {
      if !data_dir.is_dir() {
        return Err(ConfigError::InvalidDataDir { path: data_dir.clone() });
      }
    } else if let Err(e) = std::fs::create_dir_all(data_dir) {
      return Err(ConfigError::DataDirCreationFailed {
        path: data_dir.clone(),
        source: Arc::new(e),
      });
    }

    if let Some(lexicon_dir) = &self.normalizer.lexicon_dir {
      if !lexicon_dir.is_dir() {
        return Err(ConfigError::InvalidLexiconDir { path: lexicon_dir.clone() });
      }
    }

    Ok(())
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Module
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  // ─── Test Helpers ─────────────────────────────────────────────────────

  fn create_valid_config(temp_dir: &TempDir) -> LexisConfig {
    LexisConfig::with_data_dir(temp_dir.path().join("store"))
  }

  // ─── validate() Normal Case Tests ────────────────────────────────────────────

  #[test]
  fn validate_accepts_valid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_valid_config(&temp_dir);

    assert!(config.validate().is_ok(), "valid config should pass validation");
  }

  #[test]
  fn validate_creates_missing_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_valid_config(&temp_dir);
    assert!(!config.data_dir().exists());

    config.validate().unwrap();

    assert!(config.data_dir().is_dir());
  }

  #[test]
  fn validate_accepts_boundary_writer_memory() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_valid_config(&temp_dir);

    config.store.writer_memory_bytes = 15_000_000;
    assert!(config.validate().is_ok());

    config.store.writer_memory_bytes = 1_000_000_000;
    assert!(config.validate().is_ok());
  }

  // ─── validate() Abnormal Cases ───────────────────────────────────────────

  #[test]
  fn validate_rejects_empty_data_dir() {
    let mut config = LexisConfig::with_data_dir("");
    config.store.writer_memory_bytes = 0;

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::EmptyDataDir));
  }

  #[test]
  fn validate_rejects_writer_memory_too_small() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_valid_config(&temp_dir);
    config.store.writer_memory_bytes = 1_000_000;

    match config.validate().unwrap_err() {
      ConfigError::InvalidWriterMemoryBytes { min, actual, .. } => {
        assert_eq!(min, 15_000_000);
        assert_eq!(actual, 1_000_000);
      }
      other => panic!("expected InvalidWriterMemoryBytes error, got {other:?}"),
    }
  }

  #[test]
  fn validate_rejects_zero_timeout() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_valid_config(&temp_dir);
    config.remote.timeout_ms = 0;

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRemoteTimeout { actual: 0, .. }));
  }

  #[test]
  fn validate_rejects_data_dir_is_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("not-a-dir");
    fs::write(&file_path, b"dummy").unwrap();

    let config = LexisConfig::with_data_dir(&file_path);

    match config.validate().unwrap_err() {
      ConfigError::InvalidDataDir { path } => assert_eq!(path, file_path),
      other => panic!("expected InvalidDataDir error, got {other:?}"),
    }
  }

  #[test]
  fn validate_rejects_data_dir_creation_failure() {
    let temp_dir = TempDir::new().unwrap();
    let parent_file = temp_dir.path().join("parent_file");
    fs::write(&parent_file, b"dummy").unwrap();

    let config = LexisConfig::with_data_dir(parent_file.join("child_dir"));

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::DataDirCreationFailed { .. }));
  }

  #[test]
  fn validate_rejects_missing_lexicon_dir() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_valid_config(&temp_dir);
    config.normalizer.lexicon_dir = Some(temp_dir.path().join("nope"));

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLexiconDir { .. }));
  }

  // ─── Loading Tests ───────────────────────────────────────────────────────

  #[test]
  fn from_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lexis.json");
    fs::write(&path, r#"{ "store": { "data_dir": "/tmp/lexis" } }"#).unwrap();

    let config = LexisConfig::from_file(&path).unwrap();

    assert_eq!(config.data_dir(), Path::new("/tmp/lexis"));
    assert_eq!(config.writer_memory_bytes(), 50_000_000);
    assert_eq!(config.remote_timeout(), Duration::from_millis(DEFAULT_TIMEOUT_MS));
    assert_eq!(config.remote.translation_target, "en");
    assert!(config.remote.forvo_api_key.is_none());
    assert_eq!(config.log_level(), LogLevel::Info);
  }

  #[test]
  fn from_file_reads_all_sections() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lexis.json");
    fs::write(
      &path,
      r#"{
        "store": { "data_dir": "/data", "writer_memory_bytes": 20000000 },
        "remote": { "timeout_ms": 1500, "translation_target": "de", "forvo_api_key": "k" },
        "normalizer": { "lexicon_dir": "/lex" },
        "logging": { "level": "debug" }
      }"#,
    )
    .unwrap();

    let config = LexisConfig::from_file(&path).unwrap();

    assert_eq!(config.writer_memory_bytes(), 20_000_000);
    assert_eq!(config.remote_timeout(), Duration::from_millis(1500));
    assert_eq!(config.remote.translation_target, "de");
    assert_eq!(config.remote.forvo_api_key.as_deref(), Some("k"));
    assert_eq!(config.normalizer.lexicon_dir.as_deref(), Some(Path::new("/lex")));
    assert_eq!(config.log_level(), LogLevel::Debug);
  }

  #[test]
  fn from_file_reports_parse_errors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = LexisConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseFailed { .. }));
  }

  #[test]
  fn from_file_reports_missing_file() {
    let err = LexisConfig::from_file("/nonexistent/lexis.json").unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed { .. }));
  }

  // ─── Accessor Method Tests ───────────────────────────────────────────────

  #[test]
  fn store_paths_are_under_data_dir() {
    let config = LexisConfig::with_data_dir("/srv/lexis");

    assert_eq!(config.entries_path(), PathBuf::from("/srv/lexis/entries"));
    assert_eq!(config.registry_path(), PathBuf::from("/srv/lexis/registry.json"));
  }

  #[test]
  fn log_level_parses_case_insensitively() {
    assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert!("verbose".parse::<LogLevel>().is_err());
    assert_eq!(LogLevel::Trace.as_directive(), "trace");
  }
}
