//! Error definitions
//!
//! Lookups never fail: a miss and an unreachable remote source are both folded
//! into an empty result by the resolvers. Only initialization, import and delete
//! return these errors to the caller.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Configuration (LexisConfig) related errors
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ConfigError {
  /// store.data_dir is empty
  #[error("store.data_dir must not be empty")]
  EmptyDataDir,

  /// store.writer_memory_bytes is out of range
  #[error(
    "store.writer_memory_bytes must be within {min}..={max} bytes: actual={actual}"
  )]
  InvalidWriterMemoryBytes {
    /// Minimum allowed value (bytes)
    min: u64,
    /// Maximum allowed value (bytes)
    max: u64,
    /// Actual value (bytes)
    actual: u64,
  },

  /// remote.timeout_ms is zero or too long
  #[error("remote.timeout_ms must be within 1..={max} ms: actual={actual}")]
  InvalidRemoteTimeout {
    /// Maximum allowed value (ms)
    max: u64,
    /// Actual value (ms)
    actual: u64,
  },

  /// store.data_dir exists but is not a directory
  #[error("store.data_dir is not a directory: path={path:?}")]
  InvalidDataDir {
    /// Offending path
    path: PathBuf,
  },

  /// store.data_dir could not be created
  #[error("failed to create store.data_dir: path={path:?}, error={source}")]
  DataDirCreationFailed {
    /// Path we tried to create
    path: PathBuf,
    /// Underlying IO error
    #[source]
    source: Arc<io::Error>,
  },

  /// normalizer.lexicon_dir is set but is not a directory
  #[error("normalizer.lexicon_dir is not a directory: path={path:?}")]
  InvalidLexiconDir {
    /// Offending path
    path: PathBuf,
  },

  /// The config file could not be read
  #[error("failed to read config file: path={path:?}, error={source}")]
  ReadFailed {
    /// Config file path
    path: PathBuf,
    /// Underlying IO error
    #[source]
    source: Arc<io::Error>,
  },

  /// The config file is not valid JSON for LexisConfig
  #[error("failed to parse config file: path={path:?}, error={source}")]
  ParseFailed {
    /// Config file path
    path: PathBuf,
    /// Underlying JSON error
    #[source]
    source: Arc<serde_json::Error>,
  },

  /// An environment variable holds a value that cannot be parsed
  #[error("invalid value for environment variable {name}: {value}")]
  InvalidEnvValue {
    /// Variable name
    name: String,
    /// Raw value
    value: String,
  },
}

/// Dictionary store errors
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum StoreError {
  /// Tantivy index operation error
  #[error("tantivy index error: {0}")]
  Tantivy(#[from] tantivy::TantivyError),

  /// Index directory could not be created
  #[error("invalid store path: {path}: {source}")]
  InvalidStorePath {
    /// Offending path
    path: PathBuf,
    /// Underlying IO error
    #[source]
    source: Arc<io::Error>,
  },

  /// The on-disk schema does not contain a required field
  #[error("store schema is missing field `{field}`")]
  MissingField {
    /// Field name
    field: String,
  },

  /// Registry file could not be read or written
  #[error("registry io error: path={path:?}, error={source}")]
  RegistryIo {
    /// Registry path
    path: PathBuf,
    /// Underlying IO error
    #[source]
    source: Arc<io::Error>,
  },

  /// Registry file is corrupt
  #[error("registry is corrupt: path={path:?}, error={source}")]
  RegistryCorrupt {
    /// Registry path
    path: PathBuf,
    /// Underlying JSON error
    #[source]
    source: Arc<serde_json::Error>,
  },

  /// A dictionary name is already registered for another language or kind
  #[error(
    "dictionary `{name}` already exists for language={language} kind={kind}"
  )]
  NameConflict {
    /// Dictionary name
    name: String,
    /// Registered language
    language: String,
    /// Registered kind
    kind: String,
  },

  /// Named dictionary does not exist
  #[error("dictionary not found: {0}")]
  DictionaryNotFound(String),

  /// A lock was poisoned by a panicking writer
  #[error("store lock poisoned: {0}")]
  LockPoisoned(&'static str),
}

/// Dictionary import errors.
///
/// Raised only when the source as a whole cannot be opened or parsed.
/// A single malformed record is skipped and counted instead.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ImportError {
  /// Source file or directory does not exist
  #[error("import source not found: {0}")]
  SourceNotFound(PathBuf),

  /// IO error while reading the source
  #[error("failed to read import source: path={path:?}, error={source}")]
  Io {
    /// Source path
    path: PathBuf,
    /// Underlying IO error
    #[source]
    source: Arc<io::Error>,
  },

  /// Source is not valid JSON for the requested format
  #[error("invalid JSON in import source: path={path:?}, error={source}")]
  Json {
    /// Source path
    path: PathBuf,
    /// Underlying JSON error
    #[source]
    source: Arc<serde_json::Error>,
  },

  /// Source structure does not match the requested format
  #[error("invalid {format} source: path={path:?}, reason={reason}")]
  InvalidFormat {
    /// Format name
    format: &'static str,
    /// Source path
    path: PathBuf,
    /// What was wrong
    reason: String,
  },

  /// Source uses a feature this importer cannot read
  #[error("unsupported {format} feature: {reason}")]
  Unsupported {
    /// Format name
    format: &'static str,
    /// Unsupported feature
    reason: String,
  },

  /// Unknown format name
  #[error("unknown dictionary format: {0}")]
  UnknownFormat(String),

  /// Source parsed but produced no entries at all
  #[error("import source contains no entries: {0}")]
  Empty(PathBuf),

  /// Writing the parsed entries failed
  #[error(transparent)]
  Store(#[from] StoreError),
}

impl ImportError {
  /// Builds an `Io` error for `path`
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io { path: path.into(), source: Arc::new(source) }
  }

  /// Builds an `InvalidFormat` error for `path`
  pub(crate) fn invalid(
    format: &'static str,
    path: impl Into<PathBuf>,
    reason: impl Into<String>,
  ) -> Self {
    Self::InvalidFormat { format, path: path.into(), reason: reason.into() }
  }
}

/// Errors from remote collaborators (definition, translation, pronunciation APIs).
///
/// Resolvers never surface these; they are logged and treated as a miss.
/// `NotFound` is a genuine miss, the other variants mean the source was unavailable.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum RemoteError {
  /// The remote source answered but has no entry for the word
  #[error("not found remotely")]
  NotFound,

  /// The request did not complete within the configured timeout
  #[error("remote request timed out")]
  Timeout,

  /// Network level failure
  #[error("remote source unavailable: {0}")]
  Unavailable(String),

  /// Non-success HTTP status
  #[error("remote source returned HTTP {0}")]
  Status(u16),

  /// Response body did not have the expected shape
  #[error("unexpected remote response: {0}")]
  Parse(String),

  /// The collaborator is not configured (e.g. missing API key)
  #[error("remote source not configured: {0}")]
  NotConfigured(&'static str),
}

impl RemoteError {
  /// True when the error means "the source could not be reached", as opposed to a miss
  pub fn is_unavailable(&self) -> bool {
    !matches!(self, Self::NotFound)
  }
}

impl From<reqwest::Error> for RemoteError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      Self::Timeout
    } else if let Some(status) = e.status() {
      Self::Status(status.as_u16())
    } else if e.is_decode() {
      Self::Parse(e.to_string())
    } else {
      Self::Unavailable(e.to_string())
    }
  }
}

/// Unified error.
/// Public APIs of this crate that can fail return this error.
/// Use as `LexisResult<T>` = `Result<T, LexisError>`.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum LexisError {
  /// Configuration error
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// Store error
  #[error(transparent)]
  Store(#[from] StoreError),

  /// Import error
  #[error(transparent)]
  Import(#[from] ImportError),

  /// The HTTP client for remote sources could not be built
  #[error("failed to build HTTP client: {0}")]
  HttpClient(String),
}

/// Standard Result type alias of the lexis crate
pub type LexisResult<T> = Result<T, LexisError>;
