//! remote module
//!
//! Network collaborators consulted by the resolvers: a definition API
//! (Wiktionary), a translation API (Lingva) and a pronunciation API (Forvo).
//! Each one sits behind a trait so the resolvers can be driven by in-process
//! fakes.

pub mod forvo;
pub mod lingva;
pub mod wiktionary;

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;

use crate::config::RemoteConfig;
use crate::errors::{LexisError, LexisResult, RemoteError};
use crate::models::{AudioMap, SenseGroup};

pub use forvo::ForvoClient;
pub use lingva::LingvaClient;
pub use wiktionary::WiktionaryClient;

/// Characters escaped in a URL path segment (RFC 3986 unreserved are kept).
const PATH_SEGMENT: &AsciiSet =
  &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Definition lookup by word and language
#[async_trait]
pub trait DefinitionApi: Send + Sync {
  /// Senses of `word` grouped by part of speech.
  ///
  /// `Err(RemoteError::NotFound)` when the source has no entry.
  async fn define(&self, word: &str, language: &str) -> Result<Vec<SenseGroup>, RemoteError>;
}

/// Machine translation of single words
#[async_trait]
pub trait TranslationApi: Send + Sync {
  /// Translates `word` from `source` into `target`.
  ///
  /// `endpoint` replaces the configured service instance for this call.
  async fn translate(
    &self,
    word: &str,
    source: &str,
    target: &str,
    endpoint: Option<&str>,
  ) -> Result<String, RemoteError>;

  /// True if `language` can be used as a source language
  fn supports_language(&self, language: &str) -> bool;
}

/// How many pronunciations to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PronunciationMode {
  /// Every recording
  All,
  /// Only the best rated recording
  Best,
}

/// Pronunciation recordings by word and language
#[async_trait]
pub trait PronunciationApi: Send + Sync {
  /// `label -> URL` of recordings of `word`.
  async fn pronunciations(
    &self,
    word: &str,
    language: &str,
    mode: PronunciationMode,
  ) -> Result<AudioMap, RemoteError>;
}

/// Builds the HTTP client shared by every remote collaborator.
///
/// The configured timeout bounds each request as a whole.
pub fn build_client(config: &RemoteConfig) -> LexisResult<reqwest::Client> {
  reqwest::Client::builder()
    .timeout(Duration::from_millis(config.timeout_ms))
    .user_agent(concat!("lexis/", env!("CARGO_PKG_VERSION")))
    .build()
    .map_err(|e| LexisError::HttpClient(e.to_string()))
}

/// Percent-encodes `text` for use as one URL path segment.
pub(crate) fn encode_segment(text: &str) -> String {
  utf8_percent_encode(text, PATH_SEGMENT).to_string()
}

/// `404` is a miss, any other non-success status means the source is unavailable.
pub(crate) fn check_status(status: StatusCode) -> Result<(), RemoteError> {
  if status == StatusCode::NOT_FOUND {
    Err(RemoteError::NotFound)
  } else if !status.is_success() {
    Err(RemoteError::Status(status.as_u16()))
  } else {
    Ok(())
  }
}

/// Sends a GET request and returns the body of a successful response.
pub(crate) async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, RemoteError> {
  let response = client.get(url).send().await?;
  check_status(response.status())?;
  Ok(response.text().await?)
}
