//! Forvo pronunciation API (`word-pronunciations`, ordered by rating)

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::errors::RemoteError;
use crate::models::AudioMap;
use crate::remote::{PronunciationApi, PronunciationMode, encode_segment, get_text};

#[derive(Debug, Deserialize)]
struct PronunciationList {
  #[serde(default)]
  items: Vec<Pronunciation>,
}

#[derive(Debug, Deserialize)]
struct Pronunciation {
  #[serde(default)]
  username: String,
  #[serde(default)]
  pathmp3: Option<String>,
  #[serde(default)]
  pathogg: Option<String>,
}

/// Builds `label -> URL` from a response body (items best rated first).
///
/// Labels are `Forvo:<username>`; `Best` keeps only the first recording.
pub fn parse_pronunciations(body: &str, mode: PronunciationMode) -> Result<AudioMap, RemoteError> {
  let list: PronunciationList =
    serde_json::from_str(body).map_err(|e| RemoteError::Parse(e.to_string()))?;

  let mut audio = AudioMap::new();
  for (i, item) in list.items.into_iter().enumerate() {
    let non_empty = |path: Option<String>| path.filter(|p| !p.is_empty());
    let Some(url) = non_empty(item.pathmp3).or_else(|| non_empty(item.pathogg)) else {
      continue;
    };
    let speaker = if item.username.is_empty() { (i + 1).to_string() } else { item.username };
    audio.insert(format!("Forvo:{speaker}"), url);
    if mode == PronunciationMode::Best {
      break;
    }
  }

  if audio.is_empty() { Err(RemoteError::NotFound) } else { Ok(audio) }
}

/// Forvo client; without an API key every request is `NotConfigured`
#[derive(Debug, Clone)]
pub struct ForvoClient {
  client: reqwest::Client,
  endpoint: String,
  api_key: Option<String>,
}

impl ForvoClient {
  /// Client against `endpoint` (e.g. `https://apifree.forvo.com`)
  pub fn new(
    client: reqwest::Client,
    endpoint: impl Into<String>,
    api_key: Option<String>,
  ) -> Self {
    let endpoint = endpoint.into().trim_end_matches('/').to_string();
    Self { client, endpoint, api_key: api_key.filter(|k| !k.is_empty()) }
  }

  fn url(&self, api_key: &str, word: &str, language: &str) -> String {
    format!(
      "{}/key/{}/format/json/action/word-pronunciations/word/{}/language/{}/order/rate-desc",
      self.endpoint,
      encode_segment(api_key),
      encode_segment(word),
      encode_segment(language)
    )
  }
}

#[async_trait]
impl PronunciationApi for ForvoClient {
  async fn pronunciations(
    &self,
    word: &str,
    language: &str,
    mode: PronunciationMode,
  ) -> Result<AudioMap, RemoteError> {
    let api_key = self.api_key.as_deref().ok_or(RemoteError::NotConfigured("forvo api key"))?;
    debug!(word, language, ?mode, "forvo request");
    let body = get_text(&self.client, &self.url(api_key, word, language)).await?;
    parse_pronunciations(&body, mode)
  }
}
