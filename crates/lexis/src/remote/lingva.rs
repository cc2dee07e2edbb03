//! Lingva translation API (`api/v1/{source}/{target}/{text}`)

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::errors::RemoteError;
use crate::remote::{TranslationApi, encode_segment, get_text};

/// Source languages accepted by the translation service.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
  "af", "sq", "am", "ar", "hy", "az", "eu", "be", "bn", "bs", "bg", "ca", "ceb", "ny", "zh",
  "zh_HANT", "co", "hr", "cs", "da", "nl", "en", "eo", "et", "tl", "fi", "fr", "fy", "gl", "ka",
  "de", "el", "gu", "ht", "ha", "haw", "hi", "hmn", "hu", "is", "ig", "id", "ga", "it", "ja", "kn",
  "kk", "km", "rw", "ko", "ku", "ky", "lo", "la", "lv", "lt", "lb", "mk", "mg", "ms", "ml", "mt",
  "mi", "mr", "mn", "my", "ne", "no", "or", "ps", "fa", "pl", "pt", "pa", "ro", "ru", "sm", "gd",
  "sr", "st", "sn", "sd", "si", "sk", "sl", "so", "es", "su", "sw", "sv", "tg", "ta", "tt", "te",
  "th", "tr", "tk", "uk", "ur", "ug", "uz", "vi", "cy", "xh", "yi", "yo", "zu",
];

#[derive(Debug, Deserialize)]
struct TranslationResponse {
  translation: Option<String>,
}

/// Extracts the translation from a response body.
pub fn parse_translation(body: &str) -> Result<String, RemoteError> {
  let response: TranslationResponse =
    serde_json::from_str(body).map_err(|e| RemoteError::Parse(e.to_string()))?;
  match response.translation.map(|t| t.trim().to_string()) {
    Some(translation) if !translation.is_empty() => Ok(translation),
    Some(_) => Err(RemoteError::NotFound),
    None => Err(RemoteError::Parse("response has no `translation`".to_string())),
  }
}

/// Lingva client
#[derive(Debug, Clone)]
pub struct LingvaClient {
  client: reqwest::Client,
  endpoint: String,
}

impl LingvaClient {
  /// Client against a Lingva instance (e.g. `https://lingva.ml`)
  pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
    let endpoint = endpoint.into().trim_end_matches('/').to_string();
    Self { client, endpoint }
  }

  fn url(&self, word: &str, source: &str, target: &str, endpoint: Option<&str>) -> String {
    let endpoint = endpoint.map_or(self.endpoint.as_str(), |e| e.trim_end_matches('/'));
    format!(
      "{}/api/v1/{}/{}/{}",
      endpoint,
      encode_segment(source),
      encode_segment(target),
      encode_segment(word)
    )
  }
}

#[async_trait]
impl TranslationApi for LingvaClient {
  async fn translate(
    &self,
    word: &str,
    source: &str,
    target: &str,
    endpoint: Option<&str>,
  ) -> Result<String, RemoteError> {
    let url = self.url(word, source, target, endpoint);
    debug!(%url, "translation request");
    let body = get_text(&self.client, &url).await?;
    parse_translation(&body)
  }

  fn supports_language(&self, language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
  }
}
