//! Wiktionary REST definition API (`page/definition/{word}`)
//!
//! The response maps language codes to usages; each usage has a part of
//! speech and a list of HTML definitions.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::errors::RemoteError;
use crate::models::SenseGroup;
use crate::remote::{DefinitionApi, encode_segment, get_text};

static HTML_TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"<[^>]*>").expect("HTML tag pattern"));

#[derive(Debug, Deserialize)]
struct Usage {
  #[serde(rename = "partOfSpeech", default)]
  part_of_speech: String,
  #[serde(default)]
  definitions: Vec<Definition>,
}

#[derive(Debug, Deserialize)]
struct Definition {
  #[serde(default)]
  definition: String,
}

/// Reduces a definition's HTML to plain text
fn html_to_text(html: &str) -> String {
  let text = HTML_TAG.replace_all(html, "");
  let text = htmlescape::decode_html(&text).unwrap_or_else(|_| text.into_owned());
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the sense groups of `language` from a response body.
pub fn parse_definitions(body: &str, language: &str) -> Result<Vec<SenseGroup>, RemoteError> {
  let mut usages: HashMap<String, Vec<Usage>> =
    serde_json::from_str(body).map_err(|e| RemoteError::Parse(e.to_string()))?;
  let usages = usages.remove(language).ok_or(RemoteError::NotFound)?;

  let groups: Vec<SenseGroup> = usages
    .into_iter()
    .map(|usage| {
      let senses = usage
        .definitions
        .iter()
        .map(|d| html_to_text(&d.definition))
        .filter(|sense| !sense.is_empty())
        .collect();
      SenseGroup::new(usage.part_of_speech, senses)
    })
    .filter(|group| !group.senses.is_empty())
    .collect();

  if groups.is_empty() { Err(RemoteError::NotFound) } else { Ok(groups) }
}

/// Wiktionary REST client
#[derive(Debug, Clone)]
pub struct WiktionaryClient {
  client: reqwest::Client,
  endpoint: String,
}

impl WiktionaryClient {
  /// Client against `endpoint` (e.g. `https://en.wiktionary.org/api/rest_v1`)
  pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
    let endpoint = endpoint.into().trim_end_matches('/').to_string();
    Self { client, endpoint }
  }

  fn url(&self, word: &str) -> String {
    format!("{}/page/definition/{}", self.endpoint, encode_segment(word))
  }
}

#[async_trait]
impl DefinitionApi for WiktionaryClient {
  async fn define(&self, word: &str, language: &str) -> Result<Vec<SenseGroup>, RemoteError> {
    let url = self.url(word);
    debug!(%url, "wiktionary request");
    let body = get_text(&self.client, &url).await?;
    parse_definitions(&body, language)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BODY: &str = r#"{
    "en": [
      {"partOfSpeech": "Noun", "language": "English", "definitions": [
        {"definition": "A <a href=\"/wiki/fruit\">fruit</a> of the apple tree."},
        {"definition": "<span></span>"},
        {"definition": "Tom &amp; Jerry's  favourite"}
      ]},
      {"partOfSpeech": "Verb", "definitions": []}
    ],
    "fr": [{"partOfSpeech": "Nom", "definitions": [{"definition": "pomme"}]}]
  }"#;

  #[test]
  fn parses_requested_language_only() {
    let groups = parse_definitions(BODY, "en").unwrap();

    assert_eq!(
      groups,
      vec![SenseGroup::new(
        "Noun",
        vec!["A fruit of the apple tree.".to_string(), "Tom & Jerry's favourite".to_string()]
      )]
    );
  }

  #[test]
  fn missing_language_is_not_found() {
    assert!(matches!(parse_definitions(BODY, "de"), Err(RemoteError::NotFound)));
  }

  #[test]
  fn garbage_is_parse_error() {
    assert!(matches!(parse_definitions("<html>", "en"), Err(RemoteError::Parse(_))));
  }

  #[test]
  fn url_encodes_the_word() {
    let client = WiktionaryClient::new(reqwest::Client::new(), "https://example.org/api/");

    assert_eq!(client.url("ice cream"), "https://example.org/api/page/definition/ice%20cream");
  }
}
