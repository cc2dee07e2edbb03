//! Definition resolution
//!
//! Candidates are tried in order and the first non-empty definition wins.

use tracing::{debug, warn};

use crate::models::SenseGroup;
use crate::resolver::{DefinitionSource, Resolver, log_remote_failure};

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    None => String::new(),
  }
}

/// Forms of `lookup_form` to try, in order, without duplicates.
///
/// When `original` starts with an upper-case letter the capitalized and the
/// lower-cased forms are tried after `lookup_form` itself, so a sentence
/// initial "Apple" still finds "apple".
pub fn candidates(original: &str, lookup_form: &str) -> Vec<String> {
  let mut forms = vec![lookup_form.to_string()];
  if original.chars().next().is_some_and(char::is_uppercase) {
    forms.push(capitalize(lookup_form));
    forms.push(lookup_form.to_lowercase());
  }

  let mut unique: Vec<String> = Vec::with_capacity(forms.len());
  for form in forms {
    if !unique.contains(&form) {
      unique.push(form);
    }
  }
  unique
}

/// Renders sense groups as HTML: `<i>pos</i><br>1. sense<br>2. sense`.
///
/// An empty part of speech is left out; groups are joined with `<br>`.
pub fn format_sense_groups(groups: &[SenseGroup]) -> String {
  groups
    .iter()
    .filter(|group| !group.senses.is_empty())
    .map(|group| {
      let mut lines = Vec::with_capacity(group.senses.len() + 1);
      if !group.part_of_speech.is_empty() {
        lines.push(format!("<i>{}</i>", group.part_of_speech));
      }
      lines.extend(group.senses.iter().enumerate().map(|(i, sense)| format!("{}. {sense}", i + 1)));
      lines.join("<br>")
    })
    .collect::<Vec<_>>()
    .join("<br>")
}

impl Resolver {
  /// Definition of the word the user selected.
  ///
  /// `original` is the surface form (its capitalization decides the
  /// candidates), `lookup_form` the form actually looked up, usually its
  /// lemma. Accents are folded from both first.
  pub async fn definition(
    &self,
    original: &str,
    lookup_form: &str,
    language: &str,
    source: &DefinitionSource,
  ) -> Option<String> {
    let original = self.normalizer.strip_accents(original, language);
    let lookup_form = self.normalizer.strip_accents(lookup_form, language);

    for candidate in candidates(&original, &lookup_form) {
      if let Some(definition) = self.definition_of(&candidate, language, source).await {
        debug!(word = %candidate, %source, "definition found");
        return Some(definition);
      }
    }
    debug!(word = %lookup_form, %source, "no definition");
    None
  }

  async fn definition_of(
    &self,
    word: &str,
    language: &str,
    source: &DefinitionSource,
  ) -> Option<String> {
    let definition = match source {
      DefinitionSource::Wiktionary => match self.definitions.define(word, language).await {
        Ok(groups) => format_sense_groups(&groups),
        Err(e) => {
          log_remote_failure(source.name(), word, &e);
          return None;
        }
      },
      DefinitionSource::Translation(options) => {
        let target = options.target.as_deref().unwrap_or(&self.translation_target);
        let endpoint = options.endpoint.as_deref();
        match self.translation.translate(word, language, target, endpoint).await {
          Ok(translation) => translation,
          Err(e) => {
            log_remote_failure(source.name(), word, &e);
            return None;
          }
        }
      }
      DefinitionSource::Local(name) => match self.store.lookup(word, name) {
        Ok(Some(payload)) => payload,
        Ok(None) => {
          debug!(word, dictionary = %name, "local miss");
          return None;
        }
        Err(e) => {
          warn!(word, dictionary = %name, error = %e, "dictionary lookup failed");
          return None;
        }
      },
    };

    Some(definition).filter(|d| !d.trim().is_empty())
  }
}
