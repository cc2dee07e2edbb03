//! Pronunciation lookup
//!
//! Local libraries store paths relative to the library root; the root comes
//! from the caller's `CustomDictionary` settings, since the files are never
//! copied into the store.

use std::path::Path;

use tracing::{debug, warn};

use crate::models::{AudioMap, CustomDictionary, DictionaryKind};
use crate::remote::PronunciationMode;
use crate::resolver::{AudioSource, Resolver, log_remote_failure};

/// Settings record of audio library `name` in `language`
fn library_root<'a>(
  name: &str,
  language: &str,
  custom_dictionaries: &'a [CustomDictionary],
) -> Option<&'a Path> {
  custom_dictionaries
    .iter()
    .find(|d| d.name == name && d.lang == language && d.kind == DictionaryKind::Audiolib)
    .map(|d| d.path.as_path())
}

impl Resolver {
  /// Pronunciations of `word` as `label -> locator`; empty on any failure.
  pub async fn audio(
    &self,
    word: &str,
    language: &str,
    source: &AudioSource,
    custom_dictionaries: &[CustomDictionary],
  ) -> AudioMap {
    match source {
      AudioSource::ForvoAll => self.remote_audio(word, language, PronunciationMode::All).await,
      AudioSource::ForvoBest => self.remote_audio(word, language, PronunciationMode::Best).await,
      AudioSource::Local(name) => {
        self.local_audio(word, language, name, custom_dictionaries).unwrap_or_default()
      }
      AudioSource::AllLocal => {
        let mut merged = AudioMap::new();
        for library in custom_dictionaries
          .iter()
          .filter(|d| d.lang == language && d.kind == DictionaryKind::Audiolib)
        {
          if let Some(audio) = self.local_audio(word, language, &library.name, custom_dictionaries)
          {
            merged.extend(audio);
          }
        }
        merged
      }
    }
  }

  async fn remote_audio(&self, word: &str, language: &str, mode: PronunciationMode) -> AudioMap {
    match self.pronunciations.pronunciations(word, language, mode).await {
      Ok(audio) => audio,
      Err(e) => {
        log_remote_failure("forvo", word, &e);
        AudioMap::new()
      }
    }
  }

  /// Recordings of `word` in library `name`; `None` when the library fails.
  fn local_audio(
    &self,
    word: &str,
    language: &str,
    name: &str,
    custom_dictionaries: &[CustomDictionary],
  ) -> Option<AudioMap> {
    let Some(root) = library_root(name, language, custom_dictionaries) else {
      warn!(library = name, language, "audio library has no settings record");
      return None;
    };

    let payload = match self.store.lookup(&word.to_lowercase(), name) {
      Ok(Some(payload)) => payload,
      Ok(None) => {
        debug!(word, library = name, "no local recordings");
        return Some(AudioMap::new());
      }
      Err(e) => {
        warn!(word, library = name, error = %e, "audio library lookup failed");
        return None;
      }
    };

    let paths: Vec<String> = match serde_json::from_str(&payload) {
      Ok(paths) => paths,
      Err(e) => {
        warn!(word, library = name, error = %e, "audio library entry is not a path list");
        return None;
      }
    };

    Some(
      paths
        .into_iter()
        .map(|relative| {
          let stem = Path::new(&relative).with_extension("");
          let label = format!("{name}:{}", stem.to_string_lossy());
          let locator = root.join(&relative).to_string_lossy().into_owned();
          (label, locator)
        })
        .collect(),
    )
  }
}
