//! Form -> lemma lexicons loaded from `<lang>.tsv` files

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::errors::ConfigError;

/// Inflected form to lemma table for one language.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
  forms: HashMap<String, String>,
}

impl Lexicon {
  /// Parses `form<TAB>lemma` lines.
  ///
  /// Blank lines, `#` comments and lines without a tab are ignored.
  /// The first mapping of a form wins.
  pub fn parse(text: &str) -> Self {
    let mut forms = HashMap::new();
    for line in text.lines() {
      let line = line.trim_end_matches('\r');
      if line.is_empty() || line.starts_with('#') {
        continue;
      }
      let Some((form, lemma)) = line.split_once('\t') else {
        continue;
      };
      let (form, lemma) = (form.trim(), lemma.trim());
      if form.is_empty() || lemma.is_empty() {
        continue;
      }
      forms.entry(form.to_string()).or_insert_with(|| lemma.to_string());
    }
    Self { forms }
  }

  /// Reads and parses one lexicon file.
  ///
  /// # Errors
  /// `ConfigError::ReadFailed` if the file cannot be read as UTF-8.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
      path: path.to_path_buf(),
      source: Arc::new(e),
    })?;
    Ok(Self::parse(&text))
  }

  /// Lemma for `word`, trying the exact form and then its lower-cased form.
  pub fn lemma(&self, word: &str) -> Option<&str> {
    self
      .forms
      .get(word)
      .or_else(|| self.forms.get(&word.to_lowercase()))
      .map(String::as_str)
  }

  /// Number of forms
  pub fn len(&self) -> usize {
    self.forms.len()
  }

  /// True if the lexicon has no forms
  pub fn is_empty(&self) -> bool {
    self.forms.is_empty()
  }
}

/// Loads every `<lang>.tsv` file of `dir`, keyed by language code.
///
/// # Errors
/// `ConfigError::ReadFailed` if the directory or one of the files cannot be read.
pub fn load_lexicons<P: AsRef<Path>>(dir: P) -> Result<HashMap<String, Lexicon>, ConfigError> {
  let dir = dir.as_ref();
  let read_failed =
    |e: std::io::Error| ConfigError::ReadFailed { path: dir.to_path_buf(), source: Arc::new(e) };

  let mut lexicons = HashMap::new();
  for entry in std::fs::read_dir(dir).map_err(read_failed)? {
    let path = entry.map_err(read_failed)?.path();
    if path.extension().and_then(|e| e.to_str()) != Some("tsv") {
      continue;
    }
    let Some(language) = path.file_stem().and_then(|s| s.to_str()) else {
      continue;
    };
    let lexicon = Lexicon::from_file(&path)?;
    debug!(language, forms = lexicon.len(), "loaded lemma lexicon");
    lexicons.insert(language.to_string(), lexicon);
  }
  Ok(lexicons)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn parse_skips_comments_and_malformed_lines() {
    let lexicon = Lexicon::parse("# header\nwent\tgo\n\nno-tab-here\nmice\tmouse\nwent\twend\n");

    assert_eq!(lexicon.len(), 2);
    assert_eq!(lexicon.lemma("went"), Some("go"));
    assert_eq!(lexicon.lemma("mice"), Some("mouse"));
  }

  #[test]
  fn lemma_falls_back_to_lowercase() {
    let lexicon = Lexicon::parse("went\tgo\n");

    assert_eq!(lexicon.lemma("Went"), Some("go"));
    assert_eq!(lexicon.lemma("gone"), None);
  }

  #[test]
  fn load_lexicons_keys_by_file_stem() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("en.tsv"), "went\tgo\n").unwrap();
    std::fs::write(dir.path().join("de.tsv"), "ging\tgehen\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let lexicons = load_lexicons(dir.path()).unwrap();

    assert_eq!(lexicons.len(), 2);
    assert_eq!(lexicons["de"].lemma("ging"), Some("gehen"));
  }
}
