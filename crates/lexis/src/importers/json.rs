//! JSON-based sources: flat glossaries, Migaku glossaries and frequency lists

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::errors::ImportError;
use crate::importers::report::ParsedEntries;

fn read_json(path: &Path) -> Result<Value, ImportError> {
  let raw = std::fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;
  serde_json::from_str(&raw)
    .map_err(|e| ImportError::Json { path: path.to_path_buf(), source: Arc::new(e) })
}

/// `{headword: definition}`. Non-string definitions are malformed.
pub fn parse_glossary(path: &Path) -> Result<ParsedEntries, ImportError> {
  let Value::Object(map) = read_json(path)? else {
    return Err(ImportError::invalid("json", path, "top-level value must be an object"));
  };

  let mut parsed = ParsedEntries::default();
  for (headword, definition) in map {
    match definition {
      Value::String(definition) if !headword.is_empty() => {
        parsed.record_entry(headword, definition)
      }
      _ => {
        debug!(headword = %headword, "skipping non-string definition");
        parsed.record_malformed();
      }
    }
  }
  Ok(parsed)
}

/// `[{"term": .., "definition": ..}]`. Later terms overwrite earlier ones.
pub fn parse_migaku(path: &Path) -> Result<ParsedEntries, ImportError> {
  let Value::Array(items) = read_json(path)? else {
    return Err(ImportError::invalid("migaku", path, "top-level value must be an array"));
  };

  let mut parsed = ParsedEntries::default();
  for item in items {
    let term = item.get("term").and_then(Value::as_str);
    let definition = item.get("definition").and_then(Value::as_str);
    match (term, definition) {
      (Some(term), Some(definition)) if !term.is_empty() => parsed.record_entry(term, definition),
      _ => parsed.record_malformed(),
    }
  }
  Ok(parsed)
}

/// JSON array of words, most frequent first.
///
/// The payload is the 1-based position in the array. A word that appears
/// more than once takes the rank of its last occurrence.
pub fn parse_frequency_list(path: &Path) -> Result<ParsedEntries, ImportError> {
  let Value::Array(words) = read_json(path)? else {
    return Err(ImportError::invalid("freq", path, "top-level value must be an array"));
  };

  let mut parsed = ParsedEntries::default();
  let mut positions: HashMap<&str, usize> = HashMap::with_capacity(words.len());
  for (i, word) in words.iter().enumerate() {
    let rank = (i + 1).to_string();
    match word.as_str() {
      Some(word) if !word.is_empty() => match positions.get(word) {
        Some(&at) => {
          parsed.entries[at].payload = rank;
          parsed.record_ignored();
        }
        None => {
          positions.insert(word, parsed.entries.len());
          parsed.record_entry(word, rank);
        }
      },
      _ => parsed.record_malformed(),
    }
  }
  Ok(parsed)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
  }

  #[test]
  fn glossary_skips_non_string_values() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "d.json", r#"{"cat": "a small feline", "dog": 42, "": "empty"}"#);

    let parsed = parse_glossary(&path).unwrap();

    assert_eq!(parsed.entries.len(), 1);
    assert_eq!(parsed.entries[0].payload, "a small feline");
    assert_eq!(parsed.total, 3);
    assert_eq!(parsed.skipped_malformed, 2);
  }

  #[test]
  fn glossary_rejects_array() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "d.json", "[]");

    let err = parse_glossary(&path).unwrap_err();
    assert!(matches!(err, ImportError::InvalidFormat { format: "json", .. }));
  }

  #[test]
  fn broken_json_fails_whole_import() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "d.json", "{\"cat\": ");

    let err = parse_glossary(&path).unwrap_err();
    assert!(matches!(err, ImportError::Json { .. }));
  }

  #[test]
  fn migaku_reads_term_definition_pairs() {
    let dir = TempDir::new().unwrap();
    let path = write(
      &dir,
      "m.json",
      r#"[{"term": "Haus", "definition": "house"}, {"term": "Baum"}, {"term": "Haus", "definition": "home"}]"#,
    );

    let parsed = parse_migaku(&path).unwrap();

    assert_eq!(parsed.entries.len(), 2);
    assert_eq!(parsed.entries[1].payload, "home");
    assert_eq!(parsed.skipped_malformed, 1);
  }

  #[test]
  fn frequency_rank_is_list_position() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "f.json", r#"["the", "of", 7, "and"]"#);

    let parsed = parse_frequency_list(&path).unwrap();
    let ranks: Vec<(&str, &str)> =
      parsed.entries.iter().map(|e| (e.headword.as_str(), e.payload.as_str())).collect();

    assert_eq!(ranks, vec![("the", "1"), ("of", "2"), ("and", "4")]);
    assert_eq!(parsed.total, 4);
    assert_eq!(parsed.skipped_malformed, 1);
  }

  #[test]
  fn repeated_word_takes_its_last_rank() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "f.json", r#"["the", "of", "the", 7, "and"]"#);

    let parsed = parse_frequency_list(&path).unwrap();
    let ranks: Vec<(&str, &str)> =
      parsed.entries.iter().map(|e| (e.headword.as_str(), e.payload.as_str())).collect();

    assert_eq!(ranks, vec![("the", "3"), ("of", "2"), ("and", "5")]);
    assert_eq!(parsed.total, 5);
    assert_eq!(parsed.skipped_malformed, 1);
  }
}
