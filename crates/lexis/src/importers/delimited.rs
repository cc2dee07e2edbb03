//! Comma and tab separated glossaries
//!
//! First column is the headword, second the definition; further columns are
//! ignored. Fields may be double-quoted, with `""` as an escaped quote, and a
//! quoted field may span lines.

use std::path::Path;

use crate::errors::ImportError;
use crate::importers::report::ParsedEntries;

/// Splits `text` into records of fields.
fn split_records(text: &str, delimiter: char) -> Vec<Vec<String>> {
  let mut records = Vec::new();
  let mut record = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut chars = text.chars().peekable();

  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        '"' if chars.peek() == Some(&'"') => {
          field.push('"');
          chars.next();
        }
        '"' => in_quotes = false,
        _ => field.push(c),
      }
      continue;
    }
    match c {
      '"' if field.is_empty() => in_quotes = true,
      '\r' => {}
      '\n' => {
        record.push(std::mem::take(&mut field));
        records.push(std::mem::take(&mut record));
      }
      c if c == delimiter => record.push(std::mem::take(&mut field)),
      _ => field.push(c),
    }
  }
  if !field.is_empty() || !record.is_empty() {
    record.push(field);
    records.push(record);
  }
  records
}

fn parse_delimited(path: &Path, delimiter: char) -> Result<ParsedEntries, ImportError> {
  let bytes = std::fs::read(path).map_err(|e| ImportError::io(path, e))?;
  let (text, _, _) = encoding_rs::UTF_8.decode(&bytes);

  let mut parsed = ParsedEntries::default();
  for record in split_records(&text, delimiter) {
    if record.iter().all(|f| f.trim().is_empty()) {
      continue;
    }
    match record.as_slice() {
      [headword, definition, ..] if !headword.trim().is_empty() => {
        parsed.record_entry(headword.trim(), definition.as_str())
      }
      _ => parsed.record_malformed(),
    }
  }
  Ok(parsed)
}

/// Parses a comma separated glossary
pub fn parse_csv(path: &Path) -> Result<ParsedEntries, ImportError> {
  parse_delimited(path, ',')
}

/// Parses a tab separated glossary
pub fn parse_tsv(path: &Path) -> Result<ParsedEntries, ImportError> {
  parse_delimited(path, '\t')
}
