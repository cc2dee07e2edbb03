//! Import result report and the parse accumulator behind it

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::DictionaryEntry;

/// Result of one dictionary import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
  /// Records found in the source
  pub total: usize,
  /// Distinct headwords written to the store
  pub imported: usize,
  /// Records skipped because they could not be parsed
  pub skipped_malformed: usize,
}

impl ImportReport {
  /// True if no record was skipped
  pub fn is_clean(&self) -> bool {
    self.skipped_malformed == 0
  }
}

/// Entries parsed from a source, with per-record bookkeeping.
#[derive(Debug, Default)]
pub struct ParsedEntries {
  /// Parsed entries, in source order
  pub entries: Vec<DictionaryEntry>,
  /// Records seen
  pub total: usize,
  /// Records skipped as malformed
  pub skipped_malformed: usize,
  /// headword -> index into `entries`, maintained by `record_or_append`
  positions: HashMap<String, usize>,
}

impl ParsedEntries {
  /// Records a parsed entry
  pub fn record_entry(&mut self, headword: impl Into<String>, payload: impl Into<String>) {
    self.total += 1;
    self.entries.push(DictionaryEntry::new(headword, payload));
  }

  /// Records an entry, appending its payload to an earlier entry with the
  /// same headword. Returns the index of the entry holding the payload.
  pub fn record_or_append(&mut self, headword: &str, payload: &str, separator: &str) -> usize {
    self.total += 1;
    if let Some(&i) = self.positions.get(headword) {
      let entry = &mut self.entries[i];
      entry.payload.push_str(separator);
      entry.payload.push_str(payload);
      return i;
    }
    let i = self.entries.len();
    self.positions.insert(headword.to_string(), i);
    self.entries.push(DictionaryEntry::new(headword, payload));
    i
  }

  /// Index of the entry recorded through `record_or_append` for `headword`
  pub fn position(&self, headword: &str) -> Option<usize> {
    self.positions.get(headword).copied()
  }

  /// Records a record that was seen but not kept (e.g. a duplicate)
  pub fn record_ignored(&mut self) {
    self.total += 1;
  }

  /// Records a malformed record
  pub fn record_malformed(&mut self) {
    self.total += 1;
    self.skipped_malformed += 1;
  }

  /// Builds the final report once the store reported what it wrote
  pub fn into_report(self, imported: usize) -> ImportReport {
    ImportReport { total: self.total, imported, skipped_malformed: self.skipped_malformed }
  }
}
