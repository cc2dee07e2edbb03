//! importers module
//!
//! Parsers that turn dictionary sources into `(headword, payload)` entries,
//! one per `DictionaryFormat`, and the import entry point that writes them to
//! the store.
//!
//! A malformed record is skipped and counted; a source that cannot be opened
//! or parsed as a whole fails the import before anything is written.

pub mod audiolib;
pub mod delimited;
pub mod dsl;
pub mod json;
pub mod markup;
pub mod mdx;
pub mod report;
pub mod stardict;

use std::path::Path;

use tracing::{debug, info};

use crate::errors::ImportError;
use crate::models::DictionaryFormat;
use crate::store::DictionaryStore;

/// Re-export major types
pub use report::{ImportReport, ParsedEntries};

/// Parses the source at `path` as `format`.
///
/// # Errors
/// - `SourceNotFound` if `path` does not exist
/// - The format parser's error if the source cannot be read as a whole
/// - `Empty` if the source parsed but yielded no entries
pub fn parse_source(path: &Path, format: DictionaryFormat) -> Result<ParsedEntries, ImportError> {
  if !path.exists() {
    return Err(ImportError::SourceNotFound(path.to_path_buf()));
  }

  let parsed = match format {
    DictionaryFormat::Stardict => stardict::parse_stardict(path)?,
    DictionaryFormat::Json => json::parse_glossary(path)?,
    DictionaryFormat::Migaku => json::parse_migaku(path)?,
    DictionaryFormat::Freq => json::parse_frequency_list(path)?,
    DictionaryFormat::Audiolib => audiolib::parse_audio_library(path)?,
    DictionaryFormat::Mdx => mdx::parse_mdx(path)?,
    DictionaryFormat::Dsl => dsl::parse_dsl(path)?,
    DictionaryFormat::Csv => delimited::parse_csv(path)?,
    DictionaryFormat::Tsv => delimited::parse_tsv(path)?,
  };

  debug!(
    path = %path.display(),
    %format,
    total = parsed.total,
    malformed = parsed.skipped_malformed,
    "parsed import source"
  );
  if parsed.entries.is_empty() {
    return Err(ImportError::Empty(path.to_path_buf()));
  }
  Ok(parsed)
}

/// Parses the source at `path` and writes it to `store` as dictionary `name`.
///
/// Parsing finishes before the store is touched, so lookups against other
/// dictionaries are never blocked by a slow parse.
pub fn import_into(
  store: &DictionaryStore,
  path: &Path,
  format: DictionaryFormat,
  language: &str,
  name: &str,
) -> Result<ImportReport, ImportError> {
  let mut parsed = parse_source(path, format)?;
  let entries = std::mem::take(&mut parsed.entries);
  let imported = store.import_dictionary(entries, language, name, format)?;
  let report = parsed.into_report(imported);

  info!(
    dictionary = name,
    language,
    %format,
    total = report.total,
    imported = report.imported,
    skipped_malformed = report.skipped_malformed,
    "import finished"
  );
  Ok(report)
}
