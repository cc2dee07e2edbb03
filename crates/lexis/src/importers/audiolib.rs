//! Audio libraries: a directory tree of pronunciation files
//!
//! Every file is indexed under its lower-cased file stem; the payload is a
//! JSON array of paths relative to the library root, `/`-separated.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::ImportError;
use crate::importers::report::ParsedEntries;

/// Relative path with `/` separators, or `None` if not valid UTF-8.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
  let relative = path.strip_prefix(root).ok()?;
  let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
  Some(parts?.join("/"))
}

/// Indexes the audio files under `root`.
pub fn parse_audio_library(root: &Path) -> Result<ParsedEntries, ImportError> {
  if !root.is_dir() {
    return Err(ImportError::invalid("audiolib", root, "source must be a directory"));
  }

  let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
  let mut malformed = 0;
  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry.map_err(|e| {
      let path = e.path().unwrap_or(root).to_path_buf();
      match e.into_io_error() {
        Some(io) => ImportError::io(path, io),
        None => ImportError::invalid("audiolib", path, "filesystem loop"),
      }
    })?;
    if !entry.file_type().is_file() {
      continue;
    }

    let path = entry.path();
    let stem = path.file_stem().and_then(|s| s.to_str());
    match (stem, relative_path(root, path)) {
      (Some(stem), Some(relative)) if !stem.is_empty() => {
        groups.entry(stem.to_lowercase()).or_default().push(relative);
      }
      _ => {
        debug!(path = %path.display(), "skipping file with non UTF-8 name");
        malformed += 1;
      }
    }
  }

  let mut parsed = ParsedEntries::default();
  for _ in 0..malformed {
    parsed.record_malformed();
  }
  for (headword, files) in groups {
    match serde_json::to_string(&files) {
      Ok(payload) => parsed.record_entry(headword, payload),
      Err(_) => parsed.record_malformed(),
    }
  }
  Ok(parsed)
}
