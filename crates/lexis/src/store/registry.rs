//! Dictionary metadata registry (`registry.json`)
//!
//! The registry is the source of truth for which dictionaries exist. It is
//! rewritten in full through a temp file and an atomic rename.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::models::{DictionaryKind, DictionaryMetadata};

const REGISTRY_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
  version: u32,
  dictionaries: Vec<DictionaryMetadata>,
}

/// In-memory view of `registry.json`, keyed by dictionary name.
#[derive(Debug)]
pub struct Registry {
  path: PathBuf,
  records: BTreeMap<String, DictionaryMetadata>,
}

impl Registry {
  /// Reads the registry at `path`. A missing file is an empty registry.
  ///
  /// # Errors
  /// `RegistryIo` if the file cannot be read, `RegistryCorrupt` if it is not valid JSON.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
    let path = path.as_ref().to_path_buf();
    if !path.exists() {
      return Ok(Self { path, records: BTreeMap::new() });
    }

    let raw = std::fs::read_to_string(&path)
      .map_err(|e| StoreError::RegistryIo { path: path.clone(), source: Arc::new(e) })?;
    let file: RegistryFile = serde_json::from_str(&raw)
      .map_err(|e| StoreError::RegistryCorrupt { path: path.clone(), source: Arc::new(e) })?;

    let records = file.dictionaries.into_iter().map(|m| (m.name.clone(), m)).collect();
    Ok(Self { path, records })
  }

  /// Metadata of `name`
  pub fn get(&self, name: &str) -> Option<&DictionaryMetadata> {
    self.records.get(name)
  }

  /// All records, ordered by name
  pub fn iter(&self) -> impl Iterator<Item = &DictionaryMetadata> {
    self.records.values()
  }

  /// Names of the dictionaries of `language` and `kind`, ordered by name
  pub fn names(&self, language: &str, kind: DictionaryKind) -> Vec<String> {
    self
      .records
      .values()
      .filter(|m| m.language == language && m.kind == kind)
      .map(|m| m.name.clone())
      .collect()
  }

  /// Registers `metadata` unless its name is already present.
  ///
  /// Returns `true` if the registry changed (and was persisted).
  pub fn insert_if_absent(&mut self, metadata: DictionaryMetadata) -> Result<bool, StoreError> {
    if self.records.contains_key(&metadata.name) {
      return Ok(false);
    }
    self.records.insert(metadata.name.clone(), metadata);
    self.persist()?;
    Ok(true)
  }

  /// Unregisters `name` and persists.
  ///
  /// # Errors
  /// `DictionaryNotFound` if the name is not registered.
  pub fn remove(&mut self, name: &str) -> Result<DictionaryMetadata, StoreError> {
    let removed =
      self.records.remove(name).ok_or_else(|| StoreError::DictionaryNotFound(name.to_string()))?;
    if let Err(e) = self.persist() {
      self.records.insert(removed.name.clone(), removed);
      return Err(e);
    }
    Ok(removed)
  }

  /// Rewrites the registry file atomically.
  fn persist(&self) -> Result<(), StoreError> {
    let io_err =
      |e: std::io::Error| StoreError::RegistryIo { path: self.path.clone(), source: Arc::new(e) };
    let dir = self.path.parent().unwrap_or_else(|| Path::new("."));

    let file = RegistryFile {
      version: REGISTRY_VERSION,
      dictionaries: self.records.values().cloned().collect(),
    };
    let json = serde_json::to_vec_pretty(&file)
      .map_err(|e| StoreError::RegistryCorrupt { path: self.path.clone(), source: Arc::new(e) })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&json).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
    Ok(())
  }
}
