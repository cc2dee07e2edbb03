//! lexis dictionary resolution library
//!
//! Looks words up in imported dictionaries and remote services: definitions,
//! frequency ranks and pronunciations, with accent folding and lemmatization
//! in front of every lookup.

/// Configuration module - LexisConfig and its sections
pub mod config;

/// Error module - LexisError, LexisResult and the per-component errors
pub mod errors;

/// Importer module - StarDict, MDict, DSL, JSON, CSV/TSV, frequency lists and audio libraries
pub mod importers;

/// Logging module - tracing subscriber setup
pub mod logging;

/// Data model module - dictionary metadata, entries, frequencies
pub mod models;

/// Normalizer module - accent stripping and lemmatization
pub mod normalizer;

/// Remote module - definition, translation and pronunciation APIs
pub mod remote;

/// Resolver module - definition, frequency and audio lookup over the selected source
pub mod resolver;

/// Service module - LexisService, the facade over everything above
pub mod service;

/// Store module - tantivy-backed persistent dictionary store
pub mod store;

/// Re-exports
pub use config::LexisConfig;
pub use errors::{LexisError, LexisResult};
pub use importers::ImportReport;
pub use models::{AudioMap, CustomDictionary, DictionaryFormat, DictionaryKind, Frequency};
pub use resolver::{AudioSource, DefinitionSource, TranslationOptions};
pub use service::LexisService;
