//! models module

pub mod model_definition;

/// Re-export data model types
pub use model_definition::{
  AudioMap, CustomDictionary, DictionaryEntry, DictionaryFormat, DictionaryKind,
  DictionaryMetadata, Frequency, SenseGroup,
};
