//! store module
//!
//! Persistent storage of imported dictionaries: a tantivy entry index and the
//! metadata registry.

pub mod dictionary_store;
pub mod registry;
pub mod schema;

/// Re-export major types
pub use dictionary_store::DictionaryStore;
pub use registry::Registry;
pub use schema::{StoreFields, build_schema};
