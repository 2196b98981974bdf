//! In-memory content store and search index for contentql.
//!
//! This crate provides [`MemoryContentStore`], an implementation of the
//! `ContentCache` trait from `contentql-model`, and [`MemorySearchIndex`], an
//! implementation of the `Searcher` trait from `contentql-search`. Both use
//! papaya lock-free HashMaps for concurrent access.
//!
//! # Example
//!
//! ```ignore
//! use contentql_memory::{ContentData, MemoryContentStore};
//! use contentql_model::{ContentKind, ContentType, ModelType, PropertyType};
//!
//! let store = MemoryContentStore::new("en-US");
//! store.add_content_type(
//!     ContentType::new("page", ContentKind::Document)
//!         .with_property(PropertyType::new("title", "String".parse()?)),
//! )?;
//! store.add_content(
//!     ContentData::new(1000, "page", "Home").with_value("title", "Welcome".into()),
//! )?;
//! ```

mod convert;
pub mod index;
pub mod language;
pub mod node;
mod query_parser;
pub mod store;

pub use index::{Document, MemorySearchIndex};
pub use language::Language;
pub use node::{ContentData, MemoryContent, MemoryElement};
pub use store::MemoryContentStore;

/// Creates a new in-memory content cache.
pub fn create_content_cache(default_culture: &str) -> contentql_model::DynContentCache {
    std::sync::Arc::new(MemoryContentStore::new(default_culture))
}
