//! # contentql-graphql
//!
//! GraphQL adapter layer for contentql.
//!
//! This crate exposes a content-management system's published content model
//! and its full-text search indexes through a dynamically built GraphQL
//! schema:
//!
//! - one object type per content type, with one field per property
//! - one `<Index>Searcher` object per search index, with `query` and `search`
//! - root fields to read content by id, key, type or tree position
//!
//! ## Overview
//!
//! The schema is generated at runtime from the content cache's content types
//! and the configured searchers. Property types are mapped through an
//! immutable [`TypeRegistry`]. The schema uses lazy initialization so the
//! server can start before it is built.
//!
//! ## Endpoints
//!
//! - `POST /graphql` - GraphQL endpoint
//! - `GET /graphql` - GraphQL (query via URL param)
//!
//! ## Configuration
//!
//! Add to `contentql.toml`:
//!
//! ```toml
//! [graphql]
//! enabled = true
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`schema`] - Type registry, schema building and lazy loading
//! - [`resolvers`] - Field resolvers and the search query translator
//! - [`context`] - GraphQL execution context
//! - [`handler`] - Axum HTTP handlers
//! - [`error`] - Error types for GraphQL operations

pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod resolvers;
pub mod schema;

// Re-export main types
pub use config::GraphQLConfig;
pub use context::{GraphQLContext, GraphQLContextBuilder};
pub use error::GraphQLError;
pub use handler::{GraphQLContextTemplate, GraphQLState, graphql_handler, graphql_handler_get};
pub use resolvers::{ContentNode, parse_sort_fields};
pub use schema::{
    ContentSchemaBuilder, GraphType, GraphTypeKind, LazySchema, RegistryKey, SchemaBuilderConfig,
    SchemaState, TypeRegistry, TypeRegistryBuilder,
};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
