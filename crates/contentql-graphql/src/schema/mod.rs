//! GraphQL schema building and lazy loading.
//!
//! - [`registry`] maps content-model types to GraphQL types
//! - [`property_field`] builds one field per content-type property
//! - [`content`] builds the content interfaces and object types
//! - [`searcher`] builds the per-index searcher and result types
//! - [`builder`] assembles the schema
//! - [`lazy`] defers the build to first use

mod builder;
mod content;
mod lazy;
pub mod naming;
pub mod property_field;
pub mod registry;
mod searcher;

pub use builder::{ContentSchemaBuilder, SchemaBuilderConfig};
pub use content::ContentTypeNames;
pub use lazy::{LazySchema, SchemaState};
pub use property_field::{FieldShape, build_property_field};
pub use registry::{GraphType, GraphTypeKind, RegistryKey, TypeRegistry, TypeRegistryBuilder};

/// Scalar for RFC 3339 timestamps.
pub const DATETIME_SCALAR: &str = "DateTime";

/// Scalar for 64-bit integers, which do not fit GraphQL `Int`.
pub const LONG_SCALAR: &str = "Long";

/// Scalar for arbitrary JSON values.
pub const JSON_SCALAR: &str = "JSON";

/// Interface implemented by every content object type.
pub const PUBLISHED_CONTENT: &str = "PublishedContent";

/// Interface implemented by every element and content object type.
pub const PUBLISHED_ELEMENT: &str = "PublishedElement";

/// Object type for content whose content type has no object of its own.
pub const UNMAPPED_CONTENT: &str = "UnmappedContent";

/// Object type for elements whose content type has no object of its own.
pub const UNMAPPED_ELEMENT: &str = "UnmappedElement";

/// Focal point object of an image cropper value.
pub const IMAGE_CROPPER_FOCAL_POINT: &str = "ImageCropperFocalPoint";

/// Crop object of an image cropper value.
pub const IMAGE_CROPPER_CROP: &str = "ImageCropperCrop";

/// Enum of search boolean operations.
pub const BOOLEAN_OPERATION: &str = "BooleanOperation";

/// Enum of sort directions.
pub const SORT_DIRECTION: &str = "SortDirection";

/// Interface implemented by every per-index result set type.
pub const SEARCH_RESULTS: &str = "SearchResults";

/// Interface implemented by every per-index result item type.
pub const SEARCH_RESULT: &str = "SearchResult";

/// Object holding one field of a search result.
pub const SEARCH_RESULT_FIELD: &str = "SearchResultField";

/// Object holding one field per search index.
pub const SEARCHERS: &str = "Searchers";
