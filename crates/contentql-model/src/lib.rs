//! # contentql-model
//!
//! Published content model abstractions for contentql.
//!
//! This crate defines the contract between the GraphQL adapter layer and the
//! content-management system that owns the published content. It contains no
//! storage: backends implement [`ContentCache`] and the published node traits.
//!
//! ## Overview
//!
//! - [`ContentType`] / [`PropertyType`] describe the content model
//! - [`ModelType`] is the declared value type of a property
//! - [`PublishedElement`] / [`PublishedContent`] expose runtime property values
//! - [`ContentCache`] is the read-only published snapshot
//!
//! ## Example
//!
//! ```ignore
//! use contentql_model::{ContentCache, Fallback};
//!
//! fn title(cache: &dyn ContentCache, id: i32) -> Option<String> {
//!     let page = cache.get_by_id(id)?;
//!     page.value("title", Some("en-US"), Fallback::ToLanguage)
//!         .ok()?
//!         .as_str()
//!         .map(str::to_string)
//! }
//! ```

mod content_type;
mod error;
mod media;
mod model_type;
mod published;
mod value;

pub use content_type::{ContentKind, ContentType, PropertyType, editors};
pub use error::ContentError;
pub use media::{FocalPoint, ImageCrop, ImageCropperValue, MediaWithCrops};
pub use model_type::{BaseType, Capability, IMAGE_CROPPER_VALUE, MEDIA_WITH_CROPS, ModelType};
pub use published::{ContentCache, PublishedContent, PublishedElement};
pub use value::{Fallback, PropertyValue};

/// Type alias for a content result.
pub type ContentResult<T> = Result<T, ContentError>;

/// Type alias for a shareable content cache.
pub type DynContentCache = std::sync::Arc<dyn ContentCache>;
