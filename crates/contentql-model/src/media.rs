//! Media value types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::published::PublishedContent;

/// Focal point of an image, as fractions of width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocalPoint {
    pub left: f64,
    pub top: f64,
}

/// A named crop definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCrop {
    pub alias: String,
    pub width: i32,
    pub height: i32,
}

/// Value of an image cropper property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCropperValue {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub focal_point: Option<FocalPoint>,
    #[serde(default)]
    pub crops: Vec<ImageCrop>,
}

/// A picked media item together with crops local to the picking property.
#[derive(Clone)]
pub struct MediaWithCrops {
    pub media_item: Arc<dyn PublishedContent>,
    pub local_crops: ImageCropperValue,
}

impl fmt::Debug for MediaWithCrops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaWithCrops")
            .field("media_item", &self.media_item.id())
            .field("local_crops", &self.local_crops)
            .finish()
    }
}
