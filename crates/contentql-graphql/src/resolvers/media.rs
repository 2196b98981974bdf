//! Media resolvers.

use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use async_graphql::Value;
use contentql_model::{FocalPoint, ImageCrop, ImageCropperValue, MediaWithCrops};

use super::content::ContentNode;
use super::float_value;
use crate::schema::ContentTypeNames;

/// Resolvers for the media object types.
pub struct MediaResolver;

impl MediaResolver {
    /// `MediaWithCrops.mediaItem`
    pub fn media_item(
        names: Arc<ContentTypeNames>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let names = Arc::clone(&names);
            FieldFuture::new(async move {
                let media = ctx.parent_value.try_downcast_ref::<MediaWithCrops>()?;
                let node = ContentNode::Content(Arc::clone(&media.media_item));
                Ok(Some(node.into_field_value(&names)))
            })
        }
    }

    /// `MediaWithCrops.localCrops`
    pub fn local_crops(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let media = ctx.parent_value.try_downcast_ref::<MediaWithCrops>()?;
            Ok(Some(FieldValue::owned_any(media.local_crops.clone())))
        })
    }

    /// `ImageCropperValue.src`
    pub fn src(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let cropper = ctx.parent_value.try_downcast_ref::<ImageCropperValue>()?;
            Ok(cropper.src.clone().map(Value::String))
        })
    }

    /// `ImageCropperValue.focalPoint`
    pub fn focal_point(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let cropper = ctx.parent_value.try_downcast_ref::<ImageCropperValue>()?;
            Ok(cropper.focal_point.map(FieldValue::owned_any))
        })
    }

    /// `ImageCropperValue.crops`
    pub fn crops(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let cropper = ctx.parent_value.try_downcast_ref::<ImageCropperValue>()?;
            Ok(Some(FieldValue::list(
                cropper.crops.iter().cloned().map(FieldValue::owned_any),
            )))
        })
    }

    /// `ImageCropperFocalPoint.left` and `.top`
    pub fn focal_coordinate(
        top: bool,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            FieldFuture::new(async move {
                let point = ctx.parent_value.try_downcast_ref::<FocalPoint>()?;
                let value = if top { point.top } else { point.left };
                Ok(Some(float_value(value)))
            })
        }
    }

    /// `ImageCropperCrop` fields.
    pub fn crop_field(
        field: &'static str,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            FieldFuture::new(async move {
                let crop = ctx.parent_value.try_downcast_ref::<ImageCrop>()?;
                let value = match field {
                    "alias" => Value::String(crop.alias.clone()),
                    "width" => Value::from(crop.width),
                    "height" => Value::from(crop.height),
                    other => {
                        return Err(async_graphql::Error::new(format!(
                            "Unknown crop field: {other}"
                        )));
                    }
                };
                Ok(Some(value))
            })
        }
    }
}
