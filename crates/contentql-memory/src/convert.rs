//! Conversion of raw JSON property data to typed values.

use std::collections::HashMap;
use std::sync::Arc;

use contentql_model::{
    BaseType, Capability, ContentError, IMAGE_CROPPER_VALUE, ImageCropperValue, MEDIA_WITH_CROPS,
    MediaWithCrops, ModelType, PropertyValue, PublishedContent, PublishedElement,
};
use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::node::{MemoryContent, MemoryElement};
use crate::store::StoreInner;

/// Converts `raw` to a value of the declared type.
///
/// JSON `null` converts to `PropertyValue::Null` for every type. References to
/// content that is not in the store also convert to `Null`.
pub(crate) fn convert(
    alias: &str,
    model_type: &ModelType,
    raw: &Value,
    store: &Arc<StoreInner>,
) -> Result<PropertyValue, ContentError> {
    if raw.is_null() {
        return Ok(PropertyValue::Null);
    }

    match model_type {
        ModelType::Optional(inner) => convert(alias, inner, raw, store),
        ModelType::List(inner) => match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| convert(alias, inner, item, store))
                .collect::<Result<Vec<_>, _>>()
                .map(PropertyValue::List),
            single => Ok(PropertyValue::List(vec![convert(alias, inner, single, store)?])),
        },
        ModelType::Base(base) => convert_base(alias, base, raw, store),
    }
}

fn convert_base(
    alias: &str,
    base: &BaseType,
    raw: &Value,
    store: &Arc<StoreInner>,
) -> Result<PropertyValue, ContentError> {
    let mismatch = |expected: &str| {
        ContentError::property_conversion(alias, format!("expected {expected}, got {raw}"))
    };

    let value = match base {
        BaseType::String => match raw {
            Value::String(s) => PropertyValue::String(s.clone()),
            Value::Number(n) => PropertyValue::String(n.to_string()),
            Value::Bool(b) => PropertyValue::String(b.to_string()),
            _ => return Err(mismatch("a string")),
        },
        BaseType::Integer | BaseType::Long => match raw {
            Value::Number(n) => n
                .as_i64()
                .map(PropertyValue::Integer)
                .ok_or_else(|| mismatch("an integer"))?,
            Value::String(s) => s
                .trim()
                .parse()
                .map(PropertyValue::Integer)
                .map_err(|_| mismatch("an integer"))?,
            _ => return Err(mismatch("an integer")),
        },
        BaseType::Decimal | BaseType::Double => match raw {
            Value::Number(n) => n
                .as_f64()
                .map(PropertyValue::Float)
                .ok_or_else(|| mismatch("a number"))?,
            Value::String(s) => s
                .trim()
                .parse()
                .map(PropertyValue::Float)
                .map_err(|_| mismatch("a number"))?,
            _ => return Err(mismatch("a number")),
        },
        BaseType::Boolean => match raw {
            Value::Bool(b) => PropertyValue::Boolean(*b),
            Value::Number(n) => PropertyValue::Boolean(n.as_i64() == Some(1)),
            Value::String(s) => match s.trim() {
                "1" => PropertyValue::Boolean(true),
                "0" | "" => PropertyValue::Boolean(false),
                other if other.eq_ignore_ascii_case("true") => PropertyValue::Boolean(true),
                other if other.eq_ignore_ascii_case("false") => PropertyValue::Boolean(false),
                _ => return Err(mismatch("a boolean")),
            },
            _ => return Err(mismatch("a boolean")),
        },
        BaseType::DateTime => match raw {
            Value::String(s) => OffsetDateTime::parse(s, &Rfc3339)
                .map(PropertyValue::DateTime)
                .map_err(|e| ContentError::property_conversion(alias, e.to_string()))?,
            _ => return Err(mismatch("an RFC 3339 timestamp")),
        },
        BaseType::Guid => match raw {
            Value::String(s) => Uuid::parse_str(s)
                .map(PropertyValue::Guid)
                .map_err(|e| ContentError::property_conversion(alias, e.to_string()))?,
            _ => return Err(mismatch("a GUID")),
        },
        BaseType::Json => PropertyValue::Json(raw.clone()),
        BaseType::Object {
            capability: Capability::Content,
            ..
        } => match lookup_content(raw, store) {
            Some(content) => PropertyValue::Content(content),
            None => {
                tracing::debug!(alias, reference = %raw, "Picked content not found");
                PropertyValue::Null
            }
        },
        BaseType::Object {
            capability: Capability::Element,
            ..
        } => PropertyValue::Element(element(alias, raw, store)?),
        BaseType::Object { name, .. } if name == MEDIA_WITH_CROPS => {
            match media_with_crops(alias, raw, store)? {
                Some(media) => PropertyValue::MediaWithCrops(media),
                None => PropertyValue::Null,
            }
        }
        BaseType::Object { name, .. } if name == IMAGE_CROPPER_VALUE => {
            PropertyValue::ImageCropper(deserialize(alias, raw)?)
        }
        BaseType::Object { .. } => PropertyValue::Json(raw.clone()),
    };
    Ok(value)
}

/// Resolves a content reference given as an integer id or a key.
fn lookup_content(raw: &Value, store: &StoreInner) -> Option<Arc<dyn PublishedContent>> {
    let node: Arc<MemoryContent> = match raw {
        Value::Number(n) => store.node(i32::try_from(n.as_i64()?).ok()?),
        Value::String(s) => match Uuid::parse_str(s) {
            Ok(key) => store.node_by_key(&key),
            Err(_) => store.node(s.trim().parse().ok()?),
        },
        _ => None,
    }?;
    Some(node as Arc<dyn PublishedContent>)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementData {
    content_type: String,
    #[serde(default = "Uuid::new_v4")]
    key: Uuid,
    #[serde(default)]
    values: HashMap<String, Value>,
}

fn element(
    alias: &str,
    raw: &Value,
    store: &Arc<StoreInner>,
) -> Result<Arc<dyn PublishedElement>, ContentError> {
    let data: ElementData = deserialize(alias, raw)?;
    let content_type = store
        .content_type(&data.content_type)
        .ok_or_else(|| ContentError::unknown_content_type(&data.content_type))?;
    Ok(Arc::new(MemoryElement::new(
        data.key,
        content_type,
        data.values,
        Arc::downgrade(store),
    )))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaData {
    media_id: Value,
    #[serde(default)]
    crops: ImageCropperValue,
}

fn media_with_crops(
    alias: &str,
    raw: &Value,
    store: &StoreInner,
) -> Result<Option<MediaWithCrops>, ContentError> {
    let data = match raw {
        Value::Object(_) => deserialize::<MediaData>(alias, raw)?,
        reference => MediaData {
            media_id: reference.clone(),
            crops: ImageCropperValue::default(),
        },
    };
    Ok(
        lookup_content(&data.media_id, store).map(|media_item| MediaWithCrops {
            media_item,
            local_crops: data.crops,
        }),
    )
}

fn deserialize<T: for<'de> Deserialize<'de>>(alias: &str, raw: &Value) -> Result<T, ContentError> {
    T::deserialize(raw).map_err(|e| ContentError::property_conversion(alias, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryContentStore;
    use serde_json::json;

    fn convert_with(model_type: &str, raw: Value) -> Result<PropertyValue, ContentError> {
        let store = MemoryContentStore::new("en-US");
        let inner = store.inner_for_tests();
        convert("prop", &model_type.parse().unwrap(), &raw, &inner)
    }

    #[test]
    fn test_scalar_conversion() {
        assert!(matches!(
            convert_with("Integer", json!("42")).unwrap(),
            PropertyValue::Integer(42)
        ));
        assert!(matches!(
            convert_with("Double", json!(1.5)).unwrap(),
            PropertyValue::Float(f) if f == 1.5
        ));
        assert!(matches!(
            convert_with("Boolean", json!("1")).unwrap(),
            PropertyValue::Boolean(true)
        ));
        assert!(matches!(
            convert_with("DateTime", json!("2024-03-01T10:00:00Z")).unwrap(),
            PropertyValue::DateTime(_)
        ));
    }

    #[test]
    fn test_null_converts_to_null() {
        assert!(convert_with("Integer", Value::Null).unwrap().is_null());
    }

    #[test]
    fn test_list_wraps_single_values() {
        match convert_with("[String]", json!("solo")).unwrap() {
            PropertyValue::List(items) => assert_eq!(items[0].as_str(), Some("solo")),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_mismatch_is_reported() {
        let err = convert_with("Integer", json!({"a": 1})).unwrap_err();
        assert!(matches!(err, ContentError::PropertyConversion { .. }));
    }

    #[test]
    fn test_missing_content_reference_is_null() {
        assert!(convert_with("Page@content", json!(404)).unwrap().is_null());
    }

    #[test]
    fn test_image_cropper_value() {
        let value = convert_with(
            "ImageCropperValue",
            json!({"src": "/media/a.jpg", "crops": [{"alias": "thumb", "width": 10, "height": 10}]}),
        )
        .unwrap();
        match value {
            PropertyValue::ImageCropper(cropper) => assert_eq!(cropper.crops.len(), 1),
            other => panic!("expected cropper, got {other:?}"),
        }
    }
}
