use crate::error::HotelError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A freshly created hotel, before it becomes a [HotelDocument] on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,

    pub slug: String,

    /// Web relative paths of stored images
    pub images: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub guest_count: i64,

    pub bedroom_count: i64,

    pub bathroom_count: i64,

    pub amenities: Vec<String>,

    /// Opaque, stored as submitted
    pub host_info: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    /// Opaque room objects. Their shape is never checked.
    pub rooms: Vec<Value>,
}

/// The stored form of a hotel. Updates can set any top level key to any JSON
/// value, so past creation a hotel is only ever handled as a JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct HotelDocument(pub Map<String, Value>);

impl HotelDocument {
    pub fn id(&self) -> Option<String> {
        match self.0.get("id").filter(|id| is_truthy(id))? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Any set title other than `""`, `0`, `false` or `null`. Updates may store
    /// non-string titles and those are kept as they are.
    pub fn title(&self) -> Option<&Value> {
        self.0.get("title").filter(|title| is_truthy(title))
    }

    /// Overwrite every top level key present in `fields`, keep all others.
    /// Nested objects and arrays are replaced whole, never merged.
    pub fn merge(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.0.insert(key, value);
        }
    }

    /// Append image paths, keeping the ones already recorded. Returns the full list.
    pub fn append_images(&mut self, paths: Vec<String>) -> Result<&Vec<Value>, HotelError> {
        let images = self
            .0
            .entry("images")
            .or_insert_with(|| Value::Array(vec![]));

        if images.is_null() {
            *images = Value::Array(vec![]);
        }

        match images {
            Value::Array(images) => {
                images.extend(paths.into_iter().map(Value::String));
                Ok(images)
            }
            other => Err(HotelError::InvalidDocument(format!(
                "images is not a list: {other}"
            ))),
        }
    }
}

impl TryFrom<Hotel> for HotelDocument {
    type Error = HotelError;

    fn try_from(hotel: Hotel) -> Result<Self, Self::Error> {
        match serde_json::to_value(hotel)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(HotelError::InvalidDocument(format!(
                "hotel did not serialize to an object: {other}"
            ))),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Maps hotel ids to titles
pub type HotelSummaries = BTreeMap<String, Value>;
