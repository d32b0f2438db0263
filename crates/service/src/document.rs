//! On-disk data model: one `Document` holding every person and review.
//!
//! Field names follow the JSON layout of the data file (camelCase for
//! persons), so files written by earlier deployments load unchanged.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Root of the data file.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub greeting: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub review: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gallery: Vec<GalleryItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A review in either stored shape.
///
/// Id-addressed reviews carry `id` and `timestamp`; position-addressed ones
/// are bare `{username, message}` pairs and omit both keys when written.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ReviewId>,
    /// `None` when the stored value is missing or not a JSON string.
    #[serde(default, deserialize_with = "string_or_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Stored review id: generated ids are numbers, older files may hold strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReviewId {
    Number(i64),
    Text(String),
}

impl ReviewId {
    /// Loose comparison against a path segment: `17` matches `"17"`.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            ReviewId::Number(n) => key.trim().parse::<i64>().is_ok_and(|k| k == *n),
            ReviewId::Text(s) => s == key,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            ReviewId::Number(n) => Some(*n),
            ReviewId::Text(_) => None,
        }
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewId::Number(n) => write!(f, "{n}"),
            ReviewId::Text(s) => f.write_str(s),
        }
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Older data files store `null` where a value was never supplied.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_document_loads_with_defaults() {
        let doc: Document = serde_json::from_value(json!({ "reviews": [] })).unwrap();
        assert!(doc.persons.is_empty());
        assert!(doc.reviews.is_empty());
    }

    #[test]
    fn person_uses_camel_case_keys() {
        let doc: Document = serde_json::from_value(json!({
            "persons": [{
                "id": "p1", "name": "Ann", "greeting": "hi", "theme": "dark",
                "customMessage": "welcome", "review": "",
                "gallery": [{ "imageUrl": "https://img/1.png", "text": "beach" }],
                "videos": [{ "videoUrl": "https://vid/1.mp4", "name": "intro" }],
                "voice": null
            }]
        }))
        .unwrap();
        let p = &doc.persons[0];
        assert_eq!(p.custom_message, "welcome");
        assert_eq!(p.gallery[0].image_url, "https://img/1.png");
        assert_eq!(p.videos[0].video_url, "https://vid/1.mp4");
        assert_eq!(p.voice, None);

        let out = serde_json::to_value(p).unwrap();
        assert_eq!(out["customMessage"], "welcome");
        assert!(out["voice"].is_null());
    }

    #[test]
    fn both_review_shapes_load() {
        let doc: Document = serde_json::from_value(json!({
            "reviews": [
                { "id": 1700000000000i64, "username": "bob", "message": "great", "timestamp": "2024-01-02T03:04:05.678Z" },
                { "id": "ann-1700000000001", "username": "ann", "message": "nice", "timestamp": "2024-01-02T03:04:05Z" },
                { "username": "cid", "message": "ok" },
                { "username": 42, "message": "odd" }
            ]
        }))
        .unwrap();
        assert_eq!(doc.reviews[0].id, Some(ReviewId::Number(1_700_000_000_000)));
        assert_eq!(doc.reviews[1].id, Some(ReviewId::Text("ann-1700000000001".into())));
        assert!(doc.reviews[2].id.is_none() && doc.reviews[2].timestamp.is_none());
        assert_eq!(doc.reviews[3].username, None);
    }

    #[test]
    fn null_fields_load_as_empty() {
        let doc: Document = serde_json::from_value(json!({
            "persons": [{
                "id": "p1", "name": "Ann", "greeting": null, "theme": null,
                "customMessage": null, "review": null,
                "gallery": [{ "imageUrl": "u", "text": null }],
                "videos": null,
                "voice": null
            }],
            "reviews": [{ "username": "bob", "message": null }]
        }))
        .unwrap();
        let p = &doc.persons[0];
        assert_eq!(p.greeting, "");
        assert_eq!(p.custom_message, "");
        assert_eq!(p.gallery, vec![GalleryItem { image_url: "u".into(), text: String::new() }]);
        assert!(p.videos.is_empty());
        assert_eq!(doc.reviews[0].message, "");

        // a wrong type is still rejected
        assert!(serde_json::from_value::<GalleryItem>(json!({ "imageUrl": 5 })).is_err());
    }

    #[test]
    fn positional_review_serializes_without_id_or_timestamp() {
        let r = Review { id: None, username: Some("cid".into()), message: "ok".into(), timestamp: None };
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({ "username": "cid", "message": "ok" }));
    }

    #[test]
    fn review_id_matches_loosely() {
        assert!(ReviewId::Number(17).matches("17"));
        assert!(!ReviewId::Number(17).matches("017x"));
        assert!(ReviewId::Text("bob-1".into()).matches("bob-1"));
        assert!(!ReviewId::Text("bob-1".into()).matches("bob-2"));
        assert_eq!(ReviewId::Number(5).to_string(), "5");
    }
}
