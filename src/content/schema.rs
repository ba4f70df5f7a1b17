//! Typed view over the `data` of a post document

use serde::{Deserialize, Serialize};

use crate::richtext::{RichText, TextField};

/// Custom type of blog posts in the repository
pub const POST_TYPE: &str = "post";

/// Fields fetched for post listings
pub const LISTING_FIELDS: [&str; 3] = ["post.title", "post.subtitle", "post.author"];

/// Image field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageField {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// One entry of a post's `content` group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawContentBlock {
    pub heading: Option<TextField>,
    pub body: RichText,
}

/// Post document data. Every field is optional on the wire; the projector
/// decides which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPostData {
    pub title: Option<TextField>,
    pub subtitle: Option<TextField>,
    pub author: Option<TextField>,
    pub banner: Option<ImageField>,
    pub content: Vec<RawContentBlock>,
}

impl RawPostData {
    pub fn from_value(data: &serde_json::Value) -> Result<Self, serde_json::Error> {
        if data.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_post_data() {
        let data = RawPostData::from_value(&json!({
            "title": [{ "type": "heading1", "text": "Como utilizar Hooks", "spans": [] }],
            "subtitle": "Pensando em sincronização em vez de ciclos de vida",
            "author": [{ "type": "paragraph", "text": "Joseph Oliveira", "spans": [] }],
            "banner": { "url": "https://images.prismic.io/banner.png", "alt": null, "dimensions": { "width": 1440, "height": 400 } },
            "content": [{
                "heading": "Proin et varius",
                "body": [{ "type": "paragraph", "text": "Nullam dolor sapien", "spans": [] }]
            }]
        }))
        .unwrap();

        assert_eq!(data.title.unwrap().as_text(), "Como utilizar Hooks");
        assert_eq!(
            data.subtitle.unwrap().as_text(),
            "Pensando em sincronização em vez de ciclos de vida"
        );
        assert_eq!(
            data.banner.unwrap().url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
        assert_eq!(data.content.len(), 1);
        assert_eq!(data.content[0].body.as_text(), "Nullam dolor sapien");
    }

    #[test]
    fn test_null_data_is_empty() {
        let data = RawPostData::from_value(&serde_json::Value::Null).unwrap();
        assert!(data.title.is_none());
        assert!(data.content.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_error() {
        assert!(RawPostData::from_value(&json!({ "content": "not a list" })).is_err());
    }
}
