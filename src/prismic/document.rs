//! Wire types of the content API

use serde::{Deserialize, Serialize};

/// A document as returned by the search endpoint. `data` is left loosely
/// typed here and validated by the projector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResponse {
    pub page: usize,
    pub results_per_page: usize,
    pub results_size: usize,
    pub total_results_size: usize,
    pub total_pages: usize,
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    pub results: Vec<RawDocument>,
}

impl Default for ApiResponse {
    fn default() -> Self {
        Self {
            page: 1,
            results_per_page: 0,
            results_size: 0,
            total_results_size: 0,
            total_pages: 0,
            next_page: None,
            prev_page: None,
            results: Vec::new(),
        }
    }
}

/// API root: the refs (content versions) the repository exposes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiRoot {
    pub refs: Vec<Ref>,
}

impl ApiRoot {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master)
            .map(|r| r.reference.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ref {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_search_response() {
        let response: ApiResponse = serde_json::from_value(json!({
            "page": 1,
            "results_per_page": 1,
            "results_size": 1,
            "total_results_size": 2,
            "total_pages": 2,
            "next_page": "https://blog.cdn.prismic.io/api/v2/documents/search?page=2",
            "prev_page": null,
            "results": [{
                "id": "YH2zqBIAACMAq4xu",
                "uid": "como-utilizar-hooks",
                "type": "post",
                "href": "https://blog.cdn.prismic.io/api/v2/documents/search?...",
                "tags": [],
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "last_publication_date": "2021-03-25T19:25:28+0000",
                "slugs": ["como-utilizar-hooks"],
                "linked_documents": [],
                "lang": "pt-br",
                "alternate_languages": [],
                "data": { "title": "Como utilizar Hooks" }
            }]
        }))
        .unwrap();

        assert_eq!(response.total_pages, 2);
        assert!(response.next_page.is_some());
        let doc = &response.results[0];
        assert_eq!(doc.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(doc.doc_type, "post");
        assert_eq!(doc.data["title"], "Como utilizar Hooks");
    }

    #[test]
    fn test_master_ref() {
        let root: ApiRoot = serde_json::from_value(json!({
            "refs": [
                { "id": "release", "ref": "YHabc~release", "label": "Release", "isMasterRef": false },
                { "id": "master", "ref": "YHxyz", "label": "Master", "isMasterRef": true }
            ],
            "types": { "post": "Post" }
        }))
        .unwrap();
        assert_eq!(root.master_ref(), Some("YHxyz"));
        assert_eq!(ApiRoot::default().master_ref(), None);
    }
}
