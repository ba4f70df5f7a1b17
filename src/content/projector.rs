//! Projection of raw repository documents into display models

use chrono::DateTime;
use chrono_tz::Tz;
use thiserror::Error;

use super::{
    reading_time, NavLink, Post, PostDetail, PostPagination, RawPostData, RenderedBlock,
};
use crate::config::SiteConfig;
use crate::helpers::{date_xml, format_date, parse_cms_date, Locale};
use crate::prismic::{ApiResponse, RawDocument};
use crate::richtext::TextField;

/// A document that cannot be shown. Not retried: the content itself is wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("Document {id} is missing required field `{field}`")]
    MissingField { id: String, field: &'static str },

    #[error("Document {id} has malformed data: {reason}")]
    Malformed { id: String, reason: String },

    #[error("Document {id} has an unparseable date {value:?}")]
    InvalidDate { id: String, value: String },
}

/// Turns raw documents into [`Post`]s and [`PostDetail`]s
#[derive(Debug, Clone)]
pub struct Projector {
    locale: Locale,
    tz: Tz,
    date_format: String,
    edited_format: String,
}

impl Projector {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            locale: config.locale(),
            tz: config.tz(),
            date_format: config.date_format.clone(),
            edited_format: config.edited_format.clone(),
        }
    }

    /// Project one document into a listing entry
    pub fn project(&self, doc: &RawDocument) -> Result<Post, ProjectionError> {
        let data = parse_data(doc)?;
        self.project_with(doc, &data)
    }

    /// Project a page of search results, keeping its cursor
    pub fn project_page(&self, response: ApiResponse) -> Result<PostPagination, ProjectionError> {
        let results = response
            .results
            .iter()
            .map(|doc| self.project(doc))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PostPagination {
            results,
            next_page: response.next_page,
        })
    }

    /// Project one document for the post page
    pub fn project_detail(&self, doc: &RawDocument) -> Result<PostDetail, ProjectionError> {
        let data = parse_data(doc)?;
        let post = self.project_with(doc, &data)?;

        let content = data
            .content
            .iter()
            .map(|block| RenderedBlock {
                heading: block
                    .heading
                    .as_ref()
                    .map(|h| h.as_html("h2"))
                    .unwrap_or_default(),
                body: block.body.as_html(),
            })
            .collect();

        let edited_at = match (
            doc.first_publication_date.as_deref(),
            doc.last_publication_date.as_deref(),
        ) {
            (Some(first), Some(last)) => {
                let first = self.parse_date(doc, first)?;
                let last = self.parse_date(doc, last)?;
                (last > first).then(|| self.format(&last, &self.edited_format))
            }
            _ => None,
        };

        let banner = data.banner.clone().unwrap_or_default();

        Ok(PostDetail {
            banner_url: banner.url.filter(|u| !u.is_empty()),
            banner_alt: banner.alt.unwrap_or_else(|| post.title.clone()),
            post,
            content,
            reading_time: reading_time::estimate(&data.content),
            edited_at,
        })
    }

    fn project_with(&self, doc: &RawDocument, data: &RawPostData) -> Result<Post, ProjectionError> {
        let slug = doc
            .uid
            .clone()
            .filter(|uid| !uid.is_empty())
            .ok_or_else(|| missing(doc, "uid"))?;

        let title = required_text(doc, data.title.as_ref(), "title")?;
        let author = required_text(doc, data.author.as_ref(), "author")?;
        let subtitle = data
            .subtitle
            .as_ref()
            .map(TextField::as_text)
            .unwrap_or_default();

        let first = doc
            .first_publication_date
            .as_deref()
            .ok_or_else(|| missing(doc, "first_publication_date"))?;
        let first = self.parse_date(doc, first)?;
        let first_publication_date = self.format(&first, &self.date_format);
        let published_at = date_xml(&first);

        let last_publication_date = doc
            .last_publication_date
            .as_deref()
            .map(|last| self.parse_date(doc, last).map(|d| self.format(&d, &self.date_format)))
            .transpose()?;

        Ok(Post {
            slug,
            title,
            subtitle,
            author,
            first_publication_date,
            published_at,
            last_publication_date,
        })
    }

    /// Dates without an offset are wall-clock time in the site timezone
    fn parse_date(
        &self,
        doc: &RawDocument,
        value: &str,
    ) -> Result<DateTime<Tz>, ProjectionError> {
        parse_cms_date(value, &self.tz).ok_or_else(|| ProjectionError::InvalidDate {
            id: doc.id.clone(),
            value: value.to_string(),
        })
    }

    fn format(&self, date: &DateTime<Tz>, pattern: &str) -> String {
        format_date(date, pattern, self.locale)
    }
}

/// Reduce a document to a navigation link; documents without a uid are skipped
pub fn nav_link(doc: &RawDocument) -> Option<NavLink> {
    let slug = doc.uid.clone().filter(|uid| !uid.is_empty())?;
    let title = RawPostData::from_value(&doc.data)
        .ok()
        .and_then(|data| data.title)
        .map(|t| t.as_text())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| slug.clone());
    Some(NavLink { slug, title })
}

fn parse_data(doc: &RawDocument) -> Result<RawPostData, ProjectionError> {
    RawPostData::from_value(&doc.data).map_err(|e| ProjectionError::Malformed {
        id: doc.id.clone(),
        reason: e.to_string(),
    })
}

fn required_text(
    doc: &RawDocument,
    field: Option<&TextField>,
    name: &'static str,
) -> Result<String, ProjectionError> {
    field
        .map(TextField::as_text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| missing(doc, name))
}

fn missing(doc: &RawDocument, field: &'static str) -> ProjectionError {
    ProjectionError::MissingField {
        id: doc.id.clone(),
        field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn projector() -> Projector {
        Projector::new(&SiteConfig::default())
    }

    fn document(data: serde_json::Value) -> RawDocument {
        RawDocument {
            id: "YH2zqBIAACMAq4xu".to_string(),
            uid: Some("hello".to_string()),
            doc_type: "post".to_string(),
            first_publication_date: Some("2021-04-19T00:00:00".to_string()),
            last_publication_date: None,
            data,
            ..Default::default()
        }
    }

    fn hello() -> RawDocument {
        document(json!({
            "title": [{ "text": "Hello" }],
            "subtitle": [{ "text": "A first post" }],
            "author": [{ "text": "Ana" }, { "text": "Souza" }]
        }))
    }

    #[test]
    fn test_project_listing() {
        let post = projector().project(&hello()).unwrap();
        assert_eq!(
            post,
            Post {
                slug: "hello".to_string(),
                title: "Hello".to_string(),
                subtitle: "A first post".to_string(),
                author: "Ana Souza".to_string(),
                first_publication_date: "19 Abr 2021".to_string(),
                published_at: "2021-04-19T00:00:00+00:00".to_string(),
                last_publication_date: None,
            }
        );
    }

    #[test]
    fn test_projection_is_idempotent() {
        let doc = hello();
        let projector = projector();
        assert_eq!(projector.project(&doc), projector.project(&doc));
        assert_eq!(projector.project_detail(&doc), projector.project_detail(&doc));
    }

    #[test]
    fn test_missing_fields_are_errors() {
        let no_title = document(json!({ "author": [{ "text": "Ana" }] }));
        assert_eq!(
            projector().project(&no_title),
            Err(ProjectionError::MissingField {
                id: "YH2zqBIAACMAq4xu".to_string(),
                field: "title",
            })
        );

        let empty_author = document(json!({ "title": "Hi", "author": [] }));
        assert!(matches!(
            projector().project(&empty_author),
            Err(ProjectionError::MissingField { field: "author", .. })
        ));

        let mut no_uid = hello();
        no_uid.uid = None;
        assert!(matches!(
            projector().project(&no_uid),
            Err(ProjectionError::MissingField { field: "uid", .. })
        ));

        let mut unpublished = hello();
        unpublished.first_publication_date = None;
        assert!(matches!(
            projector().project(&unpublished),
            Err(ProjectionError::MissingField {
                field: "first_publication_date",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_data_and_dates() {
        let bad = document(json!({ "title": 42 }));
        assert!(matches!(
            projector().project(&bad),
            Err(ProjectionError::Malformed { .. })
        ));

        let mut bad_date = hello();
        bad_date.first_publication_date = Some("yesterday".to_string());
        assert!(matches!(
            projector().project(&bad_date),
            Err(ProjectionError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_english_locale() {
        let config = SiteConfig {
            language: "en".to_string(),
            date_format: "MMM DD, YYYY".to_string(),
            ..Default::default()
        };
        let post = Projector::new(&config).project(&hello()).unwrap();
        assert_eq!(post.first_publication_date, "Apr 19, 2021");
    }

    #[test]
    fn test_site_timezone() {
        let config = SiteConfig {
            timezone: "America/Sao_Paulo".to_string(),
            ..Default::default()
        };
        let projector = Projector::new(&config);

        let post = projector.project(&hello()).unwrap();
        assert_eq!(post.first_publication_date, "19 Abr 2021");
        assert_eq!(post.published_at, "2021-04-19T00:00:00-03:00");

        let mut utc = hello();
        utc.first_publication_date = Some("2021-04-19T00:00:00+0000".to_string());
        let post = projector.project(&utc).unwrap();
        assert_eq!(post.first_publication_date, "18 Abr 2021");
        assert_eq!(post.published_at, "2021-04-18T21:00:00-03:00");
    }

    #[test]
    fn test_project_page_keeps_cursor() {
        let response = ApiResponse {
            next_page: Some("p2".to_string()),
            results: vec![hello(), hello()],
            ..Default::default()
        };
        let page = projector().project_page(response).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.next_page.as_deref(), Some("p2"));

        let broken = ApiResponse {
            results: vec![hello(), document(json!({}))],
            ..Default::default()
        };
        assert!(projector().project_page(broken).is_err());
    }

    #[test]
    fn test_project_detail() {
        let mut doc = document(json!({
            "title": [{ "type": "heading1", "text": "Como utilizar Hooks" }],
            "author": "Joseph Oliveira",
            "banner": { "url": "https://images.prismic.io/banner.png" },
            "content": [{
                "heading": "Proin et varius",
                "body": [
                    { "type": "paragraph", "text": "Nullam dolor sapien", "spans": [{ "start": 0, "end": 6, "type": "strong" }] }
                ]
            }]
        }));
        doc.first_publication_date = Some("2021-03-15T19:25:28+0000".to_string());
        doc.last_publication_date = Some("2021-03-25T19:25:28+0000".to_string());

        let detail = projector().project_detail(&doc).unwrap();
        assert_eq!(detail.post.title, "Como utilizar Hooks");
        assert_eq!(detail.post.subtitle, "");
        assert_eq!(detail.post.last_publication_date.as_deref(), Some("25 Mar 2021"));
        assert_eq!(
            detail.banner_url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
        assert_eq!(detail.banner_alt, "Como utilizar Hooks");
        assert_eq!(detail.content[0].heading.as_str(), "<h2>Proin et varius</h2>");
        assert_eq!(
            detail.content[0].body.as_str(),
            "<p><strong>Nullam</strong> dolor sapien</p>"
        );
        assert_eq!(detail.reading_time.words, 6);
        assert_eq!(detail.reading_time.minutes, 1);
        assert_eq!(detail.edited_at.as_deref(), Some("25 Mar 2021, às 19:25"));
    }

    #[test]
    fn test_not_edited_when_dates_match() {
        let mut doc = hello();
        doc.last_publication_date = doc.first_publication_date.clone();
        let detail = projector().project_detail(&doc).unwrap();
        assert!(detail.edited_at.is_none());
        assert!(detail.banner_url.is_none());
    }

    #[test]
    fn test_nav_link() {
        let link = nav_link(&hello()).unwrap();
        assert_eq!(link.slug, "hello");
        assert_eq!(link.title, "Hello");

        let mut untitled = document(json!({}));
        untitled.uid = Some("untitled".to_string());
        assert_eq!(nav_link(&untitled).unwrap().title, "untitled");

        let mut no_uid = hello();
        no_uid.uid = None;
        assert!(nav_link(&no_uid).is_none());
    }
}
