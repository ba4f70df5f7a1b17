//! Content repository adapter
//!
//! [`ContentSource`] is the seam between the blog and the headless CMS. The
//! production implementation is [`PrismicClient`], which talks to the Prismic
//! REST API; [`MemorySource`] serves documents from memory and backs the tests
//! and offline runs.

mod client;
mod document;
mod memory;
mod predicate;

use async_trait::async_trait;
use thiserror::Error;

pub use client::PrismicClient;
pub use document::{ApiResponse, ApiRoot, RawDocument, Ref};
pub use memory::MemorySource;
pub use predicate::{Ordering, Predicate};

/// Errors raised while talking to the content repository
#[derive(Error, Debug)]
pub enum PrismicError {
    #[error("No content endpoint configured (set api_endpoint or PRISMIC_API_ENDPOINT)")]
    MissingEndpoint,

    #[error("Invalid content endpoint {0:?}")]
    InvalidEndpoint(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("Repository has no master ref")]
    NoMasterRef,

    #[error("Cursor {0:?} does not belong to this repository")]
    ForeignCursor(String),

    #[error("Invalid preview token: {0}")]
    InvalidPreviewToken(String),
}

/// Options accepted by [`ContentSource::query`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub page_size: Option<usize>,
    pub page: Option<usize>,
    /// Return results after the document with this id
    pub after: Option<String>,
    /// Sort expression, e.g. `[document.first_publication_date desc]`
    pub orderings: Option<String>,
    /// Restrict returned data to these fields (`post.title`, ...)
    pub fetch: Vec<String>,
    /// Content version; the master ref is used when absent
    pub content_ref: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.after = Some(id.into());
        self
    }

    pub fn orderings(mut self, orderings: impl Into<String>) -> Self {
        self.orderings = Some(orderings.into());
        self
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn content_ref(mut self, content_ref: Option<String>) -> Self {
        self.content_ref = content_ref;
        self
    }
}

/// Result of opening a preview session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewSession {
    /// Document the editor asked to preview, if the session names one
    pub main_document: Option<String>,
}

/// Query/fetch interface over repository documents
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a predicate query
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiResponse, PrismicError>;

    /// Fetch the page a `next_page` cursor points at
    async fn fetch_page(&self, cursor: &str) -> Result<ApiResponse, PrismicError>;

    /// Validate a preview token and open its session
    async fn preview_session(&self, token: &str) -> Result<PreviewSession, PrismicError>;

    /// Single document of `doc_type` by its uid
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        options: &QueryOptions,
    ) -> Result<Option<RawDocument>, PrismicError> {
        let predicates = [
            Predicate::at("document.type", doc_type),
            Predicate::at(format!("my.{}.uid", doc_type), uid),
        ];
        let options = options.clone().page_size(1);
        let response = self.query(&predicates, &options).await?;
        Ok(response.results.into_iter().next())
    }

    /// Single document by its id
    async fn get_by_id(
        &self,
        id: &str,
        options: &QueryOptions,
    ) -> Result<Option<RawDocument>, PrismicError> {
        let predicates = [Predicate::at("document.id", id)];
        let options = options.clone().page_size(1);
        let response = self.query(&predicates, &options).await?;
        Ok(response.results.into_iter().next())
    }
}
