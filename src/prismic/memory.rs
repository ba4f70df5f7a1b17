//! In-memory content source
//!
//! Evaluates the same predicates, orderings, `after` and paging options as
//! the search endpoint over a fixed document set. Cursors have the form
//! `memory://search/<query>?page=<n>`, where `<query>` indexes the distinct
//! queries seen so far.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use super::{
    ApiResponse, ContentSource, Ordering, PreviewSession, PrismicError, Predicate, QueryOptions,
    RawDocument,
};

const CURSOR_PREFIX: &str = "memory://search/";
const DEFAULT_PAGE_SIZE: usize = 20;

struct Draft {
    main_document: Option<String>,
    documents: Vec<RawDocument>,
}

/// Content source over documents held in memory
#[derive(Default)]
pub struct MemorySource {
    documents: Vec<RawDocument>,
    /// Preview sessions keyed by token; the token doubles as the content ref
    drafts: HashMap<String, Draft>,
    queries: Mutex<Vec<(Vec<Predicate>, QueryOptions)>>,
}

impl MemorySource {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    /// Load documents from a JSON file holding an array of documents
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let documents: Vec<RawDocument> = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded {} documents from {:?}",
            documents.len(),
            path.as_ref()
        );
        Ok(Self::new(documents))
    }

    /// Register a preview session. Queries made with `token` as their content
    /// ref see `documents` in place of the published versions with the same id.
    pub fn with_draft(
        mut self,
        token: impl Into<String>,
        main_document: Option<&str>,
        documents: Vec<RawDocument>,
    ) -> Self {
        self.drafts.insert(
            token.into(),
            Draft {
                main_document: main_document.map(str::to_string),
                documents,
            },
        );
        self
    }

    fn documents_at(&self, content_ref: Option<&str>) -> Vec<RawDocument> {
        let draft = content_ref.and_then(|r| self.drafts.get(r));
        let Some(draft) = draft else {
            return self.documents.clone();
        };

        let mut documents: Vec<RawDocument> = self
            .documents
            .iter()
            .map(|doc| {
                draft
                    .documents
                    .iter()
                    .find(|d| d.id == doc.id)
                    .unwrap_or(doc)
                    .clone()
            })
            .collect();
        for doc in &draft.documents {
            if !documents.iter().any(|d| d.id == doc.id) {
                documents.push(doc.clone());
            }
        }
        documents
    }

    fn run(&self, index: usize, predicates: &[Predicate], options: &QueryOptions) -> ApiResponse {
        let mut matching: Vec<RawDocument> = self
            .documents_at(options.content_ref.as_deref())
            .into_iter()
            .filter(|doc| predicates.iter().all(|p| matches(doc, p)))
            .collect();

        if let Some(orderings) = &options.orderings {
            let orderings = Ordering::parse_list(orderings);
            matching.sort_by(|a, b| {
                orderings
                    .iter()
                    .map(|o| {
                        let ord = field(a, &o.field).cmp(&field(b, &o.field));
                        if o.descending {
                            ord.reverse()
                        } else {
                            ord
                        }
                    })
                    .find(|ord| ord.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        if let Some(after) = &options.after {
            if let Some(pos) = matching.iter().position(|d| &d.id == after) {
                matching.drain(..=pos);
            }
        }

        let page_size = options.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let page = options.page.unwrap_or(1).max(1);
        let total = matching.len();
        let total_pages = total.div_ceil(page_size);

        let results: Vec<RawDocument> = matching
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        let cursor = |n: usize| format!("{}{}?page={}", CURSOR_PREFIX, index, n);

        ApiResponse {
            page,
            results_per_page: page_size,
            results_size: results.len(),
            total_results_size: total,
            total_pages,
            next_page: (page < total_pages).then(|| cursor(page + 1)),
            prev_page: (page > 1).then(|| cursor(page - 1)),
            results,
        }
    }
}

/// Value of a predicate/ordering path on a document
fn field(doc: &RawDocument, path: &str) -> Option<String> {
    match path {
        "document.id" => Some(doc.id.clone()),
        "document.type" => Some(doc.doc_type.clone()),
        "document.first_publication_date" => doc.first_publication_date.clone(),
        "document.last_publication_date" => doc.last_publication_date.clone(),
        _ => {
            let rest = path.strip_prefix("my.")?;
            let (doc_type, name) = rest.split_once('.')?;
            if doc_type != doc.doc_type {
                return None;
            }
            if name == "uid" {
                return doc.uid.clone();
            }
            match doc.data.get(name)? {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            }
        }
    }
}

fn matches(doc: &RawDocument, predicate: &Predicate) -> bool {
    field(doc, &predicate.path).as_deref() == Some(predicate.value.as_str())
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiResponse, PrismicError> {
        let index = {
            let mut queries = self.queries.lock().unwrap_or_else(|e| e.into_inner());
            let mut stored = options.clone();
            stored.page = None;
            match queries
                .iter()
                .position(|(p, o)| p.as_slice() == predicates && *o == stored)
            {
                Some(index) => index,
                None => {
                    queries.push((predicates.to_vec(), stored));
                    queries.len() - 1
                }
            }
        };
        Ok(self.run(index, predicates, options))
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiResponse, PrismicError> {
        let foreign = || PrismicError::ForeignCursor(cursor.to_string());
        let (index, page) = cursor
            .strip_prefix(CURSOR_PREFIX)
            .and_then(|rest| rest.split_once("?page="))
            .ok_or_else(foreign)?;
        let index: usize = index.parse().map_err(|_| foreign())?;
        let page: usize = page.parse().map_err(|_| foreign())?;

        let (predicates, mut options) = {
            let queries = self.queries.lock().unwrap_or_else(|e| e.into_inner());
            queries.get(index).cloned().ok_or_else(foreign)?
        };
        options.page = Some(page);
        Ok(self.run(index, &predicates, &options))
    }

    async fn preview_session(&self, token: &str) -> Result<PreviewSession, PrismicError> {
        self.drafts
            .get(token)
            .map(|draft| PreviewSession {
                main_document: draft.main_document.clone(),
            })
            .ok_or_else(|| PrismicError::InvalidPreviewToken("unknown session".to_string()))
    }
}
