//! HTTP client for the Prismic REST API (v2)

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::{
    ApiResponse, ApiRoot, ContentSource, PreviewSession, PrismicError, Predicate, QueryOptions,
};
use crate::config::SiteConfig;

/// Client for one repository endpoint, e.g. `https://my-blog.cdn.prismic.io/api/v2`
#[derive(Clone)]
pub struct PrismicClient {
    endpoint: Url,
    access_token: Option<String>,
    http: reqwest::Client,
    master: Arc<RwLock<Option<(String, Instant)>>>,
    master_ttl: Duration,
}

/// How long a resolved master ref is reused before asking the root again
pub const MASTER_REF_TTL: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct PreviewResponse {
    #[serde(rename = "mainDocument", default)]
    main_document: Option<String>,
}

impl PrismicClient {
    /// Create a client for `endpoint`
    pub fn new(
        endpoint: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PrismicError> {
        let trimmed = endpoint.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(PrismicError::MissingEndpoint);
        }

        let endpoint =
            Url::parse(trimmed).map_err(|_| PrismicError::InvalidEndpoint(trimmed.to_string()))?;
        if endpoint.cannot_be_a_base() {
            return Err(PrismicError::InvalidEndpoint(trimmed.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("prismic-blog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            endpoint,
            access_token: access_token.filter(|t| !t.is_empty()),
            http,
            master: Arc::new(RwLock::new(None)),
            master_ttl: MASTER_REF_TTL,
        })
    }

    /// Reuse a resolved master ref for `ttl`; zero resolves it on every query
    pub fn master_ref_ttl(mut self, ttl: Duration) -> Self {
        self.master_ttl = ttl;
        self
    }

    /// Create a client from site configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self, PrismicError> {
        Self::new(
            &config.api_endpoint,
            config.access_token.clone(),
            Duration::from_secs(config.request_timeout),
        )
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Resolve the master (published) ref
    pub async fn master_ref(&self) -> Result<String, PrismicError> {
        if let Some((master, resolved_at)) = self.master.read().await.as_ref() {
            if resolved_at.elapsed() < self.master_ttl {
                return Ok(master.clone());
            }
        }

        let root: ApiRoot = self.get_json(self.endpoint.clone()).await?;
        let master = root
            .master_ref()
            .map(str::to_string)
            .ok_or(PrismicError::NoMasterRef)?;
        *self.master.write().await = Some((master.clone(), Instant::now()));
        Ok(master)
    }

    fn search_url(
        &self,
        content_ref: &str,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<Url, PrismicError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| PrismicError::InvalidEndpoint(self.endpoint.to_string()))?
            .push("documents")
            .push("search");

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", content_ref);
            if !predicates.is_empty() {
                pairs.append_pair("q", &Predicate::to_query(predicates));
            }
            if let Some(page_size) = options.page_size {
                pairs.append_pair("pageSize", &page_size.to_string());
            }
            if let Some(page) = options.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(after) = &options.after {
                pairs.append_pair("after", after);
            }
            if let Some(orderings) = &options.orderings {
                pairs.append_pair("orderings", orderings);
            }
            if !options.fetch.is_empty() {
                pairs.append_pair("fetch", &options.fetch.join(","));
            }
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, PrismicError> {
        let url = self.with_token(url);
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PrismicError::Status {
                status: status.as_u16(),
                url: redact(&url),
            });
        }
        Ok(response.json::<T>().await?)
    }

    fn with_token(&self, mut url: Url) -> Url {
        if let Some(token) = &self.access_token {
            if !url.query_pairs().any(|(k, _)| k == "access_token") {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }
        url
    }

    fn same_origin(&self, url: &Url) -> bool {
        url.scheme() == self.endpoint.scheme()
            && url.host_str() == self.endpoint.host_str()
            && url.port_or_known_default() == self.endpoint.port_or_known_default()
    }
}

/// Repository name: first label of the host (`my-blog` in `my-blog.cdn.prismic.io`)
fn repository(url: &Url) -> Option<&str> {
    url.host_str()?.split('.').next()
}

/// URL without its query string, safe to log
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiResponse, PrismicError> {
        let content_ref = match &options.content_ref {
            Some(content_ref) => content_ref.clone(),
            None => self.master_ref().await?,
        };
        let url = self.search_url(&content_ref, predicates, options)?;
        tracing::debug!("Querying {}", redact(&url));
        self.get_json(url).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiResponse, PrismicError> {
        let url = Url::parse(cursor).map_err(|_| PrismicError::ForeignCursor(cursor.to_string()))?;
        if !self.same_origin(&url) {
            return Err(PrismicError::ForeignCursor(redact(&url)));
        }
        tracing::debug!("Fetching page {}", redact(&url));
        self.get_json(url).await
    }

    async fn preview_session(&self, token: &str) -> Result<PreviewSession, PrismicError> {
        let url = Url::parse(token)
            .map_err(|_| PrismicError::InvalidPreviewToken("not a URL".to_string()))?;
        if repository(&url) != repository(&self.endpoint) {
            return Err(PrismicError::InvalidPreviewToken(
                "token belongs to another repository".to_string(),
            ));
        }

        let response: PreviewResponse = self.get_json(url).await.map_err(|e| match e {
            PrismicError::Status { status, .. } => {
                PrismicError::InvalidPreviewToken(format!("session rejected ({})", status))
            }
            other => other,
        })?;

        Ok(PreviewSession {
            main_document: response.main_document,
        })
    }
}
