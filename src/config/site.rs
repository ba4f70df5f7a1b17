//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::helpers::Locale;

/// Environment variable overriding `api_endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,
    pub logo: String,

    // Date / Time format
    pub date_format: String,
    pub edited_format: String,

    // Content repository
    pub api_endpoint: String,
    pub access_token: Option<String>,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// JSON file of documents served instead of the remote repository
    pub fixtures: Option<String>,

    // Pagination
    pub page_size: usize,
    pub max_pages: usize,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub languages_dir: String,

    #[serde(default)]
    pub revalidate: RevalidateConfig,

    #[serde(default)]
    pub comments: CommentsConfig,

    pub preview_cookie: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
            timezone: "UTC".to_string(),
            logo: "/logo.svg".to_string(),

            date_format: "DD MMM YYYY".to_string(),
            edited_format: "DD MMM YYYY, [às] HH:mm".to_string(),

            api_endpoint: String::new(),
            access_token: None,
            request_timeout: 30,
            fixtures: None,

            page_size: 1,
            max_pages: 50,

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            languages_dir: "languages".to_string(),

            revalidate: RevalidateConfig::default(),
            comments: CommentsConfig::default(),

            preview_cookie: "preview_ref".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRISMIC_API_ENDPOINT` / `PRISMIC_ACCESS_TOKEN` when set
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            tracing::debug!("Using content endpoint from {}", ENDPOINT_ENV);
            self.api_endpoint = endpoint;
        }
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.access_token = Some(token);
        }
    }

    /// Locale used for date formatting
    pub fn locale(&self) -> Locale {
        Locale::from_tag(&self.language)
    }

    /// Timezone used when rendering dates; unknown names fall back to UTC
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            chrono_tz::UTC
        })
    }
}

/// Cache lifetimes for rendered pages, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevalidateConfig {
    pub home: u64,
    pub post: u64,
}

impl Default for RevalidateConfig {
    fn default() -> Self {
        Self {
            home: 60 * 60,
            post: 60 * 30,
        }
    }
}

/// utterances comment widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub enable: bool,
    pub script: String,
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            script: "https://utteranc.es/client.js".to_string(),
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "photon-dark".to_string(),
        }
    }
}
