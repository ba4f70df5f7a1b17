//! prismic-blog: a blog rendered from a Prismic content repository
//!
//! Posts are fetched through a [`prismic::ContentSource`], projected into
//! display models and rendered with embedded Tera templates, either on
//! demand by the server or ahead of time into a static directory.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod prismic;
pub mod richtext;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use prismic::{ContentSource, MemorySource, PrismicClient};

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets directory
    pub static_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
            static_dir,
        })
    }

    /// Content source: the fixtures file when configured, else the repository
    pub fn source(&self) -> Result<Arc<dyn ContentSource>> {
        if let Some(fixtures) = &self.config.fixtures {
            let source = MemorySource::from_json_file(self.base_dir.join(fixtures))?;
            return Ok(Arc::new(source));
        }
        let client = PrismicClient::from_config(&self.config)?;
        tracing::debug!("Using content repository at {}", client.endpoint());
        Ok(Arc::new(client))
    }

    /// Interface labels for the configured language, with site overrides
    pub fn i18n(&self) -> Result<i18n::I18n> {
        let mut i18n = i18n::I18n::new(self.config.locale())?;
        i18n.load_overrides(
            self.base_dir.join(&self.config.languages_dir),
            &self.config.language,
        )?;
        Ok(i18n)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::GenerateStats> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
