//! Generator module - renders blog pages from repository content
//!
//! The same renderers back the server routes and static generation.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{
    navigation, LoadMore, PaginationController, Post, PostPagination, Projector, LISTING_FIELDS,
    POST_TYPE,
};
use crate::error::Result;
use crate::helpers::comments_script;
use crate::i18n::I18n;
use crate::prismic::{ContentSource, Predicate, QueryOptions};
use crate::templates::{SiteData, TemplateRenderer};

/// Newest posts first on the home listing
pub const HOME_ORDERING: &str = "[document.first_publication_date desc]";

/// Post pages rendered concurrently during static generation
const RENDER_CONCURRENCY: usize = 8;

/// Counts reported after a static build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub index_pages: usize,
    pub posts: usize,
    pub assets: usize,
}

/// Page renderer over a content source
pub struct Generator {
    config: SiteConfig,
    renderer: TemplateRenderer,
    projector: Projector,
    site: SiteData,
}

impl Generator {
    /// Create a new generator
    pub fn new(config: &SiteConfig, i18n: &I18n) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            renderer: TemplateRenderer::new()?,
            projector: Projector::new(config),
            site: SiteData::new(config, i18n),
        })
    }

    /// First page of the post listing
    pub async fn first_page<S: ContentSource + ?Sized>(
        &self,
        source: &S,
        content_ref: Option<&str>,
    ) -> Result<PostPagination> {
        let options = QueryOptions::new()
            .page_size(self.config.page_size.max(1))
            .fetch(LISTING_FIELDS)
            .orderings(HOME_ORDERING)
            .content_ref(content_ref.map(str::to_string));
        let response = source
            .query(&[Predicate::at("document.type", POST_TYPE)], &options)
            .await?;
        Ok(self.projector.project_page(response)?)
    }

    /// Seed a controller with the first page and load until `pages` pages
    /// are accumulated or the listing runs out. A failed load keeps what was
    /// accumulated so far.
    pub async fn listing<S: ContentSource + ?Sized>(
        &self,
        source: &S,
        pages: usize,
        content_ref: Option<&str>,
    ) -> Result<PaginationController> {
        let pages = pages.clamp(1, self.config.max_pages.max(1));
        let mut controller = PaginationController::new(self.first_page(source, content_ref).await?);

        while controller.pages_loaded() < pages {
            match controller.load_more(source, &self.projector).await {
                Ok(LoadMore::Appended(_)) => {}
                Ok(LoadMore::Exhausted) | Ok(LoadMore::Busy) => break,
                Err(e) => {
                    tracing::warn!(
                        "Showing {} of {} requested pages: {}",
                        controller.pages_loaded(),
                        pages,
                        e
                    );
                    break;
                }
            }
        }
        Ok(controller)
    }

    /// Home page showing `pages` accumulated listing pages
    pub async fn home_page<S: ContentSource + ?Sized>(
        &self,
        source: &S,
        pages: usize,
        content_ref: Option<&str>,
    ) -> Result<String> {
        let controller = self.listing(source, pages, content_ref).await?;
        let next_link = controller
            .has_more()
            .then(|| format!("/?pages={}", controller.pages_loaded() + 1));
        self.renderer.render_home(
            &self.site,
            controller.posts(),
            next_link.as_deref(),
            content_ref.is_some(),
        )
    }

    /// Post page for `slug`, or `None` when no post has that uid
    pub async fn post_page<S: ContentSource + ?Sized>(
        &self,
        source: &S,
        slug: &str,
        content_ref: Option<&str>,
    ) -> Result<Option<String>> {
        let options = QueryOptions::new().content_ref(content_ref.map(str::to_string));
        let Some(doc) = source.get_by_uid(POST_TYPE, slug, &options).await? else {
            return Ok(None);
        };

        let detail = self.projector.project_detail(&doc)?;
        let navigation = navigation::resolve(source, &doc.id, content_ref).await?;
        let html = self.renderer.render_post(
            &self.site,
            &detail,
            &navigation,
            &comments_script(&self.config.comments),
            content_ref.is_some(),
        )?;
        Ok(Some(html))
    }

    pub fn not_found_page(&self, preview: bool) -> Result<String> {
        self.renderer.render_not_found(&self.site, preview)
    }

    /// Every published post, in listing order
    pub async fn all_posts<S: ContentSource + ?Sized>(&self, source: &S) -> Result<Vec<Post>> {
        let mut controller = PaginationController::new(self.first_page(source, None).await?);
        while let LoadMore::Appended(_) = controller.load_more(source, &self.projector).await? {}
        Ok(controller.into_pagination().results)
    }

    /// Slugs of every published post, in listing order
    pub async fn post_slugs<S: ContentSource + ?Sized>(&self, source: &S) -> Result<Vec<String>> {
        let posts = self.all_posts(source).await?;
        Ok(posts.into_iter().map(|post| post.slug).collect())
    }

    /// Write the whole site into `public_dir` and copy `static_dir` over it
    pub async fn generate<S: ContentSource + ?Sized>(
        &self,
        source: &S,
        public_dir: &Path,
        static_dir: &Path,
    ) -> anyhow::Result<GenerateStats> {
        fs::create_dir_all(public_dir)?;
        let mut stats = GenerateStats::default();

        // Index pages: page N holds the posts of pages 1..=N
        let mut controller = PaginationController::new(self.first_page(source, None).await?);
        loop {
            let page_num = controller.pages_loaded();
            let more = controller.has_more() && page_num < self.config.max_pages;
            let next_link = more.then(|| format!("/page/{}/", page_num + 1));
            let html = self.renderer.render_home(
                &self.site,
                controller.posts(),
                next_link.as_deref(),
                false,
            )?;

            let output_path = if page_num == 1 {
                public_dir.join("index.html")
            } else {
                public_dir.join(format!("page/{}/index.html", page_num))
            };
            write_page(&output_path, &html)?;
            stats.index_pages += 1;

            if !more {
                break;
            }
            controller.load_more(source, &self.projector).await?;
        }

        // Posts listed beyond `max_pages` still get their page
        let slugs = self.post_slugs(source).await?;
        stats.posts = stream::iter(slugs)
            .map(|slug| async move {
                let html = self.post_page(source, &slug, None).await?;
                Ok::<_, anyhow::Error>((slug, html))
            })
            .buffer_unordered(RENDER_CONCURRENCY)
            .try_fold(0, |count, (slug, html)| async move {
                let Some(html) = html else {
                    tracing::warn!("Post {} disappeared during generation", slug);
                    return Ok(count);
                };
                let output_path = public_dir.join("post").join(&slug).join("index.html");
                write_page(&output_path, &html)?;
                tracing::debug!("Generated post: {:?}", output_path);
                Ok(count + 1)
            })
            .await?;

        write_page(
            &public_dir.join("404.html"),
            &self.not_found_page(false)?,
        )?;

        stats.assets = copy_static_assets(static_dir, public_dir)?;

        tracing::info!(
            "Generated {} index pages and {} posts",
            stats.index_pages,
            stats.posts
        );
        Ok(stats)
    }
}

fn write_page(output_path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(output_path, html)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    Ok(())
}

/// Copy static assets (logo, styles, images) to the public directory
fn copy_static_assets(static_dir: &Path, public_dir: &Path) -> anyhow::Result<usize> {
    if !static_dir.exists() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(static_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(static_dir)?;
        let dest = public_dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &dest)?;
        copied += 1;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prismic::{MemorySource, RawDocument};
    use serde_json::json;

    fn post(n: u32) -> RawDocument {
        RawDocument {
            id: format!("id-{}", n),
            uid: Some(format!("post-{}", n)),
            doc_type: POST_TYPE.to_string(),
            first_publication_date: Some(format!("2021-04-{:02}T12:00:00+0000", n)),
            last_publication_date: Some(format!("2021-04-{:02}T12:00:00+0000", n)),
            data: json!({
                "title": [{ "type": "heading1", "text": format!("Post {}", n) }],
                "subtitle": "Subtitle",
                "author": "Joseph Oliveira",
                "content": [{
                    "heading": "Intro",
                    "body": [{ "type": "paragraph", "text": "Lorem ipsum dolor" }]
                }]
            }),
            ..Default::default()
        }
    }

    fn source(count: u32) -> MemorySource {
        MemorySource::new((1..=count).map(post).collect())
    }

    fn generator(page_size: usize) -> Generator {
        let config = SiteConfig {
            page_size,
            ..Default::default()
        };
        Generator::new(&config, &I18n::new(config.locale()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_first_page_is_newest_first() {
        let page = generator(2).first_page(&source(3), None).await.unwrap();
        let slugs: Vec<_> = page.results.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["post-3", "post-2"]);
        assert!(page.next_page.is_some());
    }

    #[tokio::test]
    async fn test_home_page_accumulates_pages() {
        let generator = generator(1);
        let source = source(3);

        let html = generator.home_page(&source, 2, None).await.unwrap();
        assert!(html.contains("Post 3"));
        assert!(html.contains("Post 2"));
        assert!(!html.contains("Post 1"));
        assert!(html.contains("pages=3"));
        assert!(html.contains("Carregar mais posts"));

        let html = generator.home_page(&source, 3, None).await.unwrap();
        assert!(html.contains("Post 1"));
        assert!(!html.contains("Carregar mais posts"));
    }

    #[tokio::test]
    async fn test_home_page_ignores_excess_pages() {
        let html = generator(1).home_page(&source(2), 40, None).await.unwrap();
        assert!(html.contains("Post 1"));
        assert!(html.contains("Post 2"));
        assert!(!html.contains("Carregar mais posts"));
    }

    #[tokio::test]
    async fn test_post_page() {
        let generator = generator(1);
        let html = generator
            .post_page(&source(3), "post-2", None)
            .await
            .unwrap()
            .unwrap();
        assert!(html.contains("<h1>Post 2</h1>"));
        assert!(html.contains("<h2>Intro</h2>"));
        assert!(html.contains("<p>Lorem ipsum dolor</p>"));
        assert!(html.contains("02 Abr 2021"));
        assert!(html.contains("Post 1"));
        assert!(html.contains("Post 3"));
        assert!(!html.contains("Sair do modo Preview"));
    }

    #[tokio::test]
    async fn test_unknown_post() {
        let page = generator(1).post_page(&source(1), "nope", None).await.unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_post_slugs_follow_cursors() {
        let slugs = generator(2).post_slugs(&source(5)).await.unwrap();
        assert_eq!(slugs, vec!["post-5", "post-4", "post-3", "post-2", "post-1"]);
    }

    #[tokio::test]
    async fn test_generate_writes_site() {
        let public = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        fs::write(assets.path().join("logo.svg"), "<svg/>").unwrap();

        let stats = generator(2)
            .generate(&source(3), public.path(), assets.path())
            .await
            .unwrap();
        assert_eq!(
            stats,
            GenerateStats {
                index_pages: 2,
                posts: 3,
                assets: 1
            }
        );

        let index = fs::read_to_string(public.path().join("index.html")).unwrap();
        // Tera escapes `/` in attribute values
        assert!(index.contains(r#"href="&#x2F;page&#x2F;2&#x2F;""#));
        let page2 = fs::read_to_string(public.path().join("page/2/index.html")).unwrap();
        assert!(page2.contains("Post 1"));
        assert!(page2.contains("Post 3"));
        assert!(!page2.contains("Carregar mais posts"));

        assert!(public.path().join("post/post-1/index.html").exists());
        assert!(public.path().join("404.html").exists());
        assert!(public.path().join("logo.svg").exists());
    }
}
