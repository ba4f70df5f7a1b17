//! Built-in blog templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is on for every
//! template; only pre-rendered rich text and the comments script are
//! marked `safe`.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{NavigationContext, Post, PostDetail};
use crate::error::Result;
use crate::helpers::strip_html;
use crate::i18n::I18n;

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("home.html", include_str!("blog/home.html")),
            ("post.html", include_str!("blog/post.html")),
            ("not_found.html", include_str!("blog/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
            (
                "partials/navigation.html",
                include_str!("blog/partials/navigation.html"),
            ),
            (
                "partials/preview_exit.html",
                include_str!("blog/partials/preview_exit.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Home listing; `next_link` is where "load more" points, if anywhere
    pub fn render_home(
        &self,
        site: &SiteData,
        posts: &[Post],
        next_link: Option<&str>,
        preview: bool,
    ) -> Result<String> {
        let mut context = base_context(site, preview);
        context.insert("posts", posts);
        context.insert("next_link", &next_link);
        self.render("home.html", &context)
    }

    pub fn render_post(
        &self,
        site: &SiteData,
        detail: &PostDetail,
        navigation: &NavigationContext,
        comments: &str,
        preview: bool,
    ) -> Result<String> {
        let mut context = base_context(site, preview);
        context.insert("detail", detail);
        context.insert("navigation", navigation);
        context.insert("comments", comments);
        self.render("post.html", &context)
    }

    pub fn render_not_found(&self, site: &SiteData, preview: bool) -> Result<String> {
        self.render("not_found.html", &base_context(site, preview))
    }
}

fn base_context(site: &SiteData, preview: bool) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("preview", &preview);
    context
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Site-wide values every page needs
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub logo: String,
    pub language: String,
    pub labels: HashMap<String, String>,
}

impl SiteData {
    pub fn new(config: &SiteConfig, i18n: &I18n) -> Self {
        Self {
            title: config.title.clone(),
            logo: config.logo.clone(),
            language: config.language.clone(),
            labels: i18n.all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{NavLink, ReadingTime, RenderedBlock};
    use crate::richtext::{RichText, TextField};

    fn site() -> SiteData {
        let config = SiteConfig::default();
        SiteData::new(&config, &I18n::new(config.locale()).unwrap())
    }

    fn post(slug: &str, title: &str) -> Post {
        Post {
            slug: slug.to_string(),
            title: title.to_string(),
            subtitle: "Pensando em sincronização".to_string(),
            author: "Joseph Oliveira".to_string(),
            first_publication_date: "19 Abr 2021".to_string(),
            published_at: "2021-04-19T00:00:00+00:00".to_string(),
            last_publication_date: None,
        }
    }

    fn detail(title: &str) -> PostDetail {
        PostDetail {
            post: post("como-utilizar-hooks", title),
            banner_url: Some("https://images.prismic.io/banner.png".to_string()),
            banner_alt: title.to_string(),
            content: vec![RenderedBlock {
                heading: TextField::Plain("Proin et varius".to_string()).as_html("h2"),
                body: serde_json::from_str::<RichText>(
                    r#"[{"type":"paragraph","text":"Nullam dolor sapien","spans":[{"start":0,"end":6,"type":"strong"}]}]"#,
                )
                .unwrap()
                .as_html(),
            }],
            reading_time: ReadingTime::from_words(401),
            edited_at: Some("20 Abr 2021, às 15:49".to_string()),
        }
    }

    #[test]
    fn test_home_with_next_link() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render_home(&site(), &[post("hooks", "Como utilizar Hooks")], Some("/?pages=2"), false)
            .unwrap();
        assert!(html.contains("Como utilizar Hooks"));
        assert!(html.contains("19 Abr 2021"));
        assert!(html.contains("Joseph Oliveira"));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains("pages=2"));
        assert!(!html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_home_without_next_link() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render_home(&site(), &[post("hooks", "Hooks")], None, true)
            .unwrap();
        assert!(!html.contains("Carregar mais posts"));
        assert!(html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_text_fields_are_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render_home(&site(), &[post("x", "<script>alert(1)</script>")], None, false)
            .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_post_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let navigation = NavigationContext {
            previous: Some(NavLink {
                slug: "older".to_string(),
                title: "Older post".to_string(),
            }),
            next: None,
        };
        let html = renderer
            .render_post(
                &site(),
                &detail("Como utilizar Hooks"),
                &navigation,
                "<script src=\"https://utteranc.es/client.js\"></script>",
                false,
            )
            .unwrap();
        assert!(html.contains("<h2>Proin et varius</h2>"));
        assert!(html.contains("<strong>Nullam</strong> dolor sapien"));
        assert!(html.contains("3 min"));
        assert!(html.contains("* editado em 20 Abr 2021, às 15:49"));
        assert!(html.contains("Older post"));
        assert!(html.contains("Post anterior"));
        assert!(!html.contains("Próximo post"));
        assert!(html.contains("<script src=\"https://utteranc.es/client.js\"></script>"));
    }

    #[test]
    fn test_not_found() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_not_found(&site(), false).unwrap();
        assert!(html.contains("Post não encontrado"));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(5));
        let out = truncate_chars_filter(&tera::Value::from("Olá mundo"), &args).unwrap();
        assert_eq!(out, tera::Value::from("Olá m..."));

        let out = truncate_chars_filter(&tera::Value::from("curto"), &args).unwrap();
        assert_eq!(out, tera::Value::from("curto"));
    }

    #[test]
    fn test_strip_html_filter() {
        let out =
            strip_html_filter(&tera::Value::from("<p>Olá <em>mundo</em></p>"), &HashMap::new())
                .unwrap();
        assert_eq!(out, tera::Value::from("Olá mundo"));
    }
}
