//! Blog server with time-based revalidation and preview mode

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::cache::RenderCache;
use crate::config::SiteConfig;
use crate::content::resolve_preview;
use crate::generator::Generator;
use crate::helpers::redirect_page;
use crate::i18n::I18n;
use crate::prismic::ContentSource;
use crate::Blog;

/// Pages rendered concurrently while warming the cache
const WARM_CONCURRENCY: usize = 4;

/// Shared server state
pub struct AppState {
    config: SiteConfig,
    source: Arc<dyn ContentSource>,
    generator: Generator,
    i18n: I18n,
    cache: RenderCache,
}

impl AppState {
    pub fn new(config: SiteConfig, source: Arc<dyn ContentSource>, i18n: I18n) -> Result<Self> {
        let generator = Generator::new(&config, &i18n)?;
        Ok(Self {
            config,
            source,
            generator,
            i18n,
            cache: RenderCache::new(),
        })
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    fn home_ttl(&self) -> Duration {
        Duration::from_secs(self.config.revalidate.home)
    }

    fn post_ttl(&self) -> Duration {
        Duration::from_secs(self.config.revalidate.post)
    }

    fn preview_ref(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.config.preview_cookie)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>, static_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the blog server
pub async fn start(blog: &Blog, ip: &str, port: u16, warm: bool) -> Result<()> {
    let state = Arc::new(AppState::new(
        blog.config.clone(),
        blog.source()?,
        blog.i18n()?,
    )?);

    if warm {
        warm_cache(&state).await;
    }

    let app = router(state, &blog.static_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Render the home page and every listed post into the cache. Failures are
/// logged; affected pages render on their first request instead.
pub async fn warm_cache(state: &AppState) -> usize {
    let source = state.source.as_ref();
    let mut warmed = 0;

    match state.generator.home_page(source, 1, None).await {
        Ok(html) => {
            state.cache.store("/", html).await;
            warmed += 1;
        }
        Err(e) => tracing::warn!("Could not pre-render home page: {}", e),
    }

    let slugs = match state.generator.post_slugs(source).await {
        Ok(slugs) => slugs,
        Err(e) => {
            tracing::warn!("Could not enumerate posts: {}", e);
            return warmed;
        }
    };

    let rendered: Vec<_> = stream::iter(slugs)
        .map(|slug| async move {
            let page = state.generator.post_page(source, &slug, None).await;
            (slug, page)
        })
        .buffer_unordered(WARM_CONCURRENCY)
        .collect()
        .await;

    for (slug, page) in rendered {
        match page {
            Ok(Some(html)) => {
                state.cache.store(post_key(&slug), html).await;
                warmed += 1;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not pre-render post {}: {}", slug, e),
        }
    }

    tracing::info!("Pre-rendered {} pages", warmed);
    warmed
}

fn post_key(slug: &str) -> String {
    format!("/post/{}", slug)
}

#[derive(Debug, Deserialize)]
struct HomeQuery {
    pages: Option<String>,
}

async fn home_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HomeQuery>,
    jar: CookieJar,
) -> Response {
    let pages = query
        .pages
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, state.config.max_pages.max(1));
    let content_ref = state.preview_ref(&jar);
    let key = if pages == 1 {
        "/".to_string()
    } else {
        format!("/?pages={}", pages)
    };

    let render = async {
        state
            .generator
            .home_page(state.source.as_ref(), pages, content_ref.as_deref())
            .await
            .map(Some)
    };
    serve_page(&state, &key, state.home_ttl(), content_ref.is_some(), render).await
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Response {
    let content_ref = state.preview_ref(&jar);
    let key = post_key(&slug);

    let render = state
        .generator
        .post_page(state.source.as_ref(), &slug, content_ref.as_deref());
    serve_page(&state, &key, state.post_ttl(), content_ref.is_some(), render).await
}

/// Serve `key` from the cache while fresh, otherwise render it. Preview
/// requests never read or write the cache. When rendering fails, the last
/// good page is served if there is one.
async fn serve_page<F>(
    state: &AppState,
    key: &str,
    ttl: Duration,
    preview: bool,
    render: F,
) -> Response
where
    F: Future<Output = crate::error::Result<Option<String>>>,
{
    if !preview {
        if let Some(html) = state.cache.fresh(key, ttl).await {
            tracing::debug!("Cache hit: {}", key);
            return page_response(html, ttl, false);
        }
    }

    match render.await {
        Ok(Some(html)) => {
            if !preview {
                state.cache.store(key, html.clone()).await;
            }
            page_response(html, ttl, preview)
        }
        Ok(None) => {
            if !preview {
                state.cache.invalidate(key).await;
            }
            not_found(state, preview)
        }
        Err(e) => {
            tracing::error!("Failed to render {}: {}", key, e);
            if !preview {
                if let Some(html) = state.cache.stale(key).await {
                    tracing::warn!("Serving stale {}", key);
                    return page_response(html, ttl, false);
                }
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                state.i18n.get("server_error"),
            )
                .into_response()
        }
    }
}

fn page_response(html: String, ttl: Duration, preview: bool) -> Response {
    let cache_control = if preview {
        "private, no-store".to_string()
    } else {
        format!("s-maxage={}, stale-while-revalidate", ttl.as_secs())
    };
    ([(header::CACHE_CONTROL, cache_control)], Html(html)).into_response()
}

fn not_found(state: &AppState, preview: bool) -> Response {
    match state.generator.not_found_page(preview) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render 404 page: {}", e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    token: Option<String>,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

async fn preview_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
    jar: CookieJar,
) -> Response {
    let token = query.token.unwrap_or_default();
    match resolve_preview(state.source.as_ref(), &token, query.document_id.as_deref()).await {
        Ok(resolution) => {
            let cookie = Cookie::build((state.config.preview_cookie.clone(), resolution.content_ref))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (jar.add(cookie), Html(redirect_page(&resolution.redirect_url))).into_response()
        }
        Err(e) => {
            tracing::warn!("Rejected preview request: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "message": "Invalid token" })),
            )
                .into_response()
        }
    }
}

async fn exit_preview_handler(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let cookie = Cookie::build((state.config.preview_cookie.clone(), "")).path("/");
    (jar.remove(cookie), Redirect::to("/")).into_response()
}
