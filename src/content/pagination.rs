//! Incremental "load more" pagination over post listings

use super::{Post, PostPagination, Projector};
use crate::error::{BlogError, Result};
use crate::prismic::ContentSource;

/// Whether a next-page request is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Idle,
    Fetching,
}

/// Outcome of [`PaginationController::load_more`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// A page arrived and this many posts were appended
    Appended(usize),
    /// No cursor left; nothing was requested
    Exhausted,
    /// A request is already in flight; nothing was requested
    Busy,
}

/// Accumulates posts page by page, one request at a time.
///
/// Seeded with the first page, each successful [`load_more`](Self::load_more)
/// appends the next page in arrival order and moves the cursor. A failed
/// request leaves the accumulated posts and the cursor untouched.
#[derive(Debug, Clone)]
pub struct PaginationController {
    posts: Vec<Post>,
    next_page: Option<String>,
    state: PaginationState,
    pages_loaded: usize,
}

impl PaginationController {
    pub fn new(first: PostPagination) -> Self {
        Self {
            posts: first.results,
            next_page: first.next_page,
            state: PaginationState::Idle,
            pages_loaded: 1,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn into_pagination(self) -> PostPagination {
        PostPagination {
            results: self.posts,
            next_page: self.next_page,
        }
    }

    /// Move from Idle to Fetching, returning the cursor to request.
    /// Returns `None`, without changing state, when busy or exhausted.
    pub fn begin_fetch(&mut self) -> Option<String> {
        if self.state == PaginationState::Fetching {
            return None;
        }
        let cursor = self.next_page.clone()?;
        self.state = PaginationState::Fetching;
        Some(cursor)
    }

    /// Append a fetched page and return to Idle
    pub fn complete_fetch(&mut self, page: PostPagination) -> usize {
        let appended = page.results.len();
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        self.pages_loaded += 1;
        self.state = PaginationState::Idle;
        appended
    }

    /// Return to Idle without touching posts or cursor
    pub fn abort_fetch(&mut self) {
        self.state = PaginationState::Idle;
    }

    /// Fetch, project and append the next page
    pub async fn load_more<S: ContentSource + ?Sized>(
        &mut self,
        source: &S,
        projector: &Projector,
    ) -> Result<LoadMore> {
        if self.state == PaginationState::Fetching {
            return Ok(LoadMore::Busy);
        }
        let Some(cursor) = self.begin_fetch() else {
            return Ok(LoadMore::Exhausted);
        };

        // Resets to Idle if this future is dropped mid-request or fails
        let guard = FetchGuard { controller: self };

        let page = match source.fetch_page(&cursor).await {
            Ok(response) => projector.project_page(response).map_err(BlogError::from),
            Err(e) => Err(BlogError::from(e)),
        };

        match page {
            Ok(page) => {
                let appended = guard.controller.complete_fetch(page);
                tracing::debug!(
                    "Loaded page {} ({} posts)",
                    guard.controller.pages_loaded,
                    appended
                );
                Ok(LoadMore::Appended(appended))
            }
            Err(e) => {
                tracing::warn!("Failed to load more posts: {}", e);
                Err(e)
            }
        }
    }
}

struct FetchGuard<'a> {
    controller: &'a mut PaginationController,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if self.controller.state == PaginationState::Fetching {
            self.controller.abort_fetch();
        }
    }
}
