//! Display models

use serde::Serialize;

use super::ReadingTime;
use crate::richtext::TrustedHtml;

/// A post as listed on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Document uid, used in `/post/{slug}`
    pub slug: String,

    pub title: String,

    pub subtitle: String,

    pub author: String,

    /// Formatted first publication date
    pub first_publication_date: String,

    /// First publication date in ISO 8601, for `<time datetime>`
    pub published_at: String,

    /// Formatted last publication date
    pub last_publication_date: Option<String>,
}

/// One page of projected posts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostPagination {
    pub results: Vec<Post>,
    /// Cursor of the following page; `None` once the last page is reached
    pub next_page: Option<String>,
}

/// A content section with its heading and body rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedBlock {
    pub heading: TrustedHtml,
    pub body: TrustedHtml,
}

/// Everything the post page shows about one post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub banner_url: Option<String>,
    pub banner_alt: String,
    pub content: Vec<RenderedBlock>,
    pub reading_time: ReadingTime,
    /// Set when the post was republished after its first publication
    pub edited_at: Option<String>,
}

/// Link to a sibling post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub slug: String,
    pub title: String,
}

/// Sibling posts of the post being shown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationContext {
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
}
