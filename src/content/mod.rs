//! Content module - turns repository documents into display-ready posts

pub mod navigation;
pub mod pagination;
mod post;
pub mod preview;
mod projector;
pub mod reading_time;
mod schema;

pub use pagination::{LoadMore, PaginationController, PaginationState};
pub use post::{NavLink, NavigationContext, Post, PostDetail, PostPagination, RenderedBlock};
pub use preview::{link_resolver, resolve_preview, PreviewResolution};
pub use projector::{nav_link, ProjectionError, Projector};
pub use reading_time::ReadingTime;
pub use schema::{ImageField, RawContentBlock, RawPostData, LISTING_FIELDS, POST_TYPE};
