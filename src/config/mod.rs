//! Configuration module

mod site;

pub use site::CommentsConfig;
pub use site::RevalidateConfig;
pub use site::SiteConfig;
pub use site::{ACCESS_TOKEN_ENV, ENDPOINT_ENV};
