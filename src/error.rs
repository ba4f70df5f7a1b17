//! Error types shared by the renderers, the server and the commands

use thiserror::Error;

use crate::content::ProjectionError;
use crate::prismic::PrismicError;

/// Errors raised while producing a page
#[derive(Error, Debug)]
pub enum BlogError {
    #[error("Content repository error: {0}")]
    Content(#[from] PrismicError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Invalid preview token: {0}")]
    InvalidPreview(String),
}

pub type Result<T, E = BlogError> = std::result::Result<T, E>;
