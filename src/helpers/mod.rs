//! Helper functions shared by the renderers and templates

mod date;
mod html;

pub use date::*;
pub use html::*;
