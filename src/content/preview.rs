//! Editorial preview sessions

use super::POST_TYPE;
use crate::error::{BlogError, Result};
use crate::prismic::{ContentSource, QueryOptions, RawDocument};

/// Where to send the editor and which content version to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResolution {
    pub redirect_url: String,
    pub content_ref: String,
}

/// Site URL of a document
pub fn link_resolver(doc: &RawDocument) -> String {
    match doc.uid.as_deref() {
        Some(uid) if doc.doc_type == POST_TYPE && !uid.is_empty() => format!("/post/{}", uid),
        _ => "/".to_string(),
    }
}

/// Exchange a preview token (and optional document id) for a redirect URL
/// and the content ref to render with. Every failure is an invalid token.
pub async fn resolve_preview<S: ContentSource + ?Sized>(
    source: &S,
    token: &str,
    document_id: Option<&str>,
) -> Result<PreviewResolution> {
    let token = token.trim();
    if token.is_empty() {
        return Err(BlogError::InvalidPreview("missing token".to_string()));
    }

    let session = source
        .preview_session(token)
        .await
        .map_err(|e| BlogError::InvalidPreview(e.to_string()))?;

    let document_id = document_id
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or(session.main_document);

    let redirect_url = match document_id {
        Some(id) => {
            let options = QueryOptions::new().content_ref(Some(token.to_string()));
            let doc = source
                .get_by_id(&id, &options)
                .await
                .map_err(|e| BlogError::InvalidPreview(e.to_string()))?;
            doc.as_ref().map(link_resolver).unwrap_or_else(|| "/".to_string())
        }
        None => "/".to_string(),
    };

    tracing::info!("Preview session opened, redirecting to {}", redirect_url);
    Ok(PreviewResolution {
        redirect_url,
        content_ref: token.to_string(),
    })
}
