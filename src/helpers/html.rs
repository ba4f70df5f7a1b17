//! HTML helper functions

use crate::config::CommentsConfig;

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Generate the utterances comment widget script tag
///
/// # Examples
/// ```ignore
/// comments_script(&config.comments)
/// // -> <script src="https://utteranc.es/client.js" repo="..." issue-term="pathname" ...></script>
/// ```
pub fn comments_script(config: &CommentsConfig) -> String {
    if !config.enable || config.repo.is_empty() {
        return String::new();
    }

    format!(
        r#"<script src="{}" repo="{}" issue-term="{}" theme="{}" crossorigin="anonymous" async></script>"#,
        html_escape(&config.script),
        html_escape(&config.repo),
        html_escape(&config.issue_term),
        html_escape(&config.theme),
    )
}

/// Page that sends the browser to `url`, used after a preview session is opened
pub fn redirect_page(url: &str) -> String {
    let js_url = serde_json::to_string(url)
        .unwrap_or_else(|_| "\"/\"".to_string())
        .replace("</", "<\\/");
    format!(
        r#"<!DOCTYPE html><html><head><meta http-equiv="Refresh" content="0; url={}" />
<script>window.location.href = {}</script>
</head></html>"#,
        html_escape(url),
        js_url
    )
}
