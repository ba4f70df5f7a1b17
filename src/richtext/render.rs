//! HTML rendering of rich-text blocks

use serde::Serialize;
use std::fmt;

use super::{Block, BlockKind, Span, SpanKind};
use crate::helpers::html_escape;

/// HTML produced from repository content, rendered verbatim by templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(super) fn wrap_plain(tag: &str, text: &str) -> TrustedHtml {
    TrustedHtml(format!("<{tag}>{}</{tag}>", escape_text(text)))
}

pub(super) fn render_blocks(blocks: &[Block]) -> TrustedHtml {
    let mut out = String::new();
    // Open list tag, if consecutive list items are being grouped
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind {
            BlockKind::ListItem => Some("ul"),
            BlockKind::OListItem => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                out.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                out.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        render_block(&mut out, block);
    }

    if let Some(tag) = open_list {
        out.push_str(&format!("</{}>", tag));
    }

    TrustedHtml(out)
}

fn render_block(out: &mut String, block: &Block) {
    let tag = match block.kind {
        BlockKind::Heading1 => "h1",
        BlockKind::Heading2 => "h2",
        BlockKind::Heading3 => "h3",
        BlockKind::Heading4 => "h4",
        BlockKind::Heading5 => "h5",
        BlockKind::Heading6 => "h6",
        BlockKind::Paragraph => "p",
        BlockKind::Preformatted => "pre",
        BlockKind::ListItem | BlockKind::OListItem => "li",
        BlockKind::Image => {
            if let Some(url) = &block.url {
                out.push_str(&format!(
                    r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                    html_escape(url),
                    html_escape(block.alt.as_deref().unwrap_or(""))
                ));
            }
            return;
        }
        BlockKind::Embed => {
            if let Some(embed) = &block.oembed {
                out.push_str(&format!(
                    r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                    html_escape(embed.embed_url.as_deref().unwrap_or("")),
                    html_escape(embed.kind.as_deref().unwrap_or("")),
                    html_escape(embed.provider_name.as_deref().unwrap_or("")),
                    embed.html.as_deref().unwrap_or("")
                ));
            }
            return;
        }
        BlockKind::Unknown => return,
    };

    out.push_str(&format!("<{}>", tag));
    out.push_str(&render_spans(&block.text, &block.spans));
    out.push_str(&format!("</{}>", tag));
}

/// Render text with its spans. The text is cut at every span boundary and
/// each piece is wrapped in the spans covering it, so output always nests.
fn render_spans(text: &str, spans: &[Span]) -> String {
    if spans.is_empty() {
        return escape_text(text);
    }

    let mut bounds: Vec<usize> = spans.iter().flat_map(|s| [s.start, s.end]).collect();
    bounds.sort_unstable();
    bounds.dedup();

    let mut ordered: Vec<&Span> = spans.iter().filter(|s| s.start < s.end).collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::new();
    let mut piece = String::new();
    let mut piece_start = 0;
    let mut pos = 0;

    for c in text.chars() {
        if pos != piece_start && bounds.binary_search(&pos).is_ok() {
            push_piece(&mut out, &piece, piece_start, &ordered);
            piece.clear();
            piece_start = pos;
        }
        piece.push(c);
        pos += c.len_utf16();
    }
    push_piece(&mut out, &piece, piece_start, &ordered);

    out
}

fn push_piece(out: &mut String, piece: &str, start: usize, spans: &[&Span]) {
    if piece.is_empty() {
        return;
    }

    let active: Vec<&Span> = spans
        .iter()
        .copied()
        .filter(|s| s.start <= start && start < s.end)
        .collect();

    for span in &active {
        out.push_str(&open_tag(span));
    }
    out.push_str(&escape_text(piece));
    for span in active.iter().rev() {
        out.push_str(close_tag(span));
    }
}

fn open_tag(span: &Span) -> String {
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let data = span.data.clone().unwrap_or_default();
            let url = data.url.unwrap_or_default();
            match data.target {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener noreferrer">"#,
                    html_escape(&url),
                    html_escape(&target)
                ),
                None => format!(r#"<a href="{}">"#, html_escape(&url)),
            }
        }
        SpanKind::Label => {
            let label = span
                .data
                .as_ref()
                .and_then(|d| d.label.clone())
                .unwrap_or_default();
            format!(r#"<span class="{}">"#, html_escape(&label))
        }
        SpanKind::Unknown => String::new(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label => "</span>",
        SpanKind::Unknown => "",
    }
}

fn escape_text(text: &str) -> String {
    html_escape(text).replace('\n', "<br />")
}
