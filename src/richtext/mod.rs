//! Structured rich text as delivered by the content API
//!
//! A rich-text field is a list of blocks (headings, paragraphs, list items,
//! images, embeds). Text blocks carry inline spans addressed by UTF-16 offsets.
//! Fields can be flattened to plain text with [`RichText::as_text`] or rendered
//! with [`RichText::as_html`].
//!
//! Rendering produces [`TrustedHtml`]: text is escaped, but embed markup is
//! emitted untouched because the content repository is trusted. That type is
//! the only value templates render without escaping.

mod render;

use serde::{Deserialize, Serialize};

pub use render::TrustedHtml;

/// Kind of a rich-text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    #[default]
    Paragraph,
    Preformatted,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

impl BlockKind {
    /// Whether blocks of this kind carry text
    pub fn has_text(self) -> bool {
        !matches!(self, BlockKind::Image | BlockKind::Embed | BlockKind::Unknown)
    }
}

/// Kind of an inline span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

/// Extra data attached to hyperlink and label spans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanData {
    pub url: Option<String>,
    pub target: Option<String>,
    pub label: Option<String>,
}

/// Inline formatting over `[start, end)` of a block's text (UTF-16 offsets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Option<SpanData>,
}

/// oEmbed payload of an embed block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Embed {
    pub embed_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub provider_name: Option<String>,
    pub html: Option<String>,
}

/// One rich-text block. Blocks without a `type` are read as paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl Block {
    /// Plain paragraph block
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Text block of the given kind
    pub fn text(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A rich-text field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Block>);

impl RichText {
    pub fn blocks(&self) -> &[Block] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|b| b.kind.has_text() && b.text.trim().is_empty())
    }

    /// Flatten to plain text: text blocks joined by a single space
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .filter(|b| b.kind.has_text())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render to HTML
    pub fn as_html(&self) -> TrustedHtml {
        render::render_blocks(&self.0)
    }
}

impl From<Vec<Block>> for RichText {
    fn from(blocks: Vec<Block>) -> Self {
        Self(blocks)
    }
}

/// A field that may be either key text (a plain string) or rich text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Plain(String),
    Rich(RichText),
}

impl Default for TextField {
    fn default() -> Self {
        TextField::Plain(String::new())
    }
}

impl TextField {
    pub fn as_text(&self) -> String {
        match self {
            TextField::Plain(s) => s.clone(),
            TextField::Rich(rich) => rich.as_text(),
        }
    }

    /// Render to HTML; plain text is wrapped in `plain_tag`
    pub fn as_html(&self, plain_tag: &str) -> TrustedHtml {
        match self {
            TextField::Plain(s) if s.is_empty() => TrustedHtml::default(),
            TextField::Plain(s) => render::wrap_plain(plain_tag, s),
            TextField::Rich(rich) => rich.as_html(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_without_type_is_paragraph() {
        let rich: RichText = serde_json::from_value(json!([{ "text": "Hello" }])).unwrap();
        assert_eq!(rich.blocks()[0].kind, BlockKind::Paragraph);
        assert_eq!(rich.as_text(), "Hello");
    }

    #[test]
    fn test_as_text_joins_blocks() {
        let rich: RichText = serde_json::from_value(json!([
            { "type": "heading1", "text": "Como utilizar", "spans": [] },
            { "type": "image", "url": "https://images.prismic.io/x.png" },
            { "type": "paragraph", "text": "Hooks", "spans": [] }
        ]))
        .unwrap();
        assert_eq!(rich.as_text(), "Como utilizar Hooks");
    }

    #[test]
    fn test_unknown_kinds_are_tolerated() {
        let rich: RichText = serde_json::from_value(json!([
            { "type": "table", "text": "" },
            { "type": "paragraph", "text": "ok", "spans": [{ "start": 0, "end": 2, "type": "strikethrough" }] }
        ]))
        .unwrap();
        assert_eq!(rich.blocks()[0].kind, BlockKind::Unknown);
        assert_eq!(rich.blocks()[1].spans[0].kind, SpanKind::Unknown);
    }

    #[test]
    fn test_text_field_accepts_both_shapes() {
        let plain: TextField = serde_json::from_value(json!("Proin et varius")).unwrap();
        assert_eq!(plain.as_text(), "Proin et varius");

        let rich: TextField =
            serde_json::from_value(json!([{ "type": "heading2", "text": "Cras laoreet" }])).unwrap();
        assert_eq!(rich.as_text(), "Cras laoreet");
        assert_eq!(rich.as_html("h2").as_str(), "<h2>Cras laoreet</h2>");
        assert_eq!(plain.as_html("h2").as_str(), "<h2>Proin et varius</h2>");
    }

    #[test]
    fn test_is_empty() {
        assert!(RichText::default().is_empty());
        assert!(RichText(vec![Block::paragraph("  ")]).is_empty());
        assert!(!RichText(vec![Block::paragraph("a")]).is_empty());
    }
}
