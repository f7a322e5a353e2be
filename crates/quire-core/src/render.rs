//! Document rendering.
//!
//! The rendering mode is a closed set selected by extension: markdown is
//! converted to HTML, plain text is served verbatim, anything else is
//! refused with [`RenderError::UnsupportedType`].

use pulldown_cmark::{Parser, html};
use quire_storage::DocumentName;

use crate::error::RenderError;

/// Content type of rendered markdown.
pub const CONTENT_TYPE_HTML: &str = "text/html";
/// Content type of plain-text documents.
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// How a document is presented, chosen from its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    /// `.md` / `.markdown`: rendered to HTML.
    Markdown,
    /// `.txt`: served unchanged.
    PlainText,
    /// Any other extension (empty when the name has none).
    Unsupported { extension: String },
}

/// A rendered document body and the content type it must be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

impl DocumentKind {
    /// Select the kind for a document name.
    #[must_use]
    pub fn for_name(name: &DocumentName) -> Self {
        match name.extension().as_deref() {
            Some("md" | "markdown") => Self::Markdown,
            Some("txt") => Self::PlainText,
            Some(other) => Self::Unsupported {
                extension: other.to_owned(),
            },
            None => Self::Unsupported {
                extension: String::new(),
            },
        }
    }

    /// Render `content` according to this kind.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnsupportedType`] for [`DocumentKind::Unsupported`].
    pub fn render(&self, content: &[u8]) -> Result<Rendered, RenderError> {
        match self {
            Self::Markdown => Ok(Rendered {
                body: markdown_to_html(&String::from_utf8_lossy(content)).into_bytes(),
                content_type: CONTENT_TYPE_HTML,
            }),
            Self::PlainText => Ok(Rendered {
                body: content.to_vec(),
                content_type: CONTENT_TYPE_TEXT,
            }),
            Self::Unsupported { extension } => Err(RenderError::UnsupportedType {
                extension: extension.clone(),
            }),
        }
    }
}

/// Render a document's content by its name.
///
/// # Errors
///
/// Returns [`RenderError::UnsupportedType`] when the extension has no
/// rendering rule.
pub fn render(name: &DocumentName, content: &[u8]) -> Result<Rendered, RenderError> {
    DocumentKind::for_name(name).render(content)
}

/// Convert CommonMark text to an HTML fragment. No extensions are enabled.
#[must_use]
pub fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
