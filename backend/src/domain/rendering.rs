//! Content renderer: turns a stored document into a presentable body.
//!
//! Dispatch happens exactly once, on the document's [`ContentKind`]. The
//! HTTP adapter decides how each variant is framed (content type, layout).

use pulldown_cmark::{Parser, html};

use super::{ContentKind, Document};

/// Rendered document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedDocument {
    /// Raw bytes to be served as `text/plain`.
    Plain(Vec<u8>),
    /// HTML fragment produced from markdown, to be wrapped in the layout.
    Html(String),
}

/// Render a document according to its kind.
///
/// # Examples
/// ```
/// use cms::domain::{Document, DocumentName, RenderedDocument, render_document};
///
/// let name = DocumentName::parse("about.md").expect("valid name");
/// let rendered = render_document(&Document::new(name, b"# Ruby is...".to_vec()));
/// assert_eq!(rendered, RenderedDocument::Html("<h1>Ruby is...</h1>\n".to_owned()));
/// ```
#[must_use]
pub fn render_document(document: &Document) -> RenderedDocument {
    match document.kind() {
        ContentKind::Plain => RenderedDocument::Plain(document.content().to_vec()),
        ContentKind::Markdown => RenderedDocument::Html(markdown_to_html(&document.text())),
    }
}

/// Convert CommonMark text to an HTML fragment.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let capacity = markdown.len().saturating_add(markdown.len() >> 1);
    let mut out = String::with_capacity(capacity);
    html::push_html(&mut out, Parser::new(markdown));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentName;
    use rstest::rstest;

    fn document(name: &str, content: &str) -> Document {
        Document::new(
            DocumentName::parse(name).expect("valid name"),
            content.as_bytes().to_vec(),
        )
    }

    #[test]
    fn plain_documents_are_returned_verbatim() {
        let rendered = render_document(&document("history.txt", "history of ruby"));
        assert_eq!(rendered, RenderedDocument::Plain(b"history of ruby".to_vec()));
    }

    #[test]
    fn plain_documents_keep_markup_untouched() {
        let rendered = render_document(&document("raw.txt", "# not a heading <b>"));
        assert_eq!(rendered, RenderedDocument::Plain(b"# not a heading <b>".to_vec()));
    }

    #[rstest]
    #[case("# Ruby is...", "<h1>Ruby is...</h1>")]
    #[case("*emphasis*", "<em>emphasis</em>")]
    #[case("- one\n- two", "<li>one</li>")]
    #[case("## Second", "<h2>Second</h2>")]
    fn markdown_documents_become_html(#[case] source: &str, #[case] expected: &str) {
        let RenderedDocument::Html(body) = render_document(&document("about.md", source)) else {
            panic!("markdown should render to html");
        };
        assert!(body.contains(expected), "{body} should contain {expected}");
    }

    #[rstest]
    #[case("", "")]
    #[case("x", "<p>x</p>\n")]
    fn markdown_to_html_handles_short_input(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(markdown_to_html(source), expected);
    }

    #[test]
    fn long_markdown_renders_every_paragraph() {
        let source = "para\n\n".repeat(5_000);
        let html = markdown_to_html(&source);
        assert_eq!(html.matches("<p>para</p>").count(), 5_000);
    }

    #[test]
    fn unknown_extensions_fall_back_to_plain() {
        let rendered = render_document(&document("data.csv", "a,b"));
        assert_eq!(rendered, RenderedDocument::Plain(b"a,b".to_vec()));
    }
}
