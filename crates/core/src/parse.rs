//! HTML parsing and body text extraction.
//!
//! This module turns raw page bytes into a [`ParsedDocument`]: the page title
//! plus the cleaned text of its primary content region.
//!
//! # Example
//!
//! ```rust
//! use seoscope_core::parse_html;
//!
//! let html = br#"
//!     <html>
//!         <head><title>Guide</title></head>
//!         <body>
//!             <nav>Home | About</nav>
//!             <main><h1>Title</h1><p>Some   useful text.</p></main>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = parse_html(html).unwrap();
//! assert_eq!(doc.title, "Guide");
//! assert_eq!(doc.body_text, "Title Some useful text.");
//! assert_eq!(doc.word_count, 4);
//! ```

use std::cell::RefCell;

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;

use crate::{Result, SeoscopeError};

/// Title used when the page has no `<title>` element.
pub const NO_TITLE: &str = "No Title Found";

/// Candidate content regions, most specific first.
const CONTENT_REGIONS: [&str; 3] = ["main", "article", "body"];

/// Subtrees whose text never counts as page content.
const SKIPPED_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

/// Title and cleaned body text of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    /// Text of the `<title>` element, or [`NO_TITLE`].
    pub title: String,
    /// Text of the content region with whitespace collapsed.
    pub body_text: String,
    /// Number of whitespace-delimited tokens in `body_text`.
    pub word_count: usize,
}

/// Represents a parsed HTML document together with the content regions
/// that were literally present in its markup.
///
/// HTML5 parsing always synthesizes `<html>`, `<head>` and `<body>`, so the
/// tree alone cannot tell whether a page really had a body. The raw token
/// stream is scanned first to record which region tags the author wrote.
pub struct Document {
    html: Html,
    regions: Vec<String>,
}

impl Document {
    /// Parses HTML bytes, decoding them lossily as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`SeoscopeError::HtmlParseError`] if the tag scanner rejects
    /// the input.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let regions = scan_regions(raw)?;
        let html = Html::parse_document(&String::from_utf8_lossy(raw));

        Ok(Self { html, regions })
    }

    /// Gets the title of the document.
    ///
    /// Returns the trimmed content of the first `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    /// Locates the primary content region: `<main>`, then `<article>`, then `<body>`.
    ///
    /// Returns `None` when the markup contains none of them.
    pub fn content_region(&self) -> Option<ElementRef<'_>> {
        CONTENT_REGIONS
            .iter()
            .filter(|tag| self.regions.iter().any(|seen| seen == *tag))
            .find_map(|tag| {
                let selector = Selector::parse(tag).ok()?;
                self.html.select(&selector).next()
            })
    }

    /// Name of the region [`content_region`](Self::content_region) would pick.
    pub fn region_name(&self) -> Option<&'static str> {
        CONTENT_REGIONS
            .iter()
            .copied()
            .find(|tag| self.regions.iter().any(|seen| seen == tag))
    }
}

/// Extracts the title and cleaned body text from raw HTML.
///
/// Text nodes of the content region are joined by single spaces after
/// skipping `script`, `style`, `nav`, `footer` and `header` subtrees inside
/// that region. Whitespace runs collapse to one space and the ends are
/// trimmed.
///
/// A region that exists but holds no text yields `word_count == 0`; callers
/// must treat that as a failed extraction.
///
/// # Errors
///
/// - [`SeoscopeError::NoBodyFound`] when none of `<main>`, `<article>` or `<body>` is present
/// - [`SeoscopeError::HtmlParseError`] when the markup cannot be tokenized
pub fn parse_html(raw: &[u8]) -> Result<ParsedDocument> {
    let doc = Document::parse(raw)?;
    let title = doc.title().unwrap_or_else(|| NO_TITLE.to_string());

    let region = doc.content_region().ok_or(SeoscopeError::NoBodyFound)?;

    let mut pieces = Vec::new();
    collect_text(*region, &mut pieces);

    let body_text = collapse_whitespace(&pieces.join(" "));
    let word_count = body_text.split_whitespace().count();

    tracing::debug!(region = doc.region_name(), word_count, "parsed document");

    Ok(ParsedDocument { title, body_text, word_count })
}

/// Records which content region tags appear in the source markup.
fn scan_regions(raw: &[u8]) -> Result<Vec<String>> {
    let seen = RefCell::new(Vec::new());

    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: CONTENT_REGIONS
                .iter()
                .map(|tag| {
                    let seen = &seen;
                    lol_html::element!(*tag, move |el| {
                        let name = el.tag_name();
                        let mut seen = seen.borrow_mut();
                        if !seen.contains(&name) {
                            seen.push(name);
                        }
                        Ok(())
                    })
                })
                .collect(),
            ..Default::default()
        },
        |_: &[u8]| {},
    );

    rewriter
        .write(raw)
        .map_err(|e| SeoscopeError::HtmlParseError(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| SeoscopeError::HtmlParseError(e.to_string()))?;

    Ok(seen.into_inner())
}

fn collect_text<'a>(node: NodeRef<'a, Node>, pieces: &mut Vec<&'a str>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => pieces.push(&**text),
            Node::Element(el) if SKIPPED_TAGS.contains(&el.name()) => {}
            Node::Element(_) => collect_text(child, pieces),
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>  Test Page </title>
            <style>body { color: red; }</style>
        </head>
        <body>
            <header>Site header</header>
            <nav><a href="/">Home</a></nav>
            <article>
                <h1>Heading</h1>
                <p>Paragraph one.</p>
                <p>Paragraph <strong>two</strong>.</p>
            </article>
            <footer>Copyright</footer>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_title() {
        let doc = parse_html(SAMPLE_HTML.as_bytes()).unwrap();
        assert_eq!(doc.title, "Test Page");
    }

    #[test]
    fn test_missing_title() {
        let doc = parse_html(b"<body><p>Just text</p></body>").unwrap();
        assert_eq!(doc.title, NO_TITLE);
    }

    #[test]
    fn test_article_preferred_over_body() {
        let doc = parse_html(SAMPLE_HTML.as_bytes()).unwrap();
        assert_eq!(doc.body_text, "Heading Paragraph one. Paragraph two .");
        assert!(!doc.body_text.contains("Site header"));
        assert!(!doc.body_text.contains("Copyright"));
        assert_eq!(doc.word_count, 6);
    }

    #[test]
    fn test_main_preferred_over_article() {
        let html = br#"<body><article>Article text</article><main>Main text</main></body>"#;
        let doc = parse_html(html).unwrap();
        assert_eq!(doc.body_text, "Main text");
    }

    #[test]
    fn test_script_inside_main_removed() {
        let html = br#"
            <html><body><main>
                <p>Visible   words
                here</p>
                <script>var hidden = "secret payload";</script>
                <style>.x { display: none }</style>
            </main></body></html>
        "#;
        let doc = parse_html(html).unwrap();
        assert_eq!(doc.body_text, "Visible words here");
        assert!(!doc.body_text.contains("secret"));
        assert_eq!(doc.word_count, 3);
    }

    #[test]
    fn test_skipped_tags_outside_region_are_irrelevant() {
        let html = br#"<body><header>Top</header><main><p>Inside</p></main></body>"#;
        let doc = parse_html(html).unwrap();
        assert_eq!(doc.body_text, "Inside");
    }

    #[test]
    fn test_body_fallback_strips_chrome() {
        let html = br#"<html><body><header>H</header><div>Plain body text</div><footer>F</footer></body></html>"#;
        let doc = parse_html(html).unwrap();
        assert_eq!(doc.body_text, "Plain body text");
        assert_eq!(doc.word_count, 3);
    }

    #[test]
    fn test_no_content_region() {
        let result = parse_html(b"<p>fragment without landmarks</p>");
        assert!(matches!(result, Err(SeoscopeError::NoBodyFound)));
    }

    #[test]
    fn test_empty_region_has_zero_words() {
        let doc = parse_html(b"<html><body>   </body></html>").unwrap();
        assert_eq!(doc.body_text, "");
        assert_eq!(doc.word_count, 0);
    }

    #[test]
    fn test_adjacent_text_nodes_are_space_separated() {
        let doc = parse_html(b"<main><span>one</span><span>two</span></main>").unwrap();
        assert_eq!(doc.body_text, "one two");
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let mut html = b"<body><p>caf".to_vec();
        html.push(0xff);
        html.extend_from_slice(b" menu</p></body>");

        let doc = parse_html(&html).unwrap();
        assert_eq!(doc.word_count, 2);
    }

    #[test]
    fn test_region_name() {
        let doc = Document::parse(SAMPLE_HTML.as_bytes()).unwrap();
        assert_eq!(doc.region_name(), Some("article"));

        let doc = Document::parse(b"<div>nothing</div>").unwrap();
        assert_eq!(doc.region_name(), None);
        assert!(doc.content_region().is_none());
    }
}
