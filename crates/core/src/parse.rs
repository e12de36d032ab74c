//! HTML parsing and read-only traversal of the content tree.
//!
//! This module provides the [`Document`] and [`Element`] types. A `Document`
//! owns the parsed tree; an `Element` is a cheap, copyable handle to one node
//! in it. The analysis passes only ever read through these handles.
//!
//! # Example
//!
//! ```rust
//! use scanwise_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Node, Selector};

use crate::preprocess::{self, PreprocessConfig};
use crate::{Result, ScanwiseError};

/// Represents a parsed HTML document.
///
/// # Example
///
/// ```rust
/// use scanwise_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string without preprocessing.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Parses HTML from a string after stripping non-content markup.
    ///
    /// Scripts, styles and comments never contribute text to an analysis,
    /// so removing them up front keeps text lengths and fingerprints honest.
    pub fn parse_with_preprocessing(html: &str, config: &PreprocessConfig) -> Result<Self> {
        let cleaned = preprocess::preprocess_html(html, config);
        Self::parse(&cleaned)
    }

    /// Gets the root (`<html>`) element of the document.
    pub fn root(&self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ScanwiseError::InvalidSelector`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scanwise_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = Selector::parse(selector).map_err(|e| ScanwiseError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;

        Ok(self.html.select(&sel).map(|element| Element { element }).collect())
    }

    /// Gets the title of the document.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

}

/// A read-only handle to one element of a [`Document`].
///
/// `Element` is `Copy`; the traversal helpers take `self` by value so the
/// iterators they return borrow only the document.
///
/// # Example
///
/// ```rust
/// use scanwise_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> From<ElementRef<'a>> for Element<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Self { element }
    }
}

impl<'a> Element<'a> {
    /// Gets the wrapped `scraper::ElementRef`.
    pub fn as_element_ref(&self) -> &ElementRef<'a> {
        &self.element
    }

    /// Gets the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text with runs of whitespace collapsed to single spaces and trimmed.
    pub fn normalized_text(&self) -> String {
        normalize_whitespace(&self.text())
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name (e.g., "div", "a", "span").
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Gets the class tokens of this element.
    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.element.value().classes()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ScanwiseError::InvalidSelector`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = Selector::parse(selector).map_err(|e| ScanwiseError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;

        Ok(self.element.select(&sel).map(|element| Element { element }).collect())
    }

    /// Gets the nearest parent element.
    pub fn parent(self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(Element::from)
    }

    /// Iterates over ancestor elements, nearest first. Does not include `self`.
    pub fn ancestors(self) -> impl Iterator<Item = Element<'a>> {
        self.element.ancestors().filter_map(ElementRef::wrap).map(Element::from)
    }

    /// Iterates over descendant elements in document order. Does not include `self`.
    pub fn descendants(self) -> impl Iterator<Item = Element<'a>> {
        self.element.descendants().skip(1).filter_map(ElementRef::wrap).map(Element::from)
    }

    /// Iterates over direct child elements.
    pub fn child_elements(self) -> impl Iterator<Item = Element<'a>> {
        self.element.children().filter_map(ElementRef::wrap).map(Element::from)
    }

    /// Collects text like [`Element::text`], but skips any descendant element
    /// (and its whole subtree) for which `skip` returns true.
    ///
    /// Walks with an explicit stack, so nesting depth is bounded by memory only.
    pub fn text_excluding<F>(&self, skip: F) -> String
    where
        F: Fn(&Element<'a>) -> bool,
    {
        let mut out = String::new();
        let mut stack: Vec<_> = self.element.children().rev().collect();

        while let Some(node) = stack.pop() {
            match node.value() {
                Node::Text(text) => out.push_str(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(node)
                        && !skip(&Element::from(child))
                    {
                        stack.extend(node.children().rev());
                    }
                }
                _ => {}
            }
        }

        out
    }
}

/// Collapses whitespace runs to a single space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
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
            <title>Test Page</title>
        </head>
        <body>
            <h1>Heading</h1>
            <p class="content">Paragraph 1</p>
            <p class="content">Paragraph <code>two</code> here</p>
            <a href="https://example.com">Link</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
    }

    #[test]
    fn test_element_attributes() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("a").unwrap();

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].attr("href"), Some("https://example.com"));
        assert_eq!(elements[0].tag_name(), "a");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(ScanwiseError::InvalidSelector { .. })));
    }

    #[test]
    fn test_parent_and_ancestors() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let code = doc.select("code").unwrap()[0];

        assert_eq!(code.parent().map(|p| p.tag_name()), Some("p".to_string()));
        let tags: Vec<String> = code.ancestors().map(|a| a.tag_name()).collect();
        assert_eq!(tags, vec!["p", "body", "html"]);
    }

    #[test]
    fn test_descendants_exclude_self() {
        let doc = Document::parse("<div id=\"outer\"><p><em>a</em></p></div>").unwrap();
        let outer = doc.select("#outer").unwrap()[0];
        let tags: Vec<String> = outer.descendants().map(|d| d.tag_name()).collect();
        assert_eq!(tags, vec!["p", "em"]);
    }

    #[test]
    fn test_text_excluding_code() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let paragraph = doc.select("p.content").unwrap()[1];

        let stripped = paragraph.text_excluding(|el| el.tag_name() == "code");
        assert_eq!(normalize_whitespace(&stripped), "Paragraph here");
    }

    #[test]
    fn test_text_excluding_keeps_document_order() {
        let doc = Document::parse("<p>a<em>b<code>x</code>c</em>d<span>e</span></p>").unwrap();
        let p = doc.select("p").unwrap()[0];

        assert_eq!(p.text_excluding(|el| el.tag_name() == "code"), "abcde");
        assert_eq!(p.text_excluding(|_| false), p.text());
    }

    #[test]
    fn test_text_excluding_deep_nesting() {
        let depth = 60_000;
        let html = format!("<p>{}deep text{}</p>", "<span>".repeat(depth), "</span>".repeat(depth));
        let doc = Document::parse(&html).unwrap();
        let p = doc.select("p").unwrap()[0];

        assert_eq!(p.text_excluding(|_| false), "deep text");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }
}
