//! The document resources are injected into.
//!
//! A [`Document`] is a shared handle over the stylesheet elements in the head
//! and the script elements in the body. Clones observe the same elements.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Kind of an injected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// `<script src=…>` in the body.
    Script,
    /// `<link rel="stylesheet" href=…>` in the head.
    Stylesheet,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script => write!(f, "script"),
            Self::Stylesheet => write!(f, "stylesheet"),
        }
    }
}

/// One injected element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Element {
    /// Element kind.
    pub kind: ResourceKind,
    /// Referenced URL.
    pub url: String,
}

impl Element {
    /// A script element.
    #[must_use]
    pub fn script(url: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Script,
            url: url.into(),
        }
    }

    /// A stylesheet element.
    #[must_use]
    pub fn stylesheet(url: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Stylesheet,
            url: url.into(),
        }
    }

    /// Render as an HTML tag.
    #[must_use]
    pub fn to_html(&self) -> String {
        let url = escape_attr(&self.url);
        match self.kind {
            ResourceKind::Script => format!("<script src=\"{url}\"></script>"),
            ResourceKind::Stylesheet => format!("<link rel=\"stylesheet\" href=\"{url}\">"),
        }
    }
}

#[derive(Debug, Default)]
struct DocumentInner {
    head: Vec<Element>,
    body: Vec<Element>,
}

impl DocumentInner {
    fn section(&self, kind: ResourceKind) -> &Vec<Element> {
        match kind {
            ResourceKind::Stylesheet => &self.head,
            ResourceKind::Script => &self.body,
        }
    }

    fn section_mut(&mut self, kind: ResourceKind) -> &mut Vec<Element> {
        match kind {
            ResourceKind::Stylesheet => &mut self.head,
            ResourceKind::Script => &mut self.body,
        }
    }
}

/// Shared, mutable set of injected elements.
#[derive(Debug, Clone, Default)]
pub struct Document {
    inner: Arc<RwLock<DocumentInner>>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an element of `kind` referencing `url` exists.
    #[must_use]
    pub fn contains(&self, kind: ResourceKind, url: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.section(kind).iter().any(|e| e.url == url)
    }

    /// Append an element unless an identical one is already present.
    ///
    /// Returns `true` if the element was inserted.
    pub fn append(&self, element: Element) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let section = inner.section_mut(element.kind);
        if section.iter().any(|e| e.url == element.url) {
            return false;
        }
        section.push(element);
        true
    }

    /// Remove the element of `kind` referencing `url`.
    ///
    /// Returns `true` if an element was removed.
    pub fn remove(&self, kind: ResourceKind, url: &str) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let section = inner.section_mut(kind);
        let before = section.len();
        section.retain(|e| e.url != url);
        section.len() != before
    }

    /// Stylesheet URLs in insertion order.
    #[must_use]
    pub fn stylesheets(&self) -> Vec<String> {
        self.urls(ResourceKind::Stylesheet)
    }

    /// Script URLs in insertion order.
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        self.urls(ResourceKind::Script)
    }

    /// All elements, head first.
    #[must_use]
    pub fn elements(&self) -> Vec<Element> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.head.iter().chain(inner.body.iter()).cloned().collect()
    }

    /// Remove every element.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.head.clear();
        inner.body.clear();
    }

    /// Inject the document's elements into an HTML page.
    ///
    /// Stylesheets go right before the first `</head>`, scripts right before
    /// the first `</body>`. When a closing tag is missing the tags are appended
    /// to the end of the page instead.
    #[must_use]
    pub fn render_into(&self, html: &str) -> String {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let links = render_tags(&inner.head);
        let scripts = render_tags(&inner.body);
        drop(inner);

        let with_links = insert_before(html, "</head>", &links);
        insert_before(&with_links, "</body>", &scripts)
    }

    fn urls(&self, kind: ResourceKind) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.section(kind).iter().map(|e| e.url.clone()).collect()
    }
}

fn render_tags(elements: &[Element]) -> String {
    elements
        .iter()
        .map(|e| e.to_html())
        .collect::<Vec<_>>()
        .join("\n")
}

fn insert_before(html: &str, marker: &str, fragment: &str) -> String {
    if fragment.is_empty() {
        return html.to_owned();
    }
    match html.find(marker) {
        Some(idx) => {
            let (before, after) = html.split_at(idx);
            format!("{before}{fragment}\n{after}")
        },
        None => format!("{html}{fragment}\n"),
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_is_idempotent() {
        let doc = Document::new();
        assert!(doc.append(Element::script("a.js")));
        assert!(!doc.append(Element::script("a.js")));
        // Same URL but a different kind is a different element.
        assert!(doc.append(Element::stylesheet("a.js")));
        assert_eq!(doc.scripts(), vec!["a.js"]);
        assert_eq!(doc.stylesheets(), vec!["a.js"]);
    }

    #[test]
    fn test_remove() {
        let doc = Document::new();
        doc.append(Element::stylesheet("a.css"));
        assert!(doc.remove(ResourceKind::Stylesheet, "a.css"));
        assert!(!doc.remove(ResourceKind::Stylesheet, "a.css"));
        assert!(!doc.contains(ResourceKind::Stylesheet, "a.css"));
    }

    #[test]
    fn test_clones_share_elements() {
        let doc = Document::new();
        let other = doc.clone();
        other.append(Element::script("shared.js"));
        assert!(doc.contains(ResourceKind::Script, "shared.js"));
    }

    #[test]
    fn test_render_into_page() {
        let doc = Document::new();
        doc.append(Element::stylesheet("a.css"));
        doc.append(Element::script("a.js"));

        let html = "<html><head><title>t</title></head><body><p>hi</p></body></html>";
        let out = doc.render_into(html);

        let link = out.find("<link rel=\"stylesheet\" href=\"a.css\">").unwrap();
        let head_end = out.find("</head>").unwrap();
        let script = out.find("<script src=\"a.js\"></script>").unwrap();
        let body_end = out.find("</body>").unwrap();
        assert!(link < head_end);
        assert!(head_end < script);
        assert!(script < body_end);
    }

    #[test]
    fn test_render_without_closing_tags_appends() {
        let doc = Document::new();
        doc.append(Element::script("a.js"));
        let out = doc.render_into("<p>fragment</p>");
        assert_eq!(out, "<p>fragment</p><script src=\"a.js\"></script>\n");
    }

    #[test]
    fn test_render_empty_document_is_identity() {
        let html = "<html><head></head><body></body></html>";
        assert_eq!(Document::new().render_into(html), html);
    }

    #[test]
    fn test_attribute_escaping() {
        let tag = Element::script("a.js?x=1&y=\"2\"").to_html();
        assert_eq!(tag, "<script src=\"a.js?x=1&amp;y=&quot;2&quot;\"></script>");
    }
}
