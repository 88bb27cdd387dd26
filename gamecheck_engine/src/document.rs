//! Parsed HTML document handed to the extractor.

use scraper::{ElementRef, Html, Selector};

/// A parsed page. Thin wrapper over [`scraper::Html`] that adds the text
/// helpers every lookup strategy needs.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Parses an HTML fragment, e.g. a single search-result card.
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
        }
    }

    /// Access to the underlying tree for custom lookups.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// All elements matching `selector`, in document order.
    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
        self.html.select(selector)
    }

    /// Whitespace-collapsed text of the whole document (body when present).
    pub fn text(&self) -> String {
        let root = self.html.root_element();
        let body = Selector::parse("body")
            .ok()
            .and_then(|sel| root.select(&sel).next());
        element_text(body.unwrap_or(root))
    }
}

/// Text content of an element with runs of whitespace collapsed to one
/// space. Script and style contents are skipped.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let inside_code = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript"))
        });
        if inside_code {
            continue;
        }
        for word in text.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_collapses_whitespace() {
        let doc = Document::parse("<html><body><p>  Main\n Story </p><p>12   Hours</p></body></html>");
        assert_eq!(doc.text(), "Main Story 12 Hours");
    }

    #[test]
    fn text_skips_scripts() {
        let doc = Document::parse(
            "<html><body><script>var x = '99 Hours';</script><span>5 Hours</span></body></html>",
        );
        assert_eq!(doc.text(), "5 Hours");
    }

    #[test]
    fn fragment_text() {
        let doc = Document::parse_fragment("<div><span>$19.99</span></div>");
        assert_eq!(doc.text(), "$19.99");
    }
}
