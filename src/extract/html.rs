// src/extract/html.rs
// =============================================================================
// HTML parsing behind a small capability interface.
//
// The extractor does not care which parser it talks to. It only needs to ask
// two things of a parsed page:
// - did the markup parse into something we can walk?
// - what href values do its <a> elements carry, in document order?
//
// AnchorSource captures exactly that, and HtmlDocument implements it with the
// `scraper` crate (html5ever underneath, the same parser browsers follow).
// =============================================================================

use scraper::{Html, Selector};

use super::ExtractError;

// Anything that can list the anchor hrefs of a parsed page
pub trait AnchorSource {
    /// False when the markup could not be turned into a usable tree
    fn is_parseable(&self) -> bool;

    /// Raw href attribute values of every `<a href>`, in document order
    fn anchors(&self) -> Vec<String>;
}

// A page body parsed by scraper
pub struct HtmlDocument {
    document: Html,
    anchor_selector: Selector,
    lossy: bool,
}

impl HtmlDocument {
    // Parses raw response bytes
    //
    // Bodies that are not valid UTF-8 are decoded lossily instead of being
    // thrown away: a page with a stray Latin-1 byte in its footer still has
    // perfectly good links in it.
    pub fn parse(body: &[u8]) -> Result<Self, ExtractError> {
        let (text, lossy) = match std::str::from_utf8(body) {
            Ok(text) => (std::borrow::Cow::Borrowed(text), false),
            Err(_) => (String::from_utf8_lossy(body), true),
        };

        let anchor_selector = Selector::parse("a[href]").map_err(|_| ExtractError::Selector)?;

        Ok(Self {
            document: Html::parse_document(&text),
            anchor_selector,
            lossy,
        })
    }

    /// True when the body needed replacement characters to decode
    pub fn was_lossy(&self) -> bool {
        self.lossy
    }
}

impl AnchorSource for HtmlDocument {
    fn is_parseable(&self) -> bool {
        // html5ever recovers from almost anything, but it always hands back a
        // root <html> element when it succeeded in building a tree
        self.document.root_element().value().name() == "html"
    }

    fn anchors(&self) -> Vec<String> {
        self.document
            .select(&self.anchor_selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchors_in_document_order() {
        let doc = HtmlDocument::parse(
            br#"<a href="/b">B</a><p><a href="/a">A</a></p><a href="/b">B again</a>"#,
        )
        .unwrap();
        assert!(doc.is_parseable());
        assert_eq!(doc.anchors(), vec!["/b", "/a", "/b"]);
    }

    #[test]
    fn test_anchor_without_href_is_ignored() {
        let doc = HtmlDocument::parse(br#"<a name="top">Top</a><a href="">Self</a>"#).unwrap();
        assert_eq!(doc.anchors(), vec![""]);
    }

    #[test]
    fn test_other_elements_with_href_are_ignored() {
        let doc = HtmlDocument::parse(
            br#"<link rel="stylesheet" href="/style.css"><area href="/map"><a href="/page">P</a>"#,
        )
        .unwrap();
        assert_eq!(doc.anchors(), vec!["/page"]);
    }

    #[test]
    fn test_malformed_markup_still_parses() {
        let doc = HtmlDocument::parse(b"<div><a href='/x'>unclosed <b>tags").unwrap();
        assert!(doc.is_parseable());
        assert_eq!(doc.anchors(), vec!["/x"]);
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let mut body = b"<p>caf".to_vec();
        body.push(0xE9);
        body.extend_from_slice(b"</p><a href=\"/menu\">Menu</a>");

        let doc = HtmlDocument::parse(&body).unwrap();
        assert!(doc.was_lossy());
        assert_eq!(doc.anchors(), vec!["/menu"]);
    }
}
