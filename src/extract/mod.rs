// src/extract/mod.rs
// =============================================================================
// The link extractor: turns one fetched page into candidate links.
//
// Rules:
// - only 200 responses with a non-empty body are mined for links
// - every <a href> is resolved against the page's effective URL (the URL the
//   content was really served from, so redirects are honored)
// - the #fragment is dropped, everything else (query included) is kept
// - order is document order, duplicates are kept (the frontier dedupes)
//
// The extractor never fails its caller. Internally each step returns a
// Result, and extract_next_links turns any failure into "no links found".
// =============================================================================

mod html;

pub use html::{AnchorSource, HtmlDocument};

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::page::FetchedPage;

/// Status code of the only responses we mine for links
pub const STATUS_OK: u16 = 200;

// Reasons extraction can give up on a page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("effective URL '{url}' is not a valid base URL: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("anchor selector failed to compile")]
    Selector,
    #[error("markup could not be parsed into a document")]
    Unparseable,
}

// Extracts every candidate link from a page
//
// Returns an empty Vec for non-200 responses, empty bodies, and any parse
// failure. Never panics, never returns an error.
pub fn extract_next_links(page: &FetchedPage) -> Vec<String> {
    match try_extract(page) {
        Ok(links) => links,
        Err(e) => {
            debug!(url = %page.effective_url, error = %e, "link extraction failed, treating page as linkless");
            Vec::new()
        }
    }
}

// Same as extract_next_links but keeps the failure visible
//
// A non-200 status or a missing body is not a failure: there is simply
// nothing to extract, so those come back as Ok(empty).
pub fn try_extract(page: &FetchedPage) -> Result<Vec<String>, ExtractError> {
    if page.status != STATUS_OK {
        return Ok(Vec::new());
    }

    // Some(body) if ... is a match guard: the arm only matches a non-empty body
    let body = match page.body.as_deref() {
        Some(body) if !body.is_empty() => body,
        _ => return Ok(Vec::new()),
    };

    let base = Url::parse(&page.effective_url).map_err(|source| ExtractError::InvalidBaseUrl {
        url: page.effective_url.clone(),
        source,
    })?;

    let document = HtmlDocument::parse(body)?;
    if document.was_lossy() {
        debug!(url = %page.effective_url, "body is not valid UTF-8, decoded lossily");
    }

    links_from(&document, &base)
}

// Resolves the anchors of any AnchorSource against `base`
//
// Hrefs that cannot be resolved into a URL at all are skipped one by one;
// they don't spoil the rest of the page.
//
// Rust concepts:
// - S: AnchorSource is a generic bound, so HtmlDocument and test doubles
//   both work without dynamic dispatch
// - ?Sized relaxes the implicit "size known at compile time" bound, which
//   lets callers pass a &dyn AnchorSource too
// - filter_map keeps the Some values and drops the None ones in one pass
pub fn links_from<S>(source: &S, base: &Url) -> Result<Vec<String>, ExtractError>
where
    S: AnchorSource + ?Sized,
{
    if !source.is_parseable() {
        return Err(ExtractError::Unparseable);
    }

    Ok(source
        .anchors()
        .iter()
        .filter_map(|href| resolve_link(base, href))
        .collect())
}

// Joins `href` onto `base` and strips the fragment
//
// Examples (base = "http://www.ics.uci.edu/dir/index.html"):
//   "../about"            -> "http://www.ics.uci.edu/about"
//   "/x#section"          -> "http://www.ics.uci.edu/x"
//   "?q=1#top"            -> "http://www.ics.uci.edu/dir/index.html?q=1"
//   "https://other.org/"  -> "https://other.org/"
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let mut url = match base.join(href) {
        Ok(url) => url,
        Err(e) => {
            debug!(%base, href, error = %e, "skipping unresolvable href");
            return None;
        }
    };
    url.set_fragment(None);
    // Url implements Into<String>, which hands over its buffer without copying
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, status: u16, html: &str) -> FetchedPage {
        FetchedPage::new(url, status, Some(html.as_bytes().to_vec()))
    }

    struct BrokenSource;

    impl AnchorSource for BrokenSource {
        fn is_parseable(&self) -> bool {
            false
        }

        fn anchors(&self) -> Vec<String> {
            vec!["/never".to_string()]
        }
    }

    #[test]
    fn test_fragment_is_stripped() {
        let links = extract_next_links(&page(
            "https://www.ics.uci.edu/",
            200,
            r#"<a href="/x#section">X</a>"#,
        ));
        assert_eq!(links, vec!["https://www.ics.uci.edu/x"]);
    }

    #[test]
    fn test_relative_resolution_against_effective_url() {
        let links = extract_next_links(&page(
            "http://www.ics.uci.edu/dir/index.html",
            200,
            r#"<a href="../about">About</a>"#,
        ));
        assert_eq!(links, vec!["http://www.ics.uci.edu/about"]);
    }

    #[test]
    fn test_redirect_target_is_the_base() {
        let page = page(
            "http://ics.uci.edu/old/",
            200,
            r#"<a href="people.html">People</a>"#,
        )
        .redirected_to("https://www.ics.uci.edu/new/");

        assert_eq!(
            extract_next_links(&page),
            vec!["https://www.ics.uci.edu/new/people.html"]
        );
    }

    #[test]
    fn test_query_string_is_kept() {
        let links = extract_next_links(&page(
            "https://www.ics.uci.edu/search",
            200,
            r#"<a href="?q=rust&page=2#results">Next</a>"#,
        ));
        assert_eq!(links, vec!["https://www.ics.uci.edu/search?q=rust&page=2"]);
    }

    #[test]
    fn test_order_and_duplicates_are_preserved() {
        let links = extract_next_links(&page(
            "https://www.ics.uci.edu/",
            200,
            r#"
                <a href="/b">B</a>
                <a href="/a">A</a>
                <a href="/b#again">B</a>
                <a href="mailto:someone@uci.edu">Mail</a>
            "#,
        ));
        assert_eq!(
            links,
            vec![
                "https://www.ics.uci.edu/b",
                "https://www.ics.uci.edu/a",
                "https://www.ics.uci.edu/b",
                "mailto:someone@uci.edu",
            ]
        );
    }

    #[test]
    fn test_non_200_returns_nothing() {
        let links = extract_next_links(&page(
            "https://www.ics.uci.edu/missing",
            404,
            r#"<a href="/home">Home</a>"#,
        ));
        assert!(links.is_empty());
    }

    #[test]
    fn test_redirect_status_returns_nothing() {
        let links = extract_next_links(&page(
            "https://www.ics.uci.edu/moved",
            301,
            r#"<a href="/new">New</a>"#,
        ));
        assert!(links.is_empty());
    }

    #[test]
    fn test_missing_or_empty_body_returns_nothing() {
        assert!(extract_next_links(&FetchedPage::new("https://www.ics.uci.edu/", 200, None)).is_empty());
        assert!(extract_next_links(&page("https://www.ics.uci.edu/", 200, "")).is_empty());
    }

    #[test]
    fn test_invalid_effective_url_degrades_to_empty() {
        let page = page("not a url", 200, r#"<a href="/x">X</a>"#);
        assert!(matches!(
            try_extract(&page),
            Err(ExtractError::InvalidBaseUrl { .. })
        ));
        assert!(extract_next_links(&page).is_empty());
    }

    #[test]
    fn test_unparseable_source_is_an_error() {
        let base = Url::parse("https://www.ics.uci.edu/").unwrap();
        assert!(matches!(
            links_from(&BrokenSource, &base),
            Err(ExtractError::Unparseable)
        ));
    }

    #[test]
    fn test_unresolvable_href_is_skipped() {
        let links = extract_next_links(&page(
            "https://www.ics.uci.edu/",
            200,
            r#"<a href="http://[broken/">Bad</a><a href="/good">Good</a>"#,
        ));
        assert_eq!(links, vec!["https://www.ics.uci.edu/good"]);
    }
}
