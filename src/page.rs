// src/page.rs
// =============================================================================
// The record a fetcher hands us for every page it downloaded.
//
// We only ever read a FetchedPage. The caller owns it, and nothing here keeps
// a reference to it after a scrape call returns.
// =============================================================================

// One fetched page as seen by the link filter
//
// Fields:
//   requested_url: the URL the fetcher asked for
//   effective_url: the URL the content was actually served from (after redirects)
//   status: numeric HTTP status code
//   body: raw response bytes, None when the fetcher got no body at all
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub requested_url: String,
    pub effective_url: String,
    pub status: u16,
    pub body: Option<Vec<u8>>,
}

impl FetchedPage {
    /// Builds a page that was served from the URL it was requested at
    pub fn new(url: impl Into<String>, status: u16, body: Option<Vec<u8>>) -> Self {
        let url = url.into();
        Self {
            requested_url: url.clone(),
            effective_url: url,
            status,
            body,
        }
    }

    /// Records that the fetcher followed redirects to `effective_url`
    pub fn redirected_to(mut self, effective_url: impl Into<String>) -> Self {
        self.effective_url = effective_url.into();
        self
    }

    /// True when the body is missing or has zero bytes
    //
    // as_deref turns Option<Vec<u8>> into Option<&[u8]> without copying, and
    // map_or(true, ...) answers "empty" for None in the same expression
    pub fn body_is_empty(&self) -> bool {
        self.body.as_deref().map_or(true, |b| b.is_empty())
    }
}
