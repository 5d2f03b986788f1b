// src/fetch/mod.rs
// =============================================================================
// Fetcher adapter: live HTTP responses -> FetchedPage.
//
// The link filter itself never touches the network. This module exists so the
// CLI can run the filter against real pages end to end. It does no retries,
// no robots.txt and no rate limiting; a real crawler brings its own fetcher.
// =============================================================================

mod http;

pub use http::{build_client, fetch_page, fetch_pages, MAX_REDIRECTS};
