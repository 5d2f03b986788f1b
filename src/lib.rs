// src/lib.rs
// =============================================================================
// link-sieve: the link discovery and admission filter of a web crawler.
//
// Given one fetched page, produce the outbound links the crawler should queue:
//
//   scrape(page) = extract_next_links(page) filtered by Validator::is_valid
//
// Everything here is a pure function of its inputs. Nothing is fetched,
// nothing is deduplicated across calls, nothing is remembered.
//
// Modules:
// - page: the FetchedPage record handed to us by a fetcher
// - extract: pulls absolute, fragment-free links out of HTML
// - validate: scheme, domain, trap and extension checks
// - fetch: a reqwest fetcher adapter used by the CLI
// - logging: tracing subscriber setup for the CLI
// =============================================================================

pub mod extract;
pub mod fetch;
pub mod logging;
pub mod page;
pub mod validate;

use serde::Serialize;

pub use extract::extract_next_links;
pub use page::FetchedPage;
pub use validate::{Policy, RejectedLink, Rejection, Validator};

// Links of `page` that the validator admits, in document order
pub fn scrape(page: &FetchedPage, validator: &Validator) -> Vec<String> {
    extract_next_links(page)
        .into_iter()
        .filter(|link| validator.is_valid(link))
        .collect()
}

// Outcome of scraping one page, rejected links included
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub url: String,
    pub effective_url: String,
    pub status: u16,
    pub admitted: Vec<String>,
    pub rejected: Vec<RejectedLink>,
}

impl ScrapeReport {
    pub fn total(&self) -> usize {
        self.admitted.len() + self.rejected.len()
    }
}

// Like scrape, but also keeps every rejected link with its reason
pub fn scrape_with_report(page: &FetchedPage, validator: &Validator) -> ScrapeReport {
    let (admitted, rejected) = validator.partition(extract_next_links(page));

    tracing::debug!(
        url = %page.effective_url,
        admitted = admitted.len(),
        rejected = rejected.len(),
        "scraped page"
    );

    ScrapeReport {
        url: page.requested_url.clone(),
        effective_url: page.effective_url.clone(),
        status: page.status,
        admitted,
        rejected,
    }
}
