// src/fetch/http.rs
// =============================================================================
// Downloads pages with reqwest and packs them into FetchedPage records.
//
// This is deliberately thin. It follows redirects (so the effective URL is
// known), keeps whatever status the server answered with, and hands the raw
// body bytes through untouched. Deciding what a 404 means is the extractor's
// job, not ours.
//
// Rust concepts:
// - async/await: network I/O without blocking a thread per request
// - Streams: buffered runs a bounded number of fetches at once
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, warn};

use crate::page::FetchedPage;

/// Redirect hops followed before a fetch is abandoned
pub const MAX_REDIRECTS: usize = 10;

// Builds the HTTP client shared by every fetch
//
// Client is reference counted internally, so cloning it per task is cheap
// and keeps connection pooling shared.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .user_agent(concat!("link-sieve/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to create HTTP client")
}

// Fetches one page
//
// Any HTTP status is a successful fetch here. Only transport failures
// (DNS, connect, timeout, too many redirects, body read) are errors.
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;

    let status = response.status().as_u16();
    let effective_url = response.url().to_string();
    if effective_url != url {
        debug!(requested = url, effective = %effective_url, "followed redirect");
    }

    let body = response
        .bytes()
        .await
        .with_context(|| format!("failed to read body of {}", url))?;

    Ok(FetchedPage::new(url, status, Some(body.to_vec())).redirected_to(effective_url))
}

// Fetches many pages, at most `concurrency` at a time
//
// Results come back in the same order as `urls`, each paired with the URL
// that was asked for. A slow first page holds back the ones after it, but
// output for the same command line is always listed the same way.
pub async fn fetch_pages(
    client: &Client,
    urls: Vec<String>,
    concurrency: usize,
) -> Vec<(String, Result<FetchedPage>)> {
    let futures = urls.into_iter().map(|url| {
        let client = client.clone();
        async move {
            let result = fetch_page(&client, &url).await;
            if let Err(e) = &result {
                let message = format!("{:#}", e);
                warn!(%url, error = %message, "fetch failed");
            }
            (url, result)
        }
    });

    stream::iter(futures)
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        build_client(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_keeps_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/next">Next</a>"#)
            .create_async()
            .await;

        let url = format!("{}/page", server.url());
        let page = fetch_page(&client(), &url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.status, 200);
        assert_eq!(page.requested_url, url);
        assert_eq!(page.effective_url, url);
        assert_eq!(page.body.as_deref(), Some(&br#"<a href="/next">Next</a>"#[..]));
    }

    #[tokio::test]
    async fn test_redirect_sets_effective_url() {
        let mut server = mockito::Server::new_async().await;
        let _old = server
            .mock("GET", "/old")
            .with_status(301)
            .with_header("location", "/new/")
            .create_async()
            .await;
        let _new = server
            .mock("GET", "/new/")
            .with_status(200)
            .with_body("<p>moved</p>")
            .create_async()
            .await;

        let url = format!("{}/old", server.url());
        let page = fetch_page(&client(), &url).await.unwrap();

        assert_eq!(page.requested_url, url);
        assert_eq!(page.effective_url, format!("{}/new/", server.url()));
        assert_eq!(page.status, 200);
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone")
            .with_status(404)
            .with_body("<a href='/home'>Home</a>")
            .create_async()
            .await;

        let page = fetch_page(&client(), &format!("{}/gone", server.url()))
            .await
            .unwrap();
        assert_eq!(page.status, 404);
    }

    #[tokio::test]
    async fn test_fetch_pages_returns_every_url() {
        let mut server = mockito::Server::new_async().await;
        let _a = server.mock("GET", "/a").with_status(200).create_async().await;
        let _b = server.mock("GET", "/b").with_status(500).create_async().await;

        let urls = vec![format!("{}/b", server.url()), format!("{}/a", server.url())];
        let results = fetch_pages(&client(), urls.clone(), 2).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, urls[0]);
        assert_eq!(results[1].0, urls[1]);
        assert_eq!(results[0].1.as_ref().unwrap().status, 500);
        assert_eq!(results[1].1.as_ref().unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_fetch_pages_keeps_input_order() {
        let mut server = mockito::Server::new_async().await;
        let mut urls = Vec::new();
        let mut mocks = Vec::new();
        for i in 0..6 {
            let path = format!("/p{}", i);
            mocks.push(server.mock("GET", path.as_str()).with_status(200).create_async().await);
            urls.push(format!("{}{}", server.url(), path));
        }

        let results = fetch_pages(&client(), urls.clone(), 4).await;
        let returned: Vec<String> = results.into_iter().map(|(url, _)| url).collect();
        assert_eq!(returned, urls);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let result = fetch_page(&client(), "http://127.0.0.1:1/").await;
        assert!(result.is_err());
    }
}
