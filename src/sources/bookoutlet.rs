//! BookOutlet catalog implementation.

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use url::Url;

use crate::models::{CandidateBuilder, CandidateRecord, Query};
use crate::sources::{Catalog, CatalogError};
use crate::utils::{catalog_retry_config, with_retry, HttpClient, RetryConfig};

const BOOKOUTLET_BASE_URL: &str = "https://bookoutlet.ca";

/// How far above a cover image to look for its product link and price
const MAX_CARD_DEPTH: usize = 5;

static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s?\d+(?:\.\d{2})?").expect("valid price regex"));

/// BookOutlet catalog
///
/// BookOutlet has no public API. Search results are scraped from the browse
/// page: every product card carries a cover image whose `alt` text is the
/// book title.
#[derive(Debug, Clone)]
pub struct BookOutletCatalog {
    client: Arc<HttpClient>,
    base_url: Url,
    retry: RetryConfig,
}

impl BookOutletCatalog {
    pub fn new() -> Result<Self, CatalogError> {
        Self::with_base_url(BOOKOUTLET_BASE_URL)
    }

    /// Point the catalog at another host (used for tests and mirrors)
    pub fn with_base_url(base_url: &str) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::Other(format!("Invalid base URL {base_url}: {e}")))?;

        Ok(Self {
            client: Arc::new(HttpClient::new()?),
            base_url,
            retry: catalog_retry_config(),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn search_url(&self, title: &str) -> String {
        format!(
            "{}/browse?qf=All&q={}",
            self.base_url.as_str().trim_end_matches('/'),
            urlencoding::encode(title)
        )
    }
}

#[async_trait]
impl Catalog for BookOutletCatalog {
    fn id(&self) -> &str {
        "bookoutlet"
    }

    fn name(&self) -> &str {
        "BookOutlet"
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<CandidateRecord>, CatalogError> {
        let url = self.search_url(query.title());
        tracing::debug!("Searching BookOutlet: {}", url);

        let client = Arc::clone(&self.client);
        let html = with_retry(self.retry, || {
            let client = Arc::clone(&client);
            let url = url.clone();
            async move {
                let response = client
                    .get(&url)
                    .header("Accept", "text/html")
                    .send()
                    .await
                    .map_err(|e| CatalogError::Network(format!("Failed to search BookOutlet: {e}")))?;

                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(CatalogError::RateLimit);
                }
                if !status.is_success() {
                    return Err(CatalogError::Api(format!(
                        "BookOutlet returned status: {status}"
                    )));
                }

                response
                    .text()
                    .await
                    .map_err(|e| CatalogError::Parse(format!("Failed to read HTML: {e}")))
            }
        })
        .await?;

        let candidates = parse_candidates(&html, &self.base_url);
        tracing::debug!(
            "BookOutlet listed {} titles for '{}'",
            candidates.len(),
            query.title()
        );
        Ok(candidates)
    }
}

/// Extract candidates from a BookOutlet results page
///
/// One candidate per distinct cover `alt` text, in page order. Relative links
/// are resolved against `base`.
pub(crate) fn parse_candidates(html: &str, base: &Url) -> Vec<CandidateRecord> {
    let document = Html::parse_document(html);
    let Ok(image_selector) = Selector::parse("img[alt]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for image in document.select(&image_selector) {
        let title = image
            .value()
            .attr("alt")
            .map(str::trim)
            .unwrap_or_default();
        if title.is_empty() || !seen.insert(title.to_string()) {
            continue;
        }

        let mut builder = CandidateBuilder::new(title);
        if let Some(src) = image.value().attr("src").and_then(|s| resolve(base, s)) {
            builder = builder.cover_url(src);
        }
        if let Some(href) = product_link(&image).and_then(|h| resolve(base, h)) {
            builder = builder.url(href);
        }
        if let Some(price) = card_price(&image) {
            builder = builder.price(price);
        }
        candidates.push(builder.build());
    }

    candidates
}

fn card_ancestors<'a>(image: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    image
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(MAX_CARD_DEPTH)
}

fn product_link<'a>(image: &ElementRef<'a>) -> Option<&'a str> {
    card_ancestors(image)
        .find(|el| el.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
}

fn card_price(image: &ElementRef<'_>) -> Option<String> {
    card_ancestors(image).find_map(|el| {
        let text = el.text().collect::<String>();
        PRICE
            .find(&text)
            .map(|m| m.as_str().replace(char::is_whitespace, ""))
    })
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <header><img src="/logo.svg" alt=""></header>
          <div class="product-card">
            <a href="/products/dune-frank-herbert">
              <img src="https://images.bookoutlet.ca/dune.jpg" alt="Dune">
            </a>
            <div class="details"><span class="price">$ 9.99</span></div>
          </div>
          <div class="product-card">
            <a href="/products/dune-messiah">
              <img src="/covers/messiah.jpg" alt="Dune Messiah">
            </a>
            <span class="price">$7.49</span>
          </div>
          <div class="product-card">
            <a href="/products/dune-duplicate"><img src="/covers/dune2.jpg" alt="Dune"></a>
          </div>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse(BOOKOUTLET_BASE_URL).unwrap()
    }

    #[test]
    fn test_parse_candidates() {
        let candidates = parse_candidates(RESULTS_PAGE, &base());

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Dune");
        assert_eq!(
            candidates[0].url.as_deref(),
            Some("https://bookoutlet.ca/products/dune-frank-herbert")
        );
        assert_eq!(
            candidates[0].cover_url.as_deref(),
            Some("https://images.bookoutlet.ca/dune.jpg")
        );
        assert_eq!(candidates[0].price.as_deref(), Some("$9.99"));

        assert_eq!(candidates[1].title, "Dune Messiah");
        assert_eq!(
            candidates[1].cover_url.as_deref(),
            Some("https://bookoutlet.ca/covers/messiah.jpg")
        );
        assert_eq!(candidates[1].price.as_deref(), Some("$7.49"));
    }

    #[test]
    fn test_parse_page_without_products() {
        assert!(parse_candidates("<html><body><p>No results</p></body></html>", &base()).is_empty());
        assert!(parse_candidates("", &base()).is_empty());
    }

    #[test]
    fn test_search_url_encodes_title() {
        let catalog = BookOutletCatalog::new().unwrap();
        assert_eq!(
            catalog.search_url("Ender's Game & More"),
            "https://bookoutlet.ca/browse?qf=All&q=Ender%27s%20Game%20%26%20More"
        );
    }

    #[tokio::test]
    async fn test_fetch_from_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/browse")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("qf".into(), "All".into()),
                mockito::Matcher::UrlEncoded("q".into(), "Dune".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(RESULTS_PAGE)
            .create_async()
            .await;

        let catalog = BookOutletCatalog::with_base_url(&server.url()).unwrap();
        let candidates = catalog.fetch(&Query::new("Dune").unwrap()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0]
            .url
            .as_deref()
            .unwrap()
            .starts_with(&server.url()));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/browse")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let catalog = BookOutletCatalog::with_base_url(&server.url())
            .unwrap()
            .with_retry_config(RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(5),
                max_delay: Duration::from_millis(10),
                backoff_multiplier: 2.0,
                max_total_time: Duration::from_secs(5),
            });
        let result = catalog.fetch(&Query::new("Dune").unwrap()).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(CatalogError::Api(_))));
    }
}
