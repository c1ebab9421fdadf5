//! Utility modules supporting catalog access.
//!
//! - [`HttpClient`]: shared reqwest client with timeouts and a browser-style agent
//! - [`RetryConfig`]: configuration for retry logic with exponential backoff
//! - [`with_retry`]: execute a request with automatic retry on transient errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use shelf_match::sources::CatalogError;
//! use shelf_match::utils::{catalog_retry_config, with_retry, HttpClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), CatalogError> {
//! let client = HttpClient::new()?;
//! let body = with_retry(catalog_retry_config(), || {
//!     let client = client.clone();
//!     async move { Ok(client.get("https://bookoutlet.ca").send().await?.text().await?) }
//! })
//! .await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::HttpClient;
pub use retry::{catalog_retry_config, with_retry, RetryConfig, TransientError};
