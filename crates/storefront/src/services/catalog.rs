//! Product catalog API client.
//!
//! Reads the product list (optionally filtered by category and/or free-text
//! search) and triggers supplier re-sync. Unfiltered reads are cached
//! briefly with `moka`; filtered reads always go to the backend.

use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CatalogConfig;
use crate::models::catalog::{CatalogFilter, Product};

/// Cache TTL for unfiltered product reads.
const CACHE_TTL_SECONDS: u64 = 60;

/// Errors that can occur reading the catalog.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Summary returned by the supplier sync endpoint. Informational only; it
/// never alters local state directly.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSummary {
    #[serde(default)]
    pub message: Option<String>,
    /// Number of products touched by the sync.
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Client for the product catalog API.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, Vec<Product>>,
}

impl CatalogClient {
    /// Create a new catalog API client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECONDS))
            .build();

        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            cache,
        }
    }

    /// Fetch the product list for `filter`.
    ///
    /// The returned list is intended to replace any previously displayed
    /// list wholesale; on error the caller keeps its previous list.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure, non-success status, or
    /// an unparseable body.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self, filter: &CatalogFilter) -> Result<Vec<Product>, FetchError> {
        let url = products_url(&self.base_url, filter);

        let cacheable = filter.is_unfiltered();
        if cacheable
            && let Some(products) = self.cache.get(&url).await
        {
            debug!("cache hit for products");
            return Ok(products);
        }

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ProductsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        if cacheable {
            self.cache.insert(url, body.products.clone()).await;
        }

        Ok(body.products)
    }

    /// Trigger a supplier re-sync on the backend.
    ///
    /// On success the caller should follow up with a fresh
    /// [`fetch_products`](Self::fetch_products) using the active filter so
    /// the view reflects updated prices and stock.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure, non-success status, or
    /// an unparseable body.
    #[instrument(skip(self))]
    pub async fn sync_catalog(&self) -> Result<SyncSummary, FetchError> {
        let url = format!("{}/sync", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let summary: SyncSummary = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        // Cached lists are outdated after a sync
        self.cache.invalidate_all();

        Ok(summary)
    }
}

/// Wrapper for the product listing response. A missing `products` field is
/// an empty list.
#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<Product>,
}

/// Build the product listing URL for `filter`. Category and search are
/// independent and combine; values are percent-encoded.
fn products_url(base: &str, filter: &CatalogFilter) -> String {
    let mut params = Vec::new();
    if let Some(category) = filter.category.as_deref() {
        params.push(format!("category={}", urlencoding::encode(category)));
    }
    if let Some(search) = filter.search.as_deref() {
        params.push(format!("search={}", urlencoding::encode(search)));
    }

    if params.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", params.join("&"))
    }
}
