//! Product route handlers.
//!
//! The displayed product list lives in the session's [`CatalogView`]; every
//! listing request issues a fresh fetch against the backend and applies the
//! response through the view's sequence gate, so a stale completion can
//! never overwrite a newer list.

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use autoparts_core::{Price, ProductId};

use crate::error::Result;
use crate::models::catalog::{CatalogFilter, CatalogView, Product};
use crate::models::session::keys;
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub article: String,
    pub price: Decimal,
    pub price_display: String,
    pub image: String,
    pub category: String,
    pub in_stock: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            article: product.article.clone(),
            price: product.price,
            price_display: Price::rub(product.price).display(),
            image: product.image.clone(),
            category: product.category.clone(),
            in_stock: product.in_stock,
        }
    }
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub products: Vec<ProductView>,
    pub count: usize,
    /// User-visible notice when the fetch failed; the products shown are
    /// the previous list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl CatalogPage {
    fn from_view(view: &CatalogView, notice: Option<String>) -> Self {
        let products: Vec<ProductView> = view.products().iter().map(ProductView::from).collect();
        Self {
            count: products.len(),
            products,
            notice,
        }
    }
}

/// Supplier sync response.
#[derive(Debug, Serialize)]
pub struct SyncPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<i64>,
    /// Backend-reported completion time, passed through verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub catalog: CatalogPage,
}

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the catalog view from the session, defaulting to an empty view.
pub(crate) async fn load_catalog(session: &Session) -> Result<CatalogView> {
    Ok(session
        .get::<CatalogView>(keys::CATALOG)
        .await?
        .unwrap_or_default())
}

/// Store the catalog view in the session.
pub(crate) async fn store_catalog(session: &Session, view: &CatalogView) -> Result<()> {
    session.insert(keys::CATALOG, view).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// List products for the requested filter.
///
/// A fetch failure is non-fatal: the previous list is kept and a notice is
/// attached for the UI's empty-state message.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogPage>> {
    let filter = CatalogFilter::new(query.category, query.search);

    let mut view = load_catalog(&session).await?;
    let seq = view.begin_fetch(filter);

    let page = match state.catalog().fetch_products(view.filter()).await {
        Ok(products) => {
            view.apply_success(seq, products);
            CatalogPage::from_view(&view, None)
        }
        Err(e) => {
            tracing::warn!("Failed to fetch products: {e}");
            view.apply_failure(seq);
            CatalogPage::from_view(&view, Some("Failed to load products".to_string()))
        }
    };

    store_catalog(&session, &view).await?;
    Ok(Json(page))
}

/// Trigger a supplier re-sync, then re-fetch with the active filter.
#[instrument(skip(state, session))]
pub async fn sync(State(state): State<AppState>, session: Session) -> Result<Json<SyncPage>> {
    let summary = state.catalog().sync_catalog().await?;

    let mut view = load_catalog(&session).await?;
    let filter = view.filter().clone();
    let seq = view.begin_fetch(filter);

    let catalog = match state.catalog().fetch_products(view.filter()).await {
        Ok(products) => {
            view.apply_success(seq, products);
            CatalogPage::from_view(&view, None)
        }
        Err(e) => {
            tracing::warn!("Failed to re-fetch products after sync: {e}");
            view.apply_failure(seq);
            CatalogPage::from_view(&view, Some("Failed to load products".to_string()))
        }
    };

    store_catalog(&session, &view).await?;
    Ok(Json(SyncPage {
        message: summary.message,
        updated: summary.updated,
        timestamp: summary.timestamp,
        catalog,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sync_page_forwards_all_summary_fields() {
        let page = SyncPage {
            message: Some("Синхронизация завершена успешно".to_string()),
            updated: Some(42),
            timestamp: Some("2026-08-24T10:00:00Z".to_string()),
            catalog: CatalogPage {
                products: Vec::new(),
                count: 0,
                notice: None,
            },
        };

        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value.get("message").unwrap(), "Синхронизация завершена успешно");
        assert_eq!(value.get("updated").unwrap(), &json!(42));
        assert_eq!(value.get("timestamp").unwrap(), "2026-08-24T10:00:00Z");
    }

    #[test]
    fn test_sync_page_omits_absent_fields() {
        let page = SyncPage {
            message: None,
            updated: None,
            timestamp: None,
            catalog: CatalogPage {
                products: Vec::new(),
                count: 0,
                notice: None,
            },
        };

        let value = serde_json::to_value(&page).unwrap();
        assert!(value.get("timestamp").is_none());
        assert!(value["catalog"].get("notice").is_none());
    }
}
