//! Catalog products and the session-held catalog view.
//!
//! The view tracks which products are currently displayed, the active
//! filter, and a request sequence number used to discard stale fetch
//! responses: only the response matching the latest issued fetch is ever
//! applied, so a slow reply for an old filter can never overwrite a newer
//! list.

use autoparts_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::request::RequestState;

/// A product as returned by the catalog API.
///
/// Immutable once fetched; the whole list is replaced on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub article: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    pub category: String,
    #[serde(rename = "inStock", default)]
    pub in_stock: bool,
    /// Units on hand at the supplier, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

/// Catalog query filter. Category and search are independent and combine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl CatalogFilter {
    /// Build a filter, treating empty strings as absent.
    #[must_use]
    pub fn new(category: Option<String>, search: Option<String>) -> Self {
        Self {
            category: category.filter(|s| !s.is_empty()),
            search: search.filter(|s| !s.is_empty()),
        }
    }

    /// Whether this filter selects the whole catalog.
    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        self.category.is_none() && self.search.is_none()
    }
}

/// Session-held view of the catalog.
///
/// Owns the displayed product list. Fetches are applied through
/// [`begin_fetch`](Self::begin_fetch) / [`apply_success`](Self::apply_success)
/// so that completions arriving out of order cannot corrupt the view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogView {
    products: Vec<Product>,
    filter: CatalogFilter,
    request: RequestState,
    last_issued: u64,
}

impl CatalogView {
    /// Record that a fetch for `filter` has been issued.
    ///
    /// Returns the sequence number identifying this fetch; pass it back to
    /// [`apply_success`](Self::apply_success) or
    /// [`apply_failure`](Self::apply_failure) when the response arrives.
    pub fn begin_fetch(&mut self, filter: CatalogFilter) -> u64 {
        self.filter = filter;
        self.last_issued += 1;
        self.request = RequestState::InFlight;
        self.last_issued
    }

    /// Apply a successful fetch response.
    ///
    /// The product list is replaced wholesale. Returns `false` (and leaves
    /// the view untouched) if a newer fetch has been issued since `seq`.
    pub fn apply_success(&mut self, seq: u64, products: Vec<Product>) -> bool {
        if seq != self.last_issued {
            tracing::debug!(seq, latest = self.last_issued, "ignoring stale catalog response");
            return false;
        }
        self.products = products;
        self.request = RequestState::Succeeded;
        true
    }

    /// Record a failed fetch. The displayed product list is never modified
    /// on failure. Returns `false` if the failure is stale.
    pub fn apply_failure(&mut self, seq: u64) -> bool {
        if seq != self.last_issued {
            tracing::debug!(seq, latest = self.last_issued, "ignoring stale catalog failure");
            return false;
        }
        self.request = RequestState::Failed;
        true
    }

    /// The currently displayed products.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The currently active filter.
    #[must_use]
    pub const fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    /// State of the most recent fetch.
    #[must_use]
    pub const fn request(&self) -> RequestState {
        self.request
    }

    /// Look up a displayed product by id.
    #[must_use]
    pub fn find_product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Part {id}"),
            article: format!("ART-{id}"),
            price: Decimal::from(100),
            image: "/placeholder.svg".to_string(),
            category: category.to_string(),
            in_stock: true,
            quantity: None,
            manufacturer: None,
            supplier: None,
        }
    }

    #[test]
    fn test_fetch_replaces_list_wholesale() {
        let mut view = CatalogView::default();

        let seq = view.begin_fetch(CatalogFilter::new(Some("Двигатель".to_string()), None));
        assert!(view.apply_success(
            seq,
            vec![
                product(1, "Двигатель"),
                product(2, "Двигатель"),
                product(3, "Двигатель")
            ]
        ));
        assert_eq!(view.products().len(), 3);

        let seq = view.begin_fetch(CatalogFilter::new(Some("Подвеска".to_string()), None));
        assert!(view.apply_success(seq, vec![product(4, "Подвеска"), product(5, "Подвеска")]));

        // The second response replaces the first, it is not merged
        assert_eq!(view.products().len(), 2);
        assert!(view.products().iter().all(|p| p.category == "Подвеска"));
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut view = CatalogView::default();

        let old_seq = view.begin_fetch(CatalogFilter::new(Some("Двигатель".to_string()), None));
        let new_seq = view.begin_fetch(CatalogFilter::new(Some("Подвеска".to_string()), None));

        // The newer request completes first
        assert!(view.apply_success(new_seq, vec![product(4, "Подвеска")]));

        // The superseded response arrives late and must not win
        assert!(!view.apply_success(old_seq, vec![product(1, "Двигатель")]));
        assert_eq!(view.products().len(), 1);
        assert_eq!(view.products().first().unwrap().category, "Подвеска");
        assert_eq!(view.request(), RequestState::Succeeded);
    }

    #[test]
    fn test_failure_leaves_previous_list() {
        let mut view = CatalogView::default();

        let seq = view.begin_fetch(CatalogFilter::default());
        assert!(view.apply_success(seq, vec![product(1, "Двигатель")]));

        let seq = view.begin_fetch(CatalogFilter::new(None, Some("ГРМ".to_string())));
        assert!(view.apply_failure(seq));

        assert_eq!(view.products().len(), 1);
        assert_eq!(view.request(), RequestState::Failed);
    }

    #[test]
    fn test_stale_failure_does_not_mark_failed() {
        let mut view = CatalogView::default();

        let old_seq = view.begin_fetch(CatalogFilter::default());
        let new_seq = view.begin_fetch(CatalogFilter::default());

        assert!(view.apply_success(new_seq, vec![product(1, "Кузов")]));
        assert!(!view.apply_failure(old_seq));
        assert_eq!(view.request(), RequestState::Succeeded);
    }

    #[test]
    fn test_filter_normalizes_empty_strings() {
        let filter = CatalogFilter::new(Some(String::new()), Some(String::new()));
        assert!(filter.is_unfiltered());

        let filter = CatalogFilter::new(Some("Салон".to_string()), None);
        assert!(!filter.is_unfiltered());
    }

    #[test]
    fn test_product_deserializes_wire_shape() {
        let json = r#"{
            "id": 7,
            "name": "Тормозной диск",
            "article": "BD-1042",
            "price": 3450.0,
            "image": "/images/bd-1042.jpg",
            "category": "Тормозная система",
            "inStock": true,
            "quantity": 12,
            "manufacturer": "Brembo",
            "supplier": "Главпоставка"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(7));
        assert!(product.in_stock);
        assert_eq!(product.quantity, Some(12));
        assert_eq!(product.price, Decimal::from(3450));
    }

    #[test]
    fn test_product_defaults_for_missing_optionals() {
        let json = r#"{
            "id": 1,
            "name": "Свеча зажигания",
            "article": "SP-300",
            "price": 250,
            "category": "Двигатель"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(!product.in_stock);
        assert!(product.image.is_empty());
        assert!(product.manufacturer.is_none());
    }
}
