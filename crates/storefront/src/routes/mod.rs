//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check (in main)
//!
//! # Products
//! GET  /products               - Product listing (?category=&search=)
//! POST /products/sync          - Supplier re-sync, then re-fetch
//!
//! # Cart
//! GET  /cart                   - Cart contents
//! POST /cart/add               - Add to cart (returns count)
//! POST /cart/update            - Adjust quantity
//! POST /cart/remove            - Remove item
//! GET  /cart/count             - Cart count badge
//!
//! # Checkout
//! POST /checkout/begin         - Proceed to the checkout form
//! POST /checkout/back          - Back to cart review (form preserved)
//! POST /checkout/form          - Update form fields
//! POST /checkout/submit        - Validate and submit the order
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/sync", post(products::sync))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/begin", post(checkout::begin))
        .route("/back", post(checkout::back))
        .route("/form", post(checkout::form))
        .route("/submit", post(checkout::submit))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}
