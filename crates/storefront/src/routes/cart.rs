//! Cart route handlers.
//!
//! The cart and the checkout flow are both session state; every mutation
//! holds the session's mutation lock, loads them, applies the domain
//! operation, and stores them back before responding. Cart mutations also
//! resync the checkout flow so an emptied cart drops any half-filled form.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use autoparts_core::{Price, ProductId};

use crate::error::{AppError, Result};
use crate::models::cart::{Cart, LineItem};
use crate::models::checkout::{CheckoutFlow, CheckoutStage};
use crate::models::session::keys;
use crate::state::AppState;

use super::products::load_catalog;

/// A cart line as shown to the client.
#[derive(Debug, Serialize)]
pub struct LineItemView {
    pub product_id: ProductId,
    pub name: String,
    pub article: String,
    pub price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
    pub line_total_display: String,
}

impl From<&LineItem> for LineItemView {
    fn from(item: &LineItem) -> Self {
        let line_total = item.line_total();
        Self {
            product_id: item.product.id,
            name: item.product.name.clone(),
            article: item.product.article.clone(),
            price: item.product.price,
            quantity: item.quantity,
            line_total,
            line_total_display: Price::rub(line_total).display(),
        }
    }
}

/// Full cart contents plus the checkout stage the client should render.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<LineItemView>,
    pub item_count: u32,
    pub total: Decimal,
    pub total_display: String,
    pub stage: CheckoutStage,
}

impl CartView {
    pub(crate) fn build(cart: &Cart, checkout: &CheckoutFlow) -> Self {
        let total = cart.total_price();
        Self {
            items: cart.items().iter().map(LineItemView::from).collect(),
            item_count: cart.item_count(),
            total,
            total_display: Price::rub(total).display(),
            stage: checkout.stage(),
        }
    }
}

/// Lightweight response for the cart badge.
#[derive(Debug, Serialize)]
pub struct CartCountView {
    pub item_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub product_id: ProductId,
    /// Signed change; a result of zero or below removes the item.
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Session Helpers
// =============================================================================

pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

pub(crate) async fn store_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

pub(crate) async fn load_checkout(session: &Session) -> Result<CheckoutFlow> {
    Ok(session
        .get::<CheckoutFlow>(keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

pub(crate) async fn store_checkout(session: &Session, checkout: &CheckoutFlow) -> Result<()> {
    session.insert(keys::CHECKOUT, checkout).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart contents.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    let checkout = load_checkout(&session).await?;
    Ok(Json(CartView::build(&cart, &checkout)))
}

/// Add one unit of a product to the cart.
///
/// The product is resolved from the session's catalog view, so only
/// products the user has actually been shown can be added.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartCountView>> {
    let _guard = state.lock_session(&session).await;

    let catalog = load_catalog(&session).await?;
    let product = catalog
        .find_product(request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?
        .clone();

    let mut cart = load_cart(&session).await?;
    cart.add_item(product);
    store_cart(&session, &cart).await?;

    Ok(Json(CartCountView {
        item_count: cart.item_count(),
    }))
}

/// Adjust the quantity of a cart line by a signed delta.
#[instrument(skip(state, session), fields(product_id = %request.product_id, delta = request.delta))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let _guard = state.lock_session(&session).await;

    let mut cart = load_cart(&session).await?;
    let mut checkout = load_checkout(&session).await?;

    cart.adjust_quantity(request.product_id, request.delta);
    checkout.sync_with_cart(&cart);

    store_cart(&session, &cart).await?;
    store_checkout(&session, &checkout).await?;
    Ok(Json(CartView::build(&cart, &checkout)))
}

/// Remove a cart line entirely.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CartView>> {
    let _guard = state.lock_session(&session).await;

    let mut cart = load_cart(&session).await?;
    let mut checkout = load_checkout(&session).await?;

    cart.remove_item(request.product_id);
    checkout.sync_with_cart(&cart);

    store_cart(&session, &cart).await?;
    store_checkout(&session, &checkout).await?;
    Ok(Json(CartView::build(&cart, &checkout)))
}

/// Cart badge count.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCountView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCountView {
        item_count: cart.item_count(),
    }))
}
