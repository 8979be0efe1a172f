//! Checkout route handlers.
//!
//! Thin wrappers around [`CheckoutFlow`]: every transition is decided by the
//! state machine, and the handler's job is to persist the outcome. Every
//! handler holds the session's mutation lock across its load-to-store
//! sequence, so two requests racing on one session cannot both act on the
//! same flow snapshot.

use axum::{Json, extract::State};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use autoparts_core::OrderId;

use crate::error::Result;
use crate::models::checkout::{CheckoutFlow, CheckoutForm, CheckoutStage};
use crate::models::request::RequestState;
use crate::state::AppState;

use super::cart::{CartView, load_cart, load_checkout, store_cart, store_checkout};

/// Checkout state as shown to the client.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub stage: CheckoutStage,
    pub form: CheckoutForm,
    pub submission: RequestState,
    pub cart: CartView,
}

impl CheckoutView {
    fn build(flow: &CheckoutFlow, cart: &crate::models::cart::Cart) -> Self {
        Self {
            stage: flow.stage(),
            form: flow.form().clone(),
            submission: flow.submission(),
            cart: CartView::build(cart, flow),
        }
    }
}

/// Confirmation returned after a successful order submission.
#[derive(Debug, Serialize)]
pub struct OrderPlacedView {
    pub order_id: OrderId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Proceed from cart review to the checkout form.
#[instrument(skip(state, session))]
pub async fn begin(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let _guard = state.lock_session(&session).await;
    let cart = load_cart(&session).await?;
    let mut flow = load_checkout(&session).await?;

    flow.proceed(&cart)?;
    store_checkout(&session, &flow).await?;

    Ok(Json(CheckoutView::build(&flow, &cart)))
}

/// Return from the form to cart review. Form contents are kept.
#[instrument(skip(state, session))]
pub async fn back(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let _guard = state.lock_session(&session).await;
    let cart = load_cart(&session).await?;
    let mut flow = load_checkout(&session).await?;

    flow.back();
    store_checkout(&session, &flow).await?;

    Ok(Json(CheckoutView::build(&flow, &cart)))
}

/// Replace the checkout form contents.
#[instrument(skip(state, session, form))]
pub async fn form(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<CheckoutView>> {
    let _guard = state.lock_session(&session).await;
    let cart = load_cart(&session).await?;
    let mut flow = load_checkout(&session).await?;

    flow.update_form(form)?;
    store_checkout(&session, &flow).await?;

    Ok(Json(CheckoutView::build(&flow, &cart)))
}

/// Validate and submit the order.
///
/// The flow gates the submission (form stage, nothing in flight, non-empty
/// cart, valid form) before any network call. On success the cart is
/// cleared and the flow reset; on failure everything is preserved for a
/// retry.
#[instrument(skip(state, session))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<OrderPlacedView>> {
    // Held for the whole handler: without it, two racing submits could both
    // load an idle flow, both pass the gate, and both place an order.
    let _guard = state.lock_session(&session).await;

    let mut cart = load_cart(&session).await?;
    let mut flow = load_checkout(&session).await?;

    flow.begin_submission(&cart)?;
    store_checkout(&session, &flow).await?;

    match state
        .orders()
        .submit_order(flow.form(), cart.items())
        .await
    {
        Ok(confirmation) => {
            flow.complete_success(&mut cart);
            store_cart(&session, &cart).await?;
            store_checkout(&session, &flow).await?;

            tracing::info!(order_id = %confirmation.order_id, "Order placed");
            Ok(Json(OrderPlacedView {
                order_id: confirmation.order_id,
            }))
        }
        Err(e) => {
            flow.complete_failure();
            store_checkout(&session, &flow).await?;
            Err(e.into())
        }
    }
}
