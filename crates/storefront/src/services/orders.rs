//! Order submission API client.
//!
//! Serializes the checkout form and cart line items into the order payload
//! the backend expects and returns the server-assigned order id. Prices in
//! the payload are a snapshot taken at order time; later catalog changes do
//! not affect a submitted order.

use autoparts_core::{OrderId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::OrdersConfig;
use crate::models::cart::LineItem;
use crate::models::checkout::{CheckoutForm, DeliveryMethod, PaymentMethod};

/// Errors that can occur submitting an order.
#[derive(Debug, Error)]
pub enum SubmitError {
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

/// Client for the order submission API.
#[derive(Clone)]
pub struct OrderClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OrderClient {
    /// Create a new order API client.
    #[must_use]
    pub fn new(config: &OrdersConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Submit an order for `items` with the customer details in `form`.
    ///
    /// On failure the caller must leave cart and form state untouched so the
    /// user can retry without re-entering data.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] on transport failure, non-success status,
    /// or an unparseable body.
    #[instrument(skip(self, form, items), fields(item_count = items.len()))]
    pub async fn submit_order(
        &self,
        form: &CheckoutForm,
        items: &[LineItem],
    ) -> Result<OrderConfirmation, SubmitError> {
        let payload = OrderRequest::build(form, items);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SubmitError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<OrderConfirmation>()
            .await
            .map_err(|e| SubmitError::Parse(e.to_string()))
    }
}

/// Order payload sent to the backend.
#[derive(Debug, Serialize)]
struct OrderRequest {
    customer_name: String,
    customer_phone: String,
    /// Empty string when the customer did not provide one.
    customer_email: String,
    delivery_address: String,
    delivery_method: DeliveryMethod,
    payment_method: PaymentMethod,
    items: Vec<OrderItem>,
}

/// One ordered line with its price snapshot.
#[derive(Debug, Serialize)]
struct OrderItem {
    product_id: ProductId,
    product_name: String,
    product_article: String,
    quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
}

impl OrderRequest {
    fn build(form: &CheckoutForm, items: &[LineItem]) -> Self {
        Self {
            customer_name: form.name.clone(),
            customer_phone: form.phone.clone(),
            customer_email: form.email.clone(),
            delivery_address: form.address.clone(),
            delivery_method: form.delivery_method,
            payment_method: form.payment_method,
            items: items
                .iter()
                .map(|item| OrderItem {
                    product_id: item.product.id,
                    product_name: item.product.name.clone(),
                    product_article: item.product.article.clone(),
                    quantity: item.quantity,
                    price: item.product.price,
                })
                .collect(),
        }
    }
}

/// Response from a successful order submission.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfirmation {
    #[serde(default)]
    pub success: bool,
    pub order_id: OrderId,
}
