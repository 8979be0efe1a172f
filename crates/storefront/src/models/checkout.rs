//! The checkout flow state machine.
//!
//! Two stages: reviewing the cart, then filling the customer/delivery form.
//! Submission is gated on the form validating and no submission already
//! being in flight, so repeated activation cannot create duplicate orders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cart::Cart;
use super::request::RequestState;

/// Delivery methods offered at checkout. Serialized with the labels the
/// orders backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeliveryMethod {
    #[default]
    #[serde(rename = "Курьер")]
    Courier,
    #[serde(rename = "Самовывоз")]
    Pickup,
    #[serde(rename = "Почта России")]
    RussianPost,
}

/// Payment methods offered at checkout. A label only; no payment is
/// processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Наличные")]
    Cash,
    #[serde(rename = "Картой курьеру")]
    CardOnDelivery,
    #[serde(rename = "Онлайн оплата")]
    Online,
}

/// Customer and delivery details collected in the form stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    /// Optional; an empty string means not provided.
    #[serde(default)]
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Check that all required fields are filled. Email is optional.
    ///
    /// # Errors
    ///
    /// Returns the first missing required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::MissingField("phone"));
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError::MissingField("address"));
        }
        Ok(())
    }

    /// Clear all fields back to their defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A required form field was left empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field is empty: {0}")]
    MissingField(&'static str),
}

/// An operation was attempted in a stage that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("checkout form is not open")]
    NotFillingForm,
    #[error("an order submission is already in flight")]
    SubmissionInFlight,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// The two stages of checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CheckoutStage {
    /// Reviewing cart contents.
    #[default]
    Reviewing,
    /// Filling in customer and delivery details.
    FillingForm,
}

/// The checkout flow: current stage, form contents, and submission state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutFlow {
    stage: CheckoutStage,
    form: CheckoutForm,
    submission: RequestState,
}

impl CheckoutFlow {
    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Current form contents.
    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// State of the order submission.
    #[must_use]
    pub const fn submission(&self) -> RequestState {
        self.submission
    }

    /// Reviewing → FillingForm. Allowed only when the cart is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::EmptyCart`] if the cart has no items.
    pub fn proceed(&mut self, cart: &Cart) -> Result<(), FlowError> {
        if cart.is_empty() {
            return Err(FlowError::EmptyCart);
        }
        self.stage = CheckoutStage::FillingForm;
        Ok(())
    }

    /// FillingForm → Reviewing. Form contents are preserved so the user can
    /// resume.
    pub fn back(&mut self) {
        self.stage = CheckoutStage::Reviewing;
    }

    /// Replace the form contents. Allowed only in the form stage.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NotFillingForm`] outside the form stage.
    pub fn update_form(&mut self, form: CheckoutForm) -> Result<(), FlowError> {
        if self.stage != CheckoutStage::FillingForm {
            return Err(FlowError::NotFillingForm);
        }
        self.form = form;
        Ok(())
    }

    /// Gate an order submission.
    ///
    /// On success the submission is marked in flight; the caller must follow
    /// up with [`complete_success`](Self::complete_success) or
    /// [`complete_failure`](Self::complete_failure). On any error no network
    /// call may be made and no state changes.
    ///
    /// # Errors
    ///
    /// Fails when the flow is not in the form stage, a submission is already
    /// in flight, the cart is empty, or a required field is missing.
    pub fn begin_submission(&mut self, cart: &Cart) -> Result<(), FlowError> {
        if self.stage != CheckoutStage::FillingForm {
            return Err(FlowError::NotFillingForm);
        }
        if self.submission.is_in_flight() {
            return Err(FlowError::SubmissionInFlight);
        }
        if cart.is_empty() {
            return Err(FlowError::EmptyCart);
        }
        self.form.validate()?;

        self.submission = RequestState::InFlight;
        Ok(())
    }

    /// Success path: clear the cart, reset the form, return to reviewing.
    pub fn complete_success(&mut self, cart: &mut Cart) {
        cart.clear();
        self.form.reset();
        self.stage = CheckoutStage::Reviewing;
        self.submission = RequestState::Succeeded;
    }

    /// Failure path: cart and form are left untouched so the user can retry.
    pub fn complete_failure(&mut self) {
        self.submission = RequestState::Failed;
    }

    /// Reset the flow when the cart has become empty (form contents are
    /// only meaningful while there is something to order).
    pub fn sync_with_cart(&mut self, cart: &Cart) {
        if cart.is_empty() {
            self.form.reset();
            self.stage = CheckoutStage::Reviewing;
        }
    }
}
