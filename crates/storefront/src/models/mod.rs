//! Domain models for the storefront.
//!
//! All user-visible storefront state lives here: the catalog view, the
//! shopping cart, and the checkout flow. Each is a plain serializable state
//! machine stored in the browser session; the route handlers load a model,
//! apply one operation, and write it back.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod request;
pub mod session;
