//! Session key constants.
//!
//! All storefront state is scoped to the browser session; these are the keys
//! under which each state machine is stored.

/// Session keys for storefront state.
pub mod keys {
    /// Key for the shopping cart.
    pub const CART: &str = "cart";

    /// Key for the checkout flow (stage, form, submission state).
    pub const CHECKOUT: &str = "checkout";

    /// Key for the catalog view (products, filter, fetch sequencing).
    pub const CATALOG: &str = "catalog";
}
