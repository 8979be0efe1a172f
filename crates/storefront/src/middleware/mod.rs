//! HTTP middleware stack for storefront.

pub mod session;

pub use session::create_session_layer;
