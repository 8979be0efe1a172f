//! Clients for the external catalog and orders APIs.
//!
//! Both backends are plain JSON-over-HTTP. Each client owns its `reqwest`
//! client and converts transport failures, non-success statuses, and
//! unparseable bodies into its own error type; nothing here mutates
//! storefront state.

pub mod catalog;
pub mod orders;

pub use catalog::{CatalogClient, FetchError, SyncSummary};
pub use orders::{OrderClient, OrderConfirmation, SubmitError};
