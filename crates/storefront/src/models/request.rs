//! Request lifecycle state for asynchronous operations.

use serde::{Deserialize, Serialize};

/// Lifecycle of one asynchronous operation (catalog fetch, supplier sync,
/// order submission).
///
/// Replaces ad hoc `loading`/`syncing`/`submitting` booleans so that
/// in-flight gating and stale-response handling are explicit and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RequestState {
    /// No request has been issued yet.
    #[default]
    Idle,
    /// A request has been issued and has not completed.
    InFlight,
    /// The most recent request completed successfully.
    Succeeded,
    /// The most recent request failed.
    Failed,
}

impl RequestState {
    /// Whether a request is currently outstanding.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }
}
