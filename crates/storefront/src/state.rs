//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::Session;

use crate::config::StorefrontConfig;
use crate::middleware::session::SESSION_EXPIRY_SECONDS;
use crate::services::{CatalogClient, OrderClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the API clients and the per-session mutation
/// locks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: CatalogClient,
    orders: OrderClient,
    /// One mutation lock per session. Entries idle out on the same
    /// schedule as the sessions they guard.
    session_locks: Cache<String, Arc<Mutex<()>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let catalog = CatalogClient::new(&config.catalog);
        let orders = OrderClient::new(&config.orders);
        let session_locks = Cache::builder()
            .time_to_idle(Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs()))
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                orders,
                session_locks,
            }),
        }
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the order API client.
    #[must_use]
    pub fn orders(&self) -> &OrderClient {
        &self.inner.orders
    }

    /// Acquire the mutation lock for `session`.
    ///
    /// Session state is stored as load, mutate, store; two concurrent
    /// requests on the same session can otherwise both load the same
    /// snapshot and both pass a gate that only one of them should. Handlers
    /// that mutate session state hold this guard for the whole
    /// load-to-store sequence.
    pub async fn lock_session(&self, session: &Session) -> OwnedMutexGuard<()> {
        let key = session.id().map_or_else(String::new, |id| id.to_string());
        self.session_lock_for(key).await
    }

    async fn session_lock_for(&self, key: String) -> OwnedMutexGuard<()> {
        let lock = self
            .inner
            .session_locks
            .get_with(key, async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    use autoparts_core::ProductId;
    use rust_decimal::Decimal;

    use crate::config::{CatalogConfig, OrdersConfig};
    use crate::models::cart::Cart;
    use crate::models::catalog::Product;
    use crate::models::checkout::{CheckoutFlow, CheckoutForm};

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            catalog: CatalogConfig {
                base_url: "https://api.example.com/products".to_string(),
            },
            orders: OrdersConfig {
                endpoint: "https://api.example.com/orders".to_string(),
            },
            sentry_dsn: None,
        }
    }

    fn product(id: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Part {id}"),
            article: format!("ART-{id}"),
            price: Decimal::from(500),
            image: String::new(),
            category: "Двигатель".to_string(),
            in_stock: true,
            quantity: None,
            manufacturer: None,
            supplier: None,
        }
    }

    fn filled_form() -> CheckoutForm {
        CheckoutForm {
            name: "Иван Иванов".to_string(),
            phone: "+7 (999) 123-45-67".to_string(),
            email: String::new(),
            address: "г. Москва, ул. Примерная, д. 1".to_string(),
            ..CheckoutForm::default()
        }
    }

    #[tokio::test]
    async fn test_session_lock_is_exclusive() {
        let state = AppState::new(&test_config());

        let guard = state.session_lock_for("s1".to_string()).await;
        let second = tokio::time::timeout(
            Duration::from_millis(50),
            state.session_lock_for("s1".to_string()),
        )
        .await;
        assert!(second.is_err());

        drop(guard);
        let third = tokio::time::timeout(
            Duration::from_millis(50),
            state.session_lock_for("s1".to_string()),
        )
        .await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_session_locks_are_independent() {
        let state = AppState::new(&test_config());

        let _guard = state.session_lock_for("s1".to_string()).await;
        let other = tokio::time::timeout(
            Duration::from_millis(50),
            state.session_lock_for("s2".to_string()),
        )
        .await;
        assert!(other.is_ok());
    }

    /// Two submits racing on one session: each takes the session lock, then
    /// loads the shared flow, runs the gate, and stores it back. Exactly one
    /// may pass.
    #[tokio::test]
    async fn test_racing_submits_only_one_passes_gate() {
        async fn attempt(
            state: AppState,
            flow: Arc<StdMutex<CheckoutFlow>>,
            cart: Arc<Cart>,
        ) -> bool {
            let _guard = state.session_lock_for("s".to_string()).await;
            let mut flow = flow.lock().unwrap();
            flow.begin_submission(&cart).is_ok()
        }

        let state = AppState::new(&test_config());

        let mut cart = Cart::default();
        cart.add_item(product(1));
        let mut flow = CheckoutFlow::default();
        flow.proceed(&cart).unwrap();
        flow.update_form(filled_form()).unwrap();

        let flow = Arc::new(StdMutex::new(flow));
        let cart = Arc::new(cart);

        let (a, b) = tokio::join!(
            attempt(state.clone(), Arc::clone(&flow), Arc::clone(&cart)),
            attempt(state, flow, cart),
        );
        assert_eq!(u32::from(a) + u32::from(b), 1);
    }
}
