//! # Console
//!
//! Wires configuration, session, store and the three services together.
//!
//! ## User Workflow
//! ```text
//! 1. Console::connect(config)      → session token loaded from disk
//! 2. console.resume() / login()    → staff identity resolved
//! 3. console.lookup()              → search products, customers, orders
//! 4. console.orders().submit(..)   → create or edit an order
//! 5. console.sales().create_sale() → sale recorded, order delivered
//! ```

use std::sync::Arc;

use stockroom_core::StaffIdentity;
use tracing::info;

use crate::catalog::CatalogLookup;
use crate::config::ConsoleConfig;
use crate::error::ClientResult;
use crate::http::HttpStore;
use crate::orders::OrderDesk;
use crate::sales::SaleRecorder;
use crate::session::AuthSession;
use crate::store::RemoteStore;

pub struct Console {
    config: ConsoleConfig,
    session: Arc<AuthSession>,
    store: Arc<dyn RemoteStore>,
    lookup: CatalogLookup,
    orders: OrderDesk,
    sales: SaleRecorder,
}

impl Console {
    /// Builds a console talking to the configured HTTP store.
    pub fn connect(config: ConsoleConfig) -> ClientResult<Self> {
        config.validate()?;

        let session = Arc::new(AuthSession::init(config.token_path())?);
        let store: Arc<dyn RemoteStore> = Arc::new(HttpStore::new(&config.api, Arc::clone(&session))?);

        info!(base_url = %config.api.base_url, "Console connected");
        Ok(Self::with_store(config, session, store))
    }

    /// Builds a console over any store.
    pub fn with_store(
        config: ConsoleConfig,
        session: Arc<AuthSession>,
        store: Arc<dyn RemoteStore>,
    ) -> Self {
        Console {
            lookup: CatalogLookup::new(Arc::clone(&store), config.search.clone()),
            orders: OrderDesk::new(Arc::clone(&store)),
            sales: SaleRecorder::new(Arc::clone(&store), Arc::clone(&session)),
            config,
            session,
            store,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<StaffIdentity> {
        self.session.login(self.store.as_ref(), email, password).await
    }

    /// Resolves the identity behind a persisted token.
    pub async fn resume(&self) -> ClientResult<StaffIdentity> {
        self.session.authenticate(self.store.as_ref()).await
    }

    pub async fn logout(&self) {
        self.session.clear().await;
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn lookup(&self) -> &CatalogLookup {
        &self.lookup
    }

    pub fn orders(&self) -> &OrderDesk {
        &self.orders
    }

    pub fn sales(&self) -> &SaleRecorder {
        &self.sales
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_login_then_logout() {
        let store = Arc::new(MemoryStore::new());
        store.add_staff(2, "rui@example.com", "pw");
        let console = Console::with_store(
            ConsoleConfig::default(),
            Arc::new(AuthSession::in_memory()),
            store,
        );

        let identity = console.login("rui@example.com", "pw").await.unwrap();
        assert_eq!(identity.id, 2);
        assert!(console.session().is_authenticated().await);

        console.logout().await;
        assert!(!console.session().is_authenticated().await);
        assert!(console.resume().await.unwrap_err().is_unauthorized());
    }

    #[test]
    fn test_connect_rejects_bad_config() {
        let mut config = ConsoleConfig::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(Console::connect(config).is_err());
    }
}
