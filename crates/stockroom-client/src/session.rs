//! # Auth Session
//!
//! Process-wide sign-in state, passed explicitly to whoever needs it.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  init(token_path) ──► token loaded from disk (or none)                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  login(email, pw) ──► POST /token ──► token persisted                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  authenticate() ────► GET /me/token-info ──► StaffIdentity              │
//! │        │                     │                                          │
//! │        │                     └── failure ──► clear()                    │
//! │        ▼                                                                │
//! │  clear() ◄──────── logout, or any 401 from the store                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::ErrorKind;
use std::path::PathBuf;

use stockroom_core::validation::validate_credentials;
use stockroom_core::{StaffId, StaffIdentity};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult, Operation};
use crate::store::RemoteStore;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    identity: Option<StaffIdentity>,
}

/// The signed-in session.
#[derive(Debug)]
pub struct AuthSession {
    token_path: Option<PathBuf>,
    state: RwLock<SessionState>,
}

impl AuthSession {
    /// A session kept in memory only.
    pub fn in_memory() -> Self {
        AuthSession {
            token_path: None,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Loads a persisted token, if any.
    pub fn init(token_path: Option<PathBuf>) -> ClientResult<Self> {
        let token = match &token_path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(contents) => {
                    let token = contents.trim().to_string();
                    (!token.is_empty()).then_some(token)
                }
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) => return Err(ClientError::SessionStorage(e.to_string())),
            },
            None => None,
        };

        debug!(has_token = token.is_some(), "Session initialised");

        Ok(AuthSession {
            token_path,
            state: RwLock::new(SessionState {
                token,
                identity: None,
            }),
        })
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn identity(&self) -> Option<StaffIdentity> {
        self.state.read().await.identity.clone()
    }

    pub async fn staff_id(&self) -> Option<StaffId> {
        self.state.read().await.identity.as_ref().map(|i| i.id)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.identity.is_some()
    }

    /// Signs in and resolves the staff identity.
    pub async fn login(
        &self,
        store: &dyn RemoteStore,
        email: &str,
        password: &str,
    ) -> ClientResult<StaffIdentity> {
        validate_credentials(email, password)?;

        let token = store.login(email.trim(), password).await?;
        self.set_token(token).await?;
        self.authenticate(store).await
    }

    /// Fetches the identity behind the current token. Any failure clears
    /// the session.
    pub async fn authenticate(&self, store: &dyn RemoteStore) -> ClientResult<StaffIdentity> {
        if self.token().await.is_none() {
            return Err(ClientError::Unauthorized {
                operation: Operation::FetchIdentity,
            });
        }

        match store.fetch_identity().await {
            Ok(identity) => {
                info!(staff_id = identity.id, email = %identity.email, "Authenticated");
                self.state.write().await.identity = Some(identity.clone());
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, "Could not resolve session identity");
                self.clear().await;
                Err(e)
            }
        }
    }

    /// Stores a new token and persists it.
    pub async fn set_token(&self, token: String) -> ClientResult<()> {
        if let Some(path) = &self.token_path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ClientError::SessionStorage(e.to_string()))?;
            }
            fs::write(path, &token)
                .await
                .map_err(|e| ClientError::SessionStorage(e.to_string()))?;
        }

        let mut state = self.state.write().await;
        state.token = Some(token);
        state.identity = None;
        Ok(())
    }

    /// Forgets the token and identity, removing the persisted file.
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            state.token = None;
            state.identity = None;
        }

        if let Some(path) = &self.token_path {
            match fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(?path, error = %e, "Could not remove session token"),
            }
        }

        info!("Session cleared");
    }
}
