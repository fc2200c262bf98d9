//! Application state shared across handlers.

use std::sync::Arc;

use sigela_store::{IdentityStore, NotificationStore, ReservationStore};

use crate::config::ServerConfig;
use crate::notifications::NotificationService;
use crate::session::SessionKeys;
use crate::workflow::ReservationWorkflow;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Session signing keys and cookie settings.
    sessions: Arc<SessionKeys>,
    /// Identity lookups.
    identities: Arc<dyn IdentityStore>,
    /// Reservation reads.
    reservations: Arc<dyn ReservationStore>,
    /// Delivery and return.
    workflow: ReservationWorkflow,
    /// Notification subsystem.
    notifications: NotificationService,
}

impl AppState {
    /// Create new application state over one collaborator implementing every
    /// store trait.
    pub fn new<S>(store: Arc<S>, config: ServerConfig) -> Self
    where
        S: IdentityStore + ReservationStore + NotificationStore + 'static,
    {
        let sessions = SessionKeys::from_config(&config);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            identities: store.clone(),
            reservations: store.clone(),
            workflow: ReservationWorkflow::new(store.clone()),
            notifications: NotificationService::new(store),
        }
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    pub fn identities(&self) -> &dyn IdentityStore {
        self.identities.as_ref()
    }

    pub fn reservations(&self) -> &dyn ReservationStore {
        self.reservations.as_ref()
    }

    pub fn workflow(&self) -> &ReservationWorkflow {
        &self.workflow
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
