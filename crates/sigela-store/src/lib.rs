//! sigela-store: persistence collaborator for the SIGELA reservation service
//!
//! This crate provides:
//! - The collaborator traits the server depends on ([`IdentityStore`],
//!   [`ReservationStore`], [`NotificationStore`])
//! - A PostgreSQL implementation calling stored functions ([`PgStore`])
//! - An in-memory implementation for development and tests ([`MemoryStore`])
//! - A lazily created, process-wide connection pool ([`LazyPool`])
//!
//! # Usage
//!
//! ```rust,ignore
//! use sigela_store::{IdentityStore, PgStore, StoreConfig};
//!
//! let store = PgStore::new(StoreConfig::from_env()?);
//! let lookup = store.lookup_credentials("ana", None).await?;
//! store.close().await;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::{HandoffAudit, MemoryStore};
pub use models::*;
pub use pool::LazyPool;
pub use repository::{IdentityStore, NotificationStore, ReservationStore};
pub use store::{PgStore, StoreConfig};

// Re-export sigela-core for downstream crates
pub use sigela_core;
