//! # Matchday
//!
//! Client-side store of live football matches, kept in sync with a
//! backend by HTTP polling or by snapshots pushed over a WebSocket.
//!
//! ## Features
//!
//! - **Whole-snapshot updates**: every refresh replaces the full list atomically
//! - **Polling**: one timer per store, restarting replaces the old timer
//! - **Push**: one WebSocket per store, `wss` when the backend is served over `https`
//! - **Change feed**: subscribe to be notified of each new snapshot
//!
//! ## Modules
//!
//! - [`feed`]: record types, endpoint resolution and the REST client
//! - [`store`]: the match store with polling and push synchronization
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matchday::{FeedConfig, MatchStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MatchStore::new(FeedConfig::with_base_url("http://localhost:8000"))?;
//!
//!     // One-off refresh
//!     store.fetch_all().await?;
//!     println!("{} matches", store.matches().len());
//!
//!     // Keep it fresh from pushed snapshots
//!     store.connect_ws().await?;
//!     let mut updates = store.subscribe();
//!     while updates.changed().await.is_ok() {
//!         println!("{} live", store.live().len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod feed;
pub mod store;

pub use config::{generate_default_config, Config, ConfigError, FeedConfig, LoggingConfig};

pub use feed::{
    push_scheme, EndpointError, Endpoints, FeedClient, FeedError, Match, MatchEvent,
};

pub use store::{MatchStore, PushState, StoreError, StoreResult, SyncStatus, UpdateSource};
