//! Match Store
//!
//! Client-side cache of match records, refreshed by polling the matches
//! endpoint or by snapshots pushed over a WebSocket.
//!
//! ## Architecture
//!
//! - **MatchStore**: the snapshot plus `fetch_all`, `matches`, `subscribe`
//! - **Polling**: one timer per store, `start_polling` / `stop_polling`
//! - **Push**: one connection per store, `connect_ws` / `disconnect`
//!
//! ## Update semantics
//!
//! Every fetch or push message replaces the whole list in a single step, so
//! readers always see a complete snapshot. Responses are applied in arrival
//! order; set `discard_stale_responses` to drop HTTP responses that arrive
//! after a newer update was already applied.

mod error;
mod matches;
mod polling;
mod push;
mod status;

pub use error::{StoreError, StoreResult};
pub use matches::MatchStore;
pub use status::{PushState, SyncStatus, UpdateSource};
