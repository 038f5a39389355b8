//! Match Feed
//!
//! Everything that talks to, or describes, the remote match feed.
//!
//! ## Architecture
//!
//! - **Types**: `Match` and `MatchEvent` as served by the backend
//! - **Endpoints**: polling and push URLs derived from one base address
//! - **Client**: REST client for the matches endpoint

mod client;
mod endpoint;
mod types;

pub use client::{FeedClient, FeedError};
pub use endpoint::{push_scheme, EndpointError, Endpoints};
pub use types::{decode_snapshot, Match, MatchEvent, STATUS_LIVE};
