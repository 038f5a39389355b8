//! Sync status reported by the store

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Where an applied snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    /// Explicit `fetch_all` call
    Fetch,
    /// Polling timer tick
    Poll,
    /// Push channel message
    Push,
}

/// Lifecycle of the push connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushState {
    #[default]
    Closed,
    Connecting,
    Open,
}

impl fmt::Display for PushState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PushState::Closed => "closed",
            PushState::Connecting => "connecting",
            PushState::Open => "open",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of the store's synchronization
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    /// When the current snapshot was applied
    pub last_update: Option<DateTime<Utc>>,
    /// Source of the current snapshot
    pub last_source: Option<UpdateSource>,
    /// Snapshots applied since the store was created
    pub updates_applied: u64,
    /// Responses dropped by the stale-response guard
    pub stale_discarded: u64,
    /// Most recent failure, cleared when the next snapshot is applied
    pub last_error: Option<String>,
    /// Whether a polling timer is installed
    pub polling: bool,
    pub push: PushState,
}
