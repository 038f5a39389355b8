//! Match Store
//!
//! Holds the current snapshot of matches and applies replacements from
//! HTTP fetches and push messages.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;

use super::error::{StoreError, StoreResult};
use super::push::PushConnection;
use super::status::{PushState, SyncStatus, UpdateSource};
use crate::config::FeedConfig;
use crate::feed::{Endpoints, FeedClient, Match};

/// Client-side store of match records
///
/// Cloning is cheap and yields a handle to the same store. Each store owns
/// at most one polling timer and one push connection.
#[derive(Clone)]
pub struct MatchStore {
    pub(super) shared: Arc<Shared>,
}

/// State shared between store handles and background tasks
pub(super) struct Shared {
    pub(super) client: FeedClient,
    pub(super) config: FeedConfig,
    snapshot: watch::Sender<Arc<Vec<Match>>>,
    state: RwLock<SyncState>,
    /// Issue order of fetches and arrival order of push messages
    next_seq: AtomicU64,
    pub(super) poller: Mutex<Option<JoinHandle<()>>>,
    pub(super) push: Mutex<Option<PushConnection>>,
}

#[derive(Debug, Default)]
struct SyncState {
    status: SyncStatus,
    last_applied_seq: u64,
    push_generation: u64,
}

impl SyncState {
    fn abandon_connect(&mut self, generation: u64) {
        if self.push_generation == generation && self.status.push == PushState::Connecting {
            self.status.push = PushState::Closed;
        }
    }
}

impl MatchStore {
    /// Create an empty store for the configured feed
    pub fn new(config: FeedConfig) -> StoreResult<Self> {
        if config.poll_interval_ms == 0 {
            return Err(StoreError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        let endpoints = Endpoints::from_config(&config)?;
        let client = FeedClient::new(endpoints, config.request_timeout())?;
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        tracing::debug!(
            matches_url = %client.endpoints().matches_url(),
            push_url = %client.endpoints().push_url(),
            "Match store created"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                client,
                config,
                snapshot,
                state: RwLock::new(SyncState::default()),
                next_seq: AtomicU64::new(1),
                poller: Mutex::new(None),
                push: Mutex::new(None),
            }),
        })
    }

    /// Fetch every match and replace the snapshot
    ///
    /// On failure the snapshot is left untouched and the error returned.
    /// Overlapping calls are not cancelled; responses apply in arrival
    /// order unless `discard_stale_responses` is set.
    pub async fn fetch_all(&self) -> StoreResult<()> {
        self.shared.refresh(UpdateSource::Fetch).await
    }

    /// Current snapshot
    pub fn matches(&self) -> Arc<Vec<Match>> {
        self.shared.snapshot.borrow().clone()
    }

    /// Receiver notified with every applied snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Match>>> {
        self.shared.snapshot.subscribe()
    }

    /// Look up a match in the current snapshot
    pub fn find(&self, id: i64) -> Option<Match> {
        self.shared.snapshot.borrow().iter().find(|m| m.id == id).cloned()
    }

    /// Matches currently in progress
    pub fn live(&self) -> Vec<Match> {
        self.shared
            .snapshot
            .borrow()
            .iter()
            .filter(|m| m.is_live())
            .cloned()
            .collect()
    }

    /// Distinct leagues, in snapshot order
    pub fn leagues(&self) -> Vec<String> {
        let snapshot = self.shared.snapshot.borrow();
        let mut leagues: Vec<String> = Vec::new();
        for m in snapshot.iter() {
            if !leagues.contains(&m.league) {
                leagues.push(m.league.clone());
            }
        }
        leagues
    }

    /// Synchronization status
    pub async fn status(&self) -> SyncStatus {
        let mut status = self.shared.state.read().await.status.clone();
        status.polling = self.is_polling().await;
        status
    }

    pub fn config(&self) -> &FeedConfig {
        &self.shared.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        self.shared.client.endpoints()
    }
}

impl Shared {
    /// Take the next sequence number
    pub(super) fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Fetch over HTTP and apply the result
    pub(super) async fn refresh(&self, source: UpdateSource) -> StoreResult<()> {
        let seq = self.next_seq();

        match self.client.fetch_matches().await {
            Ok(matches) => {
                self.apply(matches, source, seq).await;
                Ok(())
            }
            Err(e) => {
                self.record_error(e.to_string()).await;
                Err(e.into())
            }
        }
    }

    /// Replace the snapshot wholesale
    ///
    /// Returns false when the stale-response guard dropped the update.
    pub(super) async fn apply(&self, matches: Vec<Match>, source: UpdateSource, seq: u64) -> bool {
        let mut state = self.state.write().await;

        if self.config.discard_stale_responses && seq < state.last_applied_seq {
            state.status.stale_discarded += 1;
            tracing::debug!(
                seq,
                last_applied = state.last_applied_seq,
                "Discarding stale snapshot"
            );
            return false;
        }

        let count = matches.len();
        self.snapshot.send_replace(Arc::new(matches));

        state.last_applied_seq = state.last_applied_seq.max(seq);
        state.status.last_update = Some(Utc::now());
        state.status.last_source = Some(source);
        state.status.updates_applied += 1;
        state.status.last_error = None;

        tracing::debug!(matches = count, ?source, seq, "Snapshot applied");
        true
    }

    pub(super) async fn record_error(&self, message: String) {
        self.state.write().await.status.last_error = Some(message);
    }

    /// Mark a new connection attempt; returns its generation
    pub(super) async fn begin_connect(&self) -> u64 {
        let mut state = self.state.write().await;
        state.push_generation += 1;
        state.status.push = PushState::Connecting;
        state.push_generation
    }

    /// Update the push state if `generation` is still the current connection
    pub(super) async fn set_push_state(&self, generation: u64, push: PushState) {
        let mut state = self.state.write().await;
        if state.push_generation == generation {
            state.status.push = push;
        }
    }

    /// Mark `generation` open; false if it was retired during the handshake
    pub(super) async fn open_if_current(&self, generation: u64) -> bool {
        let mut state = self.state.write().await;
        if state.push_generation != generation {
            return false;
        }
        state.status.push = PushState::Open;
        true
    }

    /// Invalidate the current connection and any handshake in flight
    pub(super) async fn retire_push(&self) {
        let mut state = self.state.write().await;
        state.push_generation += 1;
        state.status.push = PushState::Closed;
    }

    /// Close a handshake that will never complete
    ///
    /// Runs from `Drop`, so it cannot await the state lock. Falls back to a
    /// spawned task when the lock is momentarily held.
    pub(super) fn abandon_connect(self: &Arc<Self>, generation: u64) {
        if let Ok(mut state) = self.state.try_write() {
            state.abandon_connect(generation);
            return;
        }

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let shared = Arc::clone(self);
            runtime.spawn(async move {
                shared.state.write().await.abandon_connect(generation);
            });
        }
    }

    pub(super) async fn push_state(&self) -> PushState {
        self.state.read().await.status.push
    }
}
