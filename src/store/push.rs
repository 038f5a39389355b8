//! Push Channel
//!
//! WebSocket connection that receives full snapshots from the backend.
//! Every text message is a complete list of matches and replaces the store
//! contents. There is no reconnection: once the connection closes the store
//! stays disconnected until `connect_ws` is called again.
//!
//! Each connection attempt gets a generation number. `disconnect` retires
//! the current generation, so a handshake still in flight is dropped when it
//! completes and a closing listener cannot overwrite a newer state.

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::error::{StoreError, StoreResult};
use super::matches::{MatchStore, Shared};
use super::status::{PushState, UpdateSource};
use crate::feed::decode_snapshot;

type PushStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upper bound on waiting for the listener to finish its close handshake
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Handle to the listener task of an open connection
pub(super) struct PushConnection {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PushConnection {
    /// Ask the listener to close the socket and wait for it to exit
    async fn close(self) {
        let PushConnection { shutdown, mut task } = self;

        // Err means the listener already exited
        let _ = shutdown.send(());

        if tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await.is_err() {
            tracing::warn!("Push listener did not close in time, aborting");
            task.abort();
        }
    }
}

/// Returns a handshake to `Closed` if `connect_ws` is dropped before it
/// reaches `Open`
struct PendingConnect {
    shared: Arc<Shared>,
    generation: u64,
}

impl Drop for PendingConnect {
    fn drop(&mut self) {
        self.shared.abandon_connect(self.generation);
    }
}

impl MatchStore {
    /// Open the push channel
    ///
    /// Closes the current connection first, if any. The scheme mirrors the
    /// base address: `https` origins connect over `wss`, `http` over `ws`.
    /// Returns once the handshake completes; a failed or cancelled handshake
    /// leaves the store disconnected. If `disconnect` or another
    /// `connect_ws` runs while the handshake is pending, the late connection
    /// is closed and `StoreError::Superseded` returned.
    pub async fn connect_ws(&self) -> StoreResult<()> {
        self.disconnect().await;

        let url = self.shared.client.endpoints().push_url().clone();
        let generation = self.shared.begin_connect().await;
        let _pending = PendingConnect {
            shared: Arc::clone(&self.shared),
            generation,
        };

        tracing::info!(url = %url, "Connecting to push channel");

        let mut stream = match connect_async(url.as_str()).await {
            Ok((stream, _response)) => stream,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Push channel handshake failed");
                self.shared.set_push_state(generation, PushState::Closed).await;
                self.shared.record_error(e.to_string()).await;
                return Err(e.into());
            }
        };

        let mut push = self.shared.push.lock().await;

        if !self.shared.open_if_current(generation).await {
            drop(push);
            tracing::info!(url = %url, "Push handshake superseded, dropping connection");
            if tokio::time::timeout(CLOSE_TIMEOUT, stream.close(None)).await.is_err() {
                tracing::debug!("Superseded connection did not close in time");
            }
            return Err(StoreError::Superseded);
        }

        tracing::info!(url = %url, "Push channel open");

        let (shutdown, shutdown_rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(listen(shared, stream, shutdown_rx, generation));

        *push = Some(PushConnection { shutdown, task });
        Ok(())
    }

    /// Close the push channel, if open
    ///
    /// Also cancels a handshake in progress. The state is `Closed` once this
    /// returns.
    pub async fn disconnect(&self) {
        let previous = {
            let mut push = self.shared.push.lock().await;
            self.shared.retire_push().await;
            push.take()
        };

        if let Some(connection) = previous {
            connection.close().await;
            tracing::info!("Push channel closed");
        }
    }

    /// State of the push connection
    pub async fn push_state(&self) -> PushState {
        self.shared.push_state().await
    }
}

/// Receive snapshots until the socket closes or shutdown is requested
async fn listen(
    shared: Arc<Shared>,
    stream: PushStream,
    mut shutdown: oneshot::Receiver<()>,
    generation: u64,
) {
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!(error = %e, "Close frame not sent");
                }
                break;
            }
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    apply_message(&shared, &text).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "Push channel closed by server");
                    break;
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!(bytes = data.len(), "Ignoring binary push message");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Push channel error");
                    shared.record_error(e.to_string()).await;
                    break;
                }
                None => {
                    tracing::info!("Push channel stream ended");
                    break;
                }
            }
        }
    }

    shared.set_push_state(generation, PushState::Closed).await;
}

/// Replace the snapshot with a pushed message
///
/// A malformed payload is logged and recorded; the snapshot is kept and
/// the connection stays open.
async fn apply_message(shared: &Shared, text: &str) {
    let seq = shared.next_seq();

    match decode_snapshot(text).map_err(StoreError::from) {
        Ok(matches) => {
            shared.apply(matches, UpdateSource::Push, seq).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dropping push message");
            shared.record_error(e.to_string()).await;
        }
    }
}
