//! Periodic refresh of the match store.

use std::sync::Arc;

use super::matches::MatchStore;
use super::status::UpdateSource;

impl MatchStore {
    /// Fetch now, then again on every poll interval
    ///
    /// Replaces any timer installed by an earlier call. Each tick's fetch
    /// runs on its own task, so a slow response never delays the next tick
    /// and a failed tick does not stop polling.
    pub async fn start_polling(&self) {
        let mut poller = self.shared.poller.lock().await;

        if let Some(previous) = poller.take() {
            previous.abort();
            tracing::debug!("Replaced existing polling timer");
        }

        let interval = self.shared.config.poll_interval();
        let shared = Arc::clone(&self.shared);

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            url = %shared.client.endpoints().matches_url(),
            "Starting match polling"
        );

        *poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                // First tick completes immediately
                ticker.tick().await;

                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    if let Err(e) = shared.refresh(UpdateSource::Poll).await {
                        tracing::warn!(error = %e, "Match poll failed");
                    }
                });
            }
        }));
    }

    /// Cancel the polling timer
    ///
    /// Fetches already in flight still complete and apply.
    pub async fn stop_polling(&self) {
        if let Some(handle) = self.shared.poller.lock().await.take() {
            handle.abort();
            tracing::info!("Stopped match polling");
        }
    }

    /// Whether a polling timer is installed
    pub async fn is_polling(&self) -> bool {
        self.shared
            .poller
            .lock()
            .await
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}
