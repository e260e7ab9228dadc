//! Chat activity monitor: watches appended chat entries and tells the
//! background context when someone other than the last author spoke.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chatmote_domain::chat::{AuthorTracker, ChatEntry};
use chatmote_domain::message::ChatActivityDetected;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

use crate::channel::Endpoint;
use crate::ports::HostPage;

/// Wait before looking for the chat container again.
pub const CHAT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct MonitorState {
    tracker: AuthorTracker,
    observer: Option<JoinHandle<()>>,
    /// Set by a temporary stop; [`ChatActivityMonitor::resume`] clears it.
    suspended: bool,
}

/// Owned by the content context. At most one observer task runs at a time.
pub struct ChatActivityMonitor<P> {
    page: P,
    background: Endpoint,
    state: Mutex<MonitorState>,
}

impl<P: HostPage + 'static> ChatActivityMonitor<P> {
    pub fn new(page: P, background: Endpoint) -> Self {
        Self {
            page,
            background,
            state: Mutex::new(MonitorState::default()),
        }
    }

    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.lock().observer.is_some()
    }

    /// Attach to the chat list. Idempotent.
    ///
    /// The tracker is re-seeded from the newest entry already on the page,
    /// so history never counts as activity.
    pub fn start_observing(self: &Arc<Self>) {
        let mut state = self.lock();
        if state.observer.is_some() {
            tracing::debug!("already observing chat");
            return;
        }
        state.tracker = AuthorTracker::seeded(self.page.last_chat_author());
        state.suspended = false;
        state.observer = Some(self.spawn_observer());
        tracing::info!(seed = ?state.tracker.last_author(), "chat observation started");
    }

    /// Detach from the chat list. Returns whether an observer was running.
    ///
    /// A `temporary` stop keeps the tracked author for [`resume`](Self::resume);
    /// a full stop forgets it.
    pub fn stop_observing(&self, temporary: bool) -> bool {
        let mut state = self.lock();
        let was_observing = match state.observer.take() {
            Some(observer) => {
                observer.abort();
                true
            }
            None => false,
        };
        if temporary {
            state.suspended |= was_observing;
        } else {
            state.tracker.reset();
            state.suspended = false;
        }
        tracing::debug!(temporary, was_observing, "chat observation stopped");
        was_observing
    }

    /// Re-attach after a temporary stop without touching the tracker.
    pub fn resume(self: &Arc<Self>) {
        let mut state = self.lock();
        if !state.suspended || state.observer.is_some() {
            return;
        }
        state.suspended = false;
        state.observer = Some(self.spawn_observer());
        tracing::debug!("chat observation resumed");
    }

    fn spawn_observer(self: &Arc<Self>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move { monitor.observe().await })
    }

    async fn observe(&self) {
        loop {
            let Some(mut batches) = self.page.observe_chat() else {
                tracing::debug!(retry_in = ?CHAT_RETRY_DELAY, "chat container not found");
                tokio::time::sleep(CHAT_RETRY_DELAY).await;
                continue;
            };
            while let Some(batch) = batches.next().await {
                self.on_batch(&batch).await;
            }
            tracing::debug!("chat feed ended, reattaching");
            tokio::time::sleep(CHAT_RETRY_DELAY).await;
        }
    }

    async fn on_batch(&self, batch: &[ChatEntry]) {
        let distinct = self.lock().tracker.observe(batch);
        if !distinct {
            return;
        }
        tracing::debug!(entries = batch.len(), "distinct chat activity");
        match self.background.request(&ChatActivityDetected).await {
            Ok(status) => tracing::trace!(?status, "activity acknowledged"),
            Err(err) => tracing::warn!(error = %err, "failed to report chat activity"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
