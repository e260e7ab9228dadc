//! Content context service: sends, toasts and chat observation on the
//! host page.

use std::sync::Arc;

use chatmote_domain::automation::AutomationStatus;
use chatmote_domain::error::ChatmoteError;
use chatmote_domain::message::{
    Envelope, GetAutomationStatus, InjectAndSend, Message, Response, ShowToast, StartObservation,
    StopObservation,
};
use chatmote_domain::payload::SendOutcome;

use crate::action_dispatcher::ActionDispatcher;
use crate::channel::Endpoint;
use crate::chat_monitor::ChatActivityMonitor;
use crate::message_router::Dispatch;
use crate::ports::{EmoticonCatalog, HostPage, Notifier, SettingsStore};

/// Routes content message kinds to the [`ActionDispatcher`] and the
/// [`ChatActivityMonitor`].
pub struct ContentService<P, S, C, N> {
    dispatcher: ActionDispatcher<P, S, C, N>,
    monitor: Arc<ChatActivityMonitor<P>>,
    notifier: N,
    background: Endpoint,
}

impl<P, S, C, N> ContentService<P, S, C, N>
where
    P: HostPage + 'static,
    S: SettingsStore + Send + Sync + 'static,
    C: EmoticonCatalog + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(
        dispatcher: ActionDispatcher<P, S, C, N>,
        monitor: Arc<ChatActivityMonitor<P>>,
        notifier: N,
        background: Endpoint,
    ) -> Self {
        Self {
            dispatcher,
            monitor,
            notifier,
            background,
        }
    }

    /// Page-load handshake: pick up observation when automation was already
    /// running before this page was (re)loaded.
    ///
    /// Returns the status the background reported, `None` when it could not
    /// be reached. The pause flag stays with the background controller; it
    /// is only logged here.
    pub async fn on_page_load(&self) -> Option<AutomationStatus> {
        let status = match self.background.request(&GetAutomationStatus).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = %err, "could not query automation status");
                return None;
            }
        };
        tracing::debug!(
            is_running = status.is_running,
            is_paused = status.is_paused,
            "automation status on page load"
        );
        if status.is_running {
            tracing::info!("automation already running, observing chat");
            self.monitor.start_observing();
        }
        Some(status)
    }

    async fn inject_and_send(&self, is_auto: bool) -> SendOutcome {
        if !is_auto {
            return self.dispatcher.send(false).await;
        }
        // The extension's own message must not count as chat activity.
        let suspended = self.monitor.stop_observing(true);
        let outcome = self.dispatcher.send(true).await;
        if suspended {
            self.monitor.resume();
        }
        outcome
    }
}

impl<P, S, C, N> Dispatch for ContentService<P, S, C, N>
where
    P: HostPage + 'static,
    S: SettingsStore + Send + Sync + 'static,
    C: EmoticonCatalog + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    #[tracing::instrument(skip(self, envelope), fields(kind = %envelope.kind, id = %envelope.id))]
    async fn dispatch(&self, envelope: Envelope) -> Result<Response, ChatmoteError> {
        match envelope.kind.as_str() {
            InjectAndSend::KIND => {
                let msg: InjectAndSend = envelope.decode()?;
                let outcome = self.inject_and_send(msg.is_auto).await;
                Response::reply::<InjectAndSend>(&outcome)
            }
            ShowToast::KIND => {
                let msg: ShowToast = envelope.decode()?;
                self.notifier.notify(msg.message).await;
                Response::reply::<ShowToast>(&())
            }
            StartObservation::KIND => {
                self.monitor.start_observing();
                Response::reply::<StartObservation>(&())
            }
            StopObservation::KIND => {
                self.monitor.stop_observing(false);
                Response::reply::<StopObservation>(&())
            }
            other => Err(ChatmoteError::UnknownMessageKind(other.to_string())),
        }
    }
}
