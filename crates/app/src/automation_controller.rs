//! Automation controller: the automatic send loop.
//!
//! Wraps the pure [`AutomationState`] with the side effects the loop needs:
//! randomized timers, `inject-and-send` requests to the content context,
//! observation commands and toasts. All state changes go through this type.
//!
//! Timer callbacks are guarded twice: `stop()` aborts the pending timer task,
//! and every callback re-checks the generation it was scheduled under before
//! acting. A tokio mutex (the cycle lock) keeps at most one send in flight.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chatmote_domain::automation::{
    AutomationState, AutomationStatus, Ignored, Phase, SendVerdict,
};
use chatmote_domain::error::SendError;
use chatmote_domain::message::{InjectAndSend, StartObservation, StopObservation};
use chatmote_domain::payload::SendOutcome;
use chatmote_domain::settings::Settings;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::channel::Endpoint;
use crate::ports::{Notifier, SettingsStore};

/// Why automation is being stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Explicit user command.
    User,
    /// A send failed; automation never retries on its own.
    Error(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user request"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    automation: AutomationState,
    /// Pending send timer; present iff the phase is `Running` and no cycle
    /// is executing.
    timer: Option<JoinHandle<()>>,
}

type Cycle = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Owns the automation state. Lives in the background context.
pub struct AutomationController<S, N> {
    settings: S,
    notifier: N,
    content: Endpoint,
    inner: Mutex<Inner>,
    cycle: tokio::sync::Mutex<()>,
    status_tx: watch::Sender<AutomationStatus>,
    rng: Mutex<StdRng>,
}

impl<S, N> AutomationController<S, N>
where
    S: SettingsStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(settings: S, notifier: N, content: Endpoint) -> Self {
        Self::with_rng(settings, notifier, content, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) with a deterministic random source.
    pub fn with_rng(settings: S, notifier: N, content: Endpoint, rng: StdRng) -> Self {
        let (status_tx, _) = watch::channel(AutomationStatus::default());
        Self {
            settings,
            notifier,
            content,
            inner: Mutex::new(Inner::default()),
            cycle: tokio::sync::Mutex::new(()),
            status_tx,
            rng: Mutex::new(rng),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn status(&self) -> AutomationStatus {
        self.lock().automation.status()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lock().automation.phase()
    }

    #[must_use]
    pub fn consecutive_sends(&self) -> u32 {
        self.lock().automation.consecutive_sends()
    }

    /// Whether a send timer is pending.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        self.lock().timer.is_some()
    }

    /// Receiver that observes every status transition.
    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<AutomationStatus> {
        self.status_tx.subscribe()
    }

    /// `Stopped → Running`. A no-op when already running or paused.
    #[tracing::instrument(skip(self))]
    pub async fn start(self: &Arc<Self>) -> AutomationStatus {
        let started = self.lock().automation.start();
        let generation = match started {
            Ok(generation) => generation,
            Err(ignored) => {
                tracing::debug!(reason = %ignored, "start ignored");
                return self.status();
            }
        };
        tracing::info!(generation, "automation started");
        self.publish();

        self.notifier.notify("Automation started".to_string()).await;
        if let Err(err) = self.content.request(&StartObservation).await {
            tracing::warn!(error = %err, "could not start chat observation");
        }
        self.schedule(generation).await;
        self.status()
    }

    /// `Running | RunningPaused → Stopped`. A no-op when already stopped.
    #[tracing::instrument(skip(self))]
    pub async fn stop(&self, reason: StopReason) -> AutomationStatus {
        self.halt(reason, None).await;
        self.status()
    }

    /// Stop when running, start otherwise.
    pub async fn toggle(self: &Arc<Self>) -> AutomationStatus {
        if self.status().is_running {
            self.stop(StopReason::User).await
        } else {
            self.start().await
        }
    }

    /// Distinct chat activity: reset the counter and resume a paused loop.
    #[tracing::instrument(skip(self))]
    pub async fn on_distinct_activity(self: &Arc<Self>) -> AutomationStatus {
        let resumed = self.lock().automation.record_distinct_activity();
        match resumed {
            Ok(generation) => {
                tracing::info!(generation, "chat activity detected, resuming");
                self.publish();
                self.notifier
                    .notify("Chat activity detected, resuming automation".to_string())
                    .await;
                self.schedule(generation).await;
            }
            Err(Ignored::NotPaused) => tracing::debug!("chat activity, send counter reset"),
            Err(ignored) => tracing::trace!(reason = %ignored, "chat activity ignored"),
        }
        self.status()
    }

    /// Manual send, outside the automation state machine.
    ///
    /// # Errors
    ///
    /// [`SendError::CooldownActive`] inside the cooldown window,
    /// [`SendError::AlreadyExecuting`] while another send is in flight,
    /// [`SendError::RemoteExecutionFailed`] when the content context cannot
    /// be reached. Automation state is never touched.
    #[tracing::instrument(skip(self))]
    pub async fn send_manual(&self) -> Result<SendOutcome, SendError> {
        let cooldown = self
            .lock()
            .automation
            .check_manual_cooldown(Instant::now().into_std());
        if let Err(err) = cooldown {
            tracing::debug!(error = %err, "manual send rejected");
            self.notifier.notify(err.to_string()).await;
            return Err(err);
        }
        let Ok(_cycle) = self.cycle.try_lock() else {
            let err = SendError::AlreadyExecuting;
            self.notifier.notify(err.to_string()).await;
            return Err(err);
        };

        let outcome = self
            .content
            .request(&InjectAndSend { is_auto: false })
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "manual send did not reach the page");
                SendError::RemoteExecutionFailed(err.to_string())
            })?;
        if outcome.success {
            self.lock()
                .automation
                .record_manual_success(Instant::now().into_std());
        }
        tracing::info!(success = outcome.success, "manual send finished");
        Ok(outcome)
    }

    /// The settings store changed. Nothing is cached, so this only logs.
    pub fn settings_updated(&self) {
        tracing::info!("settings updated, applied from the next scheduling decision");
    }

    async fn halt(&self, reason: StopReason, expected: Option<u64>) {
        let (previous, timer) = {
            let mut inner = self.lock();
            if expected.is_some_and(|generation| !inner.automation.is_current(generation)) {
                tracing::debug!(%reason, "stale stop ignored");
                return;
            }
            match inner.automation.stop() {
                Ok(previous) => (previous, inner.timer.take()),
                Err(ignored) => {
                    tracing::debug!(reason = %ignored, "stop ignored");
                    return;
                }
            }
        };
        if let Some(timer) = timer {
            timer.abort();
        }
        tracing::info!(%reason, "automation stopped");
        self.publish();

        if let Err(err) = self.content.request(&StopObservation).await {
            tracing::warn!(error = %err, "could not stop chat observation");
        }
        if reason == StopReason::User || previous != Phase::RunningPaused {
            let message = match &reason {
                StopReason::User => "Automation stopped".to_string(),
                StopReason::Error(_) => format!("Automation stopped ({reason})"),
            };
            self.notifier.notify(message).await;
        }
    }

    /// Arm the send timer with a fresh random delay.
    async fn schedule(self: &Arc<Self>, generation: u64) {
        let settings = self.load_settings().await;
        let delay = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            settings.delay_range().sample(&mut *rng)
        };

        let mut inner = self.lock();
        if !inner.automation.is_current(generation) {
            tracing::debug!(generation, "schedule skipped, state moved on");
            return;
        }
        let controller = Arc::clone(self);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.fire(generation).await;
        });
        if let Some(previous) = inner.timer.replace(timer) {
            previous.abort();
        }
        tracing::debug!(generation, delay_ms = delay.as_millis(), "next send scheduled");
    }

    fn fire(self: Arc<Self>, generation: u64) -> Cycle {
        Box::pin(async move { self.run_cycle(generation).await })
    }

    async fn run_cycle(self: &Arc<Self>, generation: u64) {
        let _cycle = self.cycle.lock().await;
        {
            let mut inner = self.lock();
            if !inner.automation.is_current(generation) {
                tracing::debug!(generation, "stale timer ignored");
                return;
            }
            // Detach from the running task; a stop from here on must not
            // abort the in-flight send.
            inner.timer = None;
        }

        let outcome = self.content.request(&InjectAndSend { is_auto: true }).await;
        match outcome {
            Ok(outcome) if outcome.success => self.after_auto_success(generation).await,
            Ok(outcome) => {
                let reason = outcome
                    .error_reason
                    .unwrap_or_else(|| "send failed".to_string());
                self.halt(StopReason::Error(reason), Some(generation)).await;
            }
            Err(err) => {
                self.halt(StopReason::Error(err.to_string()), Some(generation))
                    .await;
            }
        }
    }

    async fn after_auto_success(self: &Arc<Self>, generation: u64) {
        let verdict = {
            let mut inner = self.lock();
            if !inner.automation.is_current(generation) {
                tracing::debug!(generation, "send finished after state moved on");
                return;
            }
            inner.automation.record_auto_success()
        };
        match verdict {
            Ok(SendVerdict::Continue) => {
                tracing::debug!(sends = self.consecutive_sends(), "automatic send delivered");
                self.schedule(generation).await;
            }
            Ok(SendVerdict::Pause) => {
                tracing::info!("spam guard tripped, pausing until chat activity");
                self.publish();
                self.notifier
                    .notify("Paused: waiting for other chat activity".to_string())
                    .await;
            }
            Err(ignored) => tracing::debug!(reason = %ignored, "send result ignored"),
        }
    }

    async fn load_settings(&self) -> Settings {
        self.settings.load().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "settings unavailable, using defaults");
            Settings::default()
        })
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.status());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
