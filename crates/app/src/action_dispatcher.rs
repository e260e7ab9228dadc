//! Action dispatcher: composes and performs one send.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chatmote_domain::error::{ChatmoteError, SendError};
use chatmote_domain::payload::{SendOutcome, SendPayload, WORKING_CHAT_VAR, WORKING_EMOTICON_VAR};
use chatmote_domain::settings::Settings;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};

use crate::ports::{EmoticonCatalog, HostPage, KeyPhase, Notifier, SettingsStore};
use crate::variable_bridge::VariableBridge;

/// Pause before submitting an automatic send, to mimic human pacing.
pub const AUTO_SEND_DELAY: Duration = Duration::from_millis(150);
/// Gap between key press and key release.
pub const KEY_RELEASE_DELAY: Duration = Duration::from_millis(50);
/// Time the page gets to pick up the submit.
pub const SUBMIT_SETTLE: Duration = Duration::from_millis(200);
/// Wait before the input is cleared.
pub const CLEAR_DELAY: Duration = Duration::from_millis(200);

/// Performs sends against the host page. Owned by the content context.
pub struct ActionDispatcher<P, S, C, N> {
    page: P,
    settings: S,
    catalog: C,
    notifier: N,
    bridge: VariableBridge,
    rng: Mutex<StdRng>,
}

impl<P, S, C, N> ActionDispatcher<P, S, C, N>
where
    P: HostPage,
    S: SettingsStore + Sync,
    C: EmoticonCatalog + Sync,
    N: Notifier + Sync,
{
    pub fn new(page: P, settings: S, catalog: C, notifier: N, bridge: VariableBridge) -> Self {
        Self::with_rng(page, settings, catalog, notifier, bridge, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) with a deterministic random source.
    pub fn with_rng(
        page: P,
        settings: S,
        catalog: C,
        notifier: N,
        bridge: VariableBridge,
        rng: StdRng,
    ) -> Self {
        Self {
            page,
            settings,
            catalog,
            notifier,
            bridge,
            rng: Mutex::new(rng),
        }
    }

    /// Choose repetitions and an emoticon, then compose the payload on top
    /// of what the input already holds. Touches no page state.
    ///
    /// # Errors
    ///
    /// [`SendError::NoEmoticonsAvailable`] on an empty catalog,
    /// [`SendError::InputAreaNotFound`] when the input cannot be located,
    /// or a catalog error.
    #[tracing::instrument(skip(self))]
    pub async fn prepare_send(&self) -> Result<SendPayload, ChatmoteError> {
        let settings = self.settings.load().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "settings unavailable, using defaults");
            Settings::default()
        });
        let emoticons = self.catalog.enabled().await?;
        if emoticons.is_empty() {
            return Err(SendError::NoEmoticonsAvailable.into());
        }
        if !self.page.has_input() {
            return Err(SendError::InputAreaNotFound.into());
        }

        let (emoticon, repetitions) = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            let repetitions = settings.repetition_range().sample(&mut *rng);
            let emoticon = emoticons
                .choose(&mut *rng)
                .cloned()
                .ok_or(SendError::NoEmoticonsAvailable)?;
            (emoticon, repetitions)
        };

        let existing_chat = self
            .bridge
            .get(WORKING_CHAT_VAR)
            .await
            .and_then(|value| value.as_str().map(ToOwned::to_owned))
            .unwrap_or_default();
        let emoticon_map = match self.bridge.get(WORKING_EMOTICON_VAR).await {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        tracing::debug!(key = %emoticon.display_key, repetitions, "payload prepared");
        Ok(SendPayload::compose(
            emoticon,
            repetitions,
            &existing_chat,
            emoticon_map,
        ))
    }

    /// Perform one send. Never fails: errors are shown to the user and
    /// reported in the outcome.
    #[tracing::instrument(skip(self))]
    pub async fn send(&self, is_auto: bool) -> SendOutcome {
        match self.try_send(is_auto).await {
            Ok(()) => SendOutcome::delivered(),
            Err(err) => {
                tracing::warn!(error = %err, "send failed");
                self.notifier.notify(format!("Send failed: {err}")).await;
                SendOutcome::failed(err.to_string())
            }
        }
    }

    async fn try_send(&self, is_auto: bool) -> Result<(), ChatmoteError> {
        let payload = self.prepare_send().await?;

        self.page
            .write_input(&payload.markup)
            .map_err(SendError::from)?;
        if self.page_tracks_chat().await {
            self.bridge
                .set(WORKING_CHAT_VAR, Value::String(payload.working_chat.clone()))
                .await;
            self.bridge
                .set(WORKING_EMOTICON_VAR, Value::Object(payload.emoticon_map.clone()))
                .await;
        }

        if is_auto {
            tokio::time::sleep(AUTO_SEND_DELAY).await;
        }

        self.submit().await?;

        self.page.clear_input().map_err(SendError::from)?;
        if self.page_tracks_chat().await {
            self.bridge
                .set(WORKING_CHAT_VAR, Value::String(String::new()))
                .await;
            self.bridge
                .set(WORKING_EMOTICON_VAR, Value::Object(Map::new()))
                .await;
        }

        tracing::info!(
            key = %payload.emoticon.display_key,
            repetitions = payload.repetitions,
            is_auto,
            "sent"
        );
        Ok(())
    }

    async fn submit(&self) -> Result<(), SendError> {
        self.page.dispatch_key(KeyPhase::Down)?;
        self.page.dispatch_key(KeyPhase::Press)?;
        tokio::time::sleep(KEY_RELEASE_DELAY).await;
        self.page.dispatch_key(KeyPhase::Up)?;
        tokio::time::sleep(SUBMIT_SETTLE).await;
        tokio::time::sleep(CLEAR_DELAY).await;
        Ok(())
    }

    /// Pages without the working-chat global are incompatible with
    /// mirroring; the step is skipped there, the globals are never created.
    async fn page_tracks_chat(&self) -> bool {
        self.bridge.get(WORKING_CHAT_VAR).await.is_some()
    }
}
