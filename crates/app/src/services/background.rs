//! Background context service: user commands, chat activity signals and
//! the privileged relay into the page.

use std::sync::Arc;

use chatmote_domain::error::ChatmoteError;
use chatmote_domain::message::{
    CallPageFunction, ChatActivityDetected, Envelope, GetAutomationStatus, GetVariable,
    InvokeGlobal, Message, ReadGlobal, Response, SetVariable, SettingsUpdated, StartAutomation,
    StopAutomation, ToggleAutomation, TriggerManualSend, WriteGlobal,
};

use crate::automation_controller::{AutomationController, StopReason};
use crate::channel::Endpoint;
use crate::message_router::Dispatch;
use crate::ports::{Notifier, SettingsStore};

/// Routes background message kinds to the [`AutomationController`] and
/// relays variable access to the page context.
pub struct BackgroundService<S, N> {
    controller: Arc<AutomationController<S, N>>,
    page: Endpoint,
}

impl<S, N> BackgroundService<S, N> {
    pub fn new(controller: Arc<AutomationController<S, N>>, page: Endpoint) -> Self {
        Self { controller, page }
    }

    pub fn controller(&self) -> &Arc<AutomationController<S, N>> {
        &self.controller
    }
}

impl<S, N> Dispatch for BackgroundService<S, N>
where
    S: SettingsStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    #[tracing::instrument(skip(self, envelope), fields(kind = %envelope.kind, id = %envelope.id))]
    async fn dispatch(&self, envelope: Envelope) -> Result<Response, ChatmoteError> {
        let controller = &self.controller;
        match envelope.kind.as_str() {
            GetAutomationStatus::KIND => {
                Response::reply::<GetAutomationStatus>(&controller.status())
            }
            SettingsUpdated::KIND => {
                controller.settings_updated();
                Response::reply::<SettingsUpdated>(&())
            }
            ChatActivityDetected::KIND => {
                let status = controller.on_distinct_activity().await;
                Response::reply::<ChatActivityDetected>(&status)
            }
            GetVariable::KIND => {
                let msg: GetVariable = envelope.decode()?;
                let value = self.page.request(&ReadGlobal { name: msg.name }).await?;
                Response::reply::<GetVariable>(&value)
            }
            SetVariable::KIND => {
                let msg: SetVariable = envelope.decode()?;
                self.page
                    .request(&WriteGlobal {
                        name: msg.name,
                        value: msg.value,
                    })
                    .await?;
                Response::reply::<SetVariable>(&())
            }
            CallPageFunction::KIND => {
                let msg: CallPageFunction = envelope.decode()?;
                let result = self
                    .page
                    .request(&InvokeGlobal {
                        name: msg.name,
                        args: msg.args,
                    })
                    .await?;
                Response::reply::<CallPageFunction>(&result)
            }
            StartAutomation::KIND => {
                let status = controller.start().await;
                Response::reply::<StartAutomation>(&status)
            }
            StopAutomation::KIND => {
                let status = controller.stop(StopReason::User).await;
                Response::reply::<StopAutomation>(&status)
            }
            ToggleAutomation::KIND => {
                let status = controller.toggle().await;
                Response::reply::<ToggleAutomation>(&status)
            }
            TriggerManualSend::KIND => {
                let outcome = controller.send_manual().await?;
                Response::reply::<TriggerManualSend>(&outcome)
            }
            other => Err(ChatmoteError::UnknownMessageKind(other.to_string())),
        }
    }
}
