//! Automation commands, as the popup would send them.

use axum::Json;
use axum::extract::State;

use chatmote_app::ports::SettingsStore;
use chatmote_domain::automation::AutomationStatus;
use chatmote_domain::message::{
    GetAutomationStatus, StartAutomation, StopAutomation, ToggleAutomation, TriggerManualSend,
};
use chatmote_domain::payload::SendOutcome;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/status`: current automation status.
pub async fn status<S>(State(state): State<AppState<S>>) -> Result<Json<AutomationStatus>, ApiError>
where
    S: SettingsStore + Send + Sync + 'static,
{
    Ok(Json(state.background.request(&GetAutomationStatus).await?))
}

/// `POST /api/automation/start`
pub async fn start<S>(State(state): State<AppState<S>>) -> Result<Json<AutomationStatus>, ApiError>
where
    S: SettingsStore + Send + Sync + 'static,
{
    Ok(Json(state.background.request(&StartAutomation).await?))
}

/// `POST /api/automation/stop`
pub async fn stop<S>(State(state): State<AppState<S>>) -> Result<Json<AutomationStatus>, ApiError>
where
    S: SettingsStore + Send + Sync + 'static,
{
    Ok(Json(state.background.request(&StopAutomation).await?))
}

/// `POST /api/automation/toggle`
pub async fn toggle<S>(State(state): State<AppState<S>>) -> Result<Json<AutomationStatus>, ApiError>
where
    S: SettingsStore + Send + Sync + 'static,
{
    Ok(Json(state.background.request(&ToggleAutomation).await?))
}

/// `POST /api/send`: one manual send.
///
/// Rejected with `409` inside the cooldown window or while another send is
/// in flight. A send that reached the page but failed there is still `200`
/// with `success: false`.
pub async fn send<S>(State(state): State<AppState<S>>) -> Result<Json<SendOutcome>, ApiError>
where
    S: SettingsStore + Send + Sync + 'static,
{
    Ok(Json(state.background.request(&TriggerManualSend).await?))
}
