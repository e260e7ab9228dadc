//! Settings read and write.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use chatmote_app::ports::SettingsStore;
use chatmote_domain::message::SettingsUpdated;
use chatmote_domain::settings::Settings;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the settings endpoints.
pub enum SettingsResponse {
    Ok(Json<Settings>),
}

impl IntoResponse for SettingsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/settings`
pub async fn get<S>(State(state): State<AppState<S>>) -> Result<SettingsResponse, ApiError>
where
    S: SettingsStore + Send + Sync + 'static,
{
    let settings = state.settings.load().await?;
    Ok(SettingsResponse::Ok(Json(settings)))
}

/// `PUT /api/settings`: validate, store, then tell the background context.
pub async fn update<S>(
    State(state): State<AppState<S>>,
    Json(settings): Json<Settings>,
) -> Result<SettingsResponse, ApiError>
where
    S: SettingsStore + Send + Sync + 'static,
{
    settings.validate()?;
    state.settings.save(settings).await?;
    if let Err(err) = state.background.request(&SettingsUpdated).await {
        tracing::warn!(error = %err, "settings saved but background not notified");
    }
    Ok(SettingsResponse::Ok(Json(settings)))
}
