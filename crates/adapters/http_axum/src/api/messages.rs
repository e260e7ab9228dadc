//! Raw message passthrough to the background context.

use axum::Json;
use axum::extract::State;

use chatmote_app::ports::SettingsStore;
use chatmote_domain::message::{Envelope, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/messages`: `{kind, payload}` in, the router's `Response` out.
///
/// Handler failures (including unknown kinds) are part of the `Response`
/// body; only an unreachable background context is an HTTP error.
pub async fn send<S>(
    State(state): State<AppState<S>>,
    Json(envelope): Json<Envelope>,
) -> Result<Json<Response>, ApiError>
where
    S: SettingsStore + Send + Sync + 'static,
{
    tracing::debug!(kind = %envelope.kind, id = %envelope.id, "forwarding raw message");
    Ok(Json(state.background.call(envelope).await?))
}
