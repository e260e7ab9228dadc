//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod automation;
#[allow(clippy::missing_errors_doc)]
pub mod messages;
#[allow(clippy::missing_errors_doc)]
pub mod settings;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use chatmote_app::ports::SettingsStore;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S>() -> Router<AppState<S>>
where
    S: SettingsStore + Send + Sync + 'static,
{
    Router::new()
        // Automation
        .route("/status", get(automation::status::<S>))
        .route("/status/stream", get(sse::stream::<S>))
        .route("/send", post(automation::send::<S>))
        .route("/automation/start", post(automation::start::<S>))
        .route("/automation/stop", post(automation::stop::<S>))
        .route("/automation/toggle", post(automation::toggle::<S>))
        // Settings
        .route(
            "/settings",
            get(settings::get::<S>).put(settings::update::<S>),
        )
        // Raw messages
        .route("/messages", post(messages::send::<S>))
}
