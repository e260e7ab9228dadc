//! Server-Sent Events (SSE) stream of automation status.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

use chatmote_app::ports::SettingsStore;

use crate::state::AppState;

/// `GET /api/status/stream`: the current status, then every change.
pub async fn stream<S>(
    State(state): State<AppState<S>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>
where
    S: SettingsStore + Send + Sync + 'static,
{
    let updates = WatchStream::new(state.status).filter_map(|status| {
        match Event::default().event("status").json_data(status) {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize status for SSE stream");
                None
            }
        }
    });

    Sse::new(updates).keep_alive(KeepAlive::default())
}
