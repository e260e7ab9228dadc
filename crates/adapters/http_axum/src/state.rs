//! Shared application state for axum handlers.

use std::sync::Arc;

use chatmote_app::channel::Endpoint;
use chatmote_domain::automation::AutomationStatus;
use tokio::sync::watch;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the settings store itself does not
/// need to be `Clone`.
pub struct AppState<S> {
    /// Endpoint of the background context; every command goes through it.
    pub background: Endpoint,
    /// Settings store, written by `PUT /api/settings`.
    pub settings: Arc<S>,
    /// Latest automation status.
    pub status: watch::Receiver<AutomationStatus>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            background: self.background.clone(),
            settings: Arc::clone(&self.settings),
            status: self.status.clone(),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(
        background: Endpoint,
        settings: Arc<S>,
        status: watch::Receiver<AutomationStatus>,
    ) -> Self {
        Self {
            background,
            settings,
            status,
        }
    }
}
