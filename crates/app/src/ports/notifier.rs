//! Notifier port: transient on-screen notifications.

use std::future::Future;
use std::sync::Arc;

/// Shows a short-lived message to the user. Never fails; delivery problems
/// are logged by the implementation.
pub trait Notifier {
    fn notify(&self, message: String) -> impl Future<Output = ()> + Send;
}

impl<T: Notifier + Send + Sync> Notifier for Arc<T> {
    fn notify(&self, message: String) -> impl Future<Output = ()> + Send {
        (**self).notify(message)
    }
}
