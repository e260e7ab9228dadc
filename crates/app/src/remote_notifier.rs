//! Toasts raised outside the content context are relayed to it.

use chatmote_domain::message::ShowToast;

use crate::channel::Endpoint;
use crate::ports::Notifier;

/// [`Notifier`] that forwards every message as `show-toast` to the content
/// context, which owns the page the toast is rendered on.
#[derive(Debug, Clone)]
pub struct ToastRelay {
    content: Endpoint,
}

impl ToastRelay {
    pub fn new(content: Endpoint) -> Self {
        Self { content }
    }
}

impl Notifier for ToastRelay {
    async fn notify(&self, message: String) {
        if let Err(err) = self.content.request(&ShowToast { message }).await {
            tracing::warn!(error = %err, "toast not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use chatmote_domain::message::{Context, Envelope, Response};

    use super::*;
    use crate::channel::channel;

    #[tokio::test]
    async fn should_forward_message_as_show_toast() {
        let (endpoint, mut inbox) = channel(Context::Content, 4);
        let relay = ToastRelay::new(endpoint);
        let received = tokio::spawn(async move {
            let call = inbox.recv().await.unwrap();
            call.reply.send(Response::ok(serde_json::Value::Null)).unwrap();
            call.envelope
        });

        relay.notify("Automation started".to_string()).await;

        let envelope: Envelope = received.await.unwrap();
        assert_eq!(envelope.kind, "show-toast");
        assert_eq!(envelope.payload, serde_json::json!({"message": "Automation started"}));
    }

    #[tokio::test]
    async fn should_swallow_delivery_failure() {
        let (endpoint, inbox) = channel(Context::Content, 4);
        drop(inbox);

        ToastRelay::new(endpoint).notify("lost".to_string()).await;
    }
}
