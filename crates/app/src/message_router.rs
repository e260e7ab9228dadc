//! Per-context request router.
//!
//! Every [`Call`] arriving in a context's [`Inbox`] is answered exactly
//! once. The handler runs on its own task, so the reply slot stays open
//! until its async work completes and one slow request never blocks the
//! next. Handler errors, unknown kinds and handler panics all become
//! `{success: false, error}` responses; nothing crosses the boundary
//! unanswered.

use std::future::Future;
use std::sync::Arc;

use chatmote_domain::error::ChatmoteError;
use chatmote_domain::message::{Context, Envelope, Response};
use tokio::task::JoinHandle;

use crate::channel::{Call, Inbox};

/// Handles the message kinds of one context.
pub trait Dispatch: Send + Sync + 'static {
    /// Produce the response for one request.
    ///
    /// Return [`ChatmoteError::UnknownMessageKind`] for kinds this context
    /// does not handle.
    fn dispatch(
        &self,
        envelope: Envelope,
    ) -> impl Future<Output = Result<Response, ChatmoteError>> + Send;
}

/// Drains an [`Inbox`] into a [`Dispatch`] implementation.
pub struct MessageRouter<D> {
    context: Context,
    handler: Arc<D>,
}

impl<D> Clone for MessageRouter<D> {
    fn clone(&self) -> Self {
        Self {
            context: self.context,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<D: Dispatch> MessageRouter<D> {
    pub fn new(context: Context, handler: Arc<D>) -> Self {
        Self { context, handler }
    }

    /// Answer one call on a dedicated task.
    pub fn handle(&self, call: Call) -> JoinHandle<()> {
        let context = self.context;
        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move {
            let Call { envelope, reply } = call;
            let kind = envelope.kind.clone();
            let id = envelope.id;

            let work = tokio::spawn(async move { handler.dispatch(envelope).await });
            let response = match work.await {
                Ok(Ok(response)) => response,
                Ok(Err(err)) => {
                    tracing::warn!(%context, %kind, %id, error = %err, "request failed");
                    Response::failure(err)
                }
                Err(err) => {
                    tracing::error!(%context, %kind, %id, error = %err, "handler aborted");
                    Response::failure(format!("handler for {kind} aborted: {err}"))
                }
            };

            if reply.send(response).is_err() {
                tracing::debug!(%context, %kind, %id, "caller went away before the response");
            }
        })
    }

    /// Serve until every endpoint of the inbox is dropped.
    pub async fn run(self, mut inbox: Inbox) {
        tracing::debug!(context = %self.context, "router started");
        while let Some(call) = inbox.recv().await {
            self.handle(call);
        }
        tracing::debug!(context = %self.context, "router stopped");
    }

    /// Run the router on its own task.
    pub fn spawn(self, inbox: Inbox) -> JoinHandle<()> {
        tokio::spawn(self.run(inbox))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chatmote_domain::message::{Message, ShowToast};
    use serde_json::json;

    use super::*;
    use crate::channel::channel;

    struct Echo;

    impl Dispatch for Echo {
        async fn dispatch(&self, envelope: Envelope) -> Result<Response, ChatmoteError> {
            match envelope.kind.as_str() {
                ShowToast::KIND => {
                    let toast: ShowToast = envelope.decode()?;
                    Ok(Response::ok(json!(toast.message)))
                }
                "slow" => {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Ok(Response::ok(json!("late")))
                }
                "explode" => panic!("handler blew up"),
                other => Err(ChatmoteError::UnknownMessageKind(other.to_string())),
            }
        }
    }

    fn router() -> crate::channel::Endpoint {
        let (endpoint, inbox) = channel(Context::Content, 8);
        MessageRouter::new(Context::Content, Arc::new(Echo)).spawn(inbox);
        endpoint
    }

    #[tokio::test]
    async fn should_answer_known_kind() {
        let endpoint = router();

        let response = endpoint
            .call(Envelope::new("show-toast", json!({"message": "hey"})))
            .await
            .unwrap();

        assert_eq!(response, Response::ok(json!("hey")));
    }

    #[tokio::test]
    async fn should_answer_unknown_kind_with_failure() {
        let endpoint = router();

        let response = endpoint
            .call(Envelope::new("unknown-xyz", json!(null)))
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("unknown message kind: unknown-xyz")
        );
    }

    #[tokio::test]
    async fn should_convert_decode_error_into_failure() {
        let endpoint = router();

        let response = endpoint
            .call(Envelope::new("show-toast", json!({"wrong": true})))
            .await
            .unwrap();

        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("malformed message"));
    }

    #[tokio::test]
    async fn should_convert_panic_into_failure() {
        let endpoint = router();

        let response = endpoint
            .call(Envelope::new("explode", json!(null)))
            .await
            .unwrap();

        assert!(!response.success);
        assert!(response.error.unwrap().contains("explode"));
    }

    #[tokio::test]
    async fn should_keep_serving_after_panic() {
        let endpoint = router();
        let _ = endpoint.call(Envelope::new("explode", json!(null))).await;

        let response = endpoint
            .call(Envelope::new("show-toast", json!({"message": "still here"})))
            .await
            .unwrap();

        assert!(response.success);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_block_fast_request_behind_slow_one() {
        let endpoint = router();
        let slow = {
            let endpoint = endpoint.clone();
            tokio::spawn(async move { endpoint.call(Envelope::new("slow", json!(null))).await })
        };
        tokio::task::yield_now().await;
        let started = tokio::time::Instant::now();

        let fast = endpoint
            .call(Envelope::new("show-toast", json!({"message": "first"})))
            .await
            .unwrap();

        assert_eq!(fast.data, json!("first"));
        assert!(started.elapsed() < Duration::from_millis(500));
        let late = slow.await.unwrap().unwrap();
        assert_eq!(late.data, json!("late"));
    }
}
