//! Request/response channel into one execution context.
//!
//! An [`Endpoint`] is the sending half: cheap to clone, handed to every
//! component that talks to the context. The [`Inbox`] is drained by that
//! context's [`MessageRouter`](crate::message_router::MessageRouter). Each
//! request carries its own `oneshot` reply slot, which is how a response
//! finds its caller.

use std::time::Duration;

use chatmote_domain::error::{ChannelError, ChatmoteError};
use chatmote_domain::message::{Context, Envelope, Message, Response};
use tokio::sync::{mpsc, oneshot};

/// One in-flight request and the slot its response goes into.
#[derive(Debug)]
pub struct Call {
    pub envelope: Envelope,
    pub reply: oneshot::Sender<Response>,
}

/// Sending half of a context channel.
#[derive(Debug, Clone)]
pub struct Endpoint {
    context: Context,
    sender: mpsc::Sender<Call>,
    timeout: Option<Duration>,
}

/// Receiving half of a context channel.
#[derive(Debug)]
pub struct Inbox {
    context: Context,
    receiver: mpsc::Receiver<Call>,
}

/// Create a bounded channel into `context`.
#[must_use]
pub fn channel(context: Context, capacity: usize) -> (Endpoint, Inbox) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        Endpoint {
            context,
            sender,
            timeout: None,
        },
        Inbox { context, receiver },
    )
}

impl Endpoint {
    /// Bound how long a caller waits for a response. `None` waits forever.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn context(&self) -> Context {
        self.context
    }

    /// Deliver `envelope` and wait for its response.
    ///
    /// # Errors
    ///
    /// [`ChannelError::Disconnected`] when the context is gone or dropped the
    /// reply slot, [`ChannelError::TimedOut`] when a timeout is set and
    /// elapses first.
    pub async fn call(&self, envelope: Envelope) -> Result<Response, ChannelError> {
        let (reply, response) = oneshot::channel();
        tracing::trace!(context = %self.context, kind = %envelope.kind, id = %envelope.id, "sending request");
        self.sender
            .send(Call { envelope, reply })
            .await
            .map_err(|_| ChannelError::Disconnected(self.context))?;

        let received = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, response)
                .await
                .map_err(|_| ChannelError::TimedOut {
                    context: self.context,
                    after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })?,
            None => response.await,
        };
        received.map_err(|_| ChannelError::Disconnected(self.context))
    }

    /// Send a typed message and decode its typed reply.
    ///
    /// # Errors
    ///
    /// Transport failures as [`ChatmoteError::Channel`], failure responses as
    /// [`ChatmoteError::Remote`], undecodable replies as
    /// [`ChatmoteError::Codec`].
    pub async fn request<M: Message>(&self, message: &M) -> Result<M::Reply, ChatmoteError> {
        debug_assert_eq!(M::TARGET, self.context, "{} sent to wrong context", M::KIND);
        let envelope = Envelope::encode(message)?;
        self.call(envelope).await?.into_reply::<M>()
    }
}

impl Inbox {
    #[must_use]
    pub fn context(&self) -> Context {
        self.context
    }

    /// Next request, or `None` once every [`Endpoint`] is dropped.
    pub async fn recv(&mut self) -> Option<Call> {
        self.receiver.recv().await
    }
}
