//! Page context service: the privileged side of the variable relay.

use chatmote_domain::error::ChatmoteError;
use chatmote_domain::message::{Envelope, InvokeGlobal, Message, ReadGlobal, Response, WriteGlobal};

use crate::message_router::Dispatch;
use crate::ports::PageGlobals;

/// Answers `read-global`, `write-global` and `invoke-global` against the
/// page's own script world.
pub struct PageService<G> {
    globals: G,
}

impl<G: PageGlobals> PageService<G> {
    pub fn new(globals: G) -> Self {
        Self { globals }
    }
}

impl<G: PageGlobals + 'static> Dispatch for PageService<G> {
    #[tracing::instrument(skip(self, envelope), fields(kind = %envelope.kind))]
    async fn dispatch(&self, envelope: Envelope) -> Result<Response, ChatmoteError> {
        match envelope.kind.as_str() {
            ReadGlobal::KIND => {
                let msg: ReadGlobal = envelope.decode()?;
                Response::reply::<ReadGlobal>(&self.globals.read(&msg.name))
            }
            WriteGlobal::KIND => {
                let msg: WriteGlobal = envelope.decode()?;
                self.globals.write(&msg.name, msg.value);
                Response::reply::<WriteGlobal>(&())
            }
            InvokeGlobal::KIND => {
                let msg: InvokeGlobal = envelope.decode()?;
                let result = self.globals.invoke(&msg.name, &msg.args)?;
                Response::reply::<InvokeGlobal>(&result)
            }
            other => Err(ChatmoteError::UnknownMessageKind(other.to_string())),
        }
    }
}
