//! Host page ports: the DOM the content context touches and the globals
//! only the page's own script world can reach.

use std::pin::Pin;
use std::sync::Arc;

use chatmote_domain::chat::ChatBatch;
use chatmote_domain::error::{PageError, ScriptError};
use serde_json::Value;
use tokio_stream::Stream;

/// Lazy, non-restartable feed of appended chat entries, one item per batch.
pub type ChatBatches = Pin<Box<dyn Stream<Item = ChatBatch> + Send>>;

/// Phases of the synthetic submit keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Press,
    Up,
}

/// The host page as seen from the content context.
///
/// Only the structural operations the core depends on are exposed: locate
/// the input, write it, synthesize the submit keystroke, observe the chat.
pub trait HostPage: Send + Sync {
    /// Whether the chat input element can be located.
    fn has_input(&self) -> bool;

    /// Replace the input's content with `markup` and signal the change.
    ///
    /// # Errors
    ///
    /// [`PageError::InputNotFound`] when the input is gone.
    fn write_input(&self, markup: &str) -> Result<(), PageError>;

    /// Dispatch one phase of the Enter keystroke on the input.
    ///
    /// # Errors
    ///
    /// [`PageError`] when the input is gone or the event is rejected.
    fn dispatch_key(&self, phase: KeyPhase) -> Result<(), PageError>;

    /// Empty the input and signal the change.
    ///
    /// # Errors
    ///
    /// [`PageError::InputNotFound`] when the input is gone.
    fn clear_input(&self) -> Result<(), PageError>;

    /// Attach to the chat list. `None` while the container is not rendered.
    fn observe_chat(&self) -> Option<ChatBatches>;

    /// Author of the newest entry already in the chat list.
    fn last_chat_author(&self) -> Option<String>;
}

impl<T: HostPage + ?Sized> HostPage for Arc<T> {
    fn has_input(&self) -> bool {
        (**self).has_input()
    }

    fn write_input(&self, markup: &str) -> Result<(), PageError> {
        (**self).write_input(markup)
    }

    fn dispatch_key(&self, phase: KeyPhase) -> Result<(), PageError> {
        (**self).dispatch_key(phase)
    }

    fn clear_input(&self) -> Result<(), PageError> {
        (**self).clear_input()
    }

    fn observe_chat(&self) -> Option<ChatBatches> {
        (**self).observe_chat()
    }

    fn last_chat_author(&self) -> Option<String> {
        (**self).last_chat_author()
    }
}

/// Globals of the page's main script world.
pub trait PageGlobals: Send + Sync {
    /// `None` when the global is undefined.
    fn read(&self, name: &str) -> Option<Value>;

    fn write(&self, name: &str, value: Value);

    /// Call a function stored in a global.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NotAFunction`] when the global is not callable,
    /// [`ScriptError::Threw`] when the call fails.
    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, ScriptError>;
}

impl<T: PageGlobals + ?Sized> PageGlobals for Arc<T> {
    fn read(&self, name: &str) -> Option<Value> {
        (**self).read(name)
    }

    fn write(&self, name: &str, value: Value) {
        (**self).write(name, value);
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        (**self).invoke(name, args)
    }
}
