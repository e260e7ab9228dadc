//! Common error types used across the workspace.
//!
//! Each concern gets its own typed error; [`ChatmoteError`] wraps them via
//! `#[from]` so `?` works across layers.

use crate::message::Context;

/// Top-level error for every fallible operation in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum ChatmoteError {
    #[error(transparent)]
    Send(#[from] SendError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A router received a `kind` it has no handler for.
    #[error("unknown message kind: {0}")]
    UnknownMessageKind(String),

    /// The remote context answered with `success: false`.
    #[error("{0}")]
    Remote(String),

    #[error("malformed message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Reasons a single send attempt can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("no emoticons available")]
    NoEmoticonsAvailable,

    #[error("chat input area not found")]
    InputAreaNotFound,

    #[error("remote execution failed: {0}")]
    RemoteExecutionFailed(String),

    /// A manual send was requested before the cooldown elapsed.
    #[error("manual send is cooling down ({remaining_ms}ms remaining)")]
    CooldownActive { remaining_ms: u64 },

    #[error("a send is already in progress")]
    AlreadyExecuting,
}

/// Failure of a variable relay round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("bridge call for `{name}` failed: {reason}")]
    CallFailed { name: String, reason: String },
}

/// Transport-level failures between contexts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("{0} context disconnected")]
    Disconnected(Context),

    #[error("{context} context did not answer within {after_ms}ms")]
    TimedOut { context: Context, after_ms: u64 },
}

/// Errors raised while executing code in the page's main world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("{0} is not a function")]
    NotAFunction(String),

    #[error("{name} threw: {message}")]
    Threw { name: String, message: String },
}

/// Errors raised by host page DOM operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("chat input area not found")]
    InputNotFound,

    #[error("event dispatch failed: {0}")]
    Dispatch(String),
}

impl From<PageError> for SendError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::InputNotFound => Self::InputAreaNotFound,
            PageError::Dispatch(message) => Self::RemoteExecutionFailed(message),
        }
    }
}

/// Settings that violate their invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("repetitions must be at least 1")]
    ZeroRepetitions,

    #[error("repetitions must be at most {maximum}, got {actual}")]
    TooManyRepetitions { maximum: u32, actual: u32 },

    #[error("minimum repetitions ({min}) exceeds maximum ({max})")]
    RepetitionsInverted { min: u32, max: u32 },

    #[error("delay must be at least {minimum}ms, got {actual}ms")]
    DelayTooShort { minimum: u64, actual: u64 },

    #[error("minimum delay ({min}ms) exceeds maximum ({max}ms)")]
    DelayInverted { min: u64, max: u64 },
}
