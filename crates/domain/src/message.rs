//! Messages exchanged between the three execution contexts.
//!
//! On the wire every request is an [`Envelope`] (`{id, kind, payload}`) and
//! every answer a [`Response`] (`{success, error?, data?}`). The [`Message`]
//! trait pairs each request kind with the type of its reply so callers get
//! typed results back.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::automation::AutomationStatus;
use crate::error::ChatmoteError;
use crate::id::RequestId;
use crate::payload::SendOutcome;

/// One of the isolated execution contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    /// Long-lived process owning the automation controller.
    Background,
    /// Script attached to the host page's DOM.
    Content,
    /// The page's own script world, owner of its globals.
    Page,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Background => "background",
            Self::Content => "content",
            Self::Page => "page",
        };
        f.write_str(name)
    }
}

/// A typed request with a matching reply type.
pub trait Message: Serialize + DeserializeOwned + Send + 'static {
    /// The `kind` tag used on the wire.
    const KIND: &'static str;
    /// The context whose router handles this kind.
    const TARGET: Context;
    type Reply: Serialize + DeserializeOwned + Send + 'static;
}

/// Untyped request as it travels between contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub id: RequestId,
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            id: RequestId::new(),
            kind: kind.into(),
            payload,
        }
    }

    /// Wrap a typed message.
    ///
    /// # Errors
    ///
    /// Returns [`ChatmoteError::Codec`] if the message cannot be serialized.
    pub fn encode<M: Message>(message: &M) -> Result<Self, ChatmoteError> {
        Ok(Self::new(M::KIND, serde_json::to_value(message)?))
    }

    /// Read the payload back as `M`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatmoteError::Codec`] when the payload does not match.
    pub fn decode<M: Message>(&self) -> Result<M, ChatmoteError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// The single answer to an [`Envelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Response {
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            error: None,
            data,
        }
    }

    /// A failure response. The error text is never empty.
    #[must_use]
    pub fn failure(error: impl fmt::Display) -> Self {
        let mut message = error.to_string();
        if message.is_empty() {
            message = "unknown error".to_string();
        }
        Self {
            success: false,
            error: Some(message),
            data: Value::Null,
        }
    }

    /// Answer `M` with a typed reply.
    ///
    /// # Errors
    ///
    /// Returns [`ChatmoteError::Codec`] if the reply cannot be serialized.
    pub fn reply<M: Message>(reply: &M::Reply) -> Result<Self, ChatmoteError> {
        Ok(Self::ok(serde_json::to_value(reply)?))
    }

    /// Turn the response back into the reply type of `M`.
    ///
    /// # Errors
    ///
    /// [`ChatmoteError::Remote`] for failure responses,
    /// [`ChatmoteError::Codec`] when `data` does not match `M::Reply`.
    pub fn into_reply<M: Message>(self) -> Result<M::Reply, ChatmoteError> {
        if !self.success {
            let error = self.error.unwrap_or_else(|| "unknown error".to_string());
            return Err(ChatmoteError::Remote(error));
        }
        Ok(serde_json::from_value(self.data)?)
    }
}

macro_rules! message {
    ($name:ident, $kind:literal, $target:ident, $reply:ty) => {
        impl Message for $name {
            const KIND: &'static str = $kind;
            const TARGET: Context = Context::$target;
            type Reply = $reply;
        }
    };
}

// Background

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAutomationStatus;
message!(GetAutomationStatus, "get-automation-status", Background, AutomationStatus);

/// The settings store changed; the next scheduling decision reads it afresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdated;
message!(SettingsUpdated, "settings-updated", Background, ());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatActivityDetected;
message!(ChatActivityDetected, "chat-activity-detected", Background, AutomationStatus);

/// Read a page global through the background relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVariable {
    pub name: String,
}
message!(GetVariable, "get-variable", Background, Option<Value>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVariable {
    pub name: String,
    pub value: Value,
}
message!(SetVariable, "set-variable", Background, ());

/// Call a function defined on the page's global object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallPageFunction {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}
message!(CallPageFunction, "call-page-function", Background, Value);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartAutomation;
message!(StartAutomation, "start-automation", Background, AutomationStatus);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopAutomation;
message!(StopAutomation, "stop-automation", Background, AutomationStatus);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleAutomation;
message!(ToggleAutomation, "toggle-automation", Background, AutomationStatus);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerManualSend;
message!(TriggerManualSend, "trigger-manual-send", Background, SendOutcome);

// Content

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectAndSend {
    pub is_auto: bool,
}
message!(InjectAndSend, "inject-and-send", Content, SendOutcome);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowToast {
    pub message: String,
}
message!(ShowToast, "show-toast", Content, ());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartObservation;
message!(StartObservation, "start-observation", Content, ());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopObservation;
message!(StopObservation, "stop-observation", Content, ());

// Page

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadGlobal {
    pub name: String,
}
message!(ReadGlobal, "read-global", Page, Option<Value>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteGlobal {
    pub name: String,
    pub value: Value,
}
message!(WriteGlobal, "write-global", Page, ());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeGlobal {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}
message!(InvokeGlobal, "invoke-global", Page, Value);
