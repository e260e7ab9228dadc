//! Variable bridge: page globals reached from the content context.
//!
//! The content context cannot touch the page's script world directly, so
//! every access is relayed through the background context, which forwards
//! it to the page router.

use chatmote_domain::error::BridgeError;
use chatmote_domain::message::{GetVariable, SetVariable};
use serde_json::Value;

use crate::channel::Endpoint;

/// Read/write access to page globals via the background relay.
#[derive(Debug, Clone)]
pub struct VariableBridge {
    background: Endpoint,
}

impl VariableBridge {
    pub fn new(background: Endpoint) -> Self {
        Self { background }
    }

    /// Read `name`, keeping relay failures distinguishable from an
    /// undefined global.
    ///
    /// # Errors
    ///
    /// [`BridgeError::CallFailed`] when the round trip fails.
    pub async fn try_get(&self, name: &str) -> Result<Option<Value>, BridgeError> {
        self.background
            .request(&GetVariable {
                name: name.to_string(),
            })
            .await
            .map_err(|err| BridgeError::CallFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })
    }

    /// Write `name`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::CallFailed`] when the round trip fails.
    pub async fn try_set(&self, name: &str, value: Value) -> Result<(), BridgeError> {
        self.background
            .request(&SetVariable {
                name: name.to_string(),
                value,
            })
            .await
            .map_err(|err| BridgeError::CallFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })
    }

    /// Read `name`. `None` both when the global is undefined and when the
    /// relay failed; the failure is logged.
    pub async fn get(&self, name: &str) -> Option<Value> {
        match self.try_get(name).await {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, "treating bridge failure as undefined");
                None
            }
        }
    }

    /// Write `name`. Returns `false` when the relay failed.
    pub async fn set(&self, name: &str, value: Value) -> bool {
        match self.try_set(name, value).await {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(error = %err, "bridge write failed");
                false
            }
        }
    }
}
