//! Request correlation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tags one cross-context request. The caller logs it when sending, the
/// router logs it when answering, so both sides of a call can be matched.
///
/// Envelopes arriving without an id (raw HTTP messages) get a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::message::Envelope;

    #[test]
    fn should_tag_each_envelope_differently() {
        let first = Envelope::new("show-toast", json!({"message": "a"}));
        let second = Envelope::new("show-toast", json!({"message": "a"}));

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn should_keep_id_across_the_wire() {
        let envelope = Envelope::new("get-automation-status", json!(null));

        let wire = serde_json::to_value(&envelope).unwrap();
        let received: Envelope = serde_json::from_value(wire.clone()).unwrap();

        assert_eq!(wire["id"], json!(envelope.id.to_string()));
        assert_eq!(received.id, envelope.id);
    }

    #[test]
    fn should_parse_id_copied_from_a_log_line() {
        let id: RequestId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();

        assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert!("request-1".parse::<RequestId>().is_err());
    }

    #[test]
    fn should_assign_id_when_envelope_arrives_without_one() {
        let envelope: Envelope =
            serde_json::from_value(json!({"kind": "start-automation"})).unwrap();

        assert_ne!(envelope.id, RequestId::new());
        assert_eq!(envelope.id.to_string().len(), 36);
    }
}
