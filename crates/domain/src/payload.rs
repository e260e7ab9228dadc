//! Send payloads and outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::emoticon::Emoticon;

/// Page-owned variable mirroring the input's text content.
pub const WORKING_CHAT_VAR: &str = "__workingChat";
/// Page-owned variable mapping emoticon keys to image URLs.
pub const WORKING_EMOTICON_VAR: &str = "__workingEmoticon";

/// Everything one send writes into the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SendPayload {
    pub emoticon: Emoticon,
    pub repetitions: u32,
    /// Markup written into the input element.
    pub markup: String,
    /// Text mirrored into [`WORKING_CHAT_VAR`].
    pub working_chat: String,
    /// Map mirrored into [`WORKING_EMOTICON_VAR`].
    pub emoticon_map: Map<String, Value>,
}

impl SendPayload {
    /// Append `repetitions` copies of `emoticon` to what the input already
    /// logically contains.
    #[must_use]
    pub fn compose(
        emoticon: Emoticon,
        repetitions: u32,
        existing_chat: &str,
        mut emoticon_map: Map<String, Value>,
    ) -> Self {
        let count = repetitions as usize;
        let markup = format!("{existing_chat}{}", emoticon.markup().repeat(count));
        let working_chat = format!("{existing_chat}{}", emoticon.placeholder().repeat(count));
        emoticon_map
            .entry(emoticon.display_key.clone())
            .or_insert_with(|| Value::String(emoticon.image_url.clone()));

        Self {
            emoticon,
            repetitions,
            markup,
            working_chat,
            emoticon_map,
        }
    }
}

/// Result of one send, produced by the content context and consumed once
/// by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl SendOutcome {
    #[must_use]
    pub fn delivered() -> Self {
        Self {
            success: true,
            error_reason: None,
        }
    }

    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error_reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::settings::{MAX_REPETITIONS, Settings};

    fn grin() -> Emoticon {
        Emoticon::new("grin", "https://cdn/grin.png")
    }

    #[test]
    fn should_repeat_placeholder_for_each_repetition() {
        let payload = SendPayload::compose(grin(), 3, "", Map::new());
        assert_eq!(payload.working_chat, "{:grin:}{:grin:}{:grin:}");
        assert_eq!(payload.markup.matches("<img").count(), 3);
    }

    #[test]
    fn should_append_to_existing_chat() {
        let payload = SendPayload::compose(grin(), 1, "hello ", Map::new());
        assert_eq!(payload.working_chat, "hello {:grin:}");
        assert!(payload.markup.starts_with("hello <img"));
    }

    #[test]
    fn should_register_emoticon_in_map() {
        let payload = SendPayload::compose(grin(), 1, "", Map::new());
        assert_eq!(
            payload.emoticon_map.get("grin"),
            Some(&Value::String("https://cdn/grin.png".to_string()))
        );
    }

    #[test]
    fn should_keep_existing_map_entry() {
        let mut map = Map::new();
        map.insert("grin".to_string(), Value::String("https://old".to_string()));
        map.insert("wave".to_string(), Value::String("https://wave".to_string()));

        let payload = SendPayload::compose(grin(), 1, "", map);

        assert_eq!(payload.emoticon_map.len(), 2);
        assert_eq!(
            payload.emoticon_map.get("grin"),
            Some(&Value::String("https://old".to_string()))
        );
    }

    #[test]
    fn should_stay_bounded_when_stored_repetitions_are_huge() {
        let settings = Settings {
            min_repetitions: u32::MAX,
            max_repetitions: u32::MAX,
            ..Settings::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let repetitions = settings.repetition_range().sample(&mut rng);

        let payload = SendPayload::compose(grin(), repetitions, "", Map::new());

        assert_eq!(repetitions, MAX_REPETITIONS);
        assert_eq!(payload.working_chat.len(), grin().placeholder().len() * 100);
    }

    #[test]
    fn should_omit_reason_when_delivered() {
        let json = serde_json::to_value(SendOutcome::delivered()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }

    #[test]
    fn should_carry_reason_when_failed() {
        let json = serde_json::to_value(SendOutcome::failed("no input")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "errorReason": "no input"})
        );
    }
}
