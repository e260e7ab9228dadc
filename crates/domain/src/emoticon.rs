//! Emoticons as the host page exposes them.
//!
//! The page renders each emoticon as an `<img>` whose `alt` is a
//! `{:key:}` placeholder. The chat backend expands placeholders, the input
//! box shows the image.

use serde::{Deserialize, Serialize};

/// A single emoticon from the enabled catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emoticon {
    /// Bare key, without the `{: :}` delimiters.
    pub display_key: String,
    pub image_url: String,
}

impl Emoticon {
    #[must_use]
    pub fn new(display_key: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            display_key: display_key.into(),
            image_url: image_url.into(),
        }
    }

    /// Parse an emoticon from an image's `alt` and `src` attributes.
    ///
    /// Returns `None` unless `alt` has the `{:key:}` shape with a non-empty
    /// key and `src` is non-empty.
    #[must_use]
    pub fn from_alt(alt: &str, src: &str) -> Option<Self> {
        let key = alt.strip_prefix("{:")?.strip_suffix(":}")?;
        if key.is_empty() || src.is_empty() {
            return None;
        }
        Some(Self::new(key, src))
    }

    /// The `{:key:}` token the chat backend understands.
    #[must_use]
    pub fn placeholder(&self) -> String {
        format!("{{:{}:}}", self.display_key)
    }

    /// Inline image markup written into the chat input.
    #[must_use]
    pub fn markup(&self) -> String {
        let placeholder = self.placeholder();
        format!(
            r#"<img src="{}" title="{placeholder}" alt="{placeholder}" style="vertical-align: middle; height: 20px; margin: 0 1px;">"#,
            self.image_url
        )
    }
}
