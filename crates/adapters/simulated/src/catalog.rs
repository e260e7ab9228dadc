use chatmote_app::ports::EmoticonCatalog;
use chatmote_domain::emoticon::Emoticon;
use chatmote_domain::error::ChatmoteError;

/// Catalog with a fixed set of enabled emoticons.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    emoticons: Vec<Emoticon>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(emoticons: Vec<Emoticon>) -> Self {
        Self { emoticons }
    }

    /// A small built-in set, used when nothing is configured.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(
            ["smile", "wave", "heart", "clap"]
                .into_iter()
                .map(|key| Emoticon::new(key, format!("https://emoticons.invalid/{key}.png")))
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.emoticons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emoticons.is_empty()
    }
}

impl EmoticonCatalog for StaticCatalog {
    async fn enabled(&self) -> Result<Vec<Emoticon>, ChatmoteError> {
        Ok(self.emoticons.clone())
    }
}
