//! Chat observation: appended entries and the author tracker that decides
//! whether a batch contains distinct activity.

use serde::{Deserialize, Serialize};

/// One appended chat message, reduced to what the spam guard needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// `None` for system messages and anything else without an author.
    pub author: Option<String>,
}

impl ChatEntry {
    #[must_use]
    pub fn from_author(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
        }
    }

    #[must_use]
    pub fn system() -> Self {
        Self { author: None }
    }
}

/// Entries appended together, in page order.
pub type ChatBatch = Vec<ChatEntry>;

/// Tracks the most recently seen chat author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorTracker {
    last_author: Option<String>,
    primed: bool,
}

impl AuthorTracker {
    /// Start tracking from the last author already on the page, if any.
    ///
    /// A tracker seeded with `None` stays unprimed, so its first batch only
    /// seeds it.
    #[must_use]
    pub fn seeded(last_author: Option<String>) -> Self {
        Self {
            primed: last_author.is_some(),
            last_author,
        }
    }

    #[must_use]
    pub fn last_author(&self) -> Option<&str> {
        self.last_author.as_deref()
    }

    /// Forget everything tracked so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one batch. Returns `true` when the batch holds distinct activity.
    ///
    /// An entry is distinct when it has no author, or when its author
    /// differs from the tracked one. Afterwards the tracker holds the
    /// batch's most recent identified author.
    pub fn observe(&mut self, batch: &[ChatEntry]) -> bool {
        let latest = batch.iter().rev().find_map(|entry| entry.author.clone());

        if !self.primed {
            self.primed = true;
            if latest.is_some() {
                self.last_author = latest;
            }
            return false;
        }

        let distinct = batch.iter().any(|entry| match (&entry.author, &self.last_author) {
            (None, _) => true,
            (Some(author), Some(last)) => author != last,
            (Some(_), None) => false,
        });

        if latest.is_some() {
            self.last_author = latest;
        }
        distinct
    }
}
