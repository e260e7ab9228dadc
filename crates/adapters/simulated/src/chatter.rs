use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;

use crate::page::SimulatedPage;

/// Other viewers talking in the simulated chat.
///
/// Every tick one of `names` posts a message. Ticks are spaced uniformly
/// between half and one and a half times `interval`.
pub struct Chatter {
    names: Vec<String>,
    interval: Duration,
    rng: StdRng,
}

impl Chatter {
    #[must_use]
    pub fn new(names: Vec<String>, interval: Duration) -> Self {
        Self::with_rng(names, interval, StdRng::from_entropy())
    }

    #[must_use]
    pub fn with_rng(names: Vec<String>, interval: Duration, rng: StdRng) -> Self {
        Self {
            names,
            interval,
            rng,
        }
    }

    /// Post messages on `page` until the returned task is aborted.
    ///
    /// Returns `None` when there is nobody to chat.
    #[must_use]
    pub fn spawn(mut self, page: Arc<SimulatedPage>) -> Option<JoinHandle<()>> {
        if self.names.is_empty() {
            return None;
        }
        tracing::info!(chatters = self.names.len(), interval = ?self.interval, "simulated chat started");
        Some(tokio::spawn(async move {
            loop {
                let wait = self.next_wait();
                tokio::time::sleep(wait).await;
                if let Some(name) = self.names.choose(&mut self.rng) {
                    tracing::trace!(author = %name, "simulated chat message");
                    page.post_chat(name);
                }
            }
        }))
    }

    fn next_wait(&mut self) -> Duration {
        let base = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        let low = base / 2;
        let high = base.saturating_add(base / 2).max(low + 1);
        Duration::from_millis(self.rng.gen_range(low..high))
    }
}
