use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chatmote_app::ports::{ChatBatches, HostPage, KeyPhase, Notifier, PageGlobals};
use chatmote_domain::chat::{ChatBatch, ChatEntry};
use chatmote_domain::error::{PageError, ScriptError};
use chatmote_domain::payload::{WORKING_CHAT_VAR, WORKING_EMOTICON_VAR};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// A function defined in the page's script world.
pub type PageFunction = Arc<dyn Fn(&[Value]) -> Result<Value, ScriptError> + Send + Sync>;

const FEED_CAPACITY: usize = 64;

/// Entries kept in each of the chat, sent and toast logs.
pub const LOG_CAPACITY: usize = 256;

fn push_bounded<T>(log: &mut VecDeque<T>, item: T) {
    if log.len() == LOG_CAPACITY {
        log.pop_front();
    }
    log.push_back(item);
}

#[derive(Default)]
struct PageState {
    input_present: bool,
    chat_present: bool,
    input: String,
    history: VecDeque<ChatEntry>,
    last_author: Option<String>,
    sent: VecDeque<String>,
    toasts: VecDeque<String>,
    globals: HashMap<String, Value>,
    functions: HashMap<String, PageFunction>,
}

/// In-memory stand-in for the streaming site's chat page.
pub struct SimulatedPage {
    nickname: String,
    feed: broadcast::Sender<ChatBatch>,
    state: Mutex<PageState>,
}

impl SimulatedPage {
    /// A page with an input area and a chat list, logged in as `nickname`.
    #[must_use]
    pub fn new(nickname: impl Into<String>) -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            nickname: nickname.into(),
            feed,
            state: Mutex::new(PageState {
                input_present: true,
                chat_present: true,
                ..PageState::default()
            }),
        }
    }

    /// Let the page's own editor track the input in `__workingChat` and
    /// `__workingEmoticon`, as the real site does.
    #[must_use]
    pub fn with_working_chat(self) -> Self {
        {
            let mut state = self.lock();
            state
                .globals
                .insert(WORKING_CHAT_VAR.to_string(), Value::String(String::new()));
            state
                .globals
                .insert(WORKING_EMOTICON_VAR.to_string(), Value::Object(Map::new()));
        }
        self
    }

    #[must_use]
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn set_input_present(&self, present: bool) {
        self.lock().input_present = present;
    }

    pub fn set_chat_present(&self, present: bool) {
        self.lock().chat_present = present;
    }

    pub fn define_function(&self, name: impl Into<String>, function: PageFunction) {
        self.lock().functions.insert(name.into(), function);
    }

    /// Append a message from `author` to the chat list.
    pub fn post_chat(&self, author: &str) {
        self.post_batch(vec![ChatEntry::from_author(author)]);
    }

    /// Append several entries at once, delivered to observers as one batch.
    pub fn post_batch(&self, batch: ChatBatch) {
        {
            let mut state = self.lock();
            if let Some(author) = batch.iter().rev().find_map(|entry| entry.author.clone()) {
                state.last_author = Some(author);
            }
            for entry in &batch {
                push_bounded(&mut state.history, entry.clone());
            }
        }
        // No receiver simply means nobody is observing right now.
        let _ = self.feed.send(batch);
    }

    #[must_use]
    pub fn input(&self) -> String {
        self.lock().input.clone()
    }

    /// The latest messages submitted from this page, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.lock().sent.iter().cloned().collect()
    }

    #[must_use]
    pub fn toasts(&self) -> Vec<String> {
        self.lock().toasts.iter().cloned().collect()
    }

    /// The latest [`LOG_CAPACITY`] chat entries, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<ChatEntry> {
        self.lock().history.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit(&self) {
        let message = {
            let mut state = self.lock();
            let tracked = match state.globals.get(WORKING_CHAT_VAR) {
                Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
                _ => None,
            };
            let message = tracked.unwrap_or_else(|| state.input.clone());
            if message.is_empty() {
                return;
            }
            push_bounded(&mut state.sent, message.clone());
            message
        };
        tracing::debug!(nickname = %self.nickname, %message, "chat submitted");
        self.post_chat(&self.nickname);
    }
}

impl HostPage for SimulatedPage {
    fn has_input(&self) -> bool {
        self.lock().input_present
    }

    fn write_input(&self, markup: &str) -> Result<(), PageError> {
        let mut state = self.lock();
        if !state.input_present {
            return Err(PageError::InputNotFound);
        }
        markup.clone_into(&mut state.input);
        Ok(())
    }

    fn dispatch_key(&self, phase: KeyPhase) -> Result<(), PageError> {
        if !self.has_input() {
            return Err(PageError::InputNotFound);
        }
        if phase == KeyPhase::Down {
            self.submit();
        }
        Ok(())
    }

    fn clear_input(&self) -> Result<(), PageError> {
        let mut state = self.lock();
        if !state.input_present {
            return Err(PageError::InputNotFound);
        }
        state.input.clear();
        Ok(())
    }

    fn observe_chat(&self) -> Option<ChatBatches> {
        if !self.lock().chat_present {
            return None;
        }
        let batches = BroadcastStream::new(self.feed.subscribe()).filter_map(Result::ok);
        Some(Box::pin(batches))
    }

    fn last_chat_author(&self) -> Option<String> {
        self.lock().last_author.clone()
    }
}

impl PageGlobals for SimulatedPage {
    fn read(&self, name: &str) -> Option<Value> {
        self.lock().globals.get(name).cloned()
    }

    fn write(&self, name: &str, value: Value) {
        self.lock().globals.insert(name.to_string(), value);
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        let function = self
            .lock()
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptError::NotAFunction(name.to_string()))?;
        function(args)
    }
}

impl Notifier for SimulatedPage {
    async fn notify(&self, message: String) {
        tracing::info!(toast = %message, "toast shown");
        push_bounded(&mut self.lock().toasts, message);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[test]
    fn should_submit_input_as_own_message_on_key_down() {
        let page = SimulatedPage::new("me");
        page.write_input("<img alt=\"{:a:}\">").unwrap();

        page.dispatch_key(KeyPhase::Down).unwrap();
        page.dispatch_key(KeyPhase::Press).unwrap();
        page.dispatch_key(KeyPhase::Up).unwrap();

        assert_eq!(page.sent(), vec!["<img alt=\"{:a:}\">".to_string()]);
        assert_eq!(page.last_chat_author().as_deref(), Some("me"));
    }

    #[test]
    fn should_submit_tracked_working_chat_when_present() {
        let page = SimulatedPage::new("me").with_working_chat();
        page.write_input("<img>").unwrap();
        page.write(WORKING_CHAT_VAR, json!("{:a:}{:a:}"));

        page.dispatch_key(KeyPhase::Down).unwrap();

        assert_eq!(page.sent(), vec!["{:a:}{:a:}".to_string()]);
    }

    #[test]
    fn should_not_submit_empty_input() {
        let page = SimulatedPage::new("me");

        page.dispatch_key(KeyPhase::Down).unwrap();

        assert!(page.sent().is_empty());
        assert!(page.history().is_empty());
    }

    #[test]
    fn should_fail_without_input_area() {
        let page = SimulatedPage::new("me");
        page.set_input_present(false);

        assert!(!page.has_input());
        assert_eq!(page.write_input("x"), Err(PageError::InputNotFound));
        assert_eq!(page.dispatch_key(KeyPhase::Down), Err(PageError::InputNotFound));
    }

    #[test]
    fn should_clear_input() {
        let page = SimulatedPage::new("me");
        page.write_input("x").unwrap();

        page.clear_input().unwrap();

        assert_eq!(page.input(), "");
    }

    #[test]
    fn should_report_newest_identified_author() {
        let page = SimulatedPage::new("me");
        page.post_batch(vec![ChatEntry::from_author("alice"), ChatEntry::system()]);

        assert_eq!(page.last_chat_author().as_deref(), Some("alice"));
    }

    #[test]
    fn should_seed_tracking_globals() {
        let page = SimulatedPage::new("me").with_working_chat();

        assert_eq!(page.read(WORKING_CHAT_VAR), Some(json!("")));
        assert_eq!(page.read(WORKING_EMOTICON_VAR), Some(json!({})));
        assert_eq!(SimulatedPage::new("me").read(WORKING_CHAT_VAR), None);
    }

    #[test]
    fn should_invoke_defined_function_only() {
        let page = SimulatedPage::new("me");
        page.define_function("count", Arc::new(|args: &[Value]| Ok::<_, ScriptError>(json!(args.len()))));

        assert_eq!(page.invoke("count", &[json!(1), json!(2)]), Ok(json!(2)));
        assert_eq!(
            page.invoke("missing", &[]),
            Err(ScriptError::NotAFunction("missing".to_string()))
        );
    }

    #[test]
    fn should_not_observe_without_chat_list() {
        let page = SimulatedPage::new("me");
        page.set_chat_present(false);

        assert!(page.observe_chat().is_none());
    }

    #[tokio::test]
    async fn should_stream_posted_batches_to_observers() {
        let page = SimulatedPage::new("me");
        let mut batches = page.observe_chat().unwrap();

        page.post_chat("alice");

        let batch = tokio::time::timeout(Duration::from_secs(1), batches.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch, vec![ChatEntry::from_author("alice")]);
    }

    #[test]
    fn should_keep_only_latest_entries_but_remember_last_author() {
        let page = SimulatedPage::new("me");
        page.post_chat("alice");
        for _ in 0..LOG_CAPACITY {
            page.post_batch(vec![ChatEntry::system()]);
        }

        let history = page.history();
        assert_eq!(history.len(), LOG_CAPACITY);
        assert!(history.iter().all(|entry| entry.author.is_none()));
        assert_eq!(page.last_chat_author().as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn should_cap_sent_and_toast_logs() {
        let page = SimulatedPage::new("me");
        for n in 0..=LOG_CAPACITY {
            page.write_input(&format!("msg {n}")).unwrap();
            page.dispatch_key(KeyPhase::Down).unwrap();
            page.notify(format!("toast {n}")).await;
        }

        let sent = page.sent();
        assert_eq!(sent.len(), LOG_CAPACITY);
        assert_eq!(sent.first().map(String::as_str), Some("msg 1"));
        assert_eq!(sent.last(), Some(&format!("msg {LOG_CAPACITY}")));
        assert_eq!(page.toasts().len(), LOG_CAPACITY);
        assert_eq!(page.history().len(), LOG_CAPACITY);
    }

    #[tokio::test]
    async fn should_record_toasts() {
        let page = SimulatedPage::new("me");

        page.notify("Automation started".to_string()).await;

        assert_eq!(page.toasts(), vec!["Automation started".to_string()]);
    }
}
