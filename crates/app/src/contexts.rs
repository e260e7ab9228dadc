//! Wiring of the three execution contexts.
//!
//! Each context gets its own inbox and router task; the only references that
//! cross a context boundary are [`Endpoint`]s.

use std::sync::Arc;
use std::time::Duration;

use chatmote_domain::automation::AutomationStatus;
use chatmote_domain::message::Context;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::action_dispatcher::ActionDispatcher;
use crate::automation_controller::{AutomationController, StopReason};
use crate::channel::{Endpoint, channel};
use crate::chat_monitor::ChatActivityMonitor;
use crate::message_router::MessageRouter;
use crate::ports::{EmoticonCatalog, HostPage, Notifier, PageGlobals, SettingsStore};
use crate::remote_notifier::ToastRelay;
use crate::services::{BackgroundService, ContentService, PageService};
use crate::variable_bridge::VariableBridge;

/// Router tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    /// Bound of each context inbox.
    pub channel_capacity: usize,
    /// Upper bound on a single cross-context call. `None` waits forever.
    pub request_timeout: Option<Duration>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            request_timeout: None,
        }
    }
}

/// The outside-world collaborators every context needs.
pub struct Host<P, G, S, C, N> {
    pub page: Arc<P>,
    pub globals: G,
    pub settings: Arc<S>,
    pub catalog: C,
    pub toasts: Arc<N>,
}

type Controller<S> = AutomationController<Arc<S>, ToastRelay>;

/// Running contexts. Dropping this leaves the router tasks running; call
/// [`shutdown`](Self::shutdown) to stop them.
pub struct Contexts<S> {
    pub background: Endpoint,
    pub content: Endpoint,
    pub page: Endpoint,
    controller: Arc<Controller<S>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<S> Contexts<S>
where
    S: SettingsStore + Send + Sync + 'static,
{
    /// Live automation status, updated on every transition.
    pub fn subscribe_status(&self) -> watch::Receiver<AutomationStatus> {
        self.controller.subscribe_status()
    }

    pub fn status(&self) -> AutomationStatus {
        self.controller.status()
    }

    /// Stop automation if it runs, then tear the routers down.
    pub async fn shutdown(self) {
        if self.controller.status().is_running {
            self.controller.stop(StopReason::User).await;
        }
        for task in &self.tasks {
            task.abort();
        }
        tracing::info!("contexts shut down");
    }
}

/// Spawn the background, content and page routers and run the content
/// context's page-load handshake.
pub async fn launch<P, G, S, C, N>(host: Host<P, G, S, C, N>, options: ContextOptions) -> Contexts<S>
where
    P: HostPage + 'static,
    G: PageGlobals + 'static,
    S: SettingsStore + Send + Sync + 'static,
    C: EmoticonCatalog + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let (background, background_inbox) = channel(Context::Background, options.channel_capacity);
    let (content, content_inbox) = channel(Context::Content, options.channel_capacity);
    let (page, page_inbox) = channel(Context::Page, options.channel_capacity);
    let background = background.with_timeout(options.request_timeout);
    let content = content.with_timeout(options.request_timeout);
    let page = page.with_timeout(options.request_timeout);

    let page_service = PageService::new(host.globals);
    let page_task = MessageRouter::new(Context::Page, Arc::new(page_service)).spawn(page_inbox);

    let controller = Arc::new(AutomationController::new(
        Arc::clone(&host.settings),
        ToastRelay::new(content.clone()),
        content.clone(),
    ));
    let background_service = BackgroundService::new(Arc::clone(&controller), page.clone());
    let background_task = MessageRouter::new(Context::Background, Arc::new(background_service))
        .spawn(background_inbox);

    let dispatcher = ActionDispatcher::new(
        Arc::clone(&host.page),
        host.settings,
        host.catalog,
        Arc::clone(&host.toasts),
        VariableBridge::new(background.clone()),
    );
    let monitor = Arc::new(ChatActivityMonitor::new(host.page, background.clone()));
    let content_service = Arc::new(ContentService::new(
        dispatcher,
        monitor,
        host.toasts,
        background.clone(),
    ));
    let content_task =
        MessageRouter::new(Context::Content, Arc::clone(&content_service)).spawn(content_inbox);

    tracing::info!(
        capacity = options.channel_capacity,
        timeout = ?options.request_timeout,
        "contexts launched"
    );
    content_service.on_page_load().await;

    Contexts {
        background,
        content,
        page,
        controller,
        tasks: vec![background_task, content_task, page_task],
    }
}
