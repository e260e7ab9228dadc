//! # chatmote-app
//!
//! Application layer: cross-context messaging, the automation control loop
//! and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `HostPage`: the chat input and the chat feed of the host page
//!   - `PageGlobals`: globals owned by the page's own script world
//!   - `SettingsStore`: user settings, read fresh on every decision
//!   - `EmoticonCatalog`: the currently enabled emoticons
//!   - `Notifier`: transient on-screen notifications
//! - Provide the **message channel** between the three execution contexts
//!   (`channel`) and the per-context **router** (`message_router`)
//! - Implement the components running inside each context:
//!   - `AutomationController` (background): start/stop/pause/resume, timers
//!   - `ActionDispatcher` (content): one send action
//!   - `ChatActivityMonitor` (content): distinct chat activity detection
//!   - `VariableBridge` (content): page globals through the background relay
//! - Wire the contexts together (`contexts`)
//!
//! ## Dependency rule
//! Depends on `chatmote-domain` only (plus `tokio` for tasks, channels and
//! timers). Never imports adapter crates.

pub mod action_dispatcher;
pub mod automation_controller;
pub mod channel;
pub mod chat_monitor;
pub mod contexts;
pub mod message_router;
pub mod ports;
pub mod remote_notifier;
pub mod services;
pub mod variable_bridge;
