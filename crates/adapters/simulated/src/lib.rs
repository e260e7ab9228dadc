//! # chatmote-adapter-simulated
//!
//! Simulated host page for running the contexts without a browser.
//!
//! ## Provided pieces
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`SimulatedPage`] | `HostPage`, `PageGlobals`, `Notifier` | Chat input, chat feed, page globals, toast log |
//! | [`StaticCatalog`] | `EmoticonCatalog` | Fixed list of enabled emoticons |
//! | [`Chatter`] | - | Background task posting messages as other users |
//!
//! Pressing the send key submits the input as a chat message from the
//! page's own nickname, the way the real chat box does.
//!
//! ## Dependency rule
//!
//! Depends on `chatmote-app` (port traits) and `chatmote-domain` only.

mod catalog;
mod chatter;
mod page;

pub use catalog::StaticCatalog;
pub use chatter::Chatter;
pub use page::{LOG_CAPACITY, PageFunction, SimulatedPage};
