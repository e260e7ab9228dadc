//! # chatmote-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **user-command surface**: start/stop/toggle automation,
//!   trigger a manual send, read the automation status
//! - Read and write **settings** (validated before they are stored)
//! - Stream **status snapshots** over Server-Sent Events
//! - Forward raw `{kind, payload}` messages to the background context
//!
//! Every command goes through the background context's endpoint, exactly
//! like a message from the extension popup would.
//!
//! ## Dependency rule
//! Depends on `chatmote-app` (for ports and endpoints) and `chatmote-domain`
//! (for domain types used in request/response mapping). Never leaks axum
//! types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
