//! # chatmote-domain
//!
//! Pure domain model for the chatmote emoticon automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers and error conventions
//! - Define the **automation state machine** (`Stopped` / `Running` /
//!   `RunningPaused`) and its spam-guard counter
//! - Define **settings** and the clamped delay/repetition ranges drawn from them
//! - Define **emoticons** and the send payload composed from them
//! - Define **chat observation** (entries, batches, the author tracker)
//! - Define the **messages** exchanged between execution contexts
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod automation;
pub mod chat;
pub mod emoticon;
pub mod message;
pub mod payload;
pub mod settings;
