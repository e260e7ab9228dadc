//! Context services: the [`Dispatch`](crate::message_router::Dispatch)
//! implementation of each execution context.
//!
//! Each service accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod background;
pub mod content;
pub mod page;

pub use background::BackgroundService;
pub use content::ContentService;
pub use page::PageService;
