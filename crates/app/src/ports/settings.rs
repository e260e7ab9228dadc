//! External stores the core only reads: user settings and the emoticon catalog.

use std::future::Future;
use std::sync::Arc;

use chatmote_domain::emoticon::Emoticon;
use chatmote_domain::error::ChatmoteError;
use chatmote_domain::settings::Settings;

/// Persisted user settings.
pub trait SettingsStore {
    /// Read the current settings.
    fn load(&self) -> impl Future<Output = Result<Settings, ChatmoteError>> + Send;

    /// Replace the stored settings. Only the user-facing surface writes.
    fn save(&self, settings: Settings) -> impl Future<Output = Result<(), ChatmoteError>> + Send;
}

impl<T: SettingsStore + Send + Sync> SettingsStore for Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Settings, ChatmoteError>> + Send {
        (**self).load()
    }

    fn save(&self, settings: Settings) -> impl Future<Output = Result<(), ChatmoteError>> + Send {
        (**self).save(settings)
    }
}

/// The emoticons the user has enabled.
pub trait EmoticonCatalog {
    /// Snapshot of the enabled emoticons, in catalog order.
    fn enabled(&self) -> impl Future<Output = Result<Vec<Emoticon>, ChatmoteError>> + Send;
}

impl<T: EmoticonCatalog + Send + Sync> EmoticonCatalog for Arc<T> {
    fn enabled(&self) -> impl Future<Output = Result<Vec<Emoticon>, ChatmoteError>> + Send {
        (**self).enabled()
    }
}
