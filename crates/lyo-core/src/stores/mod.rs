//! Application state stores shared between the facade and the session.
//!
//! Every store is a clone-cheap handle over `Rc` state; clones observe the
//! same values.

pub mod auth;
pub mod memory;
pub mod mood;
pub mod settings;

pub use auth::AuthStore;
pub use memory::MemoryStore;
pub use mood::MoodStore;
pub use settings::SettingsStore;

use serde::{de::DeserializeOwned, Serialize};

use crate::ports::StoragePort;
use lyo_types::Result;

/// Read and decode a JSON value. Missing, unreadable and malformed values
/// all come back as `None`; the latter two are logged.
pub(crate) async fn load_json<T: DeserializeOwned>(
    storage: &dyn StoragePort,
    key: &str,
) -> Option<T> {
    match storage.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring malformed {} in {}: {}", key, storage.backend_name(), e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("Failed to read {} from {}: {}", key, storage.backend_name(), e);
            None
        }
    }
}

pub(crate) async fn save_json<T: Serialize + ?Sized>(
    storage: &dyn StoragePort,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json).await
}
