use std::cell::RefCell;
use std::rc::Rc;

use lyo_types::settings::{
    Settings, SettingsPatch, LEGACY_SETTINGS_STORAGE_KEY, SETTINGS_STORAGE_KEY,
};
use lyo_types::Result;
use serde_json::Value;

use super::{load_json, save_json};
use crate::ports::StoragePort;

/// User preferences, persisted on every update when storage is attached.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Rc<RefCell<Settings>>,
    storage: Option<Rc<dyn StoragePort>>,
}

impl SettingsStore {
    /// A store that lives in memory only
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Rc::new(RefCell::new(settings)),
            storage: None,
        }
    }

    /// Restore saved settings, falling back to the defaults field by field.
    /// Settings found only under the legacy key are copied to the current one.
    pub async fn load(storage: Rc<dyn StoragePort>) -> Self {
        let settings = match load_json::<Value>(storage.as_ref(), SETTINGS_STORAGE_KEY).await {
            Some(value) => Settings::from_stored(&value),
            None => match load_json::<Value>(storage.as_ref(), LEGACY_SETTINGS_STORAGE_KEY).await {
                Some(value) => {
                    let settings = Settings::from_stored(&value);
                    log::info!("Migrating settings from {}", LEGACY_SETTINGS_STORAGE_KEY);
                    if let Err(e) = save_json(storage.as_ref(), SETTINGS_STORAGE_KEY, &settings).await {
                        log::warn!("Failed to migrate settings: {}", e);
                    }
                    settings
                }
                None => Settings::default(),
            },
        };
        Self {
            inner: Rc::new(RefCell::new(settings)),
            storage: Some(storage),
        }
    }

    pub fn settings(&self) -> Settings {
        self.inner.borrow().clone()
    }

    pub fn notifications_enabled(&self) -> bool {
        self.inner.borrow().notifications
    }

    /// Merge `patch` and persist. The in-memory value is kept even when
    /// persisting fails.
    pub async fn update(&self, patch: SettingsPatch) -> Result<Settings> {
        let updated = {
            let mut settings = self.inner.borrow_mut();
            settings.apply(patch);
            settings.clone()
        };
        if let Some(storage) = &self.storage {
            save_json(storage.as_ref(), SETTINGS_STORAGE_KEY, &updated).await?;
            log::debug!("Settings saved to {}", storage.backend_name());
        }
        Ok(updated)
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
