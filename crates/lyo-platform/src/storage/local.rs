//! `window.localStorage` backend.
//! Persistent across reloads; synchronous underneath, so every call resolves
//! immediately.

use async_trait::async_trait;
use wasm_bindgen::JsValue;
use web_sys::Storage;

use lyo_core::ports::StoragePort;
use lyo_types::{LyoError, Result};

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| LyoError::Storage("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(js_err)?
            .ok_or_else(|| LyoError::Storage("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

#[async_trait(?Send)]
impl StoragePort for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(js_err)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_err)
    }

    fn backend_name(&self) -> &str {
        "localstorage"
    }
}

fn js_err(e: JsValue) -> LyoError {
    LyoError::Storage(format!("{:?}", e))
}
