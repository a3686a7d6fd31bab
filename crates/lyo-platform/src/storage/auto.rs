//! Backend selection.
//!
//! Priority for `Auto`: localStorage → Memory (fallback)

use std::rc::Rc;
use lyo_core::ports::StoragePort;
use lyo_types::config::StorageBackendType;
use super::{LocalStorage, MemoryStorage};

/// Open the best available storage backend.
pub fn auto_detect_storage() -> Rc<dyn StoragePort> {
    match LocalStorage::open() {
        Ok(local) => {
            log::info!("Storage backend: localStorage");
            Rc::new(local)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryStorage::new())
        }
    }
}

/// Open the requested backend. An unavailable localStorage degrades to memory.
pub fn open_storage(backend: StorageBackendType) -> Rc<dyn StoragePort> {
    match backend {
        StorageBackendType::Memory => {
            log::info!("Storage backend: memory");
            Rc::new(MemoryStorage::new())
        }
        StorageBackendType::Auto | StorageBackendType::LocalStorage => auto_detect_storage(),
    }
}
