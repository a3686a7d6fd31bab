use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MEMORIES_STORAGE_KEY: &str = "lyo:memories";

/// A journal entry on the memory board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}
