//! The memory board: user-authored journal entries.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use lyo_types::memory::{MemoryEntry, MemoryPatch, MEMORIES_STORAGE_KEY};
use lyo_types::message::ChatMessage;
use lyo_types::{LyoError, Result};

use super::{load_json, save_json};
use crate::ports::StoragePort;

const SAVED_TITLE_MAX_CHARS: usize = 48;

#[derive(Clone)]
pub struct MemoryStore {
    entries: Rc<RefCell<Vec<MemoryEntry>>>,
    storage: Option<Rc<dyn StoragePort>>,
}

impl MemoryStore {
    /// In-memory store holding the sample entries
    pub fn seeded() -> Self {
        Self {
            entries: Rc::new(RefCell::new(sample_entries())),
            storage: None,
        }
    }

    /// Restore saved entries; a first run starts from the samples.
    pub async fn load(storage: Rc<dyn StoragePort>) -> Self {
        let entries = load_json::<Vec<MemoryEntry>>(storage.as_ref(), MEMORIES_STORAGE_KEY)
            .await
            .unwrap_or_else(sample_entries);
        Self {
            entries: Rc::new(RefCell::new(entries)),
            storage: Some(storage),
        }
    }

    pub fn list(&self) -> Vec<MemoryEntry> {
        self.entries.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<MemoryEntry> {
        self.entries.borrow().iter().find(|m| m.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Both fields must be non-blank.
    pub async fn add(&self, title: &str, content: &str) -> Result<MemoryEntry> {
        let title = require("title", title)?;
        let content = require("content", content)?;
        self.push(MemoryEntry::new(title, content)).await
    }

    /// Returns whether an entry was removed.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|m| m.id != id);
            entries.len() != before
        };
        if removed {
            self.persist().await;
        }
        removed
    }

    pub async fn update(&self, id: &str, patch: MemoryPatch) -> Result<MemoryEntry> {
        let title = patch.title.as_deref().map(|t| require("title", t)).transpose()?;
        let content = patch.content.as_deref().map(|c| require("content", c)).transpose()?;

        let updated = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| LyoError::NotFound(format!("memory {}", id)))?;
            if let Some(title) = title {
                entry.title = title;
            }
            if let Some(content) = content {
                entry.content = content;
            }
            entry.clone()
        };
        self.persist().await;
        Ok(updated)
    }

    /// Keep a chat message on the board. The title is taken from its first
    /// line; the content is the message text verbatim.
    pub async fn save_message(&self, message: &ChatMessage) -> Result<MemoryEntry> {
        let title = derive_title(&message.text)
            .ok_or_else(|| LyoError::Validation("cannot save an empty message".to_string()))?;
        self.push(MemoryEntry::new(title, message.text.clone())).await
    }

    async fn push(&self, entry: MemoryEntry) -> Result<MemoryEntry> {
        self.entries.borrow_mut().push(entry.clone());
        self.persist().await;
        Ok(entry)
    }

    async fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let snapshot = self.list();
        if let Err(e) = save_json(storage.as_ref(), MEMORIES_STORAGE_KEY, &snapshot).await {
            log::warn!("Failed to save memories to {}: {}", storage.backend_name(), e);
        }
    }
}

fn require(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LyoError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn derive_title(text: &str) -> Option<String> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    if line.chars().count() <= SAVED_TITLE_MAX_CHARS {
        return Some(line.to_string());
    }
    let mut title: String = line.chars().take(SAVED_TITLE_MAX_CHARS).collect();
    title.truncate(title.trim_end().len());
    title.push('…');
    Some(title)
}

fn sample_entries() -> Vec<MemoryEntry> {
    vec![
        sample(
            "1",
            "Morning reflection",
            "Today I woke up feeling anxious about the upcoming presentation. Talking with Lyo helped me realize I was catastrophizing again.",
            "2025-02-10T08:30:00Z",
        ),
        sample(
            "2",
            "Breakthrough moment",
            "I realized my fear of rejection is connected to childhood experiences. This awareness feels freeing.",
            "2025-02-08T18:15:00Z",
        ),
    ]
}

fn sample(id: &str, title: &str, content: &str, date: &str) -> MemoryEntry {
    MemoryEntry {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        date: date.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_title_short_line() {
        assert_eq!(derive_title("  hello\nworld").as_deref(), Some("hello"));
    }

    #[test]
    fn test_derive_title_truncates() {
        let text = "a".repeat(60);
        let title = derive_title(&text).unwrap();
        assert_eq!(title.chars().count(), SAVED_TITLE_MAX_CHARS + 1);
        assert!(title.ends_with('…'));
    }

    #[test]
    fn test_derive_title_blank() {
        assert!(derive_title(" \n\t").is_none());
    }

    #[test]
    fn test_sample_dates_parse() {
        let samples = sample_entries();
        assert_eq!(samples[0].date.to_rfc3339(), "2025-02-10T08:30:00+00:00");
    }
}
