use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;
use crate::mode::Mode;

/// The live conversation: history, active mode and the last error.
/// Lives for the page lifetime only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub mode: Mode,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            messages: Vec::new(),
            mode: Mode::default(),
            last_error: None,
            created_at: Utc::now(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
