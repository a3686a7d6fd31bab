use serde::{Deserialize, Serialize};

use crate::message::Sender;
use crate::mode::Mode;

/// Events emitted by the conversation session.
/// The presentation layer drains these to know when to re-render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A user message was appended and its request is in flight
    ExchangeStarted { message_id: u64 },

    /// A message landed in the history
    MessageAppended { message_id: u64, sender: Sender },

    /// The completion request failed; `message` is the user-visible error
    ExchangeFailed { message: String },

    /// A reply arrived for a history that was cleared meanwhile
    ExchangeDiscarded { message_id: u64 },

    ModeChanged { mode: Mode },

    Cleared,
}
