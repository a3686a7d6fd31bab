//! Conversation session — mediates between user input and the completion API.
//!
//! One exchange is:
//! 1. Snapshot the history, then append the user message (optimistic append)
//! 2. Send system prompt + snapshot + new user text to the LLM
//! 3. On success append the assistant reply and notify; on failure record
//!    the error and keep the user message (no rollback)
//!
//! Exchanges may overlap. No `RefCell` borrow is held across the LLM await,
//! so a second `send_message` can run while the first is in flight. Replies
//! are appended in completion order, which may differ from send order.
//! In-flight requests cannot be cancelled.

use std::cell::RefCell;
use std::rc::Rc;

use lyo_types::{
    config::LlmConfig,
    event::SessionEvent,
    message::{ChatMessage, Sender, WireMessage},
    mode::Mode,
    session::Session,
    LyoError, Result,
};

use crate::event_bus::EventBus;
use crate::ports::{ChatRequest, LlmPort, NotificationPort};
use crate::prompt::system_prompt;
use crate::stores::SettingsStore;

pub const NOTIFICATION_TITLE: &str = "New message from Lyo";

/// The single user-visible error for any failed exchange
pub const EXCHANGE_FAILED_MESSAGE: &str = "Failed to get a response from Lyo. Please try again.";

struct SessionState {
    session: Session,
    next_id: u64,
    /// Bumped by `clear_chat`; replies from an older epoch are dropped
    epoch: u64,
}

impl SessionState {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Clone-cheap handle to the live conversation.
#[derive(Clone)]
pub struct ConversationSession {
    state: Rc<RefCell<SessionState>>,
    config: Rc<RefCell<LlmConfig>>,
    event_bus: EventBus,
    notifier: Rc<dyn NotificationPort>,
    settings: SettingsStore,
}

impl ConversationSession {
    pub fn new(
        config: LlmConfig,
        event_bus: EventBus,
        notifier: Rc<dyn NotificationPort>,
        settings: SettingsStore,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionState {
                session: Session::new(),
                next_id: 1,
                epoch: 0,
            })),
            config: Rc::new(RefCell::new(config)),
            event_bus,
            notifier,
            settings,
        }
    }

    /// Run one exchange and return the assistant reply.
    ///
    /// `text` must not be blank; the UI is expected to filter those out.
    /// Every failure is also recorded as the session's `last_error`.
    pub async fn send_message(&self, text: &str, llm: &dyn LlmPort) -> Result<ChatMessage> {
        if text.trim().is_empty() {
            return Err(LyoError::Validation("message must not be empty".to_string()));
        }

        let (request, user_id, epoch) = {
            let mut state = self.state.borrow_mut();
            let request = Self::build_request(
                state.session.mode,
                &state.session.messages,
                text,
                &self.config.borrow(),
            );
            let id = state.allocate_id();
            state.session.messages.push(ChatMessage::user(id, text));
            (request, id, state.epoch)
        };
        self.event_bus.emit(SessionEvent::ExchangeStarted { message_id: user_id });
        log::debug!(
            "Exchange {} started: {} messages, temperature {}",
            user_id,
            request.messages.len(),
            request.temperature
        );

        let result = llm.chat_completion(request).await.and_then(|resp| {
            if resp.text.trim().is_empty() {
                Err(LyoError::MalformedResponse("empty completion".to_string()))
            } else {
                Ok(resp)
            }
        });

        let mut state = self.state.borrow_mut();
        if state.epoch != epoch {
            drop(state);
            log::info!("Dropping reply to message {}: chat was cleared", user_id);
            self.event_bus.emit(SessionEvent::ExchangeDiscarded { message_id: user_id });
            return Err(LyoError::Cancelled);
        }

        match result {
            Ok(resp) => {
                let id = state.allocate_id();
                let reply = ChatMessage::assistant(id, resp.text);
                state.session.messages.push(reply.clone());
                state.session.last_error = None;
                drop(state);

                self.event_bus.emit(SessionEvent::MessageAppended {
                    message_id: id,
                    sender: Sender::Assistant,
                });
                if self.settings.notifications_enabled() {
                    self.notifier.notify(NOTIFICATION_TITLE, &reply.text);
                }
                Ok(reply)
            }
            Err(e) => {
                state.session.last_error = Some(EXCHANGE_FAILED_MESSAGE.to_string());
                drop(state);

                log::error!("Exchange {} failed: {}", user_id, e);
                self.event_bus.emit(SessionEvent::ExchangeFailed {
                    message: EXCHANGE_FAILED_MESSAGE.to_string(),
                });
                Err(e)
            }
        }
    }

    /// System prompt for `mode`, then `prior` in order, then `text` as the
    /// final user entry.
    pub fn build_request(
        mode: Mode,
        prior: &[ChatMessage],
        text: &str,
        config: &LlmConfig,
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(prior.len() + 2);
        messages.push(WireMessage::system(system_prompt(mode)));
        messages.extend(prior.iter().map(WireMessage::from));
        messages.push(WireMessage::user(text));

        ChatRequest {
            messages,
            model: config.model.clone(),
            temperature: mode.temperature(),
            max_tokens: config.max_tokens,
        }
    }

    /// Empty the history and the error. The mode is kept.
    pub fn clear_chat(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.session.messages.clear();
            state.session.last_error = None;
            state.epoch += 1;
        }
        self.event_bus.emit(SessionEvent::Cleared);
    }

    /// Affects future requests only.
    pub fn set_mode(&self, mode: Mode) {
        self.state.borrow_mut().session.mode = mode;
        self.event_bus.emit(SessionEvent::ModeChanged { mode });
    }

    pub fn mode(&self) -> Mode {
        self.state.borrow().session.mode
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.borrow().session.messages.clone()
    }

    pub fn message(&self, id: u64) -> Option<ChatMessage> {
        self.state
            .borrow()
            .session
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().session.last_error.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().session.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().session.messages.is_empty()
    }

    pub fn session_id(&self) -> String {
        self.state.borrow().session.id.clone()
    }

    pub fn set_llm_config(&self, config: LlmConfig) {
        *self.config.borrow_mut() = config;
    }
}
