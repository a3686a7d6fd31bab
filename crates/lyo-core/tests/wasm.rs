//! WASM-target tests for lyo-core.
//!
//! Runs the conversation session and stores under wasm32-unknown-unknown
//! via `wasm-pack test --node`, awaiting futures on the JS event loop
//! instead of a native executor.

use wasm_bindgen_test::*;

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;

use lyo_core::conversation::{ConversationSession, EXCHANGE_FAILED_MESSAGE};
use lyo_core::event_bus::EventBus;
use lyo_core::ports::*;
use lyo_core::prompt::system_prompt;
use lyo_core::stores::{MemoryStore, SettingsStore};
use lyo_types::config::LlmConfig;
use lyo_types::message::Sender;
use lyo_types::mode::Mode;
use lyo_types::LyoError;

struct EchoLlm {
    seen: RefCell<Vec<ChatRequest>>,
}

#[async_trait(?Send)]
impl LlmPort for EchoLlm {
    async fn chat_completion(&self, req: ChatRequest) -> lyo_types::Result<ChatResponse> {
        let last = req.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.seen.borrow_mut().push(req);
        Ok(ChatResponse { text: format!("echo: {}", last), usage: None })
    }
}

struct DownLlm;

#[async_trait(?Send)]
impl LlmPort for DownLlm {
    async fn chat_completion(&self, _req: ChatRequest) -> lyo_types::Result<ChatResponse> {
        Err(LyoError::Network("fetch failed".to_string()))
    }
}

struct SilentNotifier;

impl NotificationPort for SilentNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
}

fn new_session() -> ConversationSession {
    ConversationSession::new(
        LlmConfig::default(),
        EventBus::new(),
        Rc::new(SilentNotifier),
        SettingsStore::default(),
    )
}

#[wasm_bindgen_test]
fn prompt_is_pure() {
    for mode in Mode::all() {
        assert_eq!(system_prompt(*mode), system_prompt(*mode));
    }
}

#[wasm_bindgen_test]
async fn session_exchange_appends_both_turns() {
    let session = new_session();
    let llm = EchoLlm { seen: RefCell::new(Vec::new()) };

    session.send_message("hello", &llm).await.unwrap();

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].text, "echo: hello");
    assert_eq!(llm.seen.borrow()[0].messages.len(), 2);
}

#[wasm_bindgen_test]
async fn session_failure_leaves_user_turn() {
    let session = new_session();
    assert!(session.send_message("hello", &DownLlm).await.is_err());
    assert_eq!(session.len(), 1);
    assert_eq!(session.last_error().as_deref(), Some(EXCHANGE_FAILED_MESSAGE));

    session.clear_chat();
    assert!(session.is_empty());
    assert!(session.last_error().is_none());
}

#[wasm_bindgen_test]
async fn lowbatt_uses_low_temperature() {
    let session = new_session();
    let llm = EchoLlm { seen: RefCell::new(Vec::new()) };
    session.set_mode(Mode::LowBatt);
    session.send_message("tired", &llm).await.unwrap();
    assert_eq!(llm.seen.borrow()[0].temperature, Mode::LowBatt.temperature());
}

#[wasm_bindgen_test]
async fn memory_store_add_and_remove() {
    let store = MemoryStore::seeded();
    let entry = store.add("Title", "Body").await.unwrap();
    assert_eq!(store.len(), 3);
    assert!(store.remove(&entry.id).await);
    assert_eq!(store.len(), 2);
}
