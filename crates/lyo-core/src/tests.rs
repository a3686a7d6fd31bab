use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::block_on;

use crate::content::*;
use crate::conversation::*;
use crate::event_bus::EventBus;
use crate::ports::*;
use crate::prompt::system_prompt;
use crate::stores::*;
use lyo_types::config::LlmConfig;
use lyo_types::event::SessionEvent;
use lyo_types::memory::MemoryPatch;
use lyo_types::message::*;
use lyo_types::mode::*;
use lyo_types::mood::MoodLevel;
use lyo_types::settings::*;
use lyo_types::LyoError;

// ─── Mocks ───────────────────────────────────────────────

/// Replies with a fixed text and records every request
struct MockLlm {
    reply: String,
    requests: RefCell<Vec<ChatRequest>>,
}

impl MockLlm {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl LlmPort for MockLlm {
    async fn chat_completion(&self, req: ChatRequest) -> lyo_types::Result<ChatResponse> {
        self.requests.borrow_mut().push(req);
        Ok(ChatResponse {
            text: self.reply.clone(),
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        })
    }
}

struct FailingLlm(LyoError);

#[async_trait(?Send)]
impl LlmPort for FailingLlm {
    async fn chat_completion(&self, _req: ChatRequest) -> lyo_types::Result<ChatResponse> {
        Err(self.0.clone())
    }
}

/// Each call waits for the next queued reply, so tests control completion order
struct GatedLlm {
    gates: RefCell<VecDeque<oneshot::Receiver<lyo_types::Result<String>>>>,
}

impl GatedLlm {
    fn with_gates(n: usize) -> (Self, Vec<oneshot::Sender<lyo_types::Result<String>>>) {
        let mut senders = Vec::new();
        let mut receivers = VecDeque::new();
        for _ in 0..n {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        (Self { gates: RefCell::new(receivers) }, senders)
    }
}

#[async_trait(?Send)]
impl LlmPort for GatedLlm {
    async fn chat_completion(&self, _req: ChatRequest) -> lyo_types::Result<ChatResponse> {
        let gate = self
            .gates
            .borrow_mut()
            .pop_front()
            .expect("more calls than gates");
        let text = gate.await.map_err(|_| LyoError::Network("gate dropped".to_string()))??;
        Ok(ChatResponse { text, usage: None })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: RefCell<Vec<(String, String)>>,
}

impl NotificationPort for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.sent.borrow_mut().push((title.to_string(), body.to_string()));
    }
}

#[derive(Default)]
struct MockStorage {
    data: RefCell<HashMap<String, String>>,
    fail_writes: bool,
}

#[async_trait(?Send)]
impl StoragePort for MockStorage {
    async fn get(&self, key: &str) -> lyo_types::Result<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> lyo_types::Result<()> {
        if self.fail_writes {
            return Err(LyoError::Storage("quota exceeded".to_string()));
        }
        self.data.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> lyo_types::Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn session_with(notifications: bool) -> (ConversationSession, Rc<RecordingNotifier>, EventBus) {
    let bus = EventBus::new();
    let notifier = Rc::new(RecordingNotifier::default());
    let settings = SettingsStore::new(Settings {
        notifications,
        ..Settings::default()
    });
    let session = ConversationSession::new(
        LlmConfig::default(),
        bus.clone(),
        notifier.clone(),
        settings,
    );
    (session, notifier, bus)
}

fn texts(messages: &[ChatMessage]) -> Vec<(Sender, String)> {
    messages.iter().map(|m| (m.sender, m.text.clone())).collect()
}

// ─── EventBus Tests ──────────────────────────────────────

#[test]
fn test_event_bus_emit_and_drain() {
    let bus = EventBus::new();
    assert!(!bus.has_pending());
    bus.emit(SessionEvent::Cleared);
    bus.emit(SessionEvent::ModeChanged { mode: Mode::Chill });
    assert!(bus.has_pending());
    assert_eq!(bus.drain().len(), 2);
    assert!(bus.drain().is_empty());
}

#[test]
fn test_event_bus_clone_shares_state() {
    let bus1 = EventBus::new();
    let bus2 = bus1.clone();
    bus1.emit(SessionEvent::Cleared);
    assert_eq!(bus2.drain(), vec![SessionEvent::Cleared]);
    assert!(!bus1.has_pending());
}

// ─── Request Construction Tests ──────────────────────────

#[test]
fn test_build_request_layout() {
    let prior = vec![ChatMessage::user(1, "hi"), ChatMessage::assistant(2, "hello!")];
    let req = ConversationSession::build_request(Mode::Real, &prior, "how are you", &LlmConfig::default());

    assert_eq!(req.messages.len(), 4);
    assert_eq!(req.messages[0], WireMessage::system(system_prompt(Mode::Real)));
    assert_eq!(req.messages[1], WireMessage::user("hi"));
    assert_eq!(req.messages[2], WireMessage::assistant("hello!"));
    assert_eq!(req.messages[3], WireMessage::user("how are you"));
    assert_eq!(req.model, "gpt-4");
    assert!(req.max_tokens.is_none());
}

#[test]
fn test_build_request_temperature_per_mode() {
    let config = LlmConfig::default();
    let low = ConversationSession::build_request(Mode::LowBatt, &[], "x", &config);
    assert_eq!(low.temperature, LOW_TEMPERATURE);
    for mode in [Mode::Normal, Mode::Real, Mode::Chill] {
        let req = ConversationSession::build_request(mode, &[], "x", &config);
        assert_eq!(req.temperature, DEFAULT_TEMPERATURE);
    }
}

#[test]
fn test_request_does_not_duplicate_new_user_message() {
    let (session, _, _) = session_with(false);
    let llm = MockLlm::new("reply");

    block_on(session.send_message("first", &llm)).unwrap();
    block_on(session.send_message("second", &llm)).unwrap();

    let requests = llm.requests.borrow();
    // system + "first"
    assert_eq!(requests[0].messages.len(), 2);
    // system + first + reply + "second"
    assert_eq!(requests[1].messages.len(), 4);
    let second_count = requests[1]
        .messages
        .iter()
        .filter(|m| m.content == "second")
        .count();
    assert_eq!(second_count, 1);
}

// ─── send_message Tests ──────────────────────────────────

#[test]
fn test_send_message_success() {
    let (session, _, bus) = session_with(false);
    let llm = MockLlm::new("Hey, I'm here.");

    let reply = block_on(session.send_message("hello", &llm)).unwrap();

    assert_eq!(reply.text, "Hey, I'm here.");
    assert_eq!(
        texts(&session.messages()),
        vec![
            (Sender::User, "hello".to_string()),
            (Sender::Assistant, "Hey, I'm here.".to_string()),
        ]
    );
    assert!(session.last_error().is_none());

    let events = bus.drain();
    assert!(matches!(events[0], SessionEvent::ExchangeStarted { .. }));
    assert!(matches!(
        events[1],
        SessionEvent::MessageAppended { sender: Sender::Assistant, .. }
    ));
}

#[test]
fn test_message_ids_strictly_increase() {
    let (session, _, _) = session_with(false);
    let llm = MockLlm::new("ok");
    block_on(session.send_message("a", &llm)).unwrap();
    session.clear_chat();
    block_on(session.send_message("b", &llm)).unwrap();

    let ids: Vec<u64> = session.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids[0] < ids[1]);
    // the counter survives a clear
    assert!(ids[0] > 2);
}

#[test]
fn test_send_message_failure_keeps_user_message() {
    let (session, notifier, bus) = session_with(true);
    let llm = FailingLlm(LyoError::Network("offline".to_string()));

    let err = block_on(session.send_message("hello", &llm)).unwrap_err();

    assert_eq!(err, LyoError::Network("offline".to_string()));
    assert_eq!(texts(&session.messages()), vec![(Sender::User, "hello".to_string())]);
    assert_eq!(session.last_error().as_deref(), Some(EXCHANGE_FAILED_MESSAGE));
    assert!(notifier.sent.borrow().is_empty());
    assert!(bus
        .drain()
        .iter()
        .any(|e| matches!(e, SessionEvent::ExchangeFailed { .. })));
}

#[test]
fn test_api_and_malformed_errors_are_collapsed() {
    for error in [
        LyoError::Api { status: 500, body: "boom".to_string() },
        LyoError::MalformedResponse("no choices".to_string()),
    ] {
        let (session, _, _) = session_with(false);
        assert!(block_on(session.send_message("hi", &FailingLlm(error))).is_err());
        assert_eq!(session.last_error().as_deref(), Some(EXCHANGE_FAILED_MESSAGE));
        assert_eq!(session.len(), 1);
    }
}

#[test]
fn test_empty_completion_is_malformed() {
    let (session, _, _) = session_with(false);
    let err = block_on(session.send_message("hi", &MockLlm::new("   "))).unwrap_err();
    assert!(matches!(err, LyoError::MalformedResponse(_)));
    assert_eq!(session.len(), 1);
}

#[test]
fn test_error_cleared_by_next_success() {
    let (session, _, _) = session_with(false);
    let _ = block_on(session.send_message("a", &FailingLlm(LyoError::Network("x".into()))));
    assert!(session.last_error().is_some());

    block_on(session.send_message("b", &MockLlm::new("ok"))).unwrap();
    assert!(session.last_error().is_none());
    assert_eq!(session.len(), 3);
}

#[test]
fn test_blank_message_rejected_without_side_effects() {
    let (session, _, bus) = session_with(false);
    let err = block_on(session.send_message("  \n", &MockLlm::new("ok"))).unwrap_err();
    assert!(matches!(err, LyoError::Validation(_)));
    assert!(session.is_empty());
    assert!(!bus.has_pending());
}

// ─── Notification Tests ──────────────────────────────────

#[test]
fn test_notification_sent_when_enabled() {
    let (session, notifier, _) = session_with(true);
    block_on(session.send_message("hi", &MockLlm::new("hello friend"))).unwrap();
    assert_eq!(
        *notifier.sent.borrow(),
        vec![(NOTIFICATION_TITLE.to_string(), "hello friend".to_string())]
    );
}

#[test]
fn test_notification_skipped_when_disabled() {
    let (session, notifier, _) = session_with(false);
    block_on(session.send_message("hi", &MockLlm::new("hello"))).unwrap();
    assert!(notifier.sent.borrow().is_empty());
}

// ─── Mode / Clear Tests ──────────────────────────────────

#[test]
fn test_mode_change_does_not_rewrite_history() {
    let (session, _, _) = session_with(false);
    let llm = MockLlm::new("reply");

    block_on(session.send_message("one", &llm)).unwrap();
    let before = session.messages();

    session.set_mode(Mode::LowBatt);
    block_on(session.send_message("two", &llm)).unwrap();

    assert_eq!(&session.messages()[..2], &before[..]);
    let requests = llm.requests.borrow();
    assert_eq!(requests[0].temperature, DEFAULT_TEMPERATURE);
    assert_eq!(requests[1].temperature, LOW_TEMPERATURE);
    assert_eq!(requests[1].messages[0].content, system_prompt(Mode::LowBatt));
}

#[test]
fn test_clear_chat_empties_history_and_error() {
    let (session, _, bus) = session_with(false);
    block_on(session.send_message("a", &MockLlm::new("ok"))).unwrap();
    let _ = block_on(session.send_message("b", &FailingLlm(LyoError::Network("x".into()))));
    session.set_mode(Mode::Chill);
    assert_eq!(session.len(), 3);

    session.clear_chat();

    assert!(session.is_empty());
    assert!(session.last_error().is_none());
    assert_eq!(session.mode(), Mode::Chill);
    assert_eq!(bus.drain().last(), Some(&SessionEvent::Cleared));

    session.clear_chat();
    assert!(session.is_empty());
}

// ─── Concurrency Tests ───────────────────────────────────

#[test]
fn test_concurrent_sends_with_reversed_completion() {
    let (session, _, _) = session_with(false);
    let (llm, mut gates) = GatedLlm::with_gates(2);
    let gate_b = gates.pop().unwrap();
    let gate_a = gates.pop().unwrap();

    let (a, b, ()) = block_on(async {
        futures::join!(
            session.send_message("A", &llm),
            session.send_message("B", &llm),
            async {
                // both requests are in flight by the time this runs
                gate_b.send(Ok("reply B".to_string())).unwrap();
                futures::pending!();
                gate_a.send(Ok("reply A".to_string())).unwrap();
            }
        )
    });
    let messages = session.messages();
    assert_eq!(messages.len(), 4);

    let users: Vec<&str> = messages
        .iter()
        .filter(|m| m.sender == Sender::User)
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(users, vec!["A", "B"]);
    assert_eq!(messages[0].text, "A");
    assert_eq!(messages[1].text, "B");

    // replies land in completion order: B was released first
    assert_eq!(messages[2].sender, Sender::Assistant);
    assert_eq!(messages[2].text, "reply B");
    assert_eq!(messages[3].text, "reply A");
    assert_eq!(a.unwrap().text, "reply A");
    assert_eq!(b.unwrap().text, "reply B");
}

#[test]
fn test_reply_after_clear_is_discarded() {
    let (session, _, bus) = session_with(false);
    let (llm, mut gates) = GatedLlm::with_gates(1);
    let gate = gates.pop().unwrap();

    let (result, ()) = block_on(async {
        futures::join!(session.send_message("hello", &llm), async {
            session.clear_chat();
            gate.send(Ok("late reply".to_string())).unwrap();
        })
    });

    assert_eq!(result.unwrap_err(), LyoError::Cancelled);
    assert!(session.is_empty());
    assert!(session.last_error().is_none());
    assert!(bus
        .drain()
        .iter()
        .any(|e| matches!(e, SessionEvent::ExchangeDiscarded { .. })));
}

// ─── Settings Store Tests ────────────────────────────────

#[test]
fn test_settings_load_defaults_when_missing() {
    let storage = Rc::new(MockStorage::default());
    let store = block_on(SettingsStore::load(storage));
    assert_eq!(store.settings(), Settings::default());
}

#[test]
fn test_settings_load_malformed_falls_back() {
    let storage = Rc::new(MockStorage::default());
    storage
        .data
        .borrow_mut()
        .insert(SETTINGS_STORAGE_KEY.to_string(), "{not json".to_string());
    let store = block_on(SettingsStore::load(storage));
    assert_eq!(store.settings(), Settings::default());
}

#[test]
fn test_settings_load_keeps_valid_fields_next_to_unknown_value() {
    let storage = Rc::new(MockStorage::default());
    storage.data.borrow_mut().insert(
        SETTINGS_STORAGE_KEY.to_string(),
        r#"{"notifications":true,"voiceEnabled":true,"language":"spanish"}"#.to_string(),
    );
    let store = block_on(SettingsStore::load(storage));
    let settings = store.settings();
    assert!(settings.notifications);
    assert!(settings.voice_enabled);
    assert_eq!(settings.language, Language::English);
    assert!(store.notifications_enabled());
}

#[test]
fn test_settings_load_migrates_legacy_key() {
    let storage = Rc::new(MockStorage::default());
    storage.data.borrow_mut().insert(
        LEGACY_SETTINGS_STORAGE_KEY.to_string(),
        r#"{"voiceEnabled":false,"language":"tagalog","avatarStyle":"cartoon","notifications":true}"#
            .to_string(),
    );
    let store = block_on(SettingsStore::load(storage.clone()));
    assert_eq!(store.settings().language, Language::Tagalog);
    assert_eq!(store.settings().avatar_style, AvatarStyle::Cartoon);
    assert!(storage.data.borrow().contains_key(SETTINGS_STORAGE_KEY));

    let reloaded = block_on(SettingsStore::load(storage));
    assert_eq!(reloaded.settings(), store.settings());
}

#[test]
fn test_settings_current_key_wins_over_legacy() {
    let storage = Rc::new(MockStorage::default());
    storage
        .data
        .borrow_mut()
        .insert(SETTINGS_STORAGE_KEY.to_string(), r#"{"language":"auto"}"#.to_string());
    storage
        .data
        .borrow_mut()
        .insert(LEGACY_SETTINGS_STORAGE_KEY.to_string(), r#"{"language":"tagalog"}"#.to_string());
    let store = block_on(SettingsStore::load(storage));
    assert_eq!(store.settings().language, Language::Auto);
}

#[test]
fn test_settings_update_persists() {
    let storage = Rc::new(MockStorage::default());
    let store = block_on(SettingsStore::load(storage.clone()));

    let updated = block_on(store.update(SettingsPatch {
        notifications: Some(true),
        avatar_style: Some(AvatarStyle::Pixel),
        ..Default::default()
    }))
    .unwrap();
    assert!(updated.notifications);
    assert!(store.notifications_enabled());

    let reloaded = block_on(SettingsStore::load(storage));
    assert_eq!(reloaded.settings().avatar_style, AvatarStyle::Pixel);
    assert!(reloaded.settings().notifications);
}

#[test]
fn test_settings_update_persist_failure_keeps_value() {
    let storage = Rc::new(MockStorage { fail_writes: true, ..Default::default() });
    let store = block_on(SettingsStore::load(storage));
    let result = block_on(store.update(SettingsPatch {
        voice_enabled: Some(true),
        ..Default::default()
    }));
    assert!(matches!(result, Err(LyoError::Storage(_))));
    assert!(store.settings().voice_enabled);
}

#[test]
fn test_session_reads_live_settings() {
    let bus = EventBus::new();
    let notifier = Rc::new(RecordingNotifier::default());
    let settings = SettingsStore::default();
    let session = ConversationSession::new(LlmConfig::default(), bus, notifier.clone(), settings.clone());

    block_on(session.send_message("one", &MockLlm::new("r1"))).unwrap();
    block_on(settings.update(SettingsPatch { notifications: Some(true), ..Default::default() })).unwrap();
    block_on(session.send_message("two", &MockLlm::new("r2"))).unwrap();

    assert_eq!(notifier.sent.borrow().len(), 1);
    assert_eq!(notifier.sent.borrow()[0].1, "r2");
}

// ─── Mood Store Tests ────────────────────────────────────

#[test]
fn test_mood_store_shared_and_clamped() {
    let mood = MoodStore::new();
    assert_eq!(mood.get().value(), 50);
    let other = mood.clone();
    other.set(180);
    assert_eq!(mood.get().value(), 100);
    mood.set(10);
    assert_eq!(other.level(), MoodLevel::Low);
}

// ─── Memory Store Tests ──────────────────────────────────

#[test]
fn test_memory_store_seeded() {
    let store = MemoryStore::seeded();
    let titles: Vec<String> = store.list().into_iter().map(|m| m.title).collect();
    assert_eq!(titles, vec!["Morning reflection", "Breakthrough moment"]);
}

#[test]
fn test_memory_add_remove_update() {
    let store = MemoryStore::seeded();

    let entry = block_on(store.add("  Evening  ", "Walked it off.")).unwrap();
    assert_eq!(entry.title, "Evening");
    assert_eq!(store.len(), 3);

    let updated = block_on(store.update(
        &entry.id,
        MemoryPatch { content: Some("Walked and journaled.".to_string()), ..Default::default() },
    ))
    .unwrap();
    assert_eq!(updated.title, "Evening");
    assert_eq!(updated.content, "Walked and journaled.");
    assert_eq!(store.get(&entry.id).unwrap().content, "Walked and journaled.");

    assert!(block_on(store.remove("1")));
    assert!(!block_on(store.remove("1")));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_memory_validation() {
    let store = MemoryStore::seeded();
    assert!(matches!(block_on(store.add("", "x")), Err(LyoError::Validation(_))));
    assert!(matches!(block_on(store.add("x", "   ")), Err(LyoError::Validation(_))));
    assert!(matches!(
        block_on(store.update("missing", MemoryPatch::default())),
        Err(LyoError::NotFound(_))
    ));
    assert!(matches!(
        block_on(store.update("1", MemoryPatch { title: Some(" ".into()), content: None })),
        Err(LyoError::Validation(_))
    ));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_memory_persistence_roundtrip() {
    let storage = Rc::new(MockStorage::default());
    let store = block_on(MemoryStore::load(storage.clone()));
    assert_eq!(store.len(), 2);

    block_on(store.remove("2"));
    block_on(store.add("New", "Entry")).unwrap();

    let reloaded = block_on(MemoryStore::load(storage));
    let titles: Vec<String> = reloaded.list().into_iter().map(|m| m.title).collect();
    assert_eq!(titles, vec!["Morning reflection", "New"]);
}

#[test]
fn test_memory_save_message() {
    let store = MemoryStore::seeded();
    let msg = ChatMessage::assistant(9, "Breathe in for four.\nHold for four.");
    let entry = block_on(store.save_message(&msg)).unwrap();
    assert_eq!(entry.title, "Breathe in for four.");
    assert_eq!(entry.content, msg.text);
}

#[test]
fn test_memory_save_message_keeps_surrounding_whitespace() {
    let store = MemoryStore::seeded();
    let msg = ChatMessage::assistant(9, "\n\n**Step 1:** breathe\n");
    let entry = block_on(store.save_message(&msg)).unwrap();
    assert_eq!(entry.title, "**Step 1:** breathe");
    assert_eq!(entry.content, msg.text);
    assert_eq!(store.get(&entry.id).unwrap().content, msg.text);
}

// ─── Auth Store Tests ────────────────────────────────────

#[test]
fn test_auth_sign_in_and_out() {
    let auth = AuthStore::new();
    assert!(!auth.is_signed_in());
    let user = auth.sign_in(" me@example.com ", "secret").unwrap();
    assert_eq!(user.email, "me@example.com");
    assert_eq!(auth.user(), Some(user));
    auth.sign_out();
    assert!(auth.user().is_none());
}

#[test]
fn test_auth_rejects_bad_credentials() {
    let auth = AuthStore::new();
    assert!(auth.sign_up("not-an-email", "pw").is_err());
    assert!(auth.sign_in("me@example.com", "").is_err());
    assert!(!auth.is_signed_in());
}

// ─── Content Tests ───────────────────────────────────────

#[test]
fn test_quote_at_wraps() {
    assert_eq!(quote_at(0), QUOTES[0]);
    assert_eq!(quote_at(QUOTES.len() + 1), QUOTES[1]);
    assert_eq!(CONVERSATION_STARTERS.len(), 4);
}
