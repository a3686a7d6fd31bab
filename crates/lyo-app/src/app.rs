//! The exported application object.
//!
//! Every method is a thin adapter: arguments are decoded, the call is handed
//! to a store or the conversation session, and the result is encoded back.
//! Async work returns a `Promise` built from a cloned `Rc<AppState>`.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use lyo_core::content::{quote_at, CONVERSATION_STARTERS, QUOTES};
use lyo_core::conversation::ConversationSession;
use lyo_core::event_bus::EventBus;
use lyo_core::ports::{LlmPort, NotificationPort, StoragePort};
use lyo_core::stores::{AuthStore, MemoryStore, MoodStore, SettingsStore};
use lyo_platform::llm::OpenAiCompatProvider;
use lyo_platform::notify::{NullNotifier, WebNotifier};
use lyo_platform::storage::{auto_detect_storage, open_storage};
use lyo_types::config::{LlmConfig, LyoConfig, CONFIG_STORAGE_KEY};
use lyo_types::memory::MemoryPatch;
use lyo_types::mode::{Mode, ModeInfo};
use lyo_types::settings::{SettingsOptions, SettingsPatch};
use lyo_types::LyoError;

use crate::convert::{from_js, js_error, to_js};

/// Compile-time key, the equivalent of a bundler env var
const BUILD_API_KEY: Option<&str> = option_env!("LYO_OPENAI_API_KEY");

struct AppState {
    config: RefCell<LyoConfig>,
    /// Where `LyoConfig` itself lives
    config_storage: Rc<dyn StoragePort>,
    llm: RefCell<Rc<dyn LlmPort>>,
    session: ConversationSession,
    event_bus: EventBus,
    settings: SettingsStore,
    mood: MoodStore,
    memories: MemoryStore,
    auth: AuthStore,
}

impl AppState {
    /// Apply `edit` to the LLM config, rebuild the provider and persist.
    async fn update_llm_config(&self, edit: impl FnOnce(&mut LlmConfig)) -> lyo_types::Result<()> {
        let config = {
            let mut config = self.config.borrow_mut();
            edit(&mut config.llm);
            config.clone()
        };
        *self.llm.borrow_mut() = Rc::new(OpenAiCompatProvider::new(config.llm.clone()));
        self.session.set_llm_config(config.llm.clone());

        let json = serde_json::to_string(&config)?;
        self.config_storage.set(CONFIG_STORAGE_KEY, &json).await?;
        log::info!("Config saved to {}", self.config_storage.backend_name());
        Ok(())
    }
}

/// Restore config from storage, falling back to the defaults
async fn load_config(storage: &dyn StoragePort) -> LyoConfig {
    let mut config = match storage.get(CONFIG_STORAGE_KEY).await {
        Ok(Some(data)) => match serde_json::from_str::<LyoConfig>(&data) {
            Ok(config) => {
                log::info!("Config restored from storage");
                config
            }
            Err(e) => {
                log::warn!("Stored config unreadable ({}), using defaults", e);
                LyoConfig::default()
            }
        },
        Ok(None) => LyoConfig::default(),
        Err(e) => {
            log::warn!("Failed to read config: {}", e);
            LyoConfig::default()
        }
    };
    if config.llm.api_key.is_empty() {
        if let Some(key) = BUILD_API_KEY {
            config.llm.api_key = key.to_string();
        }
    }
    config
}

/// Build the application. Resolves once config, settings and memories are loaded.
#[wasm_bindgen(js_name = createApp)]
pub async fn create_app() -> Result<LyoApp, JsValue> {
    let config_storage = auto_detect_storage();
    let config = load_config(config_storage.as_ref()).await;
    let storage = open_storage(config.storage.backend);

    let settings = SettingsStore::load(storage.clone()).await;
    let memories = MemoryStore::load(storage).await;

    let notifier: Rc<dyn NotificationPort> = if WebNotifier::is_supported() {
        Rc::new(WebNotifier::new())
    } else {
        log::warn!("Notification API unavailable; notifications disabled");
        Rc::new(NullNotifier)
    };

    let event_bus = EventBus::new();
    let session = ConversationSession::new(
        config.llm.clone(),
        event_bus.clone(),
        notifier,
        settings.clone(),
    );
    let llm: Rc<dyn LlmPort> = Rc::new(OpenAiCompatProvider::new(config.llm.clone()));

    log::info!(
        "Lyo ready: session {}, provider {}, model {}",
        session.session_id(),
        config.llm.provider.label(),
        config.llm.model
    );

    Ok(LyoApp {
        state: Rc::new(AppState {
            config: RefCell::new(config),
            config_storage,
            llm: RefCell::new(llm),
            session,
            event_bus,
            settings,
            mood: MoodStore::new(),
            memories,
            auth: AuthStore::new(),
        }),
    })
}

#[wasm_bindgen]
pub struct LyoApp {
    state: Rc<AppState>,
}

#[wasm_bindgen]
impl LyoApp {
    // ── Chat ─────────────────────────────────────────────────

    /// Resolves `true` when a reply was appended. Blank input resolves
    /// `false` untouched; failures resolve `false` with `lastError()` set.
    #[wasm_bindgen(js_name = sendMessage)]
    pub fn send_message(&self, text: String) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            if text.trim().is_empty() {
                return Ok(JsValue::FALSE);
            }
            let llm = state.llm.borrow().clone();
            match state.session.send_message(&text, llm.as_ref()).await {
                Ok(_) => Ok(JsValue::TRUE),
                Err(LyoError::Cancelled) => Ok(JsValue::FALSE),
                Err(e) => {
                    log::debug!("sendMessage resolved without reply: {}", e);
                    Ok(JsValue::FALSE)
                }
            }
        })
    }

    pub fn messages(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.session.messages())
    }

    pub fn mode(&self) -> String {
        self.state.session.mode().to_string()
    }

    /// Unknown names select `normal`.
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&self, name: &str) -> String {
        let mode = Mode::parse_or_default(name);
        self.state.session.set_mode(mode);
        mode.to_string()
    }

    pub fn modes(&self) -> Result<JsValue, JsValue> {
        let modes: Vec<ModeInfo> = Mode::all().iter().copied().map(ModeInfo::from).collect();
        to_js(&modes)
    }

    #[wasm_bindgen(js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.state.session.last_error()
    }

    #[wasm_bindgen(js_name = clearChat)]
    pub fn clear_chat(&self) {
        self.state.session.clear_chat();
    }

    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.event_bus.drain())
    }

    #[wasm_bindgen(js_name = hasPendingEvents)]
    pub fn has_pending_events(&self) -> bool {
        self.state.event_bus.has_pending()
    }

    #[wasm_bindgen(js_name = conversationStarters)]
    pub fn conversation_starters(&self) -> Result<JsValue, JsValue> {
        to_js(CONVERSATION_STARTERS)
    }

    #[wasm_bindgen(js_name = randomQuote)]
    pub fn random_quote(&self) -> String {
        let n = (js_sys::Math::random() * QUOTES.len() as f64) as usize;
        quote_at(n).to_string()
    }

    // ── Settings ─────────────────────────────────────────────

    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.settings.settings())
    }

    /// Languages and avatar styles with their labels
    #[wasm_bindgen(js_name = settingsOptions)]
    pub fn settings_options(&self) -> Result<JsValue, JsValue> {
        to_js(&SettingsOptions::all())
    }

    /// Merge a partial settings object; resolves to the new settings.
    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&self, patch: JsValue) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let patch: SettingsPatch = from_js(&patch)?;
            let settings = state.settings.update(patch).await.map_err(js_error)?;
            to_js(&settings)
        })
    }

    #[wasm_bindgen(js_name = setApiKey)]
    pub fn set_api_key(&self, key: String) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            state
                .update_llm_config(|llm| llm.api_key = key.trim().to_string())
                .await
                .map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = hasApiKey)]
    pub fn has_api_key(&self) -> bool {
        !self.state.config.borrow().llm.api_key.is_empty()
    }

    #[wasm_bindgen(js_name = setModel)]
    pub fn set_model(&self, model: String) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let model = model.trim().to_string();
            if model.is_empty() {
                return Err(js_error(LyoError::Config("model must not be empty".to_string())));
            }
            state
                .update_llm_config(|llm| llm.model = model)
                .await
                .map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    // ── Mood ─────────────────────────────────────────────────

    pub fn mood(&self) -> u8 {
        self.state.mood.get().value()
    }

    /// Returns the stored (clamped) value.
    #[wasm_bindgen(js_name = setMood)]
    pub fn set_mood(&self, value: u8) -> u8 {
        self.state.mood.set(value).value()
    }

    #[wasm_bindgen(js_name = moodLabel)]
    pub fn mood_label(&self) -> String {
        self.state.mood.level().label().to_string()
    }

    // ── Memory board ─────────────────────────────────────────

    pub fn memories(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.memories.list())
    }

    #[wasm_bindgen(js_name = addMemory)]
    pub fn add_memory(&self, title: String, content: String) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let entry = state.memories.add(&title, &content).await.map_err(js_error)?;
            to_js(&entry)
        })
    }

    #[wasm_bindgen(js_name = removeMemory)]
    pub fn remove_memory(&self, id: String) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let removed = state.memories.remove(&id).await;
            Ok(JsValue::from_bool(removed))
        })
    }

    #[wasm_bindgen(js_name = updateMemory)]
    pub fn update_memory(&self, id: String, patch: JsValue) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let patch: MemoryPatch = from_js(&patch)?;
            let entry = state.memories.update(&id, patch).await.map_err(js_error)?;
            to_js(&entry)
        })
    }

    /// Save a chat message (by id) to the memory board.
    #[wasm_bindgen(js_name = saveMessageToMemory)]
    pub fn save_message_to_memory(&self, message_id: f64) -> Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let id = message_id as u64;
            let message = state
                .session
                .message(id)
                .ok_or_else(|| js_error(LyoError::NotFound(format!("message {}", id))))?;
            let entry = state.memories.save_message(&message).await.map_err(js_error)?;
            to_js(&entry)
        })
    }

    // ── Auth gate ────────────────────────────────────────────

    #[wasm_bindgen(js_name = signIn)]
    pub fn sign_in(&self, email: &str, password: &str) -> Result<JsValue, JsValue> {
        let user = self.state.auth.sign_in(email, password).map_err(js_error)?;
        to_js(&user)
    }

    #[wasm_bindgen(js_name = signUp)]
    pub fn sign_up(&self, email: &str, password: &str) -> Result<JsValue, JsValue> {
        let user = self.state.auth.sign_up(email, password).map_err(js_error)?;
        to_js(&user)
    }

    #[wasm_bindgen(js_name = signOut)]
    pub fn sign_out(&self) {
        self.state.auth.sign_out();
    }

    /// `null` when signed out
    pub fn user(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.auth.user())
    }
}
