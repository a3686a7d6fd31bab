use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SETTINGS_STORAGE_KEY: &str = "lyo:settings";

/// Key used by earlier web builds; read once when the current key is empty
pub const LEGACY_SETTINGS_STORAGE_KEY: &str = "lyoSettings";

/// User preferences. Missing fields take their defaults when loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub voice_enabled: bool,
    pub language: Language,
    pub avatar_style: AvatarStyle,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            voice_enabled: false,
            language: Language::English,
            avatar_style: AvatarStyle::Holographic,
            notifications: false,
        }
    }
}

impl Settings {
    /// Decode stored settings one field at a time. A field that is missing
    /// or does not decode keeps its default; the others are still applied.
    pub fn from_stored(value: &Value) -> Self {
        let mut settings = Settings::default();
        let Some(fields) = value.as_object() else {
            log::warn!("Stored settings are not an object, using defaults");
            return settings;
        };
        settings.apply(SettingsPatch {
            voice_enabled: stored_field(fields, "voiceEnabled"),
            language: stored_field(fields, "language"),
            avatar_style: stored_field(fields, "avatarStyle"),
            notifications: stored_field(fields, "notifications"),
        });
        settings
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.voice_enabled {
            self.voice_enabled = v;
        }
        if let Some(v) = patch.language {
            self.language = v;
        }
        if let Some(v) = patch.avatar_style {
            self.avatar_style = v;
        }
        if let Some(v) = patch.notifications {
            self.notifications = v;
        }
    }
}

fn stored_field<T: DeserializeOwned>(fields: &serde_json::Map<String, Value>, name: &str) -> Option<T> {
    let raw = fields.get(name)?;
    match serde_json::from_value(raw.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Ignoring stored setting {} = {}: {}", name, raw, e);
            None
        }
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub voice_enabled: Option<bool>,
    pub language: Option<Language>,
    pub avatar_style: Option<AvatarStyle>,
    pub notifications: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Tagalog,
    Auto,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[Language::English, Language::Tagalog, Language::Auto]
    }

    pub fn label(&self) -> &str {
        match self {
            Language::English => "English",
            Language::Tagalog => "Tagalog",
            Language::Auto => "Auto-detect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarStyle {
    #[default]
    Holographic,
    Pixel,
    Cartoon,
}

impl AvatarStyle {
    pub fn all() -> &'static [AvatarStyle] {
        &[AvatarStyle::Holographic, AvatarStyle::Pixel, AvatarStyle::Cartoon]
    }

    pub fn label(&self) -> &str {
        match self {
            AvatarStyle::Holographic => "Holographic",
            AvatarStyle::Pixel => "Pixel Art",
            AvatarStyle::Cartoon => "Cartoon",
        }
    }
}

/// A selectable value and its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingOption<T> {
    pub id: T,
    pub label: String,
}

/// Choices offered by the settings screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOptions {
    pub languages: Vec<SettingOption<Language>>,
    pub avatar_styles: Vec<SettingOption<AvatarStyle>>,
}

impl SettingsOptions {
    pub fn all() -> Self {
        Self {
            languages: Language::all()
                .iter()
                .map(|l| SettingOption { id: *l, label: l.label().to_string() })
                .collect(),
            avatar_styles: AvatarStyle::all()
                .iter()
                .map(|a| SettingOption { id: *a, label: a.label().to_string() })
                .collect(),
        }
    }
}
