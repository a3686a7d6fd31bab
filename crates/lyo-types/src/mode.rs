//! Conversation modes.
//!
//! A mode changes two things about future requests: the behavioural clause
//! appended to the system prompt and the sampling temperature.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LyoError;

pub const LOW_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Real,
    Chill,
    LowBatt,
}

impl Mode {
    pub fn all() -> &'static [Mode] {
        &[Mode::Normal, Mode::Real, Mode::Chill, Mode::LowBatt]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Real => "real",
            Mode::Chill => "chill",
            Mode::LowBatt => "lowbatt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "Normal Talk",
            Mode::Real => "Real Talk",
            Mode::Chill => "Chill Talk",
            Mode::LowBatt => "Low-Batt",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Mode::Normal => "Balanced & thoughtful conversation",
            Mode::Real => "Direct & challenging",
            Mode::Chill => "Gentle & supportive",
            Mode::LowBatt => "Minimal & comforting",
        }
    }

    /// Behavioural clause appended to the system prompt
    pub fn clause(&self) -> &'static str {
        match self {
            Mode::Normal => "Maintain a balanced and thoughtful conversation style while helping users process their thoughts and feelings.",
            Mode::Real => "Be more direct and willing to challenge thoughts while remaining supportive. Focus on helping users confront difficult emotions and situations constructively.",
            Mode::Chill => "Keep the conversation relaxed and supportive, emphasizing validation and emotional comfort. Help users feel at ease while processing their feelings.",
            Mode::LowBatt => "Provide very brief but comforting responses. Keep messages short and supportive.",
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            Mode::LowBatt => LOW_TEMPERATURE,
            Mode::Normal | Mode::Real | Mode::Chill => DEFAULT_TEMPERATURE,
        }
    }

    /// Lenient parse for values arriving from the UI.
    /// Unknown names resolve to `Normal`.
    pub fn parse_or_default(name: &str) -> Mode {
        name.parse::<Mode>().unwrap_or_else(|e| {
            log::warn!("{}; falling back to {}", e, Mode::Normal);
            Mode::Normal
        })
    }
}

impl FromStr for Mode {
    type Err = LyoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Mode::Normal),
            "real" => Ok(Mode::Real),
            "chill" => Ok(Mode::Chill),
            "lowbatt" => Ok(Mode::LowBatt),
            other => Err(LyoError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector metadata handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct ModeInfo {
    pub id: Mode,
    pub label: &'static str,
    pub description: &'static str,
}

impl From<Mode> for ModeInfo {
    fn from(mode: Mode) -> Self {
        Self {
            id: mode,
            label: mode.label(),
            description: mode.description(),
        }
    }
}
