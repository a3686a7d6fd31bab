use serde::{Deserialize, Serialize};

pub const MOOD_MAX: u8 = 100;

/// Energy level on a 0..=100 scale; 50 is neutral
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mood(u8);

impl Mood {
    pub fn new(value: u8) -> Self {
        Self(value.min(MOOD_MAX))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn level(&self) -> MoodLevel {
        match self.0 {
            0..=24 => MoodLevel::Low,
            25..=49 => MoodLevel::Down,
            50..=74 => MoodLevel::Okay,
            _ => MoodLevel::Energetic,
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Self(50)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLevel {
    Low,
    Down,
    Okay,
    Energetic,
}

impl MoodLevel {
    pub fn label(&self) -> &'static str {
        match self {
            MoodLevel::Low => "Feeling low",
            MoodLevel::Down => "A bit down",
            MoodLevel::Okay => "Doing okay",
            MoodLevel::Energetic => "Feeling energetic",
        }
    }
}
