use std::cell::Cell;
use std::rc::Rc;

use lyo_types::mood::{Mood, MoodLevel};

/// The current mood, shared across screens.
#[derive(Clone, Default)]
pub struct MoodStore {
    inner: Rc<Cell<Mood>>,
}

impl MoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Mood {
        self.inner.get()
    }

    /// Values above 100 are clamped.
    pub fn set(&self, value: u8) -> Mood {
        let mood = Mood::new(value);
        self.inner.set(mood);
        mood
    }

    pub fn level(&self) -> MoodLevel {
        self.get().level()
    }
}
