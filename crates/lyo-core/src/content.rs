//! Static copy shown by the presentation layer.

pub const QUOTES: &[&str] = &[
    "Presence over pressure. Insight over answers. Growth that respects pacing.",
    "Emotions aren't good or bad. They're information.",
    "Clarity comes from engagement, not avoidance.",
    "Your feelings are valid, even when they're complicated.",
    "Small moments of reflection create powerful change.",
    "Understanding yourself is the beginning of growth.",
    "The path to clarity starts with a single honest conversation.",
    "When words fail, presence matters most.",
];

/// Example prompts offered on an empty chat
pub const CONVERSATION_STARTERS: &[&str] = &[
    "How are you feeling today, Lyo?",
    "I need some clarity about a situation",
    "Can you help me process my thoughts?",
    "I'm feeling overwhelmed",
];

pub fn quote_at(n: usize) -> &'static str {
    QUOTES[n % QUOTES.len()]
}
