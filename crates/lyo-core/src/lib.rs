//! Lyo core — everything the companion does that is not a browser API.
//!
//! Platform adapters plug in through the traits in [`ports`].

pub mod content;
pub mod conversation;
pub mod event_bus;
pub mod ports;
pub mod prompt;
pub mod stores;

#[cfg(test)]
mod tests;
