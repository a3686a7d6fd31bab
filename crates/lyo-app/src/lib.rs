//! Lyo App — WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the platform adapters, the stores and the conversation
//! session, and exports them to the JavaScript presentation layer.

mod app;
mod convert;

pub use app::{create_app, LyoApp};

use wasm_bindgen::prelude::*;

/// Runs once when the module is instantiated
#[wasm_bindgen(start)]
pub fn start() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Lyo WASM starting...");
}
