//! Notification adapters.

use lyo_core::ports::NotificationPort;
use wasm_bindgen::JsValue;
use web_sys::{Notification, NotificationOptions, NotificationPermission};

pub const NOTIFICATION_ICON: &str = "/assets/lyo-favicon.svg";

/// Shows a browser `Notification` when the page holds the permission.
#[derive(Default)]
pub struct WebNotifier;

impl WebNotifier {
    pub fn new() -> Self {
        Self
    }

    /// Whether the global scope exposes the Notification API
    pub fn is_supported() -> bool {
        js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("Notification")).unwrap_or(false)
    }
}

impl NotificationPort for WebNotifier {
    fn notify(&self, title: &str, body: &str) {
        if Notification::permission() != NotificationPermission::Granted {
            log::debug!("Notification skipped: permission not granted");
            return;
        }
        let options = NotificationOptions::new();
        options.set_body(body);
        options.set_icon(NOTIFICATION_ICON);
        if let Err(e) = Notification::new_with_options(title, &options) {
            log::warn!("Notification failed: {:?}", e);
        }
    }
}

/// For environments without the Notification API.
#[derive(Default)]
pub struct NullNotifier;

impl NotificationPort for NullNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
}
