//! Crossing the JS boundary: serde values in and out, errors as strings.

use gloo_utils::format::JsValueSerdeExt;
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::JsValue;

use lyo_types::LyoError;

pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    JsValue::from_serde(value).map_err(|e| js_error(LyoError::from(e)))
}

pub fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, JsValue> {
    value.into_serde().map_err(|e| js_error(LyoError::from(e)))
}

pub fn js_error(e: LyoError) -> JsValue {
    JsValue::from_str(&e.to_string())
}
