//! Errors raised by the browser layer.
//!
//! The gameplay and effect cores are total; only DOM plumbing can fail.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors that can occur while mounting or driving a widget in the page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    /// No global `window` (not running in a browser).
    #[error("no window")]
    NoWindow,

    /// The window has no document.
    #[error("no document")]
    NoDocument,

    /// The document has no `<body>`.
    #[error("no document body")]
    NoBody,

    /// A container element id did not resolve.
    #[error("element not found: #{0}")]
    ElementNotFound(String),

    /// The canvas refused to hand out a 2d context.
    #[error("2d canvas context unavailable")]
    NoContext2d,

    /// Saved card configuration could not be parsed.
    #[error("invalid card configuration: {0}")]
    InvalidConfig(String),

    /// A JavaScript exception surfaced through a web-sys call.
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for CardError {
    fn from(value: JsValue) -> Self {
        CardError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<CardError> for JsValue {
    fn from(err: CardError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(feature = "serde_json")]
impl From<serde_json::Error> for CardError {
    fn from(err: serde_json::Error) -> Self {
        CardError::InvalidConfig(err.to_string())
    }
}
