//! Backdrop WASM - WebAssembly bindings for Backdrop
//!
//! This crate exposes the backdrop-core transform operator to
//! JavaScript/TypeScript viewports.
//!
//! # Module Structure
//!
//! - `operator` - The `JsTransformOperator` event-forwarding wrapper
//! - `types` - View description and DOM event mapping helpers
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsTransformOperator } from '@backdrop/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const op = new JsTransformOperator({ orientation: "TOP", width, height }, images);
//! if (op.invoke(x, y) === "RUNNING") {
//!   // forward pointer, key and wheel events until FINISHED or CANCELLED
//! }
//! ```

use wasm_bindgen::prelude::*;

mod operator;
mod types;

// Re-export public types
pub use operator::JsTransformOperator;
pub use types::JsViewDescription;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Help line listing every key binding of the transform.
#[wasm_bindgen]
pub fn help_text() -> String {
    backdrop_core::session::feedback::HELP_TEXT.to_string()
}
