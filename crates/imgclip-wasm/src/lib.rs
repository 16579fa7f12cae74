//! imgclip WASM - WebAssembly bindings for imgclip
//!
//! This crate exposes the imgclip-core crop session to JavaScript/TypeScript
//! hosts.
//!
//! # Module Structure
//!
//! - `session` - `JsCropSession`, the stateful crop surface
//! - `types` - WASM-compatible wrappers for rasters, results and load tickets
//! - `events` - Event payloads and pointer-frame parsing
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession } from '@imgclip/wasm';
//!
//! await init();
//!
//! const session = new JsCropSession({ shape: 'square', width: 256 });
//! session.loadBytes(new Uint8Array(await file.arrayBuffer()));
//! session.show(320, 320);
//! const result = session.save('image/jpeg', 0.9);
//! ```

use wasm_bindgen::prelude::*;

mod events;
mod session;
mod types;

pub use session::JsCropSession;
pub use types::{JsCropResult, JsLoadTicket, JsSourceImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Default crop options as a plain object.
#[wasm_bindgen(js_name = defaultOptions)]
pub fn default_options() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&imgclip_core::Options::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
