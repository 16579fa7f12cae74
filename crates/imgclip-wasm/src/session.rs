//! Crop session WASM bindings.
//!
//! `JsCropSession` wraps the core session for a browser host. The host owns
//! the DOM: it measures the surface, forwards pointer events as flat
//! `[id, x, y, ...]` arrays, draws the overlay and fetches URLs itself.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsCropSession({ shape: 'circle', type: 'image/jpeg' });
//! session.onEvent((e) => console.log(e.type, e));
//!
//! const ticket = session.loadUrl('https://example.com/a.jpg');
//! const bytes = new Uint8Array(await (await fetch(ticket.url)).arrayBuffer());
//! session.finishLoad(ticket, bytes);
//!
//! session.show(canvas.width, canvas.height);
//! canvas.onpointermove = (e) => session.pointer('move', [e.pointerId, e.offsetX, e.offsetY]);
//! const result = session.save();
//! ```
//!
//! The event callback must not call back into the same session; wasm-bindgen
//! rejects the recursive borrow.

use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use imgclip_core::{target_extent, ClipError, CropSession, ImageSource, LoadState, Options, SaveRequest};
use wasm_bindgen::prelude::*;

use crate::events::{
    parse_contacts, parse_extent, parse_hide_reason, parse_output_type, parse_phase, ErrorPayload,
    EventPayload,
};
use crate::types::{JsCropResult, JsLoadTicket, JsSourceImage};

/// Fetch failure reported by the host for a URL load.
#[derive(Debug)]
struct HostLoadError(String);

impl fmt::Display for HostLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for HostLoadError {}

type SharedCallback = Rc<RefCell<Option<js_sys::Function>>>;

#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession,
    callback: SharedCallback,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session. `options` is an optional plain object, e.g.
    /// `{ shape: 'rect', rectRatio: 1.5, type: 'image/png', width: 256 }`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsCropSession, JsValue> {
        let options = options_from_js(options)?;
        let nonce = (js_sys::Math::random() * 100_000.0) as u32;
        let mut inner = CropSession::new(options).with_cache_nonce(nonce);

        let callback: SharedCallback = Rc::new(RefCell::new(None));
        let target = Rc::clone(&callback);
        inner.set_listener(move |event| {
            let Some(func) = target.borrow().clone() else {
                return;
            };
            let payload = match serde_wasm_bindgen::to_value(&EventPayload::from(event)) {
                Ok(value) => value,
                Err(e) => {
                    web_sys::console::warn_1(&JsValue::from_str(&format!(
                        "imgclip: failed to serialize {} event: {}",
                        event.name(),
                        e
                    )));
                    return;
                }
            };
            if let Err(e) = func.call1(&JsValue::NULL, &payload) {
                web_sys::console::warn_2(&JsValue::from_str("imgclip: event listener threw"), &e);
            }
        });

        Ok(JsCropSession { inner, callback })
    }

    /// Register the event callback, or remove it with `undefined`.
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, callback: Option<js_sys::Function>) {
        *self.callback.borrow_mut() = callback;
    }

    /// Replace the options; the view is re-fitted to the new region.
    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options = options_from_js(options)?;
        self.inner.set_options(options);
        Ok(())
    }

    /// Current options as a plain object.
    pub fn options(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.options())
    }

    // ===== Loading =====

    /// Decode and load encoded JPEG or PNG bytes.
    #[wasm_bindgen(js_name = loadBytes)]
    pub fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<(), JsValue> {
        self.inner
            .load(ImageSource::Encoded(bytes))
            .map(|_| ())
            .map_err(|e| error_to_js(&e))
    }

    /// Load an already decoded RGBA raster.
    #[wasm_bindgen(js_name = loadImage)]
    pub fn load_image(&mut self, image: &JsSourceImage) -> Result<(), JsValue> {
        let ticket = self.inner.begin_load();
        self.inner
            .finish_load(&ticket, image.to_source())
            .map_err(|e| error_to_js(&e))
    }

    /// Start a URL load. Fetch `ticket.url` and complete with `finishLoad`
    /// or `failLoad`.
    #[wasm_bindgen(js_name = loadUrl)]
    pub fn load_url(&mut self, url: String) -> Result<JsLoadTicket, JsValue> {
        match self.inner.load(ImageSource::Url(url)) {
            Ok(Some(ticket)) => Ok(JsLoadTicket::new(ticket)),
            Ok(None) => Err(JsValue::from_str("URL load did not produce a ticket")),
            Err(e) => Err(error_to_js(&e)),
        }
    }

    /// Complete a URL load with the fetched bytes. Stale tickets are ignored.
    #[wasm_bindgen(js_name = finishLoad)]
    pub fn finish_load(&mut self, ticket: &JsLoadTicket, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner
            .finish_load_bytes(ticket.inner(), bytes)
            .map_err(|e| error_to_js(&e))
    }

    /// Report that fetching a URL load failed.
    #[wasm_bindgen(js_name = failLoad)]
    pub fn fail_load(&mut self, ticket: &JsLoadTicket, message: String) -> Result<(), JsValue> {
        self.inner
            .finish_load(ticket.inner(), Err(HostLoadError(message)))
            .map_err(|e| error_to_js(&e))
    }

    // ===== Surface =====

    /// Open the surface at `width x height` window pixels. Negative or
    /// non-finite sizes open an empty window.
    pub fn show(&mut self, width: f64, height: f64) {
        self.inner.show(parse_extent(width), parse_extent(height));
    }

    /// Close the surface; `reason` is `cancel`, `save` or `hide`.
    pub fn hide(&mut self, reason: Option<String>) {
        let reason = parse_hide_reason(reason.as_deref().unwrap_or("hide"));
        self.inner.hide(reason);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.inner
            .resize_window(parse_extent(width), parse_extent(height));
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    // ===== Input =====

    /// Feed a pointer frame: `phase` is `down`, `move`, `up` or `cancel`
    /// (DOM event names are accepted too) and `contacts` lists every
    /// contact still active as `[id, x, y, ...]`.
    pub fn pointer(&mut self, phase: &str, contacts: &[f64]) -> Result<(), JsValue> {
        let phase = parse_phase(phase)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown pointer phase: {phase}")))?;
        self.inner.pointer(phase, &parse_contacts(contacts));
        Ok(())
    }

    /// Mouse-wheel zoom at `(x, y)`; returns whether the view changed.
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.inner.wheel(x, y, delta_y)
    }

    // ===== Export =====

    /// Export the visible region.
    ///
    /// `type` and `quality` override the options for this call; an
    /// unrecognised `type` encodes as PNG. The optional `callback(error,
    /// result)` runs on success and failure, before the surface auto-hides.
    pub fn save(
        &mut self,
        mime: Option<String>,
        quality: Option<f64>,
        callback: Option<js_sys::Function>,
    ) -> Result<JsCropResult, JsValue> {
        let output_type = parse_output_type(mime.as_deref());
        let request = SaveRequest {
            output_type,
            quality,
        };

        let outcome = self.inner.save_then(request, |outcome| {
            let Some(func) = callback.as_ref() else {
                return;
            };
            let (err, result) = match outcome {
                Ok(result) => (JsValue::NULL, JsValue::from(JsCropResult::from(result.clone()))),
                Err(e) => (error_to_js(e), JsValue::UNDEFINED),
            };
            if let Err(e) = func.call2(&JsValue::NULL, &err, &result) {
                web_sys::console::warn_2(&JsValue::from_str("imgclip: save callback threw"), &e);
            }
        });

        match outcome {
            Ok(result) => Ok(JsCropResult::from((*result).clone())),
            Err(e) => Err(error_to_js(&e)),
        }
    }

    /// The most recent successful export.
    pub fn result(&self) -> Option<JsCropResult> {
        self.inner.result().cloned().map(JsCropResult::from)
    }

    // ===== State =====

    /// `idle`, `loading` or `loaded`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        match self.inner.state() {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
        }
        .to_string()
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    #[wasm_bindgen(js_name = canSave)]
    pub fn can_save(&self) -> bool {
        self.inner.can_save()
    }

    /// `{ kind: 'none' | 'loading' | 'empty' | 'error', message? }`
    pub fn affordance(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.affordance())
    }

    /// `{ code, kind, message }` of the last failure, or `null`.
    #[wasm_bindgen(js_name = lastError)]
    pub fn last_error(&self) -> Result<JsValue, JsValue> {
        match self.inner.last_error() {
            Some(err) => to_js(&ErrorPayload::from(err)),
            None => Ok(JsValue::NULL),
        }
    }

    /// `{ x, y, scale }`
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.transform())
    }

    /// `{ left, top, right, bottom, size }` in window pixels.
    pub fn region(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.region())
    }

    /// Source rectangle under the region, or `null` before a load.
    #[wasm_bindgen(js_name = visibleRect)]
    pub fn visible_rect(&self) -> Result<JsValue, JsValue> {
        match self.inner.visible_rect() {
            Some(rect) => to_js(&rect),
            None => Ok(JsValue::NULL),
        }
    }

    /// RGBA overlay pixels sized to the window, for `ImageData`.
    pub fn overlay(&self) -> Option<Vec<u8>> {
        self.inner.overlay().map(|img| img.into_raw())
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> Option<f64> {
        self.inner.target_width().map(f64::from)
    }

    /// Target export width; values below one pixel are ignored.
    #[wasm_bindgen(setter)]
    pub fn set_width(&mut self, width: f64) {
        if let Some(width) = target_extent(width) {
            self.inner.set_target_width(width);
        }
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> Option<f64> {
        self.inner.target_height().map(f64::from)
    }

    /// Target export height; values below one pixel are ignored.
    #[wasm_bindgen(setter)]
    pub fn set_height(&mut self, height: f64) {
        if let Some(height) = target_extent(height) {
            self.inner.set_target_height(height);
        }
    }
}

fn options_from_js(value: JsValue) -> Result<Options, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(Options::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))
}

fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// `{ code, kind, message }`, falling back to the message string.
fn error_to_js(err: &ClipError) -> JsValue {
    serde_wasm_bindgen::to_value(&ErrorPayload::from(err))
        .unwrap_or_else(|_| JsValue::from_str(err.message()))
}
