//! Conversions between JavaScript input shapes and core session types.
//!
//! Everything here is plain Rust so it can be tested natively; the
//! `JsValue` conversions live in the session bindings.

use imgclip_core::{
    target_extent, ClipError, HideReason, OutputType, PointerPhase, PointerSample, SessionEvent,
};
use serde::Serialize;

/// Plain-object form of a session event handed to the JS listener.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub code: u32,
    pub kind: String,
    pub message: String,
}

impl From<&ClipError> for ErrorPayload {
    fn from(err: &ClipError) -> Self {
        Self {
            code: err.code(),
            kind: err.kind().to_string(),
            message: err.message().to_string(),
        }
    }
}

/// Result metadata; the bytes are fetched with `JsCropSession.result()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    #[serde(rename = "type")]
    pub mime: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub byte_length: usize,
}

impl EventPayload {
    fn named(kind: &'static str) -> Self {
        Self {
            kind,
            reason: None,
            error: None,
            result: None,
            x: None,
            y: None,
            width: None,
            height: None,
        }
    }
}

impl From<&SessionEvent> for EventPayload {
    fn from(event: &SessionEvent) -> Self {
        let mut payload = EventPayload::named(event.name());
        match event {
            SessionEvent::Loading => {}
            SessionEvent::Loaded { width, height } | SessionEvent::Show { width, height } => {
                payload.width = Some(*width);
                payload.height = Some(*height);
            }
            SessionEvent::Hide(reason) => payload.reason = Some(reason.as_str()),
            SessionEvent::Saved(result) => {
                payload.result = Some(ResultPayload {
                    mime: result.output_type.mime(),
                    quality: result.quality,
                    width: result.width,
                    height: result.height,
                    byte_length: result.data.len(),
                });
            }
            SessionEvent::Error(err) => payload.error = Some(ErrorPayload::from(err)),
            SessionEvent::Tap { x, y } => {
                payload.x = Some(*x);
                payload.y = Some(*y);
            }
        }
        payload
    }
}

/// Pointer phase from a DOM-style event name.
pub fn parse_phase(name: &str) -> Option<PointerPhase> {
    match name {
        "down" | "pointerdown" | "touchstart" | "mousedown" => Some(PointerPhase::Down),
        "move" | "pointermove" | "touchmove" | "mousemove" => Some(PointerPhase::Move),
        "up" | "pointerup" | "touchend" | "mouseup" => Some(PointerPhase::Up),
        "cancel" | "pointercancel" | "touchcancel" => Some(PointerPhase::Cancel),
        _ => None,
    }
}

/// Contacts from a flat `[id, x, y, id, x, y, ...]` array. A trailing
/// partial triple is ignored.
pub fn parse_contacts(flat: &[f64]) -> Vec<PointerSample> {
    flat.chunks_exact(3)
        .map(|c| PointerSample::new(c[0] as u32, c[1], c[2]))
        .collect()
}

/// Window or target size from a JS number; NaN, infinities and anything
/// below one pixel become 0.
pub fn parse_extent(value: f64) -> u32 {
    target_extent(value).unwrap_or(0)
}

/// Output type for a `save` call. Unrecognised MIME types encode as PNG,
/// the way a canvas `toDataURL` does.
pub fn parse_output_type(mime: Option<&str>) -> Option<OutputType> {
    mime.map(|m| OutputType::from_mime(m).unwrap_or(OutputType::Png))
}

/// Hide reason by name; anything unknown is a plain `hide`.
pub fn parse_hide_reason(name: &str) -> HideReason {
    match name {
        "cancel" => HideReason::Cancel,
        "save" => HideReason::Save,
        _ => HideReason::Hide,
    }
}
