//! Events dispatched by a crop session.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ClipError;
use crate::export::CropResult;

/// Why the surface was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HideReason {
    Cancel,
    Save,
    Hide,
}

impl HideReason {
    pub fn as_str(self) -> &'static str {
        match self {
            HideReason::Cancel => "cancel",
            HideReason::Save => "save",
            HideReason::Hide => "hide",
        }
    }
}

impl fmt::Display for HideReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Loading,
    Loaded { width: u32, height: u32 },
    Show { width: u32, height: u32 },
    Hide(HideReason),
    Saved(Arc<CropResult>),
    Error(ClipError),
    /// A single-contact tap in window coordinates.
    Tap { x: f64, y: f64 },
}

impl SessionEvent {
    /// Lowercase event name as seen by JavaScript hosts.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Loading => "loading",
            SessionEvent::Loaded { .. } => "loaded",
            SessionEvent::Show { .. } => "show",
            SessionEvent::Hide(_) => "hide",
            SessionEvent::Saved(_) => "saved",
            SessionEvent::Error(_) => "error",
            SessionEvent::Tap { .. } => "tap",
        }
    }
}

/// External observer. Runs after the session's own handler.
pub type Listener = Box<dyn FnMut(&SessionEvent)>;
