//! Error surfaced to hosts by the crop session.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse failure category. The numeric codes are stable and exposed to
/// JavaScript hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The source could not be decoded.
    LoadImgFail,
    /// The export pipeline failed.
    SaveImgFail,
    /// The input file could not be read.
    OpenFileFail,
}

impl ErrorKind {
    pub fn code(self) -> u32 {
        match self {
            ErrorKind::LoadImgFail => 1,
            ErrorKind::SaveImgFail => 2,
            ErrorKind::OpenFileFail => 3,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::LoadImgFail => "Failed to load image",
            ErrorKind::SaveImgFail => "Failed to save image",
            ErrorKind::OpenFileFail => "Failed to read file",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::LoadImgFail => "LOAD_IMG_FAIL",
            ErrorKind::SaveImgFail => "SAVE_IMG_FAIL",
            ErrorKind::OpenFileFail => "OPEN_FILE_FAIL",
        };
        f.write_str(name)
    }
}

/// A session failure: kind, message and the originating error when known.
///
/// Cheap to clone so the same value can be stored as the session's last
/// error, carried in an event and returned to the caller.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClipError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl ClipError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            cause: None,
        }
    }

    /// Wrap `cause`, appending its description to the default message.
    pub fn with_cause<E>(kind: ErrorKind, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind,
            message: format!("{}: {}", kind.default_message(), cause),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl PartialEq for ClipError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}
