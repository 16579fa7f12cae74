//! Image sources and load tickets.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::path::PathBuf;

use crate::decode::SourceImage;

/// Where a load gets its pixels from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Encoded JPEG or PNG bytes, decoded synchronously.
    Encoded(Vec<u8>),
    /// An already decoded raster.
    Raster(SourceImage),
    /// A URL the host fetches; the session only hands out a ticket.
    Url(String),
    /// A local file, read and decoded synchronously.
    File(PathBuf),
}

/// Identifies one load. Completions carrying an outdated ticket are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub(crate) generation: u64,
    pub(crate) url: Option<String>,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cache-busted request URL for URL loads.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Append a `_random` query parameter so the browser refetches `url`.
///
/// `blob:` and `data:` URLs are returned unchanged. A fragment stays at
/// the end.
pub fn cache_bust(url: &str, nonce: u32) -> String {
    let scheme = url.get(..5).map(str::to_ascii_lowercase);
    if matches!(scheme.as_deref(), Some("blob:" | "data:")) {
        return url.to_string();
    }
    let (base, fragment) = match url.find('#') {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    };
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}_random={nonce}{fragment}")
}

/// Per-session nonce in `0..100_000`.
pub(crate) fn random_nonce() -> u32 {
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u32(0x5eed);
    (hasher.finish() % 100_000) as u32
}
