//! Background color parsing: hex (#RGB, #RGBA, #RRGGBB, #RRGGBBAA) and a
//! handful of CSS named colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Returned when a color string is neither hex nor a known name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized color: {0:?}")]
pub struct ParseColorError(pub String);

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// `#rrggbbaa`, or `#rrggbb` when opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s).ok_or_else(|| ParseColorError(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let hex = s.strip_prefix('#').unwrap_or(s);
    parse_hex(hex).or_else(|| lookup_named(s))
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let b = hex.as_bytes();
    match hex.len() {
        3 => Some(Color::rgb(
            expand_nibble(b[0])?,
            expand_nibble(b[1])?,
            expand_nibble(b[2])?,
        )),
        4 => Some(Color::rgba(
            expand_nibble(b[0])?,
            expand_nibble(b[1])?,
            expand_nibble(b[2])?,
            expand_nibble(b[3])?,
        )),
        6 => Some(Color::rgb(
            parse_byte(&b[0..2])?,
            parse_byte(&b[2..4])?,
            parse_byte(&b[4..6])?,
        )),
        8 => Some(Color::rgba(
            parse_byte(&b[0..2])?,
            parse_byte(&b[2..4])?,
            parse_byte(&b[4..6])?,
            parse_byte(&b[6..8])?,
        )),
        _ => None,
    }
}

/// 'f' → 0xFF, 'a' → 0xAA.
fn expand_nibble(ch: u8) -> Option<u8> {
    let n = hex_val(ch)?;
    Some(n << 4 | n)
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn parse_byte(pair: &[u8]) -> Option<u8> {
    Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?)
}

fn lookup_named(name: &str) -> Option<Color> {
    let lower = name.to_ascii_lowercase();
    NAMED_COLORS
        .binary_search_by_key(&lower.as_str(), |&(n, _)| n)
        .ok()
        .map(|idx| {
            let [r, g, b, a] = NAMED_COLORS[idx].1;
            Color::rgba(r, g, b, a)
        })
}

/// Sorted alphabetically for binary search.
const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("green", [0, 128, 0, 255]),
    ("grey", [128, 128, 128, 255]),
    ("red", [255, 0, 0, 255]),
    ("silver", [192, 192, 192, 255]),
    ("transparent", [0, 0, 0, 0]),
    ("white", [255, 255, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
];
