//! Opaque RGB colors used by palettes, styles and legends.
//!
//! Colors serialize as `#RRGGBB` strings so configuration files, exported
//! tables and styled GeoJSON all carry the same notation.

use crate::error::{ChoroplethError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB` or the short `#RGB` form (case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ChoroplethError::InvalidColor(hex.to_string()));
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(ChoroplethError::InvalidColor(hex.to_string())),
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| ChoroplethError::InvalidColor(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in 0..1 (sRGB weights, no gamma), used to pick a
    /// readable text color on top of a fill.
    pub fn luminance(self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb8 {
    type Err = ChoroplethError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Rgb8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb8::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Rgb8::from_hex("#d7191c").unwrap(), Rgb8::new(0xd7, 0x19, 0x1c));
        assert_eq!(Rgb8::from_hex("FFF").unwrap(), Rgb8::WHITE);
        assert_eq!(Rgb8::from_hex(" #2C7BB6 ").unwrap().to_hex(), "#2c7bb6");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Rgb8::from_hex("#12345").is_err());
        assert!(Rgb8::from_hex("#gg0000").is_err());
        assert!(Rgb8::from_hex("").is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c: Rgb8 = serde_json::from_str("\"#abd9e9\"").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#abd9e9\"");
    }
}
