//! RGB colors and the piecewise-linear scale used for markers and legends.

use crate::error::{FreqError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = FreqError;

    /// Accepts `#rgb` and `#rrggbb`, with or without the leading `#`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FreqError::InvalidColor(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize, width: usize| {
            u8::from_str_radix(&hex[i * width..(i + 1) * width], 16).map_err(|_| invalid())
        };
        match hex.len() {
            6 => Ok(Rgb::new(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            3 => {
                let expand = |v: u8| v * 17;
                Ok(Rgb::new(
                    expand(channel(0, 1)?),
                    expand(channel(1, 1)?),
                    expand(channel(2, 1)?),
                ))
            }
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Piecewise-linear mapping from a numeric domain to colors.
///
/// Breakpoints are spread evenly over `[min, max]`, one per color, the way
/// the legend places its stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
    colors: Vec<Rgb>,
}

impl ColorScale {
    /// `colors` must hold at least one entry; `min`/`max` may be equal.
    pub fn new(min: f64, max: f64, colors: Vec<Rgb>) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { min, max, colors }
    }

    /// Map `value` to a color; values outside the domain clamp to the ends.
    ///
    /// Callers must filter NaN first; a NaN input yields `None`.
    pub fn color_for(&self, value: f64) -> Option<Rgb> {
        if value.is_nan() {
            return None;
        }
        let first = *self.colors.first()?;
        let last = *self.colors.last()?;
        let span = self.max - self.min;
        if self.colors.len() == 1 || span <= 0.0 || value <= self.min {
            return Some(first);
        }
        if value >= self.max {
            return Some(last);
        }
        let position = (value - self.min) / span * (self.colors.len() - 1) as f64;
        let lower = position.floor() as usize;
        let upper = (lower + 1).min(self.colors.len() - 1);
        Some(self.colors[lower].lerp(&self.colors[upper], position - lower as f64))
    }
}
