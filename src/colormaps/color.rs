//! Single colors for paths, edges and contour overrides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrajmapError;

/// An 8-bit RGBA color.
///
/// Parses CSS color names and hex strings (`"navy"`, `"#ff8800"`,
/// `"rgb(10, 20, 30)"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba([r, g, b, 255])
    }

    /// Build from unit-interval RGB components
    pub fn from_unit_rgb(rgb: [f64; 3]) -> Self {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), 255])
    }

    /// Same color with its alpha scaled by `alpha` in [0, 1]
    pub fn with_alpha(self, alpha: f64) -> Self {
        let [r, g, b, a] = self.0;
        let scaled = (a as f64 * alpha.clamp(0.0, 1.0)).round() as u8;
        Rgba([r, g, b, scaled])
    }

    pub fn alpha(&self) -> u8 {
        self.0[3]
    }
}

impl FromStr for Rgba {
    type Err = TrajmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color: colorgrad::Color =
            s.trim()
                .parse()
                .map_err(|e| TrajmapError::InvalidParameter {
                    param: "color".to_string(),
                    message: format!("Invalid color '{}': {}", s, e),
                })?;
        Ok(Rgba(color.to_rgba8()))
    }
}

impl TryFrom<String> for Rgba {
    type Error = TrajmapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(value: [u8; 4]) -> Self {
        Rgba(value)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}
