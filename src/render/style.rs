//! Visual style parameters passed through to backends.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrajmapError;

/// Line dash style, parsed from matplotlib-style codes or names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
    /// No line at all (markers only)
    None,
}

impl LineStyle {
    /// Alternating on/off lengths in units of the line width; empty means solid
    pub fn dash_pattern(&self) -> &'static [f64] {
        match self {
            LineStyle::Solid | LineStyle::None => &[],
            LineStyle::Dashed => &[3.7, 1.6],
            LineStyle::Dotted => &[1.0, 1.65],
            LineStyle::DashDot => &[6.4, 1.6, 1.0, 1.6],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineStyle::Solid => "-",
            LineStyle::Dashed => "--",
            LineStyle::Dotted => ":",
            LineStyle::DashDot => "-.",
            LineStyle::None => "none",
        }
    }
}

impl FromStr for LineStyle {
    type Err = TrajmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "-" | "solid" => Ok(LineStyle::Solid),
            "--" | "dashed" => Ok(LineStyle::Dashed),
            ":" | "dotted" => Ok(LineStyle::Dotted),
            "-." | "dashdot" => Ok(LineStyle::DashDot),
            "" | " " | "none" => Ok(LineStyle::None),
            other => Err(TrajmapError::InvalidParameter {
                param: "linestyle".to_string(),
                message: format!("Unknown line style: {}", other),
            }),
        }
    }
}

impl TryFrom<String> for LineStyle {
    type Error = TrajmapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LineStyle> for String {
    fn from(value: LineStyle) -> Self {
        value.as_str().to_string()
    }
}

/// Marker drawn at each path vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Marker {
    Point,
    Circle,
    Square,
    Triangle,
}

impl Marker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::Point => ".",
            Marker::Circle => "o",
            Marker::Square => "s",
            Marker::Triangle => "^",
        }
    }
}

impl FromStr for Marker {
    type Err = TrajmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "." | "point" => Ok(Marker::Point),
            "o" | "circle" => Ok(Marker::Circle),
            "s" | "square" => Ok(Marker::Square),
            "^" | "triangle" => Ok(Marker::Triangle),
            other => Err(TrajmapError::InvalidParameter {
                param: "marker".to_string(),
                message: format!("Unknown marker: {}", other),
            }),
        }
    }
}

impl TryFrom<String> for Marker {
    type Error = TrajmapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Marker> for String {
    fn from(value: Marker) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-collection overrides applied by contour adjustment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionStyle {
    #[serde(default)]
    pub linewidth: Option<f64>,
    #[serde(default)]
    pub linestyle: Option<LineStyle>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub visible: Option<bool>,
}
