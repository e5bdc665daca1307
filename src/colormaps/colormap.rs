//! Colormap trait and the preset registry.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{diverging, sequential};
use crate::error::{Result, TrajmapError};
use crate::normalize::DEFAULT_NCOLORS;

/// Trait for color mapping implementations
pub trait Colormap: Send + Sync + fmt::Debug {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> [u8; 4];

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, min: f64, max: f64) -> [u8; 4] {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;

    /// Number of distinct colors in the lookup table
    fn n(&self) -> usize {
        DEFAULT_NCOLORS
    }
}

/// A colormap sampled into a fixed lookup table
#[derive(Clone)]
pub struct LutColormap {
    name: String,
    lut: Vec<[u8; 4]>,
}

impl LutColormap {
    /// Sample a colorgrad gradient over its domain
    pub fn from_gradient(name: &str, gradient: &colorgrad::Gradient) -> Self {
        let (dmin, dmax) = gradient.domain();
        let lut = (0..DEFAULT_NCOLORS)
            .map(|i| {
                let t = i as f64 / (DEFAULT_NCOLORS - 1) as f64;
                gradient.at(dmin + t * (dmax - dmin)).to_rgba8()
            })
            .collect();
        Self {
            name: name.to_string(),
            lut,
        }
    }

    /// Piecewise-linear colormap through evenly spaced anchor colors
    pub fn from_anchors(name: &str, anchors: &[[u8; 3]]) -> Self {
        let segments = anchors.len().saturating_sub(1).max(1);
        let lut = (0..DEFAULT_NCOLORS)
            .map(|i| {
                let position = i as f64 / (DEFAULT_NCOLORS - 1) as f64 * segments as f64;
                let index = (position.floor() as usize).min(anchors.len().saturating_sub(2));
                let c1 = anchors[index];
                let c2 = anchors[(index + 1).min(anchors.len() - 1)];
                let rgb = lerp_color(c1, c2, position - index as f64);
                [rgb[0], rgb[1], rgb[2], 255]
            })
            .collect();
        Self {
            name: name.to_string(),
            lut,
        }
    }

    /// The same colors in the opposite order, named with an `_r` suffix
    pub fn reversed(&self) -> Self {
        let mut lut = self.lut.clone();
        lut.reverse();
        Self {
            name: format!("{}_r", self.name),
            lut,
        }
    }
}

impl fmt::Debug for LutColormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LutColormap")
            .field("name", &self.name)
            .field("n", &self.lut.len())
            .finish()
    }
}

impl Colormap for LutColormap {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let n = self.lut.len();
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let index = ((value * n as f64) as usize).min(n - 1);
        self.lut[index]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn n(&self) -> usize {
        self.lut.len()
    }
}

type Preset = fn() -> LutColormap;

static PRESETS: Lazy<HashMap<&'static str, Preset>> = Lazy::new(|| {
    let mut presets: HashMap<&'static str, Preset> = HashMap::new();
    presets.insert("blues", sequential::blues);
    presets.insert("greens", sequential::greens);
    presets.insert("reds", sequential::reds);
    presets.insert("greys", sequential::greys);
    presets.insert("viridis", sequential::viridis);
    presets.insert("plasma", sequential::plasma);
    presets.insert("inferno", sequential::inferno);
    presets.insert("magma", sequential::magma);
    presets.insert("cividis", sequential::cividis);
    presets.insert("turbo", sequential::turbo);
    presets.insert("spectral", diverging::spectral);
    presets.insert("rdbu", diverging::rdbu);
    presets.insert("coolwarm", diverging::coolwarm);
    presets
});

/// Names of every preset colormap, sorted
pub fn colormap_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = PRESETS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Get a colormap by name; a `_r` suffix selects the reversed map
pub fn get_colormap(name: &str) -> Result<Arc<dyn Colormap>> {
    let lowered = name.trim().to_lowercase();
    let (base, reversed) = match lowered.strip_suffix("_r") {
        Some(base) => (base, true),
        None => (lowered.as_str(), false),
    };

    let preset = PRESETS
        .get(base)
        .ok_or_else(|| TrajmapError::InvalidParameter {
            param: "colormap".to_string(),
            message: format!(
                "Unknown colormap: {}. Available: {}",
                name,
                colormap_names().join(", ")
            ),
        })?;

    let colormap = preset();
    if reversed {
        Ok(Arc::new(colormap.reversed()))
    } else {
        Ok(Arc::new(colormap))
    }
}

/// Linear interpolation between two colors
pub fn lerp_color(c1: [u8; 3], c2: [u8; 3], t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        (c1[0] as f64 * (1.0 - t) + c2[0] as f64 * t).round() as u8,
        (c1[1] as f64 * (1.0 - t) + c2[1] as f64 * t).round() as u8,
        (c1[2] as f64 * (1.0 - t) + c2[2] as f64 * t).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_color() {
        let black = [0, 0, 0];
        let white = [255, 255, 255];

        assert_eq!(lerp_color(black, white, 0.0), black);
        assert_eq!(lerp_color(black, white, 1.0), white);
        assert_eq!(lerp_color(black, white, 0.5), [128, 128, 128]);
    }

    #[test]
    fn test_get_colormap_is_case_insensitive() {
        assert_eq!(get_colormap("Blues").unwrap().name(), "blues");
        assert_eq!(get_colormap("VIRIDIS").unwrap().name(), "viridis");
        assert!(get_colormap("jet").is_err());
    }

    #[test]
    fn test_reversed_colormap() {
        let forward = get_colormap("viridis").unwrap();
        let reversed = get_colormap("viridis_r").unwrap();
        assert_eq!(reversed.name(), "viridis_r");
        assert_eq!(forward.map_normalized(0.0), reversed.map_normalized(1.0));
        assert_eq!(forward.map_normalized(1.0), reversed.map_normalized(0.0));
    }

    #[test]
    fn test_lookup_table_ends() {
        let cmap = LutColormap::from_anchors("bw", &[[0, 0, 0], [255, 255, 255]]);
        assert_eq!(cmap.n(), DEFAULT_NCOLORS);
        assert_eq!(cmap.map_normalized(0.0), [0, 0, 0, 255]);
        assert_eq!(cmap.map_normalized(1.0), [255, 255, 255, 255]);
        // Out of range values clamp
        assert_eq!(cmap.map_normalized(-3.0), [0, 0, 0, 255]);
        assert_eq!(cmap.map_normalized(7.0), [255, 255, 255, 255]);
        assert_eq!(cmap.map(5.0, 0.0, 10.0), cmap.map_normalized(0.5));
    }

    #[test]
    fn test_all_presets_resolve() {
        for name in colormap_names() {
            let cmap = get_colormap(name).unwrap();
            assert_eq!(cmap.name(), name);
            assert_eq!(cmap.n(), DEFAULT_NCOLORS);
        }
    }
}
