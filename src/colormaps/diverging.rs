//! Diverging colormaps (two-hue progression with center).
//!
//! These colormaps are suitable for data that diverges from a central value,
//! and for many-level contour fields.

use super::colormap::LutColormap;

/// Coolwarm anchor colors, dark blue through light grey to dark red
const COOLWARM: [[u8; 3]; 5] = [
    [59, 76, 192],
    [141, 176, 254],
    [221, 221, 221],
    [244, 154, 123],
    [180, 4, 38],
];

/// Red-yellow-blue spectral map; the default for contour fields
pub fn spectral() -> LutColormap {
    LutColormap::from_gradient("spectral", &colorgrad::spectral())
}

/// Red to blue through white
pub fn rdbu() -> LutColormap {
    LutColormap::from_gradient("rdbu", &colorgrad::rd_bu())
}

/// Coolwarm colormap - blue to red through grey, good for temperature anomalies
pub fn coolwarm() -> LutColormap {
    LutColormap::from_anchors("coolwarm", &COOLWARM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormaps::Colormap;

    #[test]
    fn test_coolwarm_ends_and_center() {
        let cmap = coolwarm();
        assert_eq!(cmap.map_normalized(0.0), [59, 76, 192, 255]);
        assert_eq!(cmap.map_normalized(1.0), [180, 4, 38, 255]);

        // Center is close to the light grey anchor
        let center = cmap.map_normalized(0.5);
        for channel in &center[..3] {
            assert!((*channel as i32 - 221).abs() <= 8, "center = {:?}", center);
        }
    }

    #[test]
    fn test_rdbu_goes_red_to_blue() {
        let cmap = rdbu();
        let low = cmap.map_normalized(0.0);
        let high = cmap.map_normalized(1.0);
        assert!(low[0] > low[2]);
        assert!(high[2] > high[0]);
    }
}
