//! Sequential colormaps (single-hue or perceptual progression).
//!
//! These colormaps are suitable for data that progresses from low to high.

use super::colormap::LutColormap;

/// Light to dark blue; the default for trajectory scatter plots
pub fn blues() -> LutColormap {
    LutColormap::from_gradient("blues", &colorgrad::blues())
}

pub fn greens() -> LutColormap {
    LutColormap::from_gradient("greens", &colorgrad::greens())
}

pub fn reds() -> LutColormap {
    LutColormap::from_gradient("reds", &colorgrad::reds())
}

pub fn greys() -> LutColormap {
    LutColormap::from_gradient("greys", &colorgrad::greys())
}

/// Viridis colormap - perceptually uniform, colorblind-friendly
pub fn viridis() -> LutColormap {
    LutColormap::from_gradient("viridis", &colorgrad::viridis())
}

pub fn plasma() -> LutColormap {
    LutColormap::from_gradient("plasma", &colorgrad::plasma())
}

pub fn inferno() -> LutColormap {
    LutColormap::from_gradient("inferno", &colorgrad::inferno())
}

pub fn magma() -> LutColormap {
    LutColormap::from_gradient("magma", &colorgrad::magma())
}

/// Cividis colormap - colorblind-friendly alternative to viridis
pub fn cividis() -> LutColormap {
    LutColormap::from_gradient("cividis", &colorgrad::cividis())
}

pub fn turbo() -> LutColormap {
    LutColormap::from_gradient("turbo", &colorgrad::turbo())
}
