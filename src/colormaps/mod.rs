//! Colormaps and colors for map rendering.
//!
//! Matplotlib-style named colormaps sampled into 256-entry lookup tables,
//! single colors parsed from CSS strings, and random palettes.

pub mod color;
pub mod colormap;
pub mod diverging;
pub mod palette;
pub mod sequential;

pub use color::Rgba;
pub use colormap::{colormap_names, get_colormap, Colormap, LutColormap};
pub use palette::{random_colors, random_palette};
