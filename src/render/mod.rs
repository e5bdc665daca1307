//! The rendering backend seam.
//!
//! Plotting helpers prepare data and hand it to a [`MapBackend`] through the
//! request types below. [`RasterMap`] is the bundled reference backend.

pub mod draw;
pub mod extent;
pub mod mappable;
pub mod marching;
pub mod raster;
pub mod style;

use ndarray::ArrayView2;
use std::sync::Arc;

use crate::colormaps::{Colormap, Rgba};
use crate::error::Result;
use crate::normalize::Normalization;

pub use extent::{parse_bbox, MapExtent};
pub use mappable::{ContourCollection, ContourSet, LayerId, PathCollection, ScalarMappable};
pub use raster::{encode_image, render_colorbar, OutputFormat, RasterMap, MAX_IMAGE_SIDE};
pub use style::{CollectionStyle, LineStyle, Marker};

/// Marker sizes in points squared
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerSizes {
    Uniform(f64),
    PerPoint(Vec<f64>),
}

impl MarkerSizes {
    pub fn get(&self, index: usize) -> f64 {
        match self {
            MarkerSizes::Uniform(size) => *size,
            MarkerSizes::PerPoint(sizes) => sizes.get(index).copied().unwrap_or(f64::NAN),
        }
    }
}

/// Color-mapped scatter of points
#[derive(Debug, Clone)]
pub struct ScatterRequest<'a> {
    pub lons: &'a [f64],
    pub lats: &'a [f64],
    pub values: &'a [f64],
    pub sizes: MarkerSizes,
    pub colormap: Arc<dyn Colormap>,
    /// `None` means linear scaling between vmin and vmax
    pub norm: Option<Normalization>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub edgecolor: Option<Rgba>,
    pub zorder: i32,
}

/// Single-color polyline with optional vertex markers
#[derive(Debug, Clone)]
pub struct PathRequest<'a> {
    pub lons: &'a [f64],
    pub lats: &'a [f64],
    pub color: Rgba,
    pub linewidth: f64,
    pub linestyle: LineStyle,
    pub marker: Option<Marker>,
    pub markersize: f64,
    pub markeredgecolor: Option<Rgba>,
    pub zorder: i32,
}

/// Contour lines or filled bands over a gridded field
#[derive(Debug, Clone)]
pub struct ContourRequest<'a> {
    pub lons: ArrayView2<'a, f64>,
    pub lats: ArrayView2<'a, f64>,
    pub data: ArrayView2<'a, f64>,
    pub levels: Vec<f64>,
    pub filled: bool,
    /// Explicit colors cycled over levels/bands instead of the colormap
    pub colors: Option<Vec<Rgba>>,
    pub colormap: Arc<dyn Colormap>,
    pub zorder: i32,
}

/// A map drawing surface
pub trait MapBackend {
    /// Draw color-mapped points and return the mappable for colorbars
    fn scatter(&mut self, request: ScatterRequest<'_>) -> Result<PathCollection>;

    /// Draw a trajectory path
    fn plot(&mut self, request: PathRequest<'_>) -> Result<()>;

    /// Draw contour lines or filled contours
    fn contour(&mut self, request: ContourRequest<'_>) -> Result<ContourSet>;

    /// Pick up style changes made to a contour set after it was drawn
    fn restyle_contours(&mut self, set: &ContourSet) -> Result<()>;
}
