//! Reference raster backend.
//!
//! [`RasterMap`] records draw calls as layers over an equirectangular
//! [`MapExtent`] and composites them by ascending zorder when rendered.

use image::{DynamicImage, ImageFormat, Rgba as Pixel, RgbaImage};
use ndarray::Array2;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use super::draw::{blend_pixel, fill_disk, fill_rect, fill_triangle, stroke_circle, stroke_polyline};
use super::extent::MapExtent;
use super::mappable::{ContourCollection, ContourSet, LayerId, PathCollection};
use super::marching::{march_squares, GridPoint};
use super::style::{LineStyle, Marker};
use super::{ContourRequest, MapBackend, MarkerSizes, PathRequest, ScatterRequest};
use crate::colormaps::Rgba;
use crate::error::{Result, TrajmapError};
use crate::normalize::Normalization;
use crate::plotting::colorbar::{Colorbar, Orientation, TickDirection};

/// Line width of contour lines when nothing else is requested
pub const DEFAULT_CONTOUR_LINEWIDTH: f64 = 1.5;

/// Largest width or height of any image this backend produces
pub const MAX_IMAGE_SIDE: u32 = 16384;

/// Encoded image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        extension.parse().ok()
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = TrajmapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            other => Err(TrajmapError::InvalidParameter {
                param: "format".to_string(),
                message: format!("Format must be 'png' or 'jpeg', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode an image; JPEG output drops the alpha channel.
pub fn encode_image(img: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let written = match format {
        OutputFormat::Png => img.write_to(&mut buffer, format.image_format()),
        OutputFormat::Jpeg => DynamicImage::ImageRgba8(img.clone())
            .to_rgb8()
            .write_to(&mut buffer, format.image_format()),
    };
    written.map_err(|e| TrajmapError::Render {
        message: format!("Failed to encode {} image: {}", format, e),
    })?;
    Ok(buffer.into_inner())
}

struct PointsLayer {
    /// Pixel position, radius and fill color per drawable point
    points: Vec<((f64, f64), f64, [u8; 4])>,
    edgecolor: Option<Rgba>,
}

struct PathLayer {
    points: Vec<(f64, f64)>,
    color: Rgba,
    linewidth: f64,
    linestyle: LineStyle,
    marker: Option<Marker>,
    markersize: f64,
    markeredgecolor: Option<Rgba>,
}

struct ContourLayer {
    /// Pixel positions of the grid nodes
    xs: Array2<f64>,
    ys: Array2<f64>,
    data: Array2<f64>,
    levels: Vec<f64>,
    filled: bool,
    collections: Vec<ContourCollection>,
}

enum LayerKind {
    Points(PointsLayer),
    Path(PathLayer),
    Contour(ContourLayer),
}

struct Layer {
    zorder: i32,
    kind: LayerKind,
}

/// An equirectangular raster canvas implementing [`MapBackend`]
pub struct RasterMap {
    extent: MapExtent,
    width: u32,
    height: u32,
    background: Rgba,
    layers: Vec<Layer>,
}

impl RasterMap {
    pub fn new(extent: MapExtent, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TrajmapError::InvalidParameter {
                param: "size".to_string(),
                message: format!("Canvas must be at least 1x1 pixels, got {}x{}", width, height),
            });
        }
        Ok(Self {
            extent,
            width,
            height,
            background: Rgba::WHITE,
            layers: Vec::new(),
        })
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    pub fn extent(&self) -> &MapExtent {
        &self.extent
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        self.extent.project(lon, lat, self.width, self.height)
    }

    fn push(&mut self, zorder: i32, kind: LayerKind) -> LayerId {
        self.layers.push(Layer { zorder, kind });
        LayerId(self.layers.len() - 1)
    }

    /// Composite all layers, lowest zorder first; equal zorders keep draw order
    pub fn render(&self) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(self.width, self.height, Pixel(self.background.0));

        let mut ordered: Vec<&Layer> = self.layers.iter().collect();
        ordered.sort_by_key(|layer| layer.zorder);

        for layer in ordered {
            match &layer.kind {
                LayerKind::Points(points) => draw_points(&mut img, points),
                LayerKind::Path(path) => draw_path(&mut img, path),
                LayerKind::Contour(contour) if contour.filled => draw_filled_contour(&mut img, contour),
                LayerKind::Contour(contour) => draw_contour_lines(&mut img, contour),
            }
        }

        img
    }

    pub fn encode(&self, format: OutputFormat) -> Result<Vec<u8>> {
        encode_image(&self.render(), format)
    }

    pub fn save(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let bytes = self.encode(format)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl MapBackend for RasterMap {
    fn scatter(&mut self, request: ScatterRequest<'_>) -> Result<PathCollection> {
        let len = request.values.len();
        if request.lons.len() != len || request.lats.len() != len {
            return Err(TrajmapError::shape(format!(
                "Scatter needs equal lengths, got {} values, {} lons, {} lats",
                len,
                request.lons.len(),
                request.lats.len()
            )));
        }
        if let MarkerSizes::PerPoint(sizes) = &request.sizes {
            if sizes.len() != len {
                return Err(TrajmapError::shape(format!(
                    "Got {} marker sizes for {} points",
                    sizes.len(),
                    len
                )));
            }
        }

        let norm = Normalization::resolve(
            request.norm.as_ref(),
            request.values,
            request.vmin,
            request.vmax,
        );

        let mut points = Vec::with_capacity(len);
        for i in 0..len {
            let (lon, lat) = (request.lons[i], request.lats[i]);
            let size = request.sizes.get(i);
            if !(lon.is_finite() && lat.is_finite() && size.is_finite() && size > 0.0) {
                continue;
            }
            let Some(fraction) = norm.scale(request.values[i]) else {
                continue;
            };
            let color = request.colormap.map_normalized(fraction);
            points.push((self.project(lon, lat), size.sqrt() / 2.0, color));
        }

        debug!(
            points = len,
            drawn = points.len(),
            colormap = request.colormap.name(),
            zorder = request.zorder,
            "Adding scatter layer"
        );

        let layer = self.push(
            request.zorder,
            LayerKind::Points(PointsLayer {
                points,
                edgecolor: request.edgecolor,
            }),
        );

        Ok(PathCollection {
            layer,
            colormap: request.colormap,
            norm,
            len,
            zorder: request.zorder,
        })
    }

    fn plot(&mut self, request: PathRequest<'_>) -> Result<()> {
        if request.lons.len() != request.lats.len() {
            return Err(TrajmapError::shape(format!(
                "Path needs equal lengths, got {} lons and {} lats",
                request.lons.len(),
                request.lats.len()
            )));
        }

        let points = request
            .lons
            .iter()
            .zip(request.lats)
            .map(|(lon, lat)| self.project(*lon, *lat))
            .collect::<Vec<_>>();

        debug!(vertices = points.len(), zorder = request.zorder, "Adding path layer");

        self.push(
            request.zorder,
            LayerKind::Path(PathLayer {
                points,
                color: request.color,
                linewidth: request.linewidth,
                linestyle: request.linestyle,
                marker: request.marker,
                markersize: request.markersize,
                markeredgecolor: request.markeredgecolor,
            }),
        );
        Ok(())
    }

    fn contour(&mut self, request: ContourRequest<'_>) -> Result<ContourSet> {
        let shape = request.data.dim();
        if request.lons.dim() != shape || request.lats.dim() != shape {
            return Err(TrajmapError::shape(format!(
                "Contour meshes {:?}/{:?} do not match data shape {:?}",
                request.lons.dim(),
                request.lats.dim(),
                shape
            )));
        }
        let levels = request.levels;
        if levels.is_empty() || (request.filled && levels.len() < 2) {
            return Err(TrajmapError::configuration(format!(
                "{} contours need at least {} levels, got {}",
                if request.filled { "Filled" } else { "Line" },
                if request.filled { 2 } else { 1 },
                levels.len()
            )));
        }

        let norm = Normalization::Linear {
            vmin: levels[0],
            vmax: levels[levels.len() - 1],
        };
        let pick = |index: usize, value: f64| match &request.colors {
            Some(colors) if !colors.is_empty() => colors[index % colors.len()],
            _ => Rgba(request.colormap.map_normalized(norm.scale(value).unwrap_or(0.5))),
        };

        let collections = if request.filled {
            levels
                .windows(2)
                .enumerate()
                .map(|(k, band)| ContourCollection::new(band[0], pick(k, (band[0] + band[1]) / 2.0), 0.0))
                .collect()
        } else {
            levels
                .iter()
                .enumerate()
                .map(|(k, level)| ContourCollection::new(*level, pick(k, *level), DEFAULT_CONTOUR_LINEWIDTH))
                .collect::<Vec<_>>()
        };

        let mut xs = Array2::zeros(shape);
        let mut ys = Array2::zeros(shape);
        for ((index, lon), lat) in request.lons.indexed_iter().zip(request.lats.iter()) {
            let (x, y) = self.project(*lon, *lat);
            xs[index] = x;
            ys[index] = y;
        }

        debug!(
            rows = shape.0,
            cols = shape.1,
            levels = levels.len(),
            filled = request.filled,
            zorder = request.zorder,
            "Adding contour layer"
        );

        let layer = self.push(
            request.zorder,
            LayerKind::Contour(ContourLayer {
                xs,
                ys,
                data: request.data.to_owned(),
                levels: levels.clone(),
                filled: request.filled,
                collections: Vec::clone(&collections),
            }),
        );

        Ok(ContourSet {
            layer,
            levels,
            filled: request.filled,
            colormap: request.colormap,
            norm,
            collections,
            zorder: request.zorder,
        })
    }

    fn restyle_contours(&mut self, set: &ContourSet) -> Result<()> {
        let Some(Layer {
            kind: LayerKind::Contour(contour),
            ..
        }) = self.layers.get_mut(set.layer.0)
        else {
            return Err(TrajmapError::Render {
                message: format!("Layer {} is not a contour layer of this map", set.layer.0),
            });
        };
        if contour.collections.len() != set.collections.len() {
            return Err(TrajmapError::Render {
                message: format!(
                    "Contour layer {} has {} collections, got {}",
                    set.layer.0,
                    contour.collections.len(),
                    set.collections.len()
                ),
            });
        }
        contour.collections = set.collections.clone();
        Ok(())
    }
}

fn draw_points(img: &mut RgbaImage, layer: &PointsLayer) {
    for ((x, y), radius, color) in &layer.points {
        fill_disk(img, *x, *y, *radius, *color);
        if let Some(edge) = layer.edgecolor {
            stroke_circle(img, *x, *y, *radius, edge.0);
        }
    }
}

fn draw_path(img: &mut RgbaImage, layer: &PathLayer) {
    if layer.linestyle != LineStyle::None {
        let unit = layer.linewidth.max(1.0);
        let dashes: Vec<f64> = layer.linestyle.dash_pattern().iter().map(|d| d * unit).collect();
        stroke_polyline(img, &layer.points, layer.linewidth, layer.color.0, &dashes);
    }

    let Some(marker) = layer.marker else {
        return;
    };
    let r = layer.markersize / 2.0;
    for &(x, y) in &layer.points {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let outline = match marker {
            Marker::Point => {
                fill_disk(img, x, y, r / 2.0, layer.color.0);
                None
            }
            Marker::Circle => {
                fill_disk(img, x, y, r, layer.color.0);
                if let Some(edge) = layer.markeredgecolor {
                    stroke_circle(img, x, y, r, edge.0);
                }
                None
            }
            Marker::Square => {
                fill_rect(img, x - r, y - r, x + r, y + r, layer.color.0);
                Some(vec![(x - r, y - r), (x + r, y - r), (x + r, y + r), (x - r, y + r), (x - r, y - r)])
            }
            Marker::Triangle => {
                let corners = [(x, y - r), (x + r, y + r), (x - r, y + r)];
                fill_triangle(img, corners, [0.0; 3], |_| Some(layer.color.0));
                Some(vec![corners[0], corners[1], corners[2], corners[0]])
            }
        };
        if let (Some(outline), Some(edge)) = (outline, layer.markeredgecolor) {
            stroke_polyline(img, &outline, 1.0, edge.0, &[]);
        }
    }
}

/// Band index of `value`; the top level closes the last band
fn band_index(levels: &[f64], value: f64) -> Option<usize> {
    let last = *levels.last()?;
    if !value.is_finite() || value < levels[0] || value > last {
        return None;
    }
    let at_or_below = levels.partition_point(|l| *l <= value);
    Some((at_or_below.max(1) - 1).min(levels.len() - 2))
}

fn draw_filled_contour(img: &mut RgbaImage, layer: &ContourLayer) {
    let colors: Vec<Option<[u8; 4]>> = layer
        .collections
        .iter()
        .map(|c| c.effective_color().map(|rgba| rgba.0))
        .collect();
    let shade = |value: f64| band_index(&layer.levels, value).and_then(|band| colors.get(band).copied().flatten());

    let (rows, cols) = layer.data.dim();
    for i in 0..rows.saturating_sub(1) {
        for j in 0..cols.saturating_sub(1) {
            let corners = [(i, j), (i, j + 1), (i + 1, j + 1), (i + 1, j)];
            let values = corners.map(|(r, c)| layer.data[[r, c]]);
            if !values.iter().all(|v| v.is_finite()) {
                continue;
            }
            let positions = corners.map(|(r, c)| (layer.xs[[r, c]], layer.ys[[r, c]]));

            fill_triangle(
                img,
                [positions[0], positions[1], positions[3]],
                [values[0], values[1], values[3]],
                shade,
            );
            fill_triangle(
                img,
                [positions[1], positions[2], positions[3]],
                [values[1], values[2], values[3]],
                shade,
            );
        }
    }
}

fn draw_contour_lines(img: &mut RgbaImage, layer: &ContourLayer) {
    for collection in &layer.collections {
        let Some(color) = collection.effective_color() else {
            continue;
        };
        if collection.linestyle == LineStyle::None || collection.linewidth <= 0.0 {
            continue;
        }
        let unit = collection.linewidth.max(1.0);
        let dashes: Vec<f64> = collection.linestyle.dash_pattern().iter().map(|d| d * unit).collect();

        for segment in march_squares(layer.data.view(), collection.level) {
            let start = sample_mesh(layer, segment.start);
            let end = sample_mesh(layer, segment.end);
            stroke_polyline(img, &[start, end], collection.linewidth, color.0, &dashes);
        }
    }
}

/// Pixel position of a fractional grid index, interpolated bilinearly
fn sample_mesh(layer: &ContourLayer, point: GridPoint) -> (f64, f64) {
    let (rows, cols) = layer.xs.dim();
    let i0 = (point.y.floor().max(0.0) as usize).min(rows.saturating_sub(2));
    let j0 = (point.x.floor().max(0.0) as usize).min(cols.saturating_sub(2));
    let i1 = (i0 + 1).min(rows - 1);
    let j1 = (j0 + 1).min(cols - 1);
    let ty = (point.y - i0 as f64).clamp(0.0, 1.0);
    let tx = (point.x - j0 as f64).clamp(0.0, 1.0);

    let lerp = |grid: &Array2<f64>| {
        let top = grid[[i0, j0]] * (1.0 - tx) + grid[[i0, j1]] * tx;
        let bottom = grid[[i1, j0]] * (1.0 - tx) + grid[[i1, j1]] * tx;
        top * (1.0 - ty) + bottom * ty
    };
    (lerp(&layer.xs), lerp(&layer.ys))
}

/// Render a colorbar as a standalone strip image.
///
/// `length` is the long side in pixels before shrinking; the short side
/// follows from the aspect ratio. Extended ends add a triangle the size of
/// the short side, and outward ticks add a margin below (horizontal) or to
/// the right (vertical) of the bar.
///
/// Sizes that would exceed [`MAX_IMAGE_SIDE`] on either side are a `Render`
/// error.
pub fn render_colorbar(cbar: &Colorbar, length: u32) -> Result<RgbaImage> {
    let tick_length = cbar.tick_params.length.max(0.0);
    let (long, short, margin) = colorbar_sides(cbar, length, tick_length)?;

    // Extensions at the low and high value ends, swapped when inverted
    let (low_ext, high_ext) = (
        if cbar.extend.min() { short } else { 0 },
        if cbar.extend.max() { short } else { 0 },
    );
    let (start_ext, end_ext) = if cbar.inverted {
        (high_ext, low_ext)
    } else {
        (low_ext, high_ext)
    };

    let (width, height) = match cbar.orientation {
        Orientation::Horizontal => (start_ext + long + end_ext, short + margin),
        Orientation::Vertical => (short + margin, start_ext + long + end_ext),
    };
    let mut img = RgbaImage::from_pixel(width, height, Pixel(Rgba::TRANSPARENT.0));

    // Position along the bar in [0, 1], measured from the low-value end
    let to_canvas = |along: f64, across: f64| -> (f64, f64) {
        let along = if cbar.inverted { 1.0 - along } else { along };
        let offset = start_ext as f64 + along * long as f64;
        match cbar.orientation {
            Orientation::Horizontal => (offset, across),
            Orientation::Vertical => (across, (start_ext + long + end_ext) as f64 - offset),
        }
    };

    for step in 0..long {
        let fraction = (step as f64 + 0.5) / long as f64;
        let color = bar_color(cbar, fraction);
        for across in 0..short {
            let (x, y) = to_canvas(fraction, across as f64 + 0.5);
            blend_pixel(&mut img, x.floor() as i64, y.floor() as i64, color);
        }
    }

    let short_f = short as f64;
    if low_ext > 0 {
        let color = Rgba(cbar.colormap.map_normalized(0.0)).with_alpha(cbar.alpha).0;
        let corners = [to_canvas(0.0, 0.0), to_canvas(0.0, short_f), to_canvas(-short_f / long as f64, short_f / 2.0)];
        fill_triangle(&mut img, corners, [0.0; 3], |_| Some(color));
    }
    if high_ext > 0 {
        let color = Rgba(cbar.colormap.map_normalized(1.0)).with_alpha(cbar.alpha).0;
        let corners = [to_canvas(1.0, 0.0), to_canvas(1.0, short_f), to_canvas(1.0 + short_f / long as f64, short_f / 2.0)];
        fill_triangle(&mut img, corners, [0.0; 3], |_| Some(color));
    }

    let (tick_from, tick_to) = match cbar.tick_params.direction {
        TickDirection::Out => (short_f, short_f + tick_length),
        TickDirection::In => (short_f - tick_length, short_f),
        TickDirection::InOut => (short_f - tick_length / 2.0, short_f + tick_length / 2.0),
    };
    for tick in &cbar.ticks {
        let Some(fraction) = tick_fraction(cbar, *tick) else {
            continue;
        };
        let from = to_canvas(fraction, tick_from);
        let to = to_canvas(fraction, tick_to);
        stroke_polyline(&mut img, &[from, to], cbar.tick_params.width, Rgba::BLACK.0, &[]);
    }

    Ok(img)
}

/// Long side, short side and tick margin of a colorbar image, in pixels
fn colorbar_sides(cbar: &Colorbar, length: u32, tick_length: f64) -> Result<(u32, u32, u32)> {
    let long = (length as f64 * cbar.shrink).round().max(1.0);
    let short = (long / cbar.aspect.max(f64::EPSILON)).round().max(1.0);
    let margin = match cbar.tick_params.direction {
        TickDirection::Out => tick_length,
        TickDirection::InOut => tick_length / 2.0,
        TickDirection::In => 0.0,
    }
    .ceil();

    let extensions = [cbar.extend.min(), cbar.extend.max()]
        .iter()
        .filter(|e| **e)
        .count() as f64;
    let along = long + extensions * short;
    let across = short + margin;

    let limit = MAX_IMAGE_SIDE as f64;
    if !(along.is_finite() && across.is_finite()) || along > limit || across > limit {
        return Err(TrajmapError::Render {
            message: format!(
                "Colorbar of {:.0}x{:.0} pixels exceeds the {} pixel limit (length {}, shrink {}, aspect {})",
                along, across, MAX_IMAGE_SIDE, length, cbar.shrink, cbar.aspect
            ),
        });
    }
    Ok((long as u32, short as u32, margin as u32))
}

fn bar_color(cbar: &Colorbar, fraction: f64) -> [u8; 4] {
    let value = match (cbar.boundaries.as_deref(), &cbar.norm) {
        (Some(bounds), _) if bounds.len() >= 2 => {
            // Equal-sized blocks, one per interval, colored at the interval midpoint
            let blocks = bounds.len() - 1;
            let block = ((fraction * blocks as f64) as usize).min(blocks - 1);
            (bounds[block] + bounds[block + 1]) / 2.0
        }
        (_, Normalization::Log(_)) => {
            let (lo, hi) = cbar.norm.range();
            10f64.powf(lo.log10() + fraction * (hi.log10() - lo.log10()))
        }
        _ => {
            let (lo, hi) = cbar.norm.range();
            lo + fraction * (hi - lo)
        }
    };
    let scaled = cbar.norm.scale(value).unwrap_or(fraction);
    Rgba(cbar.colormap.map_normalized(scaled)).with_alpha(cbar.alpha).0
}

/// Position of a tick value along the bar, `None` when it falls off the bar
fn tick_fraction(cbar: &Colorbar, value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let fraction = match (cbar.boundaries.as_deref(), &cbar.norm) {
        (Some(bounds), _) if bounds.len() >= 2 => {
            let blocks = (bounds.len() - 1) as f64;
            let upper = bounds.partition_point(|b| *b < value).clamp(1, bounds.len() - 1);
            let (b0, b1) = (bounds[upper - 1], bounds[upper]);
            let within = if b1 > b0 { (value - b0) / (b1 - b0) } else { 0.0 };
            ((upper - 1) as f64 + within) / blocks
        }
        (_, Normalization::Log(_)) => {
            let (lo, hi) = cbar.norm.range();
            if value <= 0.0 || hi <= lo {
                return None;
            }
            (value.log10() - lo.log10()) / (hi.log10() - lo.log10())
        }
        _ => {
            let (lo, hi) = cbar.norm.range();
            if hi <= lo {
                return None;
            }
            (value - lo) / (hi - lo)
        }
    };
    (-1e-9..=1.0 + 1e-9).contains(&fraction).then(|| fraction.clamp(0.0, 1.0))
}
