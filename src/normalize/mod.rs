//! Data normalization and level selection.
//!
//! Everything that happens to sample values before they reach a rendering
//! backend lives here: color/size normalization modes, boundary and contour
//! level sets, and coordinate mesh expansion.

pub mod levels;
pub mod mesh;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{Result, TrajmapError};

pub use levels::{
    contour_levels, finite_bounds, linspace, resolve_bounds, DEFAULT_CONTOUR_STEPS,
};
pub use mesh::{ensure_mesh, meshgrid, Coordinates};

/// Number of boundaries used by boundary normalization when none is given
pub const DEFAULT_BOUNDARY_LEVELS: usize = 11;

/// Resolution of the lookup table a boundary norm spreads its buckets over
pub const DEFAULT_NCOLORS: usize = 256;

const RELABEL_NOTICE: &str =
    "colorbar tick labels will show transformed values; relabel the colorbar ticks if original units matter";

/// Color normalization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorNorm {
    /// Raw linear scaling between vmin and vmax
    #[default]
    None,
    /// Discrete buckets between evenly spaced boundaries
    Boundary,
    /// Base-10 logarithmic scaling applied by the backend
    Log,
    /// Data pre-transformed by the natural logarithm
    Ln,
    /// Data pre-transformed by the square root
    Sqrt,
}

impl ColorNorm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorNorm::None => "none",
            ColorNorm::Boundary => "boundary",
            ColorNorm::Log => "log",
            ColorNorm::Ln => "ln",
            ColorNorm::Sqrt => "sqrt",
        }
    }
}

impl FromStr for ColorNorm {
    type Err = TrajmapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(ColorNorm::None),
            "boundary" => Ok(ColorNorm::Boundary),
            "log" => Ok(ColorNorm::Log),
            "ln" => Ok(ColorNorm::Ln),
            "sqrt" => Ok(ColorNorm::Sqrt),
            other => Err(TrajmapError::configuration(format!(
                "Unknown color normalization: '{}'. Must be one of: none, boundary, log, ln, sqrt",
                other
            ))),
        }
    }
}

impl TryFrom<String> for ColorNorm {
    type Error = TrajmapError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorNorm> for String {
    fn from(value: ColorNorm) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ColorNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker-size normalization mode. Boundary bucketing has no meaning for sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SizeNorm {
    #[default]
    None,
    /// log10 transform
    Log,
    /// Natural log transform
    Ln,
    /// Square-root transform
    Sqrt,
}

impl SizeNorm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeNorm::None => "none",
            SizeNorm::Log => "log",
            SizeNorm::Ln => "ln",
            SizeNorm::Sqrt => "sqrt",
        }
    }
}

impl FromStr for SizeNorm {
    type Err = TrajmapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(SizeNorm::None),
            "log" => Ok(SizeNorm::Log),
            "ln" => Ok(SizeNorm::Ln),
            "sqrt" => Ok(SizeNorm::Sqrt),
            "boundary" => Err(TrajmapError::configuration(
                "Boundary normalization is not available for marker sizes",
            )),
            other => Err(TrajmapError::configuration(format!(
                "Unknown size normalization: '{}'. Must be one of: none, log, ln, sqrt",
                other
            ))),
        }
    }
}

impl TryFrom<String> for SizeNorm {
    type Error = TrajmapError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SizeNorm> for String {
    fn from(value: SizeNorm) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SizeNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps values to discrete buckets delimited by increasing boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryNorm {
    boundaries: Vec<f64>,
    ncolors: usize,
}

impl BoundaryNorm {
    pub fn new(boundaries: Vec<f64>, ncolors: usize) -> Result<Self> {
        if boundaries.len() < 2 {
            return Err(TrajmapError::configuration(format!(
                "Boundary normalization needs at least 2 boundaries, got {}",
                boundaries.len()
            )));
        }
        if boundaries.windows(2).any(|w| w[1] < w[0]) {
            return Err(TrajmapError::configuration(
                "Boundaries must be monotonically increasing",
            ));
        }
        if ncolors == 0 {
            return Err(TrajmapError::configuration("ncolors must be positive"));
        }
        Ok(Self {
            boundaries,
            ncolors,
        })
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn ncolors(&self) -> usize {
        self.ncolors
    }

    /// Number of intervals between the boundaries
    pub fn intervals(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn vmin(&self) -> f64 {
        self.boundaries[0]
    }

    pub fn vmax(&self) -> f64 {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// Interval index of `value`; the last interval is closed on the right.
    /// Returns `None` for non-finite values and values outside the boundaries.
    pub fn bucket(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.vmin() || value > self.vmax() {
            return None;
        }
        let at_or_below = self.boundaries.partition_point(|b| *b <= value);
        Some((at_or_below - 1).min(self.intervals() - 1))
    }

    /// Lookup-table index for `value`, clamping out-of-range values to the
    /// first/last bucket.
    pub fn color_index(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let bucket = if value < self.vmin() {
            0
        } else if value > self.vmax() {
            self.intervals() - 1
        } else {
            self.bucket(value)?
        };

        let intervals = self.intervals();
        if intervals == 1 || self.ncolors == 1 {
            return Some(0);
        }
        // Spread buckets over the whole table when there are more colors than buckets
        Some((bucket * (self.ncolors - 1) / (intervals - 1)).min(self.ncolors - 1))
    }

    /// Colormap fraction in [0, 1]
    pub fn scale(&self, value: f64) -> Option<f64> {
        let index = self.color_index(value)?;
        if self.ncolors == 1 {
            return Some(0.0);
        }
        Some(index as f64 / (self.ncolors - 1) as f64)
    }
}

/// Base-10 logarithmic scaling with optionally unresolved bounds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogNorm {
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
}

impl LogNorm {
    /// Fill missing bounds from the positive finite values of `data`
    pub fn autoscale(&mut self, data: &[f64]) {
        let positive = data.iter().copied().filter(|v| v.is_finite() && *v > 0.0);
        let (lo, hi) = positive.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if self.vmin.is_none() && lo.is_finite() {
            self.vmin = Some(lo);
        }
        if self.vmax.is_none() && hi.is_finite() {
            self.vmax = Some(hi);
        }
    }

    pub fn scale(&self, value: f64) -> Option<f64> {
        let (vmin, vmax) = (self.vmin?, self.vmax?);
        if !value.is_finite() || value <= 0.0 {
            return None;
        }
        let (lo, hi) = (vmin.log10(), vmax.log10());
        if hi <= lo {
            return Some(0.5);
        }
        Some(((value.log10() - lo) / (hi - lo)).clamp(0.0, 1.0))
    }
}

/// Normalization descriptor handed to a rendering backend
#[derive(Debug, Clone, PartialEq)]
pub enum Normalization {
    /// Linear scaling between two bounds
    Linear { vmin: f64, vmax: f64 },
    /// Discrete bucket mapping
    Boundary(BoundaryNorm),
    /// Base-10 logarithmic mapping
    Log(LogNorm),
}

impl Normalization {
    /// Build the descriptor a backend actually maps with: `None` becomes
    /// linear scaling over the given or derived bounds, log bounds are
    /// autoscaled from the data.
    pub fn resolve(
        norm: Option<&Normalization>,
        values: &[f64],
        vmin: Option<f64>,
        vmax: Option<f64>,
    ) -> Normalization {
        match norm {
            Some(Normalization::Linear { vmin, vmax }) => Normalization::Linear {
                vmin: *vmin,
                vmax: *vmax,
            },
            None => {
                let (lo, hi) = finite_bounds(values).unwrap_or((0.0, 1.0));
                Normalization::Linear {
                    vmin: vmin.unwrap_or(lo),
                    vmax: vmax.unwrap_or(hi),
                }
            }
            Some(Normalization::Boundary(boundary)) => Normalization::Boundary(boundary.clone()),
            Some(Normalization::Log(log)) => {
                let mut log = *log;
                if log.vmin.is_none() {
                    log.vmin = vmin;
                }
                if log.vmax.is_none() {
                    log.vmax = vmax;
                }
                log.autoscale(values);
                if log.vmin.is_none() || log.vmax.is_none() {
                    log.vmin = Some(log.vmin.unwrap_or(1.0));
                    log.vmax = Some(log.vmax.unwrap_or(10.0));
                }
                Normalization::Log(log)
            }
        }
    }

    /// Map a data value to a colormap fraction in [0, 1]
    pub fn scale(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Normalization::Linear { vmin, vmax } => {
                if vmax > vmin {
                    Some(((value - vmin) / (vmax - vmin)).clamp(0.0, 1.0))
                } else {
                    Some(0.5)
                }
            }
            Normalization::Boundary(boundary) => boundary.scale(value),
            Normalization::Log(log) => log.scale(value),
        }
    }

    /// Data range covered by this normalization (unresolved log bounds are NaN)
    pub fn range(&self) -> (f64, f64) {
        match self {
            Normalization::Linear { vmin, vmax } => (*vmin, *vmax),
            Normalization::Boundary(boundary) => (boundary.vmin(), boundary.vmax()),
            Normalization::Log(log) => (
                log.vmin.unwrap_or(f64::NAN),
                log.vmax.unwrap_or(f64::NAN),
            ),
        }
    }
}

/// Output of [`select_normalization`]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedData {
    /// Values to color by (transformed for `ln` and `sqrt`)
    pub values: Vec<f64>,
    /// Descriptor for the backend; `None` means raw linear scaling
    pub norm: Option<Normalization>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
}

/// Choose the color normalization for `data`.
///
/// `levels` is only consulted for [`ColorNorm::Boundary`] and defaults to
/// [`DEFAULT_BOUNDARY_LEVELS`].
pub fn select_normalization(
    data: &[f64],
    mode: ColorNorm,
    vmin: Option<f64>,
    vmax: Option<f64>,
    levels: Option<usize>,
) -> Result<NormalizedData> {
    check_bound("vmin", vmin)?;
    check_bound("vmax", vmax)?;

    debug!(mode = %mode, samples = data.len(), "Selecting color normalization");

    match mode {
        ColorNorm::None => Ok(NormalizedData {
            values: data.to_vec(),
            norm: None,
            vmin,
            vmax,
        }),
        ColorNorm::Boundary => {
            let levels = levels.unwrap_or(DEFAULT_BOUNDARY_LEVELS);
            if levels < 2 {
                return Err(TrajmapError::configuration(format!(
                    "Boundary normalization needs levels >= 2, got {}",
                    levels
                )));
            }
            let (lo, hi) = resolve_bounds(data, vmin, vmax)?;
            let boundaries = linspace(lo, hi, levels);
            let norm = BoundaryNorm::new(boundaries, DEFAULT_NCOLORS)?;
            Ok(NormalizedData {
                values: data.to_vec(),
                norm: Some(Normalization::Boundary(norm)),
                vmin: Some(lo),
                vmax: Some(hi),
            })
        }
        ColorNorm::Log => {
            check_positive(data, "log")?;
            check_positive(&[vmin, vmax].iter().flatten().copied().collect::<Vec<_>>(), "log")?;
            Ok(NormalizedData {
                values: data.to_vec(),
                norm: Some(Normalization::Log(LogNorm { vmin, vmax })),
                vmin,
                vmax,
            })
        }
        ColorNorm::Ln => {
            let values = transform(data, Transform::Ln)?;
            info!(mode = "ln", "Natural log normalization: {}", RELABEL_NOTICE);
            Ok(NormalizedData {
                values,
                norm: None,
                vmin,
                vmax,
            })
        }
        ColorNorm::Sqrt => {
            let values = transform(data, Transform::Sqrt)?;
            info!(mode = "sqrt", "Square-root normalization: {}", RELABEL_NOTICE);
            Ok(NormalizedData {
                values,
                norm: None,
                vmin,
                vmax,
            })
        }
    }
}

/// Transform marker-size data and multiply by `base` to get per-point sizes
pub fn scale_marker_sizes(sizes: &[f64], mode: SizeNorm, base: f64) -> Result<Vec<f64>> {
    if !base.is_finite() || base < 0.0 {
        return Err(TrajmapError::configuration(format!(
            "Base marker size must be a non-negative number, got {}",
            base
        )));
    }

    let transformed = match mode {
        SizeNorm::None => sizes.to_vec(),
        SizeNorm::Log => transform(sizes, Transform::Log10)?,
        SizeNorm::Ln => transform(sizes, Transform::Ln)?,
        SizeNorm::Sqrt => transform(sizes, Transform::Sqrt)?,
    };

    Ok(transformed.into_iter().map(|v| v * base).collect())
}

#[derive(Debug, Clone, Copy)]
enum Transform {
    Log10,
    Ln,
    Sqrt,
}

fn transform(data: &[f64], transform: Transform) -> Result<Vec<f64>> {
    match transform {
        Transform::Log10 => {
            check_positive(data, "log")?;
            Ok(data.iter().map(|v| v.log10()).collect())
        }
        Transform::Ln => {
            check_positive(data, "ln")?;
            Ok(data.iter().map(|v| v.ln()).collect())
        }
        Transform::Sqrt => {
            if let Some((index, value)) = data
                .iter()
                .enumerate()
                .find(|(_, v)| **v < 0.0)
            {
                return Err(TrajmapError::domain(format!(
                    "sqrt is undefined for negative values (value {} at index {})",
                    value, index
                )));
            }
            Ok(data.iter().map(|v| v.sqrt()).collect())
        }
    }
}

fn check_positive(data: &[f64], name: &str) -> Result<()> {
    match data
        .iter()
        .enumerate()
        .find(|(_, v)| **v <= 0.0)
    {
        Some((index, value)) => Err(TrajmapError::domain(format!(
            "{} is undefined for non-positive values (value {} at index {})",
            name, value, index
        ))),
        None => Ok(()),
    }
}

fn check_bound(name: &str, bound: Option<f64>) -> Result<()> {
    match bound {
        Some(value) if !value.is_finite() => Err(TrajmapError::configuration(format!(
            "{} must be finite, got {}",
            name, value
        ))),
        _ => Ok(()),
    }
}
