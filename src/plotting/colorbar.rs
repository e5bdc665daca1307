//! Colorbars for scatter and contour mappables.
//!
//! A [`Colorbar`] is a plain description: colormap, resolved normalization,
//! geometry and decoration. Backends turn it into pixels; the bundled raster
//! backend does so with [`crate::render::render_colorbar`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::colormaps::Colormap;
use crate::error::{Result, TrajmapError};
use crate::normalize::Normalization;
use crate::render::ScalarMappable;

/// Tick steps tried by [`nice_ticks`], per power of ten
const NICE_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Bins used for ticks before any decoration is applied
const DEFAULT_TICK_BINS: usize = 9;

macro_rules! string_enum {
    ($name:ident, $param:literal, { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = TrajmapError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    other => Err(TrajmapError::InvalidParameter {
                        param: $param.to_string(),
                        message: format!("Unknown {}: '{}'", $param, other),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = TrajmapError;

            fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

string_enum!(Orientation, "orientation", {
    Horizontal => "horizontal",
    Vertical => "vertical",
});

/// Pointed colorbar ends for out-of-range values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Extend {
    #[default]
    Neither,
    Both,
    Min,
    Max,
}

string_enum!(Extend, "extend", {
    Neither => "neither",
    Both => "both",
    Min => "min" | "under",
    Max => "max" | "over",
});

impl Extend {
    /// Whether the low end is extended
    pub fn min(&self) -> bool {
        matches!(self, Extend::Both | Extend::Min)
    }

    /// Whether the high end is extended
    pub fn max(&self) -> bool {
        matches!(self, Extend::Both | Extend::Max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TickDirection {
    #[default]
    Out,
    In,
    InOut,
}

string_enum!(TickDirection, "tick_dir", {
    Out => "out",
    In => "in",
    InOut => "inout",
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickParams {
    pub labelsize: f64,
    pub direction: TickDirection,
    pub length: f64,
    pub width: f64,
}

impl Default for TickParams {
    fn default() -> Self {
        Self {
            labelsize: 16.0,
            direction: TickDirection::Out,
            length: 4.0,
            width: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarLabel {
    pub text: String,
    pub fontsize: f64,
    pub labelpad: f64,
    pub rotation: f64,
}

/// Decoration applied by [`edit_cbar`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorbarDecoration {
    /// Maximum number of nice tick intervals; `None` keeps the current ticks
    pub divisions: Option<usize>,
    pub label: Option<String>,
    pub tick_fs: f64,
    pub label_fs: f64,
    pub labelpad: f64,
    pub rotation: f64,
    pub tick_dir: TickDirection,
    /// Tick (length, width)
    pub tick_dim: (f64, f64),
}

impl Default for ColorbarDecoration {
    fn default() -> Self {
        Self {
            divisions: Some(5),
            label: None,
            tick_fs: 16.0,
            label_fs: 18.0,
            labelpad: 24.0,
            rotation: 0.0,
            tick_dir: TickDirection::Out,
            tick_dim: (4.0, 2.0),
        }
    }
}

/// Options for [`make_cbar`]
#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarOptions {
    pub orientation: Orientation,
    /// Ratio of long to short side
    pub aspect: f64,
    /// Fraction of the map size along the long side
    pub shrink: f64,
    /// Flip the bar along its long axis; value-color mapping is unchanged
    pub reverse: bool,
    pub decoration: ColorbarDecoration,
}

impl Default for ColorbarOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            aspect: 20.0,
            shrink: 1.0,
            reverse: false,
            decoration: ColorbarDecoration::default(),
        }
    }
}

/// Options for [`make_cax_cbar`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaxOptions {
    pub orientation: Orientation,
    pub reverse: bool,
    pub extend: Extend,
    pub decoration: ColorbarDecoration,
}

/// A dedicated colorbar axes, `[left, bottom, width, height]` in figure fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorbarAxes {
    pub rect: [f64; 4],
}

/// A colorbar tied to a mappable's colormap and normalization
#[derive(Debug, Clone)]
pub struct Colorbar {
    pub colormap: Arc<dyn Colormap>,
    pub norm: Normalization,
    /// Discrete blocks to draw, from boundary norms and filled contours
    pub boundaries: Option<Vec<f64>>,
    pub orientation: Orientation,
    pub aspect: f64,
    pub shrink: f64,
    pub inverted: bool,
    pub extend: Extend,
    pub ticks: Vec<f64>,
    pub tick_params: TickParams,
    pub label: Option<ColorbarLabel>,
    pub alpha: f64,
}

impl Colorbar {
    pub fn new(colormap: Arc<dyn Colormap>, norm: Normalization) -> Self {
        let boundaries = match &norm {
            Normalization::Boundary(boundary) => Some(boundary.boundaries().to_vec()),
            _ => None,
        };
        Self::with_boundaries(colormap, norm, boundaries)
    }

    pub fn from_mappable<M: ScalarMappable + ?Sized>(mappable: &M) -> Self {
        Self::with_boundaries(
            Arc::clone(mappable.colormap()),
            mappable.norm().clone(),
            mappable.boundaries().map(<[f64]>::to_vec),
        )
    }

    fn with_boundaries(
        colormap: Arc<dyn Colormap>,
        norm: Normalization,
        boundaries: Option<Vec<f64>>,
    ) -> Self {
        let ticks = match &boundaries {
            Some(bounds) => bounds.clone(),
            None => {
                let (lo, hi) = norm.range();
                nice_ticks(lo, hi, DEFAULT_TICK_BINS)
            }
        };
        Self {
            colormap,
            norm,
            boundaries,
            orientation: Orientation::Horizontal,
            aspect: 20.0,
            shrink: 1.0,
            inverted: false,
            extend: Extend::Neither,
            ticks,
            tick_params: TickParams::default(),
            label: None,
            alpha: 1.0,
        }
    }

    /// Value range covered by the bar
    pub fn range(&self) -> (f64, f64) {
        match &self.boundaries {
            Some(bounds) if bounds.len() >= 2 => (bounds[0], bounds[bounds.len() - 1]),
            _ => self.norm.range(),
        }
    }
}

/// Up to `nbins + 1` evenly spaced round tick values inside `[vmin, vmax]`
pub fn nice_ticks(vmin: f64, vmax: f64, nbins: usize) -> Vec<f64> {
    if !(vmin.is_finite() && vmax.is_finite()) || nbins == 0 {
        return Vec::new();
    }
    let (lo, hi) = (vmin.min(vmax), vmin.max(vmax));
    if hi == lo {
        return vec![lo];
    }

    let raw = (hi - lo) / nbins as f64;
    let exponent = raw.log10().floor() as i32;
    let scale = 10f64.powi(exponent);
    let step = NICE_STEPS
        .iter()
        .map(|s| s * scale)
        .find(|s| *s >= raw * (1.0 - 1e-9))
        .unwrap_or(10.0 * scale);

    // Snap to a tenth of the step's power of ten to drop float noise
    let inverse = 10f64.powi(1 - exponent);
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last)
        .map(|k| {
            let value = ((k as f64 * step) * inverse).round() / inverse;
            if value == 0.0 {
                0.0
            } else {
                value
            }
        })
        .collect()
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(TrajmapError::configuration(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Create a colorbar beside the map for `mappable`, then decorate it
pub fn make_cbar<M>(mappable: &M, options: &ColorbarOptions) -> Result<Colorbar>
where
    M: ScalarMappable + ?Sized,
{
    check_positive("aspect", options.aspect)?;
    check_positive("shrink", options.shrink)?;

    let mut cbar = Colorbar::from_mappable(mappable);
    cbar.orientation = options.orientation;
    cbar.aspect = options.aspect;
    cbar.shrink = options.shrink;
    cbar.inverted = options.reverse;

    edit_cbar(&mut cbar, &options.decoration)?;
    Ok(cbar)
}

/// Create a colorbar on its own axes at `rect`, then decorate it.
///
/// The bar's aspect ratio follows the axes' proportions.
pub fn make_cax_cbar<M>(
    rect: [f64; 4],
    mappable: &M,
    options: &CaxOptions,
) -> Result<(ColorbarAxes, Colorbar)>
where
    M: ScalarMappable + ?Sized,
{
    if !rect.iter().all(|v| v.is_finite()) {
        return Err(TrajmapError::configuration(format!(
            "Colorbar axes rect must be finite, got {:?}",
            rect
        )));
    }
    let [_, _, width, height] = rect;
    check_positive("Colorbar axes width", width)?;
    check_positive("Colorbar axes height", height)?;

    let mut cbar = Colorbar::from_mappable(mappable);
    cbar.orientation = options.orientation;
    cbar.aspect = match options.orientation {
        Orientation::Horizontal => width / height,
        Orientation::Vertical => height / width,
    };
    cbar.inverted = options.reverse;
    cbar.extend = options.extend;

    edit_cbar(&mut cbar, &options.decoration)?;
    Ok((ColorbarAxes { rect }, cbar))
}

/// Apply ticks, tick styling and an optional label; reset alpha to opaque
pub fn edit_cbar(cbar: &mut Colorbar, decoration: &ColorbarDecoration) -> Result<()> {
    let (length, width) = decoration.tick_dim;
    for (name, value) in [("tick length", length), ("tick width", width)] {
        if !value.is_finite() || value < 0.0 {
            return Err(TrajmapError::configuration(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
    }

    match decoration.divisions {
        Some(0) => {
            return Err(TrajmapError::configuration(
                "Colorbar divisions must be at least 1",
            ))
        }
        Some(divisions) => {
            let (lo, hi) = cbar.range();
            cbar.ticks = nice_ticks(lo, hi, divisions);
        }
        None => {}
    }

    cbar.tick_params = TickParams {
        labelsize: decoration.tick_fs,
        direction: decoration.tick_dir,
        length,
        width,
    };

    if let Some(text) = &decoration.label {
        cbar.label = Some(ColorbarLabel {
            text: text.clone(),
            fontsize: decoration.label_fs,
            labelpad: decoration.labelpad,
            rotation: decoration.rotation,
        });
    }

    // A translucent mappable would otherwise leave stripes in the bar
    cbar.alpha = 1.0;

    debug!(
        ticks = cbar.ticks.len(),
        orientation = %cbar.orientation,
        labelled = cbar.label.is_some(),
        "Edited colorbar"
    );
    Ok(())
}
