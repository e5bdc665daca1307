//! Contour and filled-contour maps of gridded fields, and per-level restyling.

use ndarray::ArrayView2;
use tracing::debug;

use crate::colormaps::{get_colormap, Rgba};
use crate::error::Result;
use crate::normalize::{contour_levels, ensure_mesh, Coordinates, DEFAULT_CONTOUR_STEPS};
use crate::render::{CollectionStyle, ContourRequest, ContourSet, MapBackend};

/// Options for [`meteo_contouring`]
#[derive(Debug, Clone, PartialEq)]
pub struct ContourOptions {
    /// Filled bands instead of lines
    pub filled: bool,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    /// Number of levels between vmin and vmax when `levels` is unset
    pub steps: usize,
    pub levels: Option<Vec<f64>>,
    /// Explicit colors, cycled over levels; overrides the colormap
    pub colors: Option<Vec<Rgba>>,
    pub colormap: String,
    pub zorder: i32,
}

impl Default for ContourOptions {
    fn default() -> Self {
        Self {
            filled: true,
            vmin: None,
            vmax: None,
            steps: DEFAULT_CONTOUR_STEPS,
            levels: None,
            colors: None,
            colormap: "spectral".to_string(),
            zorder: 13,
        }
    }
}

/// Contour `data` on its coordinates.
///
/// 1-D coordinate axes are expanded into meshes matching the data grid.
pub fn meteo_contouring<B>(
    backend: &mut B,
    data: ArrayView2<f64>,
    coords: Coordinates,
    options: &ContourOptions,
) -> Result<ContourSet>
where
    B: MapBackend + ?Sized,
{
    let levels = contour_levels(
        data,
        options.vmin,
        options.vmax,
        options.steps,
        options.levels.as_deref(),
    )?;
    let (lons, lats) = ensure_mesh(coords, data.dim())?;
    let colormap = get_colormap(&options.colormap)?;

    debug!(
        shape = ?data.dim(),
        levels = levels.len(),
        filled = options.filled,
        colormap = %options.colormap,
        "Contouring field"
    );

    backend.contour(ContourRequest {
        lons: lons.view(),
        lats: lats.view(),
        data: data.view(),
        levels,
        filled: options.filled,
        colors: options.colors.clone(),
        colormap,
        zorder: options.zorder,
    })
}

/// Options for [`adjust_contourparams`]
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustOptions {
    /// Colors of the listed contours; `None` keeps the current color
    pub colors: Vec<Option<Rgba>>,
    /// When false, every unlisted contour is hidden
    pub othercontours_visible: bool,
    /// Overrides applied to the listed contours
    pub style: CollectionStyle,
}

impl Default for AdjustOptions {
    fn default() -> Self {
        Self {
            colors: vec![None],
            othercontours_visible: true,
            style: CollectionStyle::default(),
        }
    }
}

fn same_level(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(1.0)
}

/// Recolor and restyle particular contour levels, optionally hiding the rest.
///
/// When `contours` and `options.colors` differ in length, the first color is
/// used for every listed contour. Returns how many collections matched.
pub fn adjust_contourparams<B>(
    backend: &mut B,
    set: &mut ContourSet,
    contours: &[f64],
    options: &AdjustOptions,
) -> Result<usize>
where
    B: MapBackend + ?Sized,
{
    let colors: Vec<Option<Rgba>> = if contours.len() == options.colors.len() {
        options.colors.clone()
    } else {
        vec![options.colors.first().copied().flatten(); contours.len()]
    };

    let mut matched = 0;
    for (level, collection) in set.levels.iter().zip(set.collections.iter_mut()) {
        match contours.iter().position(|c| same_level(*c, *level)) {
            Some(index) => {
                collection.apply(&options.style);
                if let Some(color) = colors[index] {
                    collection.color = color;
                }
                matched += 1;
            }
            None if !options.othercontours_visible => collection.alpha = 0.0,
            None => {}
        }
    }

    debug!(
        requested = contours.len(),
        matched,
        hide_others = !options.othercontours_visible,
        "Adjusted contour levels"
    );

    backend.restyle_contours(set)?;
    Ok(matched)
}
