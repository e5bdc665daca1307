//! Scene documents: a JSON description of map layers.
//!
//! ```json
//! {
//!   "extent": [-130, 20, -60, 55],
//!   "layers": [
//!     {"type": "contour", "data": [[1, 2], [3, 4]], "lons": [-120, -70], "lats": [50, 25]},
//!     {"type": "scatter", "data": [850, 700], "lons": [-100, -95], "lats": [40, 42],
//!      "cnormalize": "boundary"},
//!     {"type": "path", "lons": [-100, -95], "lats": [40, 42], "color": "black", "linewidth": 1}
//!   ],
//!   "colorbar": {"layer": 1, "orientation": "vertical"}
//! }
//! ```
//!
//! `null` marks a missing value in data arrays.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::colormaps::Rgba;
use crate::config::PlotDefaults;
use crate::error::{Result, TrajmapError};
use crate::logging::log_scene_stats;
use crate::normalize::{ColorNorm, Coordinates, SizeNorm};
use crate::plotting::{
    adjust_contourparams, make_cax_cbar, make_cbar, meteo_contouring, traj_path, traj_scatter,
    AdjustOptions, CaxOptions, Colorbar, ColorbarDecoration, ColorbarOptions, Extend, Orientation,
    PathOptions,
};
use crate::render::{
    CollectionStyle, ContourSet, LineStyle, MapBackend, MapExtent, Marker, PathCollection,
    ScalarMappable,
};
use crate::samples::SampleCollection;

/// Padding in degrees around the data when a scene has no extent
const FIT_MARGIN: f64 = 2.0;

fn missing_as_nan(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

fn grid(name: &str, rows: &[Vec<Option<f64>>]) -> Result<Array2<f64>> {
    let cols = rows.first().map_or(0, Vec::len);
    if rows.is_empty() || cols == 0 {
        return Err(TrajmapError::shape(format!("{} grid is empty", name)));
    }
    if let Some(row) = rows.iter().position(|r| r.len() != cols) {
        return Err(TrajmapError::shape(format!(
            "{} grid is ragged: row {} has {} values, expected {}",
            name,
            row,
            rows[row].len(),
            cols
        )));
    }
    let flat: Vec<f64> = rows.iter().flat_map(|r| missing_as_nan(r)).collect();
    Array2::from_shape_vec((rows.len(), cols), flat)
        .map_err(|e| TrajmapError::shape(format!("{} grid: {}", name, e)))
}

/// Coordinates given as 1-D axes or full 2-D meshes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValues {
    Axis(Vec<f64>),
    Mesh(Vec<Vec<Option<f64>>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterLayer {
    pub data: Vec<Option<f64>>,
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    #[serde(default)]
    pub sizedata: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub colormap: Option<String>,
    #[serde(default)]
    pub edgecolor: Option<Rgba>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub cnormalize: ColorNorm,
    #[serde(default)]
    pub snormalize: SizeNorm,
    #[serde(default)]
    pub vmin: Option<f64>,
    #[serde(default)]
    pub vmax: Option<f64>,
    #[serde(default)]
    pub levels: Option<usize>,
    #[serde(default)]
    pub zorder: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathLayer {
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    pub color: Rgba,
    #[serde(default = "default_linewidth")]
    pub linewidth: f64,
    #[serde(default)]
    pub marker: Option<Marker>,
    #[serde(default)]
    pub markersize: Option<f64>,
    #[serde(default)]
    pub linestyle: LineStyle,
    #[serde(default)]
    pub markeredgecolor: Option<Rgba>,
    #[serde(default)]
    pub zorder: Option<i32>,
}

fn default_linewidth() -> f64 {
    1.0
}

/// Per-level restyling applied right after a contour layer is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourAdjustment {
    pub contours: Vec<f64>,
    #[serde(default = "default_adjust_colors")]
    pub colors: Vec<Option<Rgba>>,
    #[serde(default = "default_true")]
    pub othercontours_visible: bool,
    #[serde(default)]
    pub style: CollectionStyle,
}

fn default_adjust_colors() -> Vec<Option<Rgba>> {
    vec![None]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourLayer {
    pub data: Vec<Vec<Option<f64>>>,
    pub lons: CoordinateValues,
    pub lats: CoordinateValues,
    #[serde(default)]
    pub filled: Option<bool>,
    #[serde(default)]
    pub vmin: Option<f64>,
    #[serde(default)]
    pub vmax: Option<f64>,
    #[serde(default)]
    pub steps: Option<usize>,
    #[serde(default)]
    pub levels: Option<Vec<f64>>,
    #[serde(default)]
    pub colors: Option<Vec<Rgba>>,
    #[serde(default)]
    pub colormap: Option<String>,
    #[serde(default)]
    pub zorder: Option<i32>,
    #[serde(default)]
    pub adjust: Option<ContourAdjustment>,
}

impl ContourLayer {
    fn coordinates(&self) -> Result<Coordinates> {
        match (&self.lons, &self.lats) {
            (CoordinateValues::Axis(lons), CoordinateValues::Axis(lats)) => {
                Ok(Coordinates::axes(lons.clone(), lats.clone()))
            }
            (CoordinateValues::Mesh(lons), CoordinateValues::Mesh(lats)) => Ok(Coordinates::Mesh {
                lons: grid("Longitude", lons)?,
                lats: grid("Latitude", lats)?,
            }),
            _ => Err(TrajmapError::shape(
                "Contour lons and lats must both be axes or both be meshes",
            )),
        }
    }
}

/// One drawable layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneLayer {
    Scatter(ScatterLayer),
    Path(PathLayer),
    Contour(ContourLayer),
}

impl SceneLayer {
    pub fn kind(&self) -> &'static str {
        match self {
            SceneLayer::Scatter(_) => "scatter",
            SceneLayer::Path(_) => "path",
            SceneLayer::Contour(_) => "contour",
        }
    }
}

/// Colorbar for one of the scene's mappable layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneColorbar {
    /// Index of a scatter or contour layer
    pub layer: usize,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub aspect: Option<f64>,
    #[serde(default)]
    pub shrink: Option<f64>,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default)]
    pub extend: Extend,
    /// Dedicated axes `[left, bottom, width, height]`; beside the map when unset
    #[serde(default)]
    pub rect: Option<[f64; 4]>,
    #[serde(default)]
    pub decoration: Option<ColorbarDecoration>,
}

/// A scene document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub extent: Option<MapExtent>,
    #[serde(default)]
    pub layers: Vec<SceneLayer>,
    #[serde(default)]
    pub colorbar: Option<SceneColorbar>,
}

/// What a layer produced when drawn
#[derive(Debug, Clone)]
pub enum DrawnLayer {
    Scatter(PathCollection),
    Path,
    Contour(ContourSet),
}

impl Scene {
    /// Read and parse a scene file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scene: Scene = serde_json::from_str(&content)?;

        let kinds: Vec<&str> = scene.layers.iter().map(SceneLayer::kind).collect();
        log_scene_stats(
            &path.display().to_string(),
            scene.layers.len(),
            &kinds,
            scene.colorbar.is_some(),
        );
        Ok(scene)
    }

    /// The scene extent, or one fitted around every layer's coordinates
    pub fn extent_or_fit(&self) -> Result<MapExtent> {
        if let Some(extent) = self.extent {
            return Ok(extent);
        }

        let mut lons = Vec::new();
        let mut lats = Vec::new();
        for layer in &self.layers {
            match layer {
                SceneLayer::Scatter(ScatterLayer { lons: x, lats: y, .. })
                | SceneLayer::Path(PathLayer { lons: x, lats: y, .. }) => {
                    lons.extend_from_slice(x);
                    lats.extend_from_slice(y);
                }
                SceneLayer::Contour(contour) => {
                    for (values, target) in [(&contour.lons, &mut lons), (&contour.lats, &mut lats)] {
                        match values {
                            CoordinateValues::Axis(axis) => target.extend_from_slice(axis),
                            CoordinateValues::Mesh(mesh) => {
                                target.extend(mesh.iter().flat_map(|row| missing_as_nan(row)))
                            }
                        }
                    }
                }
            }
        }

        if lons.is_empty() {
            return Ok(MapExtent::global());
        }
        MapExtent::around(&lons, &lats, FIT_MARGIN)
    }

    /// Draw every layer in order through the plotting helpers
    pub fn draw<B>(&self, backend: &mut B, defaults: &PlotDefaults) -> Result<Vec<DrawnLayer>>
    where
        B: MapBackend + ?Sized,
    {
        let mut drawn = Vec::with_capacity(self.layers.len());

        for (index, layer) in self.layers.iter().enumerate() {
            debug!(layer = index, kind = layer.kind(), "Drawing scene layer");
            let result = match layer {
                SceneLayer::Scatter(scatter) => {
                    let mut samples = SampleCollection::new(
                        missing_as_nan(&scatter.data),
                        scatter.lons.clone(),
                        scatter.lats.clone(),
                    )?;
                    if let Some(sizedata) = &scatter.sizedata {
                        samples = samples.with_sizes(missing_as_nan(sizedata))?;
                    }

                    let mut options = defaults.scatter_options();
                    if let Some(colormap) = &scatter.colormap {
                        options.colormap = colormap.clone();
                    }
                    options.edgecolor = scatter.edgecolor;
                    options.size = scatter.size.unwrap_or(options.size);
                    options.cnormalize = scatter.cnormalize;
                    options.snormalize = scatter.snormalize;
                    options.vmin = scatter.vmin;
                    options.vmax = scatter.vmax;
                    options.levels = scatter.levels.unwrap_or(options.levels);
                    options.zorder = scatter.zorder.unwrap_or(options.zorder);

                    DrawnLayer::Scatter(traj_scatter(backend, &samples, &options)?)
                }
                SceneLayer::Path(path) => {
                    let mut options = PathOptions::new(path.color, path.linewidth);
                    options.marker = path.marker;
                    options.markersize = path.markersize.unwrap_or(options.markersize);
                    options.linestyle = path.linestyle;
                    options.markeredgecolor = path.markeredgecolor;
                    options.zorder = path.zorder.unwrap_or(defaults.trajectory_zorder);

                    traj_path(backend, &path.lons, &path.lats, &options)?;
                    DrawnLayer::Path
                }
                SceneLayer::Contour(contour) => {
                    let data = grid("Contour data", &contour.data)?;

                    let mut options = defaults.contour_options();
                    options.filled = contour.filled.unwrap_or(options.filled);
                    options.vmin = contour.vmin;
                    options.vmax = contour.vmax;
                    options.steps = contour.steps.unwrap_or(options.steps);
                    options.levels = contour.levels.clone();
                    options.colors = contour.colors.clone();
                    if let Some(colormap) = &contour.colormap {
                        options.colormap = colormap.clone();
                    }
                    options.zorder = contour.zorder.unwrap_or(options.zorder);

                    let mut set = meteo_contouring(backend, data.view(), contour.coordinates()?, &options)?;

                    if let Some(adjust) = &contour.adjust {
                        let adjust_options = AdjustOptions {
                            colors: adjust.colors.clone(),
                            othercontours_visible: adjust.othercontours_visible,
                            style: adjust.style.clone(),
                        };
                        adjust_contourparams(backend, &mut set, &adjust.contours, &adjust_options)?;
                    }
                    DrawnLayer::Contour(set)
                }
            };
            drawn.push(result);
        }

        Ok(drawn)
    }

    /// Build the scene's colorbar from the drawn layers, if it asks for one
    pub fn colorbar(
        &self,
        drawn: &[DrawnLayer],
        decoration: &ColorbarDecoration,
    ) -> Result<Option<Colorbar>> {
        let Some(settings) = &self.colorbar else {
            return Ok(None);
        };
        let decoration = settings.decoration.clone().unwrap_or_else(|| decoration.clone());

        let cbar = match drawn.get(settings.layer) {
            Some(DrawnLayer::Scatter(collection)) => Self::build_colorbar(settings, collection, decoration)?,
            Some(DrawnLayer::Contour(set)) => Self::build_colorbar(settings, set, decoration)?,
            Some(DrawnLayer::Path) => {
                return Err(TrajmapError::configuration(format!(
                    "Colorbar layer {} is a path and has no colors to show",
                    settings.layer
                )))
            }
            None => {
                return Err(TrajmapError::configuration(format!(
                    "Colorbar layer {} does not exist ({} layers drawn)",
                    settings.layer,
                    drawn.len()
                )))
            }
        };
        Ok(Some(cbar))
    }

    fn build_colorbar<M>(
        settings: &SceneColorbar,
        mappable: &M,
        decoration: ColorbarDecoration,
    ) -> Result<Colorbar>
    where
        M: ScalarMappable,
    {
        match settings.rect {
            Some(rect) => {
                let options = CaxOptions {
                    orientation: settings.orientation,
                    reverse: settings.reverse,
                    extend: settings.extend,
                    decoration,
                };
                let (_, cbar) = make_cax_cbar(rect, mappable, &options)?;
                Ok(cbar)
            }
            None => {
                let defaults = ColorbarOptions::default();
                let options = ColorbarOptions {
                    orientation: settings.orientation,
                    aspect: settings.aspect.unwrap_or(defaults.aspect),
                    shrink: settings.shrink.unwrap_or(defaults.shrink),
                    reverse: settings.reverse,
                    decoration,
                };
                let mut cbar = make_cbar(mappable, &options)?;
                cbar.extend = settings.extend;
                Ok(cbar)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalization;
    use crate::plotting::testing::RecordingBackend;

    const SCENE: &str = r#"{
        "extent": [-130, 20, -60, 55],
        "layers": [
            {"type": "contour", "data": [[1, 2, 3], [4, null, 6]],
             "lons": [-120, -100, -80], "lats": [50, 30], "steps": 6,
             "adjust": {"contours": [2.0], "colors": ["red"], "othercontours_visible": false}},
            {"type": "scatter", "data": [850, 700, 500], "lons": [-100, -95, -90],
             "lats": [40, 42, 44], "cnormalize": "boundary", "levels": 4},
            {"type": "path", "lons": [-100, -95, -90], "lats": [40, 42, 44],
             "color": "black", "linestyle": "--", "marker": "o"}
        ],
        "colorbar": {"layer": 1, "orientation": "vertical", "extend": "both"}
    }"#;

    #[test]
    fn test_parse_scene() {
        let scene: Scene = serde_json::from_str(SCENE).unwrap();
        assert_eq!(scene.layers.len(), 3);
        assert_eq!(
            scene.layers.iter().map(SceneLayer::kind).collect::<Vec<_>>(),
            vec!["contour", "scatter", "path"]
        );
        let SceneLayer::Contour(contour) = &scene.layers[0] else {
            panic!("expected a contour layer");
        };
        assert_eq!(contour.data[1][1], None);
        assert_eq!(scene.extent.unwrap().min_lon, -130.0);
    }

    #[test]
    fn test_unknown_mode_fails_to_parse() {
        let json = r#"{"layers": [{"type": "scatter", "data": [1], "lons": [0], "lats": [0],
                       "cnormalize": "bondary"}]}"#;
        assert!(serde_json::from_str::<Scene>(json).is_err());
    }

    #[test]
    fn test_draw_scene() {
        let scene: Scene = serde_json::from_str(SCENE).unwrap();
        let mut backend = RecordingBackend::default();
        let drawn = scene.draw(&mut backend, &PlotDefaults::default()).unwrap();

        assert_eq!(drawn.len(), 3);
        assert_eq!(backend.contours.len(), 1);
        assert_eq!(backend.scatters.len(), 1);
        assert_eq!(backend.paths.len(), 1);
        assert_eq!(backend.restyled, 1);

        let DrawnLayer::Contour(set) = &drawn[0] else {
            panic!("expected a contour set");
        };
        assert_eq!(set.levels, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(set.collections[1].color, Rgba::rgb(255, 0, 0));
        assert_eq!(set.collections[0].alpha, 0.0);

        let scatter = &backend.scatters[0];
        assert!(matches!(scatter.norm, Some(Normalization::Boundary(_))));
        assert_eq!(scatter.zorder, 19);
    }

    #[test]
    fn test_scene_colorbar() {
        let scene: Scene = serde_json::from_str(SCENE).unwrap();
        let mut backend = RecordingBackend::default();
        let drawn = scene.draw(&mut backend, &PlotDefaults::default()).unwrap();

        let cbar = scene
            .colorbar(&drawn, &ColorbarDecoration::default())
            .unwrap()
            .unwrap();
        assert_eq!(cbar.orientation, Orientation::Vertical);
        assert_eq!(cbar.extend, Extend::Both);
        assert_eq!(cbar.boundaries.as_ref().map(Vec::len), Some(4));

        let mut pointing_at_path = scene.clone();
        if let Some(colorbar) = pointing_at_path.colorbar.as_mut() {
            colorbar.layer = 2;
        }
        assert!(pointing_at_path
            .colorbar(&drawn, &ColorbarDecoration::default())
            .is_err());
    }

    #[test]
    fn test_ragged_grid_is_shape_error() {
        let json = r#"{"layers": [{"type": "contour", "data": [[1, 2], [3]],
                       "lons": [0, 1], "lats": [0, 1]}]}"#;
        let scene: Scene = serde_json::from_str(json).unwrap();
        let mut backend = RecordingBackend::default();
        assert!(matches!(
            scene.draw(&mut backend, &PlotDefaults::default()),
            Err(TrajmapError::Shape { .. })
        ));
    }

    #[test]
    fn test_extent_fitted_around_layers() {
        let json = r#"{"layers": [{"type": "path", "lons": [10, 20], "lats": [40, 50], "color": "red"}]}"#;
        let scene: Scene = serde_json::from_str(json).unwrap();
        let extent = scene.extent_or_fit().unwrap();
        assert_eq!(extent.min_lon, 8.0);
        assert_eq!(extent.max_lat, 52.0);

        let empty: Scene = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.extent_or_fit().unwrap(), MapExtent::global());
    }
}
