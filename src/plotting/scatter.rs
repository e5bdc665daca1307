//! Color-mapped trajectory scatter plots.

use tracing::debug;

use crate::colormaps::{get_colormap, Rgba};
use crate::error::{Result, TrajmapError};
use crate::normalize::{
    scale_marker_sizes, select_normalization, ColorNorm, SizeNorm, DEFAULT_BOUNDARY_LEVELS,
};
use crate::render::{MapBackend, MarkerSizes, PathCollection, ScatterRequest};
use crate::samples::SampleCollection;

/// Options for [`traj_scatter`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterOptions {
    pub zorder: i32,
    /// Colormap name, `_r` suffix for the reversed map
    pub colormap: String,
    pub edgecolor: Option<Rgba>,
    /// Marker size in points squared; multiplies size data when present
    pub size: f64,
    pub cnormalize: ColorNorm,
    pub snormalize: SizeNorm,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    /// Boundary count for boundary normalization
    pub levels: usize,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            zorder: 19,
            colormap: "blues".to_string(),
            edgecolor: None,
            size: 25.0,
            cnormalize: ColorNorm::None,
            snormalize: SizeNorm::None,
            vmin: None,
            vmax: None,
            levels: DEFAULT_BOUNDARY_LEVELS,
        }
    }
}

/// Scatter-plot trajectory samples colored by their data values.
///
/// Returns the mappable for building colorbars.
pub fn traj_scatter<B>(
    backend: &mut B,
    samples: &SampleCollection,
    options: &ScatterOptions,
) -> Result<PathCollection>
where
    B: MapBackend + ?Sized,
{
    samples.validate()?;
    if !options.size.is_finite() || options.size < 0.0 {
        return Err(TrajmapError::configuration(format!(
            "Marker size must be a non-negative number, got {}",
            options.size
        )));
    }

    let colormap = get_colormap(&options.colormap)?;
    let selected = select_normalization(
        &samples.data,
        options.cnormalize,
        options.vmin,
        options.vmax,
        Some(options.levels),
    )?;

    let sizes = match &samples.sizes {
        Some(sizedata) => {
            MarkerSizes::PerPoint(scale_marker_sizes(sizedata, options.snormalize, options.size)?)
        }
        None => MarkerSizes::Uniform(options.size),
    };

    debug!(
        samples = samples.len(),
        cnormalize = %options.cnormalize,
        snormalize = %options.snormalize,
        colormap = %options.colormap,
        "Scattering trajectory samples"
    );

    backend.scatter(ScatterRequest {
        lons: &samples.lons,
        lats: &samples.lats,
        values: &selected.values,
        sizes,
        colormap,
        norm: selected.norm,
        vmin: selected.vmin,
        vmax: selected.vmax,
        edgecolor: options.edgecolor,
        zorder: options.zorder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalization;
    use crate::plotting::testing::RecordingBackend;

    fn samples() -> SampleCollection {
        SampleCollection::new(vec![1.0, 4.0, 9.0], vec![0.0, 1.0, 2.0], vec![50.0, 51.0, 52.0])
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let options = ScatterOptions::default();
        assert_eq!(options.zorder, 19);
        assert_eq!(options.colormap, "blues");
        assert_eq!(options.size, 25.0);
        assert_eq!(options.levels, 11);
    }

    #[test]
    fn test_uniform_size_without_size_data() {
        let mut backend = RecordingBackend::default();
        let collection = traj_scatter(&mut backend, &samples(), &ScatterOptions::default()).unwrap();
        assert_eq!(collection.len, 3);

        let call = &backend.scatters[0];
        assert_eq!(call.sizes, MarkerSizes::Uniform(25.0));
        assert_eq!(call.values, vec![1.0, 4.0, 9.0]);
        assert!(call.norm.is_none());
        assert_eq!(call.zorder, 19);
    }

    #[test]
    fn test_size_data_is_scaled() {
        let mut backend = RecordingBackend::default();
        let samples = samples().with_sizes(vec![1.0, 4.0, 9.0]).unwrap();
        let options = ScatterOptions {
            size: 10.0,
            snormalize: SizeNorm::Sqrt,
            ..Default::default()
        };
        traj_scatter(&mut backend, &samples, &options).unwrap();
        assert_eq!(
            backend.scatters[0].sizes,
            MarkerSizes::PerPoint(vec![10.0, 20.0, 30.0])
        );
    }

    #[test]
    fn test_boundary_normalization_reaches_backend() {
        let mut backend = RecordingBackend::default();
        let options = ScatterOptions {
            cnormalize: ColorNorm::Boundary,
            levels: 5,
            ..Default::default()
        };
        traj_scatter(&mut backend, &samples(), &options).unwrap();

        let call = &backend.scatters[0];
        let Some(Normalization::Boundary(norm)) = &call.norm else {
            panic!("expected boundary normalization");
        };
        assert_eq!(norm.boundaries(), &[1.0, 3.0, 5.0, 7.0, 9.0]);
        assert_eq!(call.vmin, Some(1.0));
        assert_eq!(call.vmax, Some(9.0));
    }

    #[test]
    fn test_sqrt_transforms_colors() {
        let mut backend = RecordingBackend::default();
        let options = ScatterOptions {
            cnormalize: ColorNorm::Sqrt,
            ..Default::default()
        };
        traj_scatter(&mut backend, &samples(), &options).unwrap();
        assert_eq!(backend.scatters[0].values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_errors_before_drawing() {
        let mut backend = RecordingBackend::default();

        let bad_colormap = ScatterOptions {
            colormap: "nope".to_string(),
            ..Default::default()
        };
        assert!(traj_scatter(&mut backend, &samples(), &bad_colormap).is_err());

        let mut mismatched = samples();
        mismatched.lats.pop();
        assert!(matches!(
            traj_scatter(&mut backend, &mismatched, &ScatterOptions::default()),
            Err(TrajmapError::Shape { .. })
        ));

        let negative = SampleCollection::new(vec![-1.0], vec![0.0], vec![0.0]).unwrap();
        let log = ScatterOptions {
            cnormalize: ColorNorm::Log,
            ..Default::default()
        };
        assert!(matches!(
            traj_scatter(&mut backend, &negative, &log),
            Err(TrajmapError::Domain { .. })
        ));

        assert!(backend.scatters.is_empty());
    }
}
