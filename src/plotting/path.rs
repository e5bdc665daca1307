//! Trajectory and cluster path lines.

use tracing::debug;

use crate::colormaps::Rgba;
use crate::error::{Result, TrajmapError};
use crate::render::{LineStyle, MapBackend, Marker, PathRequest};

/// Options for [`traj_path`]
#[derive(Debug, Clone, PartialEq)]
pub struct PathOptions {
    pub color: Rgba,
    pub linewidth: f64,
    pub marker: Option<Marker>,
    /// Marker diameter in points
    pub markersize: f64,
    pub linestyle: LineStyle,
    pub markeredgecolor: Option<Rgba>,
    pub zorder: i32,
}

impl PathOptions {
    pub fn new(color: Rgba, linewidth: f64) -> Self {
        Self {
            color,
            linewidth,
            marker: None,
            markersize: 6.0,
            linestyle: LineStyle::Solid,
            markeredgecolor: None,
            zorder: 19,
        }
    }
}

/// Draw a single-color trajectory path through the given points
pub fn traj_path<B>(backend: &mut B, lons: &[f64], lats: &[f64], options: &PathOptions) -> Result<()>
where
    B: MapBackend + ?Sized,
{
    if lons.len() != lats.len() {
        return Err(TrajmapError::shape(format!(
            "Path needs as many longitudes as latitudes, got {} and {}",
            lons.len(),
            lats.len()
        )));
    }
    for (name, value) in [("linewidth", options.linewidth), ("markersize", options.markersize)] {
        if !value.is_finite() || value < 0.0 {
            return Err(TrajmapError::configuration(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
    }

    debug!(
        vertices = lons.len(),
        linestyle = options.linestyle.as_str(),
        marker = options.marker.map(|m| m.as_str()),
        "Drawing trajectory path"
    );

    backend.plot(PathRequest {
        lons,
        lats,
        color: options.color,
        linewidth: options.linewidth,
        linestyle: options.linestyle,
        marker: options.marker,
        markersize: options.markersize,
        markeredgecolor: options.markeredgecolor,
        zorder: options.zorder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plotting::testing::RecordingBackend;

    #[test]
    fn test_path_passes_style_through() {
        let mut backend = RecordingBackend::default();
        let options = PathOptions {
            marker: Some(Marker::Circle),
            linestyle: LineStyle::Dashed,
            ..PathOptions::new(Rgba::rgb(200, 0, 0), 2.0)
        };
        traj_path(&mut backend, &[0.0, 1.0, 2.0], &[10.0, 11.0, 12.0], &options).unwrap();

        let call = &backend.paths[0];
        assert_eq!(call.lons, vec![0.0, 1.0, 2.0]);
        assert_eq!(call.linewidth, 2.0);
        assert_eq!(call.linestyle, LineStyle::Dashed);
        assert_eq!(call.marker, Some(Marker::Circle));
        assert_eq!(call.zorder, 19);
    }

    #[test]
    fn test_path_length_mismatch() {
        let mut backend = RecordingBackend::default();
        let options = PathOptions::new(Rgba::BLACK, 1.0);
        let result = traj_path(&mut backend, &[0.0, 1.0], &[0.0], &options);
        assert!(matches!(result, Err(TrajmapError::Shape { .. })));
        assert!(backend.paths.is_empty());
    }

    #[test]
    fn test_path_rejects_negative_width() {
        let mut backend = RecordingBackend::default();
        let options = PathOptions::new(Rgba::BLACK, -1.0);
        let result = traj_path(&mut backend, &[0.0], &[0.0], &options);
        assert!(matches!(result, Err(TrajmapError::Configuration { .. })));
    }
}
