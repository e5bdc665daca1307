//! Coordinate meshes for gridded fields.
//!
//! Gridded data is laid out `(rows, cols) = (latitudes, longitudes)`.

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{Result, TrajmapError};

/// Coordinates of a gridded field
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
    /// One longitude per column and one latitude per row
    Axes { lons: Array1<f64>, lats: Array1<f64> },
    /// Full coordinate grids with the same shape as the data
    Mesh { lons: Array2<f64>, lats: Array2<f64> },
}

impl Coordinates {
    pub fn axes(lons: Vec<f64>, lats: Vec<f64>) -> Self {
        Coordinates::Axes {
            lons: Array1::from(lons),
            lats: Array1::from(lats),
        }
    }
}

/// Expand 1-D axes into coordinate grids of shape `(y.len(), x.len())`
pub fn meshgrid(x: ArrayView1<f64>, y: ArrayView1<f64>) -> (Array2<f64>, Array2<f64>) {
    let shape = (y.len(), x.len());
    let xx = Array2::from_shape_fn(shape, |(_, j)| x[j]);
    let yy = Array2::from_shape_fn(shape, |(i, _)| y[i]);
    (xx, yy)
}

/// Coordinate grids matching a data grid of shape `(rows, cols)`.
///
/// Axes are expanded with [`meshgrid`]; meshes are checked and passed through.
pub fn ensure_mesh(coords: Coordinates, shape: (usize, usize)) -> Result<(Array2<f64>, Array2<f64>)> {
    let (rows, cols) = shape;
    match coords {
        Coordinates::Axes { lons, lats } => {
            if lons.len() != cols || lats.len() != rows {
                return Err(TrajmapError::shape(format!(
                    "Coordinate axes of lengths (lons {}, lats {}) do not match data shape ({}, {})",
                    lons.len(),
                    lats.len(),
                    rows,
                    cols
                )));
            }
            Ok(meshgrid(lons.view(), lats.view()))
        }
        Coordinates::Mesh { lons, lats } => {
            if lons.dim() != shape || lats.dim() != shape {
                return Err(TrajmapError::shape(format!(
                    "Coordinate meshes of shapes {:?} and {:?} do not match data shape ({}, {})",
                    lons.dim(),
                    lats.dim(),
                    rows,
                    cols
                )));
            }
            Ok((lons, lats))
        }
    }
}
