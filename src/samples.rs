//! Trajectory sample collections.

use crate::error::{Result, TrajmapError};

/// Values paired positionally with longitudes and latitudes, with optional
/// per-point marker-size data. NaN marks a missing value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleCollection {
    pub data: Vec<f64>,
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    pub sizes: Option<Vec<f64>>,
}

impl SampleCollection {
    pub fn new(data: Vec<f64>, lons: Vec<f64>, lats: Vec<f64>) -> Result<Self> {
        let samples = Self {
            data,
            lons,
            lats,
            sizes: None,
        };
        samples.validate()?;
        Ok(samples)
    }

    /// Attach marker-size data of the same length
    pub fn with_sizes(mut self, sizes: Vec<f64>) -> Result<Self> {
        self.sizes = Some(sizes);
        self.validate()?;
        Ok(self)
    }

    /// Check that every sequence has the same length
    pub fn validate(&self) -> Result<()> {
        let len = self.data.len();
        if self.lons.len() != len || self.lats.len() != len {
            return Err(TrajmapError::shape(format!(
                "Sample lengths differ: {} values, {} lons, {} lats",
                len,
                self.lons.len(),
                self.lats.len()
            )));
        }
        if let Some(sizes) = &self.sizes {
            if sizes.len() != len {
                return Err(TrajmapError::shape(format!(
                    "Got {} marker sizes for {} samples",
                    sizes.len(),
                    len
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_lengths() {
        let samples = SampleCollection::new(vec![1.0, 2.0], vec![0.0, 1.0], vec![5.0, 6.0]).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(!samples.is_empty());
        assert!(samples.with_sizes(vec![1.0, 1.0]).is_ok());
    }

    #[test]
    fn test_length_mismatch_is_shape_error() {
        let result = SampleCollection::new(vec![1.0, 2.0, 3.0], vec![0.0, 1.0], vec![5.0, 6.0, 7.0]);
        assert!(matches!(result, Err(TrajmapError::Shape { .. })));

        let samples = SampleCollection::new(vec![1.0], vec![0.0], vec![0.0]).unwrap();
        assert!(matches!(
            samples.with_sizes(vec![1.0, 2.0]),
            Err(TrajmapError::Shape { .. })
        ));
    }
}
