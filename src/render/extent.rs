//! Geographic extent of a map and its mapping onto pixels.
//!
//! The reference backend uses a plain equirectangular (plate carrée)
//! placement; anything fancier belongs to a real cartographic backend.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, TrajmapError};

/// Longitude/latitude bounding box of a map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct MapExtent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl MapExtent {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        let param = |message: String| TrajmapError::InvalidParameter {
            param: "extent".to_string(),
            message,
        };

        if ![min_lon, min_lat, max_lon, max_lat].iter().all(|v| v.is_finite()) {
            return Err(param("Extent bounds must be finite".to_string()));
        }

        // Latitude must be in the range -90 to 90
        if !(-90.0..=90.0).contains(&min_lat) || !(-90.0..=90.0).contains(&max_lat) {
            return Err(param("Latitude must be in the range -90 to 90".to_string()));
        }
        if min_lat >= max_lat {
            return Err(param(format!(
                "min_lat ({}) must be < max_lat ({})",
                min_lat, max_lat
            )));
        }
        if min_lon >= max_lon || max_lon - min_lon > 360.0 {
            return Err(param(format!(
                "Longitude span ({}, {}) must be increasing and at most 360 degrees",
                min_lon, max_lon
            )));
        }

        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// The whole globe, -180..180 by -90..90
    pub fn global() -> Self {
        Self {
            min_lon: -180.0,
            min_lat: -90.0,
            max_lon: 180.0,
            max_lat: 90.0,
        }
    }

    /// Smallest extent containing every finite point, padded by `margin` degrees
    pub fn around(lons: &[f64], lats: &[f64], margin: f64) -> Result<Self> {
        let bounds = |values: &[f64]| crate::normalize::finite_bounds(values);
        let (min_lon, max_lon) = bounds(lons)
            .ok_or_else(|| TrajmapError::shape("No finite longitudes to fit an extent around"))?;
        let (min_lat, max_lat) = bounds(lats)
            .ok_or_else(|| TrajmapError::shape("No finite latitudes to fit an extent around"))?;

        let margin = margin.max(1e-6);
        Self::new(
            (min_lon - margin).max(max_lon - 360.0 + margin),
            (min_lat - margin).max(-90.0),
            max_lon + margin,
            (max_lat + margin).min(90.0),
        )
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Bring a longitude into the window starting at `min_lon`.
    ///
    /// Data in 0..360 and -180..180 conventions land in the same place.
    pub fn wrap_longitude(&self, lon: f64) -> f64 {
        if lon >= self.min_lon && lon <= self.max_lon {
            return lon;
        }
        let shifted = self.min_lon + (lon - self.min_lon).rem_euclid(360.0);
        // Points just west of the window stay west instead of wrapping to the far east
        if shifted > self.max_lon && shifted - 360.0 > self.min_lon - self.lon_span() {
            shifted - 360.0
        } else {
            shifted
        }
    }

    /// Continuous pixel coordinates of a point on a `width` x `height` canvas,
    /// north up. Points outside the extent map outside the canvas.
    pub fn project(&self, lon: f64, lat: f64, width: u32, height: u32) -> (f64, f64) {
        let lon = self.wrap_longitude(lon);
        let x = (lon - self.min_lon) / self.lon_span() * width as f64;
        let y = (self.max_lat - lat) / self.lat_span() * height as f64;
        (x, y)
    }
}

impl TryFrom<[f64; 4]> for MapExtent {
    type Error = TrajmapError;

    fn try_from(value: [f64; 4]) -> std::result::Result<Self, Self::Error> {
        MapExtent::new(value[0], value[1], value[2], value[3])
    }
}

impl From<MapExtent> for [f64; 4] {
    fn from(value: MapExtent) -> Self {
        [value.min_lon, value.min_lat, value.max_lon, value.max_lat]
    }
}

impl FromStr for MapExtent {
    type Err = TrajmapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_bbox(s)
    }
}

/// Parse a bounding box string "min_lon,min_lat,max_lon,max_lat"
pub fn parse_bbox(bbox: &str) -> Result<MapExtent> {
    let parts: Vec<&str> = bbox.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(TrajmapError::InvalidParameter {
            param: "bbox".to_string(),
            message: "Bounding box must be in format 'min_lon,min_lat,max_lon,max_lat'".to_string(),
        });
    }

    let names = ["min_lon", "min_lat", "max_lon", "max_lat"];
    let mut values = [0.0; 4];
    for (i, part) in parts.iter().enumerate() {
        values[i] = part
            .parse::<f64>()
            .map_err(|_| TrajmapError::InvalidParameter {
                param: "bbox".to_string(),
                message: format!("Invalid {}: {}", names[i], part),
            })?;
    }

    MapExtent::new(values[0], values[1], values[2], values[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let extent = parse_bbox("10.5,20.5,30.5,40.5").unwrap();
        assert_eq!(extent.min_lon, 10.5);
        assert_eq!(extent.min_lat, 20.5);
        assert_eq!(extent.max_lon, 30.5);
        assert_eq!(extent.max_lat, 40.5);

        // Invalid format (too few parts)
        assert!(parse_bbox("10.5,20.5,30.5").is_err());

        // Invalid numbers
        assert!(parse_bbox("10.5,20.5,not_a_number,40.5").is_err());

        // Latitude out of range
        assert!(parse_bbox("10.5,-91.0,30.5,40.5").is_err());
        assert!(parse_bbox("10.5,20.5,30.5,91.0").is_err());

        // Invalid latitude order (min > max)
        assert!(parse_bbox("10.5,40.5,30.5,20.5").is_err());
    }

    #[test]
    fn test_project_corners() {
        let extent = MapExtent::new(-10.0, 40.0, 10.0, 60.0).unwrap();
        assert_eq!(extent.project(-10.0, 60.0, 200, 100), (0.0, 0.0));
        assert_eq!(extent.project(10.0, 40.0, 200, 100), (200.0, 100.0));
        assert_eq!(extent.project(0.0, 50.0, 200, 100), (100.0, 50.0));
    }

    #[test]
    fn test_wrap_longitude() {
        let extent = MapExtent::new(-180.0, -90.0, 180.0, 90.0).unwrap();
        assert_eq!(extent.wrap_longitude(270.0), -90.0);
        assert_eq!(extent.wrap_longitude(45.0), 45.0);

        let pacific = MapExtent::new(120.0, -30.0, 240.0, 30.0).unwrap();
        assert_eq!(pacific.wrap_longitude(-170.0), 190.0);
        assert_eq!(pacific.wrap_longitude(150.0), 150.0);
    }

    #[test]
    fn test_extent_around_points() {
        let extent = MapExtent::around(&[-100.0, -90.0], &[30.0, 45.0], 2.0).unwrap();
        assert_eq!(extent.min_lon, -102.0);
        assert_eq!(extent.max_lon, -88.0);
        assert_eq!(extent.min_lat, 28.0);
        assert_eq!(extent.max_lat, 47.0);

        assert!(MapExtent::around(&[], &[], 1.0).is_err());
    }

    #[test]
    fn test_extent_serde() {
        let extent: MapExtent = serde_json::from_str("[-20, 30, 40, 70]").unwrap();
        assert_eq!(extent, MapExtent::new(-20.0, 30.0, 40.0, 70.0).unwrap());
        assert!(serde_json::from_str::<MapExtent>("[40, 30, -20, 70]").is_err());
    }
}
