//! Scene documents with known layouts for end-to-end tests.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// A 5x5 field increasing west to east, over 10..14 E and 40..44 N
pub fn gradient_field() -> Value {
    let rows: Vec<Vec<f64>> = (0..5)
        .map(|_| (0..5).map(|col| col as f64 * 10.0).collect())
        .collect();
    json!(rows)
}

/// A trajectory of `n` points heading north-east from (10.5, 40.5)
pub fn trajectory(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let lons = (0..n).map(|i| 10.5 + i as f64 * 0.5).collect();
    let lats = (0..n).map(|i| 40.5 + i as f64 * 0.4).collect();
    let pressure = (0..n).map(|i| 900.0 - i as f64 * 50.0).collect();
    (lons, lats, pressure)
}

/// Contour, scatter and path layers with a colorbar on the scatter layer
pub fn full_scene() -> Value {
    let (lons, lats, pressure) = trajectory(6);
    json!({
        "extent": [10, 40, 14, 44],
        "layers": [
            {
                "type": "contour",
                "data": gradient_field(),
                "lons": [10, 11, 12, 13, 14],
                "lats": [44, 43, 42, 41, 40],
                "levels": [0, 10, 20, 30, 40],
                "colormap": "viridis"
            },
            {
                "type": "path",
                "lons": lons,
                "lats": lats,
                "color": "black",
                "linewidth": 2,
                "linestyle": "--"
            },
            {
                "type": "scatter",
                "data": pressure,
                "lons": lons,
                "lats": lats,
                "cnormalize": "boundary",
                "levels": 6,
                "size": 64
            }
        ],
        "colorbar": {"layer": 2, "extend": "both"}
    })
}

/// Write `scene` as `name` inside `dir`
pub fn write_scene(dir: &Path, name: &str, scene: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(scene).expect("scene serializes"))
        .expect("scene file written");
    path
}
