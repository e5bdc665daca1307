//! Level sets: evenly spaced boundaries and contour levels.

use ndarray::ArrayView2;

use crate::error::{Result, TrajmapError};

/// Number of contour levels generated between vmin and vmax by default
pub const DEFAULT_CONTOUR_STEPS: usize = 50;

/// `n` evenly spaced values from `start` to `stop` inclusive.
///
/// The last value is exactly `stop`; `n == 1` yields `[start]`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n - 1).map(|i| start + step * i as f64).collect();
            values.push(stop);
            values
        }
    }
}

/// Minimum and maximum of the finite values, if there are any
pub fn finite_bounds<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Fill in missing bounds from the data and check that they are ordered
pub fn resolve_bounds<'a, I>(values: I, vmin: Option<f64>, vmax: Option<f64>) -> Result<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let (lo, hi) = match (vmin, vmax) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => {
            let (data_lo, data_hi) = finite_bounds(values).ok_or_else(|| {
                TrajmapError::configuration(
                    "Cannot derive vmin/vmax: data has no finite values",
                )
            })?;
            (vmin.unwrap_or(data_lo), vmax.unwrap_or(data_hi))
        }
    };

    if !lo.is_finite() || !hi.is_finite() {
        return Err(TrajmapError::configuration(format!(
            "Bounds must be finite, got ({}, {})",
            lo, hi
        )));
    }
    if lo > hi {
        return Err(TrajmapError::configuration(format!(
            "vmin ({}) must be <= vmax ({})",
            lo, hi
        )));
    }

    Ok((lo, hi))
}

/// Contour levels for a data grid.
///
/// Explicit `levels` win and must be strictly increasing; otherwise `steps`
/// levels are spread from `vmin` to `vmax`, each bound defaulting to the
/// grid's finite minimum/maximum.
pub fn contour_levels(
    data: ArrayView2<f64>,
    vmin: Option<f64>,
    vmax: Option<f64>,
    steps: usize,
    levels: Option<&[f64]>,
) -> Result<Vec<f64>> {
    if let Some(levels) = levels {
        if levels.is_empty() {
            return Err(TrajmapError::configuration("Contour levels cannot be empty"));
        }
        if levels.iter().any(|l| !l.is_finite()) {
            return Err(TrajmapError::configuration("Contour levels must be finite"));
        }
        if levels.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TrajmapError::configuration(
                "Contour levels must be strictly increasing",
            ));
        }
        return Ok(levels.to_vec());
    }

    if steps == 0 {
        return Err(TrajmapError::configuration(
            "Contour steps must be at least 1",
        ));
    }

    let (lo, hi) = resolve_bounds(data.iter(), vmin, vmax)?;
    Ok(linspace(lo, hi, steps))
}
