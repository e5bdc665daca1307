//! Contour line extraction with marching squares.
//!
//! Works in fractional grid-index space: `x` is the column, `y` the row.
//! Callers map index positions to map coordinates afterwards.

use ndarray::ArrayView2;

/// A point in grid-index space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

/// A line segment between two grid points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: GridPoint,
    pub end: GridPoint,
}

/// Marching squares over `data` at `level`.
///
/// Cells touching a non-finite value are skipped.
pub fn march_squares(data: ArrayView2<f64>, level: f64) -> Vec<Segment> {
    let (rows, cols) = data.dim();
    if rows < 2 || cols < 2 || !level.is_finite() {
        return Vec::new();
    }

    let mut segments = Vec::new();

    for y in 0..rows - 1 {
        for x in 0..cols - 1 {
            let tl = data[[y, x]];
            let tr = data[[y, x + 1]];
            let br = data[[y + 1, x + 1]];
            let bl = data[[y + 1, x]];

            if !(tl.is_finite() && tr.is_finite() && br.is_finite() && bl.is_finite()) {
                continue;
            }

            let mut case = 0u8;
            if tl >= level {
                case |= 1;
            }
            if tr >= level {
                case |= 2;
            }
            if br >= level {
                case |= 4;
            }
            if bl >= level {
                case |= 8;
            }
            if case == 0 || case == 15 {
                continue;
            }

            let (fx, fy) = (x as f64, y as f64);
            let top = crossing((fx, fy), (fx + 1.0, fy), tl, tr, level);
            let right = crossing((fx + 1.0, fy), (fx + 1.0, fy + 1.0), tr, br, level);
            let bottom = crossing((fx, fy + 1.0), (fx + 1.0, fy + 1.0), bl, br, level);
            let left = crossing((fx, fy), (fx, fy + 1.0), tl, bl, level);

            let center_above = (tl + tr + br + bl) / 4.0 >= level;
            let pairs: &[(GridPoint, GridPoint)] = match case {
                1 | 14 => &[(left, top)],
                2 | 13 => &[(top, right)],
                3 | 12 => &[(left, right)],
                4 | 11 => &[(right, bottom)],
                6 | 9 => &[(top, bottom)],
                7 | 8 => &[(left, bottom)],
                // Saddles: the cell center decides which corners connect
                5 if center_above => &[(left, bottom), (top, right)],
                5 => &[(left, top), (right, bottom)],
                10 if center_above => &[(left, top), (right, bottom)],
                10 => &[(left, bottom), (top, right)],
                _ => &[],
            };

            segments.extend(pairs.iter().map(|&(start, end)| Segment { start, end }));
        }
    }

    segments
}

/// Where `level` crosses the edge from `a` (value `va`) to `b` (value `vb`)
fn crossing(a: (f64, f64), b: (f64, f64), va: f64, vb: f64, level: f64) -> GridPoint {
    let t = if (vb - va).abs() > f64::EPSILON {
        ((level - va) / (vb - va)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    GridPoint {
        x: a.0 + t * (b.0 - a.0),
        y: a.1 + t * (b.1 - a.1),
    }
}
