//! Pixel-level drawing primitives on RGBA images.
//!
//! Coordinates are continuous pixel positions; pixel `(x, y)` covers
//! `[x, x+1) x [y, y+1)` and is sampled at its center.

use image::RgbaImage;

/// Composite `color` over the pixel at `(x, y)`; out-of-canvas writes are ignored
pub fn blend_pixel(img: &mut RgbaImage, x: i64, y: i64, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let alpha = color[3] as f64 / 255.0;
    if alpha <= 0.0 {
        return;
    }

    let pixel = img.get_pixel_mut(x as u32, y as u32);
    if alpha >= 1.0 {
        pixel.0 = color;
        return;
    }

    let dst_alpha = pixel.0[3] as f64 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    for c in 0..3 {
        let src = color[c] as f64 * alpha;
        let dst = pixel.0[c] as f64 * dst_alpha * (1.0 - alpha);
        pixel.0[c] = ((src + dst) / out_alpha).round().clamp(0.0, 255.0) as u8;
    }
    pixel.0[3] = (out_alpha * 255.0).round() as u8;
}

/// Pixel index range whose centers fall inside `[lo, hi]`, clipped to `0..size`
fn pixel_span(lo: f64, hi: f64, size: u32) -> std::ops::Range<i64> {
    let start = (lo - 0.5).ceil().max(0.0) as i64;
    let end = ((hi - 0.5).floor() + 1.0).min(size as f64) as i64;
    start..end.max(start)
}

/// Filled disk of radius `r` centered at `(cx, cy)`
pub fn fill_disk(img: &mut RgbaImage, cx: f64, cy: f64, r: f64, color: [u8; 4]) {
    if !(r.is_finite() && r > 0.0 && cx.is_finite() && cy.is_finite()) {
        return;
    }
    // Tiny markers still cover the pixel they sit on
    let r = r.max(0.5);
    for y in pixel_span(cy - r, cy + r, img.height()) {
        for x in pixel_span(cx - r, cx + r, img.width()) {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r * r {
                blend_pixel(img, x, y, color);
            }
        }
    }
}

/// One pixel wide outline of a disk of radius `r`
pub fn stroke_circle(img: &mut RgbaImage, cx: f64, cy: f64, r: f64, color: [u8; 4]) {
    if !(r.is_finite() && r > 0.0 && cx.is_finite() && cy.is_finite()) {
        return;
    }
    let inner = (r - 1.0).max(0.0);
    for y in pixel_span(cy - r, cy + r, img.height()) {
        for x in pixel_span(cx - r, cx + r, img.width()) {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let d2 = dx * dx + dy * dy;
            if d2 <= r * r && d2 >= inner * inner {
                blend_pixel(img, x, y, color);
            }
        }
    }
}

/// Axis-aligned filled rectangle with corners `(x0, y0)` and `(x1, y1)`
pub fn fill_rect(img: &mut RgbaImage, x0: f64, y0: f64, x1: f64, y1: f64, color: [u8; 4]) {
    let (x0, x1) = (x0.min(x1), x0.max(x1));
    let (y0, y1) = (y0.min(y1), y0.max(y1));
    for y in pixel_span(y0, y1, img.height()) {
        for x in pixel_span(x0, x1, img.width()) {
            blend_pixel(img, x, y, color);
        }
    }
}

/// Fill a triangle, coloring each covered pixel from the barycentric
/// interpolation of the vertex values. `shade` returns `None` to skip a pixel.
///
/// Pixels exactly on an edge belong to one side only, so meshes of
/// triangles cover every pixel once.
pub fn fill_triangle<F>(img: &mut RgbaImage, vertices: [(f64, f64); 3], values: [f64; 3], shade: F)
where
    F: Fn(f64) -> Option<[u8; 4]>,
{
    if !vertices.iter().all(|(x, y)| x.is_finite() && y.is_finite()) {
        return;
    }

    let mut v = vertices;
    let mut vals = values;
    let mut area = edge(v[0], v[1], v[2]);
    if area == 0.0 {
        return;
    }
    if area < 0.0 {
        v.swap(1, 2);
        vals.swap(1, 2);
        area = -area;
    }

    let min_x = v[0].0.min(v[1].0).min(v[2].0);
    let max_x = v[0].0.max(v[1].0).max(v[2].0);
    let min_y = v[0].1.min(v[1].1).min(v[2].1);
    let max_y = v[0].1.max(v[1].1).max(v[2].1);

    // Edge i is the one opposite vertex i
    let edges = [(v[1], v[2]), (v[2], v[0]), (v[0], v[1])];
    let owns_boundary = edges.map(|(a, b)| {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        dy > 0.0 || (dy == 0.0 && dx < 0.0)
    });

    for y in pixel_span(min_y, max_y, img.height()) {
        'pixel: for x in pixel_span(min_x, max_x, img.width()) {
            let p = (x as f64 + 0.5, y as f64 + 0.5);
            let mut weights = [0.0; 3];
            for i in 0..3 {
                let e = edge(edges[i].0, edges[i].1, p);
                if e < 0.0 || (e == 0.0 && !owns_boundary[i]) {
                    continue 'pixel;
                }
                weights[i] = e / area;
            }
            let value = weights[0] * vals[0] + weights[1] * vals[1] + weights[2] * vals[2];
            if let Some(color) = shade(value) {
                blend_pixel(img, x, y, color);
            }
        }
    }
}

fn edge(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// Stroke a polyline of the given width. `dashes` holds alternating on/off
/// lengths in pixels; an empty slice draws a solid line.
pub fn stroke_polyline(
    img: &mut RgbaImage,
    points: &[(f64, f64)],
    width: f64,
    color: [u8; 4],
    dashes: &[f64],
) {
    if points.len() < 2 || !(width.is_finite() && width > 0.0) {
        return;
    }
    let half = (width / 2.0).max(0.5);
    let period: f64 = dashes.iter().sum();
    let mut travelled = 0.0;

    for segment in points.windows(2) {
        let (ax, ay) = segment[0];
        let (bx, by) = segment[1];
        if !(ax.is_finite() && ay.is_finite() && bx.is_finite() && by.is_finite()) {
            continue;
        }
        let dx = bx - ax;
        let dy = by - ay;
        let length = (dx * dx + dy * dy).sqrt();

        for y in pixel_span(ay.min(by) - half, ay.max(by) + half, img.height()) {
            for x in pixel_span(ax.min(bx) - half, ax.max(bx) + half, img.width()) {
                let px = x as f64 + 0.5;
                let py = y as f64 + 0.5;
                let t = if length > 0.0 {
                    (((px - ax) * dx + (py - ay) * dy) / (length * length)).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let cx = ax + t * dx - px;
                let cy = ay + t * dy - py;
                if cx * cx + cy * cy > half * half {
                    continue;
                }
                if period > 0.0 && !dash_on(dashes, period, travelled + t * length) {
                    continue;
                }
                blend_pixel(img, x, y, color);
            }
        }

        travelled += length;
    }
}

fn dash_on(dashes: &[f64], period: f64, position: f64) -> bool {
    let mut phase = position.rem_euclid(period);
    for (i, length) in dashes.iter().enumerate() {
        if phase < *length {
            return i % 2 == 0;
        }
        phase -= length;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    fn count(img: &RgbaImage, color: [u8; 4]) -> usize {
        img.pixels().filter(|p| p.0 == color).count()
    }

    #[test]
    fn test_blend_pixel_half_alpha() {
        let mut img = blank(1, 1);
        blend_pixel(&mut img, 0, 0, [0, 0, 0, 128]);
        let pixel = img.get_pixel(0, 0).0;
        assert!((pixel[0] as i32 - 127).abs() <= 1);
        assert_eq!(pixel[3], 255);

        // Out of bounds writes are ignored
        blend_pixel(&mut img, -1, 0, RED);
        blend_pixel(&mut img, 0, 5, RED);
    }

    #[test]
    fn test_fill_disk_area() {
        let mut img = blank(40, 40);
        fill_disk(&mut img, 20.0, 20.0, 5.0, RED);
        let area = count(&img, RED) as f64;
        let expected = std::f64::consts::PI * 25.0;
        assert!((area - expected).abs() < expected * 0.15, "area = {}", area);
        assert_eq!(img.get_pixel(20, 20).0, RED);
        assert_ne!(img.get_pixel(0, 0).0, RED);
    }

    #[test]
    fn test_fill_triangle_shared_edge_once() {
        let mut img = blank(10, 10);
        let half_black = |_: f64| Some([0, 0, 0, 128]);
        // Two triangles covering the square; the diagonal must not be darker
        fill_triangle(&mut img, [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)], [0.0; 3], half_black);
        fill_triangle(&mut img, [(10.0, 0.0), (10.0, 10.0), (0.0, 10.0)], [0.0; 3], half_black);
        let first = img.get_pixel(2, 2).0;
        let diagonal = img.get_pixel(4, 5).0;
        assert_eq!(first, diagonal);
    }

    #[test]
    fn test_fill_triangle_interpolates_values() {
        let mut img = blank(10, 10);
        fill_triangle(
            &mut img,
            [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)],
            [0.0, 10.0, 0.0],
            |v| if v > 5.0 { Some(RED) } else { None },
        );
        assert_eq!(img.get_pixel(8, 0).0, RED);
        assert_ne!(img.get_pixel(1, 1).0, RED);
    }

    #[test]
    fn test_stroke_polyline_solid_and_dashed() {
        let mut solid = blank(50, 5);
        stroke_polyline(&mut solid, &[(0.0, 2.5), (50.0, 2.5)], 1.0, RED, &[]);
        assert_eq!(count(&solid, RED), 50);

        let mut dashed = blank(50, 5);
        stroke_polyline(&mut dashed, &[(0.0, 2.5), (50.0, 2.5)], 1.0, RED, &[5.0, 5.0]);
        let drawn = count(&dashed, RED);
        assert!(drawn > 15 && drawn < 35, "drawn = {}", drawn);
    }

    #[test]
    fn test_dash_on() {
        assert!(dash_on(&[2.0, 1.0], 3.0, 0.5));
        assert!(!dash_on(&[2.0, 1.0], 3.0, 2.5));
        assert!(dash_on(&[2.0, 1.0], 3.0, 3.5));
    }
}
