use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;

use trajmap::normalize::{contour_levels, select_normalization, ColorNorm, Coordinates};
use trajmap::plotting::{meteo_contouring, ContourOptions};
use trajmap::render::{MapExtent, RasterMap};

fn samples(n: usize) -> Vec<f64> {
    (0..n).map(|i| 1.0 + (i as f64 * 0.37).sin().abs() * 1000.0).collect()
}

fn bench_normalization(c: &mut Criterion) {
    let data = samples(10_000);
    let mut group = c.benchmark_group("select_normalization");
    for mode in [ColorNorm::None, ColorNorm::Boundary, ColorNorm::Log, ColorNorm::Sqrt] {
        group.bench_function(mode.as_str(), |b| {
            b.iter(|| select_normalization(black_box(&data), mode, None, None, Some(11)))
        });
    }
    group.finish();
}

fn bench_contouring(c: &mut Criterion) {
    let field = Array2::from_shape_fn((181, 361), |(row, col)| {
        ((row as f64).to_radians() * 2.0).sin() * ((col as f64).to_radians() * 3.0).cos()
    });
    let lons: Vec<f64> = (0..361).map(|i| i as f64 - 180.0).collect();
    let lats: Vec<f64> = (0..181).map(|i| 90.0 - i as f64).collect();

    c.bench_function("contour_levels", |b| {
        b.iter(|| contour_levels(black_box(field.view()), None, None, 50, None))
    });

    c.bench_function("filled_contour_render", |b| {
        b.iter(|| {
            let mut map = RasterMap::new(MapExtent::global(), 720, 360).ok()?;
            meteo_contouring(
                &mut map,
                field.view(),
                Coordinates::axes(lons.clone(), lats.clone()),
                &ContourOptions::default(),
            )
            .ok()?;
            Some(map.render())
        })
    });
}

criterion_group!(benches, bench_normalization, bench_contouring);
criterion_main!(benches);
