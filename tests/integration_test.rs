//! End-to-end tests: scene files rendered to images through the library and
//! the command-line configuration layer.

mod common;

use clap::Parser;
use image::ImageFormat;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{assertions, image_utils, test_data};
use trajmap::colormaps::Rgba;
use trajmap::config::{Args, Invocation};
use trajmap::job::run;
use trajmap::normalize::{select_normalization, ColorNorm, Coordinates, Normalization};
use trajmap::plotting::{
    adjust_contourparams, meteo_contouring, traj_path, traj_scatter, AdjustOptions,
    ContourOptions, PathOptions, ScatterOptions,
};
use trajmap::render::{MapExtent, RasterMap};
use trajmap::{Config, SampleCollection, TrajmapError};

fn small_config() -> Config {
    let mut config = Config::default();
    config.render.width = 200;
    config.render.height = 200;
    config
}

fn invocation(dir: &std::path::Path, scene: std::path::PathBuf, output: &str) -> Invocation {
    Invocation {
        scene_file: scene,
        output: dir.join(output),
        colorbar: Some(dir.join("colorbar.png")),
        bbox: None,
    }
}

#[test]
fn test_full_scene_renders_map_and_colorbar() {
    let dir = tempfile::tempdir().unwrap();
    let scene = test_data::write_scene(dir.path(), "scene.json", &test_data::full_scene());
    let invocation = invocation(dir.path(), scene, "map.png");

    let config = small_config();
    config.validate().unwrap();
    let outcome = run(&config, &invocation).unwrap();

    assert_eq!(outcome.layers, 3);
    assert_eq!(outcome.extent, MapExtent::new(10.0, 40.0, 14.0, 44.0).unwrap());

    let map_bytes = std::fs::read(&invocation.output).unwrap();
    assert_eq!(map_bytes.len(), outcome.map_bytes);
    image_utils::assert_image_format(&map_bytes, ImageFormat::Png);
    let map = image_utils::load_image_from_bytes(&map_bytes);
    image_utils::assert_image_dimensions(&map, 200, 200);

    // The filled contour covers the whole extent
    let white = Rgba::WHITE.0;
    assert_eq!(map.get_pixel(100, 100).0[3], 255);
    assert!(image_utils::count_non_background(&map, white) > 200 * 200 / 2);

    // Horizontal bar, 800 long plus two extension triangles, 40 tall plus outward ticks
    let cbar_bytes = std::fs::read(dir.path().join("colorbar.png")).unwrap();
    assert_eq!(outcome.colorbar_bytes, Some(cbar_bytes.len()));
    let cbar = image_utils::load_image_from_bytes(&cbar_bytes);
    image_utils::assert_image_dimensions(&cbar, 880, 44);
}

#[test]
fn test_jpeg_output_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let scene = test_data::write_scene(dir.path(), "scene.json", &test_data::full_scene());
    let output = dir.path().join("map.jpg");

    let args = Args::parse_from([
        "trajmap",
        scene.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--width",
        "120",
        "--height",
        "90",
    ]);
    let (config, invocation) = Config::from_args(args).unwrap();
    assert_eq!(config.render.format, "jpeg");

    run(&config, &invocation).unwrap();
    let bytes = std::fs::read(&output).unwrap();
    image_utils::assert_image_format(&bytes, ImageFormat::Jpeg);
    image_utils::assert_image_dimensions(&image_utils::load_image_from_bytes(&bytes), 120, 90);
}

#[test]
fn test_bbox_overrides_scene_extent() {
    let dir = tempfile::tempdir().unwrap();
    let scene = test_data::write_scene(dir.path(), "scene.json", &test_data::full_scene());
    let output = dir.path().join("map.png");

    let args = Args::parse_from([
        "trajmap",
        scene.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--bbox",
        "-20,30,40,60",
    ]);
    let (config, invocation) = Config::from_args(args).unwrap();
    let outcome = run(&config, &invocation).unwrap();
    assert_eq!(outcome.extent, MapExtent::new(-20.0, 30.0, 40.0, 60.0).unwrap());
    assert_eq!(outcome.colorbar_bytes, None);
}

#[test]
fn test_missing_values_do_not_break_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let scene = json!({
        "layers": [
            {"type": "contour", "data": [[1, null, 3], [4, 5, null]],
             "lons": [0, 1, 2], "lats": [1, 0], "filled": false, "steps": 4},
            {"type": "scatter", "data": [1, null, 3], "lons": [0.2, 1.0, 1.8],
             "lats": [0.2, 0.5, 0.8], "sizedata": [1, 4, 9], "snormalize": "sqrt"}
        ]
    });
    let path = test_data::write_scene(dir.path(), "missing.json", &scene);
    let invocation = Invocation {
        scene_file: path,
        output: dir.path().join("map.png"),
        colorbar: None,
        bbox: None,
    };

    let outcome = run(&small_config(), &invocation).unwrap();
    assert_eq!(outcome.layers, 2);
    // Fitted around the data with a margin
    assert!(outcome.extent.min_lon < 0.0 && outcome.extent.max_lon > 2.0);
}

#[test]
fn test_invalid_scenes_report_typed_errors() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config();

    let mismatched = json!({"layers": [
        {"type": "scatter", "data": [1, 2, 3], "lons": [0, 1], "lats": [0, 1, 2]}
    ]});
    let path = test_data::write_scene(dir.path(), "mismatch.json", &mismatched);
    let result = run(&config, &invocation(dir.path(), path, "a.png"));
    assert!(matches!(result, Err(TrajmapError::Shape { .. })));

    let log_of_negative = json!({"layers": [
        {"type": "scatter", "data": [1, -2], "lons": [0, 1], "lats": [0, 1], "cnormalize": "log"}
    ]});
    let path = test_data::write_scene(dir.path(), "log.json", &log_of_negative);
    let result = run(&config, &invocation(dir.path(), path, "b.png"));
    assert!(matches!(result, Err(TrajmapError::Domain { .. })));

    let one_level = json!({"layers": [
        {"type": "scatter", "data": [1, 2], "lons": [0, 1], "lats": [0, 1],
         "cnormalize": "boundary", "levels": 1}
    ]});
    let path = test_data::write_scene(dir.path(), "levels.json", &one_level);
    let result = run(&config, &invocation(dir.path(), path, "c.png"));
    assert!(matches!(result, Err(TrajmapError::Configuration { .. })));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let result = run(&config, &invocation(dir.path(), path, "d.png"));
    assert!(matches!(result, Err(TrajmapError::Json(_))));
}

#[test]
fn test_helpers_against_raster_backend() {
    let extent = MapExtent::new(0.0, 0.0, 10.0, 10.0).unwrap();
    let mut map = RasterMap::new(extent, 100, 100).unwrap();

    let data = ndarray::Array2::from_shape_fn((11, 11), |(row, col)| (row + col) as f64);
    let lons: Vec<f64> = (0..11).map(f64::from).collect();
    let lats: Vec<f64> = (0..11).map(f64::from).collect();
    let options = ContourOptions {
        filled: false,
        steps: 5,
        ..Default::default()
    };
    let mut set = meteo_contouring(
        &mut map,
        data.view(),
        Coordinates::axes(lons, lats),
        &options,
    )
    .unwrap();
    assertions::assert_array_approx_eq(&set.levels, &[0.0, 5.0, 10.0, 15.0, 20.0], None);
    assertions::assert_strictly_increasing(&set.levels);

    let adjust = AdjustOptions {
        colors: vec![Some(Rgba::rgb(255, 0, 0))],
        othercontours_visible: false,
        ..Default::default()
    };
    let matched = adjust_contourparams(&mut map, &mut set, &[10.0], &adjust).unwrap();
    assert_eq!(matched, 1);

    let samples = SampleCollection::new(vec![1.0, 2.0, 3.0], vec![2.0, 5.0, 8.0], vec![2.0, 5.0, 8.0])
        .unwrap();
    let collection = traj_scatter(&mut map, &samples, &ScatterOptions::default()).unwrap();
    assert_eq!(collection.len, 3);
    traj_path(&mut map, &samples.lons, &samples.lats, &PathOptions::new(Rgba::BLACK, 1.0)).unwrap();

    assert_eq!(map.layer_count(), 3);
    let image = map.render();
    image_utils::assert_image_dimensions(&image, 100, 100);
    assert!(image_utils::count_non_background(&image, Rgba::WHITE.0) > 0);
}

#[test]
fn test_boundary_normalization_spreads_colors() {
    let data = [0.0, 2.5, 5.0, 7.5, 10.0];
    let normalized = select_normalization(&data, ColorNorm::Boundary, None, None, Some(5)).unwrap();
    let Some(Normalization::Boundary(norm)) = normalized.norm else {
        panic!("expected a boundary norm");
    };
    assertions::assert_array_approx_eq(norm.boundaries(), &[0.0, 2.5, 5.0, 7.5, 10.0], None);

    let first = norm.color_index(0.1).unwrap();
    let last = norm.color_index(9.9).unwrap();
    assert_eq!(first, 0);
    assert_eq!(last, 255);
    assertions::assert_approx_eq(normalized.vmin.unwrap(), 0.0, None);
    assertions::assert_approx_eq(normalized.vmax.unwrap(), 10.0, None);
}

#[test]
fn test_background_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let scene = test_data::write_scene(
        dir.path(),
        "empty.json",
        &json!({"extent": [0, 0, 1, 1], "layers": []}),
    );
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        r#"{"render": {"width": 16, "height": 8, "background": "black"}}"#,
    )
    .unwrap();
    let output = dir.path().join("blank.png");

    let args = Args::parse_from([
        "trajmap",
        scene.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "-c",
        config_path.to_str().unwrap(),
    ]);
    let (config, invocation) = Config::from_args(args).unwrap();
    config.validate().unwrap();
    run(&config, &invocation).unwrap();

    let image = image_utils::load_image_from_bytes(&std::fs::read(&output).unwrap());
    image_utils::assert_image_dimensions(&image, 16, 8);
    assert_eq!(image_utils::count_non_background(&image, Rgba::BLACK.0), 0);
}
