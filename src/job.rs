//! One render: scene file in, map image (and optional colorbar image) out.

use tracing::{info, warn};

use crate::config::{Config, Invocation};
use crate::error::Result;
use crate::logging::{log_operation_end, log_operation_start, log_timed_operation};
use crate::render::{encode_image, render_colorbar, MapExtent, OutputFormat, RasterMap};
use crate::scene::Scene;

/// Summary of a finished render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub extent: MapExtent,
    pub layers: usize,
    pub map_bytes: usize,
    pub colorbar_bytes: Option<usize>,
}

/// Render `invocation.scene_file` to `invocation.output`.
///
/// The bbox override wins over the scene's own extent, which wins over an
/// extent fitted around the data.
pub fn run(config: &Config, invocation: &Invocation) -> Result<RenderOutcome> {
    let start = std::time::Instant::now();
    log_operation_start("render", Some(&invocation.scene_file.display().to_string()));

    let result = render(config, invocation);
    log_operation_end("render", start, result.is_ok());
    result
}

fn render(config: &Config, invocation: &Invocation) -> Result<RenderOutcome> {
    let format = config.output_format()?;
    let scene = Scene::load(&invocation.scene_file)?;

    let extent = match invocation.bbox {
        Some(bbox) => bbox,
        None => scene.extent_or_fit()?,
    };
    let mut map = RasterMap::new(extent, config.render.width, config.render.height)?
        .with_background(config.render.background);

    let drawn = log_timed_operation("draw_scene", || scene.draw(&mut map, &config.defaults))?;
    let colorbar = scene.colorbar(&drawn, &config.colorbar)?;

    let bytes = log_timed_operation("encode_map", || map.encode(format))?;
    std::fs::write(&invocation.output, &bytes)?;
    info!(
        path = %invocation.output.display(),
        format = %format,
        bytes = bytes.len(),
        "Map written"
    );

    let colorbar_bytes = match (&colorbar, &invocation.colorbar) {
        (Some(cbar), Some(path)) => {
            let cbar_format = OutputFormat::from_path(path).unwrap_or(format);
            let image = render_colorbar(cbar, config.render.colorbar_length)?;
            let encoded = encode_image(&image, cbar_format)?;
            std::fs::write(path, &encoded)?;
            info!(path = %path.display(), bytes = encoded.len(), "Colorbar written");
            Some(encoded.len())
        }
        (Some(_), None) => {
            warn!("Scene defines a colorbar but no colorbar output path was given");
            None
        }
        (None, Some(path)) => {
            warn!(path = %path.display(), "Colorbar output requested but the scene defines no colorbar");
            None
        }
        (None, None) => None,
    };

    Ok(RenderOutcome {
        extent,
        layers: drawn.len(),
        map_bytes: bytes.len(),
        colorbar_bytes,
    })
}
