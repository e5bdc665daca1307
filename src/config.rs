//! Configuration management for trajmap.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::colormaps::{get_colormap, Rgba};
use crate::error::{Result, TrajmapError};
use crate::plotting::{ColorbarDecoration, ContourOptions, ScatterOptions};
use crate::render::{parse_bbox, MapExtent, OutputFormat, MAX_IMAGE_SIDE};

/// Largest canvas side accepted, in pixels

/// Command-line arguments for trajmap
#[derive(Parser, Debug)]
#[command(name = "trajmap")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON scene to draw
    pub scene_file: PathBuf,

    /// Output image path
    #[arg(short, long, env = "TRAJMAP_OUTPUT")]
    pub output: PathBuf,

    /// Canvas width in pixels
    #[arg(long, env = "TRAJMAP_WIDTH")]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long, env = "TRAJMAP_HEIGHT")]
    pub height: Option<u32>,

    /// Map extent as "min_lon,min_lat,max_lon,max_lat", overriding the scene
    #[arg(long, env = "TRAJMAP_BBOX", allow_hyphen_values = true)]
    pub bbox: Option<String>,

    /// Output format (png or jpeg); guessed from the output path when unset
    #[arg(short, long, env = "TRAJMAP_FORMAT")]
    pub format: Option<String>,

    /// Also render the scene's colorbar to this path
    #[arg(long, env = "TRAJMAP_COLORBAR")]
    pub colorbar: Option<PathBuf>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "TRAJMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TRAJMAP_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Canvas and output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Output format (png or jpeg)
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_background")]
    pub background: Rgba,

    /// Long side of a rendered colorbar before shrinking, in pixels
    #[serde(default = "default_colorbar_length")]
    pub colorbar_length: u32,
}

/// Defaults for scene layers that leave options unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotDefaults {
    #[serde(default = "default_scatter_colormap")]
    pub scatter_colormap: String,

    #[serde(default = "default_contour_colormap")]
    pub contour_colormap: String,

    /// Marker size in points squared
    #[serde(default = "default_marker_size")]
    pub marker_size: f64,

    #[serde(default = "default_boundary_levels")]
    pub boundary_levels: usize,

    #[serde(default = "default_contour_steps")]
    pub contour_steps: usize,

    #[serde(default = "default_trajectory_zorder")]
    pub trajectory_zorder: i32,

    #[serde(default = "default_contour_zorder")]
    pub contour_zorder: i32,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub defaults: PlotDefaults,

    /// Decoration for colorbars without their own
    #[serde(default)]
    pub colorbar: ColorbarDecoration,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Paths and overrides of one command-line invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub scene_file: PathBuf,
    pub output: PathBuf,
    pub colorbar: Option<PathBuf>,
    pub bbox: Option<MapExtent>,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Invocation)> {
        Self::from_args(Args::parse())
    }

    /// Build the configuration from already parsed arguments
    pub fn from_args(args: Args) -> Result<(Self, Invocation)> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(width) = args.width {
            config.render.width = width;
        }
        if let Some(height) = args.height {
            config.render.height = height;
        }
        match args.format {
            Some(format) => config.render.format = format,
            None => {
                if let Some(format) = OutputFormat::from_path(&args.output) {
                    config.render.format = format.as_str().to_string();
                }
            }
        }
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }

        let bbox = args.bbox.as_deref().map(parse_bbox).transpose()?;

        Ok((
            config,
            Invocation {
                scene_file: args.scene_file,
                output: args.output,
                colorbar: args.colorbar,
                bbox,
            },
        ))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.render = other.render;
        self.defaults = other.defaults;
        self.colorbar = other.colorbar;
        self.log_level = other.log_level;
    }

    /// Parsed output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.render.format.parse()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, side) in [("width", self.render.width), ("height", self.render.height)] {
            if side == 0 || side > MAX_IMAGE_SIDE {
                return Err(TrajmapError::configuration(format!(
                    "Canvas {} must be between 1 and {} pixels, got {}",
                    name, MAX_IMAGE_SIDE, side
                )));
            }
        }
        if self.render.colorbar_length == 0 || self.render.colorbar_length > MAX_IMAGE_SIDE {
            return Err(TrajmapError::configuration(format!(
                "Colorbar length must be between 1 and {} pixels, got {}",
                MAX_IMAGE_SIDE, self.render.colorbar_length
            )));
        }

        self.output_format().map_err(|_| {
            TrajmapError::configuration(format!(
                "Invalid output format: {}. Must be one of: png, jpeg",
                self.render.format
            ))
        })?;

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(TrajmapError::configuration(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.log_level
                )));
            }
        }

        let defaults = &self.defaults;
        for name in [&defaults.scatter_colormap, &defaults.contour_colormap] {
            get_colormap(name).map_err(|_| {
                TrajmapError::configuration(format!("Unknown default colormap: {}", name))
            })?;
        }
        if !defaults.marker_size.is_finite() || defaults.marker_size < 0.0 {
            return Err(TrajmapError::configuration(format!(
                "Default marker size must be a non-negative number, got {}",
                defaults.marker_size
            )));
        }
        if defaults.boundary_levels < 2 {
            return Err(TrajmapError::configuration(format!(
                "Default boundary levels must be at least 2, got {}",
                defaults.boundary_levels
            )));
        }
        if defaults.contour_steps == 0 {
            return Err(TrajmapError::configuration(
                "Default contour steps must be at least 1",
            ));
        }
        if self.colorbar.divisions == Some(0) {
            return Err(TrajmapError::configuration(
                "Colorbar divisions must be at least 1",
            ));
        }

        Ok(())
    }
}

impl PlotDefaults {
    /// Scatter options before per-layer overrides
    pub fn scatter_options(&self) -> ScatterOptions {
        ScatterOptions {
            zorder: self.trajectory_zorder,
            colormap: self.scatter_colormap.clone(),
            size: self.marker_size,
            levels: self.boundary_levels,
            ..Default::default()
        }
    }

    /// Contour options before per-layer overrides
    pub fn contour_options(&self) -> ContourOptions {
        ContourOptions {
            steps: self.contour_steps,
            colormap: self.contour_colormap.clone(),
            zorder: self.contour_zorder,
            ..Default::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            defaults: PlotDefaults::default(),
            colorbar: ColorbarDecoration::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: default_format(),
            background: default_background(),
            colorbar_length: default_colorbar_length(),
        }
    }
}

impl Default for PlotDefaults {
    fn default() -> Self {
        Self {
            scatter_colormap: default_scatter_colormap(),
            contour_colormap: default_contour_colormap(),
            marker_size: default_marker_size(),
            boundary_levels: default_boundary_levels(),
            contour_steps: default_contour_steps(),
            trajectory_zorder: default_trajectory_zorder(),
            contour_zorder: default_contour_zorder(),
        }
    }
}

// Default value functions for serde
fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    800
}

fn default_format() -> String {
    "png".to_string()
}

fn default_background() -> Rgba {
    Rgba::WHITE
}

fn default_colorbar_length() -> u32 {
    800
}

fn default_scatter_colormap() -> String {
    "blues".to_string()
}

fn default_contour_colormap() -> String {
    "spectral".to_string()
}

fn default_marker_size() -> f64 {
    25.0
}

fn default_boundary_levels() -> usize {
    crate::normalize::DEFAULT_BOUNDARY_LEVELS
}

fn default_contour_steps() -> usize {
    crate::normalize::levels::DEFAULT_CONTOUR_STEPS
}

fn default_trajectory_zorder() -> i32 {
    19
}

fn default_contour_zorder() -> i32 {
    13
}

fn default_log_level() -> String {
    "info".to_string()
}
