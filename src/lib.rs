//! # trajmap
//!
//! Trajectory maps: scatter sample points colored by a value, draw the paths
//! between them, contour gridded fields underneath and attach colorbars.
//!
//! ## Layout
//!
//! - [`normalize`]: color and size normalization modes, boundary and contour
//!   level selection, coordinate meshes
//! - [`colormaps`]: named colormaps and random palettes
//! - [`plotting`]: the plotting helpers (`traj_scatter`, `traj_path`,
//!   `meteo_contouring`, `adjust_contourparams`, colorbar construction)
//! - [`render`]: the [`render::MapBackend`] seam and the bundled raster backend
//! - [`scene`]: JSON scene documents drawn through the helpers
//!
//! The `trajmap` binary renders a scene file to an image.

pub mod colormaps;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod normalize;
pub mod plotting;
pub mod render;
pub mod samples;
pub mod scene;

pub use config::Config;
pub use error::{Result, TrajmapError};
pub use logging::{
    generate_render_id, init_tracing, log_error, log_operation_end, log_operation_start,
    log_scene_stats, log_timed_operation,
};
pub use samples::SampleCollection;
pub use scene::Scene;
