//! Plotting helpers.
//!
//! Each helper validates its inputs, derives default parameters through
//! [`crate::normalize`] and delegates drawing to a [`crate::render::MapBackend`].

pub mod colorbar;
pub mod contour;
pub mod path;
pub mod scatter;

pub use colorbar::{
    edit_cbar, make_cax_cbar, make_cbar, nice_ticks, CaxOptions, Colorbar, ColorbarAxes,
    ColorbarDecoration, ColorbarOptions, Extend, Orientation, TickDirection,
};
pub use contour::{adjust_contourparams, meteo_contouring, AdjustOptions, ContourOptions};
pub use path::{traj_path, PathOptions};
pub use scatter::{traj_scatter, ScatterOptions};
