//! Render objects returned by backends.
//!
//! Anything implementing [`ScalarMappable`] can feed a colorbar.

use std::sync::Arc;

use super::style::{CollectionStyle, LineStyle};
use crate::colormaps::{Colormap, Rgba};
use crate::normalize::Normalization;

/// Handle of a drawn layer inside its backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub usize);

/// A render object that maps data values through a norm and a colormap
pub trait ScalarMappable {
    fn colormap(&self) -> &Arc<dyn Colormap>;

    /// The resolved normalization used for drawing
    fn norm(&self) -> &Normalization;

    /// Discrete boundaries a colorbar should show as separate blocks
    fn boundaries(&self) -> Option<&[f64]> {
        match self.norm() {
            Normalization::Boundary(boundary) => Some(boundary.boundaries()),
            _ => None,
        }
    }
}

/// Scatter points drawn by a backend
#[derive(Debug, Clone)]
pub struct PathCollection {
    pub layer: LayerId,
    pub colormap: Arc<dyn Colormap>,
    pub norm: Normalization,
    /// Number of points in the collection
    pub len: usize,
    pub zorder: i32,
}

impl ScalarMappable for PathCollection {
    fn colormap(&self) -> &Arc<dyn Colormap> {
        &self.colormap
    }

    fn norm(&self) -> &Normalization {
        &self.norm
    }
}

/// One contour level (line contours) or one band (filled contours)
#[derive(Debug, Clone, PartialEq)]
pub struct ContourCollection {
    /// Level value; the lower edge of the band for filled contours
    pub level: f64,
    pub color: Rgba,
    pub alpha: f64,
    pub linewidth: f64,
    pub linestyle: LineStyle,
    pub visible: bool,
}

impl ContourCollection {
    pub fn new(level: f64, color: Rgba, linewidth: f64) -> Self {
        Self {
            level,
            color,
            alpha: 1.0,
            linewidth,
            linestyle: LineStyle::Solid,
            visible: true,
        }
    }

    /// Apply explicit overrides, leaving unset fields alone
    pub fn apply(&mut self, style: &CollectionStyle) {
        if let Some(linewidth) = style.linewidth {
            self.linewidth = linewidth;
        }
        if let Some(linestyle) = style.linestyle {
            self.linestyle = linestyle;
        }
        if let Some(alpha) = style.alpha {
            self.alpha = alpha.clamp(0.0, 1.0);
        }
        if let Some(visible) = style.visible {
            self.visible = visible;
        }
    }

    /// Color with collection alpha applied; `None` when nothing should be drawn
    pub fn effective_color(&self) -> Option<Rgba> {
        if !self.visible || self.alpha <= 0.0 {
            return None;
        }
        Some(self.color.with_alpha(self.alpha))
    }
}

/// Contour lines or filled bands drawn by a backend
#[derive(Debug, Clone)]
pub struct ContourSet {
    pub layer: LayerId,
    pub levels: Vec<f64>,
    pub filled: bool,
    pub colormap: Arc<dyn Colormap>,
    pub norm: Normalization,
    /// One entry per level, or per band when filled
    pub collections: Vec<ContourCollection>,
    pub zorder: i32,
}

impl ContourSet {
    /// Collections paired with their levels
    pub fn iter_levels(&self) -> impl Iterator<Item = (f64, &ContourCollection)> {
        self.levels.iter().copied().zip(self.collections.iter())
    }
}

impl ScalarMappable for ContourSet {
    fn colormap(&self) -> &Arc<dyn Colormap> {
        &self.colormap
    }

    fn norm(&self) -> &Normalization {
        &self.norm
    }

    fn boundaries(&self) -> Option<&[f64]> {
        if self.filled {
            Some(&self.levels)
        } else {
            None
        }
    }
}
