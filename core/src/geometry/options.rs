use serde::{Deserialize, Serialize};

use super::frame::PhysicalFrameDimensions;

pub const DEFAULT_DENSITY: f64 = 30.0;
pub const DEFAULT_GRID_STEP: f64 = 1.0;
pub const DEFAULT_GRID_LEVEL: f64 = 1.0;
pub const DEFAULT_BACKGROUND_LEVEL: f64 = 0.0;

/// Render parameters for one conversion.
///
/// Colour levels are fractions of the element type's full scale and are
/// mapped through [`crate::interpolation::ScanSample::from_level`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub frame: PhysicalFrameDimensions,
    pub draw_grid: bool,
    /// Grid spacing in frame units.
    pub grid_step: f64,
    pub grid_level: f64,
    pub draw_palette: bool,
    pub background_level: f64,
    /// Output pixels per frame unit.
    pub density: f64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            frame: PhysicalFrameDimensions::default(),
            draw_grid: false,
            grid_step: DEFAULT_GRID_STEP,
            grid_level: DEFAULT_GRID_LEVEL,
            draw_palette: false,
            background_level: DEFAULT_BACKGROUND_LEVEL,
            density: DEFAULT_DENSITY,
        }
    }
}

impl ScanOptions {
    pub fn with_frame(frame: PhysicalFrameDimensions) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    pub fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn grid(mut self, step: f64) -> Self {
        self.draw_grid = true;
        self.grid_step = step;
        self
    }

    pub fn palette(mut self) -> Self {
        self.draw_palette = true;
        self
    }
}
