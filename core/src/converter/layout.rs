use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::geometry::PhysicalFrameDimensions;
use crate::prelude::{ConvertError, ConvertResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeKind {
    Linear,
    Sector,
}

/// Physical bounding box of the converted raster, for axis labelling.
///
/// `v` runs down from the apex, `h` across from the probe axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RasterDimensions {
    pub v_min: f64,
    pub v_max: f64,
    pub h_min: f64,
    pub h_max: f64,
}

/// Constants derived from a frame, a source shape and a raster request.
///
/// Pixel offsets are apex-relative: `row_off = row + first_row`,
/// `col_off = col - center_col`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanLayout {
    pub probe: ProbeKind,
    pub rows: usize,
    pub cols: usize,
    /// Effective pixels per frame unit.
    pub density: f64,
    /// Apex-to-top-row distance in pixels.
    pub first_row: f64,
    pub center_col: f64,
    /// Apex distance of the first and last sample, in sample steps.
    pub first_sample: f64,
    pub last_sample: f64,
    pub ray_count: usize,
    pub sample_count: usize,
    pub start_angle: f64,
    pub angle_step: f64,
    /// Lateral spacing of linear rays in frame units, `trajectory_length / ray_count`.
    ///
    /// Ray centres sit at `(ray - (ray_count - 1) / 2) * ray_pitch` from the probe
    /// axis, so the active width is `(ray_count - 1) * ray_pitch` and the outer
    /// half pitch on either side of the trajectory renders as background.
    pub ray_pitch: f64,
    /// Cotangent of `|start_angle|` for a left edge, infinite when there is none.
    pub cot_start: f64,
    /// Cotangent of `end_angle` for a right edge, infinite when there is none.
    pub cot_end: f64,
    /// Column range that can reach a ray, before flipping.
    pub col_bounds: (usize, usize),
    pub flip: bool,
}

impl ScanLayout {
    /// `shape` is the source grid `(rays, samples)`; `rows`/`cols` of
    /// `None` (or zero) are derived from the frame and `density`.
    pub fn derive(
        frame: &PhysicalFrameDimensions,
        density: f64,
        shape: (usize, usize),
        rows: Option<usize>,
        cols: Option<usize>,
        flip: bool,
    ) -> ConvertResult<Self> {
        let (ray_count, sample_count) = shape;
        let depth = frame.depth_range();
        if !(depth.is_finite() && depth > 0.0) {
            return Err(ConvertError::InvalidGeometry(format!(
                "depth range must be positive, got {}",
                depth
            )));
        }
        let probe = if frame.is_linear() {
            ProbeKind::Linear
        } else {
            ProbeKind::Sector
        };
        if probe == ProbeKind::Sector && frame.angle_range() < 0.0 {
            return Err(ConvertError::InvalidGeometry(
                "end angle precedes start angle".into(),
            ));
        }

        let max_angle = frame.max_angle().min(FRAC_PI_2);
        let r_min = frame.r_min();
        let r_max = frame.r_max();
        let sample_step = depth / sample_count.saturating_sub(1).max(1) as f64;
        let extent = match probe {
            ProbeKind::Sector => r_max - r_min * max_angle.cos(),
            ProbeKind::Linear => r_max - r_min,
        };

        let rows = match rows.filter(|&rows| rows > 0) {
            Some(rows) => rows,
            None => {
                if !(density.is_finite() && density > 0.0) {
                    return Err(ConvertError::InvalidGeometry(format!(
                        "density must be positive, got {}",
                        density
                    )));
                }
                (extent * density).round() as usize
            }
        };
        if rows == 0 {
            return Err(ConvertError::InvalidGeometry(
                "frame is too shallow for a single row".into(),
            ));
        }
        let density = rows as f64 / extent;

        let cols = match cols.filter(|&cols| cols > 0) {
            Some(cols) => cols,
            None => match probe {
                ProbeKind::Sector => (2.0 * r_max * density * max_angle.sin()).round() as usize,
                ProbeKind::Linear => (frame.trajectory_length() * density).round() as usize,
            },
        };
        if cols == 0 {
            return Err(ConvertError::InvalidGeometry(
                "frame is too narrow for a single column".into(),
            ));
        }

        let first_row = match probe {
            ProbeKind::Sector => r_min * max_angle.cos() * density,
            ProbeKind::Linear => 0.0,
        };

        let mut layout = Self {
            probe,
            rows,
            cols,
            density,
            first_row,
            center_col: (cols as f64 - 1.0) / 2.0,
            first_sample: r_min / sample_step,
            last_sample: r_max / sample_step,
            ray_count,
            sample_count,
            start_angle: frame.start_angle(),
            angle_step: frame.angle_range() / ray_count.saturating_sub(1).max(1) as f64,
            ray_pitch: frame.trajectory_length() / ray_count.max(1) as f64,
            cot_start: edge_cotangent(-frame.start_angle()),
            cot_end: edge_cotangent(frame.end_angle()),
            col_bounds: (0, cols),
            flip,
        };
        layout.col_bounds = layout.active_columns();
        Ok(layout)
    }

    /// Column index after applying the flip.
    pub fn mapped_col(&self, col: usize) -> usize {
        if self.flip {
            self.cols - 1 - col
        } else {
            col
        }
    }

    /// First row of an unflipped column that can lie inside the sector.
    /// Conservative: the exact ray test still applies below it.
    pub fn active_row_start(&self, col: usize) -> usize {
        if self.probe == ProbeKind::Linear {
            return 0;
        }
        let col_off = col as f64 - self.center_col;
        if col_off == 0.0 {
            return 0;
        }
        let cot = if col_off > 0.0 {
            self.cot_end
        } else {
            self.cot_start
        };
        let threshold = col_off.abs() * cot - self.first_row;
        if threshold <= 0.0 {
            0
        } else if !threshold.is_finite() || threshold >= self.rows as f64 {
            self.rows
        } else {
            (threshold.floor() as usize).saturating_sub(1)
        }
    }

    fn active_columns(&self) -> (usize, usize) {
        match self.probe {
            ProbeKind::Sector => (0, self.cols),
            ProbeKind::Linear => {
                let half_span =
                    (self.ray_count as f64 - 1.0) / 2.0 * self.ray_pitch * self.density;
                let lo = (self.center_col - half_span).floor() - 1.0;
                let hi = (self.center_col + half_span).ceil() + 2.0;
                let lo = if lo > 0.0 { lo as usize } else { 0 };
                let hi = if hi > 0.0 {
                    (hi as usize).min(self.cols)
                } else {
                    0
                };
                (lo.min(hi), hi)
            }
        }
    }

    /// Fractional `(ray, sample)` for a destination position.
    pub fn ray_sample_coords(&self, row: f64, col: f64) -> (f64, f64) {
        let col = if self.flip {
            (self.cols as f64 - 1.0) - col
        } else {
            col
        };
        let row_off = row + self.first_row;
        let col_off = col - self.center_col;
        let apex_depth = self.rows as f64 + self.first_row;
        match self.probe {
            ProbeKind::Sector => {
                let radius = col_off.hypot(row_off);
                let angle = if radius == 0.0 {
                    0.0
                } else {
                    col_off.atan2(row_off)
                };
                let sample = self.last_sample * radius / apex_depth - self.first_sample;
                let ray = (angle - self.start_angle) / self.angle_step;
                (ray, sample)
            }
            ProbeKind::Linear => {
                let sample = self.last_sample * row_off / apex_depth - self.first_sample;
                let ray = (self.ray_count as f64 - 1.0) / 2.0
                    + col_off / (self.ray_pitch * self.density);
                (ray, sample)
            }
        }
    }

    /// Destination `(row, col)` for fractional source coordinates.
    pub fn row_col_coords(&self, ray: f64, sample: f64) -> (f64, f64) {
        let apex_depth = self.rows as f64 + self.first_row;
        let depth = (sample + self.first_sample) * apex_depth / self.last_sample;
        let (row_off, col_off) = match self.probe {
            ProbeKind::Sector => {
                let angle = self.start_angle + ray * self.angle_step;
                (depth * angle.cos(), depth * angle.sin())
            }
            ProbeKind::Linear => (
                depth,
                (ray - (self.ray_count as f64 - 1.0) / 2.0) * self.ray_pitch * self.density,
            ),
        };
        let row = row_off - self.first_row;
        let col = col_off + self.center_col;
        if self.flip {
            (row, (self.cols as f64 - 1.0) - col)
        } else {
            (row, col)
        }
    }

    pub fn dimensions(&self) -> RasterDimensions {
        let half_width = self.cols as f64 / (2.0 * self.density);
        RasterDimensions {
            v_min: self.first_row / self.density,
            v_max: (self.rows as f64 + self.first_row) / self.density,
            h_min: -half_width,
            h_max: half_width,
        }
    }
}

fn edge_cotangent(angle: f64) -> f64 {
    if angle > 0.0 {
        angle.cos() / angle.sin()
    } else {
        f64::INFINITY
    }
}
