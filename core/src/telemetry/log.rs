use std::time::Duration;

use log::debug;

use super::stats::TableStats;

const TARGET: &str = "scancore";

/// Debug-level trace of converter activity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionLog;

impl ConversionLog {
    pub fn new() -> Self {
        Self
    }

    pub fn substituted_frame(&self, side: f64) {
        debug!(target: TARGET, "degenerate frame replaced by {:.3} x {:.3} rectangle", side, side);
    }

    pub fn initialized(&self, rows: usize, cols: usize, density: f64, stats: &TableStats) {
        debug!(
            target: TARGET,
            "initialized {}x{} raster at {:.3} px/unit: {} neighbour, {} near-field, {} background entries",
            rows, cols, density, stats.neighbors, stats.near_field, stats.background
        );
    }

    pub fn built(&self, rows: usize, cols: usize, elapsed: Duration) {
        debug!(
            target: TARGET,
            "built {}x{} raster in {:.3} ms",
            rows,
            cols,
            elapsed.as_secs_f64() * 1000.0
        );
    }
}
