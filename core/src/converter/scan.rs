use std::time::Instant;

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};
use rayon::prelude::*;

use super::layout::{RasterDimensions, ScanLayout};
use super::overlay;
use crate::geometry::{PhysicalFrameDimensions, ScanOptions};
use crate::interpolation::{PixelInterpolator, ScanSample};
use crate::prelude::{ConvertError, ConvertResult, RowFailure, ScanState};
use crate::telemetry::{ConversionLog, TableStats};

/// Converts a ray × sample grid into a Cartesian raster.
///
/// The converter owns its source grid. `initialize` derives the raster
/// layout and the per-pixel interpolation table; `build` resamples the
/// source through that table. Changing the raster size, flip, background,
/// options or the source shape invalidates the table.
pub struct ScanConverter<T: ScanSample> {
    source: Array2<T>,
    options: ScanOptions,
    raster: Array2<T>,
    table: Array2<PixelInterpolator<T>>,
    layout: Option<ScanLayout>,
    state: ScanState,
    flip: bool,
    background: Option<T>,
    requested: (Option<usize>, Option<usize>),
    stats: TableStats,
    logger: ConversionLog,
}

impl<T: ScanSample> ScanConverter<T> {
    /// `source` is indexed `[ray, sample]`.
    pub fn new(source: Array2<T>, options: ScanOptions) -> Self {
        Self {
            source,
            options,
            raster: Array2::from_elem((0, 0), T::black()),
            table: Array2::from_elem((0, 0), PixelInterpolator::constant(T::black())),
            layout: None,
            state: ScanState::Uninitialized,
            flip: false,
            background: None,
            requested: (None, None),
            stats: TableStats::default(),
            logger: ConversionLog::new(),
        }
    }

    pub fn source(&self) -> &Array2<T> {
        &self.source
    }

    /// Mutable access to source values. The shape cannot change through
    /// this view, so the table stays valid.
    pub fn source_mut(&mut self) -> ArrayViewMut2<'_, T> {
        self.source.view_mut()
    }

    /// Swaps in a new source grid; a different shape requires re-initialization.
    pub fn replace_source(&mut self, source: Array2<T>) {
        if source.dim() != self.source.dim() {
            self.invalidate();
        }
        self.source = source;
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ScanOptions) {
        self.options = options;
        self.invalidate();
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    pub fn layout(&self) -> Option<&ScanLayout> {
        self.layout.as_ref()
    }

    pub fn table(&self) -> ArrayView2<'_, PixelInterpolator<T>> {
        self.table.view()
    }

    pub fn table_stats(&self) -> TableStats {
        self.stats
    }

    pub fn flip(&self) -> bool {
        self.flip
    }

    pub fn set_flip(&mut self, flip: bool) -> ConvertResult<()> {
        self.flip = flip;
        self.reinitialize()
    }

    /// Fill for pixels outside the source region.
    pub fn background(&self) -> T {
        self.background
            .unwrap_or_else(|| T::from_level(self.options.background_level))
    }

    pub fn set_background(&mut self, background: T) -> ConvertResult<()> {
        self.background = Some(background);
        self.reinitialize()
    }

    fn reinitialize(&mut self) -> ConvertResult<()> {
        if self.is_initialized() {
            let (rows, cols) = self.requested;
            self.initialize(rows, cols)
        } else {
            Ok(())
        }
    }

    fn invalidate(&mut self) {
        self.state = ScanState::Uninitialized;
        self.layout = None;
    }

    /// Derives the raster layout and rebuilds the interpolation table.
    /// `None` sizes are computed from the frame and density.
    pub fn initialize(&mut self, rows: Option<usize>, cols: Option<usize>) -> ConvertResult<()> {
        self.invalidate();
        self.requested = (rows, cols);

        let frame = self.effective_frame()?;
        let shape = self.source.dim();
        let layout = ScanLayout::derive(&frame, self.options.density, shape, rows, cols, self.flip)?;

        let background = self.background();
        let size = (layout.rows, layout.cols);
        let mut table = Array2::from_elem(size, PixelInterpolator::constant(background));
        self.stats = populate_table(&mut table, &layout, shape);
        self.logger
            .initialized(layout.rows, layout.cols, layout.density, &self.stats);

        self.raster = Array2::from_elem(size, background);
        self.table = table;
        self.layout = Some(layout);
        self.state = ScanState::Initialized;
        Ok(())
    }

    fn effective_frame(&self) -> ConvertResult<PhysicalFrameDimensions> {
        let frame = self.options.frame;
        if !frame.is_degenerate() {
            return Ok(frame);
        }
        let samples = self.source.ncols();
        let density = self.options.density;
        if samples == 0 || !(density.is_finite() && density > 0.0) {
            return Err(ConvertError::InvalidGeometry(
                "degenerate frame and no source grid to size a default".into(),
            ));
        }
        let side = samples as f64 / density;
        self.logger.substituted_frame(side);
        Ok(PhysicalFrameDimensions::rectangle(side, side))
    }

    /// Fills the raster from the source, then draws the enabled overlays.
    pub fn build(&mut self) -> ConvertResult<()> {
        if !self.is_initialized() {
            return Err(ConvertError::NotInitialized);
        }
        let started = Instant::now();
        resample(self.table.view(), self.source.view(), self.raster.view_mut())?;
        if self.options.draw_grid {
            self.draw_grid()?;
        }
        if self.options.draw_palette {
            self.draw_palette()?;
        }
        self.state = ScanState::Built;
        self.logger
            .built(self.raster.nrows(), self.raster.ncols(), started.elapsed());
        Ok(())
    }

    pub fn draw_grid(&mut self) -> ConvertResult<()> {
        let layout = self.layout.as_ref().ok_or(ConvertError::NotInitialized)?;
        let color = T::from_level(self.options.grid_level);
        overlay::draw_grid(&mut self.raster, layout, self.options.grid_step, color);
        Ok(())
    }

    /// Returns whether the strip fit on the raster.
    pub fn draw_palette(&mut self) -> ConvertResult<bool> {
        if !self.is_initialized() {
            return Err(ConvertError::NotInitialized);
        }
        Ok(overlay::draw_palette(&mut self.raster))
    }

    pub fn converted_image(&self) -> &Array2<T> {
        &self.raster
    }

    /// Fractional `(ray, sample)` for a destination position; `(0, 0)`
    /// before initialization.
    pub fn ray_sample_coords(&self, row: f64, col: f64) -> (f64, f64) {
        self.layout
            .as_ref()
            .map_or((0.0, 0.0), |layout| layout.ray_sample_coords(row, col))
    }

    /// Destination `(row, col)` for fractional source coordinates; `(0, 0)`
    /// before initialization.
    pub fn row_col_coords(&self, ray: f64, sample: f64) -> (f64, f64) {
        self.layout
            .as_ref()
            .map_or((0.0, 0.0), |layout| layout.row_col_coords(ray, sample))
    }

    /// Zeroed before initialization.
    pub fn raster_dimensions(&self) -> RasterDimensions {
        self.layout
            .as_ref()
            .map(ScanLayout::dimensions)
            .unwrap_or_default()
    }
}

fn populate_table<T: ScanSample>(
    table: &mut Array2<PixelInterpolator<T>>,
    layout: &ScanLayout,
    shape: (usize, usize),
) -> TableStats {
    let ray_limit = shape.0 as f64 - 1.0;
    let sample_limit = shape.1 as f64 - 1.0;
    let (col_lo, col_hi) = layout.col_bounds;
    let row_starts: Vec<usize> = (0..layout.cols)
        .map(|col| layout.active_row_start(col))
        .collect();

    table
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .map(|(row, mut entries)| {
            let (mut neighbors, mut near_field) = (0, 0);
            for col in 0..layout.cols {
                let mapped = layout.mapped_col(col);
                if mapped < col_lo || mapped >= col_hi || row < row_starts[mapped] {
                    continue;
                }
                let (ray, sample) = layout.ray_sample_coords(row as f64, col as f64);
                if !(ray >= 0.0 && ray < ray_limit) {
                    continue;
                }
                // Near field clamps to black instead of extrapolating.
                if sample <= 0.0 {
                    entries[col] = PixelInterpolator::constant(T::black());
                    near_field += 1;
                } else if sample < sample_limit {
                    entries[col] = PixelInterpolator::neighbors(ray, sample, shape);
                    neighbors += 1;
                }
            }
            TableStats::row(layout.cols, neighbors, near_field)
        })
        .reduce(TableStats::default, TableStats::merge)
}

/// Resamples every raster row from its table row in parallel. Rows that
/// fail are collected and reported together once all rows have run.
pub fn resample<T: ScanSample>(
    table: ArrayView2<'_, PixelInterpolator<T>>,
    source: ArrayView2<'_, T>,
    mut raster: ArrayViewMut2<'_, T>,
) -> ConvertResult<()> {
    let rows = raster.nrows();
    let mut failures: Vec<RowFailure> = raster
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(table.axis_iter(Axis(0)).into_par_iter())
        .enumerate()
        .filter_map(|(row, (mut pixels, entries))| {
            resample_row(&mut pixels, &entries, &source)
                .err()
                .map(|error| RowFailure { row, error })
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        failures.sort_by_key(|failure| failure.row);
        Err(ConvertError::BuildFailed { failures, rows })
    }
}

fn resample_row<T: ScanSample>(
    pixels: &mut ArrayViewMut1<'_, T>,
    entries: &ArrayView1<'_, PixelInterpolator<T>>,
    source: &ArrayView2<'_, T>,
) -> ConvertResult<()> {
    for (pixel, entry) in pixels.iter_mut().zip(entries.iter()) {
        *pixel = entry.interpolate(source)?;
    }
    Ok(())
}
