use ndarray::Array2;

use super::layout::ScanLayout;
use crate::interpolation::ScanSample;

pub const DASH_LENGTH: usize = 4;
/// Grid lines closer than this many pixels are not drawn.
pub const MIN_GRID_SPACING: f64 = 2.0;
pub const PALETTE_HEIGHT: usize = 128;
pub const PALETTE_WIDTH: usize = 12;
pub const PALETTE_MARGIN: usize = 8;

fn on_dash(index: usize) -> bool {
    (index / DASH_LENGTH) % 2 == 0
}

/// Dashed lines every `step` frame units: rows at constant depth, columns
/// at constant lateral offset from the apex column.
pub fn draw_grid<T: ScanSample>(raster: &mut Array2<T>, layout: &ScanLayout, step: f64, color: T) {
    let spacing = step * layout.density;
    if !spacing.is_finite() || spacing < MIN_GRID_SPACING {
        return;
    }
    let (rows, cols) = raster.dim();
    let dims = layout.dimensions();

    let first_line = (dims.v_min / step).ceil() as i64;
    for line in first_line.. {
        let depth = line as f64 * step;
        if depth >= dims.v_max {
            break;
        }
        let row = (depth * layout.density - layout.first_row).round();
        if row < 0.0 || row as usize >= rows {
            continue;
        }
        let row = row as usize;
        for col in (0..cols).filter(|&col| on_dash(col)) {
            raster[[row, col]] = color;
        }
    }

    let reach = (layout.center_col / spacing).floor() as i64 + 1;
    for line in -reach..=reach {
        let col = (layout.center_col + line as f64 * spacing).round();
        if col < 0.0 || col as usize >= cols {
            continue;
        }
        let col = col as usize;
        for row in (0..rows).filter(|&row| on_dash(row)) {
            raster[[row, col]] = color;
        }
    }
}

/// Vertical full-scale-to-black gradient near the top-left corner. Returns
/// false, leaving the raster untouched, when it does not fit.
pub fn draw_palette<T: ScanSample>(raster: &mut Array2<T>) -> bool {
    let (rows, cols) = raster.dim();
    if rows < PALETTE_HEIGHT + 2 * PALETTE_MARGIN || cols < PALETTE_WIDTH + PALETTE_MARGIN {
        return false;
    }
    for step in 0..PALETTE_HEIGHT {
        let level = 1.0 - step as f64 / (PALETTE_HEIGHT - 1) as f64;
        let value = T::from_level(level);
        let row = PALETTE_MARGIN + step;
        for col in PALETTE_MARGIN..PALETTE_MARGIN + PALETTE_WIDTH {
            raster[[row, col]] = value;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PhysicalFrameDimensions;

    fn linear_layout() -> ScanLayout {
        let frame = PhysicalFrameDimensions::rectangle(4.0, 4.0);
        ScanLayout::derive(&frame, 10.0, (4, 4), None, None, false).unwrap()
    }

    #[test]
    fn grid_draws_dashed_depth_and_lateral_lines() {
        let layout = linear_layout();
        let mut raster = Array2::<u8>::zeros((layout.rows, layout.cols));
        draw_grid(&mut raster, &layout, 1.0, 255);
        assert_eq!(raster[[10, 0]], 255);
        assert_eq!(raster[[10, 4]], 0);
        assert_eq!(raster[[10, 8]], 255);
        assert_eq!(raster[[0, 20]], 255);
        assert_eq!(raster[[5, 20]], 0);
        assert_eq!(raster[[15, 15]], 0);
    }

    #[test]
    fn dense_grid_is_skipped() {
        let layout = linear_layout();
        let mut raster = Array2::<u8>::zeros((layout.rows, layout.cols));
        draw_grid(&mut raster, &layout, 0.1, 255);
        draw_grid(&mut raster, &layout, 0.0, 255);
        assert!(raster.iter().all(|&v| v == 0));
    }

    #[test]
    fn palette_needs_room() {
        let mut small = Array2::<f32>::zeros((100, 100));
        assert!(!draw_palette(&mut small));
        assert!(small.iter().all(|&v| v == 0.0));

        let mut raster = Array2::<f32>::zeros((200, 40));
        assert!(draw_palette(&mut raster));
        assert_eq!(raster[[PALETTE_MARGIN, PALETTE_MARGIN]], 1.0);
        assert_eq!(raster[[PALETTE_MARGIN + PALETTE_HEIGHT - 1, PALETTE_MARGIN]], 0.0);
        assert_eq!(raster[[PALETTE_MARGIN, PALETTE_MARGIN + PALETTE_WIDTH]], 0.0);
    }
}
