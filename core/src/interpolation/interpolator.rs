use ndarray::ArrayView2;

use super::sample::ScanSample;
use super::weights::BilinearWeights;
use crate::prelude::{ConvertError, ConvertResult};

/// How one destination pixel obtains its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelInterpolator<T> {
    /// Pixel falls outside the usable source region.
    Constant(T),
    /// Bilinear blend of the 2×2 source block whose top-left cell is `origin`
    /// (`[ray, sample]`).
    Neighbors {
        origin: [usize; 2],
        weights: BilinearWeights,
    },
}

impl<T: ScanSample> PixelInterpolator<T> {
    pub fn constant(sample: T) -> Self {
        PixelInterpolator::Constant(sample)
    }

    /// Entry for fractional source coordinates `(ray, sample)` on a source
    /// grid of `shape` = `(rays, samples)`.
    pub fn neighbors(ray: f64, sample: f64, shape: (usize, usize)) -> Self {
        let (ray_index, b) = split_axis(ray, shape.0);
        let (sample_index, a) = split_axis(sample, shape.1);
        PixelInterpolator::Neighbors {
            origin: [ray_index, sample_index],
            weights: BilinearWeights::new(T::KIND, a, b),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, PixelInterpolator::Constant(_))
    }

    pub fn weights(&self) -> Option<&BilinearWeights> {
        match self {
            PixelInterpolator::Constant(_) => None,
            PixelInterpolator::Neighbors { weights, .. } => Some(weights),
        }
    }

    pub fn interpolate(&self, source: &ArrayView2<T>) -> ConvertResult<T> {
        match self {
            PixelInterpolator::Constant(sample) => Ok(*sample),
            PixelInterpolator::Neighbors {
                origin: [ray, sample],
                weights,
            } => {
                let cell = |dr: usize, ds: usize| {
                    source
                        .get((ray + dr, sample + ds))
                        .copied()
                        .ok_or(ConvertError::SourceOutOfBounds {
                            ray: ray + dr,
                            sample: sample + ds,
                        })
                };
                let cells = [cell(0, 0)?, cell(0, 1)?, cell(1, 0)?, cell(1, 1)?];
                Ok(T::blend(cells, weights))
            }
        }
    }
}

/// Integer index clamped to `[0, size - 2]` and the fractional remainder in `[0, 1]`.
fn split_axis(coord: f64, size: usize) -> (usize, f64) {
    let upper = size.saturating_sub(2);
    let floor = coord.floor();
    let index = if floor > 0.0 {
        (floor as usize).min(upper)
    } else {
        0
    };
    let fraction = (coord - index as f64).clamp(0.0, 1.0);
    (index, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn constant_entry_ignores_source() {
        let source = array![[1.0f32, 2.0], [3.0, 4.0]];
        let entry = PixelInterpolator::constant(9.0f32);
        assert!(entry.is_constant());
        assert!(entry.weights().is_none());
        assert_eq!(entry.interpolate(&source.view()).unwrap(), 9.0);
    }

    #[test]
    fn neighbors_blend_source_block() {
        let source = array![[0.0f32, 10.0, 20.0], [30.0, 40.0, 50.0], [60.0, 70.0, 80.0]];
        let entry = PixelInterpolator::<f32>::neighbors(1.5, 0.5, source.dim());
        match entry {
            PixelInterpolator::Neighbors { origin, .. } => assert_eq!(origin, [1, 0]),
            PixelInterpolator::Constant(_) => panic!("expected neighbour entry"),
        }
        let value = entry.interpolate(&source.view()).unwrap();
        assert!((value - 50.0).abs() < 1e-4);
    }

    #[test]
    fn indices_clamp_to_last_full_block() {
        let (index, fraction) = split_axis(4.0, 5);
        assert_eq!((index, fraction), (3, 1.0));
        let (index, fraction) = split_axis(-0.25, 5);
        assert_eq!((index, fraction), (0, 0.0));
        let (index, fraction) = split_axis(2.25, 5);
        assert_eq!(index, 2);
        assert!((fraction - 0.25).abs() < 1e-12);
    }

    #[test]
    fn integer_entries_use_fixed_weights() {
        let entry = PixelInterpolator::<u8>::neighbors(0.3, 0.6, (4, 4));
        assert!(matches!(entry.weights(), Some(BilinearWeights::Fixed(_))));
        let source = ndarray::Array2::<u8>::from_elem((4, 4), 100);
        assert_eq!(entry.interpolate(&source.view()).unwrap(), 100);
    }

    #[test]
    fn stale_entry_reports_missing_cell() {
        let entry = PixelInterpolator::<f32>::neighbors(3.5, 1.5, (5, 5));
        let shrunk = ndarray::Array2::<f32>::zeros((2, 2));
        let err = entry.interpolate(&shrunk.view()).unwrap_err();
        assert!(matches!(err, ConvertError::SourceOutOfBounds { ray: 3, .. }));
    }
}
