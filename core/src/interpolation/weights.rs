use super::sample::{SampleKind, FIXED_UNIT};

/// Bilinear weights for the four neighbours of a destination pixel, ordered
/// `f00, f01, f10, f11`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BilinearWeights {
    /// Kept in `f64` so double-precision elements blend at full precision.
    Real([f64; 4]),
    /// Scaled by [`FIXED_UNIT`]; non-negative and always sums to exactly `FIXED_UNIT`.
    Fixed([i32; 4]),
}

impl BilinearWeights {
    /// `a` is the fractional offset along the sample axis, `b` along the ray axis.
    pub fn new(kind: SampleKind, a: f64, b: f64) -> Self {
        let real = [(1.0 - a) * (1.0 - b), a * (1.0 - b), (1.0 - a) * b, a * b];
        if kind.uses_fixed_point() {
            BilinearWeights::Fixed(quantize(real))
        } else {
            BilinearWeights::Real(real)
        }
    }

    pub fn as_real(&self) -> [f64; 4] {
        match self {
            BilinearWeights::Real(weights) => *weights,
            BilinearWeights::Fixed(weights) => {
                weights.map(|w| f64::from(w) / f64::from(FIXED_UNIT))
            }
        }
    }

    pub fn as_fixed(&self) -> [i32; 4] {
        match self {
            BilinearWeights::Real(weights) => quantize(*weights),
            BilinearWeights::Fixed(weights) => *weights,
        }
    }

    /// Sum of the weights in real units.
    pub fn total(&self) -> f64 {
        match self {
            BilinearWeights::Real(weights) => weights.iter().sum(),
            BilinearWeights::Fixed(weights) => {
                f64::from(weights.iter().sum::<i32>()) / f64::from(FIXED_UNIT)
            }
        }
    }
}

// Largest-remainder rounding: floor every weight, then hand the missing
// units to the largest fractional parts. Each weight stays within one unit
// of its real value and never goes negative.
fn quantize(real: [f64; 4]) -> [i32; 4] {
    let unit = f64::from(FIXED_UNIT);
    let scaled = real.map(|w| w.clamp(0.0, 1.0) * unit);
    let mut fixed = scaled.map(|w| w.floor() as i32);
    let residual = FIXED_UNIT - fixed.iter().sum::<i32>();

    let mut order = [0usize, 1, 2, 3];
    order.sort_by(|&x, &y| {
        let fx = scaled[x] - scaled[x].floor();
        let fy = scaled[y] - scaled[y].floor();
        fy.total_cmp(&fx)
    });
    for &index in order.iter().take(residual.clamp(0, 4) as usize) {
        fixed[index] += 1;
    }
    fixed
}
