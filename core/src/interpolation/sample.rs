use std::fmt;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use super::weights::BilinearWeights;

/// Right shift that removes the fixed-point weight scale.
pub const FIXED_SHIFT: u32 = 7;
/// Fixed-point weight unit; the four fixed weights of a pixel sum to this.
pub const FIXED_UNIT: i32 = 1 << FIXED_SHIFT;

/// Storage/arithmetic family of a source element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    FloatingPoint,
    FixedPointInteger,
    /// Three 8-bit channels blended independently.
    Color,
    /// Real and imaginary parts blended independently.
    Complex,
}

impl SampleKind {
    pub fn uses_fixed_point(self) -> bool {
        matches!(self, SampleKind::FixedPointInteger | SampleKind::Color)
    }
}

/// Element type of a source grid and of the converted raster.
pub trait ScanSample: Copy + Send + Sync + PartialEq + fmt::Debug + 'static {
    const KIND: SampleKind;

    fn black() -> Self;

    /// Maps `level` in `[0, 1]` onto the type's full scale.
    fn from_level(level: f64) -> Self;

    /// Weighted combination of the four neighbours, ordered
    /// `(ray, sample)`, `(ray, sample + 1)`, `(ray + 1, sample)`, `(ray + 1, sample + 1)`.
    fn blend(cells: [Self; 4], weights: &BilinearWeights) -> Self;
}

fn fixed_sum(values: [i64; 4], weights: [i32; 4]) -> i64 {
    let acc: i64 = values
        .iter()
        .zip(weights.iter())
        .map(|(&value, &weight)| value * i64::from(weight))
        .sum();
    (acc + (1 << (FIXED_SHIFT - 1))) >> FIXED_SHIFT
}

macro_rules! floating_sample {
    ($($ty:ty),*) => {$(
        impl ScanSample for $ty {
            const KIND: SampleKind = SampleKind::FloatingPoint;

            fn black() -> Self {
                0.0
            }

            fn from_level(level: f64) -> Self {
                level as $ty
            }

            fn blend(cells: [Self; 4], weights: &BilinearWeights) -> Self {
                let weights = weights.as_real();
                cells
                    .iter()
                    .zip(weights.iter())
                    .map(|(&value, &weight)| value * weight as $ty)
                    .sum()
            }
        }
    )*};
}

macro_rules! fixed_point_sample {
    ($($ty:ty),*) => {$(
        impl ScanSample for $ty {
            const KIND: SampleKind = SampleKind::FixedPointInteger;

            fn black() -> Self {
                0
            }

            fn from_level(level: f64) -> Self {
                (level.clamp(0.0, 1.0) * <$ty>::MAX as f64).round() as $ty
            }

            fn blend(cells: [Self; 4], weights: &BilinearWeights) -> Self {
                let value = fixed_sum(cells.map(i64::from), weights.as_fixed());
                value.clamp(<$ty>::MIN as i64, <$ty>::MAX as i64) as $ty
            }
        }
    )*};
}

macro_rules! complex_sample {
    ($($ty:ty),*) => {$(
        impl ScanSample for Complex<$ty> {
            const KIND: SampleKind = SampleKind::Complex;

            fn black() -> Self {
                Complex::new(0.0, 0.0)
            }

            fn from_level(level: f64) -> Self {
                Complex::new(level as $ty, 0.0)
            }

            fn blend(cells: [Self; 4], weights: &BilinearWeights) -> Self {
                let weights = weights.as_real();
                cells
                    .iter()
                    .zip(weights.iter())
                    .fold(Complex::new(0.0, 0.0), |acc, (&value, &weight)| {
                        acc + value * weight as $ty
                    })
            }
        }
    )*};
}

floating_sample!(f32, f64);
fixed_point_sample!(u8, u16, i16, i32);
complex_sample!(f32, f64);

/// 8-bit RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }
}

impl ScanSample for Rgb {
    const KIND: SampleKind = SampleKind::Color;

    fn black() -> Self {
        Rgb::default()
    }

    fn from_level(level: f64) -> Self {
        Rgb::gray(u8::from_level(level))
    }

    fn blend(cells: [Self; 4], weights: &BilinearWeights) -> Self {
        let weights = weights.as_fixed();
        let channel = |pick: fn(&Rgb) -> u8| {
            fixed_sum(cells.map(|cell| i64::from(pick(&cell))), weights).clamp(0, 255) as u8
        };
        Rgb::new(channel(|c| c.r), channel(|c| c.g), channel(|c| c.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    fn halfway() -> [f64; 2] {
        [0.5, 0.5]
    }

    #[test]
    fn kinds_bind_per_element_type() {
        assert_eq!(<f32 as ScanSample>::KIND, SampleKind::FloatingPoint);
        assert_eq!(<u16 as ScanSample>::KIND, SampleKind::FixedPointInteger);
        assert_eq!(<Rgb as ScanSample>::KIND, SampleKind::Color);
        assert_eq!(<Complex32 as ScanSample>::KIND, SampleKind::Complex);
        assert!(SampleKind::Color.uses_fixed_point());
        assert!(!SampleKind::Complex.uses_fixed_point());
    }

    #[test]
    fn float_blend_averages_at_cell_centre() {
        let [a, b] = halfway();
        let weights = BilinearWeights::new(SampleKind::FloatingPoint, a, b);
        let value = f32::blend([0.0, 2.0, 4.0, 6.0], &weights);
        assert!((value - 3.0).abs() < 1e-6);
    }

    #[test]
    fn fixed_blend_rounds_and_descales() {
        let [a, b] = halfway();
        let weights = BilinearWeights::new(SampleKind::FixedPointInteger, a, b);
        assert_eq!(u8::blend([0, 1, 0, 1], &weights), 1);
        assert_eq!(u8::blend([255, 255, 255, 255], &weights), 255);
        assert_eq!(i16::blend([-100, -100, -100, -100], &weights), -100);
    }

    #[test]
    fn fixed_blend_stays_within_neighbour_range() {
        let weights = BilinearWeights::new(SampleKind::FixedPointInteger, 0.004, 0.004);
        assert!(u8::blend([100, 100, 100, 0], &weights) <= 100);
        assert!(u16::blend([100, 100, 100, 0], &weights) <= 100);
        let big = 1_000_000_000;
        assert!(i32::blend([big, big, big, 0], &weights) <= big);
        let weights = BilinearWeights::new(SampleKind::Color, 0.004, 0.004);
        let cells = [Rgb::gray(100), Rgb::gray(100), Rgb::gray(100), Rgb::gray(0)];
        assert!(Rgb::blend(cells, &weights).r <= 100);
    }

    #[test]
    fn double_blend_keeps_full_precision() {
        let weights = BilinearWeights::new(SampleKind::FloatingPoint, 0.1, 0.3);
        let value = f64::blend([1.0, 1.0, 1.0, 1.0], &weights);
        assert!((value - 1.0).abs() < 1e-15);
        let value = f64::blend([0.0, 1.0e9, 0.0, 1.0e9], &weights);
        assert!((value - 1.0e8).abs() < 1e-6);
    }

    #[test]
    fn fixed_blend_does_not_overflow_wide_types() {
        let weights = BilinearWeights::new(SampleKind::FixedPointInteger, 0.3, 0.8);
        assert_eq!(i32::blend([i32::MAX; 4], &weights), i32::MAX);
        assert_eq!(i32::blend([i32::MIN; 4], &weights), i32::MIN);
        assert_eq!(u16::blend([u16::MAX; 4], &weights), u16::MAX);
    }

    #[test]
    fn color_channels_blend_independently() {
        let weights = BilinearWeights::new(SampleKind::Color, 1.0, 0.0);
        let cells = [
            Rgb::new(10, 20, 30),
            Rgb::new(200, 100, 50),
            Rgb::gray(0),
            Rgb::gray(0),
        ];
        assert_eq!(Rgb::blend(cells, &weights), Rgb::new(200, 100, 50));
    }

    #[test]
    fn complex_components_blend_independently() {
        let weights = BilinearWeights::new(SampleKind::Complex, 0.25, 0.0);
        let cells = [
            Complex32::new(4.0, -4.0),
            Complex32::new(8.0, 4.0),
            Complex32::new(0.0, 0.0),
            Complex32::new(0.0, 0.0),
        ];
        let value = Complex32::blend(cells, &weights);
        assert!((value.re - 5.0).abs() < 1e-6);
        assert!((value.im + 2.0).abs() < 1e-6);
    }

    #[test]
    fn levels_map_to_full_scale() {
        assert_eq!(u8::from_level(1.0), 255);
        assert_eq!(u8::from_level(2.0), 255);
        assert_eq!(u16::from_level(0.0), 0);
        assert_eq!(Rgb::from_level(1.0), Rgb::gray(255));
        assert_eq!(f32::from_level(0.25), 0.25);
        assert_eq!(Complex32::black(), Complex32::new(0.0, 0.0));
    }
}
