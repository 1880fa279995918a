//! Per-pixel resampling records and the element types they operate on.

pub mod interpolator;
pub mod sample;
pub mod weights;

pub use interpolator::PixelInterpolator;
pub use sample::{Rgb, SampleKind, ScanSample, FIXED_SHIFT, FIXED_UNIT};
pub use weights::BilinearWeights;
