//! Scan-conversion core: turns a grid of rays × samples into a Cartesian raster.
//!
//! Linear probes place parallel rays side by side; sector probes fan rays
//! out from an apex. A [`ScanConverter`] derives the raster size from the
//! physical frame, precomputes one interpolation record per pixel and
//! resamples the source in parallel, one raster row per task.

pub mod converter;
pub mod geometry;
pub mod interpolation;
pub mod prelude;
pub mod telemetry;

pub use converter::{RasterDimensions, ScanConverter};
pub use geometry::{PhysicalFrameDimensions, ScanOptions};
pub use interpolation::{Rgb, SampleKind, ScanSample};
pub use prelude::{ConvertError, ConvertResult, ScanState};
