pub mod layout;
pub mod overlay;
pub mod scan;

pub use layout::{ProbeKind, RasterDimensions, ScanLayout};
pub use scan::{resample, ScanConverter};
