pub mod frame;
pub mod options;

pub use frame::PhysicalFrameDimensions;
pub use options::ScanOptions;
