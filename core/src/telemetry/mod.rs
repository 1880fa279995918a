pub mod log;
pub mod stats;

pub use log::ConversionLog;
pub use stats::TableStats;
