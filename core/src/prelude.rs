use std::fmt;

/// Lifecycle of a scan converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Derived layout and interpolation table are not valid.
    #[default]
    Uninitialized,
    /// Layout and table are valid; the raster holds background only.
    Initialized,
    /// At least one build has completed since the last initialization.
    Built,
}

impl ScanState {
    pub fn is_initialized(self) -> bool {
        !matches!(self, ScanState::Uninitialized)
    }
}

/// A destination row that failed during a build.
#[derive(Debug)]
pub struct RowFailure {
    pub row: usize,
    pub error: ConvertError,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.error)
    }
}

/// Common error type for scan conversion.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("converter not initialized")]
    NotInitialized,
    #[error("source cell ({ray}, {sample}) is outside the source grid")]
    SourceOutOfBounds { ray: usize, sample: usize },
    #[error("{} of {rows} rows failed during build", .failures.len())]
    BuildFailed {
        failures: Vec<RowFailure>,
        rows: usize,
    },
}

pub type ConvertResult<T> = Result<T, ConvertError>;
