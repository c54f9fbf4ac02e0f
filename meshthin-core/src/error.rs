//! Error types for meshthin

use thiserror::Error;

/// Main error type for meshthin operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("insufficient faces: decimation would keep {kept} faces, need at least 3")]
    InsufficientFaces { kept: usize },

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(feature = "gpu")]
impl From<wgpu::BufferAsyncError> for Error {
    fn from(e: wgpu::BufferAsyncError) -> Self {
        Error::BackendUnavailable(e.to_string())
    }
}
