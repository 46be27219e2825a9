//! Render errors

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while bringing up the GPU or loading media
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to create device: {0}")]
    DeviceCreation(String),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Unable to load image {}: {message}", path.display())]
    ImageDecode { path: PathBuf, message: String },

    #[error("Unable to create texture from loaded pixels: {0}")]
    Upload(String),
}

impl RenderError {
    pub(crate) fn decode(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::ImageDecode {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
