//! Lesson errors and exit codes

use thiserror::Error;

/// Why a lesson could not run to completion
#[derive(Debug, Error)]
pub enum LessonError {
    /// Event loop, window or renderer bring-up failed
    #[error("Unable to initialize program: {0:#}")]
    Init(anyhow::Error),

    /// The lesson's asset could not be loaded
    #[error("Unable to load media: {0:#}")]
    Media(anyhow::Error),
}

impl LessonError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            LessonError::Init(_) => 1,
            LessonError::Media(_) => 2,
        }
    }
}

/// Exit code for a finished lesson
pub fn exit_code(result: &Result<(), LessonError>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => e.exit_code(),
    }
}
