//! Lesson Shell - window, event loop and lifecycle for lesson programs
//!
//! Provides:
//! - app: the winit runner that drives a [`Lesson`] from init to shutdown
//! - event: input events and loop state
//! - config / error: compiled-in settings and exit-code mapping

mod app;
mod config;
mod error;
mod event;
mod lesson;
mod logging;

pub use app::{run, LessonApp};
pub use config::LessonConfig;
pub use error::{exit_code, LessonError};
pub use event::{LessonEvent, LoopAction, LoopState};
pub use lesson::Lesson;
pub use logging::init_logging;
