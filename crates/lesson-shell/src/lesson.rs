//! The stages every lesson program goes through

use crate::config::LessonConfig;
use crate::event::LessonEvent;
use lesson_render::Viewport;
use std::sync::Arc;
use winit::window::Window;

/// A lesson program: init, load media, draw frames, close
///
/// The runner owns the window and the lesson; the lesson owns its
/// renderer and media. Dropping the lesson must release everything it
/// acquired.
pub trait Lesson: Sized {
    /// Bring up the drawing backend for a freshly created window
    fn init(window: Arc<Window>, config: &LessonConfig) -> anyhow::Result<Self>;

    /// Load the lesson's single asset
    fn load_media(&mut self, config: &LessonConfig) -> anyhow::Result<()>;

    /// Observe an input event before the loop acts on it
    fn on_event(&mut self, _event: LessonEvent) {}

    /// The window's drawable area or scale factor changed
    fn resize(&mut self, _viewport: Viewport) {}

    /// Clear, draw the loaded media, present
    fn render_frame(&mut self, config: &LessonConfig) -> anyhow::Result<()>;

    /// Release loaded media
    fn close(&mut self);
}
