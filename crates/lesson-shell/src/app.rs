//! Lesson Runner - Event loop and lifecycle
//!
//! Drives a [`Lesson`] through its stages:
//! 1. Initializer: event loop, window, drawing backend
//! 2. Media loader: the lesson's one asset
//! 3. Event/render loop: poll events, redraw continuously until quit
//! 4. Shutdown: media, then backend, then window
//!
//! Any failure in stages 1-2 is logged, recorded, and sends the loop
//! straight to shutdown.

use crate::config::LessonConfig;
use crate::error::LessonError;
use crate::event::{LessonEvent, LoopAction, LoopState};
use crate::lesson::Lesson;
use anyhow::{anyhow, Context};
use lesson_render::Viewport;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

/// Application context shared by all stages
pub struct LessonApp<L: Lesson> {
    config: LessonConfig,
    /// Dropped last
    window: Option<Arc<Window>>,
    lesson: Option<L>,
    /// Last known drawable area
    viewport: Viewport,
    state: LoopState,
    outcome: Result<(), LessonError>,
    started: bool,
}

impl<L: Lesson> LessonApp<L> {
    pub fn new(config: LessonConfig) -> Self {
        let viewport = Viewport::new(config.width, config.height, 1.0);
        Self {
            config,
            window: None,
            lesson: None,
            viewport,
            state: LoopState::new(),
            outcome: Ok(()),
            started: false,
        }
    }

    /// Create the window and lesson, then load media
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), LessonError> {
        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| LessonError::Init(anyhow!("Window could not be created: {}", e)))?;
        let window = Arc::new(window);
        self.viewport = Viewport::from_window(&window);
        info!(
            "Window created ({}x{} physical, scale {})",
            self.viewport.width, self.viewport.height, self.viewport.scale_factor
        );
        self.window = Some(window.clone());

        let lesson = L::init(window, &self.config)
            .context("Renderer could not be created")
            .map_err(LessonError::Init)?;
        self.lesson = Some(lesson);

        self.load_media()
    }

    fn load_media(&mut self) -> Result<(), LessonError> {
        let lesson = self
            .lesson
            .as_mut()
            .ok_or_else(|| LessonError::Init(anyhow!("lesson was never initialized")))?;

        lesson
            .load_media(&self.config)
            .with_context(|| format!("Unable to load {}", self.config.asset_path.display()))
            .map_err(LessonError::Media)?;

        info!("Media loaded from {}", self.config.asset_path.display());
        Ok(())
    }

    /// Record a startup failure; the first one wins
    fn fail(&mut self, err: LessonError) {
        error!("{}", err);
        if self.outcome.is_ok() {
            self.outcome = Err(err);
        }
        self.state.quit();
    }

    /// Feed one event through the lesson and the loop state
    pub fn handle_event(&mut self, event: LessonEvent) -> LoopAction {
        if let Some(lesson) = &mut self.lesson {
            lesson.on_event(event);
        }

        match event {
            LessonEvent::Quit => info!("Quit requested"),
            LessonEvent::Resized { width, height } => {
                debug!("Window resized: {}x{}", width, height);
                self.viewport.width = width;
                self.viewport.height = height;
                self.forward_viewport();
            }
            LessonEvent::ScaleFactorChanged { scale_factor } => {
                debug!("Scale factor changed: {}", scale_factor);
                self.viewport.scale_factor = scale_factor;
                self.forward_viewport();
            }
            LessonEvent::Redraw => self.redraw(),
            _ => {}
        }

        self.state.handle(event)
    }

    /// Minimized windows keep their last drawable size
    fn forward_viewport(&mut self) {
        if self.viewport.is_empty() {
            return;
        }
        if let Some(lesson) = &mut self.lesson {
            lesson.resize(self.viewport);
        }
    }

    fn redraw(&mut self) {
        if self.state.should_quit() {
            return;
        }
        let Some(lesson) = &mut self.lesson else {
            return;
        };

        match lesson.render_frame(&self.config) {
            Ok(()) => self.state.frame_presented(),
            Err(e) => warn!("Failed to render frame: {:#}", e),
        }
    }

    /// Release media, then the backend, then the window
    ///
    /// Safe to call any number of times, and after partial startup.
    pub fn shutdown(&mut self) {
        if let Some(mut lesson) = self.lesson.take() {
            lesson.close();
            drop(lesson);
            debug!("Renderer destroyed");
        }
        if self.window.take().is_some() {
            debug!("Window destroyed");
        }
    }

    /// Shut down and report how the lesson ended
    pub fn finish(mut self) -> Result<(), LessonError> {
        self.shutdown();
        info!("Presented {} frames", self.state.frames());
        self.outcome
    }
}

impl<L: Lesson> ApplicationHandler for LessonApp<L> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(e) = self.start(event_loop) {
            self.fail(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let event = LessonEvent::from_window_event(&event);
        if self.handle_event(event) == LoopAction::Exit {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.should_quit() {
            event_loop.exit();
            return;
        }
        // Redraw continuously, no frame pacing
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Run a lesson to completion
pub fn run<L: Lesson>(config: LessonConfig) -> Result<(), LessonError> {
    info!("Starting {}", config.title);

    let event_loop = EventLoop::new()
        .context("Event loop could not be created")
        .map_err(LessonError::Init)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = LessonApp::<L>::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        app.fail(LessonError::Init(anyhow::Error::new(e).context("Event loop failed")));
    }

    app.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counters {
        closed: Cell<usize>,
        dropped: Cell<usize>,
        frames: Cell<usize>,
        keys: Cell<usize>,
        resized: Cell<Option<Viewport>>,
    }

    #[derive(Default)]
    struct FakeLesson {
        counters: Rc<Counters>,
        missing_media: bool,
        broken_frames: bool,
    }

    impl Drop for FakeLesson {
        fn drop(&mut self) {
            self.counters.dropped.set(self.counters.dropped.get() + 1);
        }
    }

    impl Lesson for FakeLesson {
        fn init(_window: Arc<Window>, _config: &LessonConfig) -> anyhow::Result<Self> {
            Ok(Self::default())
        }

        fn load_media(&mut self, config: &LessonConfig) -> anyhow::Result<()> {
            if self.missing_media {
                anyhow::bail!("{} does not exist", config.asset_path.display());
            }
            Ok(())
        }

        fn on_event(&mut self, event: LessonEvent) {
            if matches!(event, LessonEvent::KeyDown | LessonEvent::KeyUp) {
                self.counters.keys.set(self.counters.keys.get() + 1);
            }
        }

        fn resize(&mut self, viewport: Viewport) {
            self.counters.resized.set(Some(viewport));
        }

        fn render_frame(&mut self, _config: &LessonConfig) -> anyhow::Result<()> {
            if self.broken_frames {
                anyhow::bail!("surface lost");
            }
            self.counters.frames.set(self.counters.frames.get() + 1);
            Ok(())
        }

        fn close(&mut self) {
            self.counters.closed.set(self.counters.closed.get() + 1);
        }
    }

    fn app_with(lesson: FakeLesson) -> LessonApp<FakeLesson> {
        let mut app = LessonApp::new(LessonConfig::png_texture());
        app.lesson = Some(lesson);
        app
    }

    #[test]
    fn test_quit_event_ends_loop_and_releases_everything() {
        let lesson = FakeLesson::default();
        let counters = lesson.counters.clone();
        let mut app = app_with(lesson);

        assert!(app.load_media().is_ok());
        assert_eq!(app.handle_event(LessonEvent::KeyDown), LoopAction::Continue);
        assert_eq!(app.handle_event(LessonEvent::Redraw), LoopAction::Continue);
        assert_eq!(app.handle_event(LessonEvent::Quit), LoopAction::Exit);

        let result = app.finish();
        assert!(result.is_ok());
        assert_eq!(exit_code(&result), 0);
        assert_eq!(counters.frames.get(), 1);
        assert_eq!(counters.keys.get(), 1);
        assert_eq!(counters.closed.get(), 1);
        assert_eq!(counters.dropped.get(), 1);
    }

    #[test]
    fn test_missing_media_exits_with_code_2() {
        let mut lesson = FakeLesson::default();
        lesson.missing_media = true;
        let counters = lesson.counters.clone();
        let mut app = app_with(lesson);

        let err = app.load_media().unwrap_err();
        assert!(err.to_string().contains("../loaded.png"));
        app.fail(err);

        let result = app.finish();
        assert!(matches!(result, Err(LessonError::Media(_))));
        assert_eq!(exit_code(&result), 2);
        assert_eq!(counters.closed.get(), 1);
    }

    #[test]
    fn test_load_without_init_is_init_failure() {
        let mut app: LessonApp<FakeLesson> = LessonApp::new(LessonConfig::png_texture());
        let err = app.load_media().unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_first_failure_wins() {
        let mut app: LessonApp<FakeLesson> = LessonApp::new(LessonConfig::png_texture());
        app.fail(LessonError::Init(anyhow!("no display")));
        app.fail(LessonError::Media(anyhow!("missing")));
        assert_eq!(exit_code(&app.finish()), 1);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let lesson = FakeLesson::default();
        let counters = lesson.counters.clone();
        let mut app = app_with(lesson);

        app.shutdown();
        app.shutdown();
        assert!(app.finish().is_ok());
        assert_eq!(counters.closed.get(), 1);
        assert_eq!(counters.dropped.get(), 1);
    }

    #[test]
    fn test_shutdown_before_startup() {
        let mut app: LessonApp<FakeLesson> = LessonApp::new(LessonConfig::hello_window());
        app.shutdown();
        assert_eq!(app.handle_event(LessonEvent::Redraw), LoopAction::Continue);
        assert!(app.finish().is_ok());
    }

    #[test]
    fn test_failed_frame_is_skipped() {
        let mut lesson = FakeLesson::default();
        lesson.broken_frames = true;
        let mut app = app_with(lesson);

        assert_eq!(app.handle_event(LessonEvent::Redraw), LoopAction::Continue);
        assert_eq!(app.state.frames(), 0);
        assert!(app.finish().is_ok());
    }

    #[test]
    fn test_no_frames_after_quit() {
        let lesson = FakeLesson::default();
        let counters = lesson.counters.clone();
        let mut app = app_with(lesson);

        app.handle_event(LessonEvent::Quit);
        assert_eq!(app.handle_event(LessonEvent::Redraw), LoopAction::Exit);
        assert_eq!(counters.frames.get(), 0);
    }

    #[test]
    fn test_resize_forwarded_to_lesson() {
        let lesson = FakeLesson::default();
        let counters = lesson.counters.clone();
        let mut app = app_with(lesson);

        app.handle_event(LessonEvent::Resized { width: 0, height: 0 });
        assert_eq!(counters.resized.get(), None);
        app.handle_event(LessonEvent::Resized { width: 1280, height: 960 });
        assert_eq!(counters.resized.get(), Some(Viewport::new(1280, 960, 1.0)));
    }

    #[test]
    fn test_scale_factor_change_forwards_viewport() {
        let lesson = FakeLesson::default();
        let counters = lesson.counters.clone();
        let mut app = app_with(lesson);

        // Moving to a 2x display: new scale first, then the physical size
        app.handle_event(LessonEvent::ScaleFactorChanged { scale_factor: 2.0 });
        app.handle_event(LessonEvent::Resized { width: 1280, height: 960 });

        let viewport = counters.resized.get().unwrap();
        assert_eq!(viewport.scale_factor, 2.0);
        assert_eq!(viewport.physical_size(), (1280, 960));
        assert_eq!(viewport.logical_size(), (640, 480));
    }
}
