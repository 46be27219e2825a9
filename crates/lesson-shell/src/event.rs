//! Input events and loop state
//!
//! Window events are narrowed to the handful the lessons react to, so
//! the quit logic can be driven without a real window.

use winit::event::{ElementState, WindowEvent};

/// An input event as seen by a lesson
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LessonEvent {
    /// The user asked to close the window
    Quit,
    KeyDown,
    KeyUp,
    /// New size in physical pixels
    Resized { width: u32, height: u32 },
    /// The window moved to a display with a different DPI
    ScaleFactorChanged { scale_factor: f64 },
    /// The window wants a new frame
    Redraw,
    Other,
}

impl LessonEvent {
    pub fn from_window_event(event: &WindowEvent) -> Self {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => LessonEvent::Quit,
            WindowEvent::KeyboardInput { event, .. } => match event.state {
                ElementState::Pressed => LessonEvent::KeyDown,
                ElementState::Released => LessonEvent::KeyUp,
            },
            WindowEvent::Resized(size) => LessonEvent::Resized {
                width: size.width,
                height: size.height,
            },
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                LessonEvent::ScaleFactorChanged {
                    scale_factor: *scale_factor,
                }
            }
            WindowEvent::RedrawRequested => LessonEvent::Redraw,
            _ => LessonEvent::Other,
        }
    }
}

/// What the loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Exit,
}

/// Main loop bookkeeping
#[derive(Debug, Default)]
pub struct LoopState {
    quit: bool,
    frames: u64,
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event; once quit is seen the loop stays quit
    pub fn handle(&mut self, event: LessonEvent) -> LoopAction {
        if event == LessonEvent::Quit {
            self.quit = true;
        }
        if self.quit {
            LoopAction::Exit
        } else {
            LoopAction::Continue
        }
    }

    /// Request an exit without an input event
    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn frame_presented(&mut self) {
        self.frames += 1;
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
