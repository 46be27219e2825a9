//! Lesson 1: Hello Window
//!
//! Opens a window, loads a bitmap and blits it onto the window's pixel
//! surface every frame until the window is closed.

mod lesson;

use lesson::HelloLesson;
use lesson_shell::{exit_code, init_logging, LessonConfig};
use std::process::ExitCode;
use tracing::info;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    init_logging();

    let result = lesson_shell::run::<HelloLesson>(LessonConfig::hello_window());

    let code = exit_code(&result);
    info!("hello-window exiting with code {}", code);
    ExitCode::from(code)
}
