//! Lesson 2: Textures and Extension Libraries
//!
//! Opens a window with a GPU renderer, loads a PNG into a texture and
//! draws it every frame until the window is closed.
//!
//! Exit codes: 0 on quit, 1 if initialization fails, 2 if the PNG
//! cannot be loaded.

mod lesson;

use lesson::TextureLesson;
use lesson_shell::{exit_code, init_logging, LessonConfig};
use std::process::ExitCode;
use tracing::info;

// Use mimalloc as the global allocator for reduced memory fragmentation
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    init_logging();

    let result = lesson_shell::run::<TextureLesson>(LessonConfig::png_texture());

    let code = exit_code(&result);
    info!("png-texture exiting with code {}", code);
    ExitCode::from(code)
}
