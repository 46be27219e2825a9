//! Lesson configuration
//!
//! Everything is compiled in: the lessons read no arguments, files or
//! environment variables beyond their one asset.

use lesson_render::{Color, GpuConfig, SurfaceConfig};
use std::path::PathBuf;

/// Screen dimension constants
pub const SCREEN_WIDTH: u32 = 640;
pub const SCREEN_HEIGHT: u32 = 480;

/// Window and asset settings for one lesson program
#[derive(Debug, Clone)]
pub struct LessonConfig {
    /// Window title
    pub title: String,
    /// Logical window width
    pub width: u32,
    /// Logical window height
    pub height: u32,
    /// The single asset the lesson loads, relative to the working directory
    pub asset_path: PathBuf,
    /// Background the frame is cleared to
    pub clear_color: Color,
    /// Present with vsync
    pub vsync: bool,
    /// GPU adapter preferences
    pub gpu: GpuConfig,
}

impl LessonConfig {
    pub fn new(title: impl Into<String>, asset_path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            asset_path: asset_path.into(),
            clear_color: Color::WHITE,
            vsync: true,
            gpu: GpuConfig::default(),
        }
    }

    /// Window + bitmap blit lesson
    pub fn hello_window() -> Self {
        Self::new("Lesson 1: Hello Window", "sample.bmp")
    }

    /// PNG texture lesson
    pub fn png_texture() -> Self {
        Self::new("Lesson 2: Textures and Extension Libraries", "../loaded.png")
    }

    /// Swapchain settings for a window of `width` x `height` physical pixels
    pub fn surface_config(&self, width: u32, height: u32) -> SurfaceConfig {
        SurfaceConfig {
            vsync: self.vsync,
            ..SurfaceConfig::new(width, height)
        }
    }
}
