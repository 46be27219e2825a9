//! Lesson Render - GPU and pixel-surface drawing for the lesson programs
//!
//! A small rendering layer on top of wgpu: a GPU context bound to a
//! window, a sprite pipeline for textured rectangles, a texture wrapper
//! with strict ownership, and CPU pixel surfaces for blitting.

mod color;
mod error;
mod gpu;
mod pixels;
mod sprite;
mod surface;
mod texture;
mod viewport;

pub use color::Color;
pub use error::RenderError;
pub use gpu::{GpuConfig, GpuContext};
pub use pixels::{PixelSurface, WindowSurface};
pub use sprite::{GpuTexture, Rect, SpriteRenderer};
pub use surface::{Frame, RenderSurface, SurfaceConfig};
pub use texture::{DrawTarget, Texture, TextureFactory};
pub use viewport::Viewport;
