//! CPU pixel surfaces
//!
//! [`PixelSurface`] is a plain RGBA buffer that can be filled and blitted.
//! [`WindowSurface`] is the window-sized pixel surface that gets copied to
//! the screen through a GPU texture on every [`WindowSurface::update`].

use crate::error::RenderError;
use crate::sprite::{GpuTexture, Rect, SpriteRenderer};
use crate::texture::{DrawTarget, TextureFactory};
use crate::Color;
use image::{imageops, ImageFormat, ImageReader, RgbaImage};
use std::path::Path;
use tracing::debug;

/// A CPU-side RGBA pixel buffer
#[derive(Debug, Clone)]
pub struct PixelSurface {
    pixels: RgbaImage,
}

impl PixelSurface {
    /// A surface of `width` x `height` transparent black pixels
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Load a BMP file, regardless of its extension
    pub fn load_bmp(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let mut reader = ImageReader::open(path).map_err(|e| RenderError::decode(path, e))?;
        reader.set_format(ImageFormat::Bmp);
        let image = reader.decode().map_err(|e| RenderError::decode(path, e))?;

        debug!("Loaded bitmap {} ({}x{})", path.display(), image.width(), image.height());

        Ok(Self {
            pixels: image.to_rgba8(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: Color) {
        let pixel = color.to_rgba8();
        self.pixels.pixels_mut().for_each(|p| *p = pixel);
    }

    /// Copy `src` onto this surface with its top-left corner at `(x, y)`
    ///
    /// Pixels falling outside this surface are clipped; translucent source
    /// pixels are blended over the destination.
    pub fn blit(&mut self, src: &PixelSurface, x: i64, y: i64) {
        imageops::overlay(&mut self.pixels, &src.pixels, x, y);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<image::Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// The window's pixel surface, presented through a full-window texture
pub struct WindowSurface {
    surface: PixelSurface,
    texture: GpuTexture,
}

impl WindowSurface {
    /// Allocate a `width` x `height` surface and its backing texture
    pub fn new(sprites: &SpriteRenderer, width: u32, height: u32) -> Result<Self, RenderError> {
        let surface = PixelSurface::new(width.max(1), height.max(1));
        let texture = sprites.create_texture(surface.as_image(), "Window Surface")?;
        Ok(Self { surface, texture })
    }

    pub fn surface_mut(&mut self) -> &mut PixelSurface {
        &mut self.surface
    }

    /// Reallocate for a new window size; contents are cleared
    pub fn resize(&mut self, sprites: &SpriteRenderer, width: u32, height: u32) -> Result<(), RenderError> {
        if self.surface.dimensions() == (width.max(1), height.max(1)) {
            return Ok(());
        }
        *self = Self::new(sprites, width, height)?;
        Ok(())
    }

    /// Copy the pixel surface to the GPU and queue it to cover the window
    pub fn update(&self, sprites: &mut SpriteRenderer) -> Result<(), RenderError> {
        sprites.update_texture(&self.texture, self.surface.as_image())?;
        let (width, height) = self.surface.dimensions();
        sprites.draw(&self.texture, Rect::new(0.0, 0.0, width as f32, height as f32));
        Ok(())
    }
}
