//! Window viewport
//!
//! The swapchain is sized in physical pixels, while lessons draw in
//! window units (logical pixels) so a 640x480 window shows the same
//! picture at any scale factor.

use winit::dpi::{LogicalSize, PhysicalSize};
use winit::window::Window;

/// Drawable area of a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in physical pixels
    pub width: u32,
    /// Height in physical pixels
    pub height: u32,
    /// Physical pixels per logical pixel
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    pub fn from_window(window: &Window) -> Self {
        let size = window.inner_size();
        Self::new(size.width, size.height, window.scale_factor())
    }

    /// Swapchain size
    pub fn physical_size(&self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }

    /// Drawing space size, never smaller than 1x1
    pub fn logical_size(&self) -> (u32, u32) {
        let logical: LogicalSize<f64> =
            PhysicalSize::new(self.width, self.height).to_logical(self.scale_factor);
        (
            logical.width.round().max(1.0) as u32,
            logical.height.round().max(1.0) as u32,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;
    use glam::Vec2;

    #[test]
    fn test_unscaled_viewport() {
        let viewport = Viewport::new(640, 480, 1.0);
        assert_eq!(viewport.physical_size(), (640, 480));
        assert_eq!(viewport.logical_size(), (640, 480));
    }

    #[test]
    fn test_hidpi_viewport_draws_in_window_units() {
        let viewport = Viewport::new(1280, 960, 2.0);
        assert_eq!(viewport.physical_size(), (1280, 960));
        assert_eq!(viewport.logical_size(), (640, 480));

        // A 640x480 image at the origin covers the whole window
        let (w, h) = viewport.logical_size();
        let corners = Rect::new(0.0, 0.0, 640.0, 480.0).to_ndc(Vec2::new(w as f32, h as f32));
        assert_eq!(corners[2], Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_fractional_scale_rounds() {
        let viewport = Viewport::new(961, 720, 1.5);
        assert_eq!(viewport.logical_size(), (641, 480));
    }

    #[test]
    fn test_minimized_viewport() {
        let viewport = Viewport::new(0, 0, 2.0);
        assert!(viewport.is_empty());
        assert_eq!(viewport.physical_size(), (1, 1));
        assert_eq!(viewport.logical_size(), (1, 1));
    }
}
