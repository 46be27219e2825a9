//! Render Surface - Direct-to-window rendering
//!
//! Manages the wgpu surface the lessons present their frames to.

use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::Color;
use std::sync::Arc;
use tracing::{debug, info};
use wgpu::{
    CommandEncoder, Device, Queue, Surface, SurfaceConfiguration,
    SurfaceTexture, TextureFormat, TextureUsages, TextureView,
};

/// Surface configuration
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// VSync enabled
    pub vsync: bool,
}

impl SurfaceConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            vsync: true,
        }
    }
}

/// Render surface for a window
pub struct RenderSurface<'window> {
    /// wgpu surface
    surface: Surface<'window>,
    /// Surface configuration
    config: SurfaceConfiguration,
    /// Preferred texture format
    format: TextureFormat,
    /// Device reference
    device: Arc<Device>,
    /// Queue reference
    queue: Arc<Queue>,
    /// Current dimensions in physical pixels
    width: u32,
    height: u32,
}

impl<'window> RenderSurface<'window> {
    /// Configure `surface` for presenting with the context's device
    pub fn new(
        gpu: &GpuContext,
        surface: Surface<'window>,
        config: SurfaceConfig,
    ) -> Result<Self, RenderError> {
        info!("Creating render surface ({}x{})", config.width, config.height);

        let caps = surface.get_capabilities(&gpu.adapter);

        // Prefer sRGB format for correct color
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Surface("surface is incompatible with the adapter".into()))?;

        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        debug!("Surface format: {:?}", format);

        let width = config.width.max(1);
        let height = config.height.max(1);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: if config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };

        surface.configure(&gpu.device, &surface_config);

        Ok(Self {
            surface,
            config: surface_config,
            format,
            device: gpu.device.clone(),
            queue: gpu.queue.clone(),
            width,
            height,
        })
    }

    /// Resize the surface
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }

        self.width = width;
        self.height = height;
        self.config.width = width;
        self.config.height = height;

        self.surface.configure(&self.device, &self.config);

        debug!("Surface resized to {}x{}", width, height);
    }

    /// Get texture format
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Begin a new frame
    pub fn begin_frame(&self) -> Result<Frame, RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigure and report the frame as skipped
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::Surface("surface lost, reconfigured".into()));
            }
            Err(e) => return Err(RenderError::Surface(e.to_string())),
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            },
        );

        Ok(Frame {
            output,
            view,
            encoder,
            queue: self.queue.clone(),
        })
    }
}

/// A frame being rendered
pub struct Frame {
    /// Swapchain texture presented at the end of the frame
    output: SurfaceTexture,
    /// Texture view for rendering
    pub view: TextureView,
    /// Command encoder
    pub encoder: CommandEncoder,
    /// Queue the encoder is submitted to
    queue: Arc<Queue>,
}

impl Frame {
    /// Begin a render pass that first clears to `color`
    pub fn begin_pass(&mut self, color: Color) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Frame Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }

    /// Submit the frame and present
    pub fn present(self) {
        self.queue.submit(std::iter::once(self.encoder.finish()));
        self.output.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_config() {
        let config = SurfaceConfig::new(640, 480);
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert!(config.vsync);
    }
}
