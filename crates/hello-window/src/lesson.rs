//! Bitmap blit lesson

use anyhow::Context;
use lesson_render::{
    Color, GpuContext, PixelSurface, RenderSurface, SpriteRenderer, Viewport, WindowSurface,
};
use lesson_shell::{Lesson, LessonConfig};
use std::sync::Arc;
use tracing::{info, warn};
use winit::window::Window;

/// The bitmap this lesson blits, once loaded
#[derive(Debug, Default)]
pub struct BitmapScene {
    bitmap: Option<PixelSurface>,
}

impl BitmapScene {
    pub fn load_media(&mut self, config: &LessonConfig) -> anyhow::Result<()> {
        let bitmap = PixelSurface::load_bmp(&config.asset_path)?;
        info!("Loaded {}x{} bitmap", bitmap.width(), bitmap.height());
        self.bitmap = Some(bitmap);
        Ok(())
    }

    /// Paint one frame: background, then the bitmap at the top-left corner
    pub fn compose(&self, screen: &mut PixelSurface, background: Color) {
        screen.fill(background);
        if let Some(bitmap) = &self.bitmap {
            screen.blit(bitmap, 0, 0);
        }
    }

    pub fn close(&mut self) {
        self.bitmap = None;
    }
}

/// The window's pixel surface and what it takes to present it
pub struct HelloLesson {
    scene: BitmapScene,
    screen: WindowSurface,
    sprites: SpriteRenderer,
    surface: RenderSurface<'static>,
    _gpu: GpuContext,
}

impl Lesson for HelloLesson {
    fn init(window: Arc<Window>, config: &LessonConfig) -> anyhow::Result<Self> {
        let viewport = Viewport::from_window(&window);
        let (width, height) = viewport.physical_size();
        let surface_config = config.surface_config(width, height);

        let (gpu, surface) = pollster::block_on(GpuContext::for_window(
            config.gpu.clone(),
            window,
            surface_config,
        ))?;

        // The pixel surface is in window units, like the bitmap
        let (width, height) = viewport.logical_size();
        let sprites = SpriteRenderer::new(
            gpu.device.clone(),
            gpu.queue.clone(),
            surface.format(),
            width,
            height,
        );
        let screen = WindowSurface::new(&sprites, width, height)
            .context("Window surface could not be created")?;

        info!(
            "Window surface created ({}x{}, scale {})",
            width, height, viewport.scale_factor
        );

        Ok(Self {
            scene: BitmapScene::default(),
            screen,
            sprites,
            surface,
            _gpu: gpu,
        })
    }

    fn load_media(&mut self, config: &LessonConfig) -> anyhow::Result<()> {
        self.scene.load_media(config)
    }

    fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.physical_size();
        self.surface.resize(width, height);

        let (width, height) = viewport.logical_size();
        self.sprites.resize(width, height);
        if let Err(e) = self.screen.resize(&self.sprites, width, height) {
            warn!("Failed to resize window surface: {}", e);
        }
    }

    fn render_frame(&mut self, config: &LessonConfig) -> anyhow::Result<()> {
        self.scene
            .compose(self.screen.surface_mut(), config.clear_color);

        let mut frame = self.surface.begin_frame()?;
        self.screen.update(&mut self.sprites)?;
        {
            let mut pass = frame.begin_pass(config.clear_color);
            self.sprites.flush(&mut pass);
        }

        frame.present();
        Ok(())
    }

    fn close(&mut self) {
        self.scene.close();
    }
}
