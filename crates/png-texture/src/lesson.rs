//! PNG texture lesson

use anyhow::Context;
use lesson_render::{
    GpuContext, GpuTexture, RenderSurface, SpriteRenderer, Texture, Viewport,
};
use lesson_shell::{Lesson, LessonConfig, LessonEvent};
use std::sync::Arc;
use tracing::{debug, info};
use winit::window::Window;

/// The one texture this lesson draws and the renderer that owns it
///
/// Fields drop in declaration order: the texture goes before the
/// renderer that created it.
pub struct TextureScene {
    png: Texture<GpuTexture>,
    sprites: SpriteRenderer,
}

impl TextureScene {
    pub fn new(sprites: SpriteRenderer) -> Self {
        Self {
            png: Texture::new(),
            sprites,
        }
    }

    pub fn load_media(&mut self, config: &LessonConfig) -> anyhow::Result<()> {
        self.png
            .load_from_file(&config.asset_path, &self.sprites)
            .context("Unable to load png image")?;

        info!("Loaded {}x{} texture", self.png.width(), self.png.height());
        Ok(())
    }

    /// Drawing happens in window units, whatever the scale factor
    pub fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.logical_size();
        self.sprites.resize(width, height);
    }

    /// Queue the texture at the window's top-left corner
    pub fn queue_draws(&mut self) -> bool {
        self.png.render(&mut self.sprites, 0.0, 0.0)
    }

    pub fn flush(&mut self, pass: &mut wgpu::RenderPass<'_>) {
        self.sprites.flush(pass);
    }

    pub fn close(&mut self) {
        self.png.destroy();
    }
}

/// Renderer state for the PNG texture lesson
///
/// The scene drops before the surface, the surface before the device.
pub struct TextureLesson {
    scene: TextureScene,
    surface: RenderSurface<'static>,
    gpu: GpuContext,
}

impl Lesson for TextureLesson {
    fn init(window: Arc<Window>, config: &LessonConfig) -> anyhow::Result<Self> {
        let viewport = Viewport::from_window(&window);
        let (width, height) = viewport.physical_size();
        let surface_config = config.surface_config(width, height);

        let (gpu, surface) = pollster::block_on(GpuContext::for_window(
            config.gpu.clone(),
            window,
            surface_config,
        ))?;

        let (width, height) = viewport.logical_size();
        let sprites = SpriteRenderer::new(
            gpu.device.clone(),
            gpu.queue.clone(),
            surface.format(),
            width,
            height,
        );

        info!(
            "Renderer created ({}x{}, scale {})",
            width, height, viewport.scale_factor
        );

        Ok(Self {
            scene: TextureScene::new(sprites),
            surface,
            gpu,
        })
    }

    fn load_media(&mut self, config: &LessonConfig) -> anyhow::Result<()> {
        debug!("Device texture limit: {}", self.gpu.max_texture_dimension());
        self.scene.load_media(config)
    }

    fn on_event(&mut self, event: LessonEvent) {
        match event {
            LessonEvent::KeyDown => info!("Keyboard key down!"),
            LessonEvent::KeyUp => info!("Keyboard key up!"),
            _ => {}
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.physical_size();
        self.surface.resize(width, height);
        self.scene.resize(viewport);
    }

    fn render_frame(&mut self, config: &LessonConfig) -> anyhow::Result<()> {
        let mut frame = self.surface.begin_frame()?;

        self.scene.queue_draws();
        {
            let mut pass = frame.begin_pass(config.clear_color);
            self.scene.flush(&mut pass);
        }

        frame.present();
        Ok(())
    }

    fn close(&mut self) {
        self.scene.close();
    }
}
