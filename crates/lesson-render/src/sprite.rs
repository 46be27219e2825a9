//! Sprite Renderer
//!
//! Minimal wgpu pipeline for drawing textured rectangles in screen
//! coordinates. Also owns texture creation, since every texture needs a
//! bind group built against this pipeline's layout.

use crate::error::RenderError;
use crate::texture::{DrawTarget, TextureFactory};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, Queue, RenderPipeline, Sampler,
    TextureFormat,
};

/// Destination rectangle in screen pixels, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Corners in normalized device coordinates for a screen of `screen` pixels.
    /// Order: top-left, top-right, bottom-right, bottom-left.
    pub fn to_ndc(&self, screen: Vec2) -> [Vec2; 4] {
        let to_ndc = |p: Vec2| Vec2::new(p.x / screen.x * 2.0 - 1.0, 1.0 - p.y / screen.y * 2.0);
        let min = self.origin;
        let max = self.origin + self.size;
        [
            to_ndc(min),
            to_ndc(Vec2::new(max.x, min.y)),
            to_ndc(max),
            to_ndc(Vec2::new(min.x, max.y)),
        ]
    }
}

/// A textured vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl SpriteVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// GPU-resident texture created by [`SpriteRenderer`]
///
/// Dropping it releases the texture memory.
#[derive(Debug)]
pub struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: Arc<BindGroup>,
    width: u32,
    height: u32,
}

impl GpuTexture {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

struct SpriteDraw {
    bind_group: Arc<BindGroup>,
}

/// Batches sprite draws and replays them into a render pass
pub struct SpriteRenderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    sampler: Sampler,
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    vertices: Vec<SpriteVertex>,
    draws: Vec<SpriteDraw>,
    screen_size: Vec2,
    max_texture_dimension: u32,
}

impl SpriteRenderer {
    const MAX_SPRITES: usize = 64;
    const VERTICES_PER_SPRITE: usize = 4;
    const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

    /// Create a new sprite renderer targeting `format`
    pub fn new(
        device: Arc<Device>,
        queue: Arc<Queue>,
        format: TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        // Pixel-exact blits, no filtering
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SpriteVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Vertex Buffer"),
            size: (Self::MAX_SPRITES * Self::VERTICES_PER_SPRITE * std::mem::size_of::<SpriteVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // One quad's indices; each draw offsets into the vertex buffer instead
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Index Buffer"),
            contents: bytemuck::cast_slice(&Self::QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let max_texture_dimension = device.limits().max_texture_dimension_2d;

        Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            sampler,
            vertex_buffer,
            index_buffer,
            vertices: Vec::with_capacity(Self::MAX_SPRITES * Self::VERTICES_PER_SPRITE),
            draws: Vec::with_capacity(Self::MAX_SPRITES),
            screen_size: Vec2::new(width.max(1) as f32, height.max(1) as f32),
            max_texture_dimension,
        }
    }

    /// Resize the renderer's screen space
    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Drop all queued draws
    pub fn begin(&mut self) {
        self.vertices.clear();
        self.draws.clear();
    }

    /// Number of sprites queued for the next flush
    pub fn queued(&self) -> usize {
        self.draws.len()
    }

    /// Replace the pixels of an existing texture of the same size
    pub fn update_texture(&self, texture: &GpuTexture, image: &RgbaImage) -> Result<(), RenderError> {
        if image.dimensions() != texture.dimensions() {
            return Err(RenderError::Upload(format!(
                "pixel buffer is {}x{}, texture is {}x{}",
                image.width(),
                image.height(),
                texture.width,
                texture.height
            )));
        }
        self.write_pixels(&texture.texture, image);
        Ok(())
    }

    fn write_pixels(&self, texture: &wgpu::Texture, image: &RgbaImage) {
        let (width, height) = image.dimensions();
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Record all queued sprites into `render_pass` and clear the queue
    pub fn flush(&mut self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.draws.is_empty() {
            return;
        }

        self.queue.write_buffer(
            &self.vertex_buffer,
            0,
            bytemuck::cast_slice(&self.vertices),
        );

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

        for (i, draw) in self.draws.iter().enumerate() {
            let base_vertex = (i * Self::VERTICES_PER_SPRITE) as i32;
            render_pass.set_bind_group(0, draw.bind_group.as_ref(), &[]);
            render_pass.draw_indexed(0..Self::QUAD_INDICES.len() as u32, base_vertex, 0..1);
        }

        self.begin();
    }
}

impl TextureFactory for SpriteRenderer {
    type Handle = GpuTexture;

    fn create_texture(&self, image: &RgbaImage, label: &str) -> Result<GpuTexture, RenderError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::Upload("image has no pixels".into()));
        }
        if width > self.max_texture_dimension || height > self.max_texture_dimension {
            return Err(RenderError::Upload(format!(
                "{}x{} exceeds the device limit of {}",
                width, height, self.max_texture_dimension
            )));
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.write_pixels(&texture, image);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        // Scopes pop in reverse push order
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        if let Some(err) = validation.or(out_of_memory) {
            return Err(RenderError::Upload(err.to_string()));
        }

        debug!("Created texture '{}' ({}x{})", label, width, height);

        Ok(GpuTexture {
            texture,
            bind_group: Arc::new(bind_group),
            width,
            height,
        })
    }
}

impl DrawTarget<GpuTexture> for SpriteRenderer {
    fn draw(&mut self, texture: &GpuTexture, dst: Rect) {
        if self.draws.len() >= Self::MAX_SPRITES {
            warn!("Sprite batch full, dropping draw");
            return;
        }

        let [tl, tr, br, bl] = dst.to_ndc(self.screen_size);
        self.vertices.extend_from_slice(&[
            SpriteVertex { position: tl.to_array(), uv: [0.0, 0.0] },
            SpriteVertex { position: tr.to_array(), uv: [1.0, 0.0] },
            SpriteVertex { position: br.to_array(), uv: [1.0, 1.0] },
            SpriteVertex { position: bl.to_array(), uv: [0.0, 1.0] },
        ]);
        self.draws.push(SpriteDraw {
            bind_group: texture.bind_group.clone(),
        });
    }
}
