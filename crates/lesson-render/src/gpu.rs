//! GPU Context - wgpu initialization and management
//!
//! Opens an adapter and device, optionally compatible with a window
//! surface so the same device can present to it.

use crate::error::RenderError;
use crate::surface::{RenderSurface, SurfaceConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};
use wgpu::{
    Adapter, Device, DeviceDescriptor, Features, Instance, InstanceDescriptor,
    Limits, PowerPreference, Queue, RequestAdapterOptions, Surface,
};
use winit::window::Window;

/// GPU configuration
#[derive(Debug, Clone)]
pub struct GpuConfig {
    /// Prefer low-power GPU (integrated) over high-performance (discrete)
    pub low_power: bool,
    /// Maximum texture dimension
    pub max_texture_dimension: u32,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            low_power: true,
            max_texture_dimension: 8192,
        }
    }
}

/// GPU context holding wgpu device and queue
pub struct GpuContext {
    /// wgpu instance
    pub instance: Instance,
    /// Selected adapter
    pub adapter: Adapter,
    /// Logical device
    pub device: Arc<Device>,
    /// Command queue
    pub queue: Arc<Queue>,
    /// Configuration
    pub config: GpuConfig,
}

impl GpuContext {
    /// Create a headless GPU context
    pub async fn new(config: GpuConfig) -> Result<Self, RenderError> {
        let instance = Self::create_instance();
        Self::open(instance, config, None).await
    }

    /// Create with default configuration
    pub async fn with_defaults() -> Result<Self, RenderError> {
        Self::new(GpuConfig::default()).await
    }

    /// Create a GPU context together with a configured surface for `window`
    pub async fn for_window(
        config: GpuConfig,
        window: Arc<Window>,
        surface_config: SurfaceConfig,
    ) -> Result<(Self, RenderSurface<'static>), RenderError> {
        let instance = Self::create_instance();

        let surface: Surface<'static> = instance
            .create_surface(window)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let gpu = Self::open(instance, config, Some(&surface)).await?;
        let surface = RenderSurface::new(&gpu, surface, surface_config)?;

        Ok((gpu, surface))
    }

    fn create_instance() -> Instance {
        Instance::new(&InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    async fn open(
        instance: Instance,
        config: GpuConfig,
        compatible_surface: Option<&Surface<'_>>,
    ) -> Result<Self, RenderError> {
        info!("Initializing GPU context (low_power: {})", config.low_power);

        let power_preference = if config.low_power {
            PowerPreference::LowPower
        } else {
            PowerPreference::HighPerformance
        };

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!(
            "GPU adapter: {} ({:?})",
            adapter_info.name, adapter_info.backend
        );
        debug!(
            "GPU driver: {} (vendor: {})",
            adapter_info.driver, adapter_info.vendor
        );

        let limits = required_limits(&config, &adapter.limits());
        debug!(
            "Requesting max texture dimension {}",
            limits.max_texture_dimension_2d
        );

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("Lesson GPU Device"),
                    required_features: Features::empty(),
                    required_limits: limits,
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .map_err(|e| RenderError::DeviceCreation(e.to_string()))?;

        device.on_uncaptured_error(Box::new(|error| {
            warn!("wgpu error: {}", error);
        }));

        info!("GPU context initialized successfully");

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
        })
    }

    /// Largest texture edge the device accepts
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

/// Device limits for `config`, capped by what the adapter supports
fn required_limits(config: &GpuConfig, adapter: &Limits) -> Limits {
    let mut limits = Limits::downlevel_webgl2_defaults().using_resolution(adapter.clone());
    limits.max_texture_dimension_2d = config
        .max_texture_dimension
        .min(adapter.max_texture_dimension_2d);
    limits
}
