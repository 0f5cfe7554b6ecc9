//! GPU context for the viewer window.
//!
//! [`GpuContext`] owns the wgpu surface, device, queue, and surface
//! configuration. There is exactly one of it, created synchronously when
//! the window appears; nothing renders until bootstrap finishes, so the
//! async adapter/device requests are just blocked on.

use log::warn;
use std::sync::Arc;
use winit::window::Window;

/// Core wgpu resources for the viewer window.
///
/// Fields are public so callers can reach the raw wgpu API when needed.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

/// Chooses how the surface composites with what is behind the window.
///
/// A transparent viewer needs a real alpha composite mode; when the
/// platform offers none, opaque is the only honest fallback.
fn pick_alpha_mode(
    available: &[wgpu::CompositeAlphaMode],
    transparent: bool,
) -> wgpu::CompositeAlphaMode {
    use wgpu::CompositeAlphaMode::{Opaque, PostMultiplied, PreMultiplied};

    if transparent {
        if let Some(mode) = [PreMultiplied, PostMultiplied]
            .into_iter()
            .find(|m| available.contains(m))
        {
            return mode;
        }
        warn!("surface offers no transparent composite mode; the window will be opaque");
    }

    if available.contains(&Opaque) {
        Opaque
    } else {
        available[0]
    }
}

impl GpuContext {
    /// Initializes wgpu for the window.
    ///
    /// With `transparent` set, the surface composites over whatever is
    /// behind the window so only the avatar shows; pair it with a
    /// zero-alpha background color. Vsync presentation (`Fifo`) keeps the
    /// once-per-displayed-frame update cadence honest.
    ///
    /// # Panics
    ///
    /// Panics if no suitable adapter is found or device creation fails;
    /// there is nothing to render without a GPU.
    pub fn new(window: Arc<Window>, transparent: bool) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .expect("Failed to create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..Default::default()
        }))
        .expect("Failed to find a suitable GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Totem Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .expect("Failed to create device");

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .unwrap_or(caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: pick_alpha_mode(&caps.alpha_modes, transparent),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
        }
    }

    /// Reconfigures the surface after a window resize. Zero-sized updates
    /// (minimize) are ignored; the previous configuration stays valid.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::CompositeAlphaMode::{Auto, Opaque, PostMultiplied, PreMultiplied};

    #[test]
    fn transparent_prefers_a_real_alpha_mode() {
        assert_eq!(
            pick_alpha_mode(&[Opaque, PostMultiplied], true),
            PostMultiplied
        );
        assert_eq!(
            pick_alpha_mode(&[Opaque, PreMultiplied, PostMultiplied], true),
            PreMultiplied
        );
    }

    #[test]
    fn transparent_without_support_falls_back_to_opaque() {
        assert_eq!(pick_alpha_mode(&[Opaque], true), Opaque);
    }

    #[test]
    fn opaque_viewers_stay_opaque() {
        assert_eq!(pick_alpha_mode(&[PreMultiplied, Opaque], false), Opaque);
        assert_eq!(pick_alpha_mode(&[Auto], false), Auto);
    }
}
