//! The windowed application shell.
//!
//! Owns the event loop, the GPU context, and the process-wide pointer and
//! visibility signals. The asset loads on a worker thread while the shell
//! renders empty frames; once the parsed bundle arrives over the channel,
//! geometry is uploaded and the viewer takes over. The viewer's `update`
//! runs exactly once per `RedrawRequested`, which is the render engine's
//! once-per-displayed-frame contract.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use glam::Vec3;
use log::{info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::asset::{self, AssetError, AvatarBundle};
use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::mesh::Mesh;
use crate::mesh_pass::{DrawCall, MeshPass};
use crate::pointer::PointerTracker;
use crate::signal::Signal;
use crate::viewer::{AvatarViewer, ViewerConfig};

/// Window and viewer configuration.
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Path to the binary glTF bundle to display.
    pub asset_path: PathBuf,
    /// Camera height above the ground plane; X and Z come from the
    /// viewer's facing config so the model actually looks at the camera.
    pub camera_height: f32,
    /// Composite the window over the desktop so only the avatar shows.
    /// Pair with a zero-alpha `background`.
    pub transparent: bool,
    pub background: wgpu::Color,
    pub viewer: ViewerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Totem".to_string(),
            width: 800,
            height: 600,
            asset_path: PathBuf::from("assets/avatar.glb"),
            camera_height: 1.0,
            transparent: false,
            background: wgpu::Color {
                r: 0.07,
                g: 0.07,
                b: 0.1,
                a: 1.0,
            },
            viewer: ViewerConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn asset(mut self, path: impl Into<PathBuf>) -> Self {
        self.asset_path = path.into();
        self
    }

    /// Transparent desktop-companion mode: the window composites over
    /// whatever is behind it and the background clears to zero alpha.
    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self.background = wgpu::Color::TRANSPARENT;
        self
    }

    pub fn viewer(mut self, viewer: ViewerConfig) -> Self {
        self.viewer = viewer;
        self
    }
}

/// Runs the viewer until the window closes.
pub fn run(config: AppConfig) {
    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TotemApp::Pending {
        config: Some(config),
    };
    event_loop.run_app(&mut app).unwrap();
}

enum TotemApp {
    Pending {
        config: Option<AppConfig>,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        mesh_pass: MeshPass,
        camera: Camera,
        pointer: PointerTracker,
        visibility: Signal<bool>,
        viewer_config: ViewerConfig,
        background: wgpu::Color,
        /// Loader channel; `None` once the load resolved either way.
        loading: Option<Receiver<Result<AvatarBundle, AssetError>>>,
        viewer: Option<AvatarViewer>,
        /// GPU mesh per primitive, with the scene node that places it.
        meshes: Vec<(Mesh, usize)>,
        start_time: Instant,
        last_frame: Instant,
    },
}

impl ApplicationHandler for TotemApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let TotemApp::Pending { config } = self else {
            return;
        };
        let config = config.take().expect("resumed twice while pending");

        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_transparent(config.transparent)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs).unwrap());
        let gpu = GpuContext::new(window.clone(), config.transparent);
        let mesh_pass = MeshPass::new(&gpu);

        // The camera sits where the facing computation expects it.
        let facing = config.viewer.facing;
        let camera = Camera::new()
            .at(Vec3::new(facing.camera_x, config.camera_height, facing.camera_z))
            .looking_at(Vec3::ZERO)
            .with_fov(45.0);

        // Parse on a worker thread; the shell renders an empty scene until
        // the bundle arrives. No timeout, no retry: a failed load just
        // leaves the viewer empty.
        let (tx, rx) = mpsc::channel();
        let path = config.asset_path.clone();
        std::thread::spawn(move || {
            let _ = tx.send(asset::load(&path));
        });

        *self = TotemApp::Running {
            window,
            gpu,
            mesh_pass,
            camera,
            pointer: PointerTracker::new(),
            visibility: Signal::new(true),
            viewer_config: config.viewer,
            background: config.background,
            loading: Some(rx),
            viewer: None,
            meshes: Vec::new(),
            start_time: Instant::now(),
            last_frame: Instant::now(),
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let TotemApp::Running {
            window,
            gpu,
            mesh_pass,
            camera,
            pointer,
            visibility,
            viewer_config,
            background,
            loading,
            viewer,
            meshes,
            start_time,
            last_frame,
        } = self
        else {
            return;
        };

        pointer.handle_event(&event, gpu.width(), gpu.height());

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
            }
            WindowEvent::Occluded(hidden) => {
                // The native analogue of the document visibility signal.
                visibility.set(!hidden);
            }
            WindowEvent::RedrawRequested => {
                // Resolve a finished load, if any.
                if let Some(rx) = loading {
                    match rx.try_recv() {
                        Ok(Ok(bundle)) => {
                            *meshes = bundle
                                .scene
                                .primitives
                                .iter()
                                .map(|p| (Mesh::new(gpu, &p.vertices, &p.indices), p.node))
                                .collect();
                            *viewer = Some(AvatarViewer::new(
                                bundle,
                                viewer_config,
                                &pointer.signal(),
                                visibility,
                            ));
                            *loading = None;
                            info!("avatar bundle loaded ({} meshes)", meshes.len());
                        }
                        Ok(Err(e)) => {
                            // Fail soft: the viewer stays empty.
                            warn!("avatar bundle failed to load: {e}");
                            *loading = None;
                        }
                        Err(TryRecvError::Empty) => {}
                        Err(TryRecvError::Disconnected) => {
                            *loading = None;
                        }
                    }
                }

                let now = Instant::now();
                let time = start_time.elapsed().as_secs_f32();
                let dt = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;

                let mut draw_calls = Vec::with_capacity(meshes.len());
                if let Some(viewer) = viewer {
                    viewer.update(dt);
                    for (mesh, node) in meshes.iter() {
                        draw_calls.push(DrawCall {
                            mesh,
                            model: viewer.model_matrix(*node),
                            color: viewer.color(),
                        });
                    }
                }

                match mesh_pass.render(gpu, camera, time, *background, &draw_calls) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu.resize(gpu.width(), gpu.height());
                    }
                    Err(e) => {
                        warn!("surface error: {e}");
                    }
                }

                window.request_redraw();
            }
            _ => {}
        }
    }
}
