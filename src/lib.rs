//! # Totem
//!
//! **An interactive 3D avatar viewer that keeps the model facing you.**
//!
//! Point it at a binary glTF bundle and it loads the model, scales it to a
//! predictable on-screen size, loops its idle animation, and smoothly turns
//! the whole figure toward the pointer. Hide the window and the clip pauses
//! where it stands; show it again and it picks up from the same pose.
//!
//! ## Quick Start
//!
//! ```no_run
//! use totem::{AppConfig, run};
//!
//! fn main() {
//!     env_logger::init();
//!     run(AppConfig::new().title("Totem").asset("assets/avatar.glb"));
//! }
//! ```
//!
//! ## Philosophy
//!
//! - **Fail soft** — a broken asset or missing clip logs a warning and
//!   leaves the window running; nothing panics on bad input.
//! - **Latest state wins** — pointer and visibility are plain observable
//!   values, not event queues. Consumers read the current sample whenever
//!   they render.
//! - **One update per frame** — all smoothing is stepped from the render
//!   loop, so behavior does not depend on input event rates.
//!
//! The core modules ([`bounds`], [`orientation`], [`rotation`],
//! [`animation`]) are plain math over plain data and usable without a GPU.

mod animation;
mod app;
pub mod asset;
mod bounds;
mod camera;
mod gpu;
mod mesh;
mod mesh_pass;
mod orientation;
mod pointer;
mod rotation;
mod scene;
mod signal;
mod viewer;

pub use animation::{Channel, Clip, Keyframes, Playback, Player};
pub use app::{AppConfig, run};
pub use asset::{AssetError, AvatarBundle};
pub use bounds::{Aabb, Fit, fit, scene_bounds};
pub use camera::Camera;
pub use gpu::GpuContext;
pub use mesh::{Mesh, Transform, Vertex3d};
pub use mesh_pass::{DrawCall, MeshPass};
pub use orientation::Facing;
pub use pointer::{PointerSample, PointerTracker};
pub use rotation::{Orientation, RotationState, Sway};
pub use scene::{Node, Primitive, Scene};
pub use signal::{Signal, Subscription};
pub use viewer::{AvatarViewer, ViewerConfig};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
