//! The avatar viewer: one loaded bundle, normalized, animated, and kept
//! facing the pointer.
//!
//! Initialization is an explicit sequence, not a dependency graph:
//! load -> normalize bounds -> compute base orientation -> wire the
//! visibility lifecycle -> run the per-frame loop. Each step is a plain
//! call with clear inputs. Teardown drops the visibility subscription
//! before anything else, so no callback can reach a destroyed viewer.

use crate::animation::{Playback, Player};
use crate::asset::AvatarBundle;
use crate::bounds::{self, Fit};
use crate::mesh::Transform;
use crate::orientation::Facing;
use crate::pointer::PointerSample;
use crate::rotation::{RotationState, Sway};
use crate::scene::Scene;
use crate::signal::{Signal, Subscription};
use glam::Mat4;
use std::cell::RefCell;
use std::rc::Rc;

/// Every tuned constant of the viewer in one place.
///
/// The defaults reproduce the reference tuning; swap in a different
/// `facing` or `clip` name to support an asset with another authoring
/// convention, without touching any formula.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// World-unit size the largest model dimension is normalized to.
    pub target_size: f32,
    pub facing: Facing,
    pub sway: Sway,
    /// Name of the idle animation clip to loop.
    pub clip: String,
    /// RGBA tint for the untextured avatar.
    pub color: [f32; 4],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            target_size: 3.5,
            facing: Facing::default(),
            sway: Sway::default(),
            clip: "experiment".to_string(),
            color: [0.82, 0.8, 0.9, 1.0],
        }
    }
}

/// A live viewer instance.
///
/// Owns its scene exclusively; shares nothing mutable with other viewers.
/// Pointer and visibility state arrive through signals owned by the host.
pub struct AvatarViewer {
    // Declared first: the subscription must drop before the player it
    // captures.
    _visibility: Subscription<bool>,
    player: Rc<RefCell<Player>>,
    pointer: Signal<PointerSample>,
    rotation: RotationState,
    fit: Fit,
    scene: Scene,
    color: [f32; 4],
}

impl AvatarViewer {
    /// Wires up a freshly loaded bundle.
    ///
    /// Bounds and base orientation are computed once here and never again
    /// for this scene. If the window is already hidden the clip starts
    /// paused rather than burning frames nobody sees.
    pub fn new(
        bundle: AvatarBundle,
        config: &ViewerConfig,
        pointer: &Signal<PointerSample>,
        visibility: &Signal<bool>,
    ) -> Self {
        let scene = bundle.scene;
        let fit = bounds::fit(&bounds::scene_bounds(&scene), config.target_size);
        let rotation = RotationState::new(&config.facing, config.sway);

        let mut player = Player::new(bundle.clips);
        player.play(&config.clip);
        if !visibility.get() {
            player.pause();
        }
        let player = Rc::new(RefCell::new(player));

        let lifecycle = Rc::clone(&player);
        let subscription = visibility.subscribe(move |visible| {
            let mut player = lifecycle.borrow_mut();
            if visible {
                player.resume();
            } else {
                player.pause();
            }
        });

        Self {
            _visibility: subscription,
            player,
            pointer: pointer.clone(),
            rotation,
            fit,
            scene,
            color: config.color,
        }
    }

    /// Per-frame step, invoked once per displayed frame by the render loop.
    ///
    /// Safe to call any number of times between pointer updates: it reads
    /// only the latest sample, and the rotation update is a fixed point once
    /// current equals target.
    pub fn update(&mut self, dt: f32) {
        {
            let mut player = self.player.borrow_mut();
            player.advance(dt);
            player.apply(&mut self.scene);
        }
        self.rotation.retarget(self.pointer.get());
        self.rotation.advance();
    }

    /// Root transform for the whole avatar this frame: normalization scale
    /// and centering offset (fixed per load) plus the smoothed rotation.
    pub fn root_transform(&self) -> Transform {
        Transform::new()
            .position(self.fit.offset())
            .rotation(self.rotation.quat())
            .uniform_scale(self.fit.scale)
    }

    /// Model matrix for one scene node, hierarchy included.
    pub fn model_matrix(&self, node: usize) -> Mat4 {
        self.root_transform().matrix() * self.scene.global_transform(node)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn fit(&self) -> Fit {
        self.fit
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn playback(&self) -> Playback {
        self.player.borrow().state()
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }
}
