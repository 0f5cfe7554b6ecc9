//! Bounds normalization: fit an arbitrary asset to a fixed display size.
//!
//! Assets arrive at whatever scale and pivot their author chose. The viewer
//! computes the axis-aligned bounding box of the whole hierarchy, scales the
//! largest dimension to a fixed target size, and offsets the model so its
//! visual center sits at the world origin.

use crate::scene::Scene;
use glam::Vec3;
use log::warn;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty box that any point expands.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn grow(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }
}

/// Bounding box of all geometry in the scene, with each primitive's vertices
/// taken through its node's global transform.
pub fn scene_bounds(scene: &Scene) -> Aabb {
    let mut aabb = Aabb::EMPTY;
    for prim in &scene.primitives {
        let matrix = scene.global_transform(prim.node);
        for v in &prim.vertices {
            aabb.grow(matrix.transform_point3(Vec3::from(v.position)));
        }
    }
    aabb
}

/// Result of fitting a bounding box to the target size.
///
/// Computed once per load and never mutated afterwards. Recomputing from the
/// same bounds yields the same fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fit {
    /// Extent of the box before scaling.
    pub size: Vec3,
    /// Center of the box before scaling.
    pub center: Vec3,
    /// Uniform scale factor that maps the largest dimension to the target.
    pub scale: f32,
}

impl Fit {
    /// Translation that moves the scaled center to the origin.
    pub fn offset(&self) -> Vec3 {
        -self.center * self.scale
    }
}

/// Derives the uniform scale and centering offset for a bounding box.
///
/// A degenerate box (zero largest dimension, e.g. an empty bundle) gets a
/// scale of 1 instead of a division by zero; the viewer keeps going.
pub fn fit(bounds: &Aabb, target_size: f32) -> Fit {
    let size = bounds.size();
    let center = bounds.center();
    let max_dim = size.x.max(size.y).max(size.z);

    let scale = if max_dim > 0.0 {
        target_size / max_dim
    } else {
        warn!("degenerate bounds ({size:?}), skipping scale normalization");
        1.0
    };

    Fit {
        size,
        center,
        scale,
    }
}
