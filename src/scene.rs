//! CPU-side scene graph for a loaded avatar bundle.
//!
//! A [`Scene`] is a flat list of nodes (local TRS plus a parent link) and
//! the triangle geometry attached to them. It stays on the CPU so that
//! bounds computation, animation sampling, and the unit tests can all run
//! without a GPU device; upload happens separately via [`crate::Mesh`].

use crate::mesh::Vertex3d;
use glam::{Mat4, Quat, Vec3};

/// One node in the avatar's hierarchy.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: Option<String>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Index of the parent node, or `None` for a root.
    pub parent: Option<usize>,
}

impl Node {
    /// Local transform matrix in SRT order.
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Triangle geometry attached to one node.
#[derive(Clone, Debug)]
pub struct Primitive {
    /// Index of the node whose transform places this geometry.
    pub node: usize,
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

impl Primitive {
    /// Recomputes smooth vertex normals by averaging area-weighted face
    /// normals. Used when a bundle ships positions without normals.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in self.indices.chunks(3) {
            if tri.len() < 3 {
                continue;
            }
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);

            let face_normal = (p1 - p0).cross(p2 - p0);

            for &i in &[i0, i1, i2] {
                self.vertices[i].normal[0] += face_normal.x;
                self.vertices[i].normal[1] += face_normal.y;
                self.vertices[i].normal[2] += face_normal.z;
            }
        }

        for v in &mut self.vertices {
            v.normal = Vec3::from(v.normal).normalize_or_zero().into();
        }
    }
}

/// A loaded mesh hierarchy.
///
/// Owned exclusively by one viewer for its lifetime. Animation sampling
/// mutates the node TRS values in place; geometry is read-only after load.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub nodes: Vec<Node>,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    /// World transform of a node, composed root-down through its parents.
    pub fn global_transform(&self, index: usize) -> Mat4 {
        let mut matrix = self.nodes[index].local_transform();
        let mut parent = self.nodes[index].parent;
        while let Some(p) = parent {
            matrix = self.nodes[p].local_transform() * matrix;
            parent = self.nodes[p].parent;
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(parent: Option<usize>, translation: Vec3) -> Node {
        Node {
            name: None,
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent,
        }
    }

    #[test]
    fn global_transform_composes_through_parents() {
        let scene = Scene {
            nodes: vec![
                leaf(None, Vec3::new(1.0, 0.0, 0.0)),
                leaf(Some(0), Vec3::new(0.0, 2.0, 0.0)),
            ],
            primitives: vec![],
        };

        let p = scene.global_transform(1).transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn global_transform_applies_parent_scale() {
        let mut root = leaf(None, Vec3::ZERO);
        root.scale = Vec3::splat(2.0);
        let scene = Scene {
            nodes: vec![root, leaf(Some(0), Vec3::new(1.0, 0.0, 0.0))],
            primitives: vec![],
        };

        let p = scene.global_transform(1).transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn recalculated_normals_are_unit_length() {
        let mut prim = Primitive {
            node: 0,
            vertices: vec![
                Vertex3d::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0]),
                Vertex3d::new([1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0]),
                Vertex3d::new([0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0]),
            ],
            indices: vec![0, 1, 2],
        };
        prim.recalculate_normals();

        for v in &prim.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert_eq!(n, Vec3::Z);
        }
    }
}
