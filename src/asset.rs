//! Avatar bundle loading.
//!
//! A bundle is a binary glTF file: a node hierarchy with triangle meshes
//! plus named animation clips. Loading parses everything into CPU-side
//! [`Scene`] and [`Clip`] data; GPU upload is a separate step so that
//! parsing can happen off the render thread.
//!
//! [`prefetch`] warms a process-wide byte cache so the first viewer that
//! asks for a bundle does not pay for disk I/O; the cache outlives any
//! single viewer instance.

use crate::animation::{Channel, Clip, Keyframes};
use crate::scene::{Node, Primitive, Scene};
use crate::Vertex3d;
use glam::{Quat, Vec3};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

/// Errors that can occur while loading a bundle.
#[derive(Debug)]
pub enum AssetError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The bundle could not be parsed as glTF.
    Import(gltf::Error),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Io(e) => write!(f, "IO error: {}", e),
            AssetError::Import(e) => write!(f, "glTF import error: {}", e),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(e) => Some(e),
            AssetError::Import(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::Io(e)
    }
}

impl From<gltf::Error> for AssetError {
    fn from(e: gltf::Error) -> Self {
        AssetError::Import(e)
    }
}

/// A fully parsed bundle: the mesh hierarchy and its clip set.
///
/// Created together when the asset finishes loading and handed to one
/// viewer, which owns both for its lifetime.
#[derive(Debug)]
pub struct AvatarBundle {
    pub scene: Scene,
    pub clips: Vec<Clip>,
}

fn byte_cache() -> &'static Mutex<HashMap<PathBuf, Arc<[u8]>>> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<[u8]>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn cached_bytes(path: &Path) -> Result<Arc<[u8]>, AssetError> {
    if let Some(bytes) = byte_cache().lock().unwrap().get(path) {
        return Ok(Arc::clone(bytes));
    }
    let bytes: Arc<[u8]> = std::fs::read(path)?.into();
    byte_cache()
        .lock()
        .unwrap()
        .insert(path.to_path_buf(), Arc::clone(&bytes));
    Ok(bytes)
}

/// Reads a bundle into the process-wide byte cache ahead of first use.
pub fn prefetch(path: impl AsRef<Path>) -> Result<(), AssetError> {
    cached_bytes(path.as_ref()).map(|_| ())
}

/// Loads and parses a bundle, hitting the prefetch cache when warm.
pub fn load(path: impl AsRef<Path>) -> Result<AvatarBundle, AssetError> {
    let bytes = cached_bytes(path.as_ref())?;
    load_slice(&bytes)
}

/// Parses a bundle from in-memory bytes.
pub fn load_slice(bytes: &[u8]) -> Result<AvatarBundle, AssetError> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;

    let scene = build_scene(&document, &buffers);
    let clips = build_clips(&document, &buffers);

    Ok(AvatarBundle { scene, clips })
}

fn build_scene(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Scene {
    let mut nodes: Vec<Node> = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            Node {
                name: node.name().map(str::to_owned),
                translation: Vec3::from(translation),
                rotation: Quat::from_array(rotation),
                scale: Vec3::from(scale),
                parent: None,
            }
        })
        .collect();

    // glTF stores children, the scene wants parent links.
    for node in document.nodes() {
        for child in node.children() {
            nodes[child.index()].parent = Some(node.index());
        }
    }

    let mut primitives = Vec::new();
    for node in document.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        for prim in mesh.primitives() {
            let reader = prim.reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));

            let Some(positions) = reader.read_positions() else {
                debug!("primitive without positions on node {}, skipped", node.index());
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();

            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|iter| iter.collect())
                .unwrap_or_default();
            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|tc| tc.into_f32().collect())
                .unwrap_or_default();

            let vertices: Vec<Vertex3d> = positions
                .iter()
                .enumerate()
                .map(|(i, &position)| {
                    Vertex3d::new(
                        position,
                        normals.get(i).copied().unwrap_or([0.0, 0.0, 0.0]),
                        uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                    )
                })
                .collect();

            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_else(|| (0..vertices.len() as u32).collect());

            let mut primitive = Primitive {
                node: node.index(),
                vertices,
                indices,
            };
            if normals.is_empty() {
                primitive.recalculate_normals();
            }
            primitives.push(primitive);
        }
    }

    Scene { nodes, primitives }
}

fn build_clips(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<Clip> {
    document
        .animations()
        .map(|animation| {
            let mut channels = Vec::new();
            let mut duration = 0.0f32;

            for channel in animation.channels() {
                // Cubic-spline channels are dropped outright; STEP channels
                // are kept but blended linearly.
                // TODO: sample STEP channels without interpolating.
                if channel.sampler().interpolation() == gltf::animation::Interpolation::CubicSpline
                {
                    debug!("cubic-spline channel skipped in clip {:?}", animation.name());
                    continue;
                }

                let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));
                let Some(times) = reader.read_inputs().map(|t| t.collect::<Vec<f32>>()) else {
                    continue;
                };
                let Some(outputs) = reader.read_outputs() else {
                    continue;
                };

                use gltf::animation::util::ReadOutputs;
                let keyframes = match outputs {
                    ReadOutputs::Translations(iter) => {
                        Keyframes::Translation(iter.map(Vec3::from).collect())
                    }
                    ReadOutputs::Rotations(rotations) => Keyframes::Rotation(
                        rotations.into_f32().map(Quat::from_array).collect(),
                    ),
                    ReadOutputs::Scales(iter) => Keyframes::Scale(iter.map(Vec3::from).collect()),
                    ReadOutputs::MorphTargetWeights(_) => continue,
                };

                if let Some(&last) = times.last() {
                    duration = duration.max(last);
                }
                channels.push(Channel {
                    node: channel.target().node().index(),
                    times,
                    keyframes,
                });
            }

            Clip {
                name: animation.name().map(str::to_owned).unwrap_or_default(),
                duration,
                channels,
            }
        })
        .collect()
}
