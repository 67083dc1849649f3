//! Triangle meshes: per-material surfaces with parallel vertex streams.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};

use crate::material::MaterialHandle;
use crate::texture::{Texture, TextureKind};

/// One mesh vertex; index `i` of a surface's streams describes vertex `i`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self { position, normal, uv }
    }
}

/// All triangles of a mesh that share one material.
#[derive(Clone, Debug, Default)]
pub struct Surface {
    pub material: MaterialHandle,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Triangle vertex references into the streams, three per triangle.
    pub indices: Vec<u32>,
}

impl Surface {
    pub fn new(material: MaterialHandle) -> Self {
        Self {
            material,
            ..Self::default()
        }
    }

    /// Append a vertex to all three streams; returns its index.
    pub fn push_vertex(&mut self, vertex: Vertex) -> u32 {
        let idx = self.positions.len() as u32;
        self.positions.push(vertex.position);
        self.normals.push(vertex.normal);
        self.uvs.push(vertex.uv);
        idx
    }

    /// Read vertex `index` back out of the streams.
    pub fn vertex(&self, index: u32) -> Vertex {
        let i = index as usize;
        Vertex::new(self.positions[i], self.normals[i], self.uvs[i])
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A named, textured collection of surfaces.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub surfaces: Vec<Surface>,
    pub textures: HashMap<TextureKind, Arc<Texture>>,
    /// Placement of the mesh as given by the voxel file's scene tree.
    pub model_matrix: Mat4,
    pub name: String,
    /// Display duration when the mesh is one frame of an animation.
    pub frame_time: Option<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            model_matrix: Mat4::IDENTITY,
            ..Self::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.surfaces.iter().map(Surface::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(Surface::triangle_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.iter().all(|s| s.indices.is_empty())
    }
}
