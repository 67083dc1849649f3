//! Surface extraction: turns voxel models and scene trees into meshes.
//!
//! A [`Mesher`] pairs one extraction algorithm with the shared scene
//! machinery: recursive node walking with transform accumulation, animation
//! frame expansion, optional frustum culling and parallel per-chunk work.

mod chunked;
mod greedy;
mod marching_cubes;
mod simple;

use glam::{IVec3, Mat4, Vec2, Vec3};
use rayon::prelude::*;

use crate::bbox::BBox;
use crate::builder::MeshBuilder;
use crate::chunk::ChunkMeta;
use crate::error::Result;
use crate::frustum::Frustum;
use crate::material::MaterialHandle;
use crate::mesh::Mesh;
use crate::model::VoxelModel;
use crate::scene::{SceneNode, VoxelAnimation};
use crate::texture::TextureKind;
use crate::voxel::VoxelFaces;

/// The available extraction algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MesherKind {
    /// One quad per visible voxel face.
    Simple,
    /// Bitmask-accelerated planar greedy merging.
    Greedy,
    /// Cube-indexed case-table surface extraction.
    MarchingCubes,
    /// Per-chunk cuboid merging; seam-prone, kept for compatibility.
    GreedyChunked,
}

/// A meshed chunk: the chunk snapshot plus its generated geometry.
#[derive(Clone, Debug)]
pub struct MeshChunk {
    pub origin: IVec3,
    pub total_bbox: BBox,
    pub inner_bbox: BBox,
    pub mesh: Mesh,
}

/// Per-chunk extraction implemented by each algorithm.
trait MeshAlgorithm: Send + Sync {
    fn mesh_chunk(&self, model: &VoxelModel, chunk: &ChunkMeta) -> Result<Mesh>;
}

/// Algorithm-independent mesh generation entry point.
pub struct Mesher {
    algorithm: Box<dyn MeshAlgorithm>,
    frustum: Option<Frustum>,
}

impl Mesher {
    pub fn new(kind: MesherKind) -> Self {
        let algorithm: Box<dyn MeshAlgorithm> = match kind {
            MesherKind::Simple => Box::new(simple::SimpleMesher),
            MesherKind::Greedy => Box::new(greedy::GreedyMesher),
            MesherKind::MarchingCubes => Box::new(marching_cubes::MarchingCubesMesher),
            MesherKind::GreedyChunked => Box::new(chunked::ChunkedMesher),
        };
        Self {
            algorithm,
            frustum: None,
        }
    }

    /// Set or clear the frustum used to cull chunks.
    pub fn set_frustum(&mut self, frustum: Option<Frustum>) {
        self.frustum = frustum;
    }

    /// Mesh every model of a scene tree.
    ///
    /// Transforms accumulate down the tree; each produced mesh carries its
    /// node's accumulated model matrix. Invisible nodes contribute no mesh
    /// of their own but their children are still visited. Nodes holding an
    /// animation expand to one mesh per frame.
    pub fn generate_scene(&self, root: &SceneNode) -> Result<Vec<Mesh>> {
        let mut meshes = Vec::new();
        self.walk(root, Mat4::IDENTITY, &mut meshes)?;
        Ok(meshes)
    }

    fn walk(&self, node: &SceneNode, parent: Mat4, out: &mut Vec<Mesh>) -> Result<()> {
        let matrix = parent * node.model_matrix();

        if node.visible {
            if let Some(model) = &node.model {
                let mut mesh = self.generate_model_at(model, matrix)?;
                if mesh.name.is_empty() {
                    mesh.name = node.name.clone();
                }
                out.push(mesh);
            }
            if let Some(animation) = &node.animation {
                for frame in animation.frames() {
                    let mut mesh = self.generate_model_at(&frame.model, matrix)?;
                    mesh.frame_time = Some(frame.frame_time);
                    out.push(mesh);
                }
            }
        }

        for child in node.children() {
            self.walk(child, matrix, out)?;
        }
        Ok(())
    }

    /// Mesh every frame of an animation.
    pub fn generate_animation(&self, animation: &VoxelAnimation) -> Result<Vec<Mesh>> {
        animation
            .frames()
            .iter()
            .map(|frame| {
                let mut mesh = self.generate_model_at(&frame.model, Mat4::IDENTITY)?;
                mesh.frame_time = Some(frame.frame_time);
                Ok(mesh)
            })
            .collect()
    }

    /// Mesh a whole model into one deduplicated mesh.
    pub fn generate_model(&self, model: &VoxelModel) -> Result<Mesh> {
        self.generate_model_at(model, Mat4::IDENTITY)
    }

    fn generate_model_at(&self, model: &VoxelModel, matrix: Mat4) -> Result<Mesh> {
        let chunks = self.generate_chunks_at(model, false, matrix)?;
        let meshes: Vec<Mesh> = chunks.into_iter().map(|c| c.mesh).collect();

        let mut mesh = MeshBuilder::new().merge(None, &meshes, false);
        if mesh.textures.is_empty() {
            mesh.textures = model.textures.clone();
        }
        mesh.name = model.name.clone();
        mesh.model_matrix = matrix;
        Ok(mesh)
    }

    /// Mesh chunks independently and in parallel.
    ///
    /// With `only_dirty`, only chunks mutated since their last
    /// `mark_as_processed` are extracted.
    pub fn generate_chunks(&self, model: &VoxelModel, only_dirty: bool) -> Result<Vec<MeshChunk>> {
        self.generate_chunks_at(model, only_dirty, Mat4::IDENTITY)
    }

    fn generate_chunks_at(
        &self,
        model: &VoxelModel,
        only_dirty: bool,
        matrix: Mat4,
    ) -> Result<Vec<MeshChunk>> {
        let metas = if only_dirty {
            model.space().query_dirty_chunks(None)
        } else {
            model.space().query_chunks(None)
        };

        let metas: Vec<ChunkMeta> = metas
            .into_iter()
            .filter(|meta| match &self.frustum {
                Some(frustum) => {
                    let (center, extents) = transformed_aabb(&meta.total_bbox, &matrix);
                    frustum.contains_aabb(center, extents)
                }
                None => true,
            })
            .collect();
        log::debug!("meshing {} chunks of '{}'", metas.len(), model.name);

        metas
            .into_par_iter()
            .map(|meta| {
                let mesh = self.algorithm.mesh_chunk(model, &meta)?;
                Ok(MeshChunk {
                    origin: meta.origin,
                    total_bbox: meta.total_bbox,
                    inner_bbox: meta.inner_bbox,
                    mesh,
                })
            })
            .collect()
    }
}

/// Statistics about an extraction result.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshStats {
    /// Visible faces in the source model, the quad count an unmerged
    /// extraction would produce.
    pub visible_faces: usize,
    /// Quads actually emitted (triangles / 2).
    pub quad_count: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// 1.0 = perfect merging, 0.0 = no merging.
    pub merge_efficiency: f32,
}

/// Measure how well an extracted mesh merged the model's visible faces.
pub fn mesh_stats(model: &VoxelModel, mesh: &Mesh) -> MeshStats {
    let visible_faces = model
        .space()
        .iter()
        .map(|(_, v)| v.faces.bits().count_ones() as usize)
        .sum();

    let triangle_count = mesh.triangle_count();
    let quad_count = triangle_count / 2;
    let merge_efficiency = if visible_faces > 0 {
        1.0 - quad_count as f32 / visible_faces as f32
    } else {
        0.0
    };

    MeshStats {
        visible_faces,
        quad_count,
        vertex_count: mesh.vertex_count(),
        triangle_count,
        merge_efficiency,
    }
}

/// Center and extents of an integer AABB after transformation.
fn transformed_aabb(bbox: &BBox, matrix: &Mat4) -> (Vec3, Vec3) {
    let mut min = Vec3::MAX;
    let mut max = Vec3::MIN;
    for i in 0..8 {
        let corner = Vec3::new(
            (if i & 1 == 0 { bbox.beg.x } else { bbox.end.x }) as f32,
            (if i & 2 == 0 { bbox.beg.y } else { bbox.end.y }) as f32,
            (if i & 4 == 0 { bbox.beg.z } else { bbox.end.z }) as f32,
        );
        let p = matrix.transform_point3(corner);
        min = min.min(p);
        max = max.max(p);
    }
    ((min + max) * 0.5, (max - min) * 0.5)
}

/// A builder with the model's textures and atlas mapping bound.
fn prepared_builder(model: &VoxelModel) -> MeshBuilder {
    let mut builder = MeshBuilder::new();
    builder.add_textures(model.textures.clone());
    if let Some(map) = &model.texture_map {
        builder.add_texture_map(map.clone());
    }
    builder
}

/// The material handle a voxel refers to, with a shared fallback.
fn material_for(model: &VoxelModel, index: i16, fallback: &MaterialHandle) -> MaterialHandle {
    model
        .materials
        .get(index.max(0) as usize)
        .cloned()
        .unwrap_or_else(|| fallback.clone())
}

/// Palette-style UV for algorithms that do not emit per-face quads.
fn color_uv(model: &VoxelModel, color: i32) -> Vec2 {
    match model.textures.get(&TextureKind::Diffuse) {
        Some(palette) if palette.width() > 0 => {
            Vec2::new((color as f32 + 0.5) / palette.width() as f32, 0.5)
        }
        _ => Vec2::new(color as f32, 0.0),
    }
}

/// Corner positions (TL, TR, BL, BR) of a face quad.
///
/// `base` is the minimum cell covered by the quad; `w` extends along the
/// face's first in-plane axis, `h` along the second (x before y before z).
fn face_quad(base: IVec3, face: VoxelFaces, w: i32, h: i32) -> [Vec3; 4] {
    let p = base.as_vec3();
    let (origin, u, v) = match face {
        VoxelFaces::RIGHT => (p + Vec3::X, Vec3::Y, Vec3::Z),
        VoxelFaces::LEFT => (p, Vec3::Y, Vec3::Z),
        VoxelFaces::FORWARD => (p + Vec3::Y, Vec3::X, Vec3::Z),
        VoxelFaces::BACKWARD => (p, Vec3::X, Vec3::Z),
        VoxelFaces::UP => (p + Vec3::Z, Vec3::X, Vec3::Y),
        VoxelFaces::DOWN => (p, Vec3::X, Vec3::Y),
        _ => unreachable!("face_quad needs a single face"),
    };

    let u = u * w as f32;
    let v = v * h as f32;
    let bl = origin;
    let br = origin + u;
    let tl = origin + v;
    let tr = origin + u + v;
    [tl, tr, bl, br]
}
