//! Vertex-deduplicated mesh accumulation.
//!
//! The builder keys one indexed surface per material and keeps a vertex
//! index `(position, normal, uv) → slot` per surface, so no surface ever
//! holds two identical vertices. Textures must be bound before faces are
//! added because UV derivation depends on them.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};

use crate::error::{Result, VoxelError};
use crate::material::MaterialHandle;
use crate::math::rotation_part;
use crate::mesh::{Mesh, Surface, Vertex};
use crate::texture::{Texture, TextureKind};
use crate::texture_map::TextureMap;

/// Vertex identity by exact bit pattern of its components.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey {
    position: [u32; 3],
    normal: [u32; 3],
    uv: [u32; 2],
}

impl VertexKey {
    fn new(v: &Vertex) -> Self {
        Self {
            position: v.position.to_array().map(f32::to_bits),
            normal: v.normal.to_array().map(f32::to_bits),
            uv: v.uv.to_array().map(f32::to_bits),
        }
    }
}

/// Material identity: surfaces group by handle, not by value equality.
#[derive(Clone)]
struct MaterialKey(MaterialHandle);

impl PartialEq for MaterialKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MaterialKey {}

impl std::hash::Hash for MaterialKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

#[derive(Default)]
struct IndexedSurface {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    index: HashMap<VertexKey, u32>,
}

impl IndexedSurface {
    fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let key = VertexKey::new(&vertex);
        *self.index.entry(key).or_insert_with(|| {
            let idx = self.vertices.len() as u32;
            self.vertices.push(vertex);
            idx
        })
    }
}

/// Deduplicating accumulator that produces [`Mesh`]es.
#[derive(Default)]
pub struct MeshBuilder {
    surfaces: HashMap<MaterialKey, IndexedSurface>,
    textures: Option<HashMap<TextureKind, Arc<Texture>>>,
    texture_map: Option<TextureMap>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the textures used for UV derivation. Must precede any
    /// `add_face`/`add_triangle` call.
    pub fn add_textures(&mut self, textures: HashMap<TextureKind, Arc<Texture>>) {
        self.textures = Some(textures);
    }

    /// Bind a texture atlas mapping; takes precedence over the palette.
    pub fn add_texture_map(&mut self, map: TextureMap) {
        self.texture_map = Some(map);
    }

    /// Add a quad `v1-v2-v3-v4` (top-left, top-right, bottom-left,
    /// bottom-right as seen along `normal`).
    ///
    /// The quad becomes triangles `(v1,v2,v3)` and `(v2,v4,v3)`; when the
    /// right-hand-rule normal of the corners opposes `normal`, the index
    /// order is reversed. UVs derive from the bound textures per the
    /// model's texturing mode.
    pub fn add_face(
        &mut self,
        v1: Vec3,
        v2: Vec3,
        v3: Vec3,
        v4: Vec3,
        normal: Vec3,
        color: i32,
        material: MaterialHandle,
    ) -> Result<()> {
        let [uv1, uv2, uv3, uv4] = self.derive_uvs(color, normal)?;

        let face_normal = (v2 - v1).cross(v3 - v1).normalize_or_zero();
        let surface = self.surfaces.entry(MaterialKey(material)).or_default();

        let i1 = surface.add_vertex(Vertex::new(v1, normal, uv1));
        let i2 = surface.add_vertex(Vertex::new(v2, normal, uv2));
        let i3 = surface.add_vertex(Vertex::new(v3, normal, uv3));
        let i4 = surface.add_vertex(Vertex::new(v4, normal, uv4));

        if face_normal.dot(normal) >= 0.0 {
            surface.indices.extend([i1, i2, i3, i2, i4, i3]);
        } else {
            surface.indices.extend([i3, i2, i1, i3, i4, i2]);
        }
        Ok(())
    }

    /// Add a single triangle with explicit vertex attributes. No winding
    /// correction is applied.
    pub fn add_triangle(
        &mut self,
        v1: Vertex,
        v2: Vertex,
        v3: Vertex,
        material: MaterialHandle,
    ) -> Result<()> {
        if self.textures.is_none() {
            return Err(VoxelError::MissingTextures);
        }

        let surface = self.surfaces.entry(MaterialKey(material)).or_default();
        let i1 = surface.add_vertex(v1);
        let i2 = surface.add_vertex(v2);
        let i3 = surface.add_vertex(v3);
        surface.indices.extend([i1, i2, i3]);
        Ok(())
    }

    /// Move the accumulated surfaces into a mesh and reset for reuse.
    pub fn build(&mut self) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.textures = self.textures.take().unwrap_or_default();

        for (MaterialKey(material), indexed) in self.surfaces.drain() {
            let mut surface = Surface::new(material);
            for vertex in indexed.vertices {
                surface.push_vertex(vertex);
            }
            surface.indices = indexed.indices;
            mesh.surfaces.push(surface);
        }
        mesh
    }

    /// Deduplicated concatenation of `meshes`.
    ///
    /// When `merge_into` is given, its surfaces seed the vertex index and
    /// the result extends it; otherwise a fresh mesh is produced. With
    /// `apply_model_matrix`, each input mesh's positions run through its
    /// model matrix and its normals through the rotation part.
    pub fn merge(
        &mut self,
        merge_into: Option<Mesh>,
        meshes: &[Mesh],
        apply_model_matrix: bool,
    ) -> Mesh {
        let mut result = match merge_into {
            Some(mesh) => {
                self.seed_from(&mesh);
                mesh
            }
            None => meshes.first().cloned().map_or_else(Mesh::new, |m| Mesh {
                surfaces: Vec::new(),
                model_matrix: Mat4::IDENTITY,
                ..m
            }),
        };

        for mesh in meshes {
            self.merge_one(mesh, apply_model_matrix);
        }

        result.surfaces.clear();
        for (MaterialKey(material), indexed) in self.surfaces.drain() {
            let mut surface = Surface::new(material);
            for vertex in indexed.vertices {
                surface.push_vertex(vertex);
            }
            surface.indices = indexed.indices;
            result.surfaces.push(surface);
        }
        result
    }

    /// Rebuild the vertex index from an existing mesh's surfaces.
    fn seed_from(&mut self, mesh: &Mesh) {
        for surface in &mesh.surfaces {
            let indexed = self
                .surfaces
                .entry(MaterialKey(surface.material.clone()))
                .or_default();
            for i in 0..surface.vertex_count() as u32 {
                indexed.add_vertex(surface.vertex(i));
            }
            indexed.indices.extend_from_slice(&surface.indices);
        }
    }

    fn merge_one(&mut self, mesh: &Mesh, apply_model_matrix: bool) {
        let rotation = rotation_part(&mesh.model_matrix);

        for surface in &mesh.surfaces {
            let indexed = self
                .surfaces
                .entry(MaterialKey(surface.material.clone()))
                .or_default();

            for tri in surface.indices.chunks_exact(3) {
                for &i in tri {
                    let mut v = surface.vertex(i);
                    if apply_model_matrix {
                        v.position = mesh.model_matrix.transform_point3(v.position);
                        v.normal = rotation.transform_vector3(v.normal).normalize_or_zero();
                    }
                    let idx = indexed.add_vertex(v);
                    indexed.indices.push(idx);
                }
            }
        }
    }

    /// UV corners (TL, TR, BL, BR) for a face of the given color.
    fn derive_uvs(&self, color: i32, normal: Vec3) -> Result<[Vec2; 4]> {
        let textures = self.textures.as_ref().ok_or(VoxelError::MissingTextures)?;

        if let Some(map) = &self.texture_map {
            let normal_key = normal.round().as_ivec3();
            let quad = map.face_uvs(color, normal_key).copied().unwrap_or_default();
            return Ok([quad.top_left, quad.top_right, quad.bottom_left, quad.bottom_right]);
        }

        if textures.len() == 1 {
            if let Some(palette) = textures.get(&TextureKind::Diffuse) {
                let width = palette.width() as i64;
                if (color as i64) >= width || color < 0 {
                    return Err(VoxelError::OutOfBounds {
                        index: color as i64,
                        limit: width,
                    });
                }
                let uv = Vec2::new((color as f32 + 0.5) / width as f32, 0.5);
                return Ok([uv; 4]);
            }
        }

        // Packing-space quads, resolved by a later atlas pass.
        let c = color as f32;
        Ok([
            Vec2::new(c, 0.0),
            Vec2::new(c, 2.0),
            Vec2::new(c, 1.0),
            Vec2::new(c, 3.0),
        ])
    }
}
