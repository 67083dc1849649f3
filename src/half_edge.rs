//! Single-surface mesh reconstruction over a positional vertex grid.
//!
//! Unlike [`crate::builder::MeshBuilder`], which keys vertices by the full
//! `(position, normal, uv)` triple and groups surfaces by material, this
//! path deduplicates vertices by position alone and attaches per-face
//! normal/UV data afterwards. Consumers that want exactly one surface with
//! per-vertex attributes (vertex-reduction passes, single-buffer exporters)
//! rebuild through here.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::material::MaterialHandle;
use crate::mesh::{Mesh, Surface, Vertex};

/// Spatial hash cell size for the vertex grid.
const GRID_CELL: f32 = 10.0;

struct HalfFace {
    normal: Vec3,
    uv: Vec2,
    /// Attachment identity: faces with equal normal and UV share vertex
    /// slots at coincident positions.
    hash: u64,
    vertices: [usize; 3],
}

/// Face accumulator with position-deduplicated vertices.
#[derive(Default)]
pub struct HalfMesh {
    faces: Vec<HalfFace>,
    positions: Vec<Vec3>,
    grid: HashMap<i32, Vec<usize>>,
}

impl HalfMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triangle `v1 → v2 → v3`, wound clockwise seen from outside.
    ///
    /// The face's normal and UV come from `v1`.
    pub fn add_face(&mut self, v1: Vertex, v2: Vertex, v3: Vertex) {
        let hash = attachment_hash(v1.normal, v1.uv);
        let vertices = [
            self.find_or_add_vertex(v1.position),
            self.find_or_add_vertex(v2.position),
            self.find_or_add_vertex(v3.position),
        ];
        self.faces.push(HalfFace {
            normal: v1.normal,
            uv: v1.uv,
            hash,
            vertices,
        });
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of distinct positions seen so far.
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Emit a single surface, assigning each (position, attachment) pair an
    /// index on first use, and reset the accumulator.
    pub fn build(&mut self, material: MaterialHandle) -> Mesh {
        let mut surface = Surface::new(material);
        let mut assigned: HashMap<(usize, u64), u32> = HashMap::new();

        for face in &self.faces {
            for &v in &face.vertices {
                let idx = *assigned.entry((v, face.hash)).or_insert_with(|| {
                    surface.push_vertex(Vertex::new(self.positions[v], face.normal, face.uv))
                });
                surface.indices.push(idx);
            }
        }

        self.faces.clear();
        self.positions.clear();
        self.grid.clear();

        let mut mesh = Mesh::new();
        mesh.surfaces.push(surface);
        mesh
    }

    fn find_or_add_vertex(&mut self, position: Vec3) -> usize {
        let cell = grid_index(position);
        let bucket = self.grid.entry(cell).or_default();

        if let Some(&idx) = bucket.iter().find(|&&i| self.positions[i] == position) {
            return idx;
        }

        let idx = self.positions.len();
        self.positions.push(position);
        bucket.push(idx);
        idx
    }
}

fn grid_index(position: Vec3) -> i32 {
    ((position.x / GRID_CELL) as i32)
        ^ ((position.y / GRID_CELL) as i32)
        ^ ((position.z / GRID_CELL) as i32)
}

fn attachment_hash(normal: Vec3, uv: Vec2) -> u64 {
    let n = normal.to_array().map(f32::to_bits);
    let t = uv.to_array().map(f32::to_bits);
    let nh = (n[0] as u64) ^ ((n[1] as u64) << 21) ^ ((n[2] as u64) << 42);
    let uvh = (t[0] as u64) ^ ((t[1] as u64) << 32);
    nh.wrapping_mul(19_349_663) ^ uvh.wrapping_mul(83_492_791)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use std::sync::Arc;

    fn vert(pos: Vec3, normal: Vec3) -> Vertex {
        Vertex::new(pos, normal, Vec2::ZERO)
    }

    #[test]
    fn coincident_positions_share_a_grid_vertex() {
        let mut half = HalfMesh::new();
        let n = Vec3::Z;
        half.add_face(
            vert(Vec3::new(0.0, 0.0, 0.0), n),
            vert(Vec3::new(1.0, 0.0, 0.0), n),
            vert(Vec3::new(0.0, 1.0, 0.0), n),
        );
        half.add_face(
            vert(Vec3::new(1.0, 1.0, 0.0), n),
            vert(Vec3::new(1.0, 0.0, 0.0), n),
            vert(Vec3::new(0.0, 1.0, 0.0), n),
        );

        assert_eq!(half.face_count(), 2);
        assert_eq!(half.position_count(), 4);
    }

    #[test]
    fn same_attachment_reuses_indices() {
        let mut half = HalfMesh::new();
        let n = Vec3::Z;
        half.add_face(
            vert(Vec3::new(0.0, 0.0, 0.0), n),
            vert(Vec3::new(1.0, 0.0, 0.0), n),
            vert(Vec3::new(0.0, 1.0, 0.0), n),
        );
        half.add_face(
            vert(Vec3::new(1.0, 1.0, 0.0), n),
            vert(Vec3::new(1.0, 0.0, 0.0), n),
            vert(Vec3::new(0.0, 1.0, 0.0), n),
        );

        let mesh = half.build(Arc::new(Material::default()));
        assert_eq!(mesh.surfaces.len(), 1);
        assert_eq!(mesh.surfaces[0].vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn different_normals_split_attachments() {
        let mut half = HalfMesh::new();
        half.add_face(
            vert(Vec3::new(0.0, 0.0, 0.0), Vec3::Z),
            vert(Vec3::new(1.0, 0.0, 0.0), Vec3::Z),
            vert(Vec3::new(0.0, 1.0, 0.0), Vec3::Z),
        );
        // Same positions, different facing.
        half.add_face(
            vert(Vec3::new(0.0, 0.0, 0.0), Vec3::X),
            vert(Vec3::new(1.0, 0.0, 0.0), Vec3::X),
            vert(Vec3::new(0.0, 1.0, 0.0), Vec3::X),
        );

        assert_eq!(half.position_count(), 3);
        let mesh = half.build(Arc::new(Material::default()));
        assert_eq!(mesh.surfaces[0].vertex_count(), 6);
    }

    #[test]
    fn build_resets_the_accumulator() {
        let mut half = HalfMesh::new();
        half.add_face(
            vert(Vec3::ZERO, Vec3::Z),
            vert(Vec3::X, Vec3::Z),
            vert(Vec3::Y, Vec3::Z),
        );
        let _ = half.build(Arc::new(Material::default()));

        assert_eq!(half.face_count(), 0);
        assert_eq!(half.position_count(), 0);
        let empty = half.build(Arc::new(Material::default()));
        assert_eq!(empty.triangle_count(), 0);
    }
}
