//! Per-face quad emission.
//!
//! The baseline extractor: one quad for every set bit of every visible
//! voxel's face mask. Output is correct for any voxel configuration and
//! serves as the reference the merging meshers are tested against.

use std::sync::Arc;

use crate::chunk::ChunkMeta;
use crate::error::Result;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::model::VoxelModel;
use crate::voxel::VoxelFaces;

use super::{face_quad, material_for, prepared_builder, MeshAlgorithm};

pub(super) struct SimpleMesher;

impl MeshAlgorithm for SimpleMesher {
    fn mesh_chunk(&self, model: &VoxelModel, chunk: &ChunkMeta) -> Result<Mesh> {
        let mut builder = prepared_builder(model);
        let fallback = Arc::new(Material::default());

        let Some(chunk_data) = model.space().chunk_at(chunk.origin) else {
            return Ok(builder.build());
        };

        for (local, voxel) in chunk_data.iter_instantiated() {
            if !voxel.is_visible() {
                continue;
            }
            let position = chunk.origin + local;
            let material = material_for(model, voxel.material, &fallback);

            for (face, normal) in VoxelFaces::DIRECTIONS {
                if !voxel.faces.contains(face) {
                    continue;
                }
                let [tl, tr, bl, br] = face_quad(position, face, 1, 1);
                builder.add_face(tl, tr, bl, br, normal.as_vec3(), voxel.color, material.clone())?;
            }
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::{Mesher, MesherKind};
    use glam::{IVec3, Vec3};

    fn model_with(voxels: &[(IVec3, i32, bool)]) -> VoxelModel {
        let mut model = VoxelModel::with_name("test");
        model.materials.push(Arc::new(Material::default()));
        for &(pos, color, transparent) in voxels {
            model.set_voxel(pos, 0, color, transparent);
        }
        model.space_mut().generate_visibility_mask();
        model
    }

    fn distinct_positions(mesh: &Mesh) -> usize {
        let mut set = std::collections::HashSet::new();
        for surface in &mesh.surfaces {
            for p in &surface.positions {
                set.insert(p.to_array().map(f32::to_bits));
            }
        }
        set.len()
    }

    #[test]
    fn single_voxel_cube() {
        let model = model_with(&[(IVec3::ZERO, 0, false)]);
        let mesh = Mesher::new(MesherKind::Simple).generate_model(&model).unwrap();

        // Six faces, two triangles each.
        assert_eq!(mesh.triangle_count(), 12);
        // Dedup by (position, normal, uv) keeps 4 vertices per face.
        assert_eq!(mesh.vertex_count(), 24);
        // The cube has 8 distinct corner positions.
        assert_eq!(distinct_positions(&mesh), 8);

        // All six face normals are present.
        let mut normals = std::collections::HashSet::new();
        for surface in &mesh.surfaces {
            for n in &surface.normals {
                normals.insert(n.to_array().map(f32::to_bits));
            }
        }
        assert_eq!(normals.len(), 6);
    }

    #[test]
    fn opaque_line_hides_shared_faces() {
        let model = model_with(&[
            (IVec3::new(0, 0, 0), 0, false),
            (IVec3::new(1, 0, 0), 0, false),
        ]);
        let mesh = Mesher::new(MesherKind::Simple).generate_model(&model).unwrap();

        // 10 faces remain out of 12.
        assert_eq!(mesh.triangle_count(), 20);
    }

    #[test]
    fn transparent_meets_opaque_keeps_both_faces() {
        let model = model_with(&[
            (IVec3::new(0, 0, 0), 0, false),
            (IVec3::new(1, 0, 0), 1, true),
        ]);
        let mesh = Mesher::new(MesherKind::Simple).generate_model(&model).unwrap();

        // All 12 faces: the shared boundary is visible from both sides.
        assert_eq!(mesh.triangle_count(), 24);
    }

    #[test]
    fn matching_transparent_pair_hides_shared_faces() {
        let model = model_with(&[
            (IVec3::new(0, 0, 0), 0, true),
            (IVec3::new(1, 0, 0), 0, true),
        ]);
        let mesh = Mesher::new(MesherKind::Simple).generate_model(&model).unwrap();

        assert_eq!(mesh.triangle_count(), 20);
    }

    #[test]
    fn winding_follows_face_normals() {
        let model = model_with(&[(IVec3::ZERO, 0, false)]);
        let mesh = Mesher::new(MesherKind::Simple).generate_model(&model).unwrap();

        for surface in &mesh.surfaces {
            for tri in surface.indices.chunks_exact(3) {
                let a = surface.positions[tri[0] as usize];
                let b = surface.positions[tri[1] as usize];
                let c = surface.positions[tri[2] as usize];
                let n = surface.normals[tri[0] as usize];
                let cross = (b - a).cross(c - a);
                assert!(
                    cross.dot(n) >= 0.0,
                    "triangle wound against normal {n:?}"
                );
                // Outward: the normal points away from the cube center.
                let center = Vec3::splat(0.5);
                let tri_center = (a + b + c) / 3.0;
                assert!(n.dot(tri_center - center) > 0.0);
            }
        }
    }

    #[test]
    fn masked_voxels_emit_nothing() {
        // An interior voxel of a 3x3x3 solid block has no visible face.
        let mut voxels = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    voxels.push((IVec3::new(x, y, z), 0, false));
                }
            }
        }
        let model = model_with(&voxels);
        let mesh = Mesher::new(MesherKind::Simple).generate_model(&model).unwrap();

        // 9 faces per side, 6 sides, 2 triangles per face.
        assert_eq!(mesh.triangle_count(), 9 * 6 * 2);
    }
}
