//! Legacy chunked greedy meshing.
//!
//! Merges runs of same-key cells into rectangular cuboids per chunk and
//! emits each cuboid's outer faces wholesale. Faces are kept as soon as any
//! covered cell exposes them, so the output overdraws around partially
//! hidden regions and shows seams between chunks. Superseded by the planar
//! greedy mesher; kept because existing pipelines still select it.

use std::sync::Arc;

use glam::IVec3;

use crate::bbox::BBox;
use crate::chunk::{Chunk, ChunkMeta};
use crate::error::Result;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::model::VoxelModel;
use crate::voxel::VoxelFaces;

use super::{face_quad, material_for, prepared_builder, MeshAlgorithm};

pub(super) struct ChunkedMesher;

impl MeshAlgorithm for ChunkedMesher {
    fn mesh_chunk(&self, model: &VoxelModel, chunk: &ChunkMeta) -> Result<Mesh> {
        let mut builder = prepared_builder(model);
        let fallback = Arc::new(Material::default());

        let Some(chunk_data) = model.space().chunk_at(chunk.origin) else {
            return Ok(builder.build());
        };

        let mut consumed = std::collections::HashSet::new();
        for (local, voxel) in chunk_data.iter_instantiated() {
            if consumed.contains(&local) || !voxel.is_visible() {
                continue;
            }

            let cuboid = grow_cuboid(chunk_data, local, &consumed);
            for z in cuboid.beg.z..cuboid.end.z {
                for y in cuboid.beg.y..cuboid.end.y {
                    for x in cuboid.beg.x..cuboid.end.x {
                        consumed.insert(IVec3::new(x, y, z));
                    }
                }
            }

            let material = material_for(model, voxel.material, &fallback);
            emit_cuboid(&cuboid, chunk_data, chunk.origin, voxel.color, &material, &mut builder)?;
        }

        Ok(builder.build())
    }
}

/// Grow a box of same-key cells from `seed`: along x, then y, then z.
fn grow_cuboid(
    chunk: &Chunk,
    seed: IVec3,
    consumed: &std::collections::HashSet<IVec3>,
) -> BBox {
    let key = chunk.get(seed).merge_key();
    let edge = crate::chunk::CHUNK_EDGE;

    let free = |p: IVec3| {
        !consumed.contains(&p)
            && chunk.get(p).is_instantiated()
            && chunk.get(p).merge_key() == key
    };

    let mut end = seed + IVec3::ONE;
    while end.x < edge && free(IVec3::new(end.x, seed.y, seed.z)) {
        end.x += 1;
    }

    'y: while end.y < edge {
        for x in seed.x..end.x {
            if !free(IVec3::new(x, end.y, seed.z)) {
                break 'y;
            }
        }
        end.y += 1;
    }

    'z: while end.z < edge {
        for y in seed.y..end.y {
            for x in seed.x..end.x {
                if !free(IVec3::new(x, y, end.z)) {
                    break 'z;
                }
            }
        }
        end.z += 1;
    }

    BBox::new(seed, end)
}

/// Emit a cuboid face when any covered cell still exposes it.
fn emit_cuboid(
    cuboid: &BBox,
    chunk: &Chunk,
    origin: IVec3,
    color: i32,
    material: &Arc<Material>,
    builder: &mut crate::builder::MeshBuilder,
) -> Result<()> {
    let size = cuboid.end - cuboid.beg;

    for (face, normal) in VoxelFaces::DIRECTIONS {
        let exposed = face_cells(cuboid, face).any(|cell| chunk.get(cell).faces.contains(face));
        if !exposed {
            continue;
        }

        let (w, h, base) = match face {
            VoxelFaces::LEFT => (size.y, size.z, cuboid.beg),
            VoxelFaces::RIGHT => (
                size.y,
                size.z,
                IVec3::new(cuboid.end.x - 1, cuboid.beg.y, cuboid.beg.z),
            ),
            VoxelFaces::BACKWARD => (size.x, size.z, cuboid.beg),
            VoxelFaces::FORWARD => (
                size.x,
                size.z,
                IVec3::new(cuboid.beg.x, cuboid.end.y - 1, cuboid.beg.z),
            ),
            VoxelFaces::DOWN => (size.x, size.y, cuboid.beg),
            _ => (
                size.x,
                size.y,
                IVec3::new(cuboid.beg.x, cuboid.beg.y, cuboid.end.z - 1),
            ),
        };

        let [tl, tr, bl, br] = face_quad(origin + base, face, w, h);
        builder.add_face(tl, tr, bl, br, normal.as_vec3(), color, material.clone())?;
    }
    Ok(())
}

/// The cells of a cuboid lying on one of its faces.
fn face_cells(cuboid: &BBox, face: VoxelFaces) -> impl Iterator<Item = IVec3> + '_ {
    let (beg, end) = (cuboid.beg, cuboid.end);
    let fixed = match face {
        VoxelFaces::LEFT => (0, beg.x),
        VoxelFaces::RIGHT => (0, end.x - 1),
        VoxelFaces::BACKWARD => (1, beg.y),
        VoxelFaces::FORWARD => (1, end.y - 1),
        VoxelFaces::DOWN => (2, beg.z),
        _ => (2, end.z - 1),
    };

    (beg.z..end.z).flat_map(move |z| {
        (beg.y..end.y).flat_map(move |y| {
            (beg.x..end.x).filter_map(move |x| {
                let p = IVec3::new(x, y, z);
                (p[fixed.0] == fixed.1).then_some(p)
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::{Mesher, MesherKind};

    fn model_with(voxels: &[(IVec3, i32)]) -> VoxelModel {
        let mut model = VoxelModel::with_name("legacy");
        model.materials.push(Arc::new(Material::default()));
        for &(pos, color) in voxels {
            model.set_voxel(pos, 0, color, false);
        }
        model.space_mut().generate_visibility_mask();
        model
    }

    #[test]
    fn single_voxel_cube() {
        let model = model_with(&[(IVec3::ZERO, 0)]);
        let mesh = Mesher::new(MesherKind::GreedyChunked)
            .generate_model(&model)
            .unwrap();
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn uniform_box_is_one_cuboid() {
        let mut voxels = Vec::new();
        for x in 0..4 {
            for y in 0..3 {
                for z in 0..2 {
                    voxels.push((IVec3::new(x, y, z), 0));
                }
            }
        }
        let model = model_with(&voxels);
        let mesh = Mesher::new(MesherKind::GreedyChunked)
            .generate_model(&model)
            .unwrap();

        // One cuboid, six faces.
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn color_change_splits_cuboids() {
        let model = model_with(&[(IVec3::new(0, 0, 0), 0), (IVec3::new(1, 0, 0), 1)]);
        let mesh = Mesher::new(MesherKind::GreedyChunked)
            .generate_model(&model)
            .unwrap();

        // Two cuboids; the touching faces are mask-hidden but every other
        // face of both boxes is emitted.
        assert_eq!(mesh.triangle_count(), 20);
    }

    #[test]
    fn fully_buried_cuboid_emits_nothing() {
        let mut voxels = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    voxels.push((IVec3::new(x, y, z), if x == 1 && y == 1 && z == 1 { 1 } else { 0 }));
                }
            }
        }
        let model = model_with(&voxels);
        let mesh = Mesher::new(MesherKind::GreedyChunked)
            .generate_model(&model)
            .unwrap();

        // The differently colored center cell is invisible; no face of its
        // cuboid is exposed.
        let area: f32 = mesh
            .surfaces
            .iter()
            .flat_map(|s| s.indices.chunks_exact(3).map(|t| {
                let a = s.positions[t[0] as usize];
                let b = s.positions[t[1] as usize];
                let c = s.positions[t[2] as usize];
                (b - a).cross(c - a).length() * 0.5
            }))
            .sum();
        assert_eq!(area, 9.0 * 6.0);
    }
}
