//! Planar greedy merging over the precomputed visibility masks.
//!
//! For every face direction the chunk is swept slab by slab. Each slab
//! projects its visible faces onto per-row bitmasks; runs of set bits with
//! one merge key grow first along the row, then across rows, and each
//! maximal rectangle becomes a single quad. Consumed bits are cleared so a
//! face is emitted exactly once.

use std::sync::Arc;

use glam::IVec3;

use crate::chunk::{Chunk, ChunkMeta, CHUNK_EDGE};
use crate::error::Result;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::model::VoxelModel;
use crate::voxel::VoxelFaces;

use super::{face_quad, material_for, prepared_builder, MeshAlgorithm};

/// Per-row mask over one slab axis; the chunk edge matches its width.
type RowMask = u32;

pub(super) struct GreedyMesher;

impl MeshAlgorithm for GreedyMesher {
    fn mesh_chunk(&self, model: &VoxelModel, chunk: &ChunkMeta) -> Result<Mesh> {
        let mut builder = prepared_builder(model);
        let fallback = Arc::new(Material::default());

        let Some(chunk_data) = model.space().chunk_at(chunk.origin) else {
            return Ok(builder.build());
        };

        for (face, normal) in VoxelFaces::DIRECTIONS {
            let axis = normal
                .to_array()
                .iter()
                .position(|&c| c != 0)
                .unwrap_or(0);
            // In-plane axes in x-before-y-before-z order, matching the
            // quad corner convention.
            let (u_axis, v_axis) = match axis {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };

            for slab in 0..CHUNK_EDGE {
                let mut rows = build_slab_masks(chunk_data, face, axis, u_axis, v_axis, slab);

                for v in 0..CHUNK_EDGE {
                    while rows[v as usize] != 0 {
                        let u = rows[v as usize].trailing_zeros() as i32;
                        let (w, h) = grow_rect(chunk_data, &rows, axis, u_axis, v_axis, slab, u, v);

                        // Clear the consumed rectangle.
                        let run = (((1u64 << w) - 1) as RowMask) << u;
                        for row in rows.iter_mut().skip(v as usize).take(h as usize) {
                            *row &= !run;
                        }

                        let mut local = IVec3::ZERO;
                        local[axis] = slab;
                        local[u_axis] = u;
                        local[v_axis] = v;
                        let cell = chunk_data.get(local);
                        let material = material_for(model, cell.material, &fallback);

                        let [tl, tr, bl, br] = face_quad(chunk.origin + local, face, w, h);
                        builder.add_face(
                            tl,
                            tr,
                            bl,
                            br,
                            normal.as_vec3(),
                            cell.color,
                            material,
                        )?;
                    }
                }
            }
        }

        Ok(builder.build())
    }
}

/// Project one slab's visible faces onto per-row bitmasks.
fn build_slab_masks(
    chunk: &Chunk,
    face: VoxelFaces,
    axis: usize,
    u_axis: usize,
    v_axis: usize,
    slab: i32,
) -> [RowMask; CHUNK_EDGE as usize] {
    let mut rows = [0 as RowMask; CHUNK_EDGE as usize];
    for v in 0..CHUNK_EDGE {
        for u in 0..CHUNK_EDGE {
            let mut local = IVec3::ZERO;
            local[axis] = slab;
            local[u_axis] = u;
            local[v_axis] = v;
            let cell = chunk.get(local);
            if cell.is_instantiated() && cell.faces.contains(face) {
                rows[v as usize] |= 1 << u;
            }
        }
    }
    rows
}

/// Extend a seed at `(u, v)` first along the row, then across whole rows.
fn grow_rect(
    chunk: &Chunk,
    rows: &[RowMask; CHUNK_EDGE as usize],
    axis: usize,
    u_axis: usize,
    v_axis: usize,
    slab: i32,
    u: i32,
    v: i32,
) -> (i32, i32) {
    let key_at = |uu: i32, vv: i32| {
        let mut local = IVec3::ZERO;
        local[axis] = slab;
        local[u_axis] = uu;
        local[v_axis] = vv;
        chunk.get(local).merge_key()
    };
    let bit_set = |uu: i32, vv: i32| rows[vv as usize] & (1 << uu) != 0;

    let key = key_at(u, v);

    // The row run completes before any row extension is tried.
    let mut w = 1;
    while u + w < CHUNK_EDGE && bit_set(u + w, v) && key_at(u + w, v) == key {
        w += 1;
    }

    let mut h = 1;
    'rows: while v + h < CHUNK_EDGE {
        for uu in u..u + w {
            if !bit_set(uu, v + h) || key_at(uu, v + h) != key {
                break 'rows;
            }
        }
        h += 1;
    }

    (w, h)
}
