//! Face-visibility derivation over per-row bitmasks.
//!
//! For every axis, each line of cells through a chunk is projected onto two
//! mask words, one per transparency class. Bit `i + 1` holds the cell at
//! coordinate `i` along the axis; bits 0 and 33 carry the overlapping
//! boundary cell of the adjacent chunk, so a single shift exposes the
//! neighbour on either side. Opaque faces resolve entirely in the masks; a
//! transparent face against another transparent cell needs one extra
//! per-cell key comparison.

use glam::IVec3;

use crate::chunk::{chunk_local, chunk_origin, Chunk, MaskWord, CELLS, CHUNK_EDGE};
use crate::voxel::{Voxel, VoxelFaces};

use super::VoxelSpace;

/// Face pair (+axis, −axis) per axis index, matching the Z-up convention.
const AXIS_FACES: [(VoxelFaces, VoxelFaces); 3] = [
    (VoxelFaces::RIGHT, VoxelFaces::LEFT),
    (VoxelFaces::FORWARD, VoxelFaces::BACKWARD),
    (VoxelFaces::UP, VoxelFaces::DOWN),
];

/// Bits 1..=CHUNK_EDGE: the cells owned by this chunk.
const INTERIOR: MaskWord = ((1 << CHUNK_EDGE) - 1) << 1;

/// The §4.2 adjacency rule: is the face of `cur` toward `neighbour` visible?
pub(super) fn face_visible(cur: &Voxel, neighbour: Option<&Voxel>) -> bool {
    match neighbour {
        None => true,
        Some(n) => {
            if !cur.transparent && !n.transparent {
                false
            } else if cur.transparent != n.transparent {
                true
            } else {
                n.material != cur.material || n.color != cur.color
            }
        }
    }
}

/// Compute the full face-mask array for the chunk at `origin`.
///
/// Read-only over the space; the result is indexed like the chunk's cell
/// array and applied by the caller.
pub(super) fn derive_chunk(space: &VoxelSpace, origin: IVec3) -> Vec<VoxelFaces> {
    let mut masks = vec![VoxelFaces::empty(); CELLS];
    let Some(chunk) = space.chunk_at(origin) else {
        return masks;
    };

    for axis in 0..3 {
        derive_axis(space, origin, chunk, axis, &mut masks);
    }
    masks
}

fn derive_axis(
    space: &VoxelSpace,
    origin: IVec3,
    chunk: &Chunk,
    axis: usize,
    masks: &mut [VoxelFaces],
) {
    let (pos_face, neg_face) = AXIS_FACES[axis];
    let mut axis_unit = IVec3::ZERO;
    axis_unit[axis] = 1;

    let neg_neighbour = space.chunk_at(origin - axis_unit * CHUNK_EDGE);
    let pos_neighbour = space.chunk_at(origin + axis_unit * CHUNK_EDGE);

    // The two cross axes index the (slab, row) pairs.
    let o1 = (axis + 1) % 3;
    let o2 = (axis + 2) % 3;

    for b in 0..CHUNK_EDGE {
        for c in 0..CHUNK_EDGE {
            let local_at = |i: i32| {
                let mut p = IVec3::ZERO;
                p[axis] = i;
                p[o1] = b;
                p[o2] = c;
                p
            };

            // Project the row onto the two class masks.
            let mut opaque: MaskWord = 0;
            let mut transparent: MaskWord = 0;
            for i in 0..CHUNK_EDGE {
                let cell = chunk.get(local_at(i));
                if cell.is_instantiated() {
                    let bit = 1 << (i + 1);
                    if cell.transparent {
                        transparent |= bit;
                    } else {
                        opaque |= bit;
                    }
                }
            }
            if opaque == 0 && transparent == 0 {
                continue;
            }

            // Boundary overlap bits from the adjacent chunks.
            if let Some(nb) = neg_neighbour.and_then(|n| n.find(local_at(CHUNK_EDGE - 1))) {
                if nb.transparent {
                    transparent |= 1;
                } else {
                    opaque |= 1;
                }
            }
            if let Some(nb) = pos_neighbour.and_then(|n| n.find(local_at(0))) {
                let bit = 1 << (CHUNK_EDGE + 1);
                if nb.transparent {
                    transparent |= bit;
                } else {
                    opaque |= bit;
                }
            }

            // Opaque faces are hidden only by opaque neighbours.
            let opaque_pos = opaque & !(opaque >> 1) & INTERIOR;
            let opaque_neg = opaque & !(opaque << 1) & INTERIOR;

            // Transparent faces are candidates against transparent
            // neighbours; the merge key decides per cell.
            let transparent_pos_blocked = transparent & (transparent >> 1) & INTERIOR;
            let transparent_neg_blocked = transparent & (transparent << 1) & INTERIOR;

            for i in 0..CHUNK_EDGE {
                let bit = 1 << (i + 1);
                let idx = Chunk::index(local_at(i));

                if opaque & bit != 0 {
                    if opaque_pos & bit != 0 {
                        masks[idx] |= pos_face;
                    }
                    if opaque_neg & bit != 0 {
                        masks[idx] |= neg_face;
                    }
                } else if transparent & bit != 0 {
                    let cur = chunk.get(local_at(i));
                    let world = origin + local_at(i);

                    if transparent_pos_blocked & bit == 0
                        || transparent_keys_differ(space, cur, world + axis_unit)
                    {
                        masks[idx] |= pos_face;
                    }
                    if transparent_neg_blocked & bit == 0
                        || transparent_keys_differ(space, cur, world - axis_unit)
                    {
                        masks[idx] |= neg_face;
                    }
                }
            }
        }
    }
}

fn transparent_keys_differ(space: &VoxelSpace, cur: &Voxel, neighbour_pos: IVec3) -> bool {
    match space.find(neighbour_pos) {
        Some(n) => n.material != cur.material || n.color != cur.color,
        // The mask said a transparent neighbour exists.
        None => true,
    }
}

/// Recompute the mask of a single voxel from its six neighbours.
pub(super) fn derive_voxel(space: &VoxelSpace, position: IVec3) -> VoxelFaces {
    let origin = chunk_origin(position);
    let Some(cur) = space
        .chunk_at(origin)
        .and_then(|c| c.find(chunk_local(position)))
    else {
        return VoxelFaces::empty();
    };

    let mut faces = VoxelFaces::empty();
    for (face, normal) in VoxelFaces::DIRECTIONS {
        let neighbour = space.find(position + normal);
        if face_visible(&cur, neighbour.as_ref()) {
            faces |= face;
        }
    }
    faces
}
