//! Fixed-extent dense voxel chunks.
//!
//! A chunk covers `CHUNK_EDGE`³ cells. The edge length is tied to the
//! bitmask word used by visibility derivation: two face-projection masks
//! with a one-bit boundary overlap on each side must fit in one word, so the
//! edge is half the word's bit width.

use glam::IVec3;

use crate::bbox::BBox;
use crate::voxel::Voxel;

/// Word type backing the per-row visibility masks.
pub type MaskWord = u64;

/// Side length of a chunk in voxels.
pub const CHUNK_EDGE: i32 = (MaskWord::BITS / 2) as i32;

pub(crate) const CELLS: usize = (CHUNK_EDGE * CHUNK_EDGE * CHUNK_EDGE) as usize;

/// Origin of the chunk containing `position`.
///
/// Euclidean division keeps negative coordinates in the right chunk.
#[inline]
pub fn chunk_origin(position: IVec3) -> IVec3 {
    IVec3::new(
        position.x.div_euclid(CHUNK_EDGE),
        position.y.div_euclid(CHUNK_EDGE),
        position.z.div_euclid(CHUNK_EDGE),
    ) * CHUNK_EDGE
}

/// Chunk-local offset of `position`.
#[inline]
pub fn chunk_local(position: IVec3) -> IVec3 {
    IVec3::new(
        position.x.rem_euclid(CHUNK_EDGE),
        position.y.rem_euclid(CHUNK_EDGE),
        position.z.rem_euclid(CHUNK_EDGE),
    )
}

/// A dense `CHUNK_EDGE`³ cell array with population metadata.
#[derive(Clone, Debug)]
pub struct Chunk {
    cells: Vec<Voxel>,
    /// Chunk-local bounds of the instantiated cells. Inserts expand it;
    /// erases leave it until [`Chunk::recalc_inner_bbox`] runs.
    inner_bbox: BBox,
    /// Set by any mutation, cleared by the space's `mark_as_processed`.
    pub dirty: bool,
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            cells: vec![Voxel::UNINSTANTIATED; CELLS],
            inner_bbox: BBox::empty(),
            dirty: false,
        }
    }

    #[inline]
    pub(crate) fn index(local: IVec3) -> usize {
        debug_assert!(
            local.x >= 0 && local.x < CHUNK_EDGE
                && local.y >= 0 && local.y < CHUNK_EDGE
                && local.z >= 0 && local.z < CHUNK_EDGE,
            "local offset out of chunk"
        );
        (local.x + local.y * CHUNK_EDGE + local.z * CHUNK_EDGE * CHUNK_EDGE) as usize
    }

    /// Overwrite the cell at `local`. Returns true if the cell was
    /// previously uninstantiated.
    pub fn insert(&mut self, local: IVec3, voxel: Voxel) -> bool {
        let cell = &mut self.cells[Self::index(local)];
        let was_empty = !cell.is_instantiated();
        *cell = voxel;
        self.inner_bbox.expand(local);
        self.dirty = true;
        was_empty
    }

    /// Uninstantiate the cell at `local`. Returns true if a voxel was
    /// removed. The inner bbox is not contracted.
    pub fn erase(&mut self, local: IVec3) -> bool {
        let cell = &mut self.cells[Self::index(local)];
        let was_set = cell.is_instantiated();
        *cell = Voxel::UNINSTANTIATED;
        self.dirty = true;
        was_set
    }

    #[inline]
    pub fn get(&self, local: IVec3) -> &Voxel {
        &self.cells[Self::index(local)]
    }

    #[inline]
    pub fn get_mut(&mut self, local: IVec3) -> &mut Voxel {
        &mut self.cells[Self::index(local)]
    }

    /// The instantiated voxel at `local`, if any.
    pub fn find(&self, local: IVec3) -> Option<Voxel> {
        let v = self.cells[Self::index(local)];
        v.is_instantiated().then_some(v)
    }

    /// As [`Chunk::find`], filtered by transparency class.
    pub fn find_filtered(&self, local: IVec3, opaque_only: bool) -> Option<Voxel> {
        self.find(local).filter(|v| v.transparent != opaque_only)
    }

    /// As [`Chunk::find`], restricted to visible voxels.
    pub fn find_visible(&self, local: IVec3, opaque_only: Option<bool>) -> Option<Voxel> {
        let v = self.find(local)?;
        if !v.is_visible() {
            return None;
        }
        match opaque_only {
            Some(opaque) => (v.transparent != opaque).then_some(v),
            None => Some(v),
        }
    }

    pub fn inner_bbox(&self) -> BBox {
        self.inner_bbox
    }

    /// Recompute the inner bbox tightly over the instantiated cells.
    pub fn recalc_inner_bbox(&mut self) {
        let mut bbox = BBox::empty();
        for (local, _) in self.iter_instantiated() {
            bbox.expand(local);
        }
        self.inner_bbox = bbox;
    }

    pub fn instantiated_count(&self) -> usize {
        self.cells.iter().filter(|v| v.is_instantiated()).count()
    }

    /// Overwrite the face mask of every instantiated cell from a dense
    /// mask array indexed like the cell array.
    pub(crate) fn apply_face_masks(&mut self, masks: &[crate::voxel::VoxelFaces]) {
        debug_assert_eq!(masks.len(), CELLS);
        for (cell, &faces) in self.cells.iter_mut().zip(masks) {
            if cell.is_instantiated() {
                cell.faces = faces;
            }
        }
    }

    /// Instantiated cells in storage order (x fastest, then y, then z).
    pub fn iter_instantiated(&self) -> impl Iterator<Item = (IVec3, &Voxel)> {
        self.cells.iter().enumerate().filter_map(|(i, v)| {
            v.is_instantiated().then(|| {
                let i = i as i32;
                let local = IVec3::new(
                    i % CHUNK_EDGE,
                    (i / CHUNK_EDGE) % CHUNK_EDGE,
                    i / (CHUNK_EDGE * CHUNK_EDGE),
                );
                (local, v)
            })
        })
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot handle to a chunk, in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkMeta {
    /// World origin of the chunk (each component a multiple of `CHUNK_EDGE`).
    pub origin: IVec3,
    /// The full chunk extent.
    pub total_bbox: BBox,
    /// The populated sub-extent.
    pub inner_bbox: BBox,
}
