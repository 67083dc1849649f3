//! Sparse voxel storage: a map from chunk origin to dense chunks.
//!
//! Chunks reference their neighbours by recomputing the origin key, never by
//! pointer, so the space stays freely movable. Mutations mark the touched
//! chunk dirty; visibility masks are only recomputed when a caller asks for
//! it via [`VoxelSpace::generate_visibility_mask`] or
//! [`VoxelSpace::update_visibility`].

mod visibility;

use std::collections::HashMap;

use glam::IVec3;

use crate::bbox::BBox;
use crate::chunk::{chunk_local, chunk_origin, Chunk, ChunkMeta, CHUNK_EDGE};
use crate::frustum::Frustum;
use crate::voxel::Voxel;

/// Sparse map of voxels organized into `CHUNK_EDGE`³ chunks.
#[derive(Clone, Debug, Default)]
pub struct VoxelSpace {
    chunks: HashMap<IVec3, Chunk>,
    voxel_count: usize,
}

impl VoxelSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instantiated voxels across all chunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.voxel_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxel_count == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The chunk with the given origin, if it exists.
    pub fn chunk_at(&self, origin: IVec3) -> Option<&Chunk> {
        self.chunks.get(&origin)
    }

    /// Insert a voxel, overwriting any existing cell.
    ///
    /// Creates the enclosing chunk on first use and marks it dirty.
    /// Visibility masks are not updated here.
    pub fn insert(&mut self, position: IVec3, voxel: Voxel) {
        let chunk = self.chunks.entry(chunk_origin(position)).or_default();
        if chunk.insert(chunk_local(position), voxel) {
            self.voxel_count += 1;
        }
    }

    /// Remove the voxel at `position`, if any.
    ///
    /// The chunk stays allocated; its inner bbox is only tightened by
    /// [`Chunk::recalc_inner_bbox`].
    pub fn erase(&mut self, position: IVec3) {
        if let Some(chunk) = self.chunks.get_mut(&chunk_origin(position)) {
            if chunk.erase(chunk_local(position)) {
                self.voxel_count -= 1;
            }
        }
    }

    /// The voxel at `position`, if instantiated.
    pub fn find(&self, position: IVec3) -> Option<Voxel> {
        self.chunks
            .get(&chunk_origin(position))?
            .find(chunk_local(position))
    }

    /// As [`VoxelSpace::find`], keeping only opaque (`opaque_only`) or only
    /// transparent (`!opaque_only`) voxels.
    pub fn find_filtered(&self, position: IVec3, opaque_only: bool) -> Option<Voxel> {
        self.chunks
            .get(&chunk_origin(position))?
            .find_filtered(chunk_local(position), opaque_only)
    }

    /// As [`VoxelSpace::find`], restricted to visible voxels and optionally
    /// filtered by transparency class.
    pub fn find_visible(&self, position: IVec3, opaque_only: Option<bool>) -> Option<Voxel> {
        self.chunks
            .get(&chunk_origin(position))?
            .find_visible(chunk_local(position), opaque_only)
    }

    /// Snapshot of all dirty chunks, optionally frustum-filtered.
    ///
    /// Dirty flags are left untouched; clear them per chunk with
    /// [`VoxelSpace::mark_as_processed`].
    pub fn query_dirty_chunks(&self, frustum: Option<&Frustum>) -> Vec<ChunkMeta> {
        self.query(frustum, true)
    }

    /// Snapshot of all chunks, optionally frustum-filtered.
    pub fn query_chunks(&self, frustum: Option<&Frustum>) -> Vec<ChunkMeta> {
        self.query(frustum, false)
    }

    fn query(&self, frustum: Option<&Frustum>, only_dirty: bool) -> Vec<ChunkMeta> {
        self.chunks
            .iter()
            .filter(|(_, chunk)| !only_dirty || chunk.dirty)
            .map(|(&origin, chunk)| meta_for(origin, chunk))
            .filter(|meta| frustum.map_or(true, |f| f.contains(&meta.total_bbox)))
            .collect()
    }

    /// Clear a chunk's dirty flag.
    pub fn mark_as_processed(&mut self, meta: &ChunkMeta) {
        if let Some(chunk) = self.chunks.get_mut(&meta.origin) {
            chunk.dirty = false;
        }
    }

    /// All visible voxels of one transparency class, keyed by world position.
    pub fn query_visible(&self, opaque: bool) -> Vec<(IVec3, Voxel)> {
        self.chunks
            .iter()
            .flat_map(|(&origin, chunk)| {
                chunk
                    .iter_instantiated()
                    .filter(move |(_, v)| v.is_visible() && v.transparent != opaque)
                    .map(move |(local, v)| (origin + local, *v))
            })
            .collect()
    }

    /// Recompute the visibility masks of every voxel in every dirty chunk.
    ///
    /// Idempotent on an unchanged space. Dirty flags are not cleared.
    pub fn generate_visibility_mask(&mut self) {
        let dirty: Vec<IVec3> = self
            .chunks
            .iter()
            .filter(|(_, c)| c.dirty)
            .map(|(&o, _)| o)
            .collect();
        log::debug!("deriving visibility masks for {} dirty chunks", dirty.len());

        for origin in dirty {
            let masks = visibility::derive_chunk(self, origin);
            if let Some(chunk) = self.chunks.get_mut(&origin) {
                chunk.apply_face_masks(&masks);
            }
        }
    }

    /// Recompute the mask of the voxel at `position` and its six neighbours.
    pub fn update_visibility(&mut self, position: IVec3) {
        let mut positions = vec![position];
        for (_, normal) in crate::voxel::VoxelFaces::DIRECTIONS {
            positions.push(position + normal);
        }

        for p in positions {
            if self.find(p).is_none() {
                continue;
            }
            let faces = visibility::derive_voxel(self, p);
            if let Some(chunk) = self.chunks.get_mut(&chunk_origin(p)) {
                chunk.get_mut(chunk_local(p)).faces = faces;
            }
        }
    }

    /// Tighten every chunk's inner bbox; erases leave them stale.
    pub fn recalc_chunk_bboxes(&mut self) {
        for chunk in self.chunks.values_mut() {
            chunk.recalc_inner_bbox();
        }
    }

    /// Remove all voxels and chunks and reset the count.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.voxel_count = 0;
    }

    /// Tight bounds over every instantiated voxel.
    pub fn bounds(&self) -> BBox {
        let mut bbox = BBox::empty();
        for (position, _) in self.iter() {
            bbox.expand(position);
        }
        if bbox.is_empty() {
            BBox::default()
        } else {
            bbox
        }
    }

    /// Forward-only pass over all instantiated voxels.
    ///
    /// The order is repeatable within a single unmodified space but
    /// otherwise unspecified; restartable scans should go through
    /// [`VoxelSpace::query_chunks`] instead.
    pub fn iter(&self) -> impl Iterator<Item = (IVec3, &Voxel)> {
        self.chunks.iter().flat_map(|(&origin, chunk)| {
            chunk
                .iter_instantiated()
                .map(move |(local, v)| (origin + local, v))
        })
    }
}

fn meta_for(origin: IVec3, chunk: &Chunk) -> ChunkMeta {
    ChunkMeta {
        origin,
        total_bbox: BBox::new(origin, origin + IVec3::splat(CHUNK_EDGE)),
        inner_bbox: chunk.inner_bbox().offset(origin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::VoxelFaces;

    fn opaque(color: i32) -> Voxel {
        Voxel::new(color, 0, false)
    }

    fn transparent(color: i32) -> Voxel {
        Voxel::new(color, 0, true)
    }

    #[test]
    fn insert_find_roundtrip() {
        let mut space = VoxelSpace::new();
        let p = IVec3::new(5, -3, 120);
        space.insert(p, opaque(7));

        let v = space.find(p).unwrap();
        assert_eq!(v.color, 7);
        assert_eq!(space.len(), 1);

        space.erase(p);
        assert!(space.find(p).is_none());
        assert_eq!(space.len(), 0);
    }

    #[test]
    fn count_tracks_distinct_positions() {
        let mut space = VoxelSpace::new();
        for i in 0..10 {
            space.insert(IVec3::new(i, 0, 0), opaque(i));
        }
        assert_eq!(space.len(), 10);

        // Overwrites do not change the count.
        space.insert(IVec3::new(3, 0, 0), opaque(99));
        assert_eq!(space.len(), 10);

        for i in 0..4 {
            space.erase(IVec3::new(i, 0, 0));
        }
        assert_eq!(space.len(), 6);

        // Erasing an absent position is a no-op.
        space.erase(IVec3::new(100, 100, 100));
        assert_eq!(space.len(), 6);
    }

    #[test]
    fn chunks_are_isolated() {
        let mut space = VoxelSpace::new();
        let p = IVec3::new(1, 1, 1);
        let q = IVec3::new(CHUNK_EDGE + 1, 1, 1);
        space.insert(p, opaque(0));
        space.insert(q, opaque(0));

        let q_inner_before = space.chunk_at(chunk_origin(q)).unwrap().inner_bbox();
        space.insert(p + IVec3::new(1, 0, 0), opaque(1));
        space.erase(p);

        let q_chunk = space.chunk_at(chunk_origin(q)).unwrap();
        assert_eq!(q_chunk.inner_bbox(), q_inner_before);
        assert!(q_chunk.find(chunk_local(q)).is_some());
    }

    #[test]
    fn dirty_set_discipline() {
        let mut space = VoxelSpace::new();
        space.insert(IVec3::ZERO, opaque(0));

        let dirty = space.query_dirty_chunks(None);
        assert_eq!(dirty.len(), 1);

        // The query itself does not clear the flag.
        assert_eq!(space.query_dirty_chunks(None).len(), 1);

        // query_chunks is a superset of query_dirty_chunks.
        assert!(space.query_chunks(None).len() >= dirty.len());

        space.mark_as_processed(&dirty[0]);
        assert!(space.query_dirty_chunks(None).is_empty());
        assert_eq!(space.query_chunks(None).len(), 1);

        // Any further mutation re-dirties the chunk.
        space.erase(IVec3::ZERO);
        assert_eq!(space.query_dirty_chunks(None).len(), 1);
    }

    #[test]
    fn recalc_tightens_inner_bboxes() {
        let mut space = VoxelSpace::new();
        space.insert(IVec3::new(0, 0, 0), opaque(0));
        space.insert(IVec3::new(9, 0, 0), opaque(0));
        space.erase(IVec3::new(9, 0, 0));

        let meta = space.query_chunks(None)[0];
        assert_eq!(meta.inner_bbox.end.x, 10);

        space.recalc_chunk_bboxes();
        let meta = space.query_chunks(None)[0];
        assert_eq!(meta.inner_bbox.end.x, 1);
    }

    #[test]
    fn clear_removes_chunks_and_count() {
        let mut space = VoxelSpace::new();
        space.insert(IVec3::ZERO, opaque(0));
        space.insert(IVec3::new(100, 0, 0), opaque(0));
        assert_eq!(space.chunk_count(), 2);

        space.clear();
        assert_eq!(space.len(), 0);
        assert_eq!(space.chunk_count(), 0);
        assert!(space.find(IVec3::ZERO).is_none());
    }

    #[test]
    fn single_voxel_has_six_faces() {
        let mut space = VoxelSpace::new();
        space.insert(IVec3::ZERO, opaque(0));
        space.generate_visibility_mask();

        let v = space.find(IVec3::ZERO).unwrap();
        assert_eq!(v.faces, VoxelFaces::all());
    }

    #[test]
    fn opaque_pair_hides_touching_faces() {
        let mut space = VoxelSpace::new();
        space.insert(IVec3::new(0, 0, 0), opaque(0));
        space.insert(IVec3::new(1, 0, 0), opaque(0));
        space.generate_visibility_mask();

        let a = space.find(IVec3::new(0, 0, 0)).unwrap();
        let b = space.find(IVec3::new(1, 0, 0)).unwrap();
        assert!(!a.faces.contains(VoxelFaces::RIGHT));
        assert!(!b.faces.contains(VoxelFaces::LEFT));
        assert_eq!(total_faces(&space), 10);
    }

    #[test]
    fn visibility_rule_table() {
        // (cur transparent, neighbor transparent, same key, expected visible)
        let cases = [
            (false, false, true, false),
            (false, false, false, false),
            (true, false, true, true),
            (false, true, true, true),
            (true, true, false, true),
            (true, true, true, false),
        ];

        for (cur_t, nb_t, same, expected) in cases {
            let mut space = VoxelSpace::new();
            let cur = Voxel::new(1, 0, cur_t);
            let nb = Voxel::new(if same { 1 } else { 2 }, 0, nb_t);
            space.insert(IVec3::new(0, 0, 0), cur);
            space.insert(IVec3::new(1, 0, 0), nb);
            space.generate_visibility_mask();

            let got = space
                .find(IVec3::new(0, 0, 0))
                .unwrap()
                .faces
                .contains(VoxelFaces::RIGHT);
            assert_eq!(
                got, expected,
                "cur_t={cur_t} nb_t={nb_t} same={same}"
            );
        }
    }

    #[test]
    fn uninstantiated_neighbour_is_visible() {
        let mut space = VoxelSpace::new();
        space.insert(IVec3::ZERO, transparent(0));
        space.generate_visibility_mask();
        assert_eq!(space.find(IVec3::ZERO).unwrap().faces, VoxelFaces::all());
    }

    #[test]
    fn derivation_is_idempotent() {
        let mut space = VoxelSpace::new();
        for i in 0..5 {
            space.insert(IVec3::new(i, 0, 0), if i % 2 == 0 { opaque(0) } else { transparent(1) });
        }
        space.generate_visibility_mask();
        let first: Vec<_> = space.iter().map(|(p, v)| (p, v.faces)).collect();

        space.generate_visibility_mask();
        let second: Vec<_> = space.iter().map(|(p, v)| (p, v.faces)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn chunk_boundary_faces_hide() {
        let mut space = VoxelSpace::new();
        let a = IVec3::new(CHUNK_EDGE - 1, 0, 0);
        let b = IVec3::new(CHUNK_EDGE, 0, 0);
        space.insert(a, opaque(0));
        space.insert(b, opaque(0));

        // Both chunks are dirty.
        assert_eq!(space.query_dirty_chunks(None).len(), 2);

        space.generate_visibility_mask();
        assert!(!space.find(a).unwrap().faces.contains(VoxelFaces::RIGHT));
        assert!(!space.find(b).unwrap().faces.contains(VoxelFaces::LEFT));
        assert_eq!(total_faces(&space), 10);
    }

    #[test]
    fn update_visibility_matches_full_derivation() {
        let mut space = VoxelSpace::new();
        space.insert(IVec3::new(0, 0, 0), opaque(0));
        space.generate_visibility_mask();

        // Incremental insert + local update.
        space.insert(IVec3::new(1, 0, 0), opaque(0));
        space.update_visibility(IVec3::new(1, 0, 0));

        let mut reference = VoxelSpace::new();
        reference.insert(IVec3::new(0, 0, 0), opaque(0));
        reference.insert(IVec3::new(1, 0, 0), opaque(0));
        reference.generate_visibility_mask();

        for (p, v) in reference.iter() {
            assert_eq!(space.find(p).unwrap().faces, v.faces, "mismatch at {p}");
        }
    }

    #[test]
    fn update_visibility_after_erase() {
        let mut space = VoxelSpace::new();
        space.insert(IVec3::new(0, 0, 0), opaque(0));
        space.insert(IVec3::new(1, 0, 0), opaque(0));
        space.generate_visibility_mask();

        space.erase(IVec3::new(1, 0, 0));
        space.update_visibility(IVec3::new(1, 0, 0));

        assert_eq!(space.find(IVec3::ZERO).unwrap().faces, VoxelFaces::all());
    }

    #[test]
    fn query_visible_filters_by_class() {
        let mut space = VoxelSpace::new();
        space.insert(IVec3::new(0, 0, 0), opaque(0));
        space.insert(IVec3::new(5, 0, 0), transparent(1));
        space.generate_visibility_mask();

        let opaque_list = space.query_visible(true);
        assert_eq!(opaque_list.len(), 1);
        assert_eq!(opaque_list[0].0, IVec3::new(0, 0, 0));

        let transparent_list = space.query_visible(false);
        assert_eq!(transparent_list.len(), 1);
        assert_eq!(transparent_list[0].0, IVec3::new(5, 0, 0));
    }

    #[test]
    fn iteration_is_repeatable() {
        let mut space = VoxelSpace::new();
        for i in 0..20 {
            space.insert(IVec3::new(i * 7 % 40, i, -i), opaque(i));
        }
        let a: Vec<_> = space.iter().map(|(p, _)| p).collect();
        let b: Vec<_> = space.iter().map(|(p, _)| p).collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
    }

    fn total_faces(space: &VoxelSpace) -> usize {
        space
            .iter()
            .map(|(_, v)| v.faces.bits().count_ones() as usize)
            .sum()
    }
}
