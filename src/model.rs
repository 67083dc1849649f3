//! The user-facing voxel model container.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{IVec3, Vec3};

use crate::bbox::BBox;
use crate::material::MaterialHandle;
use crate::space::VoxelSpace;
use crate::texture::{Texture, TextureKind};
use crate::texture_map::TextureMap;
use crate::voxel::Voxel;

/// How a model's color indices translate to UVs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TexturingKind {
    /// Each color index points at a single pixel of a palette strip.
    #[default]
    Indexed,
    /// Each color index points at a tile of a texture atlas.
    Textured,
}

/// A voxel space with its materials, textures and texturing metadata.
///
/// Models are aggregate roots: the application owns them and shares them
/// into scene trees as [`VoxelModelHandle`]s.
#[derive(Clone, Debug, Default)]
pub struct VoxelModel {
    pub name: String,
    pub pivot: Vec3,
    pub texturing: TexturingKind,
    pub texture_map: Option<TextureMap>,
    pub materials: Vec<MaterialHandle>,
    pub textures: HashMap<TextureKind, Arc<Texture>>,
    bbox: BBox,
    space: VoxelSpace,
}

impl VoxelModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn space(&self) -> &VoxelSpace {
        &self.space
    }

    #[inline]
    pub fn space_mut(&mut self) -> &mut VoxelSpace {
        &mut self.space
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// Store a bounding box directly (loaders know it up front).
    pub fn set_bbox(&mut self, bbox: BBox) {
        self.bbox = bbox;
    }

    /// Recompute the bounding box from the stored voxels, tightening the
    /// chunk bboxes along the way.
    pub fn recalc_bbox(&mut self) {
        self.space.recalc_chunk_bboxes();
        self.bbox = self.space.bounds();
    }

    /// Place a voxel. A convenience over `space_mut().insert`.
    pub fn set_voxel(&mut self, position: IVec3, material: i16, color: i32, transparent: bool) {
        self.space.insert(position, Voxel::new(color, material, transparent));
    }

    pub fn remove_voxel(&mut self, position: IVec3) {
        self.space.erase(position);
    }

    pub fn voxel(&self, position: IVec3) -> Option<Voxel> {
        self.space.find(position)
    }

    pub fn visible_voxel(&self, position: IVec3) -> Option<Voxel> {
        self.space.find_visible(position, None)
    }

    pub fn voxel_count(&self) -> usize {
        self.space.len()
    }

    /// Drop all voxels and chunks; materials and textures stay.
    pub fn clear(&mut self) {
        self.space.clear();
        self.bbox = BBox::default();
    }
}

/// Shared model reference as held by scene nodes and animations.
pub type VoxelModelHandle = Arc<VoxelModel>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    #[test]
    fn set_and_get_voxel() {
        let mut model = VoxelModel::with_name("crate");
        model.set_voxel(IVec3::new(1, 2, 3), 0, 5, false);

        let v = model.voxel(IVec3::new(1, 2, 3)).unwrap();
        assert_eq!(v.color, 5);
        assert_eq!(v.material, 0);
        assert_eq!(model.voxel_count(), 1);
    }

    #[test]
    fn set_bbox_stores_the_value() {
        let mut model = VoxelModel::new();
        let bbox = BBox::new(IVec3::ZERO, IVec3::new(4, 4, 4));
        model.set_bbox(bbox);
        assert_eq!(model.bbox(), bbox);
    }

    #[test]
    fn recalc_bbox_covers_voxels() {
        let mut model = VoxelModel::new();
        model.set_voxel(IVec3::new(0, 0, 0), 0, 0, false);
        model.set_voxel(IVec3::new(3, 1, 2), 0, 0, false);
        model.recalc_bbox();

        assert_eq!(model.bbox().beg, IVec3::ZERO);
        assert_eq!(model.bbox().end, IVec3::new(4, 2, 3));
    }

    #[test]
    fn clear_keeps_materials_and_textures() {
        let mut model = VoxelModel::new();
        model.materials.push(MaterialHandle::new(Material::default()));
        model
            .textures
            .insert(TextureKind::Diffuse, Arc::new(Texture::default()));
        model.set_voxel(IVec3::ZERO, 0, 0, false);

        model.clear();
        assert_eq!(model.voxel_count(), 0);
        assert_eq!(model.space().chunk_count(), 0);
        assert_eq!(model.materials.len(), 1);
        assert_eq!(model.textures.len(), 1);
    }
}
