//! Orthographic plane-pair voxelization.
//!
//! Rebuilds a voxel model from axis-aligned artwork: a top-view image is
//! extruded through the space, an optional front view carves the silhouette
//! and recolors the front-most voxels. Colors are deduplicated into the
//! model's palette strip as they appear.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{IVec3, UVec2};

use crate::bbox::BBox;
use crate::color::Color;
use crate::error::Result;
use crate::material::{Material, MaterialHandle};
use crate::model::VoxelModel;
use crate::texture::{Texture, TextureKind};

/// Where each orthographic plane sits inside the source image.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanesInfo {
    pub top: BBox,
    pub front: BBox,
}

/// Projects plane images into a voxel model it owns.
pub struct PlanesVoxelizer {
    model: VoxelModel,
    size: IVec3,
    color_indices: HashMap<u32, i32>,
}

impl PlanesVoxelizer {
    pub fn new() -> Self {
        let mut model = VoxelModel::with_name("voxelized");
        model.materials.push(MaterialHandle::new(Material::default()));
        Self {
            model,
            size: IVec3::ZERO,
            color_indices: HashMap::new(),
        }
    }

    /// Set the extent of the voxel space; the space starts at the origin.
    pub fn set_space_size(&mut self, size: IVec3) {
        self.size = size;
        self.model.set_bbox(BBox::new(IVec3::ZERO, size));
    }

    pub fn model(&self) -> &VoxelModel {
        &self.model
    }

    pub fn into_model(self) -> VoxelModel {
        self.model
    }

    /// Rebuild the model from the plane images.
    ///
    /// The top plane is required; a degenerate top bbox clears nothing and
    /// returns early. The front plane, when non-degenerate, first carves
    /// cells whose silhouette pixel is transparent, then recolors the
    /// front-most voxel of every remaining column.
    pub fn update(&mut self, planes: &Texture, info: &PlanesInfo) -> Result<()> {
        let top_size = plane_extent(&info.top);
        if top_size.x == 0 || top_size.y == 0 {
            return Ok(());
        }

        self.model.clear();
        self.color_indices.clear();
        self.model
            .textures
            .insert(TextureKind::Diffuse, Arc::new(Texture::default()));
        log::debug!(
            "voxelizing {}x{} top plane into a {} space",
            top_size.x,
            top_size.y,
            self.size
        );

        self.extrude_top(planes, &info.top)?;
        let front_size = plane_extent(&info.front);
        if front_size.x > 0 && front_size.y > 0 {
            self.carve_front(planes, &info.front)?;
            self.recolor_front(planes, &info.front)?;
        }

        // Palette strip assembled during projection.
        let mut palette = Texture::default();
        let mut ordered: Vec<(u32, i32)> = self.color_indices.iter().map(|(&c, &i)| (c, i)).collect();
        ordered.sort_by_key(|&(_, idx)| idx);
        for (rgba, _) in ordered {
            palette.add_pixel(Color::from_rgba(rgba));
        }
        self.model
            .textures
            .insert(TextureKind::Diffuse, Arc::new(palette));

        self.model.space_mut().generate_visibility_mask();
        self.model.recalc_bbox();
        Ok(())
    }

    /// Fill one column of voxels per opaque top-view pixel.
    fn extrude_top(&mut self, planes: &Texture, plane: &BBox) -> Result<()> {
        let size = plane_extent(plane);
        for y in 0..size.y.min(self.size.y) {
            for x in 0..size.x.min(self.size.x) {
                let pixel = planes.pixel(UVec2::new(
                    (plane.beg.x + x) as u32,
                    (plane.beg.y + y) as u32,
                ))?;
                if pixel.is_transparent() {
                    continue;
                }

                let color_idx = self.color_index(pixel);
                for z in 0..self.size.z {
                    self.model
                        .set_voxel(IVec3::new(x, size.y - y - 1, z), 0, color_idx, false);
                }
            }
        }
        Ok(())
    }

    /// Remove cells wherever the front silhouette is transparent.
    fn carve_front(&mut self, planes: &Texture, plane: &BBox) -> Result<()> {
        let size = plane_extent(plane);
        for y in 0..size.y.min(self.size.z) {
            for x in 0..size.x.min(self.size.x) {
                let pixel = planes.pixel(UVec2::new(
                    (plane.beg.x + x) as u32,
                    (plane.beg.y + y) as u32,
                ))?;
                if !pixel.is_transparent() {
                    continue;
                }

                // Image rows run top-down; the space's z runs up.
                let z = size.y - y - 1;
                for depth in 0..self.size.y {
                    self.model.remove_voxel(IVec3::new(x, depth, z));
                }
            }
        }
        Ok(())
    }

    /// Recolor the first voxel behind each opaque front pixel.
    fn recolor_front(&mut self, planes: &Texture, plane: &BBox) -> Result<()> {
        let size = plane_extent(plane);
        for y in 0..size.y.min(self.size.z) {
            for x in 0..size.x.min(self.size.x) {
                let pixel = planes.pixel(UVec2::new(
                    (plane.beg.x + x) as u32,
                    (plane.beg.y + y) as u32,
                ))?;
                if pixel.is_transparent() {
                    continue;
                }

                let z = size.y - y - 1;
                let color_idx = self.color_index(pixel);
                for depth in 0..self.size.y {
                    let pos = IVec3::new(x, depth, z);
                    if let Some(voxel) = self.model.voxel(pos) {
                        self.model.set_voxel(pos, voxel.material, color_idx, voxel.transparent);
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// The palette slot of a color, appending it on first sight.
    fn color_index(&mut self, color: Color) -> i32 {
        let next = self.color_indices.len() as i32;
        *self.color_indices.entry(color.to_rgba()).or_insert(next)
    }
}

/// In-image extent of a plane region; zero when the box is degenerate.
fn plane_extent(plane: &BBox) -> IVec3 {
    (plane.end - plane.beg).max(IVec3::ZERO)
}

impl Default for PlanesVoxelizer {
    fn default() -> Self {
        Self::new()
    }
}
