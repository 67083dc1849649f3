//! Texture-atlas assembly and UV resolution.
//!
//! Models in `Textured` mode emit packing-space UVs: `x` carries the color
//! index and `y` the corner tag (0 = top-left, 2 = top-right, 1 =
//! bottom-left, 3 = bottom-right). This module packs the per-color tiles
//! into one canvas, derives the matching [`TextureMap`], and rewrites a
//! mesh's packing-space UVs to real atlas coordinates.

use glam::{UVec2, Vec2};

use crate::error::{Result, VoxelError};
use crate::mesh::Mesh;
use crate::packer::TexturePacker;
use crate::texture::Texture;
use crate::texture_map::{FaceUvs, TextureMap, UvQuad};
use crate::voxel::VoxelFaces;

/// Corner tags used by the packing-space UV quads.
const TOP_LEFT: f32 = 0.0;
const BOTTOM_LEFT: f32 = 1.0;
const TOP_RIGHT: f32 = 2.0;
const BOTTOM_RIGHT: f32 = 3.0;

/// Packs per-color tiles into a single atlas texture.
#[derive(Default)]
pub struct AtlasBuilder {
    tiles: Vec<(i32, Texture)>,
}

impl AtlasBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the tile shown on every face of `color`.
    pub fn add_tile(&mut self, color: i32, tile: Texture) {
        self.tiles.push((color, tile));
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Pack all tiles and return the atlas with its per-color UV mapping.
    ///
    /// Every face normal of a color maps to the same tile; UVs are
    /// normalized to the final canvas.
    pub fn build(&self) -> Result<(Texture, TextureMap)> {
        let mut packer = TexturePacker::new();
        for (i, (_, tile)) in self.tiles.iter().enumerate() {
            packer.add_rect(tile.size(), i);
        }

        let rects = packer.pack().to_vec();
        let canvas_size = packer.canvas_size();
        if canvas_size.x == 0 || canvas_size.y == 0 {
            return Ok((Texture::default(), TextureMap::new()));
        }
        log::debug!(
            "packed {} tiles into a {}x{} atlas",
            rects.len(),
            canvas_size.x,
            canvas_size.y
        );

        let mut atlas = Texture::new(canvas_size);
        let mut map = TextureMap::new();
        let scale = Vec2::new(1.0 / canvas_size.x as f32, 1.0 / canvas_size.y as f32);

        for rect in &rects {
            let (color, tile) = &self.tiles[rect.reference];
            atlas.blit(tile.pixels(), rect.position, tile.size())?;

            let min = Vec2::new(rect.position.x as f32, rect.position.y as f32) * scale;
            let max = Vec2::new(
                (rect.position.x + rect.size.x) as f32,
                (rect.position.y + rect.size.y) as f32,
            ) * scale;
            let quad = UvQuad {
                top_left: min,
                top_right: Vec2::new(max.x, min.y),
                bottom_left: Vec2::new(min.x, max.y),
                bottom_right: max,
            };

            let mut faces = FaceUvs::default();
            for (_, normal) in VoxelFaces::DIRECTIONS {
                faces.add_face(normal, quad);
            }
            map.add_color(*color, faces);
        }

        Ok((atlas, map))
    }
}

/// Rewrite a mesh's packing-space UVs to atlas coordinates.
///
/// Vertices must carry axis-aligned normals (as the box meshers emit);
/// a color index without an atlas entry is an out-of-bounds error.
pub fn resolve_atlas_uvs(mesh: &mut Mesh, map: &TextureMap) -> Result<()> {
    for surface in &mut mesh.surfaces {
        for (uv, normal) in surface.uvs.iter_mut().zip(&surface.normals) {
            let color = uv.x as i32;
            let normal_key = normal.round().as_ivec3();
            let quad = map.face_uvs(color, normal_key).ok_or(VoxelError::OutOfBounds {
                index: color as i64,
                limit: -1,
            })?;

            *uv = if uv.y == TOP_LEFT {
                quad.top_left
            } else if uv.y == BOTTOM_LEFT {
                quad.bottom_left
            } else if uv.y == TOP_RIGHT {
                quad.top_right
            } else if uv.y == BOTTOM_RIGHT {
                quad.bottom_right
            } else {
                return Err(VoxelError::InvalidArgument(format!(
                    "not a packing-space corner tag: {}",
                    uv.y
                )));
            };
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn solid_tile(edge: u32, color: Color) -> Texture {
        let mut tile = Texture::new(UVec2::splat(edge));
        for y in 0..edge {
            for x in 0..edge {
                tile.set_pixel(UVec2::new(x, y), color).unwrap();
            }
        }
        tile
    }

    #[test]
    fn tiles_land_inside_the_canvas() {
        let mut builder = AtlasBuilder::new();
        builder.add_tile(0, solid_tile(8, Color::new(255, 0, 0, 255)));
        builder.add_tile(1, solid_tile(8, Color::new(0, 255, 0, 255)));
        builder.add_tile(2, solid_tile(4, Color::new(0, 0, 255, 255)));

        let (atlas, map) = builder.build().unwrap();
        assert!(atlas.size().x >= 8 && atlas.size().y >= 8);

        for color in 0..3 {
            let quad = map.face_uvs(color, glam::IVec3::new(0, 0, 1)).unwrap();
            for uv in [quad.top_left, quad.top_right, quad.bottom_left, quad.bottom_right] {
                assert!((0.0..=1.0).contains(&uv.x));
                assert!((0.0..=1.0).contains(&uv.y));
            }
            assert!(quad.top_left.x < quad.top_right.x);
            assert!(quad.top_left.y < quad.bottom_left.y);
        }
    }

    #[test]
    fn atlas_pixels_come_from_the_tiles() {
        let red = Color::new(255, 0, 0, 255);
        let mut builder = AtlasBuilder::new();
        builder.add_tile(7, solid_tile(4, red));

        let (atlas, map) = builder.build().unwrap();
        let quad = map.face_uvs(7, glam::IVec3::new(1, 0, 0)).unwrap();

        let px = (quad.top_left.x * atlas.size().x as f32) as u32;
        let py = (quad.top_left.y * atlas.size().y as f32) as u32;
        assert_eq!(atlas.pixel(UVec2::new(px, py)).unwrap(), red);
    }

    #[test]
    fn empty_builder_produces_empty_atlas() {
        let (atlas, map) = AtlasBuilder::new().build().unwrap();
        assert_eq!(atlas.size(), UVec2::ZERO);
        assert!(map.is_empty());
    }

    #[test]
    fn resolves_packing_space_uvs() {
        use crate::mesher::{Mesher, MesherKind};
        use glam::IVec3;
        use std::sync::Arc;

        // A model without textures meshes in packing-space UV mode.
        let mut model = crate::model::VoxelModel::with_name("atlas");
        model.materials.push(Arc::new(crate::material::Material::default()));
        model.set_voxel(IVec3::ZERO, 0, 0, false);
        model.space_mut().generate_visibility_mask();

        let mut mesh = Mesher::new(MesherKind::Greedy).generate_model(&model).unwrap();

        let mut builder = AtlasBuilder::new();
        builder.add_tile(0, solid_tile(4, Color::new(9, 9, 9, 255)));
        let (_, map) = builder.build().unwrap();

        resolve_atlas_uvs(&mut mesh, &map).unwrap();
        for surface in &mesh.surfaces {
            for uv in &surface.uvs {
                assert!((0.0..=1.0).contains(&uv.x), "unresolved uv {uv:?}");
                assert!((0.0..=1.0).contains(&uv.y), "unresolved uv {uv:?}");
            }
        }
    }

    #[test]
    fn missing_color_is_out_of_bounds() {
        use crate::mesh::{Surface, Vertex};
        use glam::Vec3;

        let mut mesh = Mesh::new();
        let mut surface = Surface::default();
        surface.push_vertex(Vertex::new(Vec3::ZERO, Vec3::Z, Vec2::new(5.0, 0.0)));
        mesh.surfaces.push(surface);

        let map = TextureMap::new();
        assert!(matches!(
            resolve_atlas_uvs(&mut mesh, &map),
            Err(VoxelError::OutOfBounds { .. })
        ));
    }
}
