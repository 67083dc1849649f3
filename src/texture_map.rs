//! Per-color, per-face UV mapping into a texture atlas.

use std::collections::HashMap;

use glam::{IVec3, Vec2};

/// The four UV corners assigned to one voxel face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UvQuad {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

/// UV quads of a single color index, keyed by face normal.
#[derive(Clone, Debug, Default)]
pub struct FaceUvs {
    uvs: HashMap<IVec3, UvQuad>,
}

impl FaceUvs {
    pub fn add_face(&mut self, normal: IVec3, quad: UvQuad) {
        self.uvs.insert(normal, quad);
    }

    pub fn uv_quad(&self, normal: IVec3) -> Option<&UvQuad> {
        self.uvs.get(&normal)
    }
}

/// Atlas mapping for every color index of a model.
#[derive(Clone, Debug, Default)]
pub struct TextureMap {
    infos: HashMap<i32, FaceUvs>,
}

impl TextureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_color(&mut self, color: i32, faces: FaceUvs) {
        self.infos.insert(color, faces);
    }

    /// The UV quad for a (color, face-normal) pair, if mapped.
    pub fn face_uvs(&self, color: i32, normal: IVec3) -> Option<&UvQuad> {
        self.infos.get(&color)?.uv_quad(normal)
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}
