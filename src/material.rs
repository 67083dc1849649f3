//! Surface materials.

use std::sync::Arc;

/// PBR-ish material parameters as voxel editors store them.
///
/// Materials are shared immutably between models and meshes via
/// [`MaterialHandle`]; surfaces group faces by handle identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub metallic: f32,
    pub specular: f32,
    pub roughness: f32,
    pub ior: f32,
    /// Emissive strength.
    pub power: f32,
    pub transparency: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            metallic: 0.0,
            specular: 0.0,
            roughness: 1.0,
            ior: 0.0,
            power: 0.0,
            transparency: 0.0,
        }
    }
}

/// Shared, immutable material reference.
pub type MaterialHandle = Arc<Material>;
