//! Mesh-exporter interface.
//!
//! Like the loaders, concrete writers are external collaborators; the core
//! fixes the selection rules and the shape of the entry point.

use crate::error::{Result, VoxelError};
use crate::mesh::Mesh;
use crate::stream::StreamFactory;

/// The supported output containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// Wavefront OBJ; writes a companion `.mtl` and `.albedo.png` /
    /// `.emission.png` textures next to the mesh.
    Obj,
    /// glTF 2.0 text container.
    Gltf,
    /// glTF 2.0 binary container.
    Glb,
    Ply,
    /// Godot scene.
    Escn,
}

impl ExportKind {
    /// Select an exporter kind from a file name, by extension
    /// (case-insensitive). Unknown extensions are an invalid argument.
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "obj" => Ok(Self::Obj),
            "gltf" => Ok(Self::Gltf),
            "glb" => Ok(Self::Glb),
            "ply" => Ok(Self::Ply),
            "escn" => Ok(Self::Escn),
            _ => Err(VoxelError::InvalidArgument(format!(
                "no exporter for '{path}'"
            ))),
        }
    }
}

/// A writer for one output container.
///
/// Exporters open every file they emit through the given factory, so hosts
/// control where the bytes go. `path` names the primary output; companion
/// files derive their names from it.
pub trait MeshExporter {
    fn export(
        &self,
        streams: &mut dyn StreamFactory,
        path: &str,
        meshes: &[Mesh],
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_selects_exporter() {
        assert_eq!(ExportKind::from_path("out.obj").unwrap(), ExportKind::Obj);
        assert_eq!(ExportKind::from_path("out.gltf").unwrap(), ExportKind::Gltf);
        assert_eq!(ExportKind::from_path("out.glb").unwrap(), ExportKind::Glb);
        assert_eq!(ExportKind::from_path("out.ply").unwrap(), ExportKind::Ply);
        assert_eq!(ExportKind::from_path("out.escn").unwrap(), ExportKind::Escn);
        assert_eq!(ExportKind::from_path("OUT.GLB").unwrap(), ExportKind::Glb);
    }

    #[test]
    fn unknown_kind_is_invalid_argument() {
        assert!(matches!(
            ExportKind::from_path("out.fbx"),
            Err(VoxelError::InvalidArgument(_))
        ));
    }
}
