//! Voxel-format loader interface.
//!
//! Concrete decoders live outside the core; this module fixes the contract
//! they implement and how a loader is selected from a file name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, VoxelError};
use crate::material::MaterialHandle;
use crate::model::VoxelModelHandle;
use crate::scene::{SceneNode, VoxelAnimationHandle};
use crate::stream::ByteStream;
use crate::texture::{Texture, TextureKind};

/// The third-party containers a loader can be selected for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatKind {
    MagicaVoxel,
    Goxel,
    Kenshape,
    QubicleBinary,
    QubicleBinaryTree,
    QubicleExchange,
    Qubicle,
}

impl FormatKind {
    /// Select a loader kind from a file name, by extension
    /// (case-insensitive).
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "vox" => Ok(Self::MagicaVoxel),
            "gox" => Ok(Self::Goxel),
            "kenshape" => Ok(Self::Kenshape),
            "qb" => Ok(Self::QubicleBinary),
            "qbt" => Ok(Self::QubicleBinaryTree),
            "qef" => Ok(Self::QubicleExchange),
            "qbcl" => Ok(Self::Qubicle),
            _ => Err(VoxelError::UnrecognizedFormat(path.to_string())),
        }
    }
}

/// Everything a voxel file parses into.
#[derive(Clone, Debug, Default)]
pub struct LoadedScene {
    pub scene: Option<SceneNode>,
    pub models: Vec<VoxelModelHandle>,
    pub animations: Vec<VoxelAnimationHandle>,
    pub materials: Vec<MaterialHandle>,
    pub textures: HashMap<TextureKind, Arc<Texture>>,
}

/// A decoder for one voxel container format.
///
/// `parse` consumes the stream and returns the fully populated scene. On
/// error the loader's partial state is undefined and the instance should be
/// discarded.
pub trait VoxelFormat {
    fn parse(&mut self, stream: &mut dyn ByteStream) -> Result<LoadedScene>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_selects_loader() {
        assert_eq!(FormatKind::from_path("scene.vox").unwrap(), FormatKind::MagicaVoxel);
        assert_eq!(FormatKind::from_path("a/b/model.gox").unwrap(), FormatKind::Goxel);
        assert_eq!(
            FormatKind::from_path("model.kenshape").unwrap(),
            FormatKind::Kenshape
        );
        assert_eq!(FormatKind::from_path("m.qb").unwrap(), FormatKind::QubicleBinary);
        assert_eq!(FormatKind::from_path("m.qbt").unwrap(), FormatKind::QubicleBinaryTree);
        assert_eq!(FormatKind::from_path("m.qef").unwrap(), FormatKind::QubicleExchange);
        assert_eq!(FormatKind::from_path("m.qbcl").unwrap(), FormatKind::Qubicle);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(FormatKind::from_path("SCENE.VOX").unwrap(), FormatKind::MagicaVoxel);
        assert_eq!(FormatKind::from_path("model.QbT").unwrap(), FormatKind::QubicleBinaryTree);
    }

    #[test]
    fn unknown_extension_is_unrecognized() {
        assert!(matches!(
            FormatKind::from_path("mesh.obj"),
            Err(VoxelError::UnrecognizedFormat(_))
        ));
        assert!(matches!(
            FormatKind::from_path("noextension"),
            Err(VoxelError::UnrecognizedFormat(_))
        ));
    }
}
