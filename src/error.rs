//! Error types surfaced at the crate's API boundaries.

use thiserror::Error;

/// Errors produced by loaders, exporters, texturing and the mesh builder.
///
/// None of these are recovered internally. Loader errors leave the format
/// instance in an undefined state; builder errors leave prior accumulation
/// untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoxelError {
    /// The loader could not identify the container (unknown extension,
    /// bad magic, unsupported header version).
    #[error("unrecognized voxel format: {0}")]
    UnrecognizedFormat(String),

    /// The container was identified but a sub-chunk failed a structural
    /// check (wrong length, dangling reference).
    #[error("corrupt voxel file: {0}")]
    CorruptFormat(String),

    /// `MeshBuilder::add_face` was called before `add_textures`.
    #[error("mesh builder has no textures bound")]
    MissingTextures,

    /// A color index fell outside the palette, or a pixel access fell
    /// outside the texture dimensions.
    #[error("index {index} out of bounds (limit {limit})")]
    OutOfBounds { index: i64, limit: i64 },

    /// An exporter was asked for an unknown export kind.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VoxelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = VoxelError::OutOfBounds { index: 12, limit: 8 };
        assert_eq!(err.to_string(), "index 12 out of bounds (limit 8)");

        let err = VoxelError::MissingTextures;
        assert_eq!(err.to_string(), "mesh builder has no textures bound");
    }
}
