//! Voxel-model to triangle-mesh conversion.
//!
//! Voxels live in a sparse space of 32³ chunks. Face visibility is derived
//! per chunk with per-row bitmasks, then one of several extraction
//! algorithms turns the visible faces into indexed, vertex-deduplicated
//! meshes grouped by material.
//!
//! # Example
//!
//! ```
//! use glam::IVec3;
//! use voxmesh::{Mesher, MesherKind, VoxelModel};
//!
//! let mut model = VoxelModel::with_name("cube");
//! model.materials.push(Default::default());
//! model.set_voxel(IVec3::new(0, 0, 0), 0, 0, false);
//! model.space_mut().generate_visibility_mask();
//!
//! let mesh = Mesher::new(MesherKind::Greedy).generate_model(&model).unwrap();
//! assert_eq!(mesh.triangle_count(), 12); // Cube = 6 faces × 2 triangles
//! ```

pub mod atlas;
pub mod bbox;
pub mod builder;
pub mod chunk;
pub mod color;
pub mod error;
pub mod export;
pub mod format;
pub mod frustum;
pub mod half_edge;
pub mod material;
pub mod math;
pub mod mesh;
pub mod mesher;
pub mod model;
pub mod packer;
pub mod scene;
pub mod space;
pub mod stream;
pub mod texture;
pub mod texture_map;
pub mod voxel;
pub mod voxelizer;

// Re-export primary types
pub use crate::atlas::{resolve_atlas_uvs, AtlasBuilder};
pub use crate::bbox::BBox;
pub use crate::builder::MeshBuilder;
pub use crate::chunk::{Chunk, ChunkMeta, CHUNK_EDGE};
pub use crate::color::Color;
pub use crate::error::{Result, VoxelError};
pub use crate::export::{ExportKind, MeshExporter};
pub use crate::format::{FormatKind, LoadedScene, VoxelFormat};
pub use crate::frustum::{Frustum, Plane};
pub use crate::half_edge::HalfMesh;
pub use crate::material::{Material, MaterialHandle};
pub use crate::mesh::{Mesh, Surface, Vertex};
pub use crate::mesher::{mesh_stats, MeshChunk, MeshStats, Mesher, MesherKind};
pub use crate::model::{TexturingKind, VoxelModel, VoxelModelHandle};
pub use crate::packer::{PackedRect, TexturePacker};
pub use crate::scene::{SceneNode, VoxelAnimation, VoxelFrame};
pub use crate::space::VoxelSpace;
pub use crate::stream::{ByteStream, FileStream, MemoryStream, SeekOrigin, StreamFactory};
pub use crate::texture::{Texture, TextureKind};
pub use crate::texture_map::{FaceUvs, TextureMap, UvQuad};
pub use crate::voxel::{Voxel, VoxelFaces};
pub use crate::voxelizer::{PlanesInfo, PlanesVoxelizer};
