//! The voxel cell record and its face-visibility set.

use bitflags::bitflags;
use glam::IVec3;

bitflags! {
    /// The set of voxel faces not occluded by a neighbour.
    ///
    /// Z is the up axis: UP/DOWN are ±z, LEFT/RIGHT are ∓x and
    /// FORWARD/BACKWARD are ±y.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct VoxelFaces: u8 {
        const UP       = 1;
        const DOWN     = 2;
        const LEFT     = 4;
        const RIGHT    = 8;
        const FORWARD  = 16;
        const BACKWARD = 32;
    }
}

impl VoxelFaces {
    /// The six face directions paired with their unit normals.
    pub const DIRECTIONS: [(VoxelFaces, IVec3); 6] = [
        (VoxelFaces::UP, IVec3::new(0, 0, 1)),
        (VoxelFaces::DOWN, IVec3::new(0, 0, -1)),
        (VoxelFaces::LEFT, IVec3::new(-1, 0, 0)),
        (VoxelFaces::RIGHT, IVec3::new(1, 0, 0)),
        (VoxelFaces::FORWARD, IVec3::new(0, 1, 0)),
        (VoxelFaces::BACKWARD, IVec3::new(0, -1, 0)),
    ];

    /// The unit normal of a single-face value.
    pub fn normal(self) -> IVec3 {
        debug_assert_eq!(self.bits().count_ones(), 1, "normal of a multi-face set");
        Self::DIRECTIONS
            .iter()
            .find(|(face, _)| *face == self)
            .map(|(_, n)| *n)
            .unwrap_or(IVec3::ZERO)
    }

    /// The face pointing along `normal`, if it is one of the six axes.
    pub fn from_normal(normal: IVec3) -> Option<VoxelFaces> {
        Self::DIRECTIONS
            .iter()
            .find(|(_, n)| *n == normal)
            .map(|(face, _)| *face)
    }

    /// The face on the other side of a shared boundary.
    pub fn opposite(self) -> VoxelFaces {
        match self {
            VoxelFaces::UP => VoxelFaces::DOWN,
            VoxelFaces::DOWN => VoxelFaces::UP,
            VoxelFaces::LEFT => VoxelFaces::RIGHT,
            VoxelFaces::RIGHT => VoxelFaces::LEFT,
            VoxelFaces::FORWARD => VoxelFaces::BACKWARD,
            VoxelFaces::BACKWARD => VoxelFaces::FORWARD,
            _ => VoxelFaces::empty(),
        }
    }
}

/// One cell of the voxel space.
///
/// A voxel is *instantiated* iff both indices are non-negative, and
/// *visible* iff instantiated with at least one visible face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Voxel {
    /// Index into the model's color palette; −1 when uninstantiated.
    pub color: i32,
    /// Index into the model's material list; −1 when uninstantiated.
    pub material: i16,
    /// Faces currently visible.
    pub faces: VoxelFaces,
    pub transparent: bool,
}

impl Voxel {
    pub fn new(color: i32, material: i16, transparent: bool) -> Self {
        Self {
            color,
            material,
            faces: VoxelFaces::all(),
            transparent,
        }
    }

    /// The empty cell sentinel.
    pub const UNINSTANTIATED: Voxel = Voxel {
        color: -1,
        material: -1,
        faces: VoxelFaces::empty(),
        transparent: false,
    };

    #[inline]
    pub fn is_instantiated(&self) -> bool {
        self.color >= 0 && self.material >= 0
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.is_instantiated() && !self.faces.is_empty()
    }

    /// The key faces merge on: two faces coalesce only if it matches.
    #[inline]
    pub fn merge_key(&self) -> (i32, i16, bool) {
        (self.color, self.material, self.transparent)
    }
}

impl Default for Voxel {
    fn default() -> Self {
        Self::UNINSTANTIATED
    }
}
