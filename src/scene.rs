//! Scene trees and voxel animations as produced by format loaders.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::math::compose_transform;
use crate::model::VoxelModelHandle;

/// One frame of a voxel animation.
#[derive(Clone, Debug)]
pub struct VoxelFrame {
    pub model: VoxelModelHandle,
    /// Display duration in milliseconds.
    pub frame_time: u32,
}

/// An ordered list of model frames.
#[derive(Clone, Debug, Default)]
pub struct VoxelAnimation {
    frames: Vec<VoxelFrame>,
}

impl VoxelAnimation {
    /// Default display duration when a format stores none.
    pub const FRAME_TIME: u32 = 50;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_frame(&mut self, model: VoxelModelHandle, frame_time: u32) {
        self.frames.push(VoxelFrame { model, frame_time });
    }

    pub fn remove_frame(&mut self, index: usize) {
        if index < self.frames.len() {
            self.frames.remove(index);
        }
    }

    pub fn frame(&self, index: usize) -> Option<&VoxelFrame> {
        self.frames.get(index)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[VoxelFrame] {
        &self.frames
    }
}

pub type VoxelAnimationHandle = Arc<VoxelAnimation>;

/// A node of the scene tree.
///
/// A node carries either a model or an animation (or neither, for pure
/// grouping). Child transforms are relative to their parent.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub visible: bool,
    pub position: Vec3,
    /// Euler angles in radians, applied Z·X·Y.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub name: String,
    pub model: Option<VoxelModelHandle>,
    pub animation: Option<VoxelAnimationHandle>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new() -> Self {
        Self {
            visible: true,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            name: String::new(),
            model: None,
            animation: None,
            children: Vec::new(),
        }
    }

    pub fn with_model(model: VoxelModelHandle) -> Self {
        Self {
            model: Some(model),
            ..Self::new()
        }
    }

    /// The node's local transform: translation · (Rz·Rx·Ry) · scale.
    pub fn model_matrix(&self) -> Mat4 {
        compose_transform(self.position, self.rotation, self.scale)
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new()
    }
}
