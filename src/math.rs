//! Transform helpers on top of `glam`.
//!
//! Scene transforms compose as translation · rotation · scale, with the
//! rotation built from Euler angles applied Z, then X, then Y. Mesh merging
//! needs the rotation-only part of a model matrix to transform normals.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Compose a model matrix from position, Euler rotation (radians) and scale.
///
/// The rotation applies Z·X·Y around the local axes; translation is
/// outermost, scale innermost.
pub fn compose_transform(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    let rot = Quat::from_euler(EulerRot::ZXY, rotation.z, rotation.x, rotation.y);
    Mat4::from_scale_rotation_translation(scale, rot, position)
}

/// Extract the Euler angles (x, y, z components, ZXY order) of a matrix.
pub fn extract_euler(matrix: &Mat4) -> Vec3 {
    let (_, rot, _) = matrix.to_scale_rotation_translation();
    let (z, x, y) = rot.to_euler(EulerRot::ZXY);
    Vec3::new(x, y, z)
}

/// A copy of `matrix` with the translation column zeroed.
///
/// Used for transforming normals during mesh merging.
pub fn rotation_part(matrix: &Mat4) -> Mat4 {
    let mut m = *matrix;
    m.w_axis = glam::Vec4::W;
    m
}
