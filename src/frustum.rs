//! View frustum culling for chunk bounding boxes.

use glam::Vec3;

use crate::bbox::BBox;

/// A plane in normal-distance form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Plane through `point` with the given (not necessarily unit) normal.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// Six-plane frustum with an AABB containment test.
///
/// Plane normals point inward; a box is kept if it is on or in front of
/// every plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frustum {
    pub near: Plane,
    pub far: Plane,
    pub left: Plane,
    pub right: Plane,
    pub top: Plane,
    pub bottom: Plane,
}

impl Frustum {
    pub fn new(near: Plane, far: Plane, left: Plane, right: Plane, top: Plane, bottom: Plane) -> Self {
        Self { near, far, left, right, top, bottom }
    }

    /// Build a frustum from a camera basis and perspective parameters.
    ///
    /// `fov` is the vertical field of view in radians.
    pub fn from_camera(
        position: Vec3,
        front: Vec3,
        right: Vec3,
        up: Vec3,
        aspect: f32,
        fov: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let half_v = far * (fov * 0.5).tan();
        let half_h = half_v * aspect;
        let front_far = front * far;

        Self {
            near: Plane::new(position + front * near, front),
            far: Plane::new(position + front_far, -front),
            right: Plane::new(position, (front_far - right * half_h).cross(up)),
            left: Plane::new(position, up.cross(front_far + right * half_h)),
            top: Plane::new(position, right.cross(front_far - up * half_v)),
            bottom: Plane::new(position, (front_far + up * half_v).cross(right)),
        }
    }

    /// True if the integer AABB intersects the frustum.
    pub fn contains(&self, bbox: &BBox) -> bool {
        self.contains_aabb(bbox.center(), bbox.extents())
    }

    /// True if the AABB given as center + extents intersects the frustum.
    pub fn contains_aabb(&self, center: Vec3, extents: Vec3) -> bool {
        [self.near, self.far, self.left, self.right, self.top, self.bottom]
            .iter()
            .all(|plane| Self::on_or_forward(plane, center, extents))
    }

    fn on_or_forward(plane: &Plane, center: Vec3, extents: Vec3) -> bool {
        // Project the box extents onto the plane normal.
        let projected = extents * plane.normal.abs();
        let radius = projected.x + projected.y + projected.z;
        -radius <= plane.signed_distance(center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    fn test_frustum() -> Frustum {
        // Camera at origin looking down +y, z up.
        Frustum::from_camera(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::X,
            Vec3::Z,
            1.0,
            std::f32::consts::FRAC_PI_2,
            0.1,
            100.0,
        )
    }

    #[test]
    fn box_in_front_is_kept() {
        let f = test_frustum();
        let bb = BBox::new(IVec3::new(-1, 10, -1), IVec3::new(1, 12, 1));
        assert!(f.contains(&bb));
    }

    #[test]
    fn box_behind_is_culled() {
        let f = test_frustum();
        let bb = BBox::new(IVec3::new(-1, -12, -1), IVec3::new(1, -10, 1));
        assert!(!f.contains(&bb));
    }

    #[test]
    fn box_past_far_plane_is_culled() {
        let f = test_frustum();
        let bb = BBox::new(IVec3::new(0, 200, 0), IVec3::new(1, 201, 1));
        assert!(!f.contains(&bb));
    }

    #[test]
    fn straddling_box_is_kept() {
        let f = test_frustum();
        // Intersects the near plane.
        let bb = BBox::new(IVec3::new(-1, -1, -1), IVec3::new(1, 1, 1));
        assert!(f.contains(&bb));
    }

    #[test]
    fn box_far_to_the_side_is_culled() {
        let f = test_frustum();
        let bb = BBox::new(IVec3::new(500, 10, 0), IVec3::new(501, 11, 1));
        assert!(!f.contains(&bb));
    }
}
