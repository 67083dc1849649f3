//! Integer axis-aligned bounding box.

use glam::{IVec3, Vec3};

/// Half-open integer AABB: `beg` inclusive, `end` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BBox {
    pub beg: IVec3,
    pub end: IVec3,
}

impl BBox {
    pub const fn new(beg: IVec3, end: IVec3) -> Self {
        Self { beg, end }
    }

    /// An inverted box that expands to the first point it is fed.
    pub const fn empty() -> Self {
        Self {
            beg: IVec3::MAX,
            end: IVec3::MIN,
        }
    }

    /// True if no point was ever added.
    pub fn is_empty(&self) -> bool {
        self.end.x <= self.beg.x || self.end.y <= self.beg.y || self.end.z <= self.beg.z
    }

    /// Grow to include the unit cell at `point`.
    pub fn expand(&mut self, point: IVec3) {
        self.beg = self.beg.min(point);
        self.end = self.end.max(point + IVec3::ONE);
    }

    /// Size of the box; a voxel has at least a size of one.
    pub fn size(&self) -> IVec3 {
        (self.end - self.beg).max(IVec3::ONE)
    }

    pub fn contains_point(&self, point: IVec3) -> bool {
        point.x >= self.beg.x
            && point.y >= self.beg.y
            && point.z >= self.beg.z
            && point.x < self.end.x
            && point.y < self.end.y
            && point.z < self.end.z
    }

    pub fn center(&self) -> Vec3 {
        (self.beg.as_vec3() + self.end.as_vec3()) * 0.5
    }

    pub fn extents(&self) -> Vec3 {
        self.end.as_vec3() - self.center()
    }

    /// The box translated by `offset`.
    pub fn offset(&self, offset: IVec3) -> Self {
        Self::new(self.beg + offset, self.end + offset)
    }

    /// Slab test of a ray against the box.
    ///
    /// Returns the distance along `direction` to the entry point, or `None`
    /// when the ray misses. A ray starting inside hits at distance zero.
    pub fn intersects_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let beg = self.beg.as_vec3();
        let end = self.end.as_vec3();

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            if direction[axis] == 0.0 {
                if origin[axis] < beg[axis] || origin[axis] > end[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction[axis];
            let mut t0 = (beg[axis] - origin[axis]) * inv;
            let mut t1 = (end[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::new(IVec3::ZERO, IVec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_expands() {
        let mut bb = BBox::empty();
        assert!(bb.is_empty());

        bb.expand(IVec3::new(2, 3, 4));
        assert!(!bb.is_empty());
        assert_eq!(bb.beg, IVec3::new(2, 3, 4));
        assert_eq!(bb.end, IVec3::new(3, 4, 5));

        bb.expand(IVec3::new(-1, 3, 4));
        assert_eq!(bb.beg, IVec3::new(-1, 3, 4));
        assert_eq!(bb.size(), IVec3::new(4, 1, 1));
    }

    #[test]
    fn contains_is_half_open() {
        let bb = BBox::new(IVec3::ZERO, IVec3::new(2, 2, 2));
        assert!(bb.contains_point(IVec3::ZERO));
        assert!(bb.contains_point(IVec3::new(1, 1, 1)));
        assert!(!bb.contains_point(IVec3::new(2, 0, 0)));
        assert!(!bb.contains_point(IVec3::new(-1, 0, 0)));
    }

    #[test]
    fn center_and_extents() {
        let bb = BBox::new(IVec3::ZERO, IVec3::new(4, 2, 6));
        assert_eq!(bb.center(), Vec3::new(2.0, 1.0, 3.0));
        assert_eq!(bb.extents(), Vec3::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn ray_hits_and_misses() {
        let bb = BBox::new(IVec3::ZERO, IVec3::new(2, 2, 2));

        let hit = bb.intersects_ray(Vec3::new(-3.0, 1.0, 1.0), Vec3::X);
        assert_eq!(hit, Some(3.0));

        // Pointing away.
        assert_eq!(bb.intersects_ray(Vec3::new(-3.0, 1.0, 1.0), -Vec3::X), None);

        // Parallel to the box, off to the side.
        assert_eq!(bb.intersects_ray(Vec3::new(-3.0, 5.0, 1.0), Vec3::X), None);

        // Starting inside.
        assert_eq!(bb.intersects_ray(Vec3::ONE, Vec3::X), Some(0.0));
    }

    #[test]
    fn offset_shifts_both_corners() {
        let bb = BBox::new(IVec3::ZERO, IVec3::ONE).offset(IVec3::new(10, 0, 0));
        assert_eq!(bb.beg, IVec3::new(10, 0, 0));
        assert_eq!(bb.end, IVec3::new(11, 1, 1));
    }
}
