//! Collision detection subsystem
//!
//! Vehicles only ever rotate about the vertical axis, so every collision volume
//! is a box that is axis-aligned at rest and yawed per frame. Box-box tests and
//! ray picking are both approximations built on point containment.

pub mod ray;

pub use ray::Ray;

use crate::math::rotate_yaw;
use glam::{Affine3A, EulerRot, Quat, Vec3};

/// Offset below the roof plane so roof hits land inside the box
const ROOF_EPSILON: f32 = 1e-5;

/// Yaw-only oriented bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedBox {
    local_min: Vec3,
    local_max: Vec3,
    local_extent: Vec3,
    rest_midpoint: Vec3,
    /// Centre of the box in world space
    world_midpoint: Vec3,
    /// Euler rotation; only z (yaw) is ever non-zero
    rotation: Vec3,
    /// Hit marker for the current frame, owned by callers
    pub collided: bool,
}

impl OrientedBox {
    /// Create a box from its untransformed bounds
    pub fn new(local_min: Vec3, local_max: Vec3) -> Self {
        let rest_midpoint = (local_min + local_max) * 0.5;
        Self {
            local_min,
            local_max,
            local_extent: local_max - local_min,
            rest_midpoint,
            world_midpoint: rest_midpoint,
            rotation: Vec3::ZERO,
            collided: false,
        }
    }

    /// Move the box to follow a body at `position` facing `yaw`.
    ///
    /// The rest midpoint is added without rotating it.
    pub fn update(&mut self, position: Vec3, yaw: f32) {
        self.rotation = Vec3::new(0.0, 0.0, yaw);
        self.world_midpoint = position + self.rest_midpoint;
    }

    pub fn local_min(&self) -> Vec3 {
        self.local_min
    }

    pub fn local_max(&self) -> Vec3 {
        self.local_max
    }

    pub fn local_extent(&self) -> Vec3 {
        self.local_extent
    }

    pub fn half_extents(&self) -> Vec3 {
        self.local_extent * 0.5
    }

    pub fn rest_midpoint(&self) -> Vec3 {
        self.rest_midpoint
    }

    pub fn world_midpoint(&self) -> Vec3 {
        self.world_midpoint
    }

    pub fn yaw(&self) -> f32 {
        self.rotation.z
    }

    /// Check if a world-space point lies inside the box (bounds inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        // Undo the yaw so the test is against the axis-aligned rest bounds
        let aligned = rotate_yaw(-self.yaw(), point - self.world_midpoint);

        let within_x = aligned.x >= self.local_min.x && aligned.x <= self.local_max.x;
        let within_y = aligned.y >= self.local_min.y && aligned.y <= self.local_max.y;

        // Yaw never tilts the box, so z uses the world coordinate directly
        let half_height = self.local_extent.z / 2.0;
        let within_z = point.z >= self.world_midpoint.z - half_height
            && point.z <= self.world_midpoint.z + half_height;

        within_x && within_y && within_z
    }

    /// Ray test against the ground plane and the roof plane of the box.
    ///
    /// Side faces are never tested, so a ray that enters through a side
    /// without crossing either plane inside the box is a miss.
    pub fn intersects_ray(&self, origin: Vec3, direction: Vec3) -> bool {
        let ray = Ray::new(origin, direction);
        let ground = ray.at(ray.t_at_height(0.0));

        let roof_z = self.world_midpoint.z + self.local_extent.z / 2.0 - ROOF_EPSILON;
        let roof = ray.at(ray.t_at_height(roof_z));

        self.contains_point(ground) || self.contains_point(roof)
    }

    /// Same as [`Self::intersects_ray`] for a [`Ray`]
    pub fn intersects(&self, ray: &Ray) -> bool {
        self.intersects_ray(ray.origin, ray.direction)
    }

    /// Sample points used by the overlap test: midpoint first, then corners
    pub fn sample_points(&self) -> [Vec3; 9] {
        let half = self.half_extents();
        let yaw = self.yaw();
        let mid = self.world_midpoint;
        let corner = |sx: f32, sy: f32, sz: f32| mid + rotate_yaw(yaw, half * Vec3::new(sx, sy, sz));
        [
            mid,
            corner(1.0, 1.0, -1.0),
            corner(1.0, 1.0, 1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, -1.0, 1.0),
            corner(-1.0, 1.0, -1.0),
            corner(-1.0, 1.0, 1.0),
            corner(-1.0, -1.0, -1.0),
            corner(-1.0, -1.0, 1.0),
        ]
    }

    /// Check whether this box contains any sample point of `other`.
    ///
    /// Crossed boxes where no sample of either lies inside the other are
    /// missed; test both directions to narrow that gap.
    pub fn overlaps(&self, other: &OrientedBox) -> bool {
        other
            .sample_points()
            .iter()
            .any(|point| self.contains_point(*point))
    }

    /// Unit-cube to world matrix for drawing the box: scale, rotate, translate
    pub fn world_transform(&self) -> Affine3A {
        let rotation = Quat::from_euler(
            EulerRot::ZYX,
            self.rotation.z,
            self.rotation.y,
            self.rotation.x,
        );
        Affine3A::from_scale_rotation_translation(
            self.half_extents(),
            rotation,
            self.world_midpoint,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn car_box() -> OrientedBox {
        OrientedBox::new(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 2.0, 1.5))
    }

    #[test]
    fn test_construction_fixes_extent_and_midpoint() {
        let bbox = car_box();
        assert_eq!(bbox.local_extent(), Vec3::new(2.0, 4.0, 1.5));
        assert_eq!(bbox.rest_midpoint(), Vec3::new(0.0, 0.0, 0.75));
        assert!(!bbox.collided);
    }

    #[test]
    fn test_update_does_not_rotate_rest_offset() {
        let mut bbox = OrientedBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        bbox.update(Vec3::new(5.0, 0.0, 0.0), FRAC_PI_2);
        assert_eq!(bbox.world_midpoint(), Vec3::new(6.0, 1.0, 1.0));
        assert_eq!(bbox.yaw(), FRAC_PI_2);
        // Bounds stay as constructed
        assert_eq!(bbox.local_min(), Vec3::ZERO);
        assert_eq!(bbox.local_max(), Vec3::splat(2.0));
    }

    #[test]
    fn test_contains_own_midpoint_for_any_yaw() {
        let mut bbox = car_box();
        for i in 0..16 {
            let yaw = -3.0 + i as f32 * 0.4;
            bbox.update(Vec3::new(i as f32, -2.0 * i as f32, 0.0), yaw);
            assert!(bbox.contains_point(bbox.world_midpoint()), "yaw {yaw}");
        }
    }

    #[test]
    fn test_contains_point_respects_yaw() {
        let mut bbox = car_box();
        bbox.update(Vec3::ZERO, 0.0);
        // Long axis is y at rest
        assert!(bbox.contains_point(Vec3::new(0.0, 1.8, 0.5)));
        assert!(!bbox.contains_point(Vec3::new(1.8, 0.0, 0.5)));

        // A quarter turn swaps the long axis onto x
        bbox.update(Vec3::ZERO, FRAC_PI_2);
        assert!(!bbox.contains_point(Vec3::new(0.0, 1.8, 0.5)));
        assert!(bbox.contains_point(Vec3::new(1.8, 0.0, 0.5)));
    }

    #[test]
    fn test_contains_point_z_range() {
        let mut bbox = car_box();
        bbox.update(Vec3::ZERO, FRAC_PI_4);
        assert!(bbox.contains_point(Vec3::new(0.0, 0.0, 0.0)));
        assert!(bbox.contains_point(Vec3::new(0.0, 0.0, 1.5)));
        assert!(!bbox.contains_point(Vec3::new(0.0, 0.0, 1.6)));
        assert!(!bbox.contains_point(Vec3::new(0.0, 0.0, -0.1)));
    }

    #[test]
    fn test_overlaps_identical_pose() {
        let mut a = car_box();
        let mut b = car_box();
        a.update(Vec3::new(3.0, 4.0, 0.0), 0.7);
        b.update(Vec3::new(3.0, 4.0, 0.0), 0.7);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_no_overlap_when_separated_beyond_half_extents() {
        let mut a = car_box();
        let mut b = car_box();
        a.update(Vec3::ZERO, 0.0);

        // Sum of half-extents along x is 2.0
        b.update(Vec3::new(2.1, 0.0, 0.0), 0.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        // Sum along y is 4.0
        b.update(Vec3::new(0.0, -4.5, 0.0), 0.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_overlap_when_corner_inside() {
        let mut a = car_box();
        let mut b = car_box();
        a.update(Vec3::ZERO, 0.0);
        b.update(Vec3::new(1.5, 3.5, 0.0), 0.0);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_crossed_boxes_are_missed() {
        // Two long thin boxes crossing at right angles: no sample point of
        // either lies inside the other
        let mut a = OrientedBox::new(Vec3::new(-0.2, -5.0, 0.0), Vec3::new(0.2, 5.0, 1.0));
        let mut b = a.clone();
        a.update(Vec3::ZERO, 0.0);
        b.update(Vec3::new(0.0, 0.0, 0.0), FRAC_PI_2);
        // Midpoints coincide, so the midpoint sample still catches this pair
        assert!(a.overlaps(&b));

        // Cross away from both midpoints: the bars meet near (0, 3) only
        b.update(Vec3::new(3.0, 3.0, 0.0), FRAC_PI_2);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_ray_hits_roof_from_above() {
        let mut bbox = car_box();
        bbox.update(Vec3::new(10.0, 0.0, 0.0), 0.0);
        let origin = Vec3::new(10.0, 0.0, 20.0);
        assert!(bbox.intersects_ray(origin, Vec3::new(0.0, 0.0, -1.0)));
        assert!(!bbox.intersects_ray(origin, Vec3::new(1.0, 0.0, -1.0)));
    }

    #[test]
    fn test_ray_slanted_hits_ground_inside_box() {
        let mut bbox = car_box();
        bbox.update(Vec3::ZERO, 0.0);
        // Lands on the ground at (0.5, 0.5, 0)
        let origin = Vec3::new(-9.5, 0.5, 10.0);
        let direction = Vec3::new(1.0, 0.0, -1.0);
        assert!(bbox.intersects(&Ray::new(origin, direction)));
    }

    #[test]
    fn test_ray_side_face_is_missed() {
        let mut bbox = car_box();
        bbox.update(Vec3::ZERO, 0.0);
        // Nearly horizontal ray through the side of the box at mid height.
        // It crosses the ground and the roof planes far outside the box.
        let origin = Vec3::new(-50.0, 0.0, 0.75);
        let direction = Vec3::new(1.0, 0.0, 0.001);
        assert!(!bbox.intersects_ray(origin, direction));
    }

    #[test]
    fn test_world_transform_maps_unit_cube() {
        let mut bbox = car_box();
        bbox.update(Vec3::new(1.0, 2.0, 0.0), FRAC_PI_2);
        let m = bbox.world_transform();

        let centre = m.transform_point3(Vec3::ZERO);
        assert!((centre - Vec3::new(1.0, 2.0, 0.75)).length() < 1e-5);

        // +x of the unit cube scales by half width then yaws onto +y
        let side = m.transform_point3(Vec3::X);
        assert!((side - Vec3::new(1.0, 3.0, 0.75)).length() < 1e-5);

        let top = m.transform_point3(Vec3::Z);
        assert!((top - Vec3::new(1.0, 2.0, 1.5)).length() < 1e-5);
    }
}
