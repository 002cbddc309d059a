#![warn(missing_docs)]

//! Math types for the tripick spatial index.
//!
//! Thin wrappers around nalgebra providing single-precision types for
//! triangle-mesh geometry: points, vectors, and the axis-aligned
//! bounding box used throughout the k-d tree.

use nalgebra::Vector3;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f32>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f32>;

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another AABB. Empty boxes contribute
    /// nothing.
    pub fn include_aabb(&mut self, other: &Aabb) {
        if !other.is_valid() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// True if the box contains at least one point (`min <= max` on every
    /// axis).
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f32) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.min.z -= tol;
        self.max.x += tol;
        self.max.y += tol;
        self.max.z += tol;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_invalid() {
        let bb = Aabb::empty();
        assert!(!bb.is_valid());
    }

    #[test]
    fn test_include_point() {
        let mut bb = Aabb::empty();
        bb.include_point(&Point3::new(1.0, 2.0, 3.0));
        assert!(bb.is_valid());
        bb.include_point(&Point3::new(-1.0, 0.0, 5.0));
        assert!((bb.min.x - -1.0).abs() < 1e-12);
        assert!((bb.min.y - 0.0).abs() < 1e-12);
        assert!((bb.min.z - 3.0).abs() < 1e-12);
        assert!((bb.max.x - 1.0).abs() < 1e-12);
        assert!((bb.max.y - 2.0).abs() < 1e-12);
        assert!((bb.max.z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_include_aabb_union() {
        let mut a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(-2.0, 0.5, 0.5), Point3::new(0.5, 3.0, 0.5));
        a.include_aabb(&b);
        assert!((a.min.x - -2.0).abs() < 1e-12);
        assert!((a.max.y - 3.0).abs() < 1e-12);
        assert!((a.max.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_include_aabb_ignores_empty() {
        let mut a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        a.include_aabb(&Aabb::empty());
        assert!(a.is_valid());
        assert!((a.min.x - 0.0).abs() < 1e-12);
        assert!((a.max.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_center() {
        let bb = Aabb::new(Point3::new(0.0, 2.0, -4.0), Point3::new(2.0, 4.0, 4.0));
        let c = bb.center();
        assert!((c.x - 1.0).abs() < 1e-6);
        assert!((c.y - 3.0).abs() < 1e-6);
        assert!((c.z - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_expand() {
        let mut bb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        bb.expand(0.5);
        assert!((bb.min.x - -0.5).abs() < 1e-6);
        assert!((bb.max.z - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_flat_box_is_valid() {
        // A single point yields a zero-extent but valid box.
        let mut bb = Aabb::empty();
        bb.include_point(&Point3::new(1.0, 1.0, 1.0));
        assert!(bb.is_valid());
        assert!((bb.min.x - bb.max.x).abs() < 1e-12);
    }
}
