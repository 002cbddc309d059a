//! Query segment representation and segment/AABB clipping.

use tripick_math::{Aabb, Point3, Vec3};

/// A finite oriented query segment with precomputed derived data.
///
/// The direction is kept un-normalized; per-triangle tests scale by the
/// precomputed reciprocal length instead of normalizing.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    /// Start point.
    pub start: Point3,
    /// Un-normalized direction, `end - start`.
    pub direction: Vec3,
    /// Euclidean length of the segment.
    pub length: f32,
    /// Reciprocal of `length`.
    pub(crate) inverse_length: f32,
}

impl Segment {
    /// Precompute segment data from endpoints.
    ///
    /// A zero-length segment yields non-finite derived data; the tree
    /// query rejects such segments before constructing one.
    pub fn new(start: Point3, end: Point3) -> Self {
        let direction = end - start;
        let length = direction.norm();
        Self {
            start,
            direction,
            length,
            inverse_length: 1.0 / length,
        }
    }

    /// End point, `start + direction`.
    pub fn end(&self) -> Point3 {
        self.start + self.direction
    }
}

/// Clip a segment in place against an AABB.
///
/// Returns `false` if the segment lies entirely outside the box. On
/// `true`, `s` and `e` are moved onto the box at entry and exit. Axes are
/// clipped sequentially, so later axes interpolate on already-clipped
/// endpoints; each division is guarded by a strict inequality on the
/// endpoint coordinates, so the denominator is non-zero for finite input.
pub fn clip_segment(s: &mut Point3, e: &mut Point3, bb: &Aabb) -> bool {
    for axis in 0..3 {
        let min = bb.min[axis];
        let max = bb.max[axis];
        if s[axis] <= e[axis] {
            // Trivial reject of a segment wholly outside the slab.
            if e[axis] < min || s[axis] > max {
                return false;
            }
            if s[axis] < min {
                *s = *s + (*e - *s) * ((min - s[axis]) / (e[axis] - s[axis]));
            }
            if e[axis] > max {
                *e = *s + (*e - *s) * ((max - s[axis]) / (e[axis] - s[axis]));
            }
        } else {
            if s[axis] < min || e[axis] > max {
                return false;
            }
            if e[axis] < min {
                *e = *s + (*e - *s) * ((min - s[axis]) / (e[axis] - s[axis]));
            }
            if s[axis] > max {
                *s = *s + (*e - *s) * ((max - s[axis]) / (e[axis] - s[axis]));
            }
        }
    }
    true
}
