//! Segment/triangle intersection test and query output contract.

use tripick_math::{Point3, Vec3};

use crate::segment::Segment;

/// A single segment/mesh intersection.
#[derive(Debug, Clone, Copy)]
pub struct SegmentIntersection {
    /// Parametric position along the query segment, in `[0, 1]`.
    pub ratio: f32,
    /// Id of the intersected triangle, in mesh emission order.
    pub primitive_index: u32,
    /// Intersection point.
    pub point: Point3,
    /// Unit normal of the intersected triangle, with the winding as
    /// supplied by the mesh; never flipped.
    pub normal: Vec3,
    /// The triangle's three vertex indices.
    pub index_list: [u32; 3],
    /// Barycentric weights of the intersection point.
    pub ratio_list: [f32; 3],
}

/// Collection the query engine inserts intersections into.
///
/// The engine reports hits unordered and unde-duplicated; ordering and
/// de-duplication are the collection's concern.
pub trait IntersectionSink {
    /// Insert one intersection.
    fn insert(&mut self, hit: SegmentIntersection);
    /// Number of intersections currently held.
    fn len(&self) -> usize;
    /// True if no intersections are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntersectionSink for Vec<SegmentIntersection> {
    fn insert(&mut self, hit: SegmentIntersection) {
        self.push(hit);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Test one triangle against a segment.
///
/// Returns `None` for misses, degenerate triangles (two equal vertices),
/// lines parallel to an edge plane, and non-finite intersection points.
/// The three edge tests bound the intersection inside the triangle before
/// any division happens.
pub fn intersect_triangle(
    segment: &Segment,
    primitive_index: u32,
    indices: [u32; 3],
    v1: Point3,
    v2: Point3,
    v3: Point3,
) -> Option<SegmentIntersection> {
    if v1 == v2 || v2 == v3 || v1 == v3 {
        return None;
    }

    let s = segment.start;
    let d = segment.direction;

    let v12 = v2 - v1;
    let n12 = v12.cross(&d);
    let ds12 = (s - v1).dot(&n12);
    let d312 = (v3 - v1).dot(&n12);
    if d312 >= 0.0 {
        if ds12 < 0.0 || ds12 > d312 {
            return None;
        }
    } else if ds12 > 0.0 || ds12 < d312 {
        return None;
    }

    let v23 = v3 - v2;
    let n23 = v23.cross(&d);
    let ds23 = (s - v2).dot(&n23);
    let d123 = (v1 - v2).dot(&n23);
    if d123 >= 0.0 {
        if ds23 < 0.0 || ds23 > d123 {
            return None;
        }
    } else if ds23 > 0.0 || ds23 < d123 {
        return None;
    }

    let v31 = v1 - v3;
    let n31 = v31.cross(&d);
    let ds31 = (s - v3).dot(&n31);
    let d231 = (v2 - v3).dot(&n31);
    if d231 >= 0.0 {
        if ds31 < 0.0 || ds31 > d231 {
            return None;
        }
    } else if ds31 > 0.0 || ds31 < d231 {
        return None;
    }

    // A zero denominator under a non-zero numerator means the line is
    // parallel to that edge's plane.
    let mut r3 = if ds12 == 0.0 {
        0.0
    } else if d312 != 0.0 {
        ds12 / d312
    } else {
        return None;
    };
    let mut r1 = if ds23 == 0.0 {
        0.0
    } else if d123 != 0.0 {
        ds23 / d123
    } else {
        return None;
    };
    let mut r2 = if ds31 == 0.0 {
        0.0
    } else if d231 != 0.0 {
        ds31 / d231
    } else {
        return None;
    };

    let total_r = r1 + r2 + r3;
    if total_r != 1.0 {
        if total_r == 0.0 {
            return None;
        }
        let inv_total_r = 1.0 / total_r;
        r1 *= inv_total_r;
        r2 *= inv_total_r;
        r3 *= inv_total_r;
    }

    let point = Point3::from(v1.coords * r1 + v2.coords * r2 + v3.coords * r3);
    if !point.x.is_finite() || !point.y.is_finite() || !point.z.is_finite() {
        return None;
    }

    let d_along = (point - s).dot(&d);
    if d_along < 0.0 || d_along > segment.length * segment.length {
        return None;
    }

    let normal = v12.cross(&v23).normalize();
    let ratio = d_along * segment.inverse_length * segment.inverse_length;

    Some(SegmentIntersection {
        ratio,
        primitive_index,
        point,
        normal,
        index_list: indices,
        ratio_list: [r1, r2, r3],
    })
}
