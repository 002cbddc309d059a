//! Node pool and recursive segment query.

use tripick_math::{Aabb, Point3};

use crate::intersect::{intersect_triangle, IntersectionSink};
use crate::mesh::TriangleMesh;
use crate::segment::{clip_segment, Segment};

/// Index of a node in the flat pool.
pub(crate) type NodeIndex = u32;

/// Payload of one k-d node.
#[derive(Debug, Clone, Copy)]
pub(crate) enum KdNodeKind {
    /// Leaf owning `primitive_indices[first..first + count]`.
    Leaf {
        /// Start of the leaf's slice of the primitive-index permutation.
        first: u32,
        /// Length of the slice.
        count: u32,
    },
    /// Internal node; `None` marks a side left empty by the partition.
    Internal {
        /// Child covering the lower half of the split axis.
        left: Option<NodeIndex>,
        /// Child covering the upper half of the split axis.
        right: Option<NodeIndex>,
    },
}

/// One node of the k-d tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KdNode {
    pub kind: KdNodeKind,
    pub bb: Aabb,
}

/// A triangle as three vertex indices.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Triangle {
    pub p1: u32,
    pub p2: u32,
    pub p3: u32,
}

/// k-d tree spatial index over a borrowed triangle mesh.
///
/// Built once with [`KdTree::build`](crate::KdTree::build); immutable
/// afterwards. The node pool is a flat vector with the root at index 0;
/// leaves own contiguous slices of a permutation of triangle ids.
pub struct KdTree<'a> {
    pub(crate) mesh: &'a TriangleMesh,
    pub(crate) nodes: Vec<KdNode>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) centers: Vec<Point3>,
    pub(crate) primitive_indices: Vec<u32>,
    pub(crate) axis_stack: Vec<usize>,
}

impl<'a> KdTree<'a> {
    /// The mesh this tree indexes.
    pub fn mesh(&self) -> &TriangleMesh {
        self.mesh
    }

    /// Bound of the whole tree (the root node's box).
    pub fn bounds(&self) -> Aabb {
        self.nodes[0].bb
    }

    /// Number of indexed triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of nodes in the pool.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The builder's permutation of triangle ids. Always a permutation of
    /// `0..num_triangles()`; each leaf owns a contiguous slice.
    pub fn primitive_indices(&self) -> &[u32] {
        &self.primitive_indices
    }

    /// Visit every leaf with its depth, triangle-id slice, and inflated
    /// bound.
    pub fn for_each_leaf(&self, mut f: impl FnMut(usize, &[u32], &Aabb)) {
        self.visit_leaves(0, 0, &mut f);
    }

    fn visit_leaves(
        &self,
        node_index: NodeIndex,
        depth: usize,
        f: &mut impl FnMut(usize, &[u32], &Aabb),
    ) {
        let node = &self.nodes[node_index as usize];
        match node.kind {
            KdNodeKind::Leaf { first, count } => {
                let slice = &self.primitive_indices[first as usize..(first + count) as usize];
                f(depth, slice, &node.bb);
            }
            KdNodeKind::Internal { left, right } => {
                if let Some(l) = left {
                    self.visit_leaves(l, depth + 1, f);
                }
                if let Some(r) = right {
                    self.visit_leaves(r, depth + 1, f);
                }
            }
        }
    }

    /// Intersect the segment `start..end` against the mesh, inserting every
    /// hit into `sink`.
    ///
    /// Returns whether the sink grew. Hits are unordered and are not pruned
    /// by distance; a zero-length segment yields `false`.
    pub fn intersect(
        &self,
        start: Point3,
        end: Point3,
        sink: &mut impl IntersectionSink,
    ) -> bool {
        if start == end {
            return false;
        }
        let segment = Segment::new(start, end);
        self.intersect_node(0, &segment, start, end, sink)
    }

    fn intersect_node(
        &self,
        node_index: NodeIndex,
        segment: &Segment,
        ls: Point3,
        le: Point3,
        sink: &mut impl IntersectionSink,
    ) -> bool {
        let node = &self.nodes[node_index as usize];

        let mut s = ls;
        let mut e = le;
        if !clip_segment(&mut s, &mut e, &node.bb) {
            return false;
        }

        let num_before = sink.len();

        match node.kind {
            KdNodeKind::Leaf { first, count } => {
                for i in first..first + count {
                    let primitive_index = self.primitive_indices[i as usize];
                    let tri = self.triangles[primitive_index as usize];
                    if let Some(hit) = intersect_triangle(
                        segment,
                        primitive_index,
                        [tri.p1, tri.p2, tri.p3],
                        self.mesh.vertex(tri.p1),
                        self.mesh.vertex(tri.p2),
                        self.mesh.vertex(tri.p3),
                    ) {
                        sink.insert(hit);
                    }
                }
            }
            KdNodeKind::Internal { left, right } => {
                if let Some(l) = left {
                    self.intersect_node(l, segment, s, e, sink);
                }
                if let Some(r) = right {
                    self.intersect_node(r, segment, s, e, sink);
                }
            }
        }

        sink.len() != num_before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildOptions, SegmentIntersection};

    /// Unit cube as 12 triangles over the 8 corners of `[0,1]^3`.
    fn unit_cube() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        for z in [0.0, 1.0] {
            mesh.push_vertex(Point3::new(0.0, 0.0, z));
            mesh.push_vertex(Point3::new(1.0, 0.0, z));
            mesh.push_vertex(Point3::new(1.0, 1.0, z));
            mesh.push_vertex(Point3::new(0.0, 1.0, z));
        }
        let faces: [[u32; 4]; 6] = [
            [0, 3, 2, 1], // z = 0
            [4, 5, 6, 7], // z = 1
            [0, 1, 5, 4], // y = 0
            [2, 3, 7, 6], // y = 1
            [0, 4, 7, 3], // x = 0
            [1, 2, 6, 5], // x = 1
        ];
        for [a, b, c, d] in faces {
            mesh.push_triangle(a, b, c);
            mesh.push_triangle(a, c, d);
        }
        mesh
    }

    #[test]
    fn test_intersect_cube_through() {
        let mesh = unit_cube();
        let mut options = BuildOptions::default();
        let tree = KdTree::build(&mut options, &mesh).unwrap();

        let mut hits: Vec<SegmentIntersection> = Vec::new();
        let any = tree.intersect(
            Point3::new(0.5, 0.5, -1.0),
            Point3::new(0.5, 0.5, 2.0),
            &mut hits,
        );
        assert!(any);
        assert!(!hits.is_empty());
        // Entry and exit faces only.
        for hit in &hits {
            assert!(hit.point.z.abs() < 1e-5 || (hit.point.z - 1.0).abs() < 1e-5);
            assert!(hit.ratio >= 0.0 && hit.ratio <= 1.0);
        }
        assert!(hits.iter().any(|h| h.point.z.abs() < 1e-5));
        assert!(hits.iter().any(|h| (h.point.z - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_intersect_miss() {
        let mesh = unit_cube();
        let mut options = BuildOptions::default();
        let tree = KdTree::build(&mut options, &mesh).unwrap();

        let mut hits: Vec<SegmentIntersection> = Vec::new();
        let any = tree.intersect(
            Point3::new(5.0, 5.0, -1.0),
            Point3::new(5.0, 5.0, 2.0),
            &mut hits,
        );
        assert!(!any);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_zero_length_segment() {
        let mesh = unit_cube();
        let mut options = BuildOptions::default();
        let tree = KdTree::build(&mut options, &mesh).unwrap();

        let mut hits: Vec<SegmentIntersection> = Vec::new();
        let p = Point3::new(0.5, 0.5, 0.5);
        assert!(!tree.intersect(p, p, &mut hits));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_repeated_query_idempotent() {
        let mesh = unit_cube();
        let mut options = BuildOptions::default();
        let tree = KdTree::build(&mut options, &mesh).unwrap();

        let start = Point3::new(-1.0, 0.3, 0.4);
        let end = Point3::new(2.0, 0.3, 0.4);

        let mut first: Vec<SegmentIntersection> = Vec::new();
        tree.intersect(start, end, &mut first);
        let mut second: Vec<SegmentIntersection> = Vec::new();
        tree.intersect(start, end, &mut second);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.primitive_index, b.primitive_index);
            assert_eq!(a.ratio, b.ratio);
            assert_eq!(a.point, b.point);
        }
    }

    #[test]
    fn test_sink_keeps_growing_across_queries() {
        let mesh = unit_cube();
        let mut options = BuildOptions::default();
        let tree = KdTree::build(&mut options, &mesh).unwrap();

        let mut hits: Vec<SegmentIntersection> = Vec::new();
        tree.intersect(
            Point3::new(0.5, 0.5, -1.0),
            Point3::new(0.5, 0.5, 2.0),
            &mut hits,
        );
        let after_first = hits.len();
        // Miss after a hit: returns false, sink untouched.
        let any = tree.intersect(
            Point3::new(5.0, 5.0, -1.0),
            Point3::new(5.0, 5.0, 2.0),
            &mut hits,
        );
        assert!(!any);
        assert_eq!(hits.len(), after_first);
    }

    #[test]
    fn test_leaf_visitor_covers_all_triangles() {
        let mesh = unit_cube();
        let mut options = BuildOptions::default();
        let tree = KdTree::build(&mut options, &mesh).unwrap();

        let mut seen = vec![false; tree.num_triangles()];
        tree.for_each_leaf(|_, slice, bb| {
            assert!(bb.is_valid());
            for &id in slice {
                assert!(!seen[id as usize], "triangle {id} in two leaves");
                seen[id as usize] = true;
            }
        });
        assert!(seen.iter().all(|&s| s));
    }
}
