//! Median-of-bounds k-d tree construction.
//!
//! The builder never moves triangles; it permutes an index array in place
//! so every leaf ends up owning a contiguous slice of triangle ids. Splits
//! bisect the node's bound on a precomputed per-level axis rather than
//! re-examining the local triangle distribution.

use tripick_math::Aabb;

use crate::error::{BuildError, Result};
use crate::mesh::TriangleMesh;
use crate::tree::{KdNode, KdNodeKind, KdTree, NodeIndex, Triangle};
use crate::BuildOptions;

/// Inflation applied to each finished leaf bound on every axis, so flat
/// axis-aligned triangles survive the segment clip test.
const LEAF_EPSILON: f32 = 1e-6;

impl<'a> KdTree<'a> {
    /// Build a k-d tree over `mesh`.
    ///
    /// Fails without constructing anything if the buffers are malformed,
    /// the mesh has no more vertices than the per-leaf triangle target, or
    /// a triangle references a missing vertex. On success
    /// `options.num_vertices_processed` grows by the mesh's vertex count.
    pub fn build(options: &mut BuildOptions, mesh: &'a TriangleMesh) -> Result<Self> {
        options.validate()?;

        if mesh.vertices.len() % 3 != 0 {
            return Err(BuildError::UnsupportedVertexArray(mesh.vertices.len()));
        }
        if mesh.indices.len() % 3 != 0 {
            return Err(BuildError::UnsupportedIndexArray(mesh.indices.len()));
        }

        let num_vertices = mesh.num_vertices();
        let target = options.target_num_triangles_per_leaf as usize;
        if num_vertices <= target {
            return Err(BuildError::TooFewVertices {
                count: num_vertices,
                target,
            });
        }
        if let Some(&index) = mesh
            .indices
            .iter()
            .find(|&&index| index as usize >= num_vertices)
        {
            return Err(BuildError::VertexIndexOutOfRange {
                index,
                num_vertices,
            });
        }

        let bb = mesh.bounds();

        let estimated_nodes = (2 * num_vertices / target) * 5;
        let estimated_triangles = 2 * num_vertices;

        let mut tree = KdTree {
            mesh,
            nodes: Vec::with_capacity(estimated_nodes),
            triangles: Vec::with_capacity(estimated_triangles),
            centers: Vec::with_capacity(estimated_triangles),
            primitive_indices: Vec::with_capacity(estimated_triangles),
            axis_stack: compute_axis_schedule(&bb, options.max_num_levels),
        };

        options.num_vertices_processed += num_vertices;

        tree.collect_triangles();

        tree.nodes.push(KdNode {
            kind: KdNodeKind::Leaf {
                first: 0,
                count: tree.triangles.len() as u32,
            },
            bb,
        });

        let mut bb = bb;
        tree.divide(options, &mut bb, 0, 0);

        Ok(tree)
    }

    /// Collect one triangle, its vertex-AABB center, and an identity
    /// permutation entry per mesh triangle, in emission order.
    fn collect_triangles(&mut self) {
        let mesh = self.mesh;
        mesh.for_each_triangle(|p1, p2, p3| {
            let mut bb = Aabb::empty();
            bb.include_point(&mesh.vertex(p1));
            bb.include_point(&mesh.vertex(p2));
            bb.include_point(&mesh.vertex(p3));

            self.primitive_indices.push(self.triangles.len() as u32);
            self.triangles.push(Triangle { p1, p2, p3 });
            self.centers.push(bb.center());
        });
    }

    /// Recursively split a leaf until it meets the per-leaf target or the
    /// level cap. `bb` is the region the node is responsible for; it is
    /// narrowed to one half of the split axis around each child recursion
    /// and restored afterwards.
    fn divide(
        &mut self,
        options: &BuildOptions,
        bb: &mut Aabb,
        node_index: NodeIndex,
        level: usize,
    ) {
        let (first, count) = match self.nodes[node_index as usize].kind {
            KdNodeKind::Leaf { first, count } => (first, count),
            KdNodeKind::Internal { .. } => return,
        };

        let need_to_divide =
            level < self.axis_stack.len() && count > options.target_num_triangles_per_leaf;
        if !need_to_divide {
            self.finalize_leaf(node_index, first, count);
            return;
        }

        let axis = self.axis_stack[level];
        let istart = first as isize;
        let iend = istart + count as isize - 1;

        // The extent is bisected; this is not a centroid median.
        let mid = (bb.min[axis] + bb.max[axis]) * 0.5;

        let center = |tree: &Self, i: isize| -> f32 {
            tree.centers[tree.primitive_indices[i as usize] as usize][axis]
        };

        let mut left = istart;
        let mut right = iend;
        while left < right {
            while left < right && center(self, left) <= mid {
                left += 1;
            }
            while left < right && center(self, right) > mid {
                right -= 1;
            }
            if left < right {
                self.primitive_indices.swap(left as usize, right as usize);
                left += 1;
                right -= 1;
            }
        }
        if left == right {
            if center(self, left) <= mid {
                left += 1;
            } else {
                right -= 1;
            }
        }

        let left_count = right - istart + 1;
        let right_count = iend - left + 1;
        debug_assert_eq!(left_count + right_count, count as isize);

        // Allocate only the non-empty sides; a side stays `None` when every
        // center fell on the other side of the midpoint.
        let left_child = (left_count > 0).then(|| {
            self.add_node(KdNode {
                kind: KdNodeKind::Leaf {
                    first: istart as u32,
                    count: left_count as u32,
                },
                bb: Aabb::empty(),
            })
        });
        let right_child = (right_count > 0).then(|| {
            self.add_node(KdNode {
                kind: KdNodeKind::Leaf {
                    first: left as u32,
                    count: right_count as u32,
                },
                bb: Aabb::empty(),
            })
        });

        let restore = bb.max[axis];
        bb.max[axis] = mid;
        if let Some(child) = left_child {
            self.divide(options, bb, child, level + 1);
        }
        bb.max[axis] = restore;

        let restore = bb.min[axis];
        bb.min[axis] = mid;
        if let Some(child) = right_child {
            self.divide(options, bb, child, level + 1);
        }
        bb.min[axis] = restore;

        let mut node_bb = Aabb::empty();
        if let Some(child) = left_child {
            node_bb.include_aabb(&self.nodes[child as usize].bb);
        }
        if let Some(child) = right_child {
            node_bb.include_aabb(&self.nodes[child as usize].bb);
        }
        debug_assert!(node_bb.is_valid());

        let node = &mut self.nodes[node_index as usize];
        node.kind = KdNodeKind::Internal {
            left: left_child,
            right: right_child,
        };
        node.bb = node_bb;
    }

    /// Recompute a finished leaf's bound from its triangles' vertices and
    /// inflate every axis by the leaf epsilon.
    fn finalize_leaf(&mut self, node_index: NodeIndex, first: u32, count: u32) {
        let mesh = self.mesh;
        let mut bb = Aabb::empty();
        for i in first..first + count {
            let tri = self.triangles[self.primitive_indices[i as usize] as usize];
            bb.include_point(&mesh.vertex(tri.p1));
            bb.include_point(&mesh.vertex(tri.p2));
            bb.include_point(&mesh.vertex(tri.p3));
        }
        bb.expand(LEAF_EPSILON);
        debug_assert!(count == 0 || bb.is_valid());
        self.nodes[node_index as usize].bb = bb;
    }

    fn add_node(&mut self, node: KdNode) -> NodeIndex {
        let index = self.nodes.len() as NodeIndex;
        self.nodes.push(node);
        index
    }
}

/// Per-level split axes, fixed up front from the root bound: take the
/// largest remaining extent (ties prefer X, then Y), halve it, repeat.
fn compute_axis_schedule(bb: &Aabb, max_num_levels: u32) -> Vec<usize> {
    let mut extent = [
        bb.max.x - bb.min.x,
        bb.max.y - bb.min.y,
        bb.max.z - bb.min.z,
    ];
    let mut schedule = Vec::with_capacity(max_num_levels as usize);
    for _ in 0..max_num_levels {
        let axis = if extent[0] >= extent[1] {
            if extent[0] >= extent[2] {
                0
            } else {
                2
            }
        } else if extent[1] >= extent[2] {
            1
        } else {
            2
        };
        schedule.push(axis);
        extent[axis] *= 0.5;
    }
    schedule
}
