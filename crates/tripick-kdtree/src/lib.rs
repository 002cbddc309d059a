#![warn(missing_docs)]

//! k-d tree accelerated segment/mesh intersection.
//!
//! Builds a median-split k-d tree over a triangle mesh's flat vertex and
//! index buffers, then intersects finite line segments against the mesh,
//! reporting every hit with its parametric position, barycentric weights,
//! and surface normal. The tree is built once per mesh and is immutable
//! afterwards; queries are read-only and may run concurrently.
//!
//! # Architecture
//!
//! - [`TriangleMesh`] - flat-buffer mesh view, borrowed for the tree's lifetime
//! - [`BuildOptions`] - build parameters plus the processed-vertex counter
//! - [`KdTree`] - node pool, median-of-bounds builder, recursive query
//! - [`Segment`] - query segment with precomputed derived data
//! - [`SegmentIntersection`] / [`IntersectionSink`] - query output contract
//!
//! # Example
//!
//! ```
//! use tripick_kdtree::{BuildOptions, KdTree, SegmentIntersection, TriangleMesh};
//! use tripick_math::Point3;
//!
//! let mut mesh = TriangleMesh::new();
//! mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
//! mesh.push_vertex(Point3::new(1.0, 0.0, 0.0));
//! mesh.push_vertex(Point3::new(0.0, 1.0, 0.0));
//! mesh.push_triangle(0, 1, 2);
//!
//! let mut options = BuildOptions::default();
//! let tree = KdTree::build(&mut options, &mesh).unwrap();
//!
//! let mut hits: Vec<SegmentIntersection> = Vec::new();
//! let any = tree.intersect(
//!     Point3::new(0.25, 0.25, -1.0),
//!     Point3::new(0.25, 0.25, 1.0),
//!     &mut hits,
//! );
//! assert!(any);
//! assert_eq!(hits.len(), 1);
//! ```

pub mod error;
pub mod intersect;
pub mod mesh;

mod builder;
mod segment;
mod tree;

pub use error::{BuildError, Result};
pub use intersect::{IntersectionSink, SegmentIntersection};
pub use mesh::TriangleMesh;
pub use segment::{clip_segment, Segment};
pub use tree::KdTree;

use serde::{Deserialize, Serialize};

/// Build parameters for [`KdTree::build`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    /// A leaf holding at most this many triangles is not split further.
    pub target_num_triangles_per_leaf: u32,
    /// Hard cap on tree depth.
    pub max_num_levels: u32,
    /// Total vertices processed by successful builds. Monotone; read it to
    /// track work across many meshes.
    pub num_vertices_processed: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            target_num_triangles_per_leaf: 2,
            max_num_levels: 32,
            num_vertices_processed: 0,
        }
    }
}

impl BuildOptions {
    /// Validate options.
    pub fn validate(&self) -> Result<()> {
        if self.target_num_triangles_per_leaf == 0 {
            return Err(BuildError::InvalidOptions(
                "target_num_triangles_per_leaf must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = BuildOptions::default();
        assert_eq!(options.target_num_triangles_per_leaf, 2);
        assert_eq!(options.max_num_levels, 32);
        assert_eq!(options.num_vertices_processed, 0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_target_rejected() {
        let options = BuildOptions {
            target_num_triangles_per_leaf: 0,
            ..BuildOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(BuildError::InvalidOptions(_))
        ));
    }
}
