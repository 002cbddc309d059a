//! Flat-buffer triangle mesh view consumed by the k-d tree.

use tripick_math::{Aabb, Point3};

/// A triangle mesh as flat vertex and index buffers.
///
/// `vertices` holds `[x0, y0, z0, x1, y1, z1, ...]`; `indices` holds three
/// entries per triangle. The tree borrows the mesh for its whole lifetime
/// and never mutates it.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub vertices: Vec<f32>,
    /// Flat array of triangle vertex indices: `[i0, i1, i2, ...]`.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Fetch vertex `i` as a point.
    pub fn vertex(&self, i: u32) -> Point3 {
        let at = i as usize * 3;
        Point3::new(self.vertices[at], self.vertices[at + 1], self.vertices[at + 2])
    }

    /// Append a vertex, returning its index.
    pub fn push_vertex(&mut self, p: Point3) -> u32 {
        let index = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&[p.x, p.y, p.z]);
        index
    }

    /// Append a triangle as three vertex indices.
    pub fn push_triangle(&mut self, p1: u32, p2: u32, p3: u32) {
        self.indices.extend_from_slice(&[p1, p2, p3]);
    }

    /// Visit every triangle, in emission order, with its vertex indices.
    ///
    /// This is the enumeration contract the tree builder collects from;
    /// primitive ids are assigned in visit order.
    pub fn for_each_triangle(&self, mut f: impl FnMut(u32, u32, u32)) {
        for tri in self.indices.chunks_exact(3) {
            f(tri[0], tri[1], tri[2]);
        }
    }

    /// Bounding box of all vertices. Empty meshes yield an invalid box.
    pub fn bounds(&self) -> Aabb {
        let mut bb = Aabb::empty();
        for chunk in self.vertices.chunks_exact(3) {
            bb.include_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
        }
        bb
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
