//! Error types for k-d tree construction.

use thiserror::Error;

/// Errors that can occur while building a k-d tree.
///
/// A build that fails constructs nothing; the caller keeps the mesh
/// un-indexed and decides what to do.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Vertex buffer length is not a multiple of three floats.
    #[error("vertex buffer length {0} is not a multiple of 3")]
    UnsupportedVertexArray(usize),

    /// Index buffer length is not a multiple of three indices.
    #[error("index buffer length {0} is not a multiple of 3")]
    UnsupportedIndexArray(usize),

    /// Mesh is too small to be worth indexing.
    #[error("mesh has {count} vertices, need more than {target}")]
    TooFewVertices {
        /// Number of vertices in the mesh.
        count: usize,
        /// The per-leaf triangle target the count was compared against.
        target: usize,
    },

    /// A triangle references a vertex the buffer does not contain.
    #[error("vertex index {index} out of range for {num_vertices} vertices")]
    VertexIndexOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of vertices in the mesh.
        num_vertices: usize,
    },

    /// Build options fail validation.
    #[error("invalid build options: {0}")]
    InvalidOptions(String),
}

/// Result type for k-d tree operations.
pub type Result<T> = std::result::Result<T, BuildError>;
