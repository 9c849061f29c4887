//! Mesh data model and the append-only sink the extractor writes into.

use glam::Vec3;

/// A vertex placed on a cell edge, in volume-index space: corner `C0` of cell
/// `(i, j, k)` is the point `(i, j, k)`.
pub type Vertex = Vec3;

/// A triangle as three indices into a sink's vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// First vertex index.
    pub a: u32,
    /// Second vertex index.
    pub b: u32,
    /// Third vertex index.
    pub c: u32,
}

impl Triangle {
    /// Creates a new triangle from three vertex indices.
    #[must_use]
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }
}

/// The append-only endpoint for geometry produced during extraction.
///
/// Two realizations are expected: a [`BufferedMeshSink`] that grows two
/// in-memory arrays, and a streaming realization that forwards each record to
/// a downstream consumer while keeping only running counts. Both must honor
/// the same emission order the extractor drives them in: cells in `(z, y, x)`
/// row-major order, edges ascending within a cell, triangles in topology-table
/// order.
pub trait MeshSink {
    /// Appends a vertex and returns its newly assigned index.
    fn push_vertex(&mut self, v: Vertex) -> u32;

    /// Appends a triangle of already-assigned vertex indices.
    fn push_triangle(&mut self, t: Triangle);

    /// The number of vertices appended so far.
    fn vertex_count(&self) -> u32;
}

/// A buffered [`MeshSink`] that grows two `Vec`s in memory, for batch output.
#[derive(Debug, Clone, Default)]
pub struct BufferedMeshSink {
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
}

impl BufferedMeshSink {
    /// Creates an empty sink with no pre-allocated capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sink with room for `vertex_capacity` vertices and
    /// `triangle_capacity` triangles, to avoid reallocation during a large
    /// extraction.
    #[must_use]
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            triangles: Vec::with_capacity(triangle_capacity),
        }
    }

    /// Consumes the sink, returning the final vertex and triangle buffers.
    #[must_use]
    pub fn finalize(self) -> (Vec<Vertex>, Vec<Triangle>) {
        (self.vertices, self.triangles)
    }
}

impl MeshSink for BufferedMeshSink {
    fn push_vertex(&mut self, v: Vertex) -> u32 {
        let idx = self.vertices.len() as u32;
        self.vertices.push(v);
        idx
    }

    fn push_triangle(&mut self, t: Triangle) {
        self.triangles.push(t);
    }

    fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

/// A complete, buffered output of extraction: a pair of vertex and triangle
/// buffers with no deduplication across cells.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Interpolated vertex positions in volume-index space.
    pub vertices: Vec<Vertex>,
    /// Triangle indices into `vertices`.
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Returns the number of vertices in the mesh.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles in the mesh.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl From<BufferedMeshSink> for Mesh {
    fn from(sink: BufferedMeshSink) -> Self {
        let (vertices, triangles) = sink.finalize();
        Self {
            vertices,
            triangles,
        }
    }
}
