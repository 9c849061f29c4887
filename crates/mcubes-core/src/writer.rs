//! Legacy VTK ASCII polydata serialization.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{WriteError, WriteResult};
use crate::mesh::Mesh;

/// Renders `mesh` as a legacy VTK ASCII `POLYDATA` document and writes it to
/// `path` in a single persist step. On any error the partially rendered
/// output is never left on disk: the document is fully built in memory first,
/// and a failed write removes whatever was already written.
///
/// # Errors
/// Returns [`WriteError`] if the output path cannot be created or written.
pub fn write_mesh(path: impl AsRef<Path>, mesh: &Mesh) -> WriteResult<()> {
    let path = path.as_ref();
    let document = render_polydata(mesh);
    if let Err(source) = fs::write(path, document) {
        let _ = fs::remove_file(path);
        return Err(WriteError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    log::info!(
        "wrote mesh to '{}': {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(())
}

fn render_polydata(mesh: &Mesh) -> String {
    let mut out = String::with_capacity(64 + mesh.vertices.len() * 24 + mesh.triangles.len() * 16);
    out.push_str("# vtk DataFile Version 3.0\n");
    out.push_str("marching cubes output\n");
    out.push_str("ASCII\n");
    out.push_str("DATASET POLYDATA\n");
    let _ = writeln!(out, "POINTS {} float", mesh.vertex_count());
    for v in &mesh.vertices {
        let _ = writeln!(out, "{} {} {}", v.x, v.y, v.z);
    }
    let n_tri = mesh.triangle_count();
    let _ = writeln!(out, "POLYGONS {} {}", n_tri, n_tri * 4);
    for t in &mesh.triangles {
        let _ = writeln!(out, "3 {} {} {}", t.a, t.b, t.c);
    }
    out
}
