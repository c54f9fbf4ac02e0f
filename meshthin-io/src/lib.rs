//! I/O collaborators for meshthin
//!
//! The loader reads binary STL into the triangle-soup mesh layout the
//! decimator consumes; the exporter writes the compacted result as PLY,
//! whose shared-vertex representation matches the decimated mesh.

pub mod ply;
pub mod stl;

pub use ply::PlyWriter;
pub use stl::StlReader;

use meshthin_core::{Result, TriangleMesh};

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<std::path::Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<std::path::Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<std::path::Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("stl") | Some("STL") => stl::StlReader::read_mesh(path),
        _ => Err(meshthin_core::Error::UnsupportedFormat(format!(
            "unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<std::path::Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyWriter::write_mesh(mesh, path),
        _ => Err(meshthin_core::Error::UnsupportedFormat(format!(
            "unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}
