//! Binary STL loading
//!
//! Binary STL is a pure triangle soup: an 80-byte header, a
//! little-endian u32 triangle count, then one 50-byte record per
//! triangle (normal, 3 corners, attribute word). Corners come out
//! flattened with implicit faces; normals and attribute words are
//! discarded since the decimator works on positions only.

use crate::MeshReader;
use meshthin_core::{Error, Point3f, Result, TriangleMesh};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const HEADER_LEN: u64 = 80;
const RECORD_LEN: u64 = 50;
/// Slack allowed between declared and actual file size before the file
/// is rejected as non-binary STL (some exporters append a few bytes).
const SIZE_SLACK: u64 = 100;

pub struct StlReader;

impl MeshReader for StlReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_LEN as usize];
        reader.read_exact(&mut header)?;

        let mut count_bytes = [0u8; 4];
        reader.read_exact(&mut count_bytes).map_err(|_| {
            Error::InvalidData("invalid STL: missing triangle count".to_string())
        })?;
        let triangle_count = u32::from_le_bytes(count_bytes) as u64;

        let expected_size = HEADER_LEN + 4 + triangle_count * RECORD_LEN;
        if expected_size > file_size + SIZE_SLACK {
            return Err(Error::InvalidData(format!(
                "file does not appear to be binary STL: header declares {} triangles \
                 ({} bytes) but the file holds {} bytes",
                triangle_count, expected_size, file_size
            )));
        }

        let mut corners = Vec::with_capacity(triangle_count as usize * 3);
        let mut record = [0u8; RECORD_LEN as usize];
        for _ in 0..triangle_count {
            reader.read_exact(&mut record)?;
            // 12 bytes of normal, then 3 corners of 3 f32 each
            for corner in 0..3 {
                let base = 12 + corner * 12;
                corners.push(Point3f::new(
                    f32_at(&record, base),
                    f32_at(&record, base + 4),
                    f32_at(&record, base + 8),
                ));
            }
        }

        TriangleMesh::from_triangle_soup(corners)
    }
}

#[inline]
fn f32_at(record: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        record[offset],
        record[offset + 1],
        record[offset + 2],
        record[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Serialize triangles into a minimal binary STL byte stream.
    fn write_stl(path: &Path, triangles: &[[[f32; 3]; 3]], declared_count: u32) {
        let mut file = File::create(path).unwrap();
        file.write_all(&[0u8; 80]).unwrap();
        file.write_all(&declared_count.to_le_bytes()).unwrap();
        for triangle in triangles {
            file.write_all(&[0u8; 12]).unwrap(); // normal, ignored
            for corner in triangle {
                for &component in corner {
                    file.write_all(&component.to_le_bytes()).unwrap();
                }
            }
            file.write_all(&0u16.to_le_bytes()).unwrap();
        }
    }

    #[test]
    fn test_reads_soup_layout() {
        let path = std::env::temp_dir().join("meshthin_stl_read.stl");
        let triangles = [
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]],
            [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.5, 1.0, 0.0]],
        ];
        write_stl(&path, &triangles, 2);

        let mesh = StlReader::read_mesh(&path).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.faces[0], [0, 1, 2]);
        assert_eq!(mesh.faces[1], [3, 4, 5]);
        assert_eq!(mesh.vertices[4], Point3f::new(2.0, 0.0, 0.0));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_rejects_size_mismatch() {
        let path = std::env::temp_dir().join("meshthin_stl_mismatch.stl");
        let triangles = [[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]];
        // header claims far more triangles than the file holds
        write_stl(&path, &triangles, 1000);

        assert!(matches!(
            StlReader::read_mesh(&path),
            Err(Error::InvalidData(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_empty_stl_yields_empty_mesh() {
        let path = std::env::temp_dir().join("meshthin_stl_empty.stl");
        write_stl(&path, &[], 0);

        let mesh = StlReader::read_mesh(&path).unwrap();
        assert!(mesh.is_empty());

        let _ = std::fs::remove_file(&path);
    }
}
