//! Sequential decimation backend
//!
//! Single-threaded reference implementation of the decimation contract:
//! validate, select faces, gather their corners, compact.

use meshthin_core::{Result, TriangleMesh};

use crate::compact::compact_vertices;
use crate::select::select_faces;
use crate::DecimationConfig;

/// Decimate `mesh` on the CPU, keeping `floor(face_count * keep_fraction)`
/// randomly selected faces and compacting their vertices.
///
/// The input is not modified; a new mesh is returned.
pub fn decimate(mesh: &TriangleMesh, config: &DecimationConfig) -> Result<TriangleMesh> {
    let kept = crate::validate(mesh.face_count(), config)?;
    log::debug!(
        "sequential decimation: keeping {} of {} faces (seed {})",
        kept,
        mesh.face_count(),
        config.seed
    );

    let selection = select_faces(mesh.face_count(), kept, config.seed);

    let mut corners = Vec::with_capacity(kept * 3);
    for &face in &selection {
        let [a, b, c] = mesh.faces[face as usize];
        corners.push(mesh.vertices[a as usize]);
        corners.push(mesh.vertices[b as usize]);
        corners.push(mesh.vertices[c as usize]);
    }

    let (vertices, remap) = compact_vertices(&corners);
    let faces = remap
        .chunks_exact(3)
        .map(|corner| [corner[0], corner[1], corner[2]])
        .collect();

    let result = TriangleMesh::from_vertices_and_faces(vertices, faces);
    log::debug!(
        "sequential decimation: {} faces, {} vertices",
        result.face_count(),
        result.vertex_count()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshthin_core::{Error, Point3f};

    /// Soup of `n` triangles forming a strip; adjacent triangles repeat
    /// two corner coordinates, so compaction has duplicates to merge.
    fn make_strip_soup(n: usize) -> TriangleMesh {
        let mut corners = Vec::with_capacity(n * 3);
        for i in 0..n {
            let x = i as f32;
            corners.push(Point3f::new(x, 0.0, 0.0));
            corners.push(Point3f::new(x + 1.0, 0.0, 0.0));
            corners.push(Point3f::new(x + 0.5, 1.0, 0.0));
        }
        TriangleMesh::from_triangle_soup(corners).unwrap()
    }

    fn assert_contract(kept: usize, result: &TriangleMesh) {
        assert_eq!(result.face_count(), kept);
        for face in &result.faces {
            for &index in face {
                assert!((index as usize) < result.vertex_count());
            }
        }
        // dedup soundness: no two output vertices bit-identical
        let mut keys: Vec<[u32; 3]> = result
            .vertices
            .iter()
            .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
            .collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), result.vertex_count());
    }

    #[test]
    fn test_kept_face_count() {
        let mesh = make_strip_soup(100);
        let result = decimate(&mesh, &DecimationConfig::new(0.05)).unwrap();
        assert_contract(5, &result);

        let result = decimate(&mesh, &DecimationConfig::new(0.3)).unwrap();
        assert_contract(30, &result);
    }

    #[test]
    fn test_full_keep_still_compacts_vertices() {
        let mesh = make_strip_soup(50);
        let result = decimate(&mesh, &DecimationConfig::new(1.0)).unwrap();
        assert_eq!(result.face_count(), 50);
        // strip corners coincide across neighbors, so the soup's 150
        // corners collapse well below 3 per face
        assert!(result.vertex_count() < mesh.vertex_count());
    }

    #[test]
    fn test_gather_reproduces_selected_corners() {
        let mesh = make_strip_soup(40);
        let config = DecimationConfig::new(0.5).with_seed(11);
        let result = decimate(&mesh, &config).unwrap();

        let kept = crate::validate(mesh.face_count(), &config).unwrap();
        let selection = crate::select_faces(mesh.face_count(), kept, config.seed);
        for (kept_index, &face) in selection.iter().enumerate() {
            let original = mesh.faces[face as usize];
            let compacted = result.faces[kept_index];
            for corner in 0..3 {
                let expected = mesh.vertices[original[corner] as usize];
                let actual = result.vertices[compacted[corner] as usize];
                assert_eq!(expected.x.to_bits(), actual.x.to_bits());
                assert_eq!(expected.y.to_bits(), actual.y.to_bits());
                assert_eq!(expected.z.to_bits(), actual.z.to_bits());
            }
        }
    }

    #[test]
    fn test_deterministic_per_seed() {
        let mesh = make_strip_soup(64);
        let config = DecimationConfig::new(0.25).with_seed(42);
        let first = decimate(&mesh, &config).unwrap();
        let second = decimate(&mesh, &config).unwrap();
        assert_eq!(first, second);

        let other = decimate(&mesh, &config.with_seed(43)).unwrap();
        assert_eq!(other.face_count(), first.face_count());
    }

    #[test]
    fn test_rejects_invalid_fraction() {
        let mesh = make_strip_soup(100);
        for fraction in [0.01, 1.2] {
            assert!(matches!(
                decimate(&mesh, &DecimationConfig::new(fraction)),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_rejects_insufficient_faces() {
        let mesh = make_strip_soup(10);
        assert!(matches!(
            decimate(&mesh, &DecimationConfig::new(0.2)),
            Err(Error::InsufficientFaces { kept: 2 })
        ));
    }

    #[test]
    fn test_completeness_of_dedup() {
        let mesh = make_strip_soup(30);
        let config = DecimationConfig::new(1.0);
        let result = decimate(&mesh, &config).unwrap();

        // every original corner coordinate appears among the compacted
        // vertices with exactly that value
        let keys: std::collections::HashSet<[u32; 3]> = result
            .vertices
            .iter()
            .map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
            .collect();
        for corner in &mesh.vertices {
            let key = [corner.x.to_bits(), corner.y.to_bits(), corner.z.to_bits()];
            assert!(keys.contains(&key));
        }
    }
}
