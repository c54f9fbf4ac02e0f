//! Mesh data structures and functionality

use crate::error::Error;
use crate::point::Point3f;
use crate::Result;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces.
///
/// Face entries are indices into the vertex buffer. A freshly loaded
/// triangle soup has one private vertex per triangle corner; after
/// decimation the vertex buffer is deduplicated and faces may share
/// vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from a flattened triangle soup.
    ///
    /// `corners` holds 3 consecutive points per triangle; face `i` is
    /// assigned the implicit indices `[3i, 3i+1, 3i+2]`.
    pub fn from_triangle_soup(corners: Vec<Point3f>) -> Result<Self> {
        if corners.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "triangle soup length {} is not a multiple of 3",
                corners.len()
            )));
        }
        let faces = (0..corners.len() as u32 / 3)
            .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
            .collect();
        Ok(Self {
            vertices: corners,
            faces,
        })
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
