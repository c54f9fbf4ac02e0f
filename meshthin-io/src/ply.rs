//! PLY export
//!
//! Writes the compacted mesh in PLY's shared-vertex representation for
//! downstream viewers.

use crate::MeshWriter;
use meshthin_core::{Error, Result, TriangleMesh};
use ply_rs::{
    ply::{
        Addable, DefaultElement, ElementDef, Ply, Property, PropertyDef, PropertyType, ScalarType,
    },
    writer::Writer,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub struct PlyWriter;

impl MeshWriter for PlyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        if mesh.faces.is_empty() {
            return Err(Error::InvalidData(
                "refusing to export a mesh with no faces".to_string(),
            ));
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();

        // Define vertex element
        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = mesh.vertices.len();
        vertex_element.properties.add(PropertyDef::new(
            "x".to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
        vertex_element.properties.add(PropertyDef::new(
            "y".to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
        vertex_element.properties.add(PropertyDef::new(
            "z".to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
        ply.header.elements.add(vertex_element);

        // Define face element
        let mut face_element = ElementDef::new("face".to_string());
        face_element.count = mesh.faces.len();
        face_element.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        ply.header.elements.add(face_element);

        // Add vertex data
        let mut vertices = Vec::new();
        for vertex in &mesh.vertices {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(vertex.x));
            element.insert("y".to_string(), Property::Float(vertex.y));
            element.insert("z".to_string(), Property::Float(vertex.z));
            vertices.push(element);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        // Add face data
        let mut faces = Vec::new();
        for face in &mesh.faces {
            let mut element = DefaultElement::new();
            let indices = vec![face[0] as i32, face[1] as i32, face[2] as i32];
            element.insert("vertex_indices".to_string(), Property::ListInt(indices));
            faces.push(element);
        }
        ply.payload.insert("face".to_string(), faces);

        let writer_instance = Writer::new();
        writer_instance.write_ply(&mut writer, &mut ply)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshthin_core::Point3f;

    fn make_quad() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_writes_header_and_counts() {
        let path = std::env::temp_dir().join("meshthin_ply_quad.ply");
        PlyWriter::write_mesh(&make_quad(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("ply"));
        assert!(contents.contains("element vertex 4"));
        assert!(contents.contains("element face 2"));
        assert!(contents.contains("end_header"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_rejects_faceless_mesh() {
        let path = std::env::temp_dir().join("meshthin_ply_empty.ply");
        let mesh = TriangleMesh::new();
        assert!(matches!(
            PlyWriter::write_mesh(&mesh, &path),
            Err(Error::InvalidData(_))
        ));
    }
}
