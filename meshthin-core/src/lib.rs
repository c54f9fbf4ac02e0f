//! Core data structures for meshthin
//!
//! This crate provides the triangle mesh representation shared by the
//! loader, the decimation backends, and the exporter, along with the
//! common error type.

pub mod error;
pub mod mesh;
pub mod point;

pub use error::*;
pub use mesh::*;
pub use point::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

/// Common result type for meshthin operations
pub type Result<T> = std::result::Result<T, Error>;
