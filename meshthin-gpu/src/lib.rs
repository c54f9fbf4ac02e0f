//! # meshthin GPU backend
//!
//! Data-parallel mesh decimation on wgpu compute. The whole operation is
//! one fork-join batch of array passes: seeded key generation and bitonic
//! sort for the face permutation, corner gather, a second bitonic sort
//! over encoded coordinate records, change-point marking, prefix-sum
//! group assignment, and a scatter back through the sort permutation.
//!
//! The public entry point [`decimate`] honors the backend equivalence
//! contract: when the GPU environment is unavailable or fails at runtime
//! it falls back to the sequential backend transparently, and parameter
//! errors are never recovered.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meshthin_core::TriangleMesh;
//! use meshthin_decimate::{Backend, DecimationConfig};
//!
//! async fn example(mesh: &TriangleMesh) -> meshthin_core::Result<TriangleMesh> {
//!     let config = DecimationConfig::new(0.3);
//!     meshthin_gpu::decimate(mesh, &config, Backend::DataParallel).await
//! }
//! ```

pub mod decimate;
pub mod device;

pub use decimate::{decimate, gpu_decimate};
pub use device::GpuContext;
