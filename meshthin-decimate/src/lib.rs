//! Mesh decimation by uniform random face subsampling
//!
//! This crate implements the core decimation operation: keep a seeded
//! random subset of faces, then compact the kept faces' corner vertices
//! by bit-exact deduplication. The sequential backend lives here; the
//! data-parallel backend in `meshthin-gpu` implements the same contract
//! with the same selection and compaction semantics.

pub mod compact;
pub mod select;
pub mod sequential;

pub use compact::compact_vertices;
pub use select::select_faces;
pub use sequential::decimate as decimate_sequential;

use meshthin_core::{Error, Result};

/// Smallest accepted keep-fraction.
pub const MIN_KEEP_FRACTION: f32 = 0.05;
/// Largest accepted keep-fraction.
pub const MAX_KEEP_FRACTION: f32 = 1.0;
/// A decimated mesh must keep at least this many faces.
pub const MIN_KEPT_FACES: usize = 3;
/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 42;

/// Which execution strategy runs the decimation.
///
/// Chosen explicitly by the caller (or by a one-shot capability probe at
/// startup) and passed down as configuration; there is no hidden global
/// backend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Single-threaded CPU backend.
    Sequential,
    /// GPU compute backend (one fork-join batch of array passes).
    DataParallel,
}

/// Parameters of a decimation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimationConfig {
    /// Fraction of faces to keep, in [`MIN_KEEP_FRACTION`, `MAX_KEEP_FRACTION`].
    pub keep_fraction: f32,
    /// Seed for the face-selection permutation.
    pub seed: u64,
}

impl DecimationConfig {
    pub fn new(keep_fraction: f32) -> Self {
        Self {
            keep_fraction,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for DecimationConfig {
    fn default() -> Self {
        Self::new(0.3)
    }
}

/// Validate a request against a mesh's face count and return the number
/// of faces to keep, `floor(total_faces * keep_fraction)`.
///
/// Both backends call this before touching any buffer, so invalid
/// requests are rejected before any work begins.
pub fn validate(total_faces: usize, config: &DecimationConfig) -> Result<usize> {
    if !(MIN_KEEP_FRACTION..=MAX_KEEP_FRACTION).contains(&config.keep_fraction) {
        return Err(Error::InvalidParameter(format!(
            "keep_fraction must be between {} and {}, got {}",
            MIN_KEEP_FRACTION, MAX_KEEP_FRACTION, config.keep_fraction
        )));
    }
    let kept = (total_faces as f64 * config.keep_fraction as f64).floor() as usize;
    if kept < MIN_KEPT_FACES {
        return Err(Error::InsufficientFaces { kept });
    }
    Ok(kept)
}
