//! Face selection
//!
//! Chooses which faces survive decimation: a seeded uniformly random
//! permutation of all face indices, truncated to the kept count. The
//! order of the kept set carries no meaning downstream but is
//! deterministic for a given seed, which keeps runs reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Select `kept` face indices out of `0..total_faces`.
///
/// Pure function of `(total_faces, kept, seed)`. The caller is expected
/// to have validated `kept` via [`crate::validate`].
pub fn select_faces(total_faces: usize, kept: usize, seed: u64) -> Vec<u32> {
    let mut indices: Vec<u32> = (0..total_faces as u32).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices.truncate(kept);
    indices
}
