//! Vertex compaction
//!
//! Deduplicates the kept faces' corner vertices and produces the remap
//! from each corner slot to its compacted vertex index. Two corners are
//! the same vertex iff all three coordinates are bit-for-bit equal; no
//! tolerance merging is applied, so meshes with floating-point noise
//! between nominally coincident corners keep the noise as distinct
//! vertices.
//!
//! The algorithm is the backend-agnostic form of a "unique rows"
//! primitive: sort the corners by a total order over coordinate triples,
//! mark change points in the sorted run, prefix-sum the marks into group
//! ids, and scatter the ids back through the sort permutation. The GPU
//! backend runs the same stages as data-parallel passes.

use meshthin_core::Point3f;

/// Map an f32 to a u32 whose unsigned order matches the numeric order.
///
/// Negative values have all bits flipped, non-negative values get the
/// sign bit set. `-0.0` orders just below `+0.0`, so the two zero
/// encodings stay distinct, matching the bit-exact equality rule.
#[inline]
pub(crate) fn orderable_bits(value: f32) -> u32 {
    let bits = value.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

/// Canonical sort key of a coordinate triple: lexicographic by (x, y, z).
#[inline]
pub(crate) fn coord_key(point: &Point3f) -> [u32; 3] {
    [
        orderable_bits(point.x),
        orderable_bits(point.y),
        orderable_bits(point.z),
    ]
}

/// Deduplicate `corners` by bit-exact coordinate equality.
///
/// Returns the distinct triples, each exactly once in canonical (x, y, z)
/// order, and a remap of `corners.len()` entries from input slot to
/// output vertex index. An empty input yields empty outputs.
pub fn compact_vertices(corners: &[Point3f]) -> (Vec<Point3f>, Vec<u32>) {
    if corners.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut order: Vec<u32> = (0..corners.len() as u32).collect();
    order.sort_unstable_by_key(|&slot| coord_key(&corners[slot as usize]));

    let mut vertices: Vec<Point3f> = Vec::new();
    let mut remap = vec![0u32; corners.len()];
    let mut prev_key: Option<[u32; 3]> = None;
    for &slot in &order {
        let key = coord_key(&corners[slot as usize]);
        if prev_key != Some(key) {
            vertices.push(corners[slot as usize]);
            prev_key = Some(key);
        }
        remap[slot as usize] = (vertices.len() - 1) as u32;
    }
    (vertices, remap)
}
