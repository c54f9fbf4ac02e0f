//! Benchmarks for the sequential decimation backend

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meshthin_core::{Point3f, TriangleMesh};
use meshthin_decimate::{decimate_sequential, DecimationConfig};

/// Triangle-soup grid: every quad split in two, each triangle owning
/// private copies of its corners, like a freshly loaded binary STL.
fn generate_soup_grid(size: usize) -> TriangleMesh {
    let height = |x: usize, y: usize| {
        let fx = x as f32 / (size - 1) as f32 * std::f32::consts::PI;
        let fy = y as f32 / (size - 1) as f32 * std::f32::consts::PI;
        (fx.sin() * fy.sin()) * 2.0
    };
    let corner = |x: usize, y: usize| Point3f::new(x as f32, y as f32, height(x, y));

    let mut corners = Vec::with_capacity((size - 1) * (size - 1) * 6);
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            corners.push(corner(x, y));
            corners.push(corner(x, y + 1));
            corners.push(corner(x + 1, y));
            corners.push(corner(x + 1, y));
            corners.push(corner(x, y + 1));
            corners.push(corner(x + 1, y + 1));
        }
    }
    TriangleMesh::from_triangle_soup(corners).unwrap()
}

fn bench_decimation(c: &mut Criterion) {
    let sizes = [32, 64, 128];
    let fractions = [0.1, 0.3, 0.7];

    let mut group = c.benchmark_group("decimation");

    for &size in &sizes {
        let mesh = generate_soup_grid(size);
        let face_count = mesh.face_count();

        for &fraction in &fractions {
            group.bench_with_input(
                BenchmarkId::new(
                    "sequential",
                    format!("{}f_k{}", face_count, (fraction * 100.0) as u32),
                ),
                &(&mesh, fraction),
                |b, &(mesh, fraction)| {
                    let config = DecimationConfig::new(fraction);
                    b.iter(|| {
                        let result = decimate_sequential(black_box(mesh), &config).unwrap();
                        black_box(result);
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_decimation);
criterion_main!(benches);
