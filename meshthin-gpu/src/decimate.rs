//! GPU-accelerated decimation
//!
//! Runs the face selection and vertex compaction as compute passes:
//! hashed sort keys plus a bitonic sort produce the seeded face
//! permutation, a gather pulls the kept corners, a second bitonic sort
//! over order-preserving coordinate encodings groups duplicates, and a
//! change-mark / prefix-sum / scatter sequence assigns compacted vertex
//! indices. Duplicate detection is bit-exact, same as the sequential
//! backend; the permutation algorithm differs, so face selections are
//! deterministic per backend but not identical across backends.

use meshthin_core::{Error, Point3f, Result, TriangleMesh};
use meshthin_decimate::{sequential, Backend, DecimationConfig};

use crate::GpuContext;

const WORKGROUP_SIZE: u32 = 256;

const PERMUTE_SHADER: &str = r#"
struct PermParams {
    total: u32,
    padded: u32,
    seed_lo: u32,
    seed_hi: u32,
}

struct SortStep {
    j: u32,
    k: u32,
}

@group(0) @binding(0) var<storage, read_write> keys: array<u32>;
@group(0) @binding(1) var<storage, read_write> vals: array<u32>;
@group(0) @binding(2) var<uniform> params: PermParams;
@group(0) @binding(10) var<uniform> sort_params: SortStep;

fn pcg_hash(input: u32) -> u32 {
    let state = input * 747796405u + 2891336453u;
    let word = ((state >> ((state >> 28u) + 4u)) ^ state) * 277803737u;
    return (word >> 22u) ^ word;
}

@compute @workgroup_size(256)
fn gen_keys(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= params.padded) {
        return;
    }
    if (i < params.total) {
        keys[i] = pcg_hash(pcg_hash(i ^ params.seed_lo) ^ params.seed_hi);
        vals[i] = i;
    } else {
        keys[i] = 0xffffffffu;
        vals[i] = 0xffffffffu;
    }
}

fn pair_less(ka: u32, va: u32, kb: u32, vb: u32) -> bool {
    return ka < kb || (ka == kb && va < vb);
}

@compute @workgroup_size(256)
fn sort_pairs(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= params.padded) {
        return;
    }
    let l = i ^ sort_params.j;
    if (l <= i) {
        return;
    }
    let ascending = (i & sort_params.k) == 0u;
    if (ascending == pair_less(keys[l], vals[l], keys[i], vals[i])) {
        let tk = keys[i];
        keys[i] = keys[l];
        keys[l] = tk;
        let tv = vals[i];
        vals[i] = vals[l];
        vals[l] = tv;
    }
}
"#;

const COMPACT_SHADER: &str = r#"
struct CompactParams {
    corner_count: u32,
    padded: u32,
}

struct SortStep {
    j: u32,
    k: u32,
}

@group(0) @binding(0) var<storage, read> vertices: array<f32>;
@group(0) @binding(1) var<storage, read> faces: array<u32>;
@group(0) @binding(2) var<storage, read> selection: array<u32>;
@group(0) @binding(3) var<storage, read_write> corners: array<f32>;
@group(0) @binding(4) var<storage, read_write> records: array<vec4<u32>>;
@group(0) @binding(5) var<storage, read_write> flags: array<u32>;
@group(0) @binding(6) var<storage, read_write> groups: array<u32>;
@group(0) @binding(7) var<storage, read_write> remap: array<u32>;
@group(0) @binding(8) var<storage, read_write> unique_verts: array<f32>;
@group(0) @binding(9) var<uniform> params: CompactParams;
@group(0) @binding(10) var<uniform> sort_params: SortStep;

// Order-preserving u32 encoding of an f32; -0.0 orders just below +0.0.
fn orderable(x: f32) -> u32 {
    let b = bitcast<u32>(x);
    if ((b & 0x80000000u) != 0u) {
        return ~b;
    }
    return b | 0x80000000u;
}

@compute @workgroup_size(256)
fn gather_corners(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= params.padded) {
        return;
    }
    if (i >= params.corner_count) {
        records[i] = vec4<u32>(0xffffffffu, 0xffffffffu, 0xffffffffu, 0xffffffffu);
        return;
    }
    let face = selection[i / 3u];
    let corner = faces[face * 3u + (i % 3u)];
    let x = vertices[corner * 3u];
    let y = vertices[corner * 3u + 1u];
    let z = vertices[corner * 3u + 2u];
    corners[i * 3u] = x;
    corners[i * 3u + 1u] = y;
    corners[i * 3u + 2u] = z;
    records[i] = vec4<u32>(orderable(x), orderable(y), orderable(z), i);
}

// Lexicographic by encoded (x, y, z), slot index as the tiebreaker so
// the comparison is a strict total order.
fn record_less(a: vec4<u32>, b: vec4<u32>) -> bool {
    if (a.x != b.x) { return a.x < b.x; }
    if (a.y != b.y) { return a.y < b.y; }
    if (a.z != b.z) { return a.z < b.z; }
    return a.w < b.w;
}

@compute @workgroup_size(256)
fn sort_records(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= params.padded) {
        return;
    }
    let l = i ^ sort_params.j;
    if (l <= i) {
        return;
    }
    let ascending = (i & sort_params.k) == 0u;
    if (ascending == record_less(records[l], records[i])) {
        let tmp = records[i];
        records[i] = records[l];
        records[l] = tmp;
    }
}

@compute @workgroup_size(256)
fn mark_changes(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= params.corner_count) {
        return;
    }
    if (i == 0u) {
        flags[i] = 1u;
        return;
    }
    let a = records[i];
    let b = records[i - 1u];
    if (a.x != b.x || a.y != b.y || a.z != b.z) {
        flags[i] = 1u;
    } else {
        flags[i] = 0u;
    }
}

@compute @workgroup_size(256)
fn scatter_compact(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= params.corner_count) {
        return;
    }
    let gidx = groups[i] - 1u;
    let slot = records[i].w;
    remap[slot] = gidx;
    if (flags[i] == 1u) {
        unique_verts[gidx * 3u] = corners[slot * 3u];
        unique_verts[gidx * 3u + 1u] = corners[slot * 3u + 1u];
        unique_verts[gidx * 3u + 2u] = corners[slot * 3u + 2u];
    }
}
"#;

const SCAN_SHADER: &str = r#"
struct ScanParams {
    len: u32,
}

@group(0) @binding(0) var<storage, read_write> data: array<u32>;
@group(0) @binding(1) var<storage, read_write> block_sums: array<u32>;
@group(0) @binding(2) var<uniform> params: ScanParams;

var<workgroup> tile: array<u32, 256>;

@compute @workgroup_size(256)
fn scan_block(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(local_invocation_id) lid: vec3<u32>,
    @builtin(workgroup_id) wid: vec3<u32>,
) {
    let i = gid.x;
    var value = 0u;
    if (i < params.len) {
        value = data[i];
    }
    tile[lid.x] = value;
    workgroupBarrier();

    var offset = 1u;
    loop {
        if (offset >= 256u) {
            break;
        }
        var partial = tile[lid.x];
        if (lid.x >= offset) {
            partial = partial + tile[lid.x - offset];
        }
        workgroupBarrier();
        tile[lid.x] = partial;
        workgroupBarrier();
        offset = offset << 1u;
    }

    if (i < params.len) {
        data[i] = tile[lid.x];
    }
    if (lid.x == 255u) {
        block_sums[wid.x] = tile[255u];
    }
}

@compute @workgroup_size(256)
fn add_block_offsets(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(workgroup_id) wid: vec3<u32>,
) {
    let i = gid.x;
    if (i >= params.len) {
        return;
    }
    if (wid.x == 0u) {
        return;
    }
    data[i] = data[i] + block_sums[wid.x - 1u];
}
"#;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SortStep {
    j: u32,
    k: u32,
}

fn workgroups(n: u32) -> u32 {
    (n + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE
}

/// Decimate with an explicit backend, falling back to the sequential
/// backend when the data-parallel environment is unavailable or fails.
///
/// Parameter and precondition errors are surfaced immediately for both
/// backends and are never recovered by falling back.
pub async fn decimate(
    mesh: &TriangleMesh,
    config: &DecimationConfig,
    backend: Backend,
) -> Result<TriangleMesh> {
    meshthin_decimate::validate(mesh.face_count(), config)?;
    match backend {
        Backend::Sequential => sequential::decimate(mesh, config),
        Backend::DataParallel => {
            let attempt = match GpuContext::new().await {
                Ok(ctx) => gpu_decimate(&ctx, mesh, config).await,
                Err(err) => Err(err),
            };
            recover_with_sequential(attempt, mesh, config)
        }
    }
}

/// Fallback policy of the backend equivalence contract: runtime backend
/// failures are recovered sequentially, precondition errors propagate.
fn recover_with_sequential(
    attempt: Result<TriangleMesh>,
    mesh: &TriangleMesh,
    config: &DecimationConfig,
) -> Result<TriangleMesh> {
    match attempt {
        Ok(result) => Ok(result),
        Err(err @ (Error::InvalidParameter(_) | Error::InsufficientFaces { .. })) => Err(err),
        Err(err) => {
            log::warn!(
                "data-parallel backend failed ({}); falling back to sequential decimation",
                err
            );
            sequential::decimate(mesh, config)
        }
    }
}

/// Run the full decimation pipeline on an existing GPU context.
pub async fn gpu_decimate(
    ctx: &GpuContext,
    mesh: &TriangleMesh,
    config: &DecimationConfig,
) -> Result<TriangleMesh> {
    let total_faces = mesh.face_count();
    let kept = meshthin_decimate::validate(total_faces, config)?;
    let corner_count = kept as u32 * 3;
    log::debug!(
        "gpu decimation: keeping {} of {} faces (seed {})",
        kept,
        total_faces,
        config.seed
    );

    let vertex_data: Vec<f32> = mesh
        .vertices
        .iter()
        .flat_map(|p| [p.x, p.y, p.z])
        .collect();
    let face_data: Vec<u32> = mesh.faces.iter().flatten().copied().collect();

    let padded_faces = (total_faces as u32).next_power_of_two();
    let padded_corners = corner_count.next_power_of_two();

    // --- Face permutation: hashed keys + bitonic sort ---

    let keys = ctx.create_buffer(
        "Permutation Keys",
        padded_faces as u64 * 4,
        wgpu::BufferUsages::STORAGE,
    );
    let vals = ctx.create_buffer(
        "Permutation Values",
        padded_faces as u64 * 4,
        wgpu::BufferUsages::STORAGE,
    );
    let perm_params = ctx.create_buffer_init(
        "Permutation Params",
        &[
            total_faces as u32,
            padded_faces,
            config.seed as u32,
            (config.seed >> 32) as u32,
        ],
        wgpu::BufferUsages::UNIFORM,
    );

    let permute_shader = ctx.create_shader_module("Permute Shader", PERMUTE_SHADER);
    let gen_keys = ctx.create_compute_pipeline("Gen Keys", &permute_shader, "gen_keys");
    let sort_pairs = ctx.create_compute_pipeline("Sort Pairs", &permute_shader, "sort_pairs");

    let gen_keys_bind = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Gen Keys"),
        layout: &gen_keys.get_bind_group_layout(0),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: keys.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: vals.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: perm_params.as_entire_binding(),
            },
        ],
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Decimation"),
        });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Gen Keys Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&gen_keys);
        pass.set_bind_group(0, &gen_keys_bind, &[]);
        pass.dispatch_workgroups(workgroups(padded_faces), 1, 1);
    }

    encode_bitonic_sort(
        ctx,
        &mut encoder,
        &sort_pairs,
        padded_faces,
        &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: keys.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: vals.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: perm_params.as_entire_binding(),
            },
        ],
    );

    // --- Gather kept corners and compact duplicates ---

    let vertex_buffer =
        ctx.create_buffer_init("Vertices", &vertex_data, wgpu::BufferUsages::STORAGE);
    let face_buffer = ctx.create_buffer_init("Faces", &face_data, wgpu::BufferUsages::STORAGE);
    let corners = ctx.create_buffer(
        "Gathered Corners",
        corner_count as u64 * 3 * 4,
        wgpu::BufferUsages::STORAGE,
    );
    let records = ctx.create_buffer(
        "Sort Records",
        padded_corners as u64 * 16,
        wgpu::BufferUsages::STORAGE,
    );
    let flags = ctx.create_buffer(
        "Change Flags",
        corner_count as u64 * 4,
        wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
    );
    let groups = ctx.create_buffer(
        "Group Ids",
        corner_count as u64 * 4,
        wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
    );
    let remap = ctx.create_buffer(
        "Corner Remap",
        corner_count as u64 * 4,
        wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
    );
    let unique_verts = ctx.create_buffer(
        "Unique Vertices",
        corner_count as u64 * 3 * 4,
        wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
    );
    let compact_params = ctx.create_buffer_init(
        "Compact Params",
        &[corner_count, padded_corners],
        wgpu::BufferUsages::UNIFORM,
    );

    let compact_shader = ctx.create_shader_module("Compact Shader", COMPACT_SHADER);
    let gather = ctx.create_compute_pipeline("Gather Corners", &compact_shader, "gather_corners");
    let sort_records =
        ctx.create_compute_pipeline("Sort Records", &compact_shader, "sort_records");
    let mark = ctx.create_compute_pipeline("Mark Changes", &compact_shader, "mark_changes");
    let scatter = ctx.create_compute_pipeline("Scatter Compact", &compact_shader, "scatter_compact");

    let gather_bind = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Gather Corners"),
        layout: &gather.get_bind_group_layout(0),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: vertex_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: face_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: vals.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: corners.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: records.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 9,
                resource: compact_params.as_entire_binding(),
            },
        ],
    });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Gather Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&gather);
        pass.set_bind_group(0, &gather_bind, &[]);
        pass.dispatch_workgroups(workgroups(padded_corners), 1, 1);
    }

    encode_bitonic_sort(
        ctx,
        &mut encoder,
        &sort_records,
        padded_corners,
        &[
            wgpu::BindGroupEntry {
                binding: 4,
                resource: records.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 9,
                resource: compact_params.as_entire_binding(),
            },
        ],
    );

    let mark_bind = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Mark Changes"),
        layout: &mark.get_bind_group_layout(0),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 4,
                resource: records.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 5,
                resource: flags.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 9,
                resource: compact_params.as_entire_binding(),
            },
        ],
    });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Mark Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&mark);
        pass.set_bind_group(0, &mark_bind, &[]);
        pass.dispatch_workgroups(workgroups(corner_count), 1, 1);
    }

    // inclusive prefix-sum over a copy of the change flags
    encoder.copy_buffer_to_buffer(&flags, 0, &groups, 0, corner_count as u64 * 4);

    let scan_shader = ctx.create_shader_module("Scan Shader", SCAN_SHADER);
    let scan_block = ctx.create_compute_pipeline("Scan Block", &scan_shader, "scan_block");
    let add_offsets =
        ctx.create_compute_pipeline("Add Block Offsets", &scan_shader, "add_block_offsets");
    encode_inclusive_scan(ctx, &mut encoder, &scan_block, &add_offsets, &groups, corner_count);

    let scatter_bind = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Scatter Compact"),
        layout: &scatter.get_bind_group_layout(0),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 3,
                resource: corners.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: records.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 5,
                resource: flags.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 6,
                resource: groups.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 7,
                resource: remap.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 8,
                resource: unique_verts.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 9,
                resource: compact_params.as_entire_binding(),
            },
        ],
    });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Scatter Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&scatter);
        pass.set_bind_group(0, &scatter_bind, &[]);
        pass.dispatch_workgroups(workgroups(corner_count), 1, 1);
    }

    ctx.queue.submit(std::iter::once(encoder.finish()));

    // --- Read back and assemble the compacted mesh ---

    let remap_bytes = ctx.read_buffer(&remap, corner_count as u64 * 4).await?;
    let remap_host: Vec<u32> = bytemuck::cast_slice(&remap_bytes).to_vec();
    let unique_bytes = ctx
        .read_buffer(&unique_verts, corner_count as u64 * 3 * 4)
        .await?;
    let unique_host: Vec<f32> = bytemuck::cast_slice(&unique_bytes).to_vec();

    let vertex_total = remap_host
        .iter()
        .max()
        .map(|&m| m as usize + 1)
        .unwrap_or(0);

    let vertices: Vec<Point3f> = unique_host[..vertex_total * 3]
        .chunks_exact(3)
        .map(|v| Point3f::new(v[0], v[1], v[2]))
        .collect();
    let faces: Vec<[u32; 3]> = remap_host
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    let result = TriangleMesh::from_vertices_and_faces(vertices, faces);
    log::debug!(
        "gpu decimation: {} faces, {} vertices",
        result.face_count(),
        result.vertex_count()
    );
    Ok(result)
}

/// Encode the full bitonic sorting network over `padded` elements.
///
/// `padded` must be a power of two; the per-step (j, k) parameters go in
/// small uniform buffers so the whole network fits in one encoder.
fn encode_bitonic_sort(
    ctx: &GpuContext,
    encoder: &mut wgpu::CommandEncoder,
    pipeline: &wgpu::ComputePipeline,
    padded: u32,
    shared_entries: &[wgpu::BindGroupEntry],
) {
    let layout = pipeline.get_bind_group_layout(0);
    let mut k = 2u32;
    while k <= padded {
        let mut j = k / 2;
        while j >= 1 {
            let step = ctx.create_buffer_init(
                "Sort Step",
                &[SortStep { j, k }],
                wgpu::BufferUsages::UNIFORM,
            );
            let mut entries = shared_entries.to_vec();
            entries.push(wgpu::BindGroupEntry {
                binding: 10,
                resource: step.as_entire_binding(),
            });
            let bind = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Sort Step"),
                layout: &layout,
                entries: &entries,
            });
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Sort Step Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind, &[]);
            pass.dispatch_workgroups(workgroups(padded), 1, 1);
            drop(pass);
            j /= 2;
        }
        k *= 2;
    }
}

/// Encode an inclusive prefix-sum over `data`, recursing on per-block
/// sums until a single block remains, then adding the scanned block
/// offsets back down.
fn encode_inclusive_scan(
    ctx: &GpuContext,
    encoder: &mut wgpu::CommandEncoder,
    scan_block: &wgpu::ComputePipeline,
    add_offsets: &wgpu::ComputePipeline,
    data: &wgpu::Buffer,
    len: u32,
) {
    let blocks = workgroups(len);
    let block_sums = ctx.create_buffer(
        "Scan Block Sums",
        blocks.max(1) as u64 * 4,
        wgpu::BufferUsages::STORAGE,
    );
    let params = ctx.create_buffer_init("Scan Params", &[len], wgpu::BufferUsages::UNIFORM);

    let scan_bind = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Scan Block"),
        layout: &scan_block.get_bind_group_layout(0),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: data.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: block_sums.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: params.as_entire_binding(),
            },
        ],
    });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Scan Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(scan_block);
        pass.set_bind_group(0, &scan_bind, &[]);
        pass.dispatch_workgroups(blocks, 1, 1);
    }

    if blocks > 1 {
        encode_inclusive_scan(ctx, encoder, scan_block, add_offsets, &block_sums, blocks);

        let add_bind = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Add Offsets"),
            layout: &add_offsets.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: data.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: block_sums.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        });
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Add Offsets Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(add_offsets);
        pass.set_bind_group(0, &add_bind, &[]);
        pass.dispatch_workgroups(blocks, 1, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshthin_core::Point3f;

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

    fn assert_postconditions(result: &TriangleMesh, kept: usize) {
        assert_eq!(result.face_count(), kept);
        for face in &result.faces {
            for &index in face {
                assert!((index as usize) < result.vertex_count());
            }
        }
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
    fn test_fallback_recovers_backend_failure() {
        let mesh = make_strip_soup(100);
        let config = DecimationConfig::new(0.3);
        let attempt = Err(Error::BackendUnavailable("simulated".to_string()));
        let result = recover_with_sequential(attempt, &mesh, &config).unwrap();
        assert_postconditions(&result, 30);
    }

    #[test]
    fn test_fallback_does_not_mask_precondition_errors() {
        let mesh = make_strip_soup(100);
        let config = DecimationConfig::new(0.3);

        let invalid = Err(Error::InvalidParameter("keep_fraction".to_string()));
        assert!(matches!(
            recover_with_sequential(invalid, &mesh, &config),
            Err(Error::InvalidParameter(_))
        ));

        let insufficient = Err(Error::InsufficientFaces { kept: 2 });
        assert!(matches!(
            recover_with_sequential(insufficient, &mesh, &config),
            Err(Error::InsufficientFaces { kept: 2 })
        ));
    }

    #[test]
    fn test_data_parallel_request_always_completes() {
        // With or without a GPU present this must satisfy the contract;
        // on machines with no adapter it exercises the fallback path.
        let mesh = make_strip_soup(80);
        let config = DecimationConfig::new(0.25).with_seed(7);
        let result =
            pollster::block_on(decimate(&mesh, &config, Backend::DataParallel)).unwrap();
        assert_postconditions(&result, 20);
    }

    #[test]
    fn test_sequential_backend_dispatch() {
        let mesh = make_strip_soup(40);
        let config = DecimationConfig::new(0.5);
        let result =
            pollster::block_on(decimate(&mesh, &config, Backend::Sequential)).unwrap();
        assert_postconditions(&result, 20);
    }

    #[test]
    fn test_precondition_checked_before_any_backend_work() {
        let mesh = make_strip_soup(10);
        let config = DecimationConfig::new(0.2);
        let result = pollster::block_on(decimate(&mesh, &config, Backend::DataParallel));
        assert!(matches!(result, Err(Error::InsufficientFaces { kept: 2 })));
    }
}
