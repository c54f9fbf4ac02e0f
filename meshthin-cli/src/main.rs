//! STL → decimated PLY pipeline
//!
//! Loads a binary STL triangle soup, decimates it to the requested
//! fraction of faces, and writes the compacted mesh as PLY. Backend
//! selection happens once at startup: `auto` probes for a GPU adapter
//! and passes the chosen backend down as configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use meshthin_decimate::{Backend, DecimationConfig, DEFAULT_SEED};
use meshthin_gpu::GpuContext;
use meshthin_io::{read_mesh, write_mesh};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    /// Probe for a GPU adapter once, fall back to the CPU if none exists
    Auto,
    /// Single-threaded CPU backend
    Cpu,
    /// GPU compute backend
    Gpu,
}

#[derive(Parser, Debug)]
#[command(name = "meshthin", about = "Decimate a binary STL mesh for fast viewing")]
struct Args {
    /// Input binary STL file
    input: PathBuf,

    /// Output PLY file (defaults to <input stem>_decimated.ply)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fraction of faces to keep, between 0.05 and 1.0
    #[arg(long, default_value_t = 0.3)]
    keep: f32,

    /// Seed for the face-selection permutation
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Execution backend
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,
}

fn resolve_backend(arg: BackendArg) -> Backend {
    match arg {
        BackendArg::Cpu => Backend::Sequential,
        BackendArg::Gpu => Backend::DataParallel,
        BackendArg::Auto => match pollster::block_on(GpuContext::new()) {
            Ok(ctx) => {
                log::info!("GPU detected: {}", ctx.adapter_summary());
                Backend::DataParallel
            }
            Err(err) => {
                log::info!("no GPU available ({}); using sequential backend", err);
                Backend::Sequential
            }
        },
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let backend = resolve_backend(args.backend);

    let mesh = read_mesh(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    log::info!(
        "loaded {}: {} faces, {} corner vertices",
        args.input.display(),
        mesh.face_count(),
        mesh.vertex_count()
    );

    let config = DecimationConfig::new(args.keep).with_seed(args.seed);
    let decimated = pollster::block_on(meshthin_gpu::decimate(&mesh, &config, backend))
        .context("decimation failed")?;
    log::info!(
        "decimated to {} faces, {} vertices",
        decimated.face_count(),
        decimated.vertex_count()
    );

    let output = args.output.unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mesh".to_string());
        args.input.with_file_name(format!("{}_decimated.ply", stem))
    });
    write_mesh(&decimated, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("wrote {}", output.display());

    Ok(())
}
