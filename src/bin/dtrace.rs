//! Records the physical addresses of the memory reads and writes of a
//! monitored workload.
//!
//! Set the environment variable `RUST_LOG=debug` for per-entry diagnostics.

use std::{fs::File, io::BufWriter, path::PathBuf};

use clap::Parser;
use pmtrace::{
    MemoryAccessTracer,
    cli::{self, WorkloadArgs},
};

/// Memory access tracer.
#[derive(Parser)]
struct Cmdline {
    /// Path of the trace file.
    #[arg(
        short,
        long,
        default_value = MemoryAccessTracer::<File, BufWriter<File>>::DEFAULT_OUTPUT
    )]
    output: PathBuf,

    #[command(flatten)]
    workload: WorkloadArgs,
}

fn main() {
    cli::init_tracing();

    let Cmdline { output, workload } = Cmdline::parse();
    let exit_code = cli::run(&output, workload, MemoryAccessTracer::new);

    std::process::exit(exit_code);
}
