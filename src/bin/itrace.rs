//! Records the physical address of every instruction executed by a
//! monitored workload.

use std::{fs::File, io::BufWriter, path::PathBuf};

use clap::Parser;
use pmtrace::{
    InstructionTracer,
    cli::{self, WorkloadArgs},
};

/// Instruction-pointer tracer.
#[derive(Parser)]
struct Cmdline {
    /// Path of the trace file.
    #[arg(
        short,
        long,
        default_value = InstructionTracer::<File, BufWriter<File>>::DEFAULT_OUTPUT
    )]
    output: PathBuf,

    #[command(flatten)]
    workload: WorkloadArgs,
}

fn main() {
    cli::init_tracing();

    let Cmdline { output, workload } = Cmdline::parse();
    let exit_code = cli::run(&output, workload, InstructionTracer::new);

    std::process::exit(exit_code);
}
