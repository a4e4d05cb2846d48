//! Shared plumbing of the `dtrace` and `itrace` tools.

use std::{
    fs::File,
    io::{self, BufWriter},
    path::Path,
    sync::{Arc, atomic::AtomicBool},
};

use pmtrace_core::{
    AddressTranslator, TraceError, TraceHandler, TraceOutput, TraceRecorder, TraceSession,
};
use pmtrace_driver_procfs::ProcfsDriver;
use pmtrace_utils::workload::{Workload, WorkloadConfig, WorkloadSource};
use tracing_subscriber::EnvFilter;

/// Exit code used when tracing cannot start.
pub const EXIT_STARTUP_FAILURE: i32 = -1;

/// Exit code used when the session fails after tracing has started.
pub const EXIT_SESSION_FAILURE: i32 = 1;

/// Arguments of the in-process workload host.
#[derive(clap::Args, Debug, Clone)]
pub struct WorkloadArgs {
    /// Memory access pattern (sequential, strided or copy).
    #[arg(long, default_value = "sequential")]
    pub workload: Workload,

    /// Size of the buffer of each thread in bytes.
    #[arg(long, default_value_t = 64 * 1024)]
    pub size: usize,

    /// Distance between loads of the strided workload in bytes.
    #[arg(long, default_value_t = 4096)]
    pub stride: usize,

    /// Number of passes over the buffer.
    #[arg(long, default_value_t = 1)]
    pub passes: usize,

    /// Number of threads running the workload.
    #[arg(long, default_value_t = 1)]
    pub threads: usize,
}

impl From<WorkloadArgs> for WorkloadConfig {
    fn from(value: WorkloadArgs) -> Self {
        Self {
            workload: value.workload,
            size: value.size,
            stride: value.stride,
            passes: value.passes,
            threads: value.threads,
        }
    }
}

/// Installs the `tracing` subscriber.
///
/// The filter is taken from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Registers a flag raised by SIGHUP, SIGINT and SIGTERM.
pub fn terminate_flag() -> Result<Arc<AtomicBool>, io::Error> {
    let terminate_flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGHUP, terminate_flag.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, terminate_flag.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, terminate_flag.clone())?;
    Ok(terminate_flag)
}

/// Translator over the pagemap of this process.
pub type ProcfsTranslator = AddressTranslator<File>;

/// Buffered recorder writing the trace file.
pub type FileRecorder = TraceRecorder<BufWriter<File>>;

/// Opens the pagemap of this process and creates the trace file at `output`.
pub fn open(output: &Path) -> Result<(ProcfsTranslator, FileRecorder), TraceError> {
    let translator = ProcfsDriver::new()?.open_translator()?;
    let recorder = TraceRecorder::create(output)?;

    tracing::info!(
        output = %output.display(),
        page_size = translator.page_size(),
        "tracing started"
    );

    Ok((translator, recorder))
}

/// Runs a tracing session over the workload host and returns the process
/// exit code.
///
/// `tracer` builds the tracer variant from the opened translator and
/// recorder.
pub fn run<Handler>(
    output: &Path,
    workload: WorkloadArgs,
    tracer: impl FnOnce(ProcfsTranslator, FileRecorder) -> Handler,
) -> i32
where
    Handler: TraceHandler<Output = TraceOutput<BufWriter<File>>> + Sync,
{
    let (translator, recorder) = match open(output) {
        Ok(opened) => opened,
        Err(err) => {
            tracing::error!(%err, "cannot start tracing");
            return EXIT_STARTUP_FAILURE;
        }
    };

    let terminate_flag = match terminate_flag() {
        Ok(terminate_flag) => terminate_flag,
        Err(err) => {
            tracing::error!(%err, "cannot register signal handlers");
            return EXIT_STARTUP_FAILURE;
        }
    };

    let host = WorkloadSource::new(workload.into()).with_terminate_flag(terminate_flag);

    match TraceSession::new(host).handle(tracer(translator, recorder)) {
        Ok(outcome) => {
            let summary = outcome.output.summary;
            tracing::info!(
                exit_code = outcome.exit_code,
                records = summary.records,
                "tracing finished"
            );
            outcome.exit_code
        }
        Err(err) => {
            tracing::error!(%err, "tracing failed");
            EXIT_SESSION_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cmdline {
        #[command(flatten)]
        workload: WorkloadArgs,
    }

    #[test]
    fn workload_defaults() {
        let Cmdline { workload } = Cmdline::try_parse_from(["dtrace"]).unwrap();
        assert_eq!(WorkloadConfig::from(workload), WorkloadConfig::default());
    }

    #[test]
    fn workload_arguments() {
        let Cmdline { workload } = Cmdline::try_parse_from([
            "itrace",
            "--workload",
            "copy",
            "--size",
            "8192",
            "--threads",
            "4",
        ])
        .unwrap();

        let config = WorkloadConfig::from(workload);
        assert_eq!(config.workload, Workload::Copy);
        assert_eq!(config.size, 8192);
        assert_eq!(config.threads, 4);
        assert_eq!(config.passes, 1);
    }

    #[test]
    fn unknown_workload_is_rejected() {
        assert!(Cmdline::try_parse_from(["dtrace", "--workload", "random"]).is_err());
    }

    #[test]
    fn unwritable_output_fails_to_open() {
        if ProcfsDriver::new().unwrap().open_reader().is_err() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("trace.out");

        match open(&output) {
            Err(TraceError::Open { path, .. }) => assert_eq!(path, output),
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("trace file created in a missing directory"),
        }
    }
}
