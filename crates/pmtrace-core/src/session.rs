use crate::{InstrumentationSource, TraceError, TraceHandler};

/// Result of a completed tracing session.
#[derive(Debug)]
pub struct TraceOutcome<Output> {
    /// Exit code of the monitored program.
    pub exit_code: i32,

    /// Output of the finalized handler.
    pub output: Output,
}

/// A tracing session.
///
/// The session connects an [`InstrumentationSource`] to a [`TraceHandler`]
/// for the lifetime of the monitored program.
pub struct TraceSession<Host>
where
    Host: InstrumentationSource,
{
    host: Host,
}

impl<Host> TraceSession<Host>
where
    Host: InstrumentationSource,
{
    /// Creates a new tracing session.
    pub fn new(host: Host) -> Self {
        Self { host }
    }

    /// Returns the instrumentation source.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Runs the monitored program, feeding every executed instruction to
    /// `handler`.
    ///
    /// The handler is finalized exactly once when the program exits, even if
    /// the instrumentation source fails. In that case the source error is
    /// returned after the trace has been flushed.
    pub fn handle<Handler>(
        mut self,
        handler: Handler,
    ) -> Result<TraceOutcome<Handler::Output>, TraceError>
    where
        Handler: TraceHandler + Sync,
    {
        tracing::debug!("starting instrumentation");
        let result = self.host.run(|event| handler.handle_instruction(event));

        match &result {
            Ok(exit_code) => tracing::debug!(exit_code, "program exited"),
            Err(err) => tracing::error!(%err, "instrumentation failed"),
        }

        let output = handler.finalize()?;

        Ok(TraceOutcome {
            exit_code: result?,
            output,
        })
    }
}
