//! Instrumentation sources for pmtrace.
//!
//! These hosts decide which instructions are reported to a tracer and when
//! the monitored program exits.

#[cfg(feature = "scripted")]
pub mod scripted;

#[cfg(feature = "workload")]
pub mod workload;
