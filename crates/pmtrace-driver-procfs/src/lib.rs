//! Linux procfs pagemap backend.
//!
//! Locates `/proc/<pid>/pagemap` and queries the host page size, which is
//! constant for the lifetime of a process.

mod driver;
mod error;

pub use self::{
    driver::{ProcfsDriver, SELF_PAGEMAP, page_size},
    error::Error,
};
