/// Error type for the procfs driver.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The page size could not be queried.
    #[error("Cannot query the page size: {0}")]
    PageSize(std::io::Error),
}

impl From<Error> for pmtrace_core::TraceError {
    fn from(value: Error) -> Self {
        match value {
            Error::PageSize(value) => Self::Source(Box::new(value)),
        }
    }
}
