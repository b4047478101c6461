use core::fmt;

/// Represents errors that can occur when configuring or growing a table.
///
/// Lookup and removal misses are not errors; they are reported as `None` (or
/// `false`) by the operations themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The requested load factor does not lie strictly between 0 and 1.
    InvalidLoadFactor(f32),

    /// A slot array could not be allocated.
    ///
    /// The table that reported this is unchanged and still valid; the failed
    /// operation can be retried once memory is available.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLoadFactor(requested) => {
                write!(f, "load factor {requested} is not in (0, 1)")
            }
            Error::OutOfMemory => write!(f, "slot array allocation failed"),
        }
    }
}

impl core::error::Error for Error {}

/// Table result.
pub type Result<T> = core::result::Result<T, Error>;
