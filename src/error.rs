//! Error types for the circuit breaker library.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Result type for configuration construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Error raised when a [`Config`](crate::Config) fails validation.
///
/// This is the only error the core can produce, and it is raised
/// synchronously at build time. Every other operation in the library is
/// total: missing buckets read as zero, the error percentage of zero
/// requests is zero, and no failure path exists during normal operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The bucket size is zero; the window cannot be divided into
    /// zero-length buckets.
    BucketSizeZero,

    /// The bucket size is not strictly smaller than the window size.
    BucketExceedsWindow {
        /// Configured bucket size in seconds.
        bucket_size_in_seconds: u64,
        /// Configured window size in seconds.
        window_size_in_seconds: u64,
    },

    /// The window size is not evenly divisible by the bucket size.
    WindowNotDivisible {
        /// Configured bucket size in seconds.
        bucket_size_in_seconds: u64,
        /// Configured window size in seconds.
        window_size_in_seconds: u64,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BucketSizeZero => {
                write!(f, "bucket_size_in_seconds must be greater than zero")
            }
            ConfigError::BucketExceedsWindow {
                bucket_size_in_seconds,
                window_size_in_seconds,
            } => write!(
                f,
                "bucket_size_in_seconds ({}) must be strictly smaller than window_size_in_seconds ({})",
                bucket_size_in_seconds, window_size_in_seconds
            ),
            ConfigError::WindowNotDivisible {
                bucket_size_in_seconds,
                window_size_in_seconds,
            } => write!(
                f,
                "window_size_in_seconds ({}) must be evenly divisible by bucket_size_in_seconds ({})",
                window_size_in_seconds, bucket_size_in_seconds
            ),
        }
    }
}

impl Error for ConfigError {}
