//! Error types for mcubes-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a volume from a typed-array container.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The preamble, header length, or dictionary failed to parse.
    #[error("malformed container '{path}': {reason}")]
    Format {
        /// The path that was being read.
        path: PathBuf,
        /// A human-readable reason.
        reason: String,
    },

    /// The descriptor names a dtype this loader does not widen.
    #[error("unsupported dtype '{descr}' in '{path}' (expected one of f4/i2/i4/u1)")]
    UnsupportedDtype {
        /// The path that was being read.
        path: PathBuf,
        /// The offending `descr` string.
        descr: String,
    },

    /// `fortran_order` was true; only C-order arrays are supported.
    #[error("'{path}' uses Fortran order, which is not supported")]
    UnsupportedLayout {
        /// The path that was being read.
        path: PathBuf,
    },

    /// The shape was not rank 3, or rank 4 with a leading singleton axis, or the
    /// element count did not match the declared shape.
    #[error("shape error in '{path}': {reason}")]
    Shape {
        /// The path that was being read.
        path: PathBuf,
        /// A human-readable reason.
        reason: String,
    },
}

/// Errors that can occur while writing a mesh to a legacy polydata file.
#[derive(Error, Debug)]
pub enum WriteError {
    /// The output sink rejected the write.
    #[error("failed to write '{path}': {source}")]
    Io {
        /// The path that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized `Result` type for volume loading.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// A specialized `Result` type for mesh writing.
pub type WriteResult<T> = std::result::Result<T, WriteError>;
