//! Unified error type for the provider settings registry.
//!
//! Validation failures are never errors here: an invalid value is simply not
//! committed. Only persistence can fail, and only with [`Error::Io`] or
//! [`Error::Persist`]. [`Error::Decode`] stays inside the persistence layer,
//! where it is downgraded to "value absent".

use std::path::{Path, PathBuf};

/// Errors surfaced by the settings registry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a settings file (or its directory) failed.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// File or directory the operation was acting on.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The temporary file could not be moved over the target.
    #[error("Failed to replace {}: {source}", path.display())]
    Persist {
        /// Target settings file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A stored obfuscated value could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Convenience constructor for [`Error::Io`].
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for [`Error::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode(message.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
