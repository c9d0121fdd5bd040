//! Error types for archive detection, extraction and compression.

use std::path::PathBuf;
use thiserror::Error;

use crate::formats::ArchiveFormat;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Boxed codec error carried by [`ArchiveError::Open`].
pub type CodecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of an [`ArchiveError`].
///
/// `Format` wrappers added by the dispatcher are transparent here: the kind
/// of a wrapped error is the kind of the error it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The codec could not parse the archive.
    Open,
    /// An entry would resolve outside the destination root.
    PathTraversal,
    /// No format signature matched.
    UnsupportedFormat,
    /// Filesystem or stream failure.
    Io,
    /// The cancellation token was triggered.
    Cancelled,
    /// Broken internal contract.
    Internal,
}

/// Errors that can occur while extracting or packing archives.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The archive could not be opened or parsed by its codec.
    #[error("failed to open {format} archive {path}: {source}")]
    Open {
        /// Format the archive was opened as.
        format: ArchiveFormat,
        /// Path of the archive.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: CodecError,
    },

    /// An entry name resolved outside the destination root.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The joined path that escaped the destination.
        path: PathBuf,
    },

    /// The source file matched none of the known signatures.
    #[error("archive is not in a supported format: {path}")]
    UnsupportedFormat {
        /// The source path.
        path: PathBuf,
    },

    /// Directory creation, file creation or copy failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being done, including the offending path or entry.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The operation observed a triggered cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// An adapter error, tagged with the format being extracted.
    #[error("error extracting {format}: {source}")]
    Format {
        /// Format selected by the dispatcher.
        format: ArchiveFormat,
        /// The adapter's error.
        #[source]
        source: Box<ArchiveError>,
    },

    /// An internal contract was broken.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ArchiveError {
    /// Returns the kind of this error, looking through `Format` wrappers.
    ///
    /// # Examples
    ///
    /// ```
    /// use intake_core::ArchiveError;
    /// use intake_core::ArchiveFormat;
    /// use intake_core::ErrorKind;
    /// use std::path::PathBuf;
    ///
    /// let inner = ArchiveError::PathTraversal {
    ///     path: PathBuf::from("/etc/passwd"),
    /// };
    /// let err = ArchiveError::Format {
    ///     format: ArchiveFormat::Zip,
    ///     source: Box::new(inner),
    /// };
    /// assert_eq!(err.kind(), ErrorKind::PathTraversal);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { .. } => ErrorKind::Open,
            Self::PathTraversal { .. } => ErrorKind::PathTraversal,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::Io { .. } => ErrorKind::Io,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Format { source, .. } => source.kind(),
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if this error represents an escape attempt.
    #[must_use]
    pub fn is_security_violation(&self) -> bool {
        self.kind() == ErrorKind::PathTraversal
    }

    /// Returns `true` if the operation stopped because it was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Returns the innermost error, skipping `Format` wrappers.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Format { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn open(
        format: ArchiveFormat,
        path: &std::path::Path,
        source: impl Into<CodecError>,
    ) -> Self {
        Self::Open {
            format,
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Attaches context to I/O results, producing [`ArchiveError::Io`].
pub trait IoContext<T> {
    /// Wraps the error with the context produced by `f`.
    fn io_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| ArchiveError::io(f(), source))
    }
}
