// src/error.rs

use thiserror::Error;

/// Core error types for debindex
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unreadable package archive
    #[error("Archive error: {0}")]
    ArchiveError(String),

    /// The .deb has no control.tar.* member
    #[error("No control.tar.* found in {0}")]
    MissingControlMember(String),

    /// The control tarball has no control file
    #[error("control file not found inside {0}")]
    MissingControlFile(String),

    /// Compression or decompression failure
    #[error("Compression error: {0}")]
    CompressionError(String),

    /// Malformed index or manifest content
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Package directory is absent
    #[error("Missing debs directory at {0}")]
    MissingDebsDir(String),

    /// Packages index is absent
    #[error("Packages file not found at {0}")]
    PackagesNotFound(String),

    /// Release manifest is absent
    #[error("Release file not found at {0}")]
    ReleaseNotFound(String),
}

/// Result type alias using debindex's Error type
pub type Result<T> = std::result::Result<T, Error>;
