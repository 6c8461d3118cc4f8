//! Typed failure taxonomy for the integrity services.
//!
//! Every I/O failure is tagged with a kind at the point it occurs, derived
//! from the OS error code. Callers branch on `IoErrorKind`, never on message
//! text. Unrecognised formats and invalid autosave content are values, not
//! errors; only real I/O failures travel through these types.

use std::path::PathBuf;
use thiserror::Error;

/// Classified I/O failure causes surfaced to the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IoErrorKind {
    #[error("permission denied")]
    Permission,
    #[error("not found")]
    NotFound,
    #[error("disk full")]
    DiskFull,
    #[error("resource busy")]
    Busy,
    #[error("path too long")]
    PathTooLong,
    #[error("timed out")]
    Timeout,
    #[error("i/o error")]
    Other,
}

/// An I/O failure bound to the path it occurred on.
#[derive(Debug, Error)]
#[error("{kind}: {}", .path.display())]
pub struct IoError {
    pub kind: IoErrorKind,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl IoError {
    pub fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            kind: classify(&source),
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == IoErrorKind::NotFound
    }
}

/// Errors from restoring an autosave artifact on explicit user request.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// The file no longer parses as a session snapshot (it may have been
    /// modified between the startup scan and the restore).
    #[error("autosave content failed validation: {}: {reason}", .path.display())]
    InvalidContent { path: PathBuf, reason: String },
    /// There is no valid candidate for the session to restore.
    #[error("no valid autosave candidate to restore")]
    NothingToRestore,
    #[error(transparent)]
    Io(#[from] IoError),
}

fn classify(err: &std::io::Error) -> IoErrorKind {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::PermissionDenied => return IoErrorKind::Permission,
        ErrorKind::NotFound => return IoErrorKind::NotFound,
        ErrorKind::TimedOut => return IoErrorKind::Timeout,
        _ => {}
    }

    match err.raw_os_error() {
        Some(16) => IoErrorKind::Busy,     // EBUSY
        Some(28) => IoErrorKind::DiskFull, // ENOSPC
        Some(36) | Some(63) => IoErrorKind::PathTooLong, // ENAMETOOLONG (linux / bsd)
        _ => IoErrorKind::Other,
    }
}
