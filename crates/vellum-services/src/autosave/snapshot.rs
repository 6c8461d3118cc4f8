//! The structured snapshot envelope written by the autosave loop and
//! validated by the recovery scan.
//!
//! The envelope is JSON; the `document` payload inside it belongs to the
//! host's scene serializer and stays opaque here. Structural validity means
//! the envelope parses, the format version is known, and a document is
//! actually present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Current envelope revision. Older revisions stay readable; anything newer
/// than this was written by a future build and is treated as corrupt.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,
    pub project_name: String,
    #[serde(default)]
    pub project_path: Option<PathBuf>,
    /// Scene/timeline payload owned by the host serializer.
    pub document: Value,
}

impl SessionSnapshot {
    pub fn new(project_name: impl Into<String>, project_path: Option<PathBuf>, document: Value) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            saved_at: Utc::now(),
            project_name: project_name.into(),
            project_path,
            document,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Why a byte buffer failed structural validation.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("not a valid snapshot envelope: {0}")]
    Malformed(String),
    #[error("unsupported snapshot format version {0}")]
    UnsupportedVersion(u32),
    #[error("snapshot document payload is missing")]
    EmptyDocument,
}

/// Validate a candidate's content. Failures classify the candidate as
/// corrupted; they are never fatal to a scan.
pub fn validate(bytes: &[u8]) -> Result<SessionSnapshot, SnapshotError> {
    let snapshot: SessionSnapshot =
        serde_json::from_slice(bytes).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
    if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.format_version));
    }
    if snapshot.document.is_null() {
        return Err(SnapshotError::EmptyDocument);
    }
    Ok(snapshot)
}

/// Collaborator that captures the live editing session as a snapshot.
/// Implemented by the host's document layer; the scheduler only calls it.
pub trait SnapshotProvider: Send + Sync {
    fn snapshot(&self) -> anyhow::Result<SessionSnapshot>;
}
