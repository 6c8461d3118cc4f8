//! Best-effort candidate scan across the fixed autosave directories.
//!
//! The scan prefers partial results over total failure: a directory that
//! cannot be listed lands in the failure list and the remaining directories
//! are still scanned. A candidate whose content does not validate is kept
//! and classified corrupted rather than dropped, so the recovery UI reports
//! corruption instead of silently pretending nothing was found.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{snapshot, AUTOSAVE_SUFFIX};
use crate::error::IoError;

/// Filesystem snapshot of one matching file at scan time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutosaveCandidate {
    pub path: PathBuf,
    pub modified_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// Whether the content parsed as a session snapshot at scan time.
    pub valid: bool,
}

/// A directory the scan could not list.
#[derive(Debug)]
pub struct ScanFailure {
    pub dir: PathBuf,
    pub error: IoError,
}

/// Successes and per-source failures of one scan pass.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub candidates: Vec<AutosaveCandidate>,
    pub failures: Vec<ScanFailure>,
}

/// Scan the given directories (non-recursively) for autosave artifacts.
/// Duplicate directory entries are scanned once.
pub async fn scan_directories(dirs: &[PathBuf]) -> ScanReport {
    let mut report = ScanReport::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for dir in dirs {
        if !seen.insert(dir.clone()) {
            continue;
        }
        if let Err(error) = scan_dir(dir, &mut report.candidates).await {
            warn!("autosave scan skipped {}: {}", dir.display(), error);
            report.failures.push(ScanFailure {
                dir: dir.clone(),
                error,
            });
        }
    }

    debug!(
        "autosave scan: {} candidate(s), {} unreadable directorie(s)",
        report.candidates.len(),
        report.failures.len()
    );
    report
}

async fn scan_dir(dir: &Path, out: &mut Vec<AutosaveCandidate>) -> Result<(), IoError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| IoError::new(dir, e))?;

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => return Err(IoError::new(dir, e)),
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.ends_with(AUTOSAVE_SUFFIX) {
            continue;
        }

        let path = entry.path();
        let meta = match entry.metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                // stat failure on one entry never fails the directory
                debug!("could not stat {}: {}", path.display(), e);
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }

        let modified_at = match meta.modified() {
            Ok(time) => DateTime::<Utc>::from(time),
            Err(e) => {
                debug!("no modification time for {}: {}", path.display(), e);
                continue;
            }
        };

        let valid = match tokio::fs::read(&path).await {
            Ok(bytes) => match snapshot::validate(&bytes) {
                Ok(_) => true,
                Err(err) => {
                    debug!("corrupted autosave {}: {}", path.display(), err);
                    false
                }
            },
            // unreadable content classifies as corrupted, same as unparseable
            Err(e) => {
                debug!("unreadable autosave {}: {}", path.display(), e);
                false
            }
        };

        out.push(AutosaveCandidate {
            path,
            modified_at,
            size_bytes: meta.len(),
            valid,
        });
    }

    Ok(())
}
