//! Recovery session control: one bounded pass from startup scan to user
//! resolution.
//!
//! The session is created at startup, checks the fixed directories once, and
//! is resolved exactly once, either by restoring the chosen candidate or by
//! discarding. Restore re-validates content at restore time, so a file
//! modified between scan and restore surfaces as invalid content rather than
//! handing corrupt data to the editor.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::scan::{self, AutosaveCandidate, ScanReport};
use super::snapshot::{self, SessionSnapshot};
use crate::error::{IoError, RestoreError};
use crate::platform;

/// Cap on how many candidates a summary lists for the UI.
pub const MAX_LISTED_CANDIDATES: usize = 10;

/// Aggregate outcome of a startup scan, surfaced to the recovery dialog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecoverySummary {
    /// True when at least one structurally valid candidate exists.
    pub found: bool,
    /// Most recently modified valid candidate; never a corrupted one.
    pub chosen_path: Option<PathBuf>,
    pub modified_at: Option<DateTime<Utc>>,
    /// Count of valid candidates.
    pub candidate_count: u32,
    pub corrupted_count: u32,
    /// Most recent first, capped at [`MAX_LISTED_CANDIDATES`].
    pub candidates: Vec<AutosaveCandidate>,
}

/// How a checked session looks to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    NotFound,
    FoundValid,
    /// Only corrupted artifacts exist: surface a notice, then proceed as if
    /// nothing was found.
    FoundCorruptedOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Restored,
    Discarded,
}

/// Collapse a scan report into the summary the UI consumes.
pub fn summarize(report: ScanReport) -> RecoverySummary {
    let mut candidates = report.candidates;
    candidates.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));

    let candidate_count = candidates.iter().filter(|c| c.valid).count() as u32;
    let corrupted_count = candidates.len() as u32 - candidate_count;
    let chosen = candidates.iter().find(|c| c.valid);
    let chosen_path = chosen.map(|c| c.path.clone());
    let modified_at = chosen.map(|c| c.modified_at);

    candidates.truncate(MAX_LISTED_CANDIDATES);

    RecoverySummary {
        found: chosen_path.is_some(),
        chosen_path,
        modified_at,
        candidate_count,
        corrupted_count,
        candidates,
    }
}

/// Scan the fixed directory set and summarize.
pub async fn check_autosave_candidates() -> RecoverySummary {
    let dirs = platform::autosave_scan_dirs();
    summarize(scan::scan_directories(&dirs).await)
}

/// Re-read and re-validate an autosave artifact on explicit user request.
pub async fn restore_autosave(path: &Path) -> Result<SessionSnapshot, RestoreError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| IoError::new(path, e))?;

    match snapshot::validate(&bytes) {
        Ok(snapshot) => {
            info!("restored autosave from {}", path.display());
            Ok(snapshot)
        }
        Err(err) => {
            warn!("autosave at {} no longer validates: {}", path.display(), err);
            Err(RestoreError::InvalidContent {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
        }
    }
}

/// Delete one artifact. Deleting a path that is already absent succeeds
/// and reports `Ok(false)`.
pub async fn discard_autosave(path: &Path) -> Result<bool, IoError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(IoError::new(path, e)),
    }
}

/// Result of a best-effort multi-delete.
#[derive(Debug, Default)]
pub struct DiscardReport {
    /// Files actually deleted (already-absent paths are not counted).
    pub removed: u32,
    pub failed: Vec<(PathBuf, IoError)>,
}

impl DiscardReport {
    pub fn all_removed(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delete many artifacts, continuing past individual failures.
pub async fn discard_autosave_many(paths: &[PathBuf]) -> DiscardReport {
    let mut report = DiscardReport::default();
    for path in paths {
        match discard_autosave(path).await {
            Ok(true) => report.removed += 1,
            Ok(false) => {}
            Err(error) => {
                warn!("could not discard {}: {}", path.display(), error);
                report.failed.push((path.clone(), error));
            }
        }
    }
    report
}

/// One recovery pass: `Unchecked -> Checked -> Resolved`.
#[derive(Debug)]
pub struct RecoverySession {
    scan_dirs: Vec<PathBuf>,
    summary: Option<RecoverySummary>,
    resolution: Option<Resolution>,
}

impl RecoverySession {
    /// Session over the fixed platform directory set.
    pub fn new() -> Self {
        Self::with_dirs(platform::autosave_scan_dirs())
    }

    /// Session over an explicit directory set.
    pub fn with_dirs(scan_dirs: Vec<PathBuf>) -> Self {
        Self {
            scan_dirs,
            summary: None,
            resolution: None,
        }
    }

    /// Run the startup scan. Idempotent: later calls return the cached
    /// summary without touching the filesystem again.
    pub async fn check(&mut self) -> &RecoverySummary {
        if self.summary.is_none() {
            let summary = summarize(scan::scan_directories(&self.scan_dirs).await);
            info!(
                "recovery check: {} valid, {} corrupted",
                summary.candidate_count, summary.corrupted_count
            );
            self.summary = Some(summary);
        }
        self.summary.as_ref().unwrap()
    }

    pub fn outcome(&self) -> Option<CheckOutcome> {
        self.summary.as_ref().map(|s| {
            if s.found {
                CheckOutcome::FoundValid
            } else if s.corrupted_count > 0 {
                CheckOutcome::FoundCorruptedOnly
            } else {
                CheckOutcome::NotFound
            }
        })
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Restore the chosen candidate and resolve the session.
    pub async fn restore(&mut self) -> Result<SessionSnapshot, RestoreError> {
        let chosen = self
            .summary
            .as_ref()
            .and_then(|s| s.chosen_path.clone())
            .ok_or(RestoreError::NothingToRestore)?;
        let snapshot = restore_autosave(&chosen).await?;
        self.resolution = Some(Resolution::Restored);
        Ok(snapshot)
    }

    /// Discard every listed candidate and resolve the session.
    pub async fn discard_all(&mut self) -> DiscardReport {
        let paths: Vec<PathBuf> = self
            .summary
            .as_ref()
            .map(|s| s.candidates.iter().map(|c| c.path.clone()).collect())
            .unwrap_or_default();
        let report = discard_autosave_many(&paths).await;
        self.resolution = Some(Resolution::Discarded);
        report
    }
}

impl Default for RecoverySession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(path: &str, minute: u32, valid: bool) -> AutosaveCandidate {
        AutosaveCandidate {
            path: PathBuf::from(path),
            modified_at: Utc.with_ymd_and_hms(2026, 8, 6, 12, minute, 0).unwrap(),
            size_bytes: 64,
            valid,
        }
    }

    #[test]
    fn test_chosen_is_most_recent_valid() {
        let report = ScanReport {
            candidates: vec![
                candidate("/a.autosave", 5, true),
                candidate("/b.autosave", 30, false), // newest overall, corrupted
                candidate("/c.autosave", 20, true),
            ],
            failures: Vec::new(),
        };
        let summary = summarize(report);
        assert!(summary.found);
        assert_eq!(summary.chosen_path, Some(PathBuf::from("/c.autosave")));
        assert_eq!(summary.candidate_count, 2);
        assert_eq!(summary.corrupted_count, 1);
        // list is most recent first
        assert_eq!(summary.candidates[0].path, PathBuf::from("/b.autosave"));
    }

    #[test]
    fn test_corrupted_only_is_not_found() {
        let report = ScanReport {
            candidates: vec![candidate("/x.autosave", 1, false)],
            failures: Vec::new(),
        };
        let summary = summarize(report);
        assert!(!summary.found);
        assert!(summary.chosen_path.is_none());
        assert_eq!(summary.corrupted_count, 1);
    }

    #[test]
    fn test_empty_scan() {
        let summary = summarize(ScanReport::default());
        assert!(!summary.found);
        assert_eq!(summary.candidate_count, 0);
        assert_eq!(summary.corrupted_count, 0);
        assert!(summary.candidates.is_empty());
    }

    #[test]
    fn test_listing_is_capped() {
        let report = ScanReport {
            candidates: (0..25)
                .map(|i| candidate(&format!("/{i}.autosave"), i % 60, true))
                .collect(),
            failures: Vec::new(),
        };
        let summary = summarize(report);
        assert_eq!(summary.candidates.len(), MAX_LISTED_CANDIDATES);
        assert_eq!(summary.candidate_count, 25);
    }
}
