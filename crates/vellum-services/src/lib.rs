//! Data integrity services for the Vellum host process: decoder-free audio
//! duration probing, crash-time autosave detection and recovery, and the
//! scheduled autosave loop.
//!
//! Everything here runs on the host's tokio runtime and degrades gracefully
//! on malformed input: unrecognised audio bytes and corrupted autosave
//! artifacts become values the UI can act on, never propagated failures.

pub mod audio;
pub mod autosave;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;

pub use audio::{extract_audio_metadata, AudioMetadata, MetadataSource};
pub use autosave::recovery::{
    check_autosave_candidates, discard_autosave, discard_autosave_many, restore_autosave,
    CheckOutcome, DiscardReport, RecoverySession, RecoverySummary, Resolution,
};
pub use autosave::scan::{AutosaveCandidate, ScanReport};
pub use autosave::scheduler::{AutosaveScheduler, FsSink, SchedulerState, SnapshotSink};
pub use autosave::snapshot::{SessionSnapshot, SnapshotProvider};
pub use config::Config;
pub use error::{IoError, IoErrorKind, RestoreError};
