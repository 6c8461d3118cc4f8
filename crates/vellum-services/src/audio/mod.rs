//! Playable-duration metadata extraction from raw container bytes.
//!
//! Import flows need a duration and sample rate before any decoder exists
//! for the file, and they need it without blocking the host process. The
//! dispatcher reads a bounded prefix, then tries the container parsers in
//! sequence: the chunked RIFF walker first, the MPEG frame scanner second.
//! "Not recognised" is a value, not an error, and callers fall back to a
//! default duration.

pub mod mpeg;
pub mod wave;

use std::path::Path;

use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::config::ProbeConfig;
use crate::error::IoError;

/// Duration metadata recovered from header bytes alone.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioMetadata {
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub source: MetadataSource,
}

/// Which parser produced the result, with its format-specific extras.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataSource {
    WaveHeader {
        channels: u16,
        bits_per_sample: u16,
    },
    MpegFrame {
        bitrate_kbps: u32,
        frame_count_estimate: u64,
    },
}

/// Probe a file for duration metadata, reading at most the default prefix.
///
/// `Ok(None)` means no parser recognised the bytes; I/O failures (missing
/// file, permission denial) surface as `Err` with a tagged kind.
pub async fn extract_audio_metadata(path: &Path) -> Result<Option<AudioMetadata>, IoError> {
    extract_audio_metadata_with(path, &ProbeConfig::default()).await
}

/// Probe with an explicit prefix bound.
pub async fn extract_audio_metadata_with(
    path: &Path,
    probe: &ProbeConfig,
) -> Result<Option<AudioMetadata>, IoError> {
    let (prefix, file_size) = read_prefix(path, probe.prefix_bytes()).await?;

    if let Some(info) = wave::parse(&prefix) {
        return Ok(Some(AudioMetadata {
            duration_secs: info.duration_secs,
            sample_rate: info.sample_rate,
            source: MetadataSource::WaveHeader {
                channels: info.channels,
                bits_per_sample: info.bits_per_sample,
            },
        }));
    }

    if let Some(info) = mpeg::parse(&prefix, file_size) {
        return Ok(Some(AudioMetadata {
            duration_secs: info.duration_secs,
            sample_rate: info.sample_rate,
            source: MetadataSource::MpegFrame {
                bitrate_kbps: info.bitrate_kbps,
                frame_count_estimate: info.frame_count_estimate,
            },
        }));
    }

    debug!("no parser recognised {}", path.display());
    Ok(None)
}

/// Read up to `limit` bytes plus the total file size. The handle lives only
/// inside this scope, so it is released on every exit path.
async fn read_prefix(path: &Path, limit: u64) -> Result<(Vec<u8>, u64), IoError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| IoError::new(path, e))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| IoError::new(path, e))?
        .len();

    let mut prefix = Vec::with_capacity(file_size.min(limit) as usize);
    file.take(limit)
        .read_to_end(&mut prefix)
        .await
        .map_err(|e| IoError::new(path, e))?;

    Ok((prefix, file_size))
}
