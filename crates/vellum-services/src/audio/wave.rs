//! RIFF/WAVE header walker.
//!
//! Recovers sample rate, channel count, bit depth, and payload size from the
//! container chunks alone; no sample data is touched. Payload content beyond
//! these header fields is not validated.

/// Format facts read from the container header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveInfo {
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WAVE_MAGIC: &[u8; 4] = b"WAVE";
const FMT_CHUNK: &[u8; 4] = b"fmt ";
const DATA_CHUNK: &[u8; 4] = b"data";

/// RIFF magic + file size + WAVE magic.
const HEADER_LEN: usize = 12;
/// Channels through bits-per-sample live in the first 16 fmt bytes.
const FMT_MIN_LEN: usize = 16;

/// Parse a byte buffer holding at least the container header.
/// Returns `None` when the buffer is not this format or describes a
/// degenerate stream (zero rate, zero channels, empty payload).
pub fn parse(bytes: &[u8]) -> Option<WaveInfo> {
    if bytes.len() < HEADER_LEN {
        return None;
    }
    if &bytes[0..4] != RIFF_MAGIC || &bytes[8..12] != WAVE_MAGIC {
        return None;
    }

    let mut channels: u16 = 0;
    let mut sample_rate: u32 = 0;
    let mut bits_per_sample: u16 = 0;
    let mut data_len: Option<u32> = None;

    let mut pos = HEADER_LEN;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes([
            bytes[pos + 4],
            bytes[pos + 5],
            bytes[pos + 6],
            bytes[pos + 7],
        ]) as usize;
        let payload = pos + 8;

        if id == FMT_CHUNK {
            if payload + FMT_MIN_LEN > bytes.len() {
                // truncated descriptor; stop walking
                break;
            }
            channels = u16::from_le_bytes([bytes[payload + 2], bytes[payload + 3]]);
            sample_rate = u32::from_le_bytes([
                bytes[payload + 4],
                bytes[payload + 5],
                bytes[payload + 6],
                bytes[payload + 7],
            ]);
            bits_per_sample = u16::from_le_bytes([bytes[payload + 14], bytes[payload + 15]]);
        } else if id == DATA_CHUNK {
            // sample data follows; the declared size is all we need
            data_len = Some(size as u32);
            break;
        }

        // chunks are word-aligned: an odd payload carries one pad byte
        pos = payload + size + (size & 1);
    }

    let data_len = data_len?;
    let bytes_per_sec = sample_rate as f64 * channels as f64 * (bits_per_sample as f64 / 8.0);
    if bytes_per_sec <= 0.0 {
        return None;
    }
    let duration_secs = data_len as f64 / bytes_per_sec;
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return None;
    }

    Some(WaveInfo {
        duration_secs,
        sample_rate,
        channels,
        bits_per_sample,
        data_len,
    })
}
