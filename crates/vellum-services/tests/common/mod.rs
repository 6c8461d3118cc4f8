//! Shared fixture builders for the integration tests.
#![allow(dead_code)] // not every test binary uses every builder

use std::path::{Path, PathBuf};

use serde_json::json;
use vellum_services::SessionSnapshot;

/// Minimal RIFF/WAVE header with the given format fields.
pub fn wave_bytes(channels: u16, sample_rate: u32, bits_per_sample: u16, data_len: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // pcm
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    let byte_rate = sample_rate * channels as u32 * bits_per_sample as u32 / 8;
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&(channels * bits_per_sample / 8).to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out
}

/// An MPEG1 Layer III 128 kbps frame header followed by `padding` zero bytes.
pub fn mpeg_bytes(padding: usize) -> Vec<u8> {
    let mut out = vec![0xFF, 0xFB, 0x90, 0x00];
    out.resize(out.len() + padding, 0);
    out
}

/// Write a structurally valid autosave snapshot and return its path.
pub fn write_valid_autosave(dir: &Path, name: &str) -> PathBuf {
    let snapshot = SessionSnapshot::new(
        "storyboard",
        None,
        json!({"scenes": [{"id": "s1", "strokes": 3}]}),
    );
    let path = dir.join(name);
    std::fs::write(&path, snapshot.to_json().unwrap()).unwrap();
    path
}

/// Write a file that matches the naming convention but fails validation.
pub fn write_corrupted_autosave(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"{ truncated mid-wr").unwrap();
    path
}

/// Let the filesystem clock advance so modification times order reliably.
pub fn mtime_gap() {
    std::thread::sleep(std::time::Duration::from_millis(20));
}
