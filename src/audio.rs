use std::path::{Path, PathBuf};

use anyhow::Context;
use hound::WavReader;
use tracing::{debug, warn};

pub fn wav_duration_seconds(path: &Path) -> anyhow::Result<f64> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV '{}'", path.display()))?;
    let spec = reader.spec();
    let samples = reader.len();
    let frames = samples as f64 / spec.channels as f64;
    let duration = frames / spec.sample_rate as f64;
    Ok(duration)
}

pub fn part_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("part_{:03}.wav", index))
}

/// Narration length of each chunk, read from `part_NNN.wav` files in `dir`.
///
/// Missing or unreadable parts come back as `None`.
pub fn chunk_durations(dir: &Path, count: usize) -> Vec<Option<f64>> {
    (0..count)
        .map(|i| {
            let path = part_path(dir, i);
            if !path.exists() {
                warn!("No narration for chunk {} ({})", i, path.display());
                return None;
            }
            match wav_duration_seconds(&path) {
                Ok(dur) => {
                    debug!("Chunk {} duration: {:.2} seconds", i, dur);
                    Some(dur)
                }
                Err(e) => {
                    warn!("Could not read narration for chunk {}: {:#}", i, e);
                    None
                }
            }
        })
        .collect()
}
