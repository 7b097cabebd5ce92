use serde::Serialize;
use tracing::warn;

/// Seconds per word used when a chunk has no narration to measure.
pub const FALLBACK_SECONDS_PER_WORD: f64 = 0.4;

/// When a chunk's image is on screen, in seconds from the start of narration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Lays chunks back to back, each for the length of its narration.
pub fn display_windows(chunks: &[String], durations: &[Option<f64>]) -> Vec<Window> {
    let mut t = 0.0_f64;
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let dur = match durations.get(i).copied().flatten() {
                Some(d) if d.is_finite() && d >= 0.0 => d,
                _ => {
                    let estimate = chunk.split_whitespace().count() as f64 * FALLBACK_SECONDS_PER_WORD;
                    warn!("Estimating {:.2}s for chunk {} without narration", estimate, i);
                    estimate
                }
            };
            let window = Window { start: t, end: t + dur };
            t = window.end;
            window
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_are_contiguous() {
        let chunks = vec!["a b".to_string(), "c".to_string(), "d e f".to_string()];
        let windows = display_windows(&chunks, &[Some(2.3), Some(1.0), Some(0.7)]);
        assert_eq!(windows[0], Window { start: 0.0, end: 2.3 });
        assert_eq!(windows[1].start, windows[0].end);
        assert_eq!(windows[2].start, windows[1].end);
        assert!((windows[2].end - 4.0).abs() < 1e-9);
    }

    #[test]
    fn missing_durations_are_estimated_from_words() {
        let chunks = vec!["one two three".to_string(), "four".to_string()];
        let windows = display_windows(&chunks, &[None]);
        assert!((windows[0].duration() - 1.2).abs() < 1e-9);
        assert!((windows[1].duration() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn bad_durations_are_estimated() {
        let chunks = vec!["x".to_string()];
        let windows = display_windows(&chunks, &[Some(f64::NAN)]);
        assert!((windows[0].duration() - 0.4).abs() < 1e-9);
    }
}
