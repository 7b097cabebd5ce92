use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;

use crate::timeline::Window;

const COMMA_PAUSE: f64 = 0.2;
const SENTENCE_END_PAUSE: f64 = 0.4;
const WORD_WEIGHT_EXPONENT: f64 = 0.75;
const SRT_LINE_WIDTH: usize = 80;

static WORD_OR_PAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w[\w'-]*)|([,.!?])").expect("valid word regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Spreads each chunk's window over its words, longer words getting more time
/// and punctuation inserting fixed pauses.
pub fn build_word_cues(chunks: &[String], windows: &[Window]) -> Vec<Cue> {
    let mut cues = Vec::new();
    for (chunk, window) in chunks.iter().zip(windows) {
        let elements: Vec<&str> = WORD_OR_PAUSE.find_iter(chunk).map(|m| m.as_str()).collect();
        if elements.is_empty() {
            if !chunk.trim().is_empty() {
                cues.push(Cue {
                    start: window.start,
                    end: window.end,
                    text: chunk.clone(),
                });
            }
            continue;
        }

        let mut total_pause_time = 0.0;
        let mut word_elements = Vec::new();
        for &element in &elements {
            match pause_after(element) {
                Some(pause) => total_pause_time += pause,
                None => word_elements.push(element),
            }
        }

        let word_time_available = (window.duration() - total_pause_time).max(0.0);
        let total_weight: f64 = word_elements.iter().map(|w| word_weight(w)).sum();

        let mut t = window.start;
        for element in elements {
            if let Some(pause) = pause_after(element) {
                t += pause;
                continue;
            }
            let word_duration = if total_weight > 0.0 {
                word_time_available * word_weight(element) / total_weight
            } else {
                0.0
            };
            // Pauses can push past the window when narration is short.
            let start = t.min(window.end);
            let end = (t + word_duration).min(window.end);
            cues.push(Cue {
                start,
                end,
                text: element.to_string(),
            });
            t += word_duration;
        }
    }
    cues
}

fn pause_after(element: &str) -> Option<f64> {
    match element {
        "," => Some(COMMA_PAUSE),
        "." | "!" | "?" => Some(SENTENCE_END_PAUSE),
        _ => None,
    }
}

fn word_weight(word: &str) -> f64 {
    (word.chars().count() as f64).powf(WORD_WEIGHT_EXPONENT)
}

pub fn write_srt(path: &Path, cues: &[Cue]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create subtitle file '{}'", path.display()))?;
    let mut f = BufWriter::new(file);
    for (i, cue) in cues.iter().enumerate() {
        writeln!(f, "{}", i + 1)?;
        writeln!(f, "{} --> {}", format_srt_time(cue.start), format_srt_time(cue.end))?;
        for line in wrap_text(&cue.text, SRT_LINE_WIDTH) {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)?;
    }
    f.flush()?;
    Ok(())
}

pub fn format_srt_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_sec = total_ms / 1000;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

fn wrap_text(s: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srt_timestamps() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(3.5), "00:00:03,500");
        assert_eq!(format_srt_time(3661.002), "01:01:01,002");
        assert_eq!(format_srt_time(-1.0), "00:00:00,000");
    }

    #[test]
    fn word_cues_fill_the_window() {
        let chunks = vec!["I flew, then fell.".to_string()];
        let windows = [Window { start: 1.0, end: 5.0 }];
        let cues = build_word_cues(&chunks, &windows);

        let words: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(words, vec!["I", "flew", "then", "fell"]);
        assert_eq!(cues[0].start, 1.0);
        // comma pause sits between "flew" and "then"
        assert!((cues[2].start - cues[1].end - COMMA_PAUSE).abs() < 1e-9);
        // the trailing period's pause is what remains after the last word
        assert!((cues[3].end - (5.0 - SENTENCE_END_PAUSE)).abs() < 1e-9);
        assert!(cues[1].end - cues[1].start > cues[0].end - cues[0].start);
    }

    #[test]
    fn cues_never_leave_the_window() {
        let chunks = vec!["a. b. c. d.".to_string()];
        let windows = [Window { start: 0.0, end: 0.5 }];
        let cues = build_word_cues(&chunks, &windows);
        assert_eq!(cues.len(), 4);
        assert!(cues.iter().all(|c| c.start <= 0.5 && c.end <= 0.5 && c.start <= c.end));
    }

    #[test]
    fn punctuation_only_chunk_is_one_cue() {
        let chunks = vec!["...".to_string(), "—".to_string()];
        let windows = [Window { start: 0.0, end: 1.0 }, Window { start: 1.0, end: 2.0 }];
        let cues = build_word_cues(&chunks, &windows);
        assert_eq!(cues, vec![Cue { start: 1.0, end: 2.0, text: "—".to_string() }]);
    }

    #[test]
    fn writes_numbered_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.srt");
        let cues = [
            Cue { start: 0.0, end: 1.25, text: "hello there".to_string() },
            Cue { start: 1.25, end: 2.0, text: "bye".to_string() },
        ];
        write_srt(&path, &cues).unwrap();
        let out = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            out,
            "1\n00:00:00,000 --> 00:00:01,250\nhello there\n\n\
             2\n00:00:01,250 --> 00:00:02,000\nbye\n\n"
        );
    }

    #[test]
    fn long_cue_text_wraps() {
        let text = "word ".repeat(30);
        let lines = wrap_text(&text, SRT_LINE_WIDTH);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= SRT_LINE_WIDTH));
    }
}
